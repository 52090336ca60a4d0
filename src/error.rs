//! Structured error types for offer-letter rendering.
//!
//! Cosmetic problems (unknown colors, unknown placeholders, malformed markup,
//! an undecodable logo) never surface here. They degrade and get logged.
//! What remains are the failures a caller has to act on.

use thiserror::Error;

use crate::model::CandidateStatus;

/// The unified error type returned by all public offerdoc API functions.
#[derive(Debug, Error)]
pub enum OfferError {
    /// JSON input failed to parse as a valid offer job.
    #[error("Failed to parse offer job: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// Generation was requested but the team has no template.
    #[error("No template available: create a template first")]
    NoTemplateAvailable,

    /// A template id did not match any template in the library.
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    /// The candidate lifecycle does not allow this status change.
    #[error("Cannot move candidate from {from} to {to}")]
    InvalidTransition {
        from: CandidateStatus,
        to: CandidateStatus,
    },

    /// Rejections must carry feedback for the hiring team.
    #[error("Rejection requires non-empty feedback")]
    MissingFeedback,

    /// Page configuration leaves no room for content.
    #[error("Invalid page configuration: {0}")]
    Config(String),

    /// The text-measurement backend could not measure a run.
    #[error("Text measurement failed: {0}")]
    Measurement(String),

    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),

    /// An image could not be read or decoded.
    #[error("Image error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for OfferError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the offer job schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        OfferError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_hint() {
        let err: OfferError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse offer job"));
        assert!(msg.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn test_eof_hint() {
        let err: OfferError = serde_json::from_str::<serde_json::Value>("{\"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn test_no_template_message() {
        assert_eq!(
            OfferError::NoTemplateAvailable.to_string(),
            "No template available: create a template first"
        );
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = OfferError::InvalidTransition {
            from: CandidateStatus::Pending,
            to: CandidateStatus::Approved,
        };
        assert_eq!(err.to_string(), "Cannot move candidate from Pending to Approved");
    }
}
