//! # Records
//!
//! The records the rendering core consumes: a candidate in the hiring
//! pipeline, the team's letter templates, and the team's company settings.
//! Persistence, sync and access control live outside this crate; the types
//! here only carry the data and enforce the invariants that belong to the
//! records themselves (lifecycle transitions, exclusive default template).

pub mod page;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OfferError;

pub use page::{FontFamily, LetterheadConfig, PageConfig, PageSize};

/// A candidate tracked through the offer pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
    pub offer_date: String,
    #[serde(default)]
    pub status: CandidateStatus,
    /// Hand-edited letter body. When set it replaces template output verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<String>,
    /// Reviewer feedback recorded on rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Where a candidate's offer letter is in the approval pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateStatus {
    #[default]
    Pending,
    Generated,
    Submitted,
    Approved,
    Rejected,
}

impl CandidateStatus {
    /// Whether the pipeline allows moving from `self` to `next`.
    pub fn can_transition_to(self, next: CandidateStatus) -> bool {
        use CandidateStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Generated)
                | (Pending, Submitted)
                | (Generated, Submitted)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Rejected, Generated)
                | (Rejected, Submitted)
        )
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateStatus::Pending => "Pending",
            CandidateStatus::Generated => "Generated",
            CandidateStatus::Submitted => "Submitted",
            CandidateStatus::Approved => "Approved",
            CandidateStatus::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

impl Candidate {
    /// Create a freshly-intaken candidate in the `Pending` state.
    pub fn new(name: &str, role: &str, offer_date: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            email: String::new(),
            role: role.to_string(),
            offer_date: offer_date.to_string(),
            status: CandidateStatus::Pending,
            custom_content: None,
            feedback: None,
        }
    }

    /// Move to a new status. Rejection goes through [`Candidate::reject`].
    pub fn transition(&mut self, next: CandidateStatus) -> Result<(), OfferError> {
        if next == CandidateStatus::Rejected && self.status != CandidateStatus::Rejected {
            return Err(OfferError::MissingFeedback);
        }
        self.apply_transition(next)
    }

    /// Reject a submitted letter with reviewer feedback.
    pub fn reject(&mut self, feedback: &str) -> Result<(), OfferError> {
        if feedback.trim().is_empty() {
            return Err(OfferError::MissingFeedback);
        }
        self.apply_transition(CandidateStatus::Rejected)?;
        self.feedback = Some(feedback.to_string());
        Ok(())
    }

    fn apply_transition(&mut self, next: CandidateStatus) -> Result<(), OfferError> {
        if !self.status.can_transition_to(next) {
            return Err(OfferError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if self.status == CandidateStatus::Rejected && next != CandidateStatus::Rejected {
            self.feedback = None;
        }
        self.status = next;
        Ok(())
    }

    /// Store a hand-edited letter body.
    pub fn edit_content(&mut self, content: &str) {
        self.custom_content = Some(content.to_string());
    }

    /// Drop the hand-edited body so the next render uses the template again.
    pub fn clear_custom_content(&mut self) {
        self.custom_content = None;
    }
}

/// A reusable letter body with `{{token}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Template {
    pub fn new(id: &str, name: &str, content: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            is_default: false,
        }
    }
}

/// One team's templates. At most one of them is flagged default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Template>", into = "Vec<Template>")]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl From<Vec<Template>> for TemplateLibrary {
    fn from(templates: Vec<Template>) -> Self {
        Self::from_templates(templates)
    }
}

impl From<TemplateLibrary> for Vec<Template> {
    fn from(library: TemplateLibrary) -> Self {
        library.templates
    }
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from stored records. If several arrive flagged default
    /// (a broken write elsewhere), the first flagged one keeps the flag.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let mut library = Self { templates };
        if let Some(first_default) = library.templates.iter().position(|t| t.is_default) {
            for (i, template) in library.templates.iter_mut().enumerate() {
                template.is_default = i == first_default;
            }
        }
        library
    }

    /// Add a template. A template added as default takes the flag from its siblings.
    pub fn add(&mut self, template: Template) {
        if template.is_default {
            self.clear_default();
        }
        self.templates.push(template);
    }

    /// Replace the name and body of an existing template.
    pub fn update(&mut self, id: &str, name: &str, content: &str) -> Result<(), OfferError> {
        let template = self
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| OfferError::UnknownTemplate(id.to_string()))?;
        template.name = name.to_string();
        template.content = content.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Template> {
        let idx = self.templates.iter().position(|t| t.id == id)?;
        Some(self.templates.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Mark `id` as the team default, clearing the flag everywhere else first.
    pub fn set_default(&mut self, id: &str) -> Result<(), OfferError> {
        if self.get(id).is_none() {
            return Err(OfferError::UnknownTemplate(id.to_string()));
        }
        self.clear_default();
        for template in &mut self.templates {
            if template.id == id {
                template.is_default = true;
            }
        }
        Ok(())
    }

    fn clear_default(&mut self) {
        for template in &mut self.templates {
            template.is_default = false;
        }
    }

    /// The template generation should use: the flagged default, else the
    /// first template, else `NoTemplateAvailable`.
    pub fn resolve_default(&self) -> Result<&Template, OfferError> {
        self.templates
            .iter()
            .find(|t| t.is_default)
            .or_else(|| self.templates.first())
            .ok_or(OfferError::NoTemplateAvailable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Per-team company settings: identity, branding and sender identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    #[serde(default)]
    pub info: CompanyInfo,
    #[serde(default)]
    pub branding: Branding,
    #[serde(default)]
    pub email_config: EmailConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub website: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Branding {
    /// Logo reference: data URI, raw base64, or a local file path.
    pub logo_url: String,
    pub primary_color: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo_url: String::new(),
            primary_color: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailConfig {
    pub sender_name: String,
    pub sender_email: String,
}

/// Everything one render needs, as accepted by the CLI and WASM entry points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferJob {
    pub candidate: Candidate,
    #[serde(default)]
    pub templates: TemplateLibrary,
    #[serde(default)]
    pub company_settings: CompanySettings,
    #[serde(default)]
    pub page: PageConfig,
}
