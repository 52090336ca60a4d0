//! Placeholder substitution for letter templates.
//!
//! A template body carries `{{identifier}}` tokens. The candidate and the
//! company settings supply the values. Substitution is a single left-to-right
//! scan, so a value that itself contains `{{...}}` is never expanded again.
//! Unknown tokens stay in the output untouched: a half-finished template is a
//! valid authoring state.

use std::collections::HashMap;

use crate::model::{Candidate, CompanySettings, Template};

/// The identifiers a template may reference.
pub const VARIABLE_TOKENS: [&str; 9] = [
    "name",
    "role",
    "offerDate",
    "companyName",
    "companyAddress",
    "companyWebsite",
    "companyPhone",
    "senderName",
    "senderEmail",
];

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Flat identifier → value bindings for one substitution pass.
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    values: HashMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for every recognized token, drawn from the records.
    pub fn from_records(candidate: &Candidate, settings: &CompanySettings) -> Self {
        let mut ctx = Self::new();
        ctx.bind("name", &candidate.name);
        ctx.bind("role", &candidate.role);
        ctx.bind("offerDate", &candidate.offer_date);
        ctx.bind("companyName", &settings.info.name);
        ctx.bind("companyAddress", &settings.info.address);
        ctx.bind("companyWebsite", &settings.info.website);
        ctx.bind("companyPhone", &settings.info.phone);
        ctx.bind("senderName", &settings.email_config.sender_name);
        ctx.bind("senderEmail", &settings.email_config.sender_email);
        ctx
    }

    pub fn bind(&mut self, identifier: &str, value: &str) {
        self.values.insert(identifier.to_string(), value.to_string());
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.values.get(identifier).map(String::as_str)
    }

    /// Replace every bound `{{identifier}}` in `body`.
    pub fn substitute(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut rest = body;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + OPEN.len()..];

            let Some(end) = after_open.find(CLOSE) else {
                // Unterminated: the remainder is literal text.
                out.push_str(&rest[start..]);
                return out;
            };

            let identifier = &after_open[..end];
            match self.get(identifier) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after_open[end + CLOSE.len()..];
                }
                None => {
                    // Keep the opening braces and rescan after them, so that
                    // `{{{{name}}` still finds the inner token.
                    out.push_str(OPEN);
                    rest = after_open;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// The letter body for a candidate: their hand-edited content if present,
/// otherwise the template with placeholders filled from the records.
pub fn generate_offer_content(
    candidate: &Candidate,
    template: &Template,
    settings: &CompanySettings,
) -> String {
    if let Some(custom) = &candidate.custom_content {
        return custom.clone();
    }
    VariableContext::from_records(candidate, settings).substitute(&template.content)
}
