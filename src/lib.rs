//! # offerdoc
//!
//! Offer-letter composition and pagination.
//!
//! A hiring team keeps letter templates with `{{placeholders}}`, a candidate
//! record and a company profile. This crate turns those three records into
//! a finished letter: either markup for a preview surface, or a paginated
//! PDF with the company logo on page 1.
//!
//! ## Architecture
//!
//! ```text
//! Candidate + Template + CompanySettings
//!       ↓
//!   [template]  Fill {{placeholders}} (or take the hand-edited body)
//!       ↓
//!   [markup]    Rich text → lines of styled segments
//!       ↓
//!   [layout]    Wrap and paginate against font metrics
//!       ↓
//!   [pdf]       Serialize to PDF bytes
//! ```
//!
//! [`render::OfferRenderer`] drives the pipeline. The functions at the crate
//! root accept a JSON [`model::OfferJob`] for the CLI and WASM entry points.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod markup;
pub mod model;
pub mod pdf;
pub mod render;
pub mod style;
pub mod template;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::OfferError;
pub use model::{Candidate, CandidateStatus, CompanySettings, OfferJob, PageConfig, Template, TemplateLibrary};
pub use render::{export_filename, ExportedDocument, OfferRenderer};

/// Render a job to a PDF with the team's default template.
pub fn render_job(job: &OfferJob) -> Result<ExportedDocument, OfferError> {
    OfferRenderer::new(job.page.clone()).export_default(
        &job.candidate,
        &job.templates,
        &job.company_settings,
    )
}

/// Render a job described as JSON to a PDF.
pub fn render_job_json(json: &str) -> Result<ExportedDocument, OfferError> {
    let job: OfferJob = serde_json::from_str(json)?;
    render_job(&job)
}

/// The preview page for a job, as standalone HTML.
pub fn preview_job(job: &OfferJob) -> Result<String, OfferError> {
    let template = job.templates.resolve_default()?;
    Ok(OfferRenderer::new(job.page.clone()).render_preview_html(
        &job.candidate,
        template,
        &job.company_settings,
    ))
}

/// The resolved letter body for a job, as markup.
pub fn job_content(job: &OfferJob) -> Result<String, OfferError> {
    let template = job.templates.resolve_default()?;
    Ok(template::generate_offer_content(
        &job.candidate,
        template,
        &job.company_settings,
    ))
}
