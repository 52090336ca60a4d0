//! # Document Renderer
//!
//! Orchestrates one render: resolve the letter body, then either wrap it
//! in a standalone HTML page for preview or run it through the markup
//! parser, layout engine and PDF writer for export.
//!
//! Every intermediate value (parsed lines, page cursor, PDF objects) is
//! owned by the call that builds it, so an `OfferRenderer` can be shared
//! freely between threads.

use quick_xml::escape::escape;

use crate::error::OfferError;
use crate::font::FontContext;
use crate::image_loader::load_logo;
use crate::layout::{LayoutEngine, LayoutPage};
use crate::markup::parse_markup;
use crate::model::{Candidate, CandidateStatus, CompanySettings, PageConfig, Template, TemplateLibrary};
use crate::pdf::{Metadata, PdfWriter};
use crate::style::parse_color;
use crate::template::generate_offer_content;

/// A finished export, ready to hand to the user.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    /// Suggested download name, e.g. `Offer_Letter_Jane_Smith.pdf`.
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// The download name for a candidate's letter. Each run of whitespace in
/// the name becomes a single underscore; everything else is kept.
pub fn export_filename(candidate_name: &str, extension: &str) -> String {
    let mut stem = String::with_capacity(candidate_name.len());
    let mut in_space = false;
    for ch in candidate_name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!("Offer_Letter_{}.{}", stem, extension)
}

#[derive(Debug, Clone, Default)]
pub struct OfferRenderer {
    config: PageConfig,
    layout: LayoutEngine,
    writer: PdfWriter,
}

impl OfferRenderer {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            layout: LayoutEngine::new(),
            writer: PdfWriter::new(),
        }
    }

    /// The resolved letter body as markup.
    pub fn content(
        &self,
        candidate: &Candidate,
        template: &Template,
        settings: &CompanySettings,
    ) -> String {
        generate_offer_content(candidate, template, settings)
    }

    /// A standalone HTML page showing the letter as the preview surface
    /// displays it: the logo above the body, 12pt text at 1.5 line height.
    pub fn render_preview_html(
        &self,
        candidate: &Candidate,
        template: &Template,
        settings: &CompanySettings,
    ) -> String {
        let content = self.content(candidate, template, settings);
        let accent = parse_color(&settings.branding.primary_color);
        let config = &self.config;
        let logo_url = settings.branding.logo_url.trim();

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!(
            "<title>Offer Letter - {}</title>\n",
            escape(candidate.name.as_str())
        ));
        html.push_str("<style>\n");
        html.push_str(&format!(
            "  .page {{ box-sizing: border-box; width: {:.0}mm; min-height: {:.0}mm; padding: {:.0}mm; margin: 0 auto; background: #ffffff; }}\n",
            config.width(),
            config.height(),
            config.margin
        ));
        html.push_str(&format!(
            "  .letterhead {{ margin-bottom: {:.0}mm; border-bottom: 2px solid {}; }}\n",
            config.letterhead.gap,
            accent.to_hex()
        ));
        html.push_str(&format!(
            "  .letterhead img {{ max-width: {:.0}mm; max-height: {:.0}mm; object-fit: contain; }}\n",
            config.letterhead.max_width, config.letterhead.max_height
        ));
        html.push_str(&format!(
            "  .content {{ font-size: {}pt; line-height: 1.5; }}\n",
            config.base_font_size
        ));
        html.push_str("  .content ul { list-style-type: disc; padding-left: 1.5em; margin: 0.5em 0; }\n");
        html.push_str("  .content ol { list-style-type: decimal; padding-left: 1.5em; margin: 0.5em 0; }\n");
        html.push_str("  .content li { margin: 0.25em 0; }\n");
        html.push_str("</style>\n</head>\n<body>\n<div class=\"page\">\n");
        if !logo_url.is_empty() {
            html.push_str(&format!(
                "<div class=\"letterhead\"><img src=\"{}\" alt=\"Company Logo\"></div>\n",
                escape(logo_url)
            ));
        }
        html.push_str("<div class=\"content\">\n");
        html.push_str(&content);
        html.push_str("\n</div>\n</div>\n</body>\n</html>\n");
        html
    }

    /// Parse and paginate the letter without writing any output.
    pub fn layout(
        &self,
        candidate: &Candidate,
        template: &Template,
        settings: &CompanySettings,
    ) -> Result<Vec<LayoutPage>, OfferError> {
        let fonts = FontContext::new(self.config.font_family);
        self.layout_with(candidate, template, settings, &fonts)
    }

    fn layout_with(
        &self,
        candidate: &Candidate,
        template: &Template,
        settings: &CompanySettings,
        fonts: &FontContext,
    ) -> Result<Vec<LayoutPage>, OfferError> {
        let content = self.content(candidate, template, settings);
        let lines = parse_markup(&content);
        log::debug!("parsed {} lines for {}", lines.len(), candidate.name);
        let logo = load_logo(&settings.branding.logo_url);
        self.layout.layout(&lines, &self.config, fonts, logo.as_ref())
    }

    /// Export the letter as a PDF using the given template.
    pub fn export_pdf(
        &self,
        candidate: &Candidate,
        template: &Template,
        settings: &CompanySettings,
    ) -> Result<ExportedDocument, OfferError> {
        let fonts = FontContext::new(self.config.font_family);
        let pages = self.layout_with(candidate, template, settings, &fonts)?;

        let company = settings.info.name.trim();
        let metadata = Metadata {
            title: Some(format!("Offer Letter - {}", candidate.name)),
            author: (!company.is_empty()).then(|| company.to_string()),
            subject: (!candidate.role.trim().is_empty()).then(|| candidate.role.clone()),
        };
        let bytes = self.writer.write(&pages, &metadata, &fonts)?;
        let filename = export_filename(&candidate.name, "pdf");

        log::info!(
            "exported {} ({} pages, {} bytes)",
            filename,
            pages.len(),
            bytes.len()
        );
        Ok(ExportedDocument {
            filename,
            bytes,
            page_count: pages.len(),
        })
    }

    /// Export using the team's default template. Fails with
    /// `NoTemplateAvailable` when the team has none, even if the candidate
    /// carries custom content.
    pub fn export_default(
        &self,
        candidate: &Candidate,
        templates: &TemplateLibrary,
        settings: &CompanySettings,
    ) -> Result<ExportedDocument, OfferError> {
        let template = templates.resolve_default()?;
        self.export_pdf(candidate, template, settings)
    }

    /// Export with the default template and move a pending or rejected
    /// candidate to `Generated`. A candidate already further along keeps
    /// its status.
    pub fn generate(
        &self,
        candidate: &mut Candidate,
        templates: &TemplateLibrary,
        settings: &CompanySettings,
    ) -> Result<ExportedDocument, OfferError> {
        let document = self.export_default(candidate, templates, settings)?;
        if candidate.status.can_transition_to(CandidateStatus::Generated) {
            candidate.transition(CandidateStatus::Generated)?;
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Branding, CompanyInfo};

    fn settings() -> CompanySettings {
        CompanySettings {
            info: CompanyInfo {
                name: "Acme Corp".to_string(),
                ..Default::default()
            },
            branding: Branding {
                logo_url: String::new(),
                primary_color: "#1a73e8".to_string(),
            },
            ..Default::default()
        }
    }

    fn template() -> Template {
        Template::new("t1", "Standard", "<p>Dear {{name}},</p><p>Welcome to {{companyName}}.</p>")
    }

    #[test]
    fn test_filename_replaces_spaces() {
        assert_eq!(
            export_filename("Jane Q. Smith", "pdf"),
            "Offer_Letter_Jane_Q._Smith.pdf"
        );
    }

    #[test]
    fn test_filename_collapses_whitespace_runs() {
        assert_eq!(export_filename("Ana  \tLima", "html"), "Offer_Letter_Ana_Lima.html");
    }

    #[test]
    fn test_export_pdf() {
        let candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        let doc = OfferRenderer::default()
            .export_pdf(&candidate, &template(), &settings())
            .unwrap();
        assert_eq!(doc.filename, "Offer_Letter_Jane_Smith.pdf");
        assert_eq!(doc.page_count, 1);
        assert!(doc.bytes.starts_with(b"%PDF-"));
        let text = String::from_utf8_lossy(&doc.bytes);
        assert!(text.contains("/Title (Offer Letter - Jane Smith)"));
        assert!(text.contains("/Author (Acme Corp)"));
    }

    #[test]
    fn test_layout_uses_resolved_content() {
        let candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        let pages = OfferRenderer::default()
            .layout(&candidate, &template(), &settings())
            .unwrap();
        let texts: Vec<&str> = pages[0].text_runs().map(|r| r.text).collect();
        assert_eq!(texts, vec!["Dear Jane Smith,", "Welcome to Acme Corp."]);
    }

    #[test]
    fn test_export_without_templates_fails() {
        let mut candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        candidate.edit_content("<p>Hand written</p>");
        let result = OfferRenderer::default().export_default(
            &candidate,
            &TemplateLibrary::new(),
            &settings(),
        );
        assert!(matches!(result, Err(OfferError::NoTemplateAvailable)));
    }

    #[test]
    fn test_generate_marks_candidate() {
        let mut candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        let library = TemplateLibrary::from_templates(vec![template()]);
        OfferRenderer::default()
            .generate(&mut candidate, &library, &settings())
            .unwrap();
        assert_eq!(candidate.status, CandidateStatus::Generated);
    }

    #[test]
    fn test_generate_keeps_later_status() {
        let mut candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        candidate.transition(CandidateStatus::Submitted).unwrap();
        let library = TemplateLibrary::from_templates(vec![template()]);
        OfferRenderer::default()
            .generate(&mut candidate, &library, &settings())
            .unwrap();
        assert_eq!(candidate.status, CandidateStatus::Submitted);
    }

    #[test]
    fn test_preview_html() {
        let candidate = Candidate::new("Jane <Smith>", "Engineer", "2026-11-01");
        let mut s = settings();
        s.branding.logo_url = "https://cdn.test/logo.png".to_string();
        let html = OfferRenderer::default().render_preview_html(&candidate, &template(), &s);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Offer Letter - Jane &lt;Smith&gt;</title>"));
        assert!(html.contains("<img src=\"https://cdn.test/logo.png\""));
        assert!(html.contains("font-size: 12pt; line-height: 1.5;"));
        assert!(html.contains("border-bottom: 2px solid #1a73e8"));
        assert!(html.contains("<p>Dear Jane <Smith>,</p>"));
    }

    #[test]
    fn test_preview_without_logo() {
        let candidate = Candidate::new("Jane Smith", "Engineer", "2026-11-01");
        let html = OfferRenderer::default().render_preview_html(&candidate, &template(), &settings());
        assert!(!html.contains("<img"));
    }
}
