//! # Font Management
//!
//! Letters are set in the standard PDF fonts (Helvetica, Times, Courier),
//! which every viewer ships with, so nothing is embedded. This module maps a
//! family and variant onto one of those faces and measures text with its
//! AFM widths.

pub mod metrics;

use std::collections::HashMap;

use crate::error::OfferError;
use crate::model::FontFamily;
use crate::style::FontVariant;
pub use metrics::StandardFontMetrics;

/// Millimetres per PDF point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_PT
}

pub fn mm_to_pt(mm: f64) -> f64 {
    mm / MM_PER_PT
}

/// The standard PDF faces a letter can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::TimesBold => &metrics::TIMES_BOLD,
            Self::TimesItalic => &metrics::TIMES_ITALIC,
            Self::TimesBoldItalic => &metrics::TIMES_BOLD_ITALIC,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER
            }
        }
    }
}

/// Maps family + variant to a concrete face.
pub struct FontRegistry {
    fonts: HashMap<(FontFamily, FontVariant), StandardFont>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        use FontFamily::*;
        use FontVariant::*;

        let standard_mappings = [
            ((Helvetica, Regular), StandardFont::Helvetica),
            ((Helvetica, Bold), StandardFont::HelveticaBold),
            ((Helvetica, Italic), StandardFont::HelveticaOblique),
            ((Helvetica, BoldItalic), StandardFont::HelveticaBoldOblique),
            ((Times, Regular), StandardFont::TimesRoman),
            ((Times, Bold), StandardFont::TimesBold),
            ((Times, Italic), StandardFont::TimesItalic),
            ((Times, BoldItalic), StandardFont::TimesBoldItalic),
            ((Courier, Regular), StandardFont::Courier),
            ((Courier, Bold), StandardFont::CourierBold),
            ((Courier, Italic), StandardFont::CourierOblique),
            ((Courier, BoldItalic), StandardFont::CourierBoldOblique),
        ];

        Self {
            fonts: standard_mappings.into_iter().collect(),
        }
    }

    /// Look up a face, falling back to regular Helvetica.
    pub fn resolve(&self, family: FontFamily, variant: FontVariant) -> StandardFont {
        self.fonts
            .get(&(family, variant))
            .copied()
            .unwrap_or(StandardFont::Helvetica)
    }
}

/// The measurement capability the layout engine is written against.
///
/// Implementations must be pure: the same text, variant and size always
/// measure the same. Widths are millimetres; sizes are points.
pub trait TextMeasurer {
    fn measure(&self, text: &str, variant: FontVariant, font_size: f64) -> Result<f64, OfferError>;

    /// Width of a single character. Used when a word has to be split.
    fn char_width(&self, ch: char, variant: FontVariant, font_size: f64) -> Result<f64, OfferError> {
        let mut buf = [0u8; 4];
        self.measure(ch.encode_utf8(&mut buf), variant, font_size)
    }
}

/// Font context for one letter: a family plus the registry that resolves
/// its variants. Shared by layout and PDF serialization.
pub struct FontContext {
    registry: FontRegistry,
    family: FontFamily,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new(FontFamily::default())
    }
}

impl FontContext {
    pub fn new(family: FontFamily) -> Self {
        Self {
            registry: FontRegistry::new(),
            family,
        }
    }

    /// The face a run in `variant` is set in.
    pub fn resolve(&self, variant: FontVariant) -> StandardFont {
        self.registry.resolve(self.family, variant)
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, variant: FontVariant, font_size: f64) -> f64 {
        self.resolve(variant).metrics().measure_string(text, font_size)
    }
}

impl TextMeasurer for FontContext {
    fn measure(&self, text: &str, variant: FontVariant, font_size: f64) -> Result<f64, OfferError> {
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(OfferError::Measurement(format!(
                "font size {} is not a positive number",
                font_size
            )));
        }
        Ok(pt_to_mm(self.measure_string(text, variant, font_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::default();
        let w = ctx.measure_string(" ", FontVariant::Regular, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::default();
        let regular = ctx.measure_string("Offer", FontVariant::Regular, 12.0);
        let bold = ctx.measure_string("Offer", FontVariant::Bold, 12.0);
        assert!(bold > regular, "Bold text should be wider than regular");
    }

    #[test]
    fn test_measure_in_millimetres() {
        let ctx = FontContext::default();
        let mm = ctx.measure("M", FontVariant::Regular, 72.0).unwrap();
        // 833/1000 of an inch.
        assert!((mm - 0.833 * 25.4).abs() < 1e-9);
    }

    #[test]
    fn test_measure_rejects_bad_size() {
        let ctx = FontContext::default();
        assert!(matches!(
            ctx.measure("x", FontVariant::Regular, 0.0),
            Err(OfferError::Measurement(_))
        ));
    }

    #[test]
    fn test_family_resolution() {
        let ctx = FontContext::new(FontFamily::Times);
        assert_eq!(ctx.resolve(FontVariant::BoldItalic).pdf_name(), "Times-BoldItalic");
        let ctx = FontContext::new(FontFamily::Courier);
        assert_eq!(ctx.resolve(FontVariant::Italic).pdf_name(), "Courier-Oblique");
    }

    #[test]
    fn test_unit_conversion() {
        assert!((mm_to_pt(pt_to_mm(12.0)) - 12.0).abs() < 1e-12);
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-9);
    }
}
