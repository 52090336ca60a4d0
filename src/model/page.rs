//! Page geometry and typography settings for PDF export.
//!
//! All lengths are millimetres. Font sizes are points.

use serde::{Deserialize, Serialize};

use crate::error::OfferError;
use crate::layout::page_break::PAGE_BREAK_EPSILON;

/// Configuration for exported pages: size, margin, line pitch, typeface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Uniform margin on all four sides.
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Vertical advance per rendered line.
    #[serde(default = "default_line_height")]
    pub line_height: f64,

    #[serde(default)]
    pub font_family: FontFamily,

    /// Font size used by segments that carry no explicit size.
    #[serde(default = "default_font_size")]
    pub base_font_size: f64,

    /// Distance of the underline stroke below the baseline.
    #[serde(default = "default_underline_offset")]
    pub underline_offset: f64,

    #[serde(default)]
    pub letterhead: LetterheadConfig,
}

fn default_margin() -> f64 {
    20.0
}

fn default_line_height() -> f64 {
    7.0
}

fn default_font_size() -> f64 {
    12.0
}

fn default_underline_offset() -> f64 {
    1.0
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
            line_height: default_line_height(),
            font_family: FontFamily::default(),
            base_font_size: default_font_size(),
            underline_offset: default_underline_offset(),
            letterhead: LetterheadConfig::default(),
        }
    }
}

impl PageConfig {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    /// Width available to text between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width() - 2.0 * self.margin
    }

    /// The lowest y a line may reach before it has to move to the next page.
    pub fn content_bottom(&self) -> f64 {
        self.height() - self.margin
    }

    /// Reject geometry that leaves no usable content box.
    pub fn validate(&self) -> Result<(), OfferError> {
        let (w, h) = self.size.dimensions();
        if !(w > 0.0 && h > 0.0) {
            return Err(OfferError::Config(format!(
                "page size must be positive, got {}x{}",
                w, h
            )));
        }
        if self.margin < 0.0 || self.content_width() <= 0.0 {
            return Err(OfferError::Config(format!(
                "margin {} leaves no content width on a {} wide page",
                self.margin, w
            )));
        }
        if self.line_height <= PAGE_BREAK_EPSILON {
            return Err(OfferError::Config(format!(
                "line height {} must exceed {}",
                self.line_height, PAGE_BREAK_EPSILON
            )));
        }
        if self.margin + self.line_height > self.content_bottom() {
            return Err(OfferError::Config(
                "page is too short to hold a single line".to_string(),
            ));
        }
        if self.base_font_size <= 0.0 {
            return Err(OfferError::Config("base font size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Standard page sizes in millimetres.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Typeface family for letter text. These map onto the standard PDF fonts,
/// which need no embedding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Times,
    Courier,
}

/// Bounding box for the page-one logo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterheadConfig {
    pub max_width: f64,
    pub max_height: f64,
    /// Space between the logo and the first line of text.
    pub gap: f64,
}

impl Default for LetterheadConfig {
    fn default() -> Self {
        Self {
            max_width: 60.0,
            max_height: 20.0,
            gap: 8.0,
        }
    }
}
