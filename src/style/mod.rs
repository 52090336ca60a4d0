//! # Style System
//!
//! The small slice of CSS an offer letter uses: bold, italic, underline,
//! font size, color and text alignment. Markup carries these either as
//! editor class names (`ql-size-large`, `ql-color-ff0000`, `ql-align-center`)
//! or as inline `style` declarations. Both funnel into [`Formatting`], an
//! immutable value each element derives from its parent's.

use serde::{Deserialize, Serialize};

/// Integer RGB color, each component in `0..=255`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Components scaled to `0.0..=1.0` for PDF color operators.
    pub fn to_unit(self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }

    /// CSS hex notation, `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Resolve a color expression to RGB.
///
/// Accepts `#rrggbb` and `rgb(r, g, b)` with decimal components. Anything
/// else, including the empty string, is black. Color is cosmetic, so this
/// never fails.
pub fn parse_color(expr: &str) -> Rgb {
    let expr = expr.trim();
    if expr.is_empty() {
        return Rgb::BLACK;
    }

    if let Some(hex) = expr.strip_prefix('#') {
        return parse_hex6(hex).unwrap_or_else(|| {
            log::debug!("unrecognized hex color {:?}, using black", expr);
            Rgb::BLACK
        });
    }

    if expr.starts_with("rgb") {
        return parse_rgb_function(expr).unwrap_or_else(|| {
            log::debug!("unrecognized rgb() color {:?}, using black", expr);
            Rgb::BLACK
        });
    }

    log::debug!("unrecognized color {:?}, using black", expr);
    Rgb::BLACK
}

fn parse_hex6(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

fn parse_rgb_function(expr: &str) -> Option<Rgb> {
    let inner = expr.strip_prefix("rgb(")?;
    let close = inner.find(')')?;
    let parts: Vec<&str> = inner[..close].split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Out-of-range decimals saturate instead of wrapping.
        *slot = part.parse::<u32>().map(|v| v.min(255) as u8).unwrap_or(255);
    }
    Some(Rgb {
        r: channels[0],
        g: channels[1],
        b: channels[2],
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Which face of a family a run is set in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontVariant {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontVariant {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FontVariant::BoldItalic,
            (true, false) => FontVariant::Bold,
            (false, true) => FontVariant::Italic,
            (false, false) => FontVariant::Regular,
        }
    }
}

/// Formatting inherited down the markup tree.
///
/// Flags only ever switch on as we descend; size, color and alignment are
/// overwritten by the innermost element that sets them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Font size in points.
    pub font_size: Option<f64>,
    /// Unresolved color expression, resolved at layout via [`parse_color`].
    pub color: Option<String>,
    pub align: Option<TextAlign>,
}

/// Heading sizes for `h1`..`h3`; `h4`..`h6` share [`MINOR_HEADING_SIZE`].
const HEADING_SIZES: [f64; 3] = [24.0, 20.0, 16.0];
const MINOR_HEADING_SIZE: f64 = 14.0;

impl Formatting {
    /// Derive the formatting for an element from its parent's.
    ///
    /// Application order on one element: tag semantics, size class, inline
    /// `font-size`, inline `color`, color class, alignment.
    pub fn derive(&self, tag: &str, classes: &[&str], inline_style: Option<&str>) -> Formatting {
        let mut f = self.clone();

        match tag {
            "strong" | "b" => f.bold = true,
            "em" | "i" => f.italic = true,
            "u" => f.underline = true,
            "h1" | "h2" | "h3" => {
                f.bold = true;
                let level = (tag.as_bytes()[1] - b'1') as usize;
                f.font_size = Some(HEADING_SIZES[level]);
            }
            "h4" | "h5" | "h6" => {
                f.bold = true;
                f.font_size = Some(MINOR_HEADING_SIZE);
            }
            _ => {}
        }

        if classes.contains(&"ql-size-small") {
            f.font_size = Some(10.0);
        } else if classes.contains(&"ql-size-large") {
            f.font_size = Some(16.0);
        } else if classes.contains(&"ql-size-huge") {
            f.font_size = Some(20.0);
        }

        let declarations = inline_style.map(parse_declarations).unwrap_or_default();

        if let Some(size) = declarations
            .iter()
            .find(|(prop, _)| prop == "font-size")
            .and_then(|(_, value)| parse_font_size(value))
        {
            f.font_size = Some(size);
        }

        if let Some(color) = declarations
            .iter()
            .find(|(prop, _)| prop == "color")
            .map(|(_, value)| value.as_str())
            .filter(|value| is_color_literal(value))
        {
            f.color = Some(color.to_string());
        }

        if let Some(class) = classes.iter().find(|c| c.starts_with("ql-color-")) {
            f.color = Some(format!("#{}", &class["ql-color-".len()..]));
        }

        if let Some(align) = alignment(classes, &declarations) {
            f.align = Some(align);
        }

        f
    }

    pub fn variant(&self) -> FontVariant {
        FontVariant::from_flags(self.bold, self.italic)
    }
}

/// Split a `style` attribute into lowercase `(property, value)` pairs.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if prop.is_empty() || value.is_empty() {
                None
            } else {
                Some((prop, value))
            }
        })
        .collect()
}

/// `14px` / `14pt` / `14` → 14.0. Pixel sizes are taken as points, which is
/// how editor sizes have always mapped onto the page.
fn parse_font_size(value: &str) -> Option<f64> {
    let number = value
        .trim()
        .trim_end_matches("px")
        .trim_end_matches("pt")
        .trim();
    let size: f64 = number.parse().ok()?;
    if size > 0.0 && size.is_finite() {
        Some(size)
    } else {
        None
    }
}

/// Only the two notations [`parse_color`] understands are taken from inline
/// styles; named colors would silently resolve to black.
fn is_color_literal(value: &str) -> bool {
    (value.starts_with('#') && value.len() == 7) || value.starts_with("rgb(")
}

fn alignment(classes: &[&str], declarations: &[(String, String)]) -> Option<TextAlign> {
    if classes.contains(&"ql-align-center") {
        return Some(TextAlign::Center);
    }
    if classes.contains(&"ql-align-right") {
        return Some(TextAlign::Right);
    }
    let value = declarations
        .iter()
        .find(|(prop, _)| prop == "text-align")
        .map(|(_, v)| v.to_ascii_lowercase())?;
    match value.as_str() {
        "center" => Some(TextAlign::Center),
        "right" => Some(TextAlign::Right),
        "left" => Some(TextAlign::Left),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#ff8000"), Rgb::new(255, 128, 0));
        assert_eq!(parse_color("#00FFaa"), Rgb::new(0, 255, 170));
    }

    #[test]
    fn test_parse_rgb_function() {
        assert_eq!(parse_color("rgb(10, 20, 30)"), Rgb::new(10, 20, 30));
        assert_eq!(parse_color("rgb(10,20,30)"), Rgb::new(10, 20, 30));
    }

    #[test]
    fn test_color_fallbacks() {
        assert_eq!(parse_color("not-a-color"), Rgb::BLACK);
        assert_eq!(parse_color(""), Rgb::BLACK);
        assert_eq!(parse_color("#fff"), Rgb::BLACK);
        assert_eq!(parse_color("#gggggg"), Rgb::BLACK);
        assert_eq!(parse_color("rgb(1, 2)"), Rgb::BLACK);
        assert_eq!(parse_color("rgba(1, 2, 3, 0.5)"), Rgb::BLACK);
    }

    #[test]
    fn test_rgb_saturates() {
        assert_eq!(parse_color("rgb(300, 0, 0)"), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(parse_color("rgb(26, 115, 232)").to_hex(), "#1a73e8");
    }

    #[test]
    fn test_heading_defaults() {
        let root = Formatting::default();
        let h1 = root.derive("h1", &[], None);
        assert!(h1.bold);
        assert_eq!(h1.font_size, Some(24.0));
        assert_eq!(root.derive("h2", &[], None).font_size, Some(20.0));
        assert_eq!(root.derive("h3", &[], None).font_size, Some(16.0));
        assert_eq!(root.derive("h5", &[], None).font_size, Some(14.0));
    }

    #[test]
    fn test_inline_size_overrides_heading() {
        let f = Formatting::default().derive("h1", &[], Some("font-size: 30px"));
        assert_eq!(f.font_size, Some(30.0));
        assert!(f.bold);
    }

    #[test]
    fn test_color_class_beats_inline_color() {
        let f = Formatting::default().derive(
            "span",
            &["ql-color-00ff00"],
            Some("color: #ff0000"),
        );
        assert_eq!(f.color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_background_color_is_not_text_color() {
        let f = Formatting::default().derive("span", &[], Some("background-color: #ff0000"));
        assert_eq!(f.color, None);
    }

    #[test]
    fn test_flags_are_additive() {
        let bold = Formatting::default().derive("strong", &[], None);
        let both = bold.derive("em", &[], None);
        assert!(both.bold && both.italic);
        assert_eq!(both.variant(), FontVariant::BoldItalic);
        let plain_child = both.derive("span", &[], None);
        assert!(plain_child.bold && plain_child.italic);
    }

    #[test]
    fn test_alignment_sources() {
        let root = Formatting::default();
        assert_eq!(
            root.derive("p", &["ql-align-right"], None).align,
            Some(TextAlign::Right)
        );
        assert_eq!(
            root.derive("p", &[], Some("text-align: center;")).align,
            Some(TextAlign::Center)
        );
        assert_eq!(root.derive("p", &[], None).align, None);
    }

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("Color: red; ; font-size:12px;bad");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("font-size".to_string(), "12px".to_string()),
            ]
        );
    }
}
