//! # Page Layout Engine
//!
//! Places parsed lines onto fixed-size pages.
//!
//! A letter is a single column, so layout is a cursor walk rather than a
//! box tree:
//!
//! 1. Open page one with `y` at the top margin, below the letterhead logo
//!    if there is one.
//! 2. Before each line, ask [`page_break::decide_break`] whether it still
//!    fits; if not, open a new page.
//! 3. Start `x` at the left margin, or offset it by the line's full width
//!    for centered and right-aligned lines.
//! 4. Wrap each segment into whatever is left of the current line, then
//!    into full-width lines, placing one text run per wrapped piece.
//! 5. Advance `y` by one line height after the line.
//!
//! Coordinates are millimetres from the top-left corner of the page. Text
//! and underline elements sit on their baseline `y`; images use their top
//! edge.

pub mod page_break;

use crate::error::OfferError;
use crate::font::TextMeasurer;
use crate::image_loader::LoadedImage;
use crate::markup::{ParsedLine, TextSegment};
use crate::model::PageConfig;
use crate::style::{parse_color, FontVariant, Rgb, TextAlign};
use crate::text::TextLayout;
use page_break::BreakDecision;

/// Stroke width for underlines, in millimetres.
pub const UNDERLINE_THICKNESS: f64 = 0.2;

/// A finished page.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    /// Zero-based position in the document.
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Text runs on this page, in placement order.
    pub fn text_runs(&self) -> impl Iterator<Item = TextRun<'_>> {
        self.elements.iter().filter_map(move |el| match &el.draw {
            DrawCommand::Text {
                text,
                variant,
                font_size,
                color,
                underline,
            } => Some(TextRun {
                page_index: self.index,
                x: el.x,
                y: el.y,
                width: el.width,
                text,
                variant: *variant,
                font_size: *font_size,
                color: *color,
                underline: *underline,
            }),
            _ => None,
        })
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to draw for an element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Text {
        text: String,
        variant: FontVariant,
        /// Points.
        font_size: f64,
        color: Rgb,
        underline: bool,
    },
    /// A horizontal stroke `width` long starting at `(x, y)`.
    Underline { color: Rgb, thickness: f64 },
    Image { image_data: LoadedImage },
}

/// Borrowed view of one placed text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub page_index: usize,
    pub x: f64,
    pub y: f64,
    /// Measured width in millimetres.
    pub width: f64,
    pub text: &'a str,
    pub variant: FontVariant,
    pub font_size: f64,
    pub color: Rgb,
    pub underline: bool,
}

/// Tracks the current page and vertical position while lines are placed.
struct PageCursor<'c> {
    config: &'c PageConfig,
    pages: Vec<LayoutPage>,
    elements: Vec<LayoutElement>,
    y: f64,
}

impl<'c> PageCursor<'c> {
    fn new(config: &'c PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            elements: Vec::new(),
            y: config.margin,
        }
    }

    fn page_index(&self) -> usize {
        self.pages.len()
    }

    /// Open a new page if the next line would not fit. Returns whether a
    /// break happened.
    fn ensure_room(&mut self) -> bool {
        let decision = page_break::decide_break(
            self.y,
            self.config.line_height,
            self.config.content_bottom(),
        );
        if decision == BreakDecision::NewPage {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn new_page(&mut self) {
        let page = self.finalize();
        log::debug!(
            "page {} full with {} elements",
            page.index + 1,
            page.elements.len()
        );
        self.pages.push(page);
        self.y = self.config.margin;
    }

    fn finalize(&mut self) -> LayoutPage {
        LayoutPage {
            index: self.page_index(),
            width: self.config.width(),
            height: self.config.height(),
            elements: std::mem::take(&mut self.elements),
        }
    }

    fn push(&mut self, element: LayoutElement) {
        self.elements.push(element);
    }

    fn into_pages(mut self) -> Vec<LayoutPage> {
        let last = self.finalize();
        self.pages.push(last);
        self.pages
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine {
    text_layout: TextLayout,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            text_layout: TextLayout::new(),
        }
    }

    /// Lay out `lines` onto pages. Always returns at least one page.
    ///
    /// Fails only when the page configuration is unusable or the measurer
    /// fails.
    pub fn layout(
        &self,
        lines: &[ParsedLine],
        config: &PageConfig,
        measurer: &dyn TextMeasurer,
        logo: Option<&LoadedImage>,
    ) -> Result<Vec<LayoutPage>, OfferError> {
        config.validate()?;
        let mut cursor = PageCursor::new(config);

        if let Some(image) = logo {
            self.place_letterhead(&mut cursor, image);
        }

        for line in lines {
            self.layout_line(&mut cursor, line, measurer)?;
        }

        let pages = cursor.into_pages();
        log::debug!("laid out {} lines on {} pages", lines.len(), pages.len());
        Ok(pages)
    }

    fn place_letterhead(&self, cursor: &mut PageCursor<'_>, image: &LoadedImage) {
        let config = cursor.config;
        if image.width_px == 0 || image.height_px == 0 {
            log::warn!("letterhead logo has no pixels; skipping");
            return;
        }
        let (width, height) = fit_logo(
            image.aspect_ratio(),
            config.letterhead.max_width,
            config.letterhead.max_height,
        );
        cursor.push(LayoutElement {
            x: config.margin,
            y: cursor.y,
            width,
            height,
            draw: DrawCommand::Image {
                image_data: image.clone(),
            },
        });
        cursor.y += height + config.letterhead.gap;
    }

    fn layout_line(
        &self,
        cursor: &mut PageCursor<'_>,
        line: &ParsedLine,
        measurer: &dyn TextMeasurer,
    ) -> Result<(), OfferError> {
        let config = cursor.config;
        let line_height = config.line_height;
        let left = config.margin;
        let content_width = config.content_width();

        cursor.ensure_room();

        let mut x = match line.align {
            TextAlign::Left => left,
            align => {
                let mut total = 0.0;
                for segment in line.segments.iter().filter(|s| !s.is_break()) {
                    let (variant, size) = self.font_for(segment, config, measurer)?;
                    total += measurer.measure(&segment.text, variant, size)?;
                }
                let offset = match align {
                    TextAlign::Center => (content_width - total) / 2.0,
                    _ => content_width - total,
                };
                left + offset.max(0.0)
            }
        };

        for segment in line.segments.iter().filter(|s| !s.is_break()) {
            let (variant, font_size) = self.font_for(segment, config, measurer)?;
            let color = parse_color(segment.color.as_deref().unwrap_or(""));
            let remaining = (left + content_width - x).max(0.0);

            let pieces = self.text_layout.break_into_lines(
                measurer,
                &segment.text,
                remaining,
                content_width,
                variant,
                font_size,
            )?;
            let last = pieces.len().saturating_sub(1);

            for (k, piece) in pieces.iter().enumerate() {
                if cursor.ensure_room() {
                    x = left;
                }

                if !piece.is_empty() {
                    cursor.push(LayoutElement {
                        x,
                        y: cursor.y,
                        width: piece.width,
                        height: line_height,
                        draw: DrawCommand::Text {
                            text: piece.text.clone(),
                            variant,
                            font_size,
                            color,
                            underline: segment.underline,
                        },
                    });
                    if segment.underline && piece.width > 0.0 {
                        cursor.push(LayoutElement {
                            x,
                            y: cursor.y + config.underline_offset,
                            width: piece.width,
                            height: UNDERLINE_THICKNESS,
                            draw: DrawCommand::Underline {
                                color,
                                thickness: UNDERLINE_THICKNESS,
                            },
                        });
                    }
                }

                if k < last {
                    cursor.y += line_height;
                    x = left;
                } else {
                    x += piece.width;
                }
            }
        }

        cursor.y += line_height;
        Ok(())
    }

    /// Face and size for a segment. A size at which one glyph would be wider
    /// than the content box is scaled down until that glyph fits.
    fn font_for(
        &self,
        segment: &TextSegment,
        config: &PageConfig,
        measurer: &dyn TextMeasurer,
    ) -> Result<(FontVariant, f64), OfferError> {
        let variant = FontVariant::from_flags(segment.bold, segment.italic);
        let size = segment.font_size.unwrap_or(config.base_font_size);
        let content_width = config.content_width();

        let mut widest: f64 = 0.0;
        for ch in segment.text.chars().filter(|c| !c.is_whitespace()) {
            widest = widest.max(measurer.char_width(ch, variant, size)?);
        }
        if widest > content_width {
            let fitted = size * content_width / widest;
            log::debug!("shrinking {}pt text to {:.2}pt to fit one glyph per line", size, fitted);
            return Ok((variant, fitted));
        }
        Ok((variant, size))
    }
}

/// Scale an image with the given height-over-width `aspect` into a
/// `max_width` x `max_height` box. Width is fitted first; if that leaves the
/// image too tall it is fitted to the height instead.
pub fn fit_logo(aspect: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    let width = max_width;
    let height = width * aspect;
    if height > max_height {
        (max_height / aspect, max_height)
    } else {
        (width, height)
    }
}
