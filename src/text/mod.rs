//! # Text Layout
//!
//! Greedy line breaking for a single styled run.
//!
//! Break opportunities come from UAX#14, so words are only split when a
//! single word is wider than a whole line. Widths come from the
//! [`TextMeasurer`], never from character counts.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::error::OfferError;
use crate::font::TextMeasurer;
use crate::style::FontVariant;

/// Tolerance for width comparisons.
const WIDTH_EPSILON: f64 = 1e-9;

/// One wrapped piece of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Measured width in millimetres.
    pub width: f64,
}

impl WrappedLine {
    fn empty() -> Self {
        Self {
            text: String::new(),
            width: 0.0,
        }
    }

    /// True for the placeholder emitted when nothing fit on the first line.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity *before* `chars[i]`. Index 0 is always
/// `None`, and the end-of-text break is dropped.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_breaking_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Wrap `text` so the first line fits in `first_width` and every later
    /// line fits in `max_width`.
    ///
    /// When not even the first word fits in `first_width` (the run starts
    /// part-way along a line) and `first_width` is narrower than
    /// `max_width`, the first returned line is empty: the caller moves to a
    /// fresh line before placing anything. Newlines are mandatory breaks.
    /// Trailing spaces are dropped from every line that ends in a wrap.
    pub fn break_into_lines(
        &self,
        measurer: &dyn TextMeasurer,
        text: &str,
        first_width: f64,
        max_width: f64,
        variant: FontVariant,
        font_size: f64,
    ) -> Result<Vec<WrappedLine>, OfferError> {
        if text.is_empty() {
            return Ok(vec![WrappedLine::empty()]);
        }

        let chars: Vec<char> = text.chars().collect();
        let widths = chars
            .iter()
            .map(|&ch| {
                if is_newline(ch) {
                    Ok(0.0)
                } else {
                    measurer.char_width(ch, variant, font_size)
                }
            })
            .collect::<Result<Vec<f64>, OfferError>>()?;
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;
        let mut limit = first_width.min(max_width);

        for (i, &ch) in chars.iter().enumerate() {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(make_line(&chars[line_start..i], &widths[line_start..i], true));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                    limit = max_width;
                }
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i),
                None => {}
            }

            if is_newline(ch) {
                continue;
            }
            // Spaces never push a line over; they are trimmed at the wrap.
            if is_breaking_space(ch) {
                line_width += widths[i];
                continue;
            }

            let char_width = widths[i];
            while line_width + char_width > limit + WIDTH_EPSILON {
                if let Some(bp) = last_break_point.filter(|&bp| bp > line_start) {
                    lines.push(make_line(&chars[line_start..bp], &widths[line_start..bp], true));
                    line_start = bp;
                    line_width = widths[bp..i].iter().sum();
                    last_break_point = None;
                    limit = max_width;
                    continue;
                }

                if lines.is_empty() && limit < max_width {
                    // The word would have to be split inside the remainder of
                    // a partly used line. Start it on a fresh line instead.
                    lines.push(WrappedLine::empty());
                    limit = max_width;
                    continue;
                }

                if line_start == i {
                    // A lone glyph wider than the line. Nothing left to split.
                    break;
                }

                // A single word wider than the line: split it here.
                lines.push(make_line(&chars[line_start..i], &widths[line_start..i], true));
                line_start = i;
                line_width = 0.0;
                last_break_point = None;
                limit = max_width;
            }

            line_width += char_width;
        }

        let mut last = make_line(&chars[line_start..], &widths[line_start..], false);
        trim_overflowing_spaces(&mut last, &chars[line_start..], &widths[line_start..], limit);
        lines.push(last);

        Ok(lines)
    }
}

/// Build a line from a char range, dropping newline characters. A wrapped
/// line also loses its trailing spaces.
fn make_line(chars: &[char], widths: &[f64], wrapped: bool) -> WrappedLine {
    let mut end = chars.len();
    if wrapped {
        while end > 0 && (is_breaking_space(chars[end - 1]) || is_newline(chars[end - 1])) {
            end -= 1;
        }
    }
    let text: String = chars[..end].iter().filter(|c| !is_newline(**c)).collect();
    let width = widths[..end].iter().sum();
    WrappedLine { text, width }
}

/// The final line keeps its trailing spaces (the next run continues on the
/// same line) unless they are what pushes it past the limit.
fn trim_overflowing_spaces(line: &mut WrappedLine, chars: &[char], widths: &[f64], limit: f64) {
    let mut end = chars.len();
    while line.width > limit + WIDTH_EPSILON && end > 0 && is_breaking_space(chars[end - 1]) {
        end -= 1;
        line.width -= widths[end];
        line.text.pop();
    }
}
