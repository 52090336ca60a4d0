//! # Markup Parser
//!
//! Turns letter markup into lines of styled text segments.
//!
//! The walk is a pure recursive function: each element derives a new
//! [`Formatting`] from its parent's and hands it to its children. Block
//! elements and `<br>` emit break markers into a flat stream, which
//! [`group_lines`] then folds into [`ParsedLine`]s.
//!
//! Grouping rule for break markers:
//!
//! - A block boundary (before or after a `p`, `div`, heading, list or list
//!   item) only ends a line that has content. Adjacent blocks never produce
//!   blank lines between them.
//! - An explicit `<br>` ends a line with content, and on an empty line emits
//!   a blank line (one space segment), so `<p><br></p>` keeps its vertical
//!   gap. A `<br>` before any content at all is absorbed.

pub mod tree;

use crate::style::{Formatting, TextAlign};
use tree::{Element, MarkupNode};

/// A run of text sharing one formatting context.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Points. `None` means the page's base size.
    pub font_size: Option<f64>,
    /// Unresolved color expression.
    pub color: Option<String>,
    pub align: Option<TextAlign>,
    /// Set on markers produced by block boundaries and `<br>`; such a
    /// segment carries no text.
    pub line_break: Option<BreakKind>,
}

/// Where a break marker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Block element boundary.
    Block,
    /// Explicit `<br>`.
    Explicit,
}

impl TextSegment {
    /// An unstyled text segment.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, &Formatting::default())
    }

    fn styled(text: impl Into<String>, fmt: &Formatting) -> Self {
        Self {
            text: text.into(),
            bold: fmt.bold,
            italic: fmt.italic,
            underline: fmt.underline,
            font_size: fmt.font_size,
            color: fmt.color.clone(),
            align: fmt.align,
            line_break: None,
        }
    }

    fn marker(kind: BreakKind) -> Self {
        Self {
            line_break: Some(kind),
            ..Self::plain("")
        }
    }

    pub fn is_break(&self) -> bool {
        self.line_break.is_some()
    }
}

/// One logical line: its segments and the alignment applied to all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub segments: Vec<TextSegment>,
    pub align: TextAlign,
}

impl ParsedLine {
    fn from_segments(segments: Vec<TextSegment>) -> Self {
        let align = segments
            .iter()
            .find_map(|s| s.align)
            .unwrap_or_default();
        Self { segments, align }
    }

    fn blank() -> Self {
        Self::from_segments(vec![TextSegment::plain(" ")])
    }

    /// Concatenated text of every segment.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul", "ol",
];

/// Subtrees whose text never reaches the page.
const HIDDEN_TAGS: &[&str] = &["script", "style", "head", "title"];

/// Parse letter markup into lines. Always returns at least one line.
pub fn parse_markup(input: &str) -> Vec<ParsedLine> {
    if !tree::contains_tag(input) {
        return parse_plain_text(input);
    }

    let nodes = tree::parse_fragment(input);
    let mut stream = Vec::new();
    let root = Formatting::default();
    for node in &nodes {
        walk(node, &root, &mut stream);
    }

    let lines = group_lines(stream);
    log::debug!("parsed markup into {} lines", lines.len());
    lines
}

/// Input without markup: one unstyled line per newline-separated row.
fn parse_plain_text(input: &str) -> Vec<ParsedLine> {
    input
        .split('\n')
        .map(|row| {
            let row = row.strip_suffix('\r').unwrap_or(row);
            if row.is_empty() {
                ParsedLine::blank()
            } else {
                ParsedLine::from_segments(vec![TextSegment::plain(row)])
            }
        })
        .collect()
}

fn walk(node: &MarkupNode, inherited: &Formatting, out: &mut Vec<TextSegment>) {
    match node {
        MarkupNode::Text(text) => {
            if !text.is_empty() {
                out.push(TextSegment::styled(text.as_str(), inherited));
            }
        }
        MarkupNode::Element(el) => walk_element(el, inherited, out),
    }
}

fn walk_element(el: &Element, inherited: &Formatting, out: &mut Vec<TextSegment>) {
    let tag = el.tag.as_str();
    if HIDDEN_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        out.push(TextSegment::marker(BreakKind::Explicit));
        return;
    }

    let classes = el.classes();
    let fmt = inherited.derive(tag, &classes, el.attr("style"));
    let is_block = BLOCK_TAGS.contains(&tag);

    if is_block {
        out.push(TextSegment::marker(BreakKind::Block));
    }
    for child in &el.children {
        walk(child, &fmt, out);
    }
    if is_block {
        out.push(TextSegment::marker(BreakKind::Block));
    }
}

/// Fold a flat segment stream into lines.
pub fn group_lines(stream: Vec<TextSegment>) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    let mut current: Vec<TextSegment> = Vec::new();
    let mut seen_content = false;

    for segment in stream {
        match segment.line_break {
            None => {
                seen_content = true;
                current.push(segment);
            }
            Some(kind) => {
                if !current.is_empty() {
                    lines.push(ParsedLine::from_segments(std::mem::take(&mut current)));
                } else if kind == BreakKind::Explicit && seen_content {
                    lines.push(ParsedLine::blank());
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(ParsedLine::from_segments(current));
    }

    if lines.is_empty() {
        lines.push(ParsedLine::blank());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(lines: &[ParsedLine]) -> Vec<String> {
        lines.iter().map(ParsedLine::text).collect()
    }

    #[test]
    fn test_two_paragraphs_two_lines() {
        let lines = parse_markup("<p>Hello</p><p>World</p>");
        assert_eq!(
            lines,
            vec![
                ParsedLine {
                    segments: vec![TextSegment::plain("Hello")],
                    align: TextAlign::Left,
                },
                ParsedLine {
                    segments: vec![TextSegment::plain("World")],
                    align: TextAlign::Left,
                },
            ]
        );
    }

    #[test]
    fn test_nested_bold_italic() {
        let lines = parse_markup("<p><strong><em>Hi</em></strong></p>");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].segments.len(), 1);
        let seg = &lines[0].segments[0];
        assert!(seg.bold);
        assert!(seg.italic);
        assert!(!seg.underline);
    }

    #[test]
    fn test_plain_text_splits_rows() {
        let lines = parse_markup("Dear Jane,\n\nWelcome.");
        assert_eq!(texts(&lines), vec!["Dear Jane,", " ", "Welcome."]);
    }

    #[test]
    fn test_plain_text_crlf() {
        let lines = parse_markup("a\r\nb");
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input_yields_blank_line() {
        assert_eq!(parse_markup(""), vec![ParsedLine::blank()]);
        assert_eq!(parse_markup("<p></p>"), vec![ParsedLine::blank()]);
    }

    #[test]
    fn test_inline_runs_share_line() {
        let lines = parse_markup("<p>Hi <b>Jane</b>, <u>welcome</u></p>");
        assert_eq!(lines.len(), 1);
        let segs = &lines[0].segments;
        assert_eq!(segs.len(), 4);
        assert!(!segs[0].bold);
        assert!(segs[1].bold);
        assert!(segs[3].underline);
    }

    #[test]
    fn test_br_splits_and_blank_line() {
        let lines = parse_markup("<p>one<br>two</p><p><br></p><p>three</p>");
        assert_eq!(texts(&lines), vec!["one", "two", " ", "three"]);
    }

    #[test]
    fn test_leading_br_absorbed() {
        let lines = parse_markup("<br><p>x</p>");
        assert_eq!(texts(&lines), vec!["x"]);
    }

    #[test]
    fn test_headings() {
        let lines = parse_markup("<h1>Offer</h1><h4>Terms</h4><p>Body</p>");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].segments[0].font_size, Some(24.0));
        assert!(lines[0].segments[0].bold);
        assert_eq!(lines[1].segments[0].font_size, Some(14.0));
        assert_eq!(lines[2].segments[0].font_size, None);
    }

    #[test]
    fn test_innermost_size_wins() {
        let lines = parse_markup(
            r#"<h2><span style="font-size: 9px">small</span><span class="ql-size-huge">big</span></h2>"#,
        );
        let segs = &lines[0].segments;
        assert_eq!(segs[0].font_size, Some(9.0));
        assert_eq!(segs[1].font_size, Some(20.0));
        assert!(segs[0].bold && segs[1].bold);
    }

    #[test]
    fn test_color_sources() {
        let lines = parse_markup(
            r#"<p><span style="color: rgb(1, 2, 3)">a</span><span class="ql-color-abcdef">b</span>c</p>"#,
        );
        let segs = &lines[0].segments;
        assert_eq!(segs[0].color.as_deref(), Some("rgb(1, 2, 3)"));
        assert_eq!(segs[1].color.as_deref(), Some("#abcdef"));
        assert_eq!(segs[2].color, None);
    }

    #[test]
    fn test_line_alignment_from_first_aligned_segment() {
        let lines = parse_markup(r#"<p class="ql-align-center">Title</p><p style="text-align: right">Sig</p>"#);
        assert_eq!(lines[0].align, TextAlign::Center);
        assert_eq!(lines[1].align, TextAlign::Right);
    }

    #[test]
    fn test_list_items_own_lines() {
        let lines = parse_markup("<ul><li>One</li><li>Two</li></ul>");
        assert_eq!(texts(&lines), vec!["One", "Two"]);
    }

    #[test]
    fn test_whitespace_text_nodes_kept() {
        let lines = parse_markup("<div>\n  <p>x</p>\n</div>");
        assert_eq!(texts(&lines), vec!["\n  ", "x", "\n"]);
    }

    #[test]
    fn test_hidden_subtrees_skipped() {
        let lines = parse_markup("<style>p { color: red }</style><p>x</p>");
        assert_eq!(texts(&lines), vec!["x"]);
    }

    #[test]
    fn test_trailing_text_after_block() {
        let lines = parse_markup("<p>a</p>tail");
        assert_eq!(texts(&lines), vec!["a", "tail"]);
    }

    #[test]
    fn test_literal_less_than_in_markup() {
        let lines = parse_markup("<p>Salary < 100k per year</p><p>Second paragraph</p>");
        assert_eq!(texts(&lines), vec!["Salary < 100k per year", "Second paragraph"]);
    }

    #[test]
    fn test_plain_text_with_less_than() {
        let lines = parse_markup("Base pay <3 bonus\nSecond line");
        assert_eq!(texts(&lines), vec!["Base pay <3 bonus", "Second line"]);
    }
}
