//! Owned markup tree built from an HTML-like fragment.
//!
//! Editor output is HTML, not XML: void tags go unclosed, end tags can be
//! missing or stray, and named entities like `&nbsp;` show up. The reader runs
//! with end-name checking off and we rebuild nesting ourselves, closing
//! back to the nearest matching open element the way a browser would.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A node in a parsed fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Lowercased tag name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "col", "area", "base", "wbr", "source",
];

fn is_void(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Whether `rest`, the text just after a `<`, opens a tag, end tag,
/// comment or declaration. Anything else is a literal `<`.
fn opens_tag(rest: &str) -> bool {
    rest.bytes()
        .next()
        .map_or(false, |b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Whether the input holds any markup at all.
pub fn contains_tag(input: &str) -> bool {
    input.match_indices('<').any(|(i, _)| opens_tag(&input[i + 1..]))
}

/// Escape every `<` that cannot start a tag, so `Salary < 100k` and `<3`
/// stay text instead of stopping the reader.
fn escape_stray_angles(input: &str) -> Cow<'_, str> {
    if !input.match_indices('<').any(|(i, _)| !opens_tag(&input[i + 1..])) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    let mut last = 0;
    for (i, _) in input.match_indices('<') {
        if !opens_tag(&input[i + 1..]) {
            out.push_str(&input[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
    }
    out.push_str(&input[last..]);
    Cow::Owned(out)
}

/// Parse a markup fragment into its top-level nodes.
///
/// Never fails. On a syntax error the nodes read so far are kept and the
/// rest of the input is dropped with a warning.
pub fn parse_fragment(input: &str) -> Vec<MarkupNode> {
    let input = escape_stray_angles(input);
    let mut reader = Reader::from_str(&input);
    {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
    }

    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = start_element(&e);
                if is_void(&element.tag) {
                    builder.append(MarkupNode::Element(element));
                } else {
                    builder.open.push(element);
                }
            }
            Ok(Event::Empty(e)) => {
                builder.append(MarkupNode::Element(start_element(&e)));
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if !is_void(&tag) {
                    builder.close(&tag);
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(&e);
                builder.append_text(decode_entities(&raw).into_owned());
            }
            Ok(Event::CData(e)) => {
                builder.append_text(String::from_utf8_lossy(&e).into_owned());
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                log::warn!(
                    "markup parsing stopped at byte {}: {}",
                    reader.error_position(),
                    err
                );
                break;
            }
            // Comments, declarations, processing instructions, doctype.
            Ok(_) => {}
        }
    }

    builder.finish()
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<MarkupNode>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn append(&mut self, node: MarkupNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn append_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.append(MarkupNode::Text(text));
    }

    /// Close the innermost open element named `tag` and everything opened
    /// inside it. A stray end tag is ignored.
    fn close(&mut self, tag: &str) {
        let Some(idx) = self.open.iter().rposition(|el| el.tag == tag) else {
            log::debug!("ignoring unmatched </{}>", tag);
            return;
        };
        while self.open.len() > idx {
            if let Some(el) = self.open.pop() {
                self.append(MarkupNode::Element(el));
            }
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while let Some(el) = self.open.pop() {
            self.append(MarkupNode::Element(el));
        }
        self.roots
    }
}

fn start_element(e: &BytesStart<'_>) -> Element {
    let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
    let attributes = e
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = decode_entities(&raw).into_owned();
            (key, value)
        })
        .collect();
    Element {
        tag,
        attributes,
        children: Vec::new(),
    }
}

/// Resolve character references one at a time. A bare `&` or an unknown
/// reference stays as written without affecting its neighbours.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let reference = tail.find(';').map(|semi| &tail[..=semi]).filter(|r| {
            let name = &r[1..r.len() - 1];
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
        });
        match reference.map(|r| (r, quick_xml::escape::unescape_with(r, html_entity))) {
            Some((r, Ok(text))) => {
                out.push_str(&text);
                rest = &tail[r.len()..];
            }
            other => {
                if let Some((r, Err(err))) = other {
                    log::debug!("keeping undecodable reference {:?}: {}", r, err);
                }
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn html_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bull" => "\u{2022}",
        "euro" => "\u{20ac}",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &MarkupNode) -> &Element {
        match node {
            MarkupNode::Element(el) => el,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_elements() {
        let nodes = parse_fragment("<p>Hi <strong>there</strong></p>");
        assert_eq!(nodes.len(), 1);
        let p = element(&nodes[0]);
        assert_eq!(p.tag, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(p.children[0], MarkupNode::Text("Hi ".to_string()));
        assert_eq!(element(&p.children[1]).tag, "strong");
    }

    #[test]
    fn test_unclosed_br_is_void() {
        let nodes = parse_fragment("<p>a<br>b</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children.len(), 3);
        assert_eq!(element(&p.children[1]).tag, "br");
        assert_eq!(p.children[2], MarkupNode::Text("b".to_string()));
    }

    #[test]
    fn test_attributes_and_classes() {
        let nodes = parse_fragment(r#"<p class="ql-align-center  ql-size-large" style="color: #ff0000">x</p>"#);
        let p = element(&nodes[0]);
        assert_eq!(p.classes(), vec!["ql-align-center", "ql-size-large"]);
        assert_eq!(p.attr("style"), Some("color: #ff0000"));
        assert_eq!(p.attr("id"), None);
    }

    #[test]
    fn test_uppercase_tags_are_lowered() {
        let nodes = parse_fragment("<P>x</P>");
        assert_eq!(element(&nodes[0]).tag, "p");
    }

    #[test]
    fn test_entities_decoded() {
        let nodes = parse_fragment("<p>A&amp;B&nbsp;C &copy; &#65;</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children[0], MarkupNode::Text("A&B\u{a0}C \u{a9} A".to_string()));
    }

    #[test]
    fn test_unknown_entity_kept_literal() {
        let nodes = parse_fragment("<p>Fish &chips;</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children[0], MarkupNode::Text("Fish &chips;".to_string()));
    }

    #[test]
    fn test_bare_ampersand_does_not_block_decoding() {
        let nodes = parse_fragment("<p>R&D and &amp; team &copy</p>");
        let p = element(&nodes[0]);
        assert_eq!(p.children[0], MarkupNode::Text("R&D and & team &copy".to_string()));
    }

    #[test]
    fn test_literal_angle_bracket_kept() {
        let nodes = parse_fragment("<p>a < b <3</p><p>next</p>");
        assert_eq!(nodes.len(), 2);
        let p = element(&nodes[0]);
        assert_eq!(p.children[0], MarkupNode::Text("a < b <3".to_string()));
    }

    #[test]
    fn test_contains_tag() {
        assert!(contains_tag("<p>x</p>"));
        assert!(contains_tag("x<br/>y"));
        assert!(!contains_tag("Base pay <3 bonus"));
        assert!(!contains_tag("a < b"));
        assert!(!contains_tag("trailing <"));
    }

    #[test]
    fn test_mismatched_end_closes_inner() {
        let nodes = parse_fragment("<p><strong>bold</p><p>next</p>");
        assert_eq!(nodes.len(), 2);
        let first = element(&nodes[0]);
        assert_eq!(element(&first.children[0]).tag, "strong");
        assert_eq!(element(&nodes[1]).tag, "p");
    }

    #[test]
    fn test_stray_end_ignored() {
        let nodes = parse_fragment("</div><p>x</p>");
        assert_eq!(nodes.len(), 1);
        assert_eq!(element(&nodes[0]).tag, "p");
    }

    #[test]
    fn test_unclosed_at_eof() {
        let nodes = parse_fragment("<p>open");
        let p = element(&nodes[0]);
        assert_eq!(p.children[0], MarkupNode::Text("open".to_string()));
    }

    #[test]
    fn test_comments_skipped() {
        let nodes = parse_fragment("<!-- note --><p>x</p>");
        assert_eq!(nodes.len(), 1);
    }
}
