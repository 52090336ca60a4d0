//! # PDF Serializer
//!
//! Takes laid-out pages and writes a PDF 1.7 file by hand. Letters only
//! need a handful of object kinds, so the writer stays small:
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj Catalog
//! 2 0 obj Pages
//! 3.. fonts, images, then per page: content stream + Page
//! Info dictionary
//! xref / trailer / %%EOF
//! ```
//!
//! Fonts are the standard Type1 faces with WinAnsiEncoding, so nothing is
//! embedded. Layout works in millimetres from the top-left; PDF user space is
//! points from the bottom-left, so every coordinate is converted and flipped
//! here.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::OfferError;
use crate::font::{mm_to_pt, FontContext, StandardFont};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawCommand, LayoutElement, LayoutPage};
use crate::style::{FontVariant, Rgb};

/// Document Info entries.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Font faces in resource order: `/F0`, `/F1`, ...
    font_objects: Vec<(StandardFont, usize)>,
    /// Image XObject ids in resource order: `/Im0`, `/Im1`, ...
    image_objects: Vec<usize>,
    /// (page index, element index) -> image resource index.
    image_index_map: HashMap<(usize, usize), usize>,
}

impl PdfBuilder {
    fn alloc(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &Metadata,
        fonts: &FontContext,
    ) -> Result<Vec<u8>, OfferError> {
        if pages.is_empty() {
            return Err(OfferError::Render("document has no pages".to_string()));
        }

        // 0 is the free-list head, 1 the Catalog, 2 the page tree.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        self.register_fonts(&mut builder, pages, fonts);
        self.register_images(&mut builder, pages);

        let font_resources = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, id))| format!("/F{} {} 0 R", i, id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder, fonts);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data = Vec::new();
            write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            )?;
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.alloc(content_data);

            let xobjects = self.build_xobject_resource_dict(page_idx, &builder);
            let resources = if xobjects.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobjects)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                mm_to_pt(page.width),
                mm_to_pt(page.height),
                content_obj_id,
                resources
            );
            page_obj_ids.push(builder.alloc(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.alloc(Self::info_dictionary(metadata).into_bytes());

        Ok(self.serialize(&builder, info_obj_id))
    }

    fn info_dictionary(metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        let entries = [
            ("Title", &metadata.title),
            ("Author", &metadata.author),
            ("Subject", &metadata.subject),
        ];
        for (key, value) in entries {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                let _ = write!(info, "/{} ({}) ", key, Self::encode_text(value));
            }
        }
        let _ = write!(
            info,
            "/Producer (offerdoc {}) /Creator (offerdoc) >>",
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// One Type1 font object per face used anywhere in the document.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage], fonts: &FontContext) {
        let mut used: BTreeSet<StandardFont> = pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|el| match &el.draw {
                DrawCommand::Text { variant, .. } => Some(fonts.resolve(*variant)),
                _ => None,
            })
            .collect();

        // Every page references a font dictionary, so keep at least one.
        if used.is_empty() {
            used.insert(fonts.resolve(FontVariant::Regular));
        }

        for font in used {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let id = builder.alloc(font_dict.into_bytes());
            builder.font_objects.push((font, id));
        }
    }

    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            for (elem_idx, element) in page.elements.iter().enumerate() {
                if let DrawCommand::Image { image_data } = &element.draw {
                    let img_idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, image_data);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, elem_idx), img_idx);
                }
            }
        }
    }

    /// Write an image as one XObject, plus a soft mask when it has alpha.
    /// Returns the main XObject id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };
                let dict = format!(
                    "/ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    color_space
                );
                builder.alloc(Self::image_stream(image, &dict, data))
            }
            ImagePixelData::Decoded { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    let compressed = compress_to_vec_zlib(alpha, 6);
                    let dict = "/ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode";
                    builder.alloc(Self::image_stream(image, dict, &compressed))
                });
                let compressed = compress_to_vec_zlib(rgb, 6);
                let mut dict =
                    String::from("/ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode");
                if let Some(id) = smask {
                    let _ = write!(dict, " /SMask {} 0 R", id);
                }
                builder.alloc(Self::image_stream(image, &dict, &compressed))
            }
        }
    }

    fn image_stream(image: &LoadedImage, dict: &str, data: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} {} /Length {} >>\nstream\n",
            image.width_px,
            image.height_px,
            dict,
            data.len()
        )
        .into_bytes();
        out.extend_from_slice(data);
        out.extend_from_slice(b"\nendstream");
        out
    }

    fn build_xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_unstable();
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// PDF operators for one page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
        fonts: &FontContext,
    ) -> String {
        let mut stream = String::new();
        let page_height = mm_to_pt(page.height);

        for (elem_idx, element) in page.elements.iter().enumerate() {
            let x = mm_to_pt(element.x);
            match &element.draw {
                DrawCommand::Text {
                    text,
                    variant,
                    font_size,
                    color,
                    ..
                } => {
                    let font_idx = builder.font_index(fonts.resolve(*variant));
                    let baseline = page_height - mm_to_pt(element.y);
                    let _ = write!(
                        stream,
                        "BT\n/F{} {:.2} Tf\n{} rg\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        font_idx,
                        font_size,
                        Self::color_operands(*color),
                        x,
                        baseline,
                        Self::encode_text(text)
                    );
                }
                DrawCommand::Underline { color, thickness } => {
                    let y = page_height - mm_to_pt(element.y);
                    let _ = write!(
                        stream,
                        "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        Self::color_operands(*color),
                        mm_to_pt(*thickness),
                        x,
                        y,
                        x + mm_to_pt(element.width),
                        y
                    );
                }
                DrawCommand::Image { .. } => {
                    Self::write_image_placement(&mut stream, element, page_height, page_idx, elem_idx, builder);
                }
            }
        }

        stream
    }

    fn write_image_placement(
        stream: &mut String,
        element: &LayoutElement,
        page_height: f64,
        page_idx: usize,
        elem_idx: usize,
        builder: &PdfBuilder,
    ) {
        let Some(&img_idx) = builder.image_index_map.get(&(page_idx, elem_idx)) else {
            return;
        };
        let w = mm_to_pt(element.width);
        let h = mm_to_pt(element.height);
        let x = mm_to_pt(element.x);
        let y = page_height - mm_to_pt(element.y) - h;
        let _ = write!(
            stream,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            w, h, x, y, img_idx
        );
    }

    fn color_operands(color: Rgb) -> String {
        let (r, g, b) = color.to_unit();
        format!("{:.3} {:.3} {:.3}", r, g, b)
    }

    /// Encode text as the body of a PDF literal string in WinAnsiEncoding.
    /// Characters outside the encoding become `?`.
    fn encode_text(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is Windows-1252: ASCII and Latin-1 map directly, and
    /// 0x80..=0x9F holds the typographic quotes, dashes and symbols.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80),
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85),
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            // Tabs render as a space rather than a replacement glyph.
            0x09 => Some(b' '),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets = vec![0usize; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            output.extend_from_slice(format!("{} 0 obj\n", i).as_bytes());
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let mut tail = String::new();
        let _ = write!(tail, "xref\n0 {}\n", builder.objects.len());
        tail.push_str("0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(tail, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output.extend_from_slice(tail.as_bytes());
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageConfig;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn blank_page(index: usize) -> LayoutPage {
        let config = PageConfig::default();
        LayoutPage {
            index,
            width: config.width(),
            height: config.height(),
            elements: vec![],
        }
    }

    fn text_element(text: &str, variant: FontVariant) -> LayoutElement {
        LayoutElement {
            x: 20.0,
            y: 20.0,
            width: 30.0,
            height: 7.0,
            draw: DrawCommand::Text {
                text: text.to_string(),
                variant,
                font_size: 12.0,
                color: Rgb::new(255, 0, 0),
                underline: false,
            },
        }
    }

    #[test]
    fn test_encode_text_escapes() {
        assert_eq!(PdfWriter::encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::encode_text("back\\slash"), "back\\\\slash");
        assert_eq!(PdfWriter::encode_text("caf\u{e9}"), "caf\\351");
        assert_eq!(PdfWriter::encode_text("\u{2014}"), "\\227");
        assert_eq!(PdfWriter::encode_text("\u{4e2d}"), "?");
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let bytes = PdfWriter::new()
            .write(&[blank_page(0)], &Metadata::default(), &FontContext::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"xref"));
        assert!(contains(&bytes, b"trailer"));
        assert!(contains(&bytes, b"/BaseFont /Helvetica "));
        // A4 in points.
        assert!(contains(&bytes, b"/MediaBox [0 0 595.28 841.89]"));
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let result = PdfWriter::new().write(&[], &Metadata::default(), &FontContext::default());
        assert!(matches!(result, Err(OfferError::Render(_))));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Offer Letter - Jane".to_string()),
            author: Some("Acme (UK)".to_string()),
            subject: None,
        };
        let bytes = PdfWriter::new()
            .write(&[blank_page(0)], &metadata, &FontContext::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Offer Letter - Jane)"));
        assert!(text.contains("/Author (Acme \\(UK\\))"));
        assert!(!text.contains("/Subject"));
        assert!(text.contains("/Producer (offerdoc "));
    }

    #[test]
    fn test_page_count_in_tree() {
        let pages = vec![blank_page(0), blank_page(1), blank_page(2)];
        let bytes = PdfWriter::new()
            .write(&pages, &Metadata::default(), &FontContext::default())
            .unwrap();
        assert!(contains(&bytes, b"/Count 3"));
    }

    #[test]
    fn test_bold_font_registered_separately() {
        let mut page = blank_page(0);
        page.elements.push(text_element("Regular", FontVariant::Regular));
        page.elements.push(text_element("Bold", FontVariant::Bold));
        let bytes = PdfWriter::new()
            .write(&[page], &Metadata::default(), &FontContext::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold "));
        assert!(text.contains("/F0 "));
        assert!(text.contains("/F1 "));
    }

    #[test]
    fn test_text_operators() {
        let mut page = blank_page(0);
        page.elements.push(text_element("Hi", FontVariant::Regular));
        let builder = PdfBuilder {
            objects: vec![],
            font_objects: vec![(StandardFont::Helvetica, 3)],
            image_objects: vec![],
            image_index_map: HashMap::new(),
        };
        let stream =
            PdfWriter::new().build_content_stream(&page, 0, &builder, &FontContext::default());
        assert!(stream.contains("/F0 12.00 Tf"));
        assert!(stream.contains("1.000 0.000 0.000 rg"));
        // 20mm from the left, 20mm below the top of an A4 page.
        assert!(stream.contains("56.69 785.20 Td"));
        assert!(stream.contains("(Hi) Tj"));
    }

    #[test]
    fn test_image_xobject() {
        let mut page = blank_page(0);
        page.elements.push(LayoutElement {
            x: 20.0,
            y: 20.0,
            width: 60.0,
            height: 20.0,
            draw: DrawCommand::Image {
                image_data: LoadedImage {
                    pixel_data: ImagePixelData::Decoded {
                        rgb: vec![0; 3 * 4],
                        alpha: Some(vec![128; 4]),
                    },
                    width_px: 2,
                    height_px: 2,
                },
            },
        });
        let bytes = PdfWriter::new()
            .write(&[page], &Metadata::default(), &FontContext::default())
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Subtype /Image"));
        assert!(text.contains("/SMask"));
        assert!(text.contains("/XObject << /Im0"));
    }
}
