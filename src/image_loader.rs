//! # Letterhead Logo Loading
//!
//! Resolves `branding.logoUrl` into pixels the PDF writer can embed. A logo
//! may be a data URI, raw base64, or a local file. Remote URLs belong to the
//! blob-storage layer and are never fetched here.
//!
//! JPEG bytes pass straight through (PDF decodes DCT natively). PNG is
//! decoded and split into RGB plus an optional alpha soft mask.

use std::io::Cursor;

use base64::Engine;

use crate::error::OfferError;

/// A decoded image ready for embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Height over width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height_px as f64 / self.width_px as f64
    }
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG stream, embedded with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// 8-bit RGB samples and, when any pixel is translucent, 8-bit alpha.
    Decoded {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Where a logo reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoSource<'a> {
    /// No logo configured.
    None,
    /// `http://` or `https://`, served by blob storage.
    Remote(&'a str),
    /// `data:image/...;base64,<payload>`; holds the whole URI.
    DataUri(&'a str),
    /// An explicit filesystem path.
    File(&'a str),
    /// Anything else is taken to be bare base64.
    Base64(&'a str),
}

impl<'a> LogoSource<'a> {
    pub fn classify(src: &'a str) -> Self {
        let src = src.trim();
        if src.is_empty() {
            LogoSource::None
        } else if src.starts_with("http://") || src.starts_with("https://") {
            LogoSource::Remote(src)
        } else if src.starts_with("data:") {
            LogoSource::DataUri(src)
        } else if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
            // Base64 contains '/', so only explicit path prefixes count.
            LogoSource::File(src)
        } else {
            LogoSource::Base64(src)
        }
    }
}

/// Load the letterhead logo, or `None` when there is nothing usable.
///
/// The letterhead is optional decoration: every failure is logged and the
/// letter renders without it.
pub fn load_logo(logo_url: &str) -> Option<LoadedImage> {
    let source = LogoSource::classify(logo_url);
    let result = match source {
        LogoSource::None => return None,
        LogoSource::Remote(url) => {
            log::warn!("skipping remote logo {}: only embedded or local images are rendered", url);
            return None;
        }
        other => load_image(other),
    };

    match result {
        Ok(image) if image.width_px == 0 || image.height_px == 0 => {
            log::warn!("skipping logo with zero-sized dimensions");
            None
        }
        Ok(image) => {
            log::debug!("loaded logo {}x{} px", image.width_px, image.height_px);
            Some(image)
        }
        Err(e) => {
            log::warn!("skipping letterhead logo: {}", e);
            None
        }
    }
}

/// Load and decode an image from a classified source.
pub fn load_image(source: LogoSource<'_>) -> Result<LoadedImage, OfferError> {
    let bytes = read_source_bytes(source)?;
    decode_image_bytes(&bytes)
}

fn read_source_bytes(source: LogoSource<'_>) -> Result<Vec<u8>, OfferError> {
    match source {
        LogoSource::None => Err(OfferError::Image("no image reference".to_string())),
        LogoSource::Remote(url) => Err(OfferError::Image(format!(
            "remote image '{}' must be resolved by the caller",
            url
        ))),
        LogoSource::DataUri(uri) => {
            let (header, payload) = uri
                .split_once(',')
                .ok_or_else(|| OfferError::Image("invalid data URI: missing comma".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(OfferError::Image(
                    "only base64 data URIs are supported".to_string(),
                ));
            }
            base64_decode(payload)
        }
        LogoSource::File(path) => read_file(path),
        LogoSource::Base64(data) => base64_decode(data),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_file(path: &str) -> Result<Vec<u8>, OfferError> {
    std::fs::read(path)
        .map_err(|e| OfferError::Image(format!("failed to read image file '{}': {}", path, e)))
}

#[cfg(target_arch = "wasm32")]
fn read_file(path: &str) -> Result<Vec<u8>, OfferError> {
    Err(OfferError::Image(format!(
        "file path images are not available in WASM: '{}'",
        path
    )))
}

fn base64_decode(input: &str) -> Result<Vec<u8>, OfferError> {
    // Data URIs copied out of HTML are often wrapped.
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| OfferError::Image(format!("base64 decode error: {}", e)))
}

/// Sniff the format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, OfferError> {
    if data.is_empty() {
        return Err(OfferError::Image("image data is empty".to_string()));
    }
    if data.starts_with(&[0xFF, 0xD8]) {
        decode_jpeg(data)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        decode_png(data)
    } else {
        Err(OfferError::Image(
            "unsupported image format (expected JPEG or PNG)".to_string(),
        ))
    }
}

fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, OfferError> {
    let (width_px, height_px) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| OfferError::Image(format!("JPEG format detection failed: {}", e)))?
        .into_dimensions()
        .map_err(|e| OfferError::Image(format!("failed to read JPEG dimensions: {}", e)))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: jpeg_color_space(data),
        },
        width_px,
        height_px,
    })
}

/// Walk the JPEG marker segments up to the first start-of-frame and read
/// its component count. Unknown layouts are assumed RGB.
fn jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut pos = 2;
    while let [0xFF, marker, len_hi, len_lo, ..] = data.get(pos..).unwrap_or(&[]) {
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            return match data.get(pos + 9) {
                Some(1) => JpegColorSpace::DeviceGray,
                _ => JpegColorSpace::DeviceRGB,
            };
        }
        pos += 2 + u16::from_be_bytes([*len_hi, *len_lo]) as usize;
    }
    JpegColorSpace::DeviceRGB
}

fn decode_png(data: &[u8]) -> Result<LoadedImage, OfferError> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| OfferError::Image(format!("failed to decode PNG: {}", e)))?;
    let rgba = decoded.to_rgba8();
    let (width_px, height_px) = rgba.dimensions();

    let samples = rgba.as_raw();
    let mut rgb = Vec::with_capacity(samples.len() / 4 * 3);
    let mut alpha = Vec::with_capacity(samples.len() / 4);
    for px in samples.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
        alpha.push(px[3]);
    }
    let translucent = alpha.iter().any(|&a| a != u8::MAX);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: translucent.then_some(alpha),
        },
        width_px,
        height_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(pixel: [u8; 4], w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(pixel));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    fn jpeg_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();
        buf
    }

    #[test]
    fn test_classify_sources() {
        assert_eq!(LogoSource::classify(""), LogoSource::None);
        assert_eq!(LogoSource::classify("   "), LogoSource::None);
        assert!(matches!(
            LogoSource::classify("https://cdn.test/logo.png"),
            LogoSource::Remote(_)
        ));
        assert!(matches!(
            LogoSource::classify("data:image/png;base64,AAAA"),
            LogoSource::DataUri(_)
        ));
        assert!(matches!(LogoSource::classify("./logo.png"), LogoSource::File(_)));
        assert!(matches!(LogoSource::classify("iVBORw0KGgo="), LogoSource::Base64(_)));
    }

    #[test]
    fn test_empty_and_remote_logos_skipped() {
        assert!(load_logo("").is_none());
        assert!(load_logo("https://cdn.test/logo.png").is_none());
    }

    #[test]
    fn test_undecodable_logo_skipped() {
        assert!(load_logo("data:image/png;base64,!!!").is_none());
        assert!(load_logo("data:image/png;base64").is_none());
        assert!(load_logo("./definitely/not/here.png").is_none());
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            decode_image_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04]),
            Err(OfferError::Image(_))
        ));
        assert!(decode_image_bytes(&[]).is_err());
    }

    #[test]
    fn test_decode_opaque_png() {
        let loaded = decode_image_bytes(&png_bytes([255, 0, 0, 255], 1, 1)).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (1, 1));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert!(alpha.is_none());
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_png_with_alpha() {
        let loaded = decode_image_bytes(&png_bytes([0, 0, 255, 128], 1, 1)).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.as_deref(), Some(&[128u8][..]));
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_jpeg_passthrough() {
        let bytes = jpeg_bytes();
        let loaded = decode_image_bytes(&bytes).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (2, 2));
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert_eq!(data, &bytes);
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_data_uri_logo() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 255, 0, 255], 4, 2));
        let logo = load_logo(&format!("data:image/png;base64,{}", b64)).unwrap();
        assert_eq!((logo.width_px, logo.height_px), (4, 2));
        assert!((logo.aspect_ratio() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_raw_base64_logo() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes([0, 0, 0, 255], 3, 3));
        assert!(load_logo(&b64).is_some());
    }
}
