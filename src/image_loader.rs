//! # Image Loading
//!
//! Resolves an image `src` to its bytes, works out the format from the
//! magic bytes and reads the intrinsic size. Pixels are never decoded: the
//! SVG output embeds the original bytes as a data URI, and the layout only
//! needs the width and height.
//!
//! Supported `src` forms:
//! - `data:image/...;base64,...` data URIs
//! - `data:image/svg+xml,...` with plain or percent-encoded markup
//! - file paths, absolute or relative
//!
//! Remote URLs are refused. Fetching them is up to the caller.

use std::io::Cursor;

use base64::Engine;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Image formats we can size and embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Svg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }

    fn raster(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Svg => None,
        }
    }
}

/// An image resolved to bytes plus its intrinsic size.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub format: ImageFormat,
    pub data: Vec<u8>,
    pub width: f64,
    pub height: f64,
}

impl LoadedImage {
    /// The bytes re-encoded as a base64 data URI for embedding.
    pub fn to_data_uri(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.format.mime_type(), b64)
    }
}

/// Load an image from a source string.
pub fn load_image(src: &str) -> Result<LoadedImage, String> {
    let data = read_source_bytes(src)?;
    decode_image_bytes(data)
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, String> {
    let src = src.trim();
    if src.is_empty() {
        return Err("Image source is empty".to_string());
    }

    if let Some(rest) = src.strip_prefix("data:") {
        return decode_data_uri(rest);
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(format!(
            "Remote image '{}' is not supported. Use a data URI or a file path.",
            src
        ));
    }

    std::fs::read(src).map_err(|e| format!("Failed to read image file '{}': {}", src, e))
}

/// Decode the part of a data URI after `data:`.
fn decode_data_uri(rest: &str) -> Result<Vec<u8>, String> {
    let comma_pos = rest
        .find(',')
        .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;
    let (header, payload) = (&rest[..comma_pos], &rest[comma_pos + 1..]);

    let mut params = header.split(';');
    let mime = params.next().unwrap_or_default();
    if !mime.is_empty() && !mime.starts_with("image/") {
        return Err(format!("Data URI is not an image: '{}'", mime));
    }

    if params.any(|p| p.eq_ignore_ascii_case("base64")) {
        // whitespace sneaks in when the URI was wrapped
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| format!("Base64 decode error: {}", e))
    } else {
        Ok(percent_decode(payload))
    }
}

fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

/// Detect the format from magic bytes and read the intrinsic size.
fn decode_image_bytes(data: Vec<u8>) -> Result<LoadedImage, String> {
    let format = sniff_format(&data)
        .ok_or_else(|| {
            "Unsupported image format (expected PNG, JPEG, GIF, WebP or SVG)".to_string()
        })?;

    let (width, height) = match format.raster() {
        Some(raster) => {
            let (w, h) = image::io::Reader::with_format(Cursor::new(&data), raster)
                .into_dimensions()
                .map_err(|e| format!("Failed to read {} dimensions: {}", format.mime_type(), e))?;
            (w as f64, h as f64)
        }
        None => svg_dimensions(&data)?,
    };

    Ok(LoadedImage {
        format,
        data,
        width,
        height,
    })
}

pub fn sniff_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(ImageFormat::Png)
    } else if data.starts_with(&[0xFF, 0xD8]) {
        Some(ImageFormat::Jpeg)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        Some(ImageFormat::Gif)
    } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some(ImageFormat::WebP)
    } else if looks_like_svg(data) {
        Some(ImageFormat::Svg)
    } else {
        None
    }
}

fn looks_like_svg(data: &[u8]) -> bool {
    let head = &data[..data.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with('<') && text.contains("<svg")
}

/// Size of an SVG document from the root's `width`/`height`, falling back
/// to its `viewBox`.
fn svg_dimensions(data: &[u8]) -> Result<(f64, f64), String> {
    let mut reader = Reader::from_reader(data);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"svg" => {
                let mut width = None;
                let mut height = None;
                let mut view_box = None;
                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map_err(|e| format!("Invalid SVG attribute: {}", e))?;
                    match attr.key.local_name().as_ref() {
                        b"width" => width = parse_svg_length(&value),
                        b"height" => height = parse_svg_length(&value),
                        b"viewBox" => view_box = parse_view_box(&value),
                        _ => {}
                    }
                }
                return match (width, height, view_box) {
                    (Some(w), Some(h), _) => Ok((w, h)),
                    (Some(w), None, Some((vw, vh))) if vw > 0.0 => Ok((w, w * vh / vw)),
                    (None, Some(h), Some((vw, vh))) if vh > 0.0 => Ok((h * vw / vh, h)),
                    (_, _, Some(size)) => Ok(size),
                    _ => Err("SVG image has neither width/height nor a viewBox".to_string()),
                };
            }
            Ok(Event::Eof) => return Err("No <svg> element found".to_string()),
            Err(e) => return Err(format!("Invalid SVG markup: {}", e)),
            _ => {}
        }
        buf.clear();
    }
}

/// Parse a length like `120`, `120px` or `12.5`. Percentages and other
/// units have no intrinsic size.
fn parse_svg_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|v| *v >= 0.0)
}

fn parse_view_box(value: &str) -> Option<(f64, f64)> {
    let parts: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, w, h] if *w >= 0.0 && *h >= 0.0 => Some((*w, *h)),
        _ => None,
    }
}
