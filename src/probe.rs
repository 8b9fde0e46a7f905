//! Pixel dimension probing of fetched payloads.
//!
//! Decodes just enough of a payload to recover its width and height. Raster
//! formats go through the `image` crate's header decode; SVG payloads (the
//! call-to-action images are SVG) are read via their root `width`/`height`
//! attributes with a `viewBox` fallback. A probe failure is reported as a
//! [`Error::DecodeError`] and is always recoverable for batch callers.

use crate::{Error, Result};
use std::io::Cursor;

/// Recover `(width, height)` in pixels from fetched image bytes.
pub fn probe_dimensions(bytes: &[u8], content_type: &str) -> Result<(u32, u32)> {
    if looks_like_svg(bytes, content_type) {
        return svg_dimensions(bytes);
    }

    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::DecodeError(e.to_string()))?
        .into_dimensions()
        .map_err(|e| Error::DecodeError(e.to_string()))
}

/// Width after scaling an image of `dims` to `target_height`, preserving
/// aspect ratio.
pub fn scaled_width(dims: (u32, u32), target_height: u32) -> u32 {
    let (w, h) = dims;
    if h == 0 {
        return target_height;
    }
    ((w as f64 / h as f64) * target_height as f64).round().max(1.0) as u32
}

fn looks_like_svg(bytes: &[u8], content_type: &str) -> bool {
    if content_type.contains("svg") {
        return true;
    }
    let head = match std::str::from_utf8(&bytes[..bytes.len().min(256)]) {
        Ok(s) => s.trim_start_matches('\u{feff}').trim_start(),
        Err(_) => return false,
    };
    head.starts_with("<svg") || head.starts_with("<?xml")
}

fn svg_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::DecodeError(format!("svg is not valid utf-8: {}", e)))?;
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| Error::DecodeError(format!("svg parse: {}", e)))?;
    let root = doc.root_element();

    let explicit = match (
        root.attribute("width").and_then(parse_svg_length),
        root.attribute("height").and_then(parse_svg_length),
    ) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    };

    let (w, h) = explicit
        .or_else(|| view_box_size(root.attribute("viewBox")))
        .ok_or_else(|| Error::DecodeError("svg has no usable width/height or viewBox".into()))?;

    Ok((w.round().max(1.0) as u32, h.round().max(1.0) as u32))
}

/// Parse an SVG length attribute. Percentages have no intrinsic pixel size
/// and fall through to the viewBox.
fn parse_svg_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.ends_with('%') {
        return None;
    }
    let value = value.strip_suffix("px").unwrap_or(value).trim();
    value.parse::<f64>().ok().filter(|v| *v > 0.0)
}

fn view_box_size(view_box: Option<&str>) -> Option<(f64, f64)> {
    let parts: Vec<f64> = view_box?
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();
    if parts.len() == 4 && parts[2] > 0.0 && parts[3] > 0.0 {
        Some((parts[2], parts[3]))
    } else {
        None
    }
}
