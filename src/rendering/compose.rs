//! Vector document composition.
//!
//! Builds the final SVG markup: each placed image becomes an inline
//! base64-encoded bitmap wrapped in a hyperlink to its supporter. Link
//! targets are XML-escaped so ampersand-bearing URLs survive.

use crate::rendering::layout::CanvasSize;
use crate::rendering::PlacedImage;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// MIME type of composed vector documents.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml;charset=utf-8";

/// MIME type of rasterized documents.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Escape text for use inside XML attribute values.
pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn data_uri(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

/// Compose the montage document from placed images and canvas bounds.
pub fn montage_document(images: &[PlacedImage], canvas: CanvasSize) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{}\" height=\"{}\">\n",
        canvas.width, canvas.height
    ));
    for image in images {
        svg.push_str(&format!(
            "<a xlink:href=\"{}\" target=\"_blank\"><image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" xlink:href=\"{}\"/></a>\n",
            xml_escape(&image.link),
            image.x,
            image.y,
            image.width,
            image.height,
            data_uri(&image.content_type, &image.bytes),
        ));
    }
    svg.push_str("</svg>");
    svg
}

/// Compose a single-avatar thumbnail document.
pub fn thumbnail_document(width: u32, height: u32, content_type: &str, bytes: &[u8]) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\">\n<image width=\"{width}\" height=\"{height}\" xlink:href=\"{}\"/>\n</svg>",
        data_uri(content_type, bytes),
    )
}

/// Content-addressed fingerprint of a composed document, for golden tests.
pub fn fingerprint(document: &str) -> String {
    hex::encode(Sha256::digest(document.as_bytes()))
}
