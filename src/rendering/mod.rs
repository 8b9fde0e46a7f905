//! Rendering: deterministic layout and document composition

pub mod compose;
pub mod layout;

#[cfg(feature = "raster")]
pub mod raster;

/// An image that survived fetch and probe, measured and placed on the canvas.
///
/// The sequence handed to the composer preserves the post-filter supporter
/// order, regardless of fetch completion order.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Raw payload, embedded base64 into the document
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// Hyperlink target wrapped around the image
    pub link: String,
}
