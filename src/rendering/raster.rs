//! SVG to PNG rasterization backend (`raster` feature).

use crate::{Error, Result};

/// Rasterize a composed SVG document to PNG bytes at its intrinsic size.
pub fn rasterize_svg(svg: &str) -> Result<Vec<u8>> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| Error::RasterError(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        Error::RasterError(format!("invalid canvas {}x{}", size.width(), size.height()))
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| Error::RasterError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterizes_to_png_magic() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#66C71A"/></svg>"##;
        let png = rasterize_svg(svg).expect("rasterize");
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn invalid_markup_is_a_raster_error() {
        let err = rasterize_svg("<svg").unwrap_err();
        assert!(matches!(err, Error::RasterError(_)));
    }
}
