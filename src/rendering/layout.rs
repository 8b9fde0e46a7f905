//! Left-to-right packing with row wrapping.
//!
//! Images are letterboxed to a common row height; only widths vary. The
//! cursor starts at `(margin, margin)`, advances left to right and wraps to
//! a new row when an explicit width bound would be exceeded. Wrapping never
//! fires on an empty row, so an image wider than the bound still gets placed
//! at the margin on its own row.

/// Canvas bounds derived from the packed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Computed position for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Mutable packing cursor, created fresh per render and discarded after the
/// document is composed.
#[derive(Debug)]
pub struct LayoutCursor {
    x: u32,
    y: u32,
    margin: u32,
    row_height: u32,
    /// Explicit canvas width bound; 0 disables wrapping
    bound: u32,
    /// Running maximum cursor X, drives auto-sized width
    max_x: u32,
}

impl LayoutCursor {
    pub fn new(row_height: u32, margin: u32, bound: u32) -> Self {
        Self {
            x: margin,
            y: margin,
            margin,
            row_height,
            bound,
            max_x: margin,
        }
    }

    /// Place the next image and advance. Returns the image's position.
    pub fn place(&mut self, width: u32) -> Placement {
        if self.bound > 0 && self.x > self.margin && self.x + width + self.margin > self.bound {
            self.y += self.row_height + self.margin;
            self.x = self.margin;
        }
        let placement = Placement { x: self.x, y: self.y };
        self.x += width + self.margin;
        self.max_x = self.max_x.max(self.x);
        placement
    }

    /// Bounds of the content placed so far, including the trailing margin.
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize {
            width: self.max_x,
            height: self.y + self.row_height + self.margin,
        }
    }
}

/// Pack a sequence of image widths, in order. Returns one placement per
/// width plus the auto-sized canvas.
pub fn pack(widths: &[u32], row_height: u32, margin: u32, bound: u32) -> (Vec<Placement>, CanvasSize) {
    let mut cursor = LayoutCursor::new(row_height, margin, bound);
    let placements = widths.iter().map(|w| cursor.place(*w)).collect();
    (placements, cursor.canvas())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_row_matches_reference_example() {
        // 5 avatars of 64x64, margin 5, no width bound.
        let (placements, canvas) = pack(&[64; 5], 64, 5, 0);
        assert_eq!(placements[0], Placement { x: 5, y: 5 });
        assert_eq!(placements[1], Placement { x: 74, y: 5 });
        assert_eq!(placements[4], Placement { x: 281, y: 5 });
        assert_eq!(canvas, CanvasSize { width: 350, height: 74 });
    }

    #[test]
    fn wraps_at_width_bound() {
        // Bound of 150 fits two 64px images per row (5+64+5+64+5 = 143).
        let (placements, canvas) = pack(&[64; 5], 64, 5, 150);
        assert_eq!(placements[0], Placement { x: 5, y: 5 });
        assert_eq!(placements[1], Placement { x: 74, y: 5 });
        assert_eq!(placements[2], Placement { x: 5, y: 74 });
        assert_eq!(placements[3], Placement { x: 74, y: 74 });
        assert_eq!(placements[4], Placement { x: 5, y: 143 });
        assert_eq!(canvas.height, 143 + 64 + 5);
    }

    #[test]
    fn no_image_ends_past_the_bound_unless_alone_oversized() {
        let widths = [60, 30, 200, 40];
        let bound = 120;
        let margin = 5;
        let (placements, _) = pack(&widths, 50, margin, bound);
        for (placement, width) in placements.iter().zip(&widths) {
            if *width + 2 * margin <= bound {
                assert!(placement.x + width <= bound, "{placement:?} w={width}");
            } else {
                // Oversized image owns its row, starting at the margin.
                assert_eq!(placement.x, margin);
            }
        }
    }

    #[test]
    fn empty_input_still_yields_margin_bounds() {
        let (placements, canvas) = pack(&[], 64, 5, 0);
        assert!(placements.is_empty());
        assert_eq!(canvas, CanvasSize { width: 5, height: 74 });
    }

    #[test]
    fn varying_widths_advance_by_width_plus_margin() {
        let (placements, canvas) = pack(&[10, 20, 30], 20, 2, 0);
        assert_eq!(placements[0], Placement { x: 2, y: 2 });
        assert_eq!(placements[1], Placement { x: 14, y: 2 });
        assert_eq!(placements[2], Placement { x: 36, y: 2 });
        assert_eq!(canvas, CanvasSize { width: 68, height: 24 });
    }
}
