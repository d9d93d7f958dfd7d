//! Exact pixel-level image equality.

use image::RgbaImage;

/// Compare two images for exact equality.
///
/// Absent images are equal only to each other. Present images must agree on
/// width and height before any pixel is read; a single differing pixel
/// anywhere makes the result `false`. Comparison order is unspecified but
/// exhaustive.
pub fn equals(a: Option<&RgbaImage>, b: Option<&RgbaImage>) -> bool {
    let (a, b) = match (a, b) {
        (None, None) => return true,
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    if a.width() != b.width() || a.height() != b.height() {
        return false;
    }
    a.pixels().zip(b.pixels()).all(|(pa, pb)| pa == pb)
}
