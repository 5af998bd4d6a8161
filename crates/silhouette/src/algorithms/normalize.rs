//! Fit-inside rescaling, centroid centering and symmetric padding of a
//! query mask onto the canonical grid of a reference category.

use image::{
    GrayImage,
    imageops::{self, FilterType},
};
use tracing::debug;

use crate::{
    error::{Result, SilhouetteError},
    types::{BinaryMask, Shape},
};

/// Resampled 0/255 values above this become foreground again
pub const RESAMPLE_THRESHOLD: u8 = 127;

/// Rescale `mask` to fit inside `target` without cropping, move its centroid
/// to the grid center and zero-pad to exactly `target`.
///
/// An all-background mask is never shifted and comes back as an
/// all-background grid of `target`.
pub fn normalize(mask: &BinaryMask, target: Shape) -> Result<BinaryMask> {
    if mask.shape().is_empty() || target.is_empty() {
        return Err(SilhouetteError::EmptyGrid);
    }

    let fitted = fitted_shape(mask.shape(), target);
    // Triangle filtering keeps edge coverage; thresholding brings it back to 0/1
    let resampled = imageops::resize(
        &mask.to_scaled(),
        fitted.width,
        fitted.height,
        FilterType::Triangle,
    );
    let resized = BinaryMask::from_gray(&resampled, RESAMPLE_THRESHOLD);

    let (dy, dx) = centering_shift(&resized);
    let centered = if dy == 0 && dx == 0 {
        resized
    } else {
        BinaryMask::from_binary_image(shift(resized.as_image(), dy, dx))
    };

    let padded = pad_to(centered.as_image(), target);
    debug!(
        input = %mask.shape(),
        fitted = %fitted,
        shift_rows = dy,
        shift_cols = dx,
        target = %target,
        "normalized query mask"
    );
    Ok(BinaryMask::from_binary_image(padded))
}

/// Largest aspect-preserving size that fits inside `target`
pub fn fitted_shape(input: Shape, target: Shape) -> Shape {
    let scale = f64::min(
        target.height as f64 / input.height as f64,
        target.width as f64 / input.width as f64,
    );
    let height = (input.height as f64 * scale).round() as u32;
    let width = (input.width as f64 * scale).round() as u32;
    Shape::new(height.clamp(1, target.height), width.clamp(1, target.width))
}

/// Whole-pixel `(rows, cols)` translation that moves the centroid onto the
/// grid center. Zero for a mask without foreground.
pub fn centering_shift(mask: &BinaryMask) -> (i32, i32) {
    let Some((row, col)) = mask.centroid() else {
        return (0, 0);
    };
    let center_row = (mask.height() as f64 - 1.0) / 2.0;
    let center_col = (mask.width() as f64 - 1.0) / 2.0;
    (
        (center_row - row).round() as i32,
        (center_col - col).round() as i32,
    )
}

/// `(top, bottom, left, right)` zero padding taking `inner` to `outer`.
/// An odd remainder goes to the bottom/right side.
pub fn padding(inner: Shape, outer: Shape) -> (u32, u32, u32, u32) {
    let rows = outer.height.saturating_sub(inner.height);
    let cols = outer.width.saturating_sub(inner.width);
    let top = rows / 2;
    let left = cols / 2;
    (top, rows - top, left, cols - left)
}

/// Move every pixel by `(dy, dx)`. Vacated cells are background and
/// pixels pushed past the border are dropped.
fn shift(image: &GrayImage, dy: i32, dx: i32) -> GrayImage {
    let mut canvas = GrayImage::new(image.width(), image.height());
    imageops::replace(&mut canvas, image, dx as i64, dy as i64);
    canvas
}

fn pad_to(image: &GrayImage, target: Shape) -> GrayImage {
    let (top, _, left, _) = padding(Shape::of(image), target);
    let mut canvas = GrayImage::new(target.width, target.height);
    imageops::replace(&mut canvas, image, left as i64, top as i64);
    canvas
}
