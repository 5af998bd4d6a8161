use image::{GrayImage, Luma, imageops};
use imageproc::{distance_transform::Norm, morphology};

use crate::{
    error::{Result, SilhouetteError},
    types::BinaryMask,
};

/// Convert a stored 0/255 reference array into a 0/1 mask.
///
/// Any other value is a precondition violation and is reported with its
/// position rather than rounded away.
pub fn binarize(raw: &GrayImage) -> Result<BinaryMask> {
    let mut out = GrayImage::new(raw.width(), raw.height());
    for (x, y, pixel) in raw.enumerate_pixels() {
        match pixel[0] {
            0 => {}
            255 => out.put_pixel(x, y, Luma([1])),
            value => {
                return Err(SilhouetteError::NonBinaryValue {
                    value,
                    row: y,
                    col: x,
                    expected: "0 or 255",
                });
            }
        }
    }
    Ok(BinaryMask::from_binary_image(out))
}

/// Erosion by the 4-connected cross. Cells outside the grid count as
/// background, so foreground touching the border erodes too.
pub fn erode(mask: &BinaryMask) -> BinaryMask {
    let (width, height) = (mask.width(), mask.height());
    let mut framed = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut framed, &mask.to_scaled(), 1, 1);

    let eroded = morphology::erode(&framed, Norm::L1, 1);
    let inner = imageops::crop_imm(&eroded, 1, 1, width, height).to_image();
    BinaryMask::from_gray(&inner, 0)
}

/// One-pixel boundary: the mask minus its erosion
pub fn extract_outline(mask: &BinaryMask) -> BinaryMask {
    let eroded = erode(mask);
    let mut outline = mask.as_image().clone();
    for (x, y, pixel) in outline.enumerate_pixels_mut() {
        if eroded.get(y, x) == 1 {
            pixel[0] = 0;
        }
    }
    BinaryMask::from_binary_image(outline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    fn square(size: usize, rows: std::ops::Range<usize>) -> BinaryMask {
        let mut grid = vec![vec![0u8; size]; size];
        for r in rows.clone() {
            for c in rows.clone() {
                grid[r][c] = 1;
            }
        }
        BinaryMask::from_rows(&grid).expect("valid rows")
    }

    #[test]
    fn test_binarize_maps_255_to_one() {
        let mut raw = GrayImage::new(4, 2);
        raw.put_pixel(1, 0, Luma([255]));
        raw.put_pixel(3, 1, Luma([255]));
        let mask = binarize(&raw).expect("binary input");
        assert_eq!(mask.shape(), Shape::new(2, 4));
        assert_eq!(mask.to_rows(), vec![vec![0, 1, 0, 0], vec![0, 0, 0, 1]]);
    }

    #[test]
    fn test_binarize_rejects_intermediate_values() {
        let mut raw = GrayImage::new(3, 3);
        raw.put_pixel(2, 1, Luma([128]));
        match binarize(&raw) {
            Err(SilhouetteError::NonBinaryValue { value, row, col, .. }) => {
                assert_eq!((value, row, col), (128, 1, 2));
            }
            other => panic!("expected NonBinaryValue, got {:?}", other),
        }
    }

    #[test]
    fn test_outline_of_interior_square_is_a_ring() {
        let mask = square(7, 1..6);
        let outline = extract_outline(&mask);
        assert_eq!(outline.count_ones(), 16);
        assert_eq!(outline.get(1, 1), 1);
        assert_eq!(outline.get(3, 3), 0);
        assert_eq!(outline.get(0, 0), 0);
    }

    #[test]
    fn test_border_foreground_erodes() {
        let mask = square(4, 0..4);
        assert_eq!(erode(&mask).count_ones(), 4);
        assert_eq!(extract_outline(&mask).count_ones(), 12);
    }

    #[test]
    fn test_single_pixel_is_its_own_outline() {
        let mask = square(5, 2..3);
        assert!(erode(&mask).is_empty());
        assert_eq!(extract_outline(&mask), mask);
    }
}
