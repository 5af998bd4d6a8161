//! Distance-based metrics: chamfer over one-pixel outlines and the
//! symmetric Hausdorff distance over foreground sets. Both turn a distance
//! `d` into a score `1 / (1 + d)`, so coinciding shapes score 1.

use image::Luma;
use imageproc::{definitions::Image, distance_transform::euclidean_squared_distance_transform};

use crate::{error::Result, traits::SimilarityMetric, types::BinaryMask};

use super::{codec::extract_outline, ensure_same_shape};

/// Chamfer similarity of the two outlines.
///
/// Each outline's distance field is summed over the other outline's pixels;
/// the two directed sums are averaged. Scores lie in `[0, 1]`: two empty
/// outlines score 1, and one empty outline against a non-empty one is
/// infinitely far apart and scores 0.
pub fn chamfer(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    ensure_same_shape(a, b)?;
    let outline_a = extract_outline(a);
    let outline_b = extract_outline(b);
    match (outline_a.is_empty(), outline_b.is_empty()) {
        (true, true) => return Ok(1.0),
        (true, false) | (false, true) => return Ok(0.0),
        (false, false) => {}
    }

    let field_a = distance_field(&outline_a);
    let field_b = distance_field(&outline_b);
    let forward = directed_sum(&field_a, &outline_b);
    let backward = directed_sum(&field_b, &outline_a);
    let average = (forward + backward) / 2.0;
    Ok(1.0 / (1.0 + average))
}

/// Hausdorff similarity: the larger of the two directed worst-case
/// nearest-foreground distances. Scores lie in `[0, 1]`: two empty masks
/// score 1 and exactly one empty mask scores 0.
pub fn hausdorff(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    ensure_same_shape(a, b)?;
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ok(1.0),
        (true, false) | (false, true) => return Ok(0.0),
        (false, false) => {}
    }

    let a_to_b = directed_max(&distance_field(b), a);
    let b_to_a = directed_max(&distance_field(a), b);
    Ok(1.0 / (1.0 + a_to_b.max(b_to_a)))
}

/// Squared Euclidean distance from every cell to the nearest foreground cell
fn distance_field(mask: &BinaryMask) -> Image<Luma<f64>> {
    euclidean_squared_distance_transform(mask.as_image())
}

fn directed_sum(field: &Image<Luma<f64>>, points: &BinaryMask) -> f64 {
    points
        .foreground()
        .map(|(row, col)| field.get_pixel(col, row)[0].sqrt())
        .sum()
}

fn directed_max(field: &Image<Luma<f64>>, points: &BinaryMask) -> f64 {
    points
        .foreground()
        .map(|(row, col)| field.get_pixel(col, row)[0].sqrt())
        .fold(0.0, f64::max)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChamferMetric;

impl SimilarityMetric for ChamferMetric {
    fn name(&self) -> &'static str {
        "chamfer"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        chamfer(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HausdorffMetric;

impl SimilarityMetric for HausdorffMetric {
    fn name(&self) -> &'static str {
        "hausdorff"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        hausdorff(a, b)
    }
}
