use crate::{error::Result, traits::SimilarityMetric, types::BinaryMask};

use super::ensure_same_shape;

/// Number of cells where both masks agree, background included
pub fn hamming(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    ensure_same_shape(a, b)?;
    let agreeing = a.values().zip(b.values()).filter(|(x, y)| x == y).count();
    Ok(agreeing as f64)
}

/// `2|A∩B| / (|A|+|B|)`, 1.0 when both masks are empty
pub fn dice(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    ensure_same_shape(a, b)?;
    let counts = OverlapCounts::of(a, b);
    let total = counts.left + counts.right;
    if total == 0 {
        return Ok(1.0);
    }
    Ok(2.0 * counts.intersection as f64 / total as f64)
}

/// `|A∩B| / |A∪B|`, 1.0 when the union is empty
pub fn jaccard(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    ensure_same_shape(a, b)?;
    let counts = OverlapCounts::of(a, b);
    if counts.union == 0 {
        return Ok(1.0);
    }
    Ok(counts.intersection as f64 / counts.union as f64)
}

struct OverlapCounts {
    left: u64,
    right: u64,
    intersection: u64,
    union: u64,
}

impl OverlapCounts {
    fn of(a: &BinaryMask, b: &BinaryMask) -> Self {
        let mut counts = Self {
            left: 0,
            right: 0,
            intersection: 0,
            union: 0,
        };
        for (x, y) in a.values().zip(b.values()) {
            let (x, y) = (x == 1, y == 1);
            counts.left += x as u64;
            counts.right += y as u64;
            counts.intersection += (x && y) as u64;
            counts.union += (x || y) as u64;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HammingMetric;

impl SimilarityMetric for HammingMetric {
    fn name(&self) -> &'static str {
        "hamming"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        hamming(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DiceMetric;

impl SimilarityMetric for DiceMetric {
    fn name(&self) -> &'static str {
        "dice"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        dice(a, b)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardMetric;

impl SimilarityMetric for JaccardMetric {
    fn name(&self) -> &'static str {
        "jaccard"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        jaccard(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SilhouetteError, types::Shape};

    fn mask(rows: &[&[u8]]) -> BinaryMask {
        let rows: Vec<Vec<u8>> = rows.iter().map(|r| r.to_vec()).collect();
        BinaryMask::from_rows(&rows).expect("valid rows")
    }

    #[test]
    fn test_identical_masks_score_one() {
        let a = mask(&[&[0, 1, 1], &[1, 1, 0]]);
        assert_eq!(dice(&a, &a).unwrap(), 1.0);
        assert_eq!(jaccard(&a, &a).unwrap(), 1.0);
        assert_eq!(hamming(&a, &a).unwrap(), 6.0);
    }

    #[test]
    fn test_empty_masks_fall_back_to_one() {
        let empty = BinaryMask::zeros(Shape::new(3, 3));
        assert_eq!(dice(&empty, &empty).unwrap(), 1.0);
        assert_eq!(jaccard(&empty, &empty).unwrap(), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        let a = mask(&[&[1, 1, 0, 0]]);
        let b = mask(&[&[0, 1, 1, 0]]);
        assert_eq!(hamming(&a, &b).unwrap(), 2.0);
        assert!((dice(&a, &b).unwrap() - 0.5).abs() < 1e-12);
        assert!((jaccard(&a, &b).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_and_one_sided() {
        let a = mask(&[&[1, 0], &[0, 0]]);
        let b = mask(&[&[0, 0], &[0, 1]]);
        let empty = BinaryMask::zeros(Shape::new(2, 2));
        assert_eq!(dice(&a, &b).unwrap(), 0.0);
        assert_eq!(jaccard(&a, &b).unwrap(), 0.0);
        assert_eq!(dice(&a, &empty).unwrap(), 0.0);
        assert_eq!(jaccard(&empty, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let grids: Vec<BinaryMask> = (0u32..16)
            .map(|bits| {
                let cells: Vec<u8> = (0..4).map(|i| ((bits >> i) & 1) as u8).collect();
                BinaryMask::from_rows(&[cells[..2].to_vec(), cells[2..].to_vec()])
                    .expect("valid rows")
            })
            .collect();
        for a in &grids {
            for b in &grids {
                let d = dice(a, b).unwrap();
                let j = jaccard(a, b).unwrap();
                assert!((0.0..=1.0).contains(&d));
                assert!((0.0..=1.0).contains(&j));
                assert!(j <= d + 1e-12);
            }
        }
    }

    #[test]
    fn test_shape_mismatch_is_reported() {
        let a = BinaryMask::zeros(Shape::new(2, 3));
        let b = BinaryMask::zeros(Shape::new(3, 2));
        for result in [hamming(&a, &b), dice(&a, &b), jaccard(&a, &b)] {
            assert!(matches!(result, Err(SilhouetteError::ShapeMismatch { .. })));
        }
    }
}
