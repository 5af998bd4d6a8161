use crate::{
    error::{Result, SilhouetteError},
    traits::SimilarityMetric,
    types::BinaryMask,
};

use super::ensure_same_shape;

pub const DEFAULT_WINDOW: u32 = 7;
/// Value range of the stored u8 reference format
pub const DEFAULT_DATA_RANGE: f64 = 255.0;

const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Structural similarity with a square uniform window.
///
/// Local means, sample variances and covariance are taken over every window
/// that lies fully inside the grid and the per-window index is averaged.
/// Grids narrower than `window` use the largest odd window that fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsimMetric {
    pub window: u32,
    pub data_range: f64,
}

impl SsimMetric {
    pub const DEFAULT: Self = Self {
        window: DEFAULT_WINDOW,
        data_range: DEFAULT_DATA_RANGE,
    };

    pub fn compute(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        ensure_same_shape(a, b)?;
        let (width, height) = (a.width(), a.height());
        let size = self.effective_window(width, height);
        if size == 0 {
            return Err(SilhouetteError::EmptyGrid);
        }

        let sum_a = SummedArea::of(a);
        let sum_b = SummedArea::of(b);
        let sum_ab = SummedArea::product(a, b);

        let n = (size * size) as f64;
        let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };
        let c1 = (K1 * self.data_range).powi(2);
        let c2 = (K2 * self.data_range).powi(2);

        let size = size as usize;
        let rows = height as usize - size + 1;
        let cols = width as usize - size + 1;
        let mut total = 0.0;
        for top in 0..rows {
            for left in 0..cols {
                let ux = sum_a.window(top, left, size) as f64 / n;
                let uy = sum_b.window(top, left, size) as f64 / n;
                let uxy = sum_ab.window(top, left, size) as f64 / n;
                // x² = x on a binary grid, so the mean of squares is the mean
                let vx = cov_norm * (ux - ux * ux);
                let vy = cov_norm * (uy - uy * uy);
                let vxy = cov_norm * (uxy - ux * uy);

                let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
                let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);
                total += numerator / denominator;
            }
        }

        Ok(total / (rows * cols) as f64)
    }

    fn effective_window(&self, width: u32, height: u32) -> u32 {
        let limit = self.window.max(1).min(width).min(height);
        if limit % 2 == 0 { limit.saturating_sub(1) } else { limit }
    }
}

impl Default for SsimMetric {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl SimilarityMetric for SsimMetric {
    fn name(&self) -> &'static str {
        "ssim"
    }

    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        self.compute(a, b)
    }
}

/// Mean structural similarity with the default window and data range
pub fn ssim(a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
    SsimMetric::DEFAULT.compute(a, b)
}

/// Summed-area table for constant-time window sums
struct SummedArea {
    stride: usize,
    sums: Vec<u64>,
}

impl SummedArea {
    fn of(mask: &BinaryMask) -> Self {
        Self::build(mask, mask, |x, _| x as u64)
    }

    fn product(a: &BinaryMask, b: &BinaryMask) -> Self {
        Self::build(a, b, |x, y| (x * y) as u64)
    }

    fn build(a: &BinaryMask, b: &BinaryMask, cell: impl Fn(u8, u8) -> u64) -> Self {
        let width = a.width() as usize;
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (a.height() as usize + 1)];
        let mut cells = a.values().zip(b.values());
        for y in 0..a.height() as usize {
            let mut row = 0u64;
            for x in 0..width {
                if let Some((va, vb)) = cells.next() {
                    row += cell(va, vb);
                }
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { stride, sums }
    }

    fn window(&self, top: usize, left: usize, size: usize) -> u64 {
        let (bottom, right) = (top + size, left + size);
        self.sums[bottom * self.stride + right] + self.sums[top * self.stride + left]
            - self.sums[top * self.stride + right]
            - self.sums[bottom * self.stride + left]
    }
}
