use std::fmt;
use std::path::Path;

use image::{GrayImage, Luma};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SilhouetteError};

/// Grid dimensions in rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Shape {
    pub height: u32,
    pub width: u32,
}

impl Shape {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    pub fn of(image: &GrayImage) -> Self {
        Self::new(image.height(), image.width())
    }

    /// Number of cells in the grid
    pub fn area(&self) -> u64 {
        self.height as u64 * self.width as u64
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0 || self.width == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// A 2-D grid whose cells are exactly 0 (background) or 1 (foreground).
///
/// Backed by a `GrayImage` so the imaging routines of `image` and
/// `imageproc` apply directly; use [`BinaryMask::to_scaled`] when an
/// operation expects the 0/255 convention.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// An all-background mask
    pub fn zeros(shape: Shape) -> Self {
        Self {
            image: GrayImage::new(shape.width, shape.height),
        }
    }

    /// Build a mask from row-major cells, rejecting ragged rows and
    /// anything other than 0/1.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(SilhouetteError::EmptyGrid);
        }

        let mut image = GrayImage::new(width as u32, height as u32);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(SilhouetteError::RaggedMask {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
            for (col, &value) in cells.iter().enumerate() {
                if value > 1 {
                    return Err(SilhouetteError::NonBinaryValue {
                        value,
                        row: row as u32,
                        col: col as u32,
                        expected: "0 or 1",
                    });
                }
                image.put_pixel(col as u32, row as u32, Luma([value]));
            }
        }

        Ok(Self { image })
    }

    /// Parse a JSON array of rows, the layout detectors emit for mask coordinates
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Vec<u8>> = serde_json::from_str(json)?;
        Self::from_rows(&rows)
    }

    /// Foreground is every pixel strictly above `threshold`
    pub fn from_gray(image: &GrayImage, threshold: u8) -> Self {
        let mut out = GrayImage::new(image.width(), image.height());
        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel[0] > threshold {
                out.put_pixel(x, y, Luma([1]));
            }
        }
        Self { image: out }
    }

    /// Load a mask from any image file the `image` crate can decode
    pub fn open<P: AsRef<Path>>(path: P, threshold: u8) -> Result<Self> {
        let image = image::open(path)?.to_luma8();
        if image.width() == 0 || image.height() == 0 {
            return Err(SilhouetteError::EmptyGrid);
        }
        Ok(Self::from_gray(&image, threshold))
    }

    /// Wrap an image already known to hold only 0/1
    pub(crate) fn from_binary_image(image: GrayImage) -> Self {
        debug_assert!(image.pixels().all(|p| p[0] <= 1));
        Self { image }
    }

    pub fn shape(&self) -> Shape {
        Shape::of(&self.image)
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Cell value at `(row, col)`
    pub fn get(&self, row: u32, col: u32) -> u8 {
        self.image.get_pixel(col, row)[0]
    }

    pub fn is_foreground(&self, row: u32, col: u32) -> bool {
        self.get(row, col) == 1
    }

    /// Row-major iterator over the cell values
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.image.as_raw().iter().copied()
    }

    /// `(row, col)` of every foreground cell, row-major
    pub fn foreground(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 1)
            .map(|(x, y, _)| (y, x))
    }

    pub fn count_ones(&self) -> u64 {
        self.values().filter(|&v| v == 1).count() as u64
    }

    /// True when the mask has no foreground
    pub fn is_empty(&self) -> bool {
        self.values().all(|v| v == 0)
    }

    /// Center of mass of the foreground as `(row, col)`; `None` when empty
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut count = 0u64;
        let mut row_sum = 0u64;
        let mut col_sum = 0u64;
        for (row, col) in self.foreground() {
            count += 1;
            row_sum += row as u64;
            col_sum += col as u64;
        }
        if count == 0 {
            return None;
        }
        Some((row_sum as f64 / count as f64, col_sum as f64 / count as f64))
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Copy with foreground at 255, the convention of the stored references
    pub fn to_scaled(&self) -> GrayImage {
        let mut out = self.image.clone();
        for pixel in out.pixels_mut() {
            pixel[0] *= 255;
        }
        out
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.image
            .rows()
            .map(|row| row.map(|p| p[0]).collect())
            .collect()
    }
}

/// Identifies the detected object a ranking is produced for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectRef {
    pub image_file_name: String,
    pub object_id: u32,
}

impl ObjectRef {
    pub fn new(image_file_name: impl Into<String>, object_id: u32) -> Self {
        Self {
            image_file_name: image_file_name.into(),
            object_id,
        }
    }
}

/// One reference shape and the score it received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoredShape {
    pub shape_id: String,
    pub score: f64,
}

/// Best reference match for one (mask, category, metric) query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RankingResult {
    pub most_similar: String,
    pub mask_url: String,
}

impl RankingResult {
    /// JSON schema handed to the surrounding service
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RankingResult)
    }
}
