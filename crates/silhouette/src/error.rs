use thiserror::Error;

use crate::types::Shape;

#[derive(Error, Debug)]
pub enum SilhouetteError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown metric: {0} (expected one of: hamming, ssim, chamfer, hausdorff, dice, jaccard)")]
    UnknownMetric(String),

    #[error("Shape mismatch: {left} vs {right}")]
    ShapeMismatch { left: Shape, right: Shape },

    #[error("Non-binary value {value} at ({row}, {col}), expected {expected}")]
    NonBinaryValue {
        value: u8,
        row: u32,
        col: u32,
        expected: &'static str,
    },

    #[error("Ragged mask: row {row} has {found} columns, expected {expected}")]
    RaggedMask { row: usize, expected: usize, found: usize },

    #[error("Mask grid has no rows or no columns")]
    EmptyGrid,

    #[error("Reference set contains no shapes")]
    EmptyReferenceSet,

    #[error("Duplicate shape id in reference set: {0}")]
    DuplicateShapeId(String),

    #[error("Reference shape '{shape_id}' is {found}, expected {expected}")]
    InconsistentReferenceShape {
        shape_id: String,
        expected: Shape,
        found: Shape,
    },

    #[error("Metric '{metric}' failed on '{category}/{shape_id}': {source}")]
    MetricFailed {
        category: String,
        metric: String,
        shape_id: String,
        #[source]
        source: Box<SilhouetteError>,
    },

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SilhouetteError>;
