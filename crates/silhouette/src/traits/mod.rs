use crate::{
    error::Result,
    types::{BinaryMask, ObjectRef},
};

/// Trait for similarity metrics over two equal-shaped binary masks
pub trait SimilarityMetric: Send + Sync {
    /// Name used in logs and error context
    fn name(&self) -> &'static str;

    /// Score the pair; higher is more similar. Fails on differing shapes.
    fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64>;
}

/// Trait for building the presentation URL of a ranked object's silhouette
pub trait MaskUrlResolver: Send + Sync {
    fn mask_url(&self, object: &ObjectRef) -> String;
}
