use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    algorithms::{
        ChamferMetric, DiceMetric, HammingMetric, HausdorffMetric, JaccardMetric, SsimMetric,
    },
    error::{Result, SilhouetteError},
    traits::SimilarityMetric,
    types::BinaryMask,
};

static HAMMING: HammingMetric = HammingMetric;
static SSIM: SsimMetric = SsimMetric::DEFAULT;
static CHAMFER: ChamferMetric = ChamferMetric;
static HAUSDORFF: HausdorffMetric = HausdorffMetric;
static DICE: DiceMetric = DiceMetric;
static JACCARD: JaccardMetric = JaccardMetric;

/// The built-in similarity metrics. Scores are only comparable within
/// one metric.
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, PartialOrd, Ord, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Count of agreeing cells
    Hamming,
    /// Windowed structural similarity
    Ssim,
    /// Averaged outline-to-outline distance
    Chamfer,
    /// Worst-case foreground distance
    Hausdorff,
    /// Dice overlap coefficient
    Dice,
    /// Jaccard overlap coefficient
    Jaccard,
}

impl Metric {
    /// Parse a metric name, failing with `UnknownMetric`
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| SilhouetteError::UnknownMetric(name.to_string()))
    }

    /// Get a list of all metric names
    pub fn names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The implementation behind this metric
    pub fn as_metric(&self) -> &'static dyn SimilarityMetric {
        match self {
            Self::Hamming => &HAMMING,
            Self::Ssim => &SSIM,
            Self::Chamfer => &CHAMFER,
            Self::Hausdorff => &HAUSDORFF,
            Self::Dice => &DICE,
            Self::Jaccard => &JACCARD,
        }
    }

    pub fn score(&self, a: &BinaryMask, b: &BinaryMask) -> Result<f64> {
        self.as_metric().score(a, b)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Hamming => "Number of cells where both masks agree, dominated by background",
            Self::Ssim => "Structural similarity of local means, variances and covariance",
            Self::Chamfer => "1 / (1 + averaged chamfer distance between one-pixel outlines)",
            Self::Hausdorff => "1 / (1 + symmetric Hausdorff distance between foregrounds)",
            Self::Dice => "2|A∩B| / (|A|+|B|), 1 when both masks are empty",
            Self::Jaccard => "|A∩B| / |A∪B|, 1 when the union is empty",
        }
    }

    /// Human-readable score range
    pub fn range(&self) -> &'static str {
        match self {
            Self::Hamming => "[0, H*W]",
            Self::Ssim => "[-1, 1]",
            Self::Chamfer | Self::Hausdorff | Self::Dice | Self::Jaccard => "[0, 1]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_names_round_trip() {
        assert_eq!(
            Metric::names(),
            &["hamming", "ssim", "chamfer", "hausdorff", "dice", "jaccard"]
        );
        for metric in Metric::iter() {
            assert_eq!(Metric::parse(metric.name()).unwrap(), metric);
            assert_eq!(metric.to_string(), metric.name());
            assert_eq!(metric.as_metric().name(), metric.name());
        }
    }

    #[test]
    fn test_unknown_metric() {
        match Metric::parse("euclidean") {
            Err(SilhouetteError::UnknownMetric(name)) => assert_eq!(name, "euclidean"),
            other => panic!("expected UnknownMetric, got {:?}", other),
        }
    }

    #[test]
    fn test_distance_metrics_reach_zero_on_one_empty_side() {
        let dot = BinaryMask::from_rows(&[
            vec![0, 0, 0],
            vec![0, 1, 0],
            vec![0, 0, 0],
        ])
        .unwrap();
        let empty = BinaryMask::zeros(dot.shape());
        for metric in [Metric::Chamfer, Metric::Hausdorff] {
            assert_eq!(metric.score(&dot, &empty).unwrap(), 0.0);
            assert_eq!(metric.range(), "[0, 1]");
        }
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Metric::Hausdorff).unwrap();
        assert_eq!(json, "\"hausdorff\"");
        let parsed: Metric = serde_json::from_str("\"jaccard\"").unwrap();
        assert_eq!(parsed, Metric::Jaccard);
    }
}
