pub mod builder;

use std::{collections::BTreeMap, sync::Arc};

use strum::IntoEnumIterator;
use tracing::debug;

use crate::{
    algorithms::normalize,
    error::{Result, SilhouetteError},
    metric::Metric,
    reference::{ReferenceRegistry, ReferenceSet},
    traits::{MaskUrlResolver, SimilarityMetric},
    types::{BinaryMask, ObjectRef, RankingResult, ScoredShape},
};

/// Ranks a query mask against every reference shape of a category.
///
/// The engine only reads its registry, so one instance can serve
/// concurrent callers.
pub struct RankingEngine {
    registry: Arc<ReferenceRegistry>,
    url_resolver: Box<dyn MaskUrlResolver>,
}

impl RankingEngine {
    /// Create a new engine builder
    pub fn builder(registry: Arc<ReferenceRegistry>) -> builder::RankingEngineBuilder {
        builder::RankingEngineBuilder::new(registry)
    }

    pub fn new(registry: Arc<ReferenceRegistry>, url_resolver: Box<dyn MaskUrlResolver>) -> Self {
        Self {
            registry,
            url_resolver,
        }
    }

    pub fn registry(&self) -> &ReferenceRegistry {
        &self.registry
    }

    /// Normalize `mask` onto the canonical shape of `category_id`
    pub fn normalize_for(&self, mask: &BinaryMask, category_id: &str) -> Result<BinaryMask> {
        let set = self.registry.get(category_id)?;
        normalize(mask, set.shape())
    }

    /// Rank with a metric given by name, failing with `UnknownMetric`
    pub fn rank_single(
        &self,
        mask: &BinaryMask,
        category_id: &str,
        object: &ObjectRef,
        metric_name: &str,
    ) -> Result<RankingResult> {
        let metric = Metric::parse(metric_name)?;
        self.rank(mask, category_id, object, metric)
    }

    pub fn rank(
        &self,
        mask: &BinaryMask,
        category_id: &str,
        object: &ObjectRef,
        metric: Metric,
    ) -> Result<RankingResult> {
        self.rank_with(mask, category_id, object, metric.as_metric())
    }

    /// Rank with any metric implementation
    pub fn rank_with(
        &self,
        mask: &BinaryMask,
        category_id: &str,
        object: &ObjectRef,
        metric: &dyn SimilarityMetric,
    ) -> Result<RankingResult> {
        let set = self.registry.get(category_id)?;
        let query = normalize(mask, set.shape())?;
        let best = best_match(&query, set, category_id, metric)?;
        Ok(self.package(best, object))
    }

    /// Rank with all six built-in metrics, normalizing the query once
    pub fn rank_all(
        &self,
        mask: &BinaryMask,
        category_id: &str,
        object: &ObjectRef,
    ) -> Result<BTreeMap<Metric, RankingResult>> {
        let set = self.registry.get(category_id)?;
        let query = normalize(mask, set.shape())?;
        Metric::iter()
            .map(|metric| {
                let best = best_match(&query, set, category_id, metric.as_metric())?;
                Ok((metric, self.package(best, object)))
            })
            .collect()
    }

    /// Every reference score for the query, in reference order
    pub fn score_table(
        &self,
        mask: &BinaryMask,
        category_id: &str,
        metric: &dyn SimilarityMetric,
    ) -> Result<Vec<ScoredShape>> {
        let set = self.registry.get(category_id)?;
        let query = normalize(mask, set.shape())?;
        score_all(&query, set, category_id, metric)
    }

    fn package(&self, best: ScoredShape, object: &ObjectRef) -> RankingResult {
        RankingResult {
            mask_url: self.url_resolver.mask_url(object),
            most_similar: best.shape_id,
        }
    }
}

/// Highest score wins; ties keep the earliest entry
pub fn select_best(scores: &[ScoredShape]) -> Option<&ScoredShape> {
    let mut best: Option<&ScoredShape> = None;
    for scored in scores {
        if best.is_none_or(|b| scored.score > b.score) {
            best = Some(scored);
        }
    }
    best
}

fn score_all(
    query: &BinaryMask,
    set: &ReferenceSet,
    category_id: &str,
    metric: &dyn SimilarityMetric,
) -> Result<Vec<ScoredShape>> {
    let failed = |shape_id: &str, source: SilhouetteError| SilhouetteError::MetricFailed {
        category: category_id.to_string(),
        metric: metric.name().to_string(),
        shape_id: shape_id.to_string(),
        source: Box::new(source),
    };

    set.binarized()
        .map(|(shape_id, reference)| {
            let score = metric
                .score(query, reference)
                .map_err(|e| failed(shape_id, e))?;
            Ok(ScoredShape {
                shape_id: shape_id.to_string(),
                score,
            })
        })
        .collect()
}

fn best_match(
    query: &BinaryMask,
    set: &ReferenceSet,
    category_id: &str,
    metric: &dyn SimilarityMetric,
) -> Result<ScoredShape> {
    let scores = score_all(query, set, category_id, metric)?;
    let best = select_best(&scores)
        .cloned()
        .ok_or(SilhouetteError::EmptyReferenceSet)?;
    debug!(
        category = category_id,
        metric = metric.name(),
        candidates = scores.len(),
        most_similar = %best.shape_id,
        score = best.score,
        "ranked query mask"
    );
    Ok(best)
}
