use std::sync::Arc;

use crate::{
    ranking::RankingEngine,
    reference::ReferenceRegistry,
    traits::MaskUrlResolver,
    urls::SilhouetteUrls,
};

/// Builder for creating ranking engines with a fluent API
pub struct RankingEngineBuilder {
    registry: Arc<ReferenceRegistry>,
    url_resolver: Option<Box<dyn MaskUrlResolver>>,
}

impl RankingEngineBuilder {
    pub fn new(registry: Arc<ReferenceRegistry>) -> Self {
        Self {
            registry,
            url_resolver: None,
        }
    }

    /// Set the URL resolver (replaces any existing one)
    pub fn with_url_resolver<R>(mut self, resolver: R) -> Self
    where
        R: MaskUrlResolver + 'static,
    {
        self.url_resolver = Some(Box::new(resolver));
        self
    }

    /// Serve silhouettes from `{base_url}/{image_folder}/silhouette/`
    pub fn with_silhouette_urls(
        self,
        base_url: impl Into<String>,
        image_folder: impl Into<String>,
    ) -> Self {
        self.with_url_resolver(SilhouetteUrls::new(base_url, image_folder))
    }

    /// Build the engine, falling back to the default silhouette URLs
    pub fn build(self) -> RankingEngine {
        let url_resolver = self
            .url_resolver
            .unwrap_or_else(|| Box::new(SilhouetteUrls::default()));
        RankingEngine::new(self.registry, url_resolver)
    }
}
