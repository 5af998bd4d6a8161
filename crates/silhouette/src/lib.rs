//! # Silhouette Similarity Library
//!
//! Compares a segmented object mask against libraries of reference
//! silhouettes (countries, US states, lakes and reservoirs) and reports the
//! most similar shape.
//!
//! ## Core Features
//!
//! - **Shape Normalization**: fit-inside rescaling, centroid centering and
//!   symmetric padding onto a category's canonical grid
//! - **Six Metrics**: hamming, ssim, chamfer, hausdorff, dice and jaccard,
//!   each an independent pure function
//! - **Trait-based Metrics**: rank with your own [`SimilarityMetric`]
//! - **Immutable Reference Data**: validated once, shared by every query
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use silhouette::{BinaryMask, ObjectRef, RankingEngine, ReferenceRegistry};
//!
//! let registry = ReferenceRegistry::load([("countries", "data/countries")])?;
//! let engine = RankingEngine::builder(Arc::new(registry)).build();
//!
//! let mask = BinaryMask::from_json("[[0,1,1],[1,1,0]]")?;
//! let object = ObjectRef::new("photo.jpg", 0);
//! let best = engine.rank_single(&mask, "countries", &object, "dice")?;
//! println!("{} -> {}", best.most_similar, best.mask_url);
//!
//! // Every metric at once, sharing one normalized query
//! let all = engine.rank_all(&mask, "countries", &object)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod error;
pub mod types;
pub mod traits;
pub mod algorithms;
pub mod metric;
pub mod reference;
pub mod ranking;
pub mod urls;

// Re-exports for convenience
pub use error::{SilhouetteError, Result};
pub use types::{BinaryMask, ObjectRef, RankingResult, ScoredShape, Shape};
pub use traits::*;
pub use algorithms::*;
pub use metric::Metric;
pub use reference::{ReferenceRegistry, ReferenceSet};
pub use ranking::{RankingEngine, builder::RankingEngineBuilder, select_best};
pub use urls::SilhouetteUrls;
