use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use silhouette::{
    RankingEngine, ReferenceRegistry, ReferenceSet, SilhouetteError, SilhouetteUrls,
    urls::{DEFAULT_BASE_URL, DEFAULT_IMAGE_FOLDER},
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Silhouette(#[from] SilhouetteError),
    #[error("No reference categories configured")]
    NoCategories,
    #[error("Category '{0}' is configured more than once")]
    DuplicateCategory(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// A directory of reference silhouettes for one category
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CategorySource {
    pub id: String,
    pub path: PathBuf,
}

/// Ranker configuration: where reference data lives and how silhouette
/// URLs are built
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RankerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_folder")]
    pub image_folder: String,
    #[serde(default)]
    pub categories: Vec<CategorySource>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_image_folder() -> String {
    DEFAULT_IMAGE_FOLDER.to_string()
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_folder: default_image_folder(),
            categories: Vec::new(),
        }
    }
}

impl RankerConfig {
    /// Load RankerConfig from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load RankerConfig from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RankerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load RankerConfig from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load RankerConfig from JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: RankerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Auto-detect file format and load configuration. Relative category
    /// paths are resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let mut config = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref)?,
            Some("json") => Self::from_json_file(path_ref)?,
            _ => return Err(ConfigError::UnsupportedFileFormat),
        };
        if let Some(base) = path_ref.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Convert RankerConfig to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert RankerConfig to JSON string
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(ConfigError::DuplicateCategory(category.id.clone()));
            }
        }
        Ok(())
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        for category in &mut self.categories {
            if category.path.is_relative() {
                category.path = base.join(&category.path);
            }
        }
    }

    /// Load every configured category. Runs once at startup.
    pub fn load_registry(&self) -> Result<ReferenceRegistry, ConfigError> {
        let mut registry = ReferenceRegistry::new();
        for category in &self.categories {
            let set = ReferenceSet::load_dir(&category.path)?;
            info!(category = %category.id, shapes = set.len(), "registered reference category");
            registry = registry.with_category(category.id.clone(), set);
        }
        Ok(registry)
    }

    pub fn url_resolver(&self) -> SilhouetteUrls {
        SilhouetteUrls::new(self.base_url.clone(), self.image_folder.clone())
    }

    pub fn build_engine(&self) -> Result<RankingEngine, ConfigError> {
        let registry = self.load_registry()?;
        Ok(RankingEngine::builder(Arc::new(registry))
            .with_url_resolver(self.url_resolver())
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use silhouette::{BinaryMask, ObjectRef};

    const SAMPLE: &str = r#"
base_url = "https://shapes.example"

[[categories]]
id = "countries"
path = "data/countries"

[[categories]]
id = "us_states"
path = "/srv/data/us_states"
"#;

    #[test]
    fn test_from_toml_applies_defaults() {
        let config = RankerConfig::from_toml(SAMPLE).expect("Should parse");
        assert_eq!(config.base_url, "https://shapes.example");
        assert_eq!(config.image_folder, DEFAULT_IMAGE_FOLDER);
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[1].path, PathBuf::from("/srv/data/us_states"));
    }

    #[test]
    fn test_json_and_toml_agree() {
        let config = RankerConfig::from_toml(SAMPLE).expect("Should parse");
        let json = config.to_json().expect("Should serialize");
        assert_eq!(RankerConfig::from_json(&json).expect("Should parse"), config);
        let toml = config.to_toml().expect("Should serialize");
        assert_eq!(RankerConfig::from_toml(&toml).expect("Should parse"), config);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            RankerConfig::from_toml("base_url = \"http://x\""),
            Err(ConfigError::NoCategories)
        ));
        let duplicated = r#"{"categories": [
            {"id": "lakes_and_reservoirs", "path": "a"},
            {"id": "lakes_and_reservoirs", "path": "b"}
        ]}"#;
        assert!(matches!(
            RankerConfig::from_json(duplicated),
            Err(ConfigError::DuplicateCategory(id)) if id == "lakes_and_reservoirs"
        ));
        assert!(matches!(
            RankerConfig::from_file("ranker.yaml"),
            Err(ConfigError::UnsupportedFileFormat)
        ));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let mut config = RankerConfig::from_toml(SAMPLE).expect("Should parse");
        config.resolve_paths(Path::new("/etc/ranker"));
        assert_eq!(config.categories[0].path, PathBuf::from("/etc/ranker/data/countries"));
        assert_eq!(config.categories[1].path, PathBuf::from("/srv/data/us_states"));
    }

    #[test]
    fn test_build_engine_from_file() {
        let root = std::env::temp_dir().join(format!("silhouette-cli-{}", std::process::id()));
        let _ = fs::remove_dir_all(&root);
        let data = root.join("lakes");
        fs::create_dir_all(&data).expect("create dirs");

        let mut wide = GrayImage::new(20, 20);
        let mut tall = GrayImage::new(20, 20);
        for y in 0..20 {
            for x in 0..20 {
                if (7..13).contains(&y) {
                    wide.put_pixel(x, y, Luma([255u8]));
                }
                if (7..13).contains(&x) {
                    tall.put_pixel(x, y, Luma([255u8]));
                }
            }
        }
        wide.save(data.join("erie.png")).expect("save");
        tall.save(data.join("malawi.png")).expect("save");

        let config_path = root.join("ranker.toml");
        fs::write(
            &config_path,
            "[[categories]]\nid = \"lakes_and_reservoirs\"\npath = \"lakes\"\n",
        )
        .expect("write config");

        let config = RankerConfig::from_file(&config_path).expect("Should load");
        let engine = config.build_engine().expect("Should build");

        let query = BinaryMask::from_rows(&vec![vec![1u8; 4]; 10]).expect("valid rows");
        let object = ObjectRef::new("lake_photo.png", 4);
        let result = engine
            .rank_single(&query, "lakes_and_reservoirs", &object, "jaccard")
            .expect("Should rank");
        assert_eq!(result.most_similar, "malawi");
        assert_eq!(
            result.mask_url,
            "http://localhost:5000/static/images/silhouette/lake_photo_obj-4.jpg"
        );

        fs::remove_dir_all(&root).expect("cleanup");
    }
}
