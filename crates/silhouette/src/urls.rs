use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{traits::MaskUrlResolver, types::ObjectRef};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_IMAGE_FOLDER: &str = "static/images";

/// Silhouette images served from a static folder:
/// `{base_url}/{image_folder}/silhouette/{image_stem}_obj-{object_id}.jpg`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilhouetteUrls {
    pub base_url: String,
    pub image_folder: String,
}

impl SilhouetteUrls {
    pub fn new(base_url: impl Into<String>, image_folder: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            image_folder: image_folder.into(),
        }
    }
}

impl Default for SilhouetteUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_IMAGE_FOLDER)
    }
}

impl MaskUrlResolver for SilhouetteUrls {
    fn mask_url(&self, object: &ObjectRef) -> String {
        let stem = Path::new(&object.image_file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&object.image_file_name);
        format!(
            "{}/{}/silhouette/{}_obj-{}.jpg",
            self.base_url.trim_end_matches('/'),
            self.image_folder.trim_matches('/'),
            stem,
            object.object_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let urls = SilhouetteUrls::default();
        let object = ObjectRef::new("beach.png", 3);
        assert_eq!(
            urls.mask_url(&object),
            "http://localhost:5000/static/images/silhouette/beach_obj-3.jpg"
        );
    }

    #[test]
    fn test_directories_and_slashes_are_dropped() {
        let urls = SilhouetteUrls::new("https://shapes.example/", "/media/");
        let object = ObjectRef::new("uploads/2024/dog.photo.jpeg", 0);
        assert_eq!(
            urls.mask_url(&object),
            "https://shapes.example/media/silhouette/dog.photo_obj-0.jpg"
        );
    }
}
