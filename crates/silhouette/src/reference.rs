//! Immutable reference silhouettes, grouped by category.
//!
//! A [`ReferenceSet`] is validated once when it is built and exposes no way
//! to mutate it afterwards, so one registry can be shared behind an `Arc`
//! by any number of concurrent ranking calls.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use image::GrayImage;
use tracing::{debug, info};

use crate::{
    algorithms::binarize,
    error::{Result, SilhouetteError},
    types::{BinaryMask, Shape},
};

/// Standard reference categories
pub const COUNTRIES: &str = "countries";
pub const US_STATES: &str = "us_states";
pub const LAKES_AND_RESERVOIRS: &str = "lakes_and_reservoirs";

/// Stored 0/255 silhouettes sharing one canonical shape, in a fixed order
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    shape: Shape,
    entries: Vec<(String, GrayImage)>,
    masks: Vec<BinaryMask>,
}

impl ReferenceSet {
    /// Validate and freeze `entries`. Enumeration order is the order given.
    pub fn new(entries: Vec<(String, GrayImage)>) -> Result<Self> {
        let Some((_, first)) = entries.first() else {
            return Err(SilhouetteError::EmptyReferenceSet);
        };
        let shape = Shape::of(first);
        if shape.is_empty() {
            return Err(SilhouetteError::EmptyGrid);
        }

        let mut seen = HashSet::new();
        let mut masks = Vec::with_capacity(entries.len());
        for (shape_id, image) in &entries {
            if !seen.insert(shape_id.as_str()) {
                return Err(SilhouetteError::DuplicateShapeId(shape_id.clone()));
            }
            let found = Shape::of(image);
            if found != shape {
                return Err(SilhouetteError::InconsistentReferenceShape {
                    shape_id: shape_id.clone(),
                    expected: shape,
                    found,
                });
            }
            masks.push(binarize(image)?);
        }

        Ok(Self { shape, entries, masks })
    }

    /// Load every `*.png` in `dir`; the file stem is the shape id and
    /// entries are ordered by id.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if path.is_file() && is_png {
                paths.push(path);
            }
        }
        paths.sort();

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(shape_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            debug!(shape_id, path = %path.display(), "loading reference silhouette");
            let image = image::open(&path)?.to_luma8();
            entries.push((shape_id.to_string(), image));
        }

        let set = Self::new(entries)?;
        info!(dir = %dir.display(), shapes = set.len(), shape = %set.shape(), "loaded reference set");
        Ok(set)
    }

    /// Canonical shape shared by every entry
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn get(&self, shape_id: &str) -> Option<&GrayImage> {
        self.entries
            .iter()
            .find(|(id, _)| id == shape_id)
            .map(|(_, image)| image)
    }

    /// Raw entries in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GrayImage)> {
        self.entries.iter().map(|(id, image)| (id.as_str(), image))
    }

    /// Entries as 0/1 masks, in enumeration order
    pub fn binarized(&self) -> impl Iterator<Item = (&str, &BinaryMask)> {
        self.ids().zip(&self.masks)
    }
}

/// Reference sets keyed by category id
#[derive(Debug, Clone, Default)]
pub struct ReferenceRegistry {
    categories: HashMap<String, ReferenceSet>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category while the registry is still being assembled
    pub fn with_category(mut self, category_id: impl Into<String>, set: ReferenceSet) -> Self {
        self.categories.insert(category_id.into(), set);
        self
    }

    /// Load one directory per category
    pub fn load<I, S, P>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<Path>,
    {
        let mut registry = Self::new();
        for (category_id, dir) in sources {
            let set = ReferenceSet::load_dir(dir)?;
            registry = registry.with_category(category_id, set);
        }
        Ok(registry)
    }

    /// Look up a category, failing with `UnknownCategory`
    pub fn get(&self, category_id: &str) -> Result<&ReferenceSet> {
        self.categories
            .get(category_id)
            .ok_or_else(|| SilhouetteError::UnknownCategory(category_id.to_string()))
    }

    pub fn contains(&self, category_id: &str) -> bool {
        self.categories.contains_key(category_id)
    }

    /// Category ids in sorted order
    pub fn categories(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn silhouette(width: u32, height: u32, lit: &[(u32, u32)]) -> GrayImage {
        let mut image = GrayImage::new(width, height);
        for &(x, y) in lit {
            image.put_pixel(x, y, Luma([255]));
        }
        image
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("silhouette-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_new_preserves_insertion_order() {
        let set = ReferenceSet::new(vec![
            ("zw".to_string(), silhouette(4, 3, &[(0, 0)])),
            ("ad".to_string(), silhouette(4, 3, &[])),
            ("fr".to_string(), silhouette(4, 3, &[(3, 2)])),
        ])
        .expect("valid set");
        assert_eq!(set.shape(), Shape::new(3, 4));
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["zw", "ad", "fr"]);
        let masks: Vec<u64> = set
            .binarized()
            .map(|(_, mask)| mask.count_ones())
            .collect();
        assert_eq!(masks, vec![1, 0, 1]);
        for ((_, mask), (_, raw)) in set.binarized().zip(set.iter()) {
            assert_eq!(mask, &binarize(raw).expect("binary"));
        }
    }

    #[test]
    fn test_new_rejects_invalid_sets() {
        assert!(matches!(
            ReferenceSet::new(vec![]),
            Err(SilhouetteError::EmptyReferenceSet)
        ));
        assert!(matches!(
            ReferenceSet::new(vec![
                ("a".to_string(), silhouette(4, 4, &[])),
                ("b".to_string(), silhouette(4, 5, &[])),
            ]),
            Err(SilhouetteError::InconsistentReferenceShape { .. })
        ));
        assert!(matches!(
            ReferenceSet::new(vec![
                ("a".to_string(), silhouette(4, 4, &[])),
                ("a".to_string(), silhouette(4, 4, &[])),
            ]),
            Err(SilhouetteError::DuplicateShapeId(_))
        ));

        let mut grey = silhouette(2, 2, &[]);
        grey.put_pixel(1, 1, Luma([7]));
        assert!(matches!(
            ReferenceSet::new(vec![("a".to_string(), grey)]),
            Err(SilhouetteError::NonBinaryValue { value: 7, .. })
        ));
    }

    #[test]
    fn test_registry_lookup() {
        let set = ReferenceSet::new(vec![("ch".to_string(), silhouette(2, 2, &[]))])
            .expect("valid set");
        let registry = ReferenceRegistry::new()
            .with_category(COUNTRIES, set.clone())
            .with_category(LAKES_AND_RESERVOIRS, set);
        assert_eq!(registry.categories(), vec![COUNTRIES, LAKES_AND_RESERVOIRS]);
        assert!(registry.get(COUNTRIES).is_ok());
        assert!(matches!(
            registry.get(US_STATES),
            Err(SilhouetteError::UnknownCategory(id)) if id == US_STATES
        ));
    }

    #[test]
    fn test_load_dir_sorts_by_stem() {
        let dir = temp_dir("load-dir");
        silhouette(6, 5, &[(1, 1)]).save(dir.join("texas.png")).expect("save");
        silhouette(6, 5, &[(2, 2), (3, 3)]).save(dir.join("ohio.png")).expect("save");
        silhouette(6, 5, &[]).save(dir.join("alaska.png")).expect("save");
        fs::write(dir.join("README.txt"), "not a silhouette").expect("write");

        let set = ReferenceSet::load_dir(&dir).expect("load");
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["alaska", "ohio", "texas"]);
        assert_eq!(set.shape(), Shape::new(5, 6));
        assert_eq!(set.get("ohio").map(|img| img.get_pixel(3, 3)[0]), Some(255));

        let registry = ReferenceRegistry::load([(US_STATES, &dir)]).expect("load registry");
        assert_eq!(registry.get(US_STATES).expect("category").len(), 3);

        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
