//! # Scene Resources
//!
//! Images used by sprites are loaded into the scene that draws them. A
//! resource stays loaded only while something references it:
//!
//! ```text
//! load_resource("hero.png") ──► Resource { id, url, image }
//!                                   ▲
//! Sprite { resource: id, .. } ──────┘  (held by a foreground/background body)
//!
//! end of every tick: for each resource
//!     referenced by any foreground/background body?  keep : evict
//! ```
//!
//! Loading the same url twice returns the existing id, so entities sharing an
//! image share one decoded copy. Eviction is O(resources × entities), which is
//! fine at the scale these scenes are meant for.
//!
//! Attach a freshly loaded resource to an entity before the next tick ends, or
//! it will be evicted as unused.

use std::path::Path;

use image::RgbaImage;

use crate::entity::EntityId;
use crate::error::{EaselError, Result};

/// A loaded image owned by a scene.
pub struct Resource {
    id: EntityId,
    url: String,
    image: Option<RgbaImage>,
}

impl Resource {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decoded pixels. `None` for placeholder resources registered without data.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| img.dimensions())
    }
}

/// The set of resources loaded by one scene, in load order.
#[derive(Default)]
pub struct Resources {
    entries: Vec<Resource>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&Resource> {
        self.entries.iter().find(|r| r.id == id)
    }

    pub fn find_url(&self, url: &str) -> Option<&Resource> {
        self.entries.iter().find(|r| r.url == url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter()
    }

    /// Register an image under `url`. If the url is already loaded the existing
    /// id is returned and `image` is dropped.
    pub fn insert(&mut self, url: &str, image: Option<RgbaImage>) -> EntityId {
        if let Some(existing) = self.find_url(url) {
            return existing.id;
        }
        let id = EntityId::next();
        self.entries.push(Resource {
            id,
            url: url.to_string(),
            image,
        });
        log::debug!("Loaded resource {id} '{url}'");
        id
    }

    /// Decode an image file and register it under its path.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<EntityId> {
        let path = path.as_ref();
        let url = path.to_string_lossy();
        if let Some(existing) = self.find_url(&url) {
            return Ok(existing.id);
        }

        let image = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(source) => {
                log::warn!("Failed to load resource '{}': {source}", path.display());
                return Err(EaselError::Image {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(self.insert(&url, Some(image)))
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Resource> {
        let index = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Evict every resource for which `in_use` is false. Only ever removes.
    pub(crate) fn evict_unused(&mut self, in_use: impl Fn(EntityId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|r| {
            let keep = in_use(r.id);
            if !keep {
                log::debug!("Evicting unused resource {} '{}'", r.id, r.url);
            }
            keep
        });
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_dedupes_by_url() {
        let mut resources = Resources::new();
        let a = resources.insert("hero.png", Some(RgbaImage::new(2, 2)));
        let b = resources.insert("hero.png", None);
        let c = resources.insert("tiles.png", None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(resources.len(), 2);
        assert_eq!(resources.get(a).unwrap().dimensions(), Some((2, 2)));
    }

    #[test]
    fn evict_only_removes() {
        let mut resources = Resources::new();
        let keep = resources.insert("a", None);
        let _drop = resources.insert("b", None);
        assert_eq!(resources.evict_unused(|id| id == keep), 1);
        assert_eq!(resources.len(), 1);
        assert!(resources.get(keep).is_some());
        assert_eq!(resources.evict_unused(|_| true), 0);
    }

    #[test]
    fn load_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        RgbaImage::new(4, 3).save(&path).unwrap();

        let mut resources = Resources::new();
        let id = resources.load(&path).unwrap();
        assert_eq!(resources.get(id).unwrap().dimensions(), Some((4, 3)));
        assert_eq!(resources.load(&path).unwrap(), id);
    }

    #[test]
    fn load_missing_file_errors() {
        let mut resources = Resources::new();
        let err = resources.load("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, EaselError::Image { .. }));
        assert!(resources.is_empty());
    }
}
