//! # Scenes
//!
//! A [`Scene`] is one self-contained part of a game: a title screen, a level,
//! a cutscene. It owns four collections:
//!
//! - foreground entities (updated and drawn),
//! - background entities (drawn only),
//! - data entities (run at a fixed phase of the frame, never drawn),
//! - resources (images referenced by entity sprites).
//!
//! The game loop drives the scene through the steps below; see
//! [`GameCore::tick`](crate::game::GameCore::tick) for the full frame order.
//!
//! ```text
//! process()                 overlap pass, then foreground update callbacks
//! render()                  background layer, foreground layer, overlay
//! sweep_removed()           drop entities marked with Body::remove
//! evict_unused_resources()  drop resources no body references
//! ```

use std::path::Path;

use image::RgbaImage;

use crate::entity::{
    BackgroundEntity, DataEntity, EntityId, ForegroundEntity, Layer, Phase, UpdateContext,
};
use crate::error::Result;
use crate::render2d::{Color, Surface};
use crate::resource::{Resource, Resources};

/// Draws on top of everything else in the scene, once per tick.
pub type OverlayFn = Box<dyn FnMut(&mut dyn Surface, &Entities)>;

/// The renderable contents of a scene.
#[derive(Default)]
pub struct Entities {
    pub foreground: Layer<ForegroundEntity>,
    pub background: Layer<BackgroundEntity>,
    pub resources: Resources,
}

impl Entities {
    /// True if any foreground or background body draws from `resource`.
    pub fn resource_in_use(&self, resource: EntityId) -> bool {
        self.foreground.references(resource) || self.background.references(resource)
    }
}

/// Entity categories, for [`Scene::total_entities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Foreground,
    Background,
    Resource,
    Data,
}

/// One part of a game, with its own entities and resources.
pub struct Scene {
    id: EntityId,
    name: String,
    background: Option<Color>,
    pub entities: Entities,
    data: Vec<DataEntity>,
    overlay: Option<OverlayFn>,
}

impl Scene {
    pub fn new(name: &str) -> Self {
        Self {
            id: EntityId::next(),
            name: name.to_string(),
            background: None,
            entities: Entities::default(),
            data: Vec::new(),
            overlay: None,
        }
    }

    /// Override the game's background color while this scene is active.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Draw something over the foreground layer every tick (HUD, score...).
    pub fn with_overlay(
        mut self,
        overlay: impl FnMut(&mut dyn Surface, &Entities) + 'static,
    ) -> Self {
        self.overlay = Some(Box::new(overlay));
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn background(&self) -> Option<Color> {
        self.background
    }

    pub fn set_background(&mut self, color: Option<Color>) {
        self.background = color;
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Add on top of the foreground render stack.
    pub fn spawn_foreground(&mut self, entity: ForegroundEntity) -> EntityId {
        self.entities.foreground.push(entity)
    }

    /// Add on top of the background render stack.
    pub fn spawn_background(&mut self, entity: BackgroundEntity) -> EntityId {
        self.entities.background.push(entity)
    }

    pub fn spawn_data(&mut self, entity: DataEntity) -> EntityId {
        let id = entity.id();
        self.data.push(entity);
        id
    }

    pub fn remove_data(&mut self, id: EntityId) -> bool {
        let before = self.data.len();
        self.data.retain(|d| d.id() != id);
        before != self.data.len()
    }

    /// Number of data entities registered for `phase`.
    pub fn data_in_phase(&self, phase: Phase) -> usize {
        self.data.iter().filter(|d| d.phase() == phase).count()
    }

    /// Count entities of the requested kinds. An empty selection counts
    /// foreground, background and resources; data entities are only counted
    /// when asked for.
    pub fn total_entities(&self, kinds: &[EntityKind]) -> usize {
        let count = |kind: &EntityKind| match kind {
            EntityKind::Foreground => self.entities.foreground.len(),
            EntityKind::Background => self.entities.background.len(),
            EntityKind::Resource => self.entities.resources.len(),
            EntityKind::Data => self.data.len(),
        };
        if kinds.is_empty() {
            return [EntityKind::Foreground, EntityKind::Background, EntityKind::Resource]
                .iter()
                .map(count)
                .sum();
        }
        kinds.iter().map(count).sum()
    }

    // ── Resources ────────────────────────────────────────────────────

    /// Register an in-memory image. Returns the existing id if `url` is
    /// already loaded.
    pub fn add_resource(&mut self, url: &str, image: RgbaImage) -> EntityId {
        self.entities.resources.insert(url, Some(image))
    }

    /// Decode an image file into this scene.
    pub fn load_resource(&mut self, path: impl AsRef<Path>) -> Result<EntityId> {
        self.entities.resources.load(path)
    }

    pub fn resource(&self, id: EntityId) -> Option<&Resource> {
        self.entities.resources.get(id)
    }

    pub fn remove_resource(&mut self, id: EntityId) -> bool {
        self.entities.resources.remove(id).is_some()
    }

    // ── Frame steps ──────────────────────────────────────────────────

    /// Recompute every foreground body's overlap list.
    pub fn update_overlaps(&mut self) {
        let boxes: Vec<_> = self
            .entities
            .foreground
            .iter()
            .map(|e| (e.body.id(), e.body.bounding_box()))
            .collect();

        for entity in self.entities.foreground.iter_mut() {
            let id = entity.body.id();
            let bbox = entity.body.bounding_box();
            entity.body.overlaps = boxes
                .iter()
                .filter(|(other, other_box)| *other != id && bbox.overlaps(other_box))
                .map(|(other, _)| *other)
                .collect();
        }
    }

    /// Overlap pass, then every foreground update callback in stack order.
    pub fn process(&mut self, ctx: &UpdateContext<'_>) {
        self.update_overlaps();
        for entity in self.entities.foreground.iter_mut() {
            if let Some(update) = entity.update.as_mut() {
                update(&mut entity.body, ctx);
            }
        }
    }

    /// Draw the background layer, the foreground layer, then the overlay.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let Entities {
            foreground,
            background,
            resources,
        } = &mut self.entities;
        let resources = &*resources;

        for entity in background.iter_mut() {
            entity.draw.draw(&entity.body, &mut *surface, resources);
        }
        for entity in foreground.iter_mut() {
            entity.draw.draw(&entity.body, &mut *surface, resources);
        }

        if let Some(overlay) = self.overlay.as_mut() {
            overlay(surface, &self.entities);
        }
    }

    /// Drop foreground and background entities marked for removal.
    pub fn sweep_removed(&mut self) -> usize {
        self.entities.foreground.sweep() + self.entities.background.sweep()
    }

    /// Drop every resource that no foreground or background body references.
    pub fn evict_unused_resources(&mut self) -> usize {
        let Entities {
            foreground,
            background,
            resources,
        } = &mut self.entities;
        resources.evict_unused(|id| foreground.references(id) || background.references(id))
    }

    pub(crate) fn take_data(&mut self) -> Vec<DataEntity> {
        std::mem::take(&mut self.data)
    }

    /// Put the tick's data entities back, followed by any spawned during it.
    pub(crate) fn restore_data(&mut self, mut data: Vec<DataEntity>, spawned: Vec<DataEntity>) {
        // Anything registered directly on the scene while its data was taken.
        data.append(&mut self.data);
        data.extend(spawned);
        self.data = data;
    }
}
