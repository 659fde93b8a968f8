//! # Entities
//!
//! A scene holds three kinds of entity:
//!
//! | kind                 | updated | rendered | typical use                     |
//! |----------------------|---------|----------|---------------------------------|
//! | [`ForegroundEntity`] | yes     | yes      | players, enemies, pickups       |
//! | [`BackgroundEntity`] | no      | yes      | scenery, decoration             |
//! | [`DataEntity`]       | phase   | no       | game rules, scoring, spawners    |
//!
//! Foreground and background entities share a [`Body`]: a rectangle with a
//! color, an optional sprite and a few bookkeeping fields. Behaviour is attached
//! as boxed closures rather than through subclassing.
//!
//! Entities live in a [`Layer`], which is also the render stack: index 0 is
//! drawn first, the last entity is drawn on top.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::frame::Frame;
use crate::input::InputState;
use crate::math::{BoundingBox, Origin, Placement, Vec2};
use crate::render2d::{Color, Sprite, Surface};
use crate::resource::Resources;
use crate::time::Time;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier for scenes, entities, resources and input actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocate the next identifier. Identifiers are never reused.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Body ─────────────────────────────────────────────────────────────────

/// The visible, rectangular part of a foreground or background entity.
#[derive(Debug, Clone)]
pub struct Body {
    id: EntityId,
    pub placement: Placement,
    /// Fill color used by the default renderer when there is no sprite.
    pub color: Color,
    /// Free-form type label, e.g. `"enemy"`, for telling overlaps apart.
    pub kind: String,
    pub sprite: Option<Sprite>,
    /// Foreground entities overlapping this one, recomputed every tick.
    pub(crate) overlaps: Vec<EntityId>,
    pub(crate) removed: bool,
}

impl Body {
    fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: EntityId::next(),
            placement: Placement::new(x, y, width, height),
            color: Color::BLACK,
            kind: String::new(),
            sprite: None,
            overlaps: Vec::new(),
            removed: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.placement.position
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.placement.position = Vec2::new(x, y);
    }

    /// Move by an offset.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.placement.position += Vec2::new(dx, dy);
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.placement.bounding_box()
    }

    /// Foreground entities that overlapped this one at the last overlap pass.
    pub fn overlaps(&self) -> &[EntityId] {
        &self.overlaps
    }

    /// Resource this body draws from, if any.
    pub fn resource(&self) -> Option<EntityId> {
        self.sprite.as_ref().map(|s| s.resource)
    }

    /// Mark for removal. The scene drops the entity at the end of the tick, so
    /// callbacks running later in the same tick still see it.
    pub fn remove(&mut self) {
        self.removed = true;
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Draw a body the default way: its sprite frame if the sprite's resource is
/// loaded, otherwise a solid fill of its bounding box.
pub fn draw_body(body: &Body, surface: &mut dyn Surface, resources: &Resources) {
    let bbox = body.bounding_box();

    if let Some(sprite) = &body.sprite {
        if let Some(image) = resources.get(sprite.resource).and_then(|r| r.image()) {
            let (w, h) = sprite.draw_size();
            surface.draw_image(image, sprite.sheet.source_rect(), bbox.left, bbox.top, w, h);
            return;
        }
    }

    surface.fill_rect(bbox.left, bbox.top, bbox.width(), bbox.height(), body.color);
}

// ── Callback types ───────────────────────────────────────────────────────

/// Read-only view handed to foreground update callbacks.
pub struct UpdateContext<'a> {
    pub input: &'a InputState,
    pub time: &'a Time,
    /// Surface size in pixels.
    pub bounds: (u32, u32),
}

pub type UpdateFn = Box<dyn FnMut(&mut Body, &UpdateContext<'_>)>;
pub type RenderFn = Box<dyn FnMut(&Body, &mut dyn Surface, &Resources)>;
pub type DataFn = Box<dyn FnMut(&mut Frame<'_>)>;

/// How a foreground or background entity is drawn: an optional replacement
/// for [`draw_body`], plus hooks run just before and just after it.
#[derive(Default)]
pub(crate) struct DrawHooks {
    pub(crate) render: Option<RenderFn>,
    pub(crate) before: Option<RenderFn>,
    pub(crate) after: Option<RenderFn>,
}

impl DrawHooks {
    pub(crate) fn draw(&mut self, body: &Body, surface: &mut dyn Surface, resources: &Resources) {
        if let Some(before) = self.before.as_mut() {
            before(body, &mut *surface, resources);
        }
        match self.render.as_mut() {
            Some(render) => render(body, &mut *surface, resources),
            None => draw_body(body, &mut *surface, resources),
        }
        if let Some(after) = self.after.as_mut() {
            after(body, surface, resources);
        }
    }
}

// ── Foreground ───────────────────────────────────────────────────────────

/// An interactive entity: updated and drawn every tick.
///
/// ```ignore
/// let player = ForegroundEntity::new(10.0, 10.0, 16.0, 16.0)
///     .color(Color::GREEN)
///     .kind("player")
///     .on_update(|body, ctx| {
///         if ctx.input.action_pressed("right") {
///             body.translate(2.0, 0.0);
///         }
///     });
/// scene.spawn_foreground(player);
/// ```
pub struct ForegroundEntity {
    pub body: Body,
    pub(crate) update: Option<UpdateFn>,
    pub(crate) draw: DrawHooks,
}

impl ForegroundEntity {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            body: Body::new(x, y, width, height),
            update: None,
            draw: DrawHooks::default(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.body.color = color;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.body.placement.origin = origin;
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.body.kind = kind.to_string();
        self
    }

    pub fn sprite(mut self, sprite: Sprite) -> Self {
        self.body.sprite = Some(sprite);
        self
    }

    /// Per-tick behaviour, run in step 6 of the frame.
    pub fn on_update(
        mut self,
        update: impl FnMut(&mut Body, &UpdateContext<'_>) + 'static,
    ) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    /// Replace the default renderer.
    pub fn on_render(
        mut self,
        render: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.render = Some(Box::new(render));
        self
    }

    /// Draw something beneath the entity, e.g. a shadow.
    pub fn before_draw(
        mut self,
        hook: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.before = Some(Box::new(hook));
        self
    }

    /// Draw something over the entity, e.g. a health bar.
    pub fn after_draw(
        mut self,
        hook: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.after = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> EntityId {
        self.body.id
    }
}

// ── Background ───────────────────────────────────────────────────────────

/// A decorative entity: drawn every tick but never updated. Change its look
/// from a custom renderer or from a data entity.
pub struct BackgroundEntity {
    pub body: Body,
    pub(crate) draw: DrawHooks,
}

impl BackgroundEntity {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            body: Body::new(x, y, width, height),
            draw: DrawHooks::default(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.body.color = color;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.body.placement.origin = origin;
        self
    }

    pub fn kind(mut self, kind: &str) -> Self {
        self.body.kind = kind.to_string();
        self
    }

    pub fn sprite(mut self, sprite: Sprite) -> Self {
        self.body.sprite = Some(sprite);
        self
    }

    pub fn on_render(
        mut self,
        render: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.render = Some(Box::new(render));
        self
    }

    /// Draw something beneath the entity, e.g. a shadow.
    pub fn before_draw(
        mut self,
        hook: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.before = Some(Box::new(hook));
        self
    }

    /// Draw something over the entity, e.g. a health bar.
    pub fn after_draw(
        mut self,
        hook: impl FnMut(&Body, &mut dyn Surface, &Resources) + 'static,
    ) -> Self {
        self.draw.after = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> EntityId {
        self.body.id
    }
}

// ── Data ─────────────────────────────────────────────────────────────────

/// Where in the frame a data entity runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Before input actions are processed.
    Start,
    /// After input actions, before the surface is cleared.
    AfterInput,
    /// After rendering, before unused resources are evicted.
    End,
}

/// A non-rendering entity that runs game logic at a fixed point of the frame.
pub struct DataEntity {
    id: EntityId,
    phase: Phase,
    pub(crate) callback: DataFn,
}

impl DataEntity {
    pub fn new(phase: Phase, callback: impl FnMut(&mut Frame<'_>) + 'static) -> Self {
        Self {
            id: EntityId::next(),
            phase,
            callback: Box::new(callback),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

// ── Layer ────────────────────────────────────────────────────────────────

/// Anything that can sit in a [`Layer`].
pub trait Layered {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
}

impl Layered for ForegroundEntity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Layered for BackgroundEntity {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// An ordered render stack. Registration order is draw order; the reordering
/// methods log and do nothing when the move is impossible.
pub struct Layer<T> {
    items: Vec<T>,
}

impl<T: Layered> Layer<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append on top of the stack.
    pub fn push(&mut self, item: T) -> EntityId {
        let id = item.body().id();
        self.items.push(item);
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stack index of an entity (0 = drawn first).
    pub fn position(&self, id: EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.body().id() == id)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.body().id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.body().id() == id)
    }

    /// Convenience: the body of an entity.
    pub fn body_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.get_mut(id).map(|item| item.body_mut())
    }

    /// First entity with the given kind label.
    pub fn find_kind(&self, kind: &str) -> Option<&T> {
        self.items.iter().find(|item| item.body().kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }

    /// Ids in draw order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|item| item.body().id()).collect()
    }

    /// Remove immediately. Prefer [`Body::remove`] from inside callbacks.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Drop every entity marked for removal. Returns how many were dropped.
    pub(crate) fn sweep(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.body().is_removed());
        before - self.items.len()
    }

    pub(crate) fn references(&self, resource: EntityId) -> bool {
        self.items.iter().any(|item| item.body().resource() == Some(resource))
    }

    /// Swap one place toward the top of the stack.
    pub fn move_up(&mut self, id: EntityId) -> bool {
        let Some(index) = self.locate(id) else { return false };
        if index + 1 == self.items.len() {
            log::info!("Entity {id} is already at the top of the render stack");
            return false;
        }
        self.items.swap(index, index + 1);
        true
    }

    /// Swap one place toward the bottom of the stack.
    pub fn move_down(&mut self, id: EntityId) -> bool {
        let Some(index) = self.locate(id) else { return false };
        if index == 0 {
            log::info!("Entity {id} is already at the bottom of the render stack");
            return false;
        }
        self.items.swap(index, index - 1);
        true
    }

    /// Draw first (beneath everything else).
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        let Some(index) = self.locate(id) else { return false };
        let item = self.items.remove(index);
        self.items.insert(0, item);
        true
    }

    /// Draw last (on top of everything else).
    pub fn send_to_front(&mut self, id: EntityId) -> bool {
        let Some(index) = self.locate(id) else { return false };
        let item = self.items.remove(index);
        self.items.push(item);
        true
    }

    /// Place `id` directly beneath `target`.
    pub fn move_before(&mut self, id: EntityId, target: EntityId) -> bool {
        self.relocate(id, target, 0)
    }

    /// Place `id` directly above `target`.
    pub fn move_after(&mut self, id: EntityId, target: EntityId) -> bool {
        self.relocate(id, target, 1)
    }

    fn relocate(&mut self, id: EntityId, target: EntityId, offset: usize) -> bool {
        if id == target {
            return false;
        }
        let (Some(index), Some(_)) = (self.locate(id), self.locate(target)) else {
            return false;
        };
        let item = self.items.remove(index);
        // Look the target up again: removing `id` may have shifted it.
        let Some(target_index) = self.position(target) else {
            self.items.insert(index, item);
            return false;
        };
        self.items.insert(target_index + offset, item);
        true
    }

    fn locate(&self, id: EntityId) -> Option<usize> {
        let index = self.position(id);
        if index.is_none() {
            log::warn!("Entity {id} is not in this layer");
        }
        index
    }
}

impl<T: Layered> Default for Layer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_of(n: usize) -> (Layer<BackgroundEntity>, Vec<EntityId>) {
        let mut layer = Layer::new();
        let ids = (0..n)
            .map(|i| layer.push(BackgroundEntity::new(i as f32, 0.0, 1.0, 1.0)))
            .collect();
        (layer, ids)
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert!(b > a);
    }

    #[test]
    fn push_keeps_registration_order() {
        let (layer, ids) = layer_of(3);
        assert_eq!(layer.ids(), ids);
        assert_eq!(layer.position(ids[2]), Some(2));
    }

    #[test]
    fn move_up_and_down() {
        let (mut layer, ids) = layer_of(3);
        assert!(layer.move_up(ids[0]));
        assert_eq!(layer.ids(), vec![ids[1], ids[0], ids[2]]);
        assert!(!layer.move_up(ids[2]));
        assert!(layer.move_down(ids[0]));
        assert_eq!(layer.ids(), ids);
        assert!(!layer.move_down(ids[0]));
    }

    #[test]
    fn send_to_back_and_front() {
        let (mut layer, ids) = layer_of(4);
        layer.send_to_front(ids[0]);
        assert_eq!(layer.ids(), vec![ids[1], ids[2], ids[3], ids[0]]);
        layer.send_to_back(ids[3]);
        assert_eq!(layer.ids(), vec![ids[3], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn move_before_and_after() {
        let (mut layer, ids) = layer_of(4);
        assert!(layer.move_before(ids[3], ids[1]));
        assert_eq!(layer.ids(), vec![ids[0], ids[3], ids[1], ids[2]]);
        assert!(layer.move_after(ids[0], ids[2]));
        assert_eq!(layer.ids(), vec![ids[3], ids[1], ids[2], ids[0]]);
        // Unknown target leaves the stack untouched.
        assert!(!layer.move_after(ids[1], EntityId::next()));
        assert_eq!(layer.ids(), vec![ids[3], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn sweep_drops_marked() {
        let (mut layer, ids) = layer_of(3);
        layer.body_mut(ids[1]).unwrap().remove();
        assert_eq!(layer.len(), 3);
        assert_eq!(layer.sweep(), 1);
        assert_eq!(layer.ids(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn resource_reference_via_sprite() {
        use crate::render2d::SpriteSheet;

        let resource = EntityId::next();
        let mut layer = Layer::new();
        layer.push(
            ForegroundEntity::new(0.0, 0.0, 8.0, 8.0)
                .sprite(Sprite::new(resource, SpriteSheet::new(8, 8, 1, 1))),
        );
        assert!(layer.references(resource));
        assert!(!layer.references(EntityId::next()));
    }
}
