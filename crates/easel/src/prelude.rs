//! Convenience re-exports: `use easel::prelude::*` for the common items.

pub use crate::action::{ActionQueue, ActionStatus, InputAction};
pub use crate::entity::{
    BackgroundEntity, Body, DataEntity, EntityId, ForegroundEntity, Layer, Phase, UpdateContext,
};
pub use crate::error::{EaselError, Result};
pub use crate::frame::Frame;
pub use crate::game::GameCore;
pub use crate::input::{CursorPosition, InputState, KeyCode, MouseButton};
pub use crate::math::{BoundingBox, Origin, Placement, Vec2};
pub use crate::render2d::{Canvas, Color, PixelRect, Sprite, SpriteSheet, Surface};
pub use crate::resource::{Resource, Resources};
pub use crate::scene::{Entities, EntityKind, Scene};
pub use crate::settings::GameSettings;
pub use crate::time::Time;
