//! # Easel: 2D canvas game utilities
//!
//! A small fixed-tick game loop over a 2D drawing surface. A game is a list of
//! [`Scene`](scene::Scene)s; the active one is updated and drawn every tick by
//! [`GameCore`](game::GameCore). Scenes hold foreground entities (updated and
//! drawn), background entities (drawn only), data entities (logic run at a
//! fixed phase of the frame) and image resources for sprites.
//!
//! Start with `use easel::prelude::*` and build a [`GameCore`](game::GameCore).

pub mod action;
pub mod entity;
pub mod error;
pub mod frame;
pub mod game;
pub mod input;
pub mod logging;
pub mod math;
pub mod prelude;
pub mod render2d;
pub mod resource;
pub mod scene;
pub mod settings;
pub mod time;

pub use error::{EaselError, Result};
