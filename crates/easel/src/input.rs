//! Keyboard and mouse input state, and keyword bindings.
//!
//! [`Input`] tracks which keys/buttons are currently pressed, just pressed this
//! frame, or just released this frame. [`InputState`] bundles keyboard, mouse
//! and cursor with a table of keyword bindings, so game code can ask about
//! `"jump"` instead of a particular key. Several keys may share one keyword.
//!
//! The host feeds events through [`GameCore`](crate::game::GameCore)
//! (`press_key`, `release_key`, ...). Per-frame edges are cleared at the end of
//! every tick.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::error::{EaselError, Result};

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this frame.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this frame.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    pub(crate) fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub(crate) fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    /// Clear per-frame state.
    pub(crate) fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse cursor position in surface coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

/// Keyboard, mouse and cursor state plus keyword bindings.
#[derive(Default)]
pub struct InputState {
    pub(crate) keys: Input<KeyCode>,
    pub(crate) mouse: Input<MouseButton>,
    pub(crate) cursor: CursorPosition,
    bindings: HashMap<String, Vec<KeyCode>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `keyword`. Binding the same pair twice is a no-op.
    pub fn bind(&mut self, keyword: &str, key: KeyCode) -> Result<()> {
        if keyword.trim().is_empty() {
            log::warn!("Input binding failed: keyword must not be empty");
            return Err(EaselError::InvalidBinding("keyword must not be empty".into()));
        }
        let keys = self.bindings.entry(keyword.to_string()).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
        Ok(())
    }

    /// Remove every key bound to `keyword`.
    pub fn unbind(&mut self, keyword: &str) {
        self.bindings.remove(keyword);
    }

    /// Keys bound to `keyword`, in binding order.
    pub fn bound_keys(&self, keyword: &str) -> &[KeyCode] {
        self.bindings.get(keyword).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Any key bound to `keyword` is held down.
    pub fn action_pressed(&self, keyword: &str) -> bool {
        self.bound_keys(keyword).iter().any(|k| self.keys.pressed(*k))
    }

    /// Any key bound to `keyword` went down this frame.
    pub fn action_just_pressed(&self, keyword: &str) -> bool {
        self.bound_keys(keyword).iter().any(|k| self.keys.just_pressed(*k))
    }

    /// Any key bound to `keyword` went up this frame.
    pub fn action_just_released(&self, keyword: &str) -> bool {
        self.bound_keys(keyword).iter().any(|k| self.keys.just_released(*k))
    }

    pub fn pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed(key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.keys.just_pressed(key)
    }

    pub fn just_released(&self, key: KeyCode) -> bool {
        self.keys.just_released(key)
    }

    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse.pressed(button)
    }

    pub fn mouse_just_pressed(&self, button: MouseButton) -> bool {
        self.mouse.just_pressed(button)
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    pub(crate) fn clear_just(&mut self) {
        self.keys.clear_just();
        self.mouse.clear_just();
    }
}
