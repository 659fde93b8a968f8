//! # Render2d: the drawing surface
//!
//! Everything a game draws goes through a [`Surface`], the "pen" of the game.
//! The trait is deliberately small: filled rectangles and image blits cover
//! solid-colored entities, sprite sheets and full-surface clears.
//!
//! ```text
//!  GameCore::tick
//!     │ begin_frame()
//!     │ clear(background)            step 5
//!     ▼
//!  Scene::render
//!     │ background layer ─► fill_rect / draw_image
//!     │ foreground layer ─► fill_rect / draw_image
//!     │ overlay          ─► anything
//!     ▼
//!  Surface (Canvas, or a host-provided implementation)
//! ```
//!
//! [`Canvas`] is the built-in software implementation. Hosts that own a real
//! window or a browser canvas implement [`Surface`] for their own context.

pub mod canvas;
pub mod sprite;

pub use canvas::Canvas;
pub use sprite::{Sprite, SpriteSheet};

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::EaselError;

/// An RGBA color with floating-point components in [0, 1].
///
/// Parses from CSS-style names (`"white"`, `"cornflowerblue"`) and hex strings
/// (`#rgb`, `#rrggbb`, `#rrggbbaa`). Serialises as `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const RED: Self = Self { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Self = Self { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Self = Self { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Create a color from RGB (alpha = 1).
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    fn named(name: &str) -> Option<Self> {
        let [r, g, b] = match name {
            "white" => [255, 255, 255],
            "black" => [0, 0, 0],
            "red" => [255, 0, 0],
            "lime" => [0, 255, 0],
            "green" => [0, 128, 0],
            "blue" => [0, 0, 255],
            "yellow" => [255, 255, 0],
            "cyan" | "aqua" => [0, 255, 255],
            "magenta" | "fuchsia" => [255, 0, 255],
            "gray" | "grey" => [128, 128, 128],
            "silver" => [192, 192, 192],
            "maroon" => [128, 0, 0],
            "navy" => [0, 0, 128],
            "olive" => [128, 128, 0],
            "purple" => [128, 0, 128],
            "teal" => [0, 128, 128],
            "orange" => [255, 165, 0],
            "pink" => [255, 192, 203],
            "brown" => [165, 42, 42],
            "skyblue" => [135, 206, 235],
            "cornflowerblue" => [100, 149, 237],
            "transparent" => return Some(Self::TRANSPARENT),
            _ => return None,
        };
        Some(Self::from_rgba8(r, g, b, 255))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let invalid = || EaselError::InvalidColor(s.to_string());

        let Some(hex) = trimmed.strip_prefix('#') else {
            return Self::named(&trimmed).ok_or_else(invalid);
        };
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| invalid());
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            // #rgb expands each digit (0xf → 0xff).
            3 => Ok(Self::from_rgba8(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255)),
            6 => Ok(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Ok(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = EaselError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

/// A rectangle in whole pixels, used to select a cell of a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The pen: a 2D drawing target.
///
/// Coordinates are in surface pixels with the origin at the top-left corner.
/// Implementations clip anything that falls outside the surface.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Change the surface dimensions. Contents after a resize are unspecified.
    fn resize(&mut self, width: u32, height: u32);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Copy `src` out of `image` and draw it scaled into the destination
    /// rectangle.
    fn draw_image(
        &mut self,
        image: &RgbaImage,
        src: PixelRect,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    );

    /// Called once per tick, just before the surface is cleared.
    fn begin_frame(&mut self) {}

    /// Fill the whole surface.
    fn clear(&mut self, color: Color) {
        let (w, h) = self.size();
        self.fill_rect(0.0, 0.0, w as f32, h as f32, color);
    }
}
