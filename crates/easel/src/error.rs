//! Error type shared by every fallible easel operation.

use std::path::PathBuf;

/// Everything that can go wrong while configuring or running a game.
#[derive(Debug, thiserror::Error)]
pub enum EaselError {
    /// A tick was requested but the game has no scenes.
    #[error("no scenes defined")]
    NoScenes,

    /// A scene index does not point into the scene list.
    #[error("scene index {index} out of range ({count} scenes)")]
    SceneOutOfRange { index: usize, count: usize },

    /// The drawing surface has no pixels to draw on.
    #[error("drawing surface has zero area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    /// The configured framerate cannot drive a fixed tick.
    #[error("framerate must be at least 1 tick per second")]
    InvalidFramerate,

    /// A color string could not be parsed.
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// An input action could not be bound.
    #[error("input binding failed: {0}")]
    InvalidBinding(String),

    /// The game loop has already terminated.
    #[error("game loop is stopped")]
    Stopped,

    /// An image resource failed to decode.
    #[error("failed to load image '{}': {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, EaselError>;
