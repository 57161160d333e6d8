//! Core types shared by every stage: geometry, colors, configuration.

pub mod color;
pub mod config;
pub mod geometry;

pub use color::Rgba;
pub use config::{
    points_to_pixels, LoadOptions, PrintProfile, RenderConfig, COMMERCIAL_CARD_SIZE,
    COMMERCIAL_PAD, DEFAULT_CARD_SIZE,
};
pub use geometry::{resolve_size, Rect, Size, ASPECT, NATURAL};
