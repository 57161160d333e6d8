//! Rasterization: from primitives to print-ready PNG files.
//!
//! ## Key Types
//!
//! - `Canvas`: source-over RGBA drawing surface with rotated sprites
//! - `FontBook`: fonts loaded from disk, also the `TextMetrics` provider
//! - `Renderer`: renders faces, cards and whole decks to files
//!
//! `print` holds the output geometry steps applied after rasterization.

pub mod canvas;
pub mod fonts;
pub mod print;
pub mod renderer;

pub use canvas::Canvas;
pub use fonts::{BookMetrics, FontBook};
pub use print::{apply_profile, pad_image, rescale};
pub use renderer::{face_file_name, RenderReport, Renderer};
