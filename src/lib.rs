//! # rust-cardforge
//!
//! Deck compositing and card rendering for printable card games.
//!
//! A deck file declares assets (source files, image crops, styles) and cards
//! made of positioned renderables. This crate turns it into one PNG per card
//! face, ready for print or tabletop import.
//!
//! ## Design Principles
//!
//! 1. **Everything by name**: renderables reference styles, images and
//!    cards by name. Unknown names warn and fall back; they never abort a
//!    render.
//!
//! 2. **Deterministic layering**: paint order is recomputed from the model
//!    before every render, so the same deck always draws the same way.
//!
//! 3. **Configuration Over Convention**: print geometry, fonts and asset
//!    locations come in through `PrintProfile`, `RenderConfig` and
//!    `LoadOptions`.
//!
//! ## Pipeline
//!
//! ```text
//! load_deck -> renumber_entities -> recompute_render_orders
//!     -> per card: expand renderables (macros, layout) -> sort by z
//!     -> rasterize -> rescale + bleed pad -> card_{top|bot}_NNN.png
//! ```
//!
//! ## Modules
//!
//! - `core`: geometry sentinels, colors, configuration
//! - `deck`: the deck model, name lookups and card numbering
//! - `text`: macro expansion and rich-text layout
//! - `layers`: paint order and drawable primitives
//! - `raster`: fonts, canvas, print geometry and file output
//! - `persist`: the XML deck file format
//! - `export`: post-processing of rendered faces
//! - `build`: the batch pipeline behind `build_deck`

pub mod build;
pub mod core;
pub mod deck;
pub mod error;
pub mod export;
pub mod layers;
pub mod persist;
pub mod raster;
pub mod text;

// Re-export commonly used types
pub use crate::core::{LoadOptions, PrintProfile, Rect, RenderConfig, Rgba, Size};

pub use crate::deck::{
    Card, CardCategory, CardId, CardList, Deck, Face, FaceSide, FileAsset, FileSource,
    ImageAsset, Justification, LineStyle, Location, LocationId, RenderEntry, RenderKind,
    Renderable, Style, Template, Typeface,
};

pub use crate::text::{expand_macros, MacroContext, TextBlock, TextLayoutBuilder};

pub use crate::layers::{Partition, Primitive, PrimitiveTable};

pub use crate::raster::{FontBook, RenderReport, Renderer};

pub use crate::persist::{build_empty_deck, deck_from_str, deck_to_string, load_deck, save_deck};

pub use crate::build::{BuildOptions, BuildReport};

pub use crate::error::{CardforgeError, Result};
