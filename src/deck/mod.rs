//! Deck model: assets, cards, faces, renderables and numbering.
//!
//! ## Key Types
//!
//! - `Deck`: owns every asset and card, name lookups, renumbering
//! - `Card` / `Location`: what gets numbered and rendered
//! - `Face` / `Renderable`: what gets drawn on one side of a card
//! - `FileAsset` / `ImageAsset` / `Style`: what renderables reference by name
//! - `NameRegistry`: one hash index per lookup class

pub mod asset;
pub mod card;
pub mod model;
pub mod registry;
pub mod renderable;

pub use asset::{FileAsset, FileSource, ImageAsset, Justification, LineStyle, Style, Typeface};
pub use card::{Card, CardCategory, CardId, Location, LocationId};
pub use model::{CardList, Deck, RenderEntry, Template};
pub use registry::NameRegistry;
pub use renderable::{Face, FaceSide, RenderKind, Renderable};
