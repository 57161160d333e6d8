//! Layer compositing: paint order and drawable primitives.
//!
//! ## Key Types
//!
//! - `Partition`: underlay / core / overlay order spaces
//! - `Primitive`: a glyph run, image sprite or backdrop rectangle
//! - `PrimitiveTable`: primitives of one render pass keyed by `RenderableKey`
//!
//! Orders are computed on the model (`Face::recompute_renderable_order`);
//! primitives only exist for the duration of a render pass.

pub mod compositor;
pub mod primitive;
pub mod scene;

pub use compositor::{
    primitive_z, Partition, CORE_BASE, ORDER_STEP, OVERLAY_BASE, SUB_Z_STEP, UNDERLAY_BASE,
};
pub use primitive::{
    expand_renderable, placeholder_image, Backdrop, ExpandContext, ImageSprite, PlacedText,
    Primitive, Primitives, TextRun, HALO_DISTANCE, HALO_OFFSETS,
};
pub use scene::{PrimitiveTable, RenderableKey, ScenePrimitive};
