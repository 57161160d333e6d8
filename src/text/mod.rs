//! Card text: macro expansion, rich-text spans and paragraph layout.
//!
//! The pipeline for one text renderable is:
//!
//! 1. `expand_macros` resolves `{cN}`-style references against the deck
//! 2. `TextLayoutBuilder::build` splits the result into styled spans and
//!    inline images
//! 3. `layout_block` breaks the spans into justified lines

pub mod layout;
pub mod macros;
pub mod wrap;

pub use layout::{Span, TextBlock, TextLayoutBuilder};
pub use macros::{expand_macros, MacroContext, ERROR_TEXT};
pub use wrap::{layout_block, ApproxMetrics, LaidOutBlock, Line, Piece, PieceKind, TextMetrics};
