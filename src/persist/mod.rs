//! Deck files: XML load and save, plus starter decks from media folders.
//!
//! ## Key Functions
//!
//! - `load_deck` / `deck_from_str`: parse a deck file into a numbered `Deck`
//! - `save_deck` / `deck_to_string`: write a deck back out
//! - `build_empty_deck`: one card per picture in a set of directories
//!
//! File references resolve through `LoadOptions`: relative paths against the
//! deck's directory, `builtin:` names against the builtin asset directory.

pub mod dom;
pub mod media;
pub mod reader;
pub mod writer;

pub use media::build_empty_deck;
pub use reader::{deck_from_element, deck_from_str, load_deck};
pub use writer::{deck_to_string, save_deck};
