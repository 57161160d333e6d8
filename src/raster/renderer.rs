//! Card rendering: scene assembly, rasterization and file output.
//!
//! A face renders as: the base fill, then the primitives of the card's own
//! face and its background card's face, sorted by paint order. Background
//! underlay content (order < 0) ends up under the card's content and
//! background overlay content (order >= 100) on top of it.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::core::RenderConfig;
use crate::deck::{Deck, FaceSide, RenderEntry};
use crate::error::Result;
use crate::layers::{ExpandContext, PrimitiveTable};
use crate::text::{MacroContext, TextLayoutBuilder};

use super::canvas::Canvas;
use super::fonts::FontBook;
use super::print::apply_profile;

/// File name of one rendered face.
#[must_use]
pub fn face_file_name(side: FaceSide, index: usize) -> String {
    format!("card_{}_{:03}.png", side.file_tag(), index)
}

/// What a deck render produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Cards walked, rendered or not (the next free output index).
    pub cards_seen: usize,
    /// Files written, in order.
    pub written: Vec<PathBuf>,
}

impl RenderReport {
    /// Number of cards actually rendered.
    #[must_use]
    pub fn cards_rendered(&self) -> usize {
        self.written.len() / 2
    }
}

/// Renders the cards of a deck to PNG files.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    fonts: FontBook,
}

impl Renderer {
    /// Create a renderer, loading fonts from `config.font_dirs`.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let fonts = FontBook::load(&config.font_dirs);
        Self::with_fonts(config, fonts)
    }

    /// Create a renderer with an already loaded font book.
    #[must_use]
    pub fn with_fonts(config: RenderConfig, fonts: FontBook) -> Self {
        if fonts.is_empty() {
            tracing::warn!("no fonts available, card text will not be drawn");
        }
        Self { config, fonts }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Expand one face of `entry` (and its background's face) into a
    /// primitive table.
    ///
    /// Renderable orders must be current (`Deck::recompute_render_orders`).
    #[must_use]
    pub fn build_scene(&self, deck: &Deck, entry: &RenderEntry, side: FaceSide) -> PrimitiveTable {
        let card = deck.card(entry.card);
        let mut macros = MacroContext::new(deck).with_card(card);
        if let Some(location) = entry.location {
            macros = macros.with_location(deck.location(location));
        }
        let metrics = self.fonts.metrics(deck.card_size().0);
        let ctx = ExpandContext::new(deck, TextLayoutBuilder::new(macros), &metrics);

        let mut table = PrimitiveTable::new();
        table.add_face(entry.card, side, card.face(side), &ctx);
        if let Some(background) = entry.background {
            table.add_face(background, side, deck.card(background).face(side), &ctx);
        }
        table
    }

    /// Rasterize one face at the deck's canvas size, before print
    /// adjustments.
    #[must_use]
    pub fn render_face(&self, deck: &Deck, entry: &RenderEntry, side: FaceSide) -> RgbaImage {
        let table = self.build_scene(deck, entry, side);
        let (width, height) = deck.card_size();
        let mut canvas = Canvas::new(width, height, self.config.base_fill);
        for item in table.paint_order() {
            canvas.draw(&item.primitive, &self.fonts);
        }
        canvas.into_image()
    }

    /// Render both faces of a card and write them as output `index`.
    pub fn render_card(&self, deck: &Deck, entry: &RenderEntry, index: usize, out_dir: &Path) -> Result<[PathBuf; 2]> {
        let card = deck.card(entry.card);
        tracing::info!(number = index, card = %card.name, "rendering card");
        let mut paths = [PathBuf::new(), PathBuf::new()];
        for (slot, side) in [FaceSide::Top, FaceSide::Bottom].into_iter().enumerate() {
            let raw = self.render_face(deck, entry, side);
            let img = apply_profile(&raw, &self.config.profile);
            let path = out_dir.join(face_file_name(side, index));
            img.save(&path)?;
            tracing::debug!(path = %path.display(), "wrote face");
            paths[slot] = path;
        }
        Ok(paths)
    }

    /// Render every card in output order into `out_dir`.
    ///
    /// The output index counts every card; with `target_card` set only the
    /// card at that index is written.
    pub fn render_deck(&self, deck: &Deck, out_dir: &Path) -> Result<RenderReport> {
        let mut report = RenderReport::default();
        for (index, entry) in deck.render_order().iter().enumerate() {
            report.cards_seen = index + 1;
            if self.config.target_card.is_some_and(|target| target != index) {
                continue;
            }
            report.written.extend(self.render_card(deck, entry, index, out_dir)?);
        }
        tracing::info!(
            cards = report.cards_seen,
            rendered = report.cards_rendered(),
            "deck rendered"
        );
        Ok(report)
    }
}
