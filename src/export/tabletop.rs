//! Tabletop simulator tile sheets.
//!
//! Faces are shrunk to half size and packed row-major into sheets no larger
//! than `MAX_SHEET_SIZE` on either side. A sheet holding fewer cards than
//! fit is cropped to the rows (and, for a single row, the columns) it uses.
//! Sheet `n` of the top faces is `deck_top_n.png`, of the bottom faces
//! `deck_bot_n.png`.

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbaImage;

use crate::deck::FaceSide;
use crate::error::Result;
use crate::raster::face_file_name;

use super::count_faces;

/// Largest sheet edge in pixels.
pub const MAX_SHEET_SIZE: u32 = 5000;

/// Tile and grid dimensions for one card size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub rows: u32,
}

impl TileLayout {
    #[must_use]
    pub fn for_card(card_size: (u32, u32)) -> Self {
        let tile_width = (card_size.0 / 2).max(1);
        let tile_height = (card_size.1 / 2).max(1);
        Self {
            tile_width,
            tile_height,
            columns: (MAX_SHEET_SIZE / tile_width).max(1),
            rows: (MAX_SHEET_SIZE / tile_height).max(1),
        }
    }

    #[must_use]
    pub fn per_sheet(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// Pixel size of a sheet holding `cards` tiles.
    #[must_use]
    pub fn sheet_size(&self, cards: usize) -> (u32, u32) {
        let cards = (cards.clamp(1, self.per_sheet())) as u32;
        let columns = cards.min(self.columns);
        let rows = cards.div_ceil(self.columns);
        (self.tile_width * columns, self.tile_height * rows)
    }
}

fn sheet_name(side: FaceSide, sheet: usize) -> String {
    format!("deck_{}_{}.png", side.file_tag(), sheet)
}

/// Pack the rendered faces in `dir` into tile sheets written to `dir`.
///
/// `card_size` is the size the faces were written at. Returns the sheet
/// paths, top sheets first.
pub fn build_tile_sheets(dir: &Path, card_size: (u32, u32)) -> Result<Vec<PathBuf>> {
    let count = count_faces(dir);
    let layout = TileLayout::for_card(card_size);
    tracing::info!(cards = count, per_sheet = layout.per_sheet(), "building tile sheets");

    let mut written = Vec::new();
    for side in [FaceSide::Top, FaceSide::Bottom] {
        for (sheet, first) in (0..count).step_by(layout.per_sheet()).enumerate() {
            let last = (first + layout.per_sheet()).min(count);
            let (sw, sh) = layout.sheet_size(last - first);
            let mut canvas = RgbaImage::new(sw, sh);
            for (slot, index) in (first..last).enumerate() {
                let path = dir.join(face_file_name(side, index));
                tracing::debug!(path = %path.display(), "reading face");
                let face = image::open(&path)?.to_rgba8();
                let tile = image::imageops::resize(&face, layout.tile_width, layout.tile_height, FilterType::Triangle);
                let slot = slot as u32;
                let x = (slot % layout.columns) * layout.tile_width;
                let y = (slot / layout.columns) * layout.tile_height;
                image::imageops::replace(&mut canvas, &tile, i64::from(x), i64::from(y));
            }
            let path = dir.join(sheet_name(side, sheet));
            canvas.save(&path)?;
            tracing::info!(path = %path.display(), "saved tile sheet");
            written.push(path);
        }
    }
    Ok(written)
}
