//! Post-processing of rendered card faces.
//!
//! Exporters only read the `card_{top|bot}_NNN.png` files a render wrote and
//! the size those faces were written at.
//!
//! - `tabletop`: half-size tile sheets for tabletop simulators
//! - `pdf`: Letter pages of four cards with mirrored back pages for duplex
//!   printing

use std::path::Path;

use crate::deck::FaceSide;
use crate::raster::face_file_name;

pub mod pdf;
pub mod tabletop;

pub use pdf::{build_pdf_sheets, PageLayout, PDF_FILE_NAME};
pub use tabletop::{build_tile_sheets, TileLayout, MAX_SHEET_SIZE};

/// Number of consecutive rendered cards starting at index 0.
pub(crate) fn count_faces(dir: &Path) -> usize {
    (0..)
        .take_while(|&n| dir.join(face_file_name(FaceSide::Bottom, n)).exists())
        .count()
}
