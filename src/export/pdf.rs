//! Printable PDF sheets.
//!
//! Cards are laid out four to a US Letter page at 300 dpi, in a 2x2 grid
//! with equal gaps. Every page of fronts is followed by a page of the
//! matching backs, mirrored left to right so that duplex printing puts each
//! back behind its front. Cards larger than a quarter page are shrunk to
//! fit.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::deck::FaceSide;
use crate::error::{CardforgeError, Result};
use crate::raster::face_file_name;

use super::count_faces;

/// File name of the generated document.
pub const PDF_FILE_NAME: &str = "deck.pdf";

/// Page resolution the card pixels are laid out at.
pub const PAGE_DPI: f32 = 300.0;

/// US Letter at `PAGE_DPI`.
pub const PAGE_SIZE_PX: (u32, u32) = (2550, 3300);

pub const CARDS_PER_PAGE: usize = 4;

const POINTS_PER_INCH: f32 = 72.0;

fn pdf_error(err: impl std::fmt::Display) -> CardforgeError {
    CardforgeError::Pdf(err.to_string())
}

/// Card placement on a page, in page pixels from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub card_width: f32,
    pub card_height: f32,
    pub x_gap: f32,
    pub y_gap: f32,
}

impl PageLayout {
    #[must_use]
    pub fn for_card(card_size: (u32, u32)) -> Self {
        let (pw, ph) = (PAGE_SIZE_PX.0 as f32, PAGE_SIZE_PX.1 as f32);
        let w = card_size.0.max(1) as f32;
        let h = card_size.1.max(1) as f32;
        let scale = (pw / (2.0 * w)).min(ph / (2.0 * h)).min(1.0);
        let (w, h) = (w * scale, h * scale);
        Self {
            card_width: w,
            card_height: h,
            x_gap: (pw - 2.0 * w) / 3.0,
            y_gap: (ph - 2.0 * h) / 3.0,
        }
    }

    /// Grid cell (column, row) of page slot `slot`. Backs mirror the fronts.
    #[must_use]
    pub fn cell(slot: usize, side: FaceSide) -> (u32, u32) {
        let column = (slot % 2) as u32;
        let row = (slot / 2) as u32;
        match side {
            FaceSide::Top => (column, row),
            FaceSide::Bottom => (1 - column, row),
        }
    }

    /// Top-left corner of grid cell (`column`, `row`).
    #[must_use]
    pub fn origin(&self, column: u32, row: u32) -> (f32, f32) {
        (
            self.x_gap + column as f32 * (self.card_width + self.x_gap),
            self.y_gap + row as f32 * (self.card_height + self.y_gap),
        )
    }
}

fn to_points(px: f32) -> i64 {
    (px * POINTS_PER_INCH / PAGE_DPI).round() as i64
}

/// Embed a face as an RGB image object.
fn add_face_image(doc: &mut Document, path: &Path) -> Result<ObjectId> {
    tracing::debug!(path = %path.display(), "reading face");
    let face = image::open(path)?.to_rgb8();
    let (width, height) = face.dimensions();
    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(width)),
            "Height" => Object::Integer(i64::from(height)),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        face.into_raw(),
    );
    Ok(doc.add_object(stream))
}

/// Add one page showing the faces `first..last` of `side`.
fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    dir: &Path,
    layout: &PageLayout,
    side: FaceSide,
    first: usize,
    last: usize,
) -> Result<ObjectId> {
    let page_height = to_points(PAGE_SIZE_PX.1 as f32);
    let mut xobjects = Dictionary::new();
    let mut operations = Vec::new();

    for (slot, index) in (first..last).enumerate() {
        let image_id = add_face_image(doc, &dir.join(face_file_name(side, index)))?;
        let name = format!("Im{slot}");
        xobjects.set(name.clone(), image_id);

        let (column, row) = PageLayout::cell(slot, side);
        let (x, y) = layout.origin(column, row);
        let (w, h) = (to_points(layout.card_width), to_points(layout.card_height));
        // PDF space starts at the bottom-left corner
        let bottom = page_height - to_points(y) - h;
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                Object::Integer(w),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(h),
                Object::Integer(to_points(x)),
                Object::Integer(bottom),
            ],
        ));
        operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        operations.push(Operation::new("Q", vec![]));
    }

    let content = Content { operations }.encode().map_err(pdf_error)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Integer(to_points(PAGE_SIZE_PX.0 as f32)), Object::Integer(page_height)],
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => xobjects },
    });
    Ok(page_id)
}

/// Lay the rendered faces in `dir` out as `deck.pdf` in `dir`.
///
/// `card_size` is the size the faces were written at. Returns `None` when
/// no faces were found.
pub fn build_pdf_sheets(dir: &Path, card_size: (u32, u32)) -> Result<Option<PathBuf>> {
    let count = count_faces(dir);
    if count == 0 {
        tracing::warn!(dir = %dir.display(), "no rendered faces, skipping pdf");
        return Ok(None);
    }
    let layout = PageLayout::for_card(card_size);
    tracing::info!(cards = count, pages = 2 * count.div_ceil(CARDS_PER_PAGE), "building pdf sheets");

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for first in (0..count).step_by(CARDS_PER_PAGE) {
        let last = (first + CARDS_PER_PAGE).min(count);
        for side in [FaceSide::Top, FaceSide::Bottom] {
            let page_id = add_page(&mut doc, pages_id, dir, &layout, side, first, last)?;
            kids.push(Object::Reference(page_id));
        }
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => Object::Integer(kids.len() as i64),
        "Kids" => kids,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(pdf_error)?;
    let path = dir.join(PDF_FILE_NAME);
    std::fs::write(&path, bytes).map_err(|e| CardforgeError::io(&path, e))?;
    tracing::info!(path = %path.display(), "saved pdf");
    Ok(Some(path))
}
