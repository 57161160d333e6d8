//! Font discovery and text measurement.
//!
//! `FontBook` loads every `.ttf`/`.otf` file under the configured font
//! directories. A file is keyed by its family (the file stem before the
//! first `-`, lowercased, spaces removed) and by the bold/italic words in
//! the rest of the stem, so `DejaVuSans-BoldOblique.ttf` serves
//! `DejaVu Sans:bold:italic`.
//!
//! Lookup falls back from the exact variant to the family's regular face,
//! then to any face of the family, then to the first font loaded. With no
//! fonts at all, measurement uses `ApproxMetrics` and glyphs are not drawn.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::points_to_pixels;
use crate::deck::{Style, Typeface};
use crate::error::{CardforgeError, Result};
use crate::text::{ApproxMetrics, TextMetrics};

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

/// Normalized family name used for lookups.
fn family_key(family: &str) -> String {
    family
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a font file stem into its lookup key.
fn key_for_stem(stem: &str) -> FaceKey {
    let (family, variant) = stem.split_once('-').unwrap_or((stem, ""));
    let variant = variant.to_lowercase();
    FaceKey {
        family: family_key(family),
        bold: variant.contains("bold"),
        italic: variant.contains("italic") || variant.contains("oblique"),
    }
}

/// Fonts available to the renderer.
#[derive(Debug, Default)]
pub struct FontBook {
    faces: FxHashMap<FaceKey, FontArc>,
    /// First font loaded, used for unknown families.
    fallback: Option<FontArc>,
    warned: RefCell<FxHashSet<String>>,
}

impl FontBook {
    /// A book with no fonts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every font file found in `dirs` (not recursive).
    ///
    /// Missing directories and unreadable fonts are skipped with a warning.
    #[must_use]
    pub fn load(dirs: &[PathBuf]) -> Self {
        let mut book = Self::new();
        for dir in dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), error = %err, "cannot read font directory");
                    continue;
                }
            };
            let mut paths: Vec<PathBuf> = entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                })
                .collect();
            paths.sort();
            for path in paths {
                if let Err(err) = book.load_file(&path) {
                    tracing::warn!(error = %err, "skipping font");
                }
            }
        }
        tracing::info!(fonts = book.len(), "font book loaded");
        book
    }

    /// Load one font file, keyed by its file stem.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path).map_err(|e| CardforgeError::io(path, e))?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| CardforgeError::Font {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let key = key_for_stem(&stem);
        tracing::debug!(path = %path.display(), family = %key.family, bold = key.bold, italic = key.italic, "loaded font");
        self.insert(key, font);
        Ok(())
    }

    /// Register a font for a typeface (`family[:bold][:italic]`).
    pub fn add_font(&mut self, typeface: &str, font: FontArc) {
        let face = Typeface::parse(typeface);
        self.insert(
            FaceKey {
                family: family_key(&face.family),
                bold: face.bold,
                italic: face.italic,
            },
            font,
        );
    }

    fn insert(&mut self, key: FaceKey, font: FontArc) {
        if self.fallback.is_none() {
            self.fallback = Some(font.clone());
        }
        self.faces.entry(key).or_insert(font);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The font to draw `typeface` with.
    #[must_use]
    pub fn font_for(&self, typeface: &Typeface) -> Option<&FontArc> {
        let family = family_key(&typeface.family);
        let exact = FaceKey {
            family: family.clone(),
            bold: typeface.bold,
            italic: typeface.italic,
        };
        if let Some(font) = self.faces.get(&exact) {
            return Some(font);
        }
        let regular = FaceKey {
            family: family.clone(),
            bold: false,
            italic: false,
        };
        if let Some(font) = self.faces.get(&regular) {
            return Some(font);
        }
        if let Some((_, font)) = self.faces.iter().find(|(k, _)| k.family == family) {
            return Some(font);
        }
        if self.fallback.is_some() && self.warned.borrow_mut().insert(family) {
            tracing::warn!(typeface = %typeface, "font family not found, using first available font");
        }
        self.fallback.as_ref()
    }

    /// Measurements for a canvas `card_width` pixels wide.
    #[must_use]
    pub fn metrics(&self, card_width: u32) -> BookMetrics<'_> {
        BookMetrics {
            book: self,
            card_width,
        }
    }
}

/// `TextMetrics` backed by a `FontBook` at a fixed card width.
#[derive(Clone, Copy, Debug)]
pub struct BookMetrics<'a> {
    book: &'a FontBook,
    card_width: u32,
}

impl BookMetrics<'_> {
    fn scale(&self, style: &Style) -> PxScale {
        PxScale::from(points_to_pixels(style.typesize, self.card_width))
    }

    fn approx(&self) -> ApproxMetrics {
        ApproxMetrics {
            card_width: self.card_width,
        }
    }
}

impl TextMetrics for BookMetrics<'_> {
    fn advance(&self, style: &Style, text: &str) -> f32 {
        let Some(font) = self.book.font_for(&style.typeface) else {
            return self.approx().advance(style, text);
        };
        let scaled = font.as_scaled(self.scale(style));
        let mut width = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(p) = prev {
                width += scaled.kern(p, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn line_height(&self, style: &Style) -> f32 {
        match self.book.font_for(&style.typeface) {
            Some(font) => {
                let scaled = font.as_scaled(self.scale(style));
                scaled.height() + scaled.line_gap()
            }
            None => self.approx().line_height(style),
        }
    }

    fn ascent(&self, style: &Style) -> f32 {
        match self.book.font_for(&style.typeface) {
            Some(font) => font.as_scaled(self.scale(style)).ascent(),
            None => self.approx().ascent(style),
        }
    }
}
