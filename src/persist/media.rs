//! Starter decks built from folders of artwork.

use std::path::{Path, PathBuf};

use crate::core::Rect;
use crate::deck::{Card, CardList, Deck, Face, FileAsset, FileSource, ImageAsset, Renderable, Style};
use crate::error::{CardforgeError, Result};

/// Picture extensions picked up from media directories.
const MEDIA_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

fn media_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| CardforgeError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_media(path))
        .collect();
    files.sort();
    Ok(files)
}

/// Build a deck with one base card per picture found in `media_dirs`.
///
/// Each picture becomes a path-referenced `FileAsset`, a full-size
/// `ImageAsset` of the same name and a base card whose top face shows the
/// image over the whole canvas. A `default` style is always added. Pictures
/// that fail to decode are kept and render as placeholders.
pub fn build_empty_deck(media_dirs: &[PathBuf]) -> Result<Deck> {
    let mut deck = Deck::new("new deck");
    deck.add_style(Style::new("default"));
    let (width, height) = deck.card_size();
    let canvas = Rect::new(0.0, 0.0, width as f32, height as f32);

    for dir in media_dirs {
        for path in media_files(dir)? {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if deck.find_file(&stem, None).is_some() {
                tracing::warn!(name = %stem, path = %path.display(), "duplicate media name, skipping");
                continue;
            }

            let mut file = FileAsset::new(stem.clone(), FileSource::Path(path.clone()));
            match image::open(&path) {
                Ok(img) => file.pixels = Some(img.to_rgba8()),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "cannot decode media file"),
            }
            deck.add_file(file);
            deck.add_image(ImageAsset::new(stem.clone(), stem.clone()).with_rect(Rect::natural()));

            let face = Face::new().with(Renderable::image("image", stem.clone()).at(canvas));
            deck.add_card(CardList::Base, Card::new(stem).with_top(face));
        }
    }

    deck.renumber_entities();
    deck.recompute_render_orders();
    tracing::info!(
        cards = deck.list(CardList::Base).len(),
        dirs = media_dirs.len(),
        "built starter deck"
    );
    Ok(deck)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_build_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        RgbaImage::new(8, 4).save(dir.path().join("b_hero.png")).unwrap();
        RgbaImage::new(2, 2).save(dir.path().join("a_villain.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not art").unwrap();

        let deck = build_empty_deck(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(deck.files().len(), 2);
        assert_eq!(deck.images().len(), 2);
        assert!(deck.find_style("default", None).is_some());

        let ids = deck.list(CardList::Base);
        assert_eq!(ids.len(), 2);
        assert_eq!(deck.card(ids[0]).name, "a_villain");
        assert_eq!(deck.card(ids[0]).card_number, 1);
        assert_eq!(deck.image_pixels("b_hero").map(|p| p.dimensions()), Some((8, 4)));
    }

    #[test]
    fn test_missing_dir_is_error() {
        let err = build_empty_deck(&[PathBuf::from("/no/such/media")]).unwrap_err();
        assert!(matches!(err, CardforgeError::Io { .. }));
    }

    #[test]
    fn test_no_dirs() {
        let deck = build_empty_deck(&[]).unwrap();
        assert!(deck.list(CardList::Base).is_empty());
        assert_eq!(deck.styles().len(), 1);
    }
}
