//! Deck file loading.
//!
//! Parses the XML tree into a `Deck`. Structural problems (no `<deck>` root,
//! unparseable numbers, bad base64) are errors. Missing or undecodable image
//! sources only warn: the file asset is kept without pixels and images
//! cropping it render as a placeholder.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::RgbaImage;

use crate::core::{LoadOptions, Rect, Rgba};
use crate::deck::{
    Card, CardList, Deck, Face, FileAsset, FileSource, ImageAsset, Justification, LineStyle, RenderKind,
    Renderable, Style, Template, Typeface,
};
use crate::error::{CardforgeError, Result};

use super::dom::{self, Element};

fn invalid(message: impl Into<String>) -> CardforgeError {
    CardforgeError::InvalidDeck(message.into())
}

fn parse_f32(element: &Element, child: &str) -> Result<Option<f32>> {
    element
        .child_text(child)
        .map(|text| {
            text.parse::<f32>()
                .map_err(|_| invalid(format!("<{child}> of <{}> is not a number: {text:?}", element.name)))
        })
        .transpose()
}

fn parse_rect(element: &Element, child: &str) -> Result<Option<Rect>> {
    element
        .child_text(child)
        .map(|text| {
            Rect::parse(text).ok_or_else(|| invalid(format!("<{child}> of <{}> is not 'x y w h': {text:?}", element.name)))
        })
        .transpose()
}

fn parse_color(element: &Element, child: &str) -> Result<Option<Rgba>> {
    element
        .child_text(child)
        .map(|text| Rgba::parse(text).ok_or_else(|| invalid(format!("<{child}> is not 'r g b a': {text:?}"))))
        .transpose()
}

fn name_of(element: &Element) -> String {
    element.attr("name").unwrap_or_default().to_string()
}

/// Decode encoded image bytes, warning on failure.
fn decode_pixels(name: &str, bytes: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            tracing::warn!(file = %name, error = %err, "cannot decode image file");
            None
        }
    }
}

fn resolve_path(source: &FileSource, options: &LoadOptions) -> Option<PathBuf> {
    match source {
        FileSource::Embedded(_) => None,
        FileSource::Path(path) if path.is_absolute() => Some(path.clone()),
        FileSource::Path(path) => Some(match &options.base_dir {
            Some(base) => base.join(path),
            None => path.clone(),
        }),
        FileSource::Builtin(name) => match &options.builtin_dir {
            Some(dir) => Some(dir.join(name)),
            None => {
                tracing::warn!(file = %name, "builtin file referenced but no builtin directory configured");
                None
            }
        },
    }
}

fn read_file(element: &Element, options: &LoadOptions) -> Result<FileAsset> {
    let name = name_of(element);
    if let Some(reference) = element.attr("filename") {
        let source = FileSource::from_reference(reference);
        let pixels = resolve_path(&source, options).and_then(|path| match std::fs::read(&path) {
            Ok(bytes) => decode_pixels(&name, &bytes),
            Err(err) => {
                tracing::warn!(file = %name, path = %path.display(), error = %err, "cannot read image file");
                None
            }
        });
        let mut file = FileAsset::new(name, source);
        file.pixels = pixels;
        return Ok(file);
    }

    let encoded: String = element.text.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(encoded.as_bytes())?;
    let pixels = decode_pixels(&name, &bytes);
    let mut file = FileAsset::new(name, FileSource::Embedded(bytes));
    file.pixels = pixels;
    Ok(file)
}

fn read_image(element: &Element) -> Result<ImageAsset> {
    let mut image = ImageAsset::new(name_of(element), element.child_text("file").unwrap_or_default());
    if let Some(rect) = parse_rect(element, "rect_pix")? {
        image.rect = rect;
    }
    if let Some(usage) = element.child_text("usage") {
        image.usage = usage.to_string();
    }
    Ok(image)
}

fn read_style(element: &Element) -> Result<Style> {
    let mut style = Style::new(name_of(element));
    if let Some(typeface) = element.child_text("typeface") {
        style.typeface = Typeface::parse(typeface);
    }
    if let Some(size) = parse_f32(element, "typesize")? {
        style.typesize = size;
    }
    if let Some(color) = parse_color(element, "fillcolor")? {
        style.fillcolor = color;
    }
    if let Some(color) = parse_color(element, "bordercolor")? {
        style.bordercolor = color;
    }
    if let Some(color) = parse_color(element, "textcolor")? {
        style.textcolor = color;
    }
    if let Some(thickness) = parse_f32(element, "borderthickness")? {
        style.borderthickness = thickness;
    }
    if let Some(text) = element.child_text("linestyle") {
        style.linestyle = LineStyle::parse(text).unwrap_or_else(|| {
            tracing::warn!(style = %style.name, linestyle = %text, "unknown line style, using solid");
            LineStyle::Solid
        });
    }
    if let Some(text) = element.child_text("justification") {
        style.justification = Justification::parse(text);
    }
    if let Some(offset) = parse_f32(element, "boundary_offset")? {
        style.boundary_offset = offset;
    }
    Ok(style)
}

fn read_renderable(element: &Element) -> Result<Option<Renderable>> {
    let name = name_of(element);
    let kind = match element.name.as_str() {
        "render_text" => RenderKind::Text {
            text: element.child("text").map(|t| t.text.clone()).unwrap_or_default(),
            style: element.child_text("style").unwrap_or_default().to_string(),
        },
        "render_image" => RenderKind::Image {
            image: element.child_text("image").unwrap_or_default().to_string(),
        },
        "render_rect" => RenderKind::Rect {
            style: element.child_text("style").unwrap_or_default().to_string(),
        },
        other => {
            tracing::debug!(element = %other, "skipping unknown renderable");
            return Ok(None);
        }
    };
    let mut renderable = Renderable {
        name,
        rect: Rect::natural(),
        rotation: 0.0,
        order: 0.0,
        underlay: false,
        kind,
    };
    if let Some(rect) = parse_rect(element, "location")? {
        renderable.rect = rect;
    }
    if let Some(rotation) = parse_f32(element, "rotation")? {
        renderable.rotation = rotation;
    }
    if let Some(order) = parse_f32(element, "order")? {
        renderable.order = order;
    }
    if let Some(flag) = element.child_text("underlay") {
        renderable.underlay = matches!(flag, "1" | "true");
    }
    Ok(Some(renderable))
}

fn read_face(element: Option<&Element>) -> Result<Face> {
    let mut face = Face::new();
    if let Some(element) = element {
        for child in &element.children {
            if let Some(renderable) = read_renderable(child)? {
                face.push(renderable);
            }
        }
    }
    Ok(face)
}

fn read_card(element: &Element) -> Result<Card> {
    Ok(Card::new(name_of(element))
        .with_top(read_face(element.child("top"))?)
        .with_bottom(read_face(element.child("bottom"))?))
}

fn read_assets(deck: &mut Deck, assets: &Element, options: &LoadOptions) -> Result<()> {
    for child in &assets.children {
        match child.name.as_str() {
            "file" => {
                deck.add_file(read_file(child, options)?);
            }
            "image" => {
                deck.add_image(read_image(child)?);
            }
            "style" => {
                deck.add_style(read_style(child)?);
            }
            other => tracing::debug!(element = %other, "skipping unknown asset"),
        }
    }
    Ok(())
}

fn list_for(element: &str) -> Option<CardList> {
    CardList::ALL
        .into_iter()
        .find(|list| list.category().element() == element)
}

fn read_cards(deck: &mut Deck, cards: &Element) -> Result<()> {
    for child in &cards.children {
        let name = child.name.as_str();
        if let Some(template) = Template::ALL.into_iter().find(|t| t.element() == name) {
            deck.set_template(template, read_card(child)?);
        } else if name == "iconreference" {
            deck.set_icon_reference(read_card(child)?);
        } else if let Some(list) = list_for(name) {
            for card in child.children.iter().filter(|c| c.name == "card") {
                deck.add_card(list, read_card(card)?);
            }
        } else if name == "locations" {
            for location in child.children.iter().filter(|c| c.name == "location") {
                let id = deck.add_location(name_of(location));
                for card in location.children.iter().filter(|c| c.name == "card") {
                    deck.add_location_card(id, read_card(card)?);
                }
            }
        } else {
            tracing::debug!(element = %name, "skipping unknown card section");
        }
    }
    Ok(())
}

/// Build a deck from the root `<deck>` element.
///
/// The returned deck is numbered and its render orders are current.
pub fn deck_from_element(root: &Element, options: &LoadOptions) -> Result<Deck> {
    if root.name != "deck" {
        return Err(invalid(format!("expected <deck> root, found <{}>", root.name)));
    }
    let mut deck = Deck::new(name_of(root));
    if let Some(size) = root.child_text("decksize") {
        let dims: Vec<u32> = size
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid(format!("bad <decksize>: {size:?}")))?;
        match dims.as_slice() {
            [w, h] => deck.set_card_size(*w, *h),
            _ => return Err(invalid(format!("bad <decksize>: {size:?}"))),
        }
    }
    if let Some(assets) = root.child("assets") {
        read_assets(&mut deck, assets, options)?;
    }
    if let Some(cards) = root.child("cards") {
        read_cards(&mut deck, cards)?;
    }
    deck.renumber_entities();
    deck.recompute_render_orders();
    tracing::debug!(
        deck = %deck.name,
        files = deck.files().len(),
        images = deck.images().len(),
        styles = deck.styles().len(),
        "deck parsed"
    );
    Ok(deck)
}

/// Parse a deck from XML text.
pub fn deck_from_str(content: &str, options: &LoadOptions) -> Result<Deck> {
    deck_from_element(&dom::parse(content)?, options)
}

/// Load a deck file. Relative file references resolve against the deck's
/// directory unless `options.base_dir` is set.
pub fn load_deck(path: &Path, options: &LoadOptions) -> Result<Deck> {
    let content = std::fs::read_to_string(path).map_err(|e| CardforgeError::io(path, e))?;
    let mut options = options.clone();
    if options.base_dir.is_none() {
        options.base_dir = path.parent().map(Path::to_path_buf);
    }
    let deck = deck_from_str(&content, &options)?;
    tracing::info!(path = %path.display(), deck = %deck.name, "loaded deck");
    Ok(deck)
}
