//! Deck file saving.
//!
//! Writes the same element layout `reader` parses, indented by two spaces.
//! Embedded files are written as base64; path and `builtin:` files as a
//! `filename` attribute. Element text is written verbatim, so card text
//! with leading or trailing whitespace survives a save/load cycle.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::deck::{Card, CardList, Deck, Face, FileAsset, FileSource, ImageAsset, RenderKind, Renderable, Style, Template};
use crate::error::{CardforgeError, Result};

struct DeckWriter {
    inner: Writer<Vec<u8>>,
}

fn write_error(err: impl std::fmt::Display) -> CardforgeError {
    CardforgeError::Xml {
        message: format!("write failed: {err}"),
        position: None,
    }
}

impl DeckWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.inner.write_event(event).map_err(write_error)
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Empty(start))
    }

    /// `<name>text</name>`, or `<name/>` when `text` is empty.
    fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name, &[]);
        }
        self.open(name, &[])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String> {
        String::from_utf8(self.inner.into_inner()).map_err(write_error)
    }
}

fn embedded_bytes(file: &FileAsset) -> Result<Vec<u8>> {
    match (&file.source, &file.pixels) {
        (FileSource::Embedded(bytes), _) if !bytes.is_empty() => Ok(bytes.clone()),
        (_, Some(pixels)) => {
            let mut buf = Vec::new();
            pixels.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
            Ok(buf)
        }
        _ => Ok(Vec::new()),
    }
}

fn write_file(w: &mut DeckWriter, file: &FileAsset) -> Result<()> {
    if let Some(reference) = file.source.reference() {
        return w.empty("file", &[("name", file.name.as_str()), ("filename", reference.as_str())]);
    }
    let encoded = STANDARD.encode(embedded_bytes(file)?);
    w.open("file", &[("name", file.name.as_str())])?;
    w.event(Event::Text(BytesText::new(&encoded)))?;
    w.close("file")
}

fn write_image(w: &mut DeckWriter, image: &ImageAsset) -> Result<()> {
    w.open("image", &[("name", image.name.as_str())])?;
    w.leaf("file", &image.file)?;
    w.leaf("rect_pix", &image.rect.to_string())?;
    w.leaf("usage", &image.usage)?;
    w.close("image")
}

fn write_style(w: &mut DeckWriter, style: &Style) -> Result<()> {
    w.open("style", &[("name", style.name.as_str())])?;
    w.leaf("typeface", &style.typeface.to_string())?;
    w.leaf("typesize", &style.typesize.to_string())?;
    w.leaf("fillcolor", &style.fillcolor.to_string())?;
    w.leaf("bordercolor", &style.bordercolor.to_string())?;
    w.leaf("textcolor", &style.textcolor.to_string())?;
    w.leaf("borderthickness", &style.borderthickness.to_string())?;
    w.leaf("linestyle", style.linestyle.as_str())?;
    w.leaf("justification", style.justification.as_str())?;
    w.leaf("boundary_offset", &style.boundary_offset.to_string())?;
    w.close("style")
}

fn write_renderable(w: &mut DeckWriter, renderable: &Renderable) -> Result<()> {
    let tag = renderable.kind.tag();
    w.open(tag, &[("name", renderable.name.as_str())])?;
    w.leaf("location", &renderable.rect.to_string())?;
    w.leaf("rotation", &renderable.rotation.to_string())?;
    w.leaf("order", &renderable.order.to_string())?;
    w.leaf("underlay", if renderable.underlay { "1" } else { "0" })?;
    match &renderable.kind {
        RenderKind::Image { image } => w.leaf("image", image)?,
        RenderKind::Text { text, style } => {
            w.leaf("style", style)?;
            w.leaf("text", text)?;
        }
        RenderKind::Rect { style } => w.leaf("style", style)?,
    }
    w.close(tag)
}

fn write_face(w: &mut DeckWriter, name: &str, face: &Face) -> Result<()> {
    if face.is_empty() {
        return w.empty(name, &[]);
    }
    w.open(name, &[])?;
    for renderable in &face.renderables {
        write_renderable(w, renderable)?;
    }
    w.close(name)
}

fn write_card(w: &mut DeckWriter, element: &str, card: &Card) -> Result<()> {
    w.open(element, &[("name", card.name.as_str())])?;
    write_face(w, "top", &card.top_face)?;
    write_face(w, "bottom", &card.bot_face)?;
    w.close(element)
}

fn write_cards(w: &mut DeckWriter, deck: &Deck) -> Result<()> {
    w.open("cards", &[])?;
    for template in Template::ALL {
        write_card(w, template.element(), deck.card(deck.template(template)))?;
    }
    write_card(w, "iconreference", deck.card(deck.icon_reference()))?;
    for list in CardList::ALL {
        let element = list.category().element();
        let ids = deck.list(list);
        if ids.is_empty() {
            w.empty(element, &[])?;
            continue;
        }
        w.open(element, &[])?;
        for &id in ids {
            write_card(w, "card", deck.card(id))?;
        }
        w.close(element)?;
    }
    w.open("locations", &[])?;
    for location in deck.locations() {
        w.open("location", &[("name", location.name.as_str())])?;
        for &id in &location.cards {
            write_card(w, "card", deck.card(id))?;
        }
        w.close("location")?;
    }
    w.close("locations")?;
    w.close("cards")
}

/// Serialize a deck to XML text.
pub fn deck_to_string(deck: &Deck) -> Result<String> {
    let mut w = DeckWriter::new();
    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.open("deck", &[("name", deck.name.as_str())])?;
    let (width, height) = deck.card_size();
    w.leaf("decksize", &format!("{width} {height}"))?;

    w.open("assets", &[])?;
    for file in deck.files() {
        write_file(&mut w, file)?;
    }
    for image in deck.images() {
        write_image(&mut w, image)?;
    }
    for style in deck.styles() {
        write_style(&mut w, style)?;
    }
    w.close("assets")?;

    write_cards(&mut w, deck)?;
    w.close("deck")?;
    w.finish()
}

/// Write a deck file.
pub fn save_deck(deck: &Deck, path: &Path) -> Result<()> {
    let content = deck_to_string(deck)?;
    std::fs::write(path, content).map_err(|e| CardforgeError::io(path, e))?;
    tracing::info!(path = %path.display(), deck = %deck.name, "saved deck");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoadOptions, Rect, Rgba};
    use crate::deck::LineStyle;
    use crate::persist::reader::deck_from_str;
    use image::RgbaImage;

    fn sample() -> Deck {
        let mut deck = Deck::new("saved");
        deck.set_card_size(100, 150);
        let pixels = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
        deck.add_file(FileAsset::new("inline", FileSource::Embedded(Vec::new())).with_pixels(pixels));
        deck.add_file(FileAsset::new("star", FileSource::Builtin("star.png".into())));
        deck.add_image(ImageAsset::new("logo", "inline").with_rect(Rect::new(0.0, 0.0, 2.0, -1.0)));
        deck.add_style(
            Style::new("title")
                .with_typeface("Serif:bold")
                .with_colors(Rgba::WHITE, Rgba::BLACK, Rgba::new(9, 8, 7, 255))
                .with_border(2.5, LineStyle::Dash),
        );
        let face = Face::new()
            .with(Renderable::text("name", "  padded {cs}  ", "title").at(Rect::new(5.0, 5.0, 90.0, -1.0)))
            .with(Renderable::image("art", "logo").rotated(45.0))
            .with(Renderable::text("blank", "", "title"));
        deck.add_card(CardList::Base, Card::new("hero").with_top(face));
        let cave = deck.add_location("cave");
        deck.add_location_card(cave, Card::new("cave entrance"));
        deck
    }

    #[test]
    fn test_layout() {
        let xml = deck_to_string(&sample()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<decksize>100 150</decksize>"));
        assert!(xml.contains(r#"<file name="star" filename="builtin:star.png"/>"#));
        assert!(xml.contains("<linestyle>dash</linestyle>"));
        assert!(xml.contains("<text>  padded {cs}  </text>"));
        assert!(xml.contains("<text/>"));
        assert!(xml.contains("<defaultitemcard name=\"defaultitem\">"));
    }

    #[test]
    fn test_reload_keeps_content() {
        let deck = sample();
        let xml = deck_to_string(&deck).unwrap();
        let back = deck_from_str(&xml, &LoadOptions::default()).unwrap();

        assert_eq!(back.name, "saved");
        assert_eq!(back.card_size(), (100, 150));
        assert_eq!(back.styles(), deck.styles());
        assert_eq!(back.images(), deck.images());

        let inline = back.find_file("inline", None).unwrap();
        assert!(matches!(inline.source, FileSource::Embedded(ref b) if !b.is_empty()));
        assert_eq!(inline.pixels.as_ref().unwrap().get_pixel(2, 1).0, [1, 2, 3, 255]);

        let hero = back.find_card("hero", None).unwrap();
        assert_eq!(hero.top_face.renderables.len(), 3);
        assert_eq!(
            hero.top_face.renderables[0].kind,
            RenderKind::Text {
                text: "  padded {cs}  ".into(),
                style: "title".into()
            }
        );
        assert_eq!(hero.top_face.renderables[1].rotation, 45.0);
        assert_eq!(back.locations()[0].name, "cave");
        assert_eq!(back.find_card("cave entrance", None).unwrap().card_number, 4);
    }

    #[test]
    fn test_escaping() {
        let mut deck = Deck::new("a < b & \"c\"");
        deck.add_card(CardList::Misc, Card::new("x").with_top(Face::new().with(Renderable::text("t", "<b> & </b>", "s"))));
        let back = deck_from_str(&deck_to_string(&deck).unwrap(), &LoadOptions::default()).unwrap();
        assert_eq!(back.name, "a < b & \"c\"");
        let card = back.find_card("x", None).unwrap();
        assert!(matches!(&card.top_face.renderables[0].kind, RenderKind::Text { text, .. } if text == "<b> & </b>"));
    }

    #[test]
    fn test_save_deck_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.xml");
        save_deck(&sample(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<deck name=\"saved\">"));

        let missing = dir.path().join("no/such/dir/deck.xml");
        assert!(matches!(save_deck(&sample(), &missing), Err(CardforgeError::Io { .. })));
    }
}
