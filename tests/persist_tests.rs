//! Deck file round-trip tests.
//!
//! Saving a deck and loading it back must reproduce the model, including
//! the numbers `renumber_entities` assigns.

use image::RgbaImage;
use rust_cardforge::core::{LoadOptions, Rect, Rgba};
use rust_cardforge::deck::{Card, CardList, Deck, Face, FileAsset, FileSource, ImageAsset, LineStyle, Renderable, Style, Template};
use rust_cardforge::persist::{deck_from_str, deck_to_string, load_deck, save_deck};
use rust_cardforge::CardforgeError;

fn story_deck() -> Deck {
    let mut deck = Deck::new("story");
    deck.set_card_size(300, 450);
    let art = RgbaImage::from_fn(16, 8, |x, y| image::Rgba([x as u8 * 10, y as u8 * 20, 99, 255]));
    deck.add_file(FileAsset::new("art", FileSource::Embedded(Vec::new())).with_pixels(art));
    deck.add_image(ImageAsset::new("left", "art").with_rect(Rect::new(0.0, 0.0, 8.0, -1.0)));
    deck.add_image(ImageAsset::new("icon", "art").with_rect(Rect::new(8.0, 0.0, -1.0, -2.0)).with_usage("icon"));
    deck.add_style(Style::new("body").with_typeface("Serif:italic").with_typesize(9.5));
    deck.add_style(Style::new("banner").with_colors(Rgba::BLACK, Rgba::WHITE, Rgba::WHITE).with_border(3.0, LineStyle::DashDot));

    deck.set_template(
        Template::Default,
        Card::background("default").with_top(
            Face::new()
                .with(Renderable::rect("frame", "banner").at(Rect::new(0.0, 0.0, -1.0, -1.0)).underlay(true))
                .with(Renderable::text("number", "{cN}", "body").at(Rect::new(10.0, 400.0, 50.0, -1.0))),
        ),
    );
    deck.add_card(CardList::DeckCards, Card::new("rules"));
    deck.add_card(
        CardList::Base,
        Card::new("intro").with_top(
            Face::new()
                .with(Renderable::text("title", "{cs} {I:icon:-1:-1}", "body").rotated(90.0))
                .with(Renderable::image("pic", "left").at(Rect::new(5.0, 5.0, -2.0, 40.0))),
        ),
    );
    deck.add_card(CardList::Items, Card::new("lamp"));
    deck.add_card(CardList::Characters, Card::new("hero"));
    let crypt = deck.add_location("crypt");
    deck.add_location_card(crypt, Card::new("crypt door"));
    deck.add_location_card(crypt, Card::new("crypt hall"));
    deck.renumber_entities();
    deck
}

fn numbers(deck: &Deck) -> Vec<(String, i32, i32)> {
    deck.all_cards()
        .map(|(_, c)| (c.name.clone(), c.card_number, c.local_card_number))
        .collect()
}

/// Test that reload then renumber reproduces every card number.
#[test]
fn test_reload_keeps_numbers() {
    let deck = story_deck();
    let before = numbers(&deck);

    let xml = deck_to_string(&deck).unwrap();
    let mut back = deck_from_str(&xml, &LoadOptions::default()).unwrap();
    back.renumber_entities();

    let mut after = numbers(&back);
    let mut before_sorted = before.clone();
    before_sorted.sort();
    after.sort();
    assert_eq!(after, before_sorted);
    assert_eq!(back.locations()[0].card_number, deck.locations()[0].card_number);
}

/// Test that assets survive a save and load through a file.
#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("story.deck");
    let deck = story_deck();
    save_deck(&deck, &path).unwrap();
    let back = load_deck(&path, &LoadOptions::default()).unwrap();

    assert_eq!(back.card_size(), (300, 450));
    assert_eq!(back.styles(), deck.styles());
    assert_eq!(back.images(), deck.images());
    assert_eq!(back.image_pixels("left"), deck.image_pixels("left"));
    assert_eq!(back.image_pixels("icon").map(|p| p.dimensions()), Some((8, 8)));

    let intro = back.find_card("intro", None).unwrap();
    assert_eq!(intro.top_face.renderables, {
        let mut expected = deck.find_card("intro", None).unwrap().top_face.clone();
        expected.recompute_renderable_order(false);
        expected.renderables
    });

    let template = back.card(back.template(Template::Default));
    assert!(template.background);
    assert_eq!(template.top_face.renderables[0].order, -100.0);
}

/// Test that a second save of a loaded deck is byte-identical.
#[test]
fn test_save_is_stable() {
    let mut deck = story_deck();
    deck.recompute_render_orders();
    let first = deck_to_string(&deck).unwrap();
    let back = deck_from_str(&first, &LoadOptions::default()).unwrap();
    let second = deck_to_string(&back).unwrap();
    assert_eq!(first, second);
}

/// Test hard load failures.
#[test]
fn test_load_failures() {
    assert!(matches!(
        deck_from_str("<deck><assets>", &LoadOptions::default()),
        Err(CardforgeError::Xml { .. })
    ));
    assert!(matches!(
        deck_from_str("<notadeck/>", &LoadOptions::default()),
        Err(CardforgeError::InvalidDeck(_))
    ));
    assert!(matches!(
        deck_from_str("<deck><decksize>wide</decksize></deck>", &LoadOptions::default()),
        Err(CardforgeError::InvalidDeck(_))
    ));
}

/// Test that a missing referenced file only degrades the image.
#[test]
fn test_missing_referenced_file_is_soft() {
    let xml = r#"<deck name="d">
  <assets>
    <file name="gone" filename="nowhere/missing.png"/>
    <image name="pic"><file>gone</file><rect_pix>0 0 -1 -1</rect_pix></image>
  </assets>
</deck>"#;
    let dir = tempfile::tempdir().unwrap();
    let deck = deck_from_str(xml, &LoadOptions::default().with_base_dir(dir.path())).unwrap();
    assert!(deck.find_file("gone", None).unwrap().pixels.is_none());
    assert!(deck.image_pixels("pic").is_none());
}
