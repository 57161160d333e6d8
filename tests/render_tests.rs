//! Rendering pipeline tests.
//!
//! These tests verify the output side of the pipeline:
//! - File naming and the single-card filter
//! - Print geometry (rescale, bleed pad)
//! - Size sentinel resolution

use image::RgbaImage;
use proptest::prelude::*;
use rust_cardforge::core::{resolve_size, PrintProfile, Rect, RenderConfig, Rgba, Size};
use rust_cardforge::deck::{Card, CardList, Deck, Face, FileAsset, FileSource, ImageAsset, Renderable, Style, Template};
use rust_cardforge::raster::{pad_image, FontBook, Renderer};

fn art_deck() -> Deck {
    let mut deck = Deck::new("art");
    deck.set_card_size(80, 120);
    let sheet = RgbaImage::from_fn(20, 10, |x, _| {
        if x < 10 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 255, 0, 255])
        }
    });
    deck.add_file(FileAsset::new("sheet", FileSource::Embedded(Vec::new())).with_pixels(sheet));
    deck.add_image(ImageAsset::new("green", "sheet").with_rect(Rect::new(10.0, 0.0, -1.0, -1.0)));
    deck.add_style(Style::new("panel").with_colors(Rgba::new(0, 0, 0, 255), Rgba::BLACK, Rgba::WHITE));

    deck.set_template(
        Template::Default,
        Card::background("default").with_bottom(
            Face::new().with(Renderable::rect("back", "panel").at(Rect::new(0.0, 0.0, -1.0, -1.0)).underlay(true)),
        ),
    );
    deck.add_card(
        CardList::Base,
        Card::new("one").with_top(Face::new().with(Renderable::image("pic", "green").at(Rect::new(20.0, 30.0, 40.0, -2.0)))),
    );
    deck.add_card(
        CardList::Base,
        Card::new("two").with_top(Face::new().with(Renderable::image("missing", "nope").at(Rect::new(0.0, 0.0, 10.0, 10.0)))),
    );
    deck.renumber_entities();
    deck.recompute_render_orders();
    deck
}

/// Test a full render writes both faces of every card.
#[test]
fn test_render_deck_files() {
    let deck = art_deck();
    let dir = tempfile::tempdir().unwrap();
    let renderer = Renderer::with_fonts(RenderConfig::default(), FontBook::new());
    let report = renderer.render_deck(&deck, dir.path()).unwrap();

    // two base cards and the icon reference
    assert_eq!(report.cards_seen, 3);
    for n in 0..3 {
        assert!(dir.path().join(format!("card_top_{n:03}.png")).exists());
        assert!(dir.path().join(format!("card_bot_{n:03}.png")).exists());
    }

    let top = image::open(dir.path().join("card_top_000.png")).unwrap().to_rgba8();
    assert_eq!(top.dimensions(), (80, 120));
    // the 10x10 green crop scaled to 40x40 at (20, 30)
    let inside = top.get_pixel(40, 50).0;
    assert!(inside[1] > 250 && inside[0] < 5, "{inside:?}");
    // base fill elsewhere
    assert_eq!(top.get_pixel(5, 5).0, [0xE0, 0xE0, 0xFF, 0xFF]);

    // template underlay covers the back
    let bottom = image::open(dir.path().join("card_bot_001.png")).unwrap().to_rgba8();
    assert_eq!(bottom.get_pixel(40, 60).0, [0, 0, 0, 255]);
}

/// Test an unknown image draws a placeholder instead of failing.
#[test]
fn test_missing_image_placeholder() {
    let deck = art_deck();
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig::default().with_target_card(1);
    let report = Renderer::with_fonts(config, FontBook::new()).render_deck(&deck, dir.path()).unwrap();
    assert_eq!(report.cards_rendered(), 1);

    let top = image::open(dir.path().join("card_top_001.png")).unwrap().to_rgba8();
    let fill = [0xE0, 0xE0, 0xFF, 0xFF];
    assert!((0..10).any(|x| top.get_pixel(x, 2).0 != fill));
    assert_eq!(top.get_pixel(50, 50).0, fill);
}

/// Test the commercial-style profile output size.
#[test]
fn test_profile_output_size() {
    let deck = art_deck();
    let dir = tempfile::tempdir().unwrap();
    let profile = PrintProfile::screen().with_target_size(40, 60).with_pad(6);
    let config = RenderConfig::default().with_profile(profile.clone()).with_target_card(0);
    Renderer::with_fonts(config, FontBook::new()).render_deck(&deck, dir.path()).unwrap();

    let img = image::open(dir.path().join("card_top_000.png")).unwrap();
    assert_eq!((img.width(), img.height()), profile.output_size(deck.card_size()));
}

/// Test primitives far larger than the card are clipped, not allocated whole.
#[test]
fn test_oversized_primitives_fill_canvas() {
    let mut deck = Deck::new("huge");
    deck.set_card_size(60, 90);
    deck.add_style(Style::new("red").with_colors(Rgba::new(255, 0, 0, 255), Rgba::TRANSPARENT, Rgba::BLACK));
    let green = RgbaImage::from_pixel(4, 4, image::Rgba([0, 255, 0, 255]));
    deck.add_file(FileAsset::new("green", FileSource::Embedded(Vec::new())).with_pixels(green));
    deck.add_image(ImageAsset::new("green", "green").with_rect(Rect::new(0.0, 0.0, -1.0, -1.0)));
    deck.add_card(
        CardList::Base,
        Card::new("backdrop").with_top(Face::new().with(Renderable::rect("huge", "red").at(Rect::new(0.0, 0.0, 1e10, 1e10)))),
    );
    deck.add_card(
        CardList::Base,
        Card::new("poster").with_top(
            Face::new().with(
                Renderable::image("huge", "green")
                    .at(Rect::new(-5e5, -5e5, 1e6, 1e6))
                    .rotated(30.0),
            ),
        ),
    );
    deck.renumber_entities();
    deck.recompute_render_orders();

    let dir = tempfile::tempdir().unwrap();
    let renderer = Renderer::with_fonts(RenderConfig::default(), FontBook::new());
    let report = renderer.render_deck(&deck, dir.path()).unwrap();
    assert_eq!(report.cards_seen, 3);

    let backdrop = image::open(dir.path().join("card_top_000.png")).unwrap().to_rgba8();
    assert_eq!(backdrop.dimensions(), (60, 90));
    assert!(backdrop.pixels().all(|p| p.0 == [255, 0, 0, 255]));

    let poster = image::open(dir.path().join("card_top_001.png")).unwrap().to_rgba8();
    assert!(poster.pixels().all(|p| p.0 == [0, 255, 0, 255]));
}

proptest! {
    /// A zero pad returns the input bytes unchanged.
    #[test]
    fn prop_pad_zero_identity(w in 1u32..24, h in 1u32..24, seed in any::<u8>()) {
        let img = RgbaImage::from_fn(w, h, |x, y| image::Rgba([seed ^ x as u8, y as u8, seed, 255 - seed]));
        let out = pad_image(&img, 0);
        prop_assert_eq!(out.dimensions(), img.dimensions());
        prop_assert_eq!(out.as_raw(), img.as_raw());
    }

    /// `-1` takes the natural size; `-2` keeps the natural aspect ratio.
    #[test]
    fn prop_sentinel_resolution(nw in 1.0f32..2000.0, nh in 1.0f32..2000.0, explicit in 1.0f32..2000.0) {
        let natural = Size::new(nw, nh);
        prop_assert_eq!(resolve_size(-1.0, -1.0, natural), natural);

        let wide = resolve_size(-2.0, explicit, natural);
        prop_assert!((wide.height - explicit).abs() < 1e-3);
        prop_assert!((wide.width / wide.height - nw / nh).abs() < 1e-3 * (nw / nh).max(1.0));

        let tall = resolve_size(explicit, -2.0, natural);
        prop_assert!((tall.width - explicit).abs() < 1e-3);
        prop_assert!((tall.height / tall.width - nh / nw).abs() < 1e-3 * (nh / nw).max(1.0));

        let both = resolve_size(-2.0, -1.0, natural);
        prop_assert!((both.width - nw).abs() < 1e-2);
    }
}
