//! Rich-text block builder.
//!
//! Turns a text renderable's raw text into a `TextBlock`: a list of styled
//! text spans and inline images, ready for paragraph layout.
//!
//! After macro expansion, two inline tokens are processed left to right:
//!
//! - `{s:style}`: switch the style of the text that follows
//! - `{I:image:dx:dy}`: embed an image scaled to `dx` x `dy` (`-1`/`-2`
//!   sentinels allowed; non-numeric sizes mean the natural size)
//!
//! Justification and wrapping come from the base style only.

use image::imageops::FilterType;
use image::RgbaImage;

use crate::core::{resolve_size, Size};
use crate::deck::{Deck, Justification, Style};

use super::macros::{expand_macros, MacroContext};

const STYLE_TOKEN: &str = "{s:";
const IMAGE_TOKEN: &str = "{I:";

/// One run of a text block.
#[derive(Clone, Debug, PartialEq)]
pub enum Span {
    /// Text in a style.
    Text { text: String, style: Style },
    /// An inline image, already scaled to `size`.
    Image {
        name: String,
        pixels: RgbaImage,
        size: Size,
    },
}

/// The styled content of one text renderable.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub base_style: Style,
    pub justification: Justification,
    /// Wrap width in pixels; non-positive means no wrapping.
    pub width: f32,
    pub spans: Vec<Span>,
}

impl TextBlock {
    /// Concatenated text of every text span.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .filter_map(|s| match s {
                Span::Text { text, .. } => Some(text.as_str()),
                Span::Image { .. } => None,
            })
            .collect()
    }

    /// Same block with every text span recolored (used for halo copies).
    #[must_use]
    pub fn recolored(&self, color: crate::core::Rgba) -> Self {
        let mut block = self.clone();
        for span in &mut block.spans {
            if let Span::Text { style, .. } = span {
                style.textcolor = color;
            }
        }
        block
    }
}

/// Builds `TextBlock`s against a deck.
#[derive(Clone, Copy, Debug)]
pub struct TextLayoutBuilder<'a> {
    macros: MacroContext<'a>,
}

impl<'a> TextLayoutBuilder<'a> {
    #[must_use]
    pub fn new(macros: MacroContext<'a>) -> Self {
        Self { macros }
    }

    fn deck(&self) -> &'a Deck {
        self.macros.deck
    }

    /// Expand macros and split `text` into styled spans.
    #[must_use]
    pub fn build(&self, text: &str, base_style: &Style, width: f32) -> TextBlock {
        let mut text = expand_macros(text, &self.macros);
        let mut style = base_style.clone();
        let mut spans = Vec::new();

        loop {
            let next_style = text.find(STYLE_TOKEN);
            let next_image = text.find(IMAGE_TOKEN);
            let (start, is_style) = match (next_style, next_image) {
                (None, None) => break,
                (Some(s), Some(i)) if s < i => (s, true),
                (Some(_), Some(i)) => (i, false),
                (Some(s), None) => (s, true),
                (None, Some(i)) => (i, false),
            };
            let Some(len) = text[start..].find('}') else {
                break;
            };
            let end = start + len;

            push_text(&mut spans, &text[..start], &style);
            let body = &text[start + STYLE_TOKEN.len()..end];
            if is_style {
                style = self.switch_style(body, base_style);
            } else if let Some(span) = self.inline_image(body) {
                spans.push(span);
            }
            text = text[end + 1..].to_string();
        }
        push_text(&mut spans, &text, &style);

        TextBlock {
            base_style: base_style.clone(),
            justification: base_style.justification,
            width,
            spans,
        }
    }

    fn switch_style(&self, name: &str, base_style: &Style) -> Style {
        match self.deck().find_style(name, None) {
            Some(style) => style.clone(),
            None => {
                tracing::warn!(style = %name, "inline style not found, using base style");
                base_style.clone()
            }
        }
    }

    /// Parse `name:dx:dy` and produce a scaled image span.
    fn inline_image(&self, body: &str) -> Option<Span> {
        let fields: Vec<&str> = body.split(':').collect();
        let [name, dx, dy] = fields.as_slice() else {
            tracing::warn!(token = %body, "invalid inline image token");
            return None;
        };
        let pixels = self.deck().image_pixels(name)?;
        let natural = Size::new(pixels.width() as f32, pixels.height() as f32);
        let size = match (dx.trim().parse::<i32>(), dy.trim().parse::<i32>()) {
            (Ok(dx), Ok(dy)) => resolve_size(dx as f32, dy as f32, natural),
            _ => natural,
        };
        let (w, h) = self.fit_to_card(name, size).to_pixels();
        let pixels = if (w, h) == pixels.dimensions() {
            pixels
        } else {
            image::imageops::resize(&pixels, w, h, FilterType::Triangle)
        };
        Some(Span::Image {
            name: (*name).to_string(),
            pixels,
            size: Size::new(w as f32, h as f32),
        })
    }
}

impl TextLayoutBuilder<'_> {
    /// Shrink an inline image whose longest side exceeds the card's.
    fn fit_to_card(&self, name: &str, size: Size) -> Size {
        let (width, height) = self.deck().card_size();
        let limit = width.max(height) as f32;
        let longest = size.width.max(size.height);
        if longest <= limit {
            return size;
        }
        tracing::warn!(
            image = %name,
            width = size.width,
            height = size.height,
            limit,
            "inline image larger than the card, shrinking"
        );
        let scale = limit / longest;
        Size::new(size.width * scale, size.height * scale)
    }
}

fn push_text(spans: &mut Vec<Span>, text: &str, style: &Style) {
    if !text.is_empty() {
        spans.push(Span::Text {
            text: text.to_string(),
            style: style.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rect, Rgba};
    use crate::deck::{Card, CardList, FileAsset, FileSource, ImageAsset};

    fn deck() -> Deck {
        let mut deck = Deck::new("t");
        deck.add_style(Style::new("body").with_justification(Justification::Left));
        deck.add_style(Style::new("bold").with_typeface("Serif:bold"));
        deck.add_file(
            FileAsset::new("icons", FileSource::Embedded(Vec::new()))
                .with_pixels(RgbaImage::new(40, 20)),
        );
        deck.add_image(ImageAsset::new("skull", "icons").with_rect(Rect::new(0.0, 0.0, 20.0, 10.0)));
        deck.add_card(CardList::Base, Card::new("only"));
        deck.renumber_entities();
        deck
    }

    fn build(deck: &Deck, text: &str) -> TextBlock {
        let card = deck.find_card("only", None).unwrap();
        let builder = TextLayoutBuilder::new(MacroContext::new(deck).with_card(card));
        builder.build(text, deck.style_or_default("body"), 100.0)
    }

    fn text_spans(block: &TextBlock) -> Vec<(String, String)> {
        block
            .spans
            .iter()
            .filter_map(|s| match s {
                Span::Text { text, style } => Some((text.clone(), style.name.clone())),
                Span::Image { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_single_span() {
        let deck = deck();
        let block = build(&deck, "Card {cN}");
        assert_eq!(text_spans(&block), vec![("Card 1".into(), "body".into())]);
        assert_eq!(block.justification, Justification::Left);
        assert_eq!(block.width, 100.0);
    }

    #[test]
    fn test_style_switch() {
        let deck = deck();
        let block = build(&deck, "plain {s:bold}strong{s:body} again");
        assert_eq!(
            text_spans(&block),
            vec![
                ("plain ".into(), "body".into()),
                ("strong".into(), "bold".into()),
                (" again".into(), "body".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_style_reverts_to_base() {
        let deck = deck();
        let block = build(&deck, "{s:bold}a{s:nope}b");
        assert_eq!(
            text_spans(&block),
            vec![("a".into(), "bold".into()), ("b".into(), "body".into())]
        );
    }

    #[test]
    fn test_inline_image_sizes() {
        let deck = deck();
        let block = build(&deck, "x{I:skull:-1:-1}y{I:skull:40:-2}z{I:skull:a:b}");
        let sizes: Vec<Size> = block
            .spans
            .iter()
            .filter_map(|s| match s {
                Span::Image { size, .. } => Some(*size),
                Span::Text { .. } => None,
            })
            .collect();
        assert_eq!(
            sizes,
            vec![Size::new(20.0, 10.0), Size::new(40.0, 20.0), Size::new(20.0, 10.0)]
        );
        assert_eq!(block.plain_text(), "xyz");
    }

    #[test]
    fn test_bad_image_tokens_dropped() {
        let deck = deck();
        let block = build(&deck, "a{I:skull}b{I:ghost:1:1}c");
        assert_eq!(block.plain_text(), "abc");
        assert!(block.spans.iter().all(|s| matches!(s, Span::Text { .. })));
    }

    #[test]
    fn test_unknown_inline_image_keeps_text() {
        let deck = deck();
        let block = build(&deck, "before {I:ghost:-1:-1}after");
        assert_eq!(
            text_spans(&block),
            vec![("before ".into(), "body".into()), ("after".into(), "body".into())]
        );
    }

    #[test]
    fn test_oversized_inline_image_fits_card() {
        let mut deck = deck();
        deck.set_card_size(60, 90);
        let block = build(&deck, "{I:skull:100000:-2}");
        let Span::Image { size, pixels, .. } = &block.spans[0] else {
            panic!("expected an image span");
        };
        assert_eq!(*size, Size::new(90.0, 45.0));
        assert_eq!(pixels.dimensions(), (90, 45));
    }

    #[test]
    fn test_unterminated_token_kept_as_text() {
        let deck = deck();
        let block = build(&deck, "a{s:bold");
        assert_eq!(text_spans(&block), vec![("a{s:bold".into(), "body".into())]);
    }

    #[test]
    fn test_leftmost_token_first() {
        let deck = deck();
        let block = build(&deck, "{I:skull:-1:-1}{s:bold}t");
        assert!(matches!(block.spans[0], Span::Image { .. }));
        assert_eq!(text_spans(&block), vec![("t".into(), "bold".into())]);
    }

    #[test]
    fn test_recolored() {
        let deck = deck();
        let block = build(&deck, "a{s:bold}b").recolored(Rgba::WHITE);
        for span in &block.spans {
            if let Span::Text { style, .. } = span {
                assert_eq!(style.textcolor, Rgba::WHITE);
            }
        }
    }
}
