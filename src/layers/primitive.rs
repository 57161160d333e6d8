//! Drawable primitives and renderable expansion.
//!
//! A renderable expands into one or more `Primitive`s, listed top to bottom:
//!
//! - image renderable: one `Image`
//! - rect renderable: one backdrop `Rect`
//! - text renderable: the glyph run, eight halo copies when the style's line
//!   style is `halo`, then the backdrop `Rect`
//!
//! Every primitive rotates about its own top-left corner, which for text and
//! images is the renderable's (`x`, `y`) and for backdrops is the outset
//! corner.

use std::sync::Arc;

use image::RgbaImage;
use smallvec::SmallVec;

use crate::core::{resolve_size, Rect, Rgba, Size, ASPECT, NATURAL};
use crate::deck::{Deck, LineStyle, RenderKind, Renderable, Style};
use crate::text::{layout_block, LaidOutBlock, TextBlock, TextLayoutBuilder, TextMetrics};

/// Expansion of one renderable; ten covers a halo text item.
pub type Primitives = SmallVec<[Primitive; 10]>;

/// Unit offsets of the halo copies, multiplied by `HALO_DISTANCE`.
pub const HALO_OFFSETS: [(f32, f32); 8] = [
    (-1.0, -1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
];

pub const HALO_DISTANCE: f32 = 3.0;

/// Side of the checkerboard drawn for images that cannot be resolved.
const PLACEHOLDER_SIZE: u32 = 32;

/// A text block with its line layout, shared by a glyph run and its halo.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedText {
    pub block: TextBlock,
    pub layout: LaidOutBlock,
}

/// A laid-out text block at a position.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub text: Arc<PlacedText>,
    /// Halo copies: every glyph in this color, inline images omitted.
    pub recolor: Option<Rgba>,
}

/// An image scaled into `rect`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSprite {
    pub rect: Rect,
    pub rotation: f32,
    pub pixels: Arc<RgbaImage>,
}

/// A filled and stroked rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct Backdrop {
    pub rect: Rect,
    pub rotation: f32,
    pub fill: Rgba,
    pub border: Rgba,
    pub thickness: f32,
    pub linestyle: LineStyle,
}

impl Backdrop {
    /// Backdrop for `style` around `rect`, outset by the boundary offset.
    #[must_use]
    pub fn for_style(style: &Style, rect: Rect, rotation: f32) -> Self {
        Self {
            rect: rect.outset(style.boundary_offset),
            rotation,
            fill: style.fillcolor,
            border: style.backdrop_border_color(),
            thickness: style.borderthickness,
            linestyle: style.linestyle,
        }
    }
}

/// One drawable unit.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text(TextRun),
    Image(ImageSprite),
    Rect(Backdrop),
}

impl Primitive {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Primitive::Text(run) if run.recolor.is_some() => "halo",
            Primitive::Text(_) => "text",
            Primitive::Image(_) => "image",
            Primitive::Rect(_) => "rect",
        }
    }
}

/// Everything needed to expand renderables of one card.
#[derive(Clone, Copy)]
pub struct ExpandContext<'a> {
    pub deck: &'a Deck,
    pub builder: TextLayoutBuilder<'a>,
    pub metrics: &'a dyn TextMetrics,
}

impl<'a> ExpandContext<'a> {
    #[must_use]
    pub fn new(deck: &'a Deck, builder: TextLayoutBuilder<'a>, metrics: &'a dyn TextMetrics) -> Self {
        Self {
            deck,
            builder,
            metrics,
        }
    }
}

/// Magenta and black checkerboard standing in for a missing image.
#[must_use]
pub fn placeholder_image() -> RgbaImage {
    let cell = PLACEHOLDER_SIZE / 4;
    RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([255, 0, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    })
}

/// Expand `renderable` into its primitives, top to bottom.
#[must_use]
pub fn expand_renderable(renderable: &Renderable, ctx: &ExpandContext<'_>) -> Primitives {
    match &renderable.kind {
        RenderKind::Image { image } => expand_image(renderable, image, ctx),
        RenderKind::Rect { style } => expand_rect(renderable, style, ctx),
        RenderKind::Text { text, style } => expand_text(renderable, text, style, ctx),
    }
}

fn expand_image(renderable: &Renderable, image: &str, ctx: &ExpandContext<'_>) -> Primitives {
    let pixels = ctx.deck.image_pixels(image).unwrap_or_else(placeholder_image);
    let natural = Size::new(pixels.width() as f32, pixels.height() as f32);
    let size = resolve_size(renderable.rect.w, renderable.rect.h, natural);
    let mut out = Primitives::new();
    out.push(Primitive::Image(ImageSprite {
        rect: Rect::new(renderable.rect.x, renderable.rect.y, size.width, size.height),
        rotation: renderable.rotation,
        pixels: Arc::new(pixels),
    }));
    out
}

fn expand_rect(renderable: &Renderable, style: &str, ctx: &ExpandContext<'_>) -> Primitives {
    let style = ctx.deck.style_or_default(style);
    let (cw, ch) = ctx.deck.card_size();
    let remaining = Size::new(
        (cw as f32 - renderable.rect.x).max(0.0),
        (ch as f32 - renderable.rect.y).max(0.0),
    );
    let rect = renderable.rect.resolved(remaining);
    let mut out = Primitives::new();
    out.push(Primitive::Rect(Backdrop::for_style(style, rect, renderable.rotation)));
    out
}

/// Text extents: positive values and the aspect sentinel are kept, anything
/// else means the natural size.
fn text_extent(value: f32) -> f32 {
    if value > 0.0 || value == ASPECT {
        value
    } else {
        NATURAL
    }
}

fn expand_text(renderable: &Renderable, text: &str, style: &str, ctx: &ExpandContext<'_>) -> Primitives {
    let style = ctx.deck.style_or_default(style);
    let r = renderable.rect;
    let wrap = if r.w > 0.0 { r.w } else { NATURAL };

    let block = ctx.builder.build(text, style, wrap);
    let layout = layout_block(&block, ctx.metrics);
    let natural = Size::new(layout.width, layout.height);
    let size = resolve_size(text_extent(r.w), text_extent(r.h), natural);
    let placed = Arc::new(PlacedText { block, layout });

    let mut out = Primitives::new();
    out.push(Primitive::Text(TextRun {
        x: r.x,
        y: r.y,
        rotation: renderable.rotation,
        text: Arc::clone(&placed),
        recolor: None,
    }));
    if style.linestyle == LineStyle::Halo {
        for (dx, dy) in HALO_OFFSETS {
            out.push(Primitive::Text(TextRun {
                x: r.x + dx * HALO_DISTANCE,
                y: r.y + dy * HALO_DISTANCE,
                rotation: renderable.rotation,
                text: Arc::clone(&placed),
                recolor: Some(style.bordercolor),
            }));
        }
    }
    let rect = Rect::new(r.x, r.y, size.width, size.height);
    out.push(Primitive::Rect(Backdrop::for_style(style, rect, renderable.rotation)));
    out
}
