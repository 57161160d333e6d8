//! CPU rasterization of primitives onto an RGBA canvas.
//!
//! Each primitive is first drawn upright into a sprite, then composited onto
//! the canvas. Rotated sprites are placed by inverse-mapping every canvas
//! pixel in the rotated bounding box back into the sprite, rotating
//! clockwise about the primitive's origin.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::imageops::FilterType;
use image::RgbaImage;

use crate::core::{points_to_pixels, Rgba};
use crate::deck::LineStyle;
use crate::layers::{Backdrop, ImageSprite, Primitive, TextRun};
use crate::text::{PieceKind, Span};

use super::fonts::FontBook;

/// Source-over blend `src` (scaled by `coverage`) onto `dst`.
pub(crate) fn blend(dst: &mut image::Rgba<u8>, src: [u8; 4], coverage: f32) {
    let sa = f32::from(src[3]) / 255.0 * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let sc = f32::from(src[c]);
        let dc = f32::from(dst.0[c]);
        let v = (sc * sa + dc * da * (1.0 - sa)) / out_a;
        dst.0[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// An upright drawing plus where its local origin sits inside it.
struct Sprite {
    pixels: RgbaImage,
    origin_x: f32,
    origin_y: f32,
}

/// The part of a primitive's upright local frame that can land on the
/// canvas, padded by one pixel and aligned to whole pixels.
///
/// Sprites are only allocated for this part, so primitives far larger than
/// the card cost no more than the card itself.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Window {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Window {
    /// Canvas bounds seen from a primitive whose origin sits at (`x`, `y`)
    /// and which is rotated clockwise by `rotation` degrees.
    fn of_canvas(width: u32, height: u32, x: f32, y: f32, rotation: f32) -> Self {
        let (sin, cos) = rotation.to_radians().sin_cos();
        let (w, h) = (width as f32, height as f32);
        let mut window = Self {
            min_x: f32::INFINITY,
            min_y: f32::INFINITY,
            max_x: f32::NEG_INFINITY,
            max_y: f32::NEG_INFINITY,
        };
        for (cx, cy) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
            let (dx, dy) = (cx - x, cy - y);
            let lx = dx * cos + dy * sin;
            let ly = -dx * sin + dy * cos;
            window.min_x = window.min_x.min(lx);
            window.min_y = window.min_y.min(ly);
            window.max_x = window.max_x.max(lx);
            window.max_y = window.max_y.max(ly);
        }
        Self {
            min_x: window.min_x.floor() - 1.0,
            min_y: window.min_y.floor() - 1.0,
            max_x: window.max_x.ceil() + 1.0,
            max_y: window.max_y.ceil() + 1.0,
        }
    }

    fn span_x(&self, lo: f32, hi: f32) -> Option<(f32, f32)> {
        clip_span(lo, hi, self.min_x, self.max_x)
    }

    fn span_y(&self, lo: f32, hi: f32) -> Option<(f32, f32)> {
        clip_span(lo, hi, self.min_y, self.max_y)
    }

    fn area(&self) -> f32 {
        (self.max_x - self.min_x) * (self.max_y - self.min_y)
    }
}

fn clip_span(lo: f32, hi: f32, min: f32, max: f32) -> Option<(f32, f32)> {
    let (lo, hi) = (lo.max(min), hi.min(max));
    (lo < hi).then_some((lo, hi))
}

/// Sprite pixels covering `lo..hi` of a sprite `len` pixels long.
fn pixel_range(lo: f32, hi: f32, len: u32) -> std::ops::Range<u32> {
    let clamp = |v: f32| v.round().clamp(0.0, len as f32) as u32;
    clamp(lo)..clamp(hi)
}

/// Dash pattern in units of the stroke width, alternating on/off.
fn dash_pattern(linestyle: LineStyle) -> &'static [f32] {
    match linestyle {
        LineStyle::Dash => &[3.0, 1.0],
        LineStyle::Dot => &[1.0, 1.0],
        LineStyle::DashDot => &[3.0, 1.0, 1.0, 1.0],
        LineStyle::Solid | LineStyle::Halo => &[],
    }
}

/// Whether the stroke is on at perimeter distance `s`.
fn dash_on(pattern: &[f32], width: f32, s: f32) -> bool {
    if pattern.is_empty() {
        return true;
    }
    let period: f32 = pattern.iter().sum::<f32>() * width;
    let mut t = s.rem_euclid(period);
    for (i, len) in pattern.iter().enumerate() {
        let len = len * width;
        if t < len {
            return i % 2 == 0;
        }
        t -= len;
    }
    false
}

/// A card-sized drawing surface.
#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A canvas filled with `fill`.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, fill.into()),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Draw one primitive.
    pub fn draw(&mut self, primitive: &Primitive, fonts: &FontBook) {
        let (x, y, rotation) = match primitive {
            Primitive::Rect(backdrop) => (backdrop.rect.x, backdrop.rect.y, backdrop.rotation),
            Primitive::Image(sprite) => (sprite.rect.x, sprite.rect.y, sprite.rotation),
            Primitive::Text(run) => (run.x, run.y, run.rotation),
        };
        if !(x.is_finite() && y.is_finite() && rotation.is_finite()) {
            tracing::warn!(kind = primitive.kind(), x, y, rotation, "primitive placement is not finite, skipping");
            return;
        }
        let window = Window::of_canvas(self.width(), self.height(), x, y, rotation);
        let sprite = match primitive {
            Primitive::Rect(backdrop) => rect_sprite(backdrop, &window),
            Primitive::Image(sprite) => image_sprite(sprite, &window),
            Primitive::Text(run) => text_sprite(run, fonts, self.width(), &window),
        };
        if let Some(sprite) = sprite {
            self.composite(&sprite, x, y, rotation);
        }
    }

    /// Place `sprite` so its local origin lands on (`x`, `y`), rotated
    /// clockwise by `rotation` degrees about that point.
    fn composite(&mut self, sprite: &Sprite, x: f32, y: f32, rotation: f32) {
        let (cw, ch) = self.image.dimensions();
        let (sw, sh) = sprite.pixels.dimensions();

        if rotation.rem_euclid(360.0) == 0.0 {
            let left = (x - sprite.origin_x).round() as i64;
            let top = (y - sprite.origin_y).round() as i64;
            for (sx, sy, px) in sprite.pixels.enumerate_pixels() {
                let cx = left + i64::from(sx);
                let cy = top + i64::from(sy);
                if cx < 0 || cy < 0 || cx >= i64::from(cw) || cy >= i64::from(ch) {
                    continue;
                }
                blend(self.image.get_pixel_mut(cx as u32, cy as u32), px.0, 1.0);
            }
            return;
        }

        let (sin, cos) = rotation.to_radians().sin_cos();
        let to_canvas = |lx: f32, ly: f32| (x + lx * cos - ly * sin, y + lx * sin + ly * cos);
        let corners = [
            to_canvas(-sprite.origin_x, -sprite.origin_y),
            to_canvas(sw as f32 - sprite.origin_x, -sprite.origin_y),
            to_canvas(-sprite.origin_x, sh as f32 - sprite.origin_y),
            to_canvas(sw as f32 - sprite.origin_x, sh as f32 - sprite.origin_y),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min).floor().max(0.0) as u32;
        let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max).ceil().min(cw as f32) as u32;
        let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max).ceil().min(ch as f32) as u32;

        for cy in min_y..max_y {
            for cx in min_x..max_x {
                let dx = cx as f32 + 0.5 - x;
                let dy = cy as f32 + 0.5 - y;
                let lx = dx * cos + dy * sin + sprite.origin_x;
                let ly = -dx * sin + dy * cos + sprite.origin_y;
                if lx < 0.0 || ly < 0.0 || lx >= sw as f32 || ly >= sh as f32 {
                    continue;
                }
                let src = sprite.pixels.get_pixel(lx as u32, ly as u32).0;
                blend(self.image.get_pixel_mut(cx, cy), src, 1.0);
            }
        }
    }
}

fn rect_sprite(backdrop: &Backdrop, window: &Window) -> Option<Sprite> {
    let rect = backdrop.rect;
    if !(rect.w > 0.0 && rect.h > 0.0) {
        return None;
    }
    let stroke = backdrop.border.alpha() > 0 && backdrop.thickness > 0.0;
    let half = if stroke { backdrop.thickness / 2.0 } else { 0.0 };
    let margin = half.ceil() + 1.0;
    let (left, right) = window.span_x(-margin, rect.w + margin)?;
    let (top, bottom) = window.span_y(-margin, rect.h + margin)?;
    let width = (right - left).ceil() as u32;
    let height = (bottom - top).ceil() as u32;
    let mut pixels = RgbaImage::new(width, height);

    if backdrop.fill.alpha() > 0 {
        let columns = pixel_range(-left, rect.w - left, width);
        for y in pixel_range(-top, rect.h - top, height) {
            for x in columns.clone() {
                blend(pixels.get_pixel_mut(x, y), backdrop.fill.0, 1.0);
            }
        }
    }

    if stroke {
        let pattern = dash_pattern(backdrop.linestyle);
        let t = backdrop.thickness;
        let (w, h) = (rect.w, rect.h);
        // distance along the perimeter, clockwise from the top-left corner
        let perimeter = |px: f32, py: f32| -> Option<f32> {
            let near = |v: f32, edge: f32| (v - edge).abs() <= half;
            let within = |v: f32, len: f32| v >= -half && v <= len + half;
            if near(py, 0.0) && within(px, w) {
                Some(px.clamp(0.0, w))
            } else if near(px, w) && within(py, h) {
                Some(w + py.clamp(0.0, h))
            } else if near(py, h) && within(px, w) {
                Some(w + h + (w - px.clamp(0.0, w)))
            } else if near(px, 0.0) && within(py, h) {
                Some(2.0 * w + h + (h - py.clamp(0.0, h)))
            } else {
                None
            }
        };
        for y in 0..height {
            for x in 0..width {
                let lx = left + x as f32 + 0.5;
                let ly = top + y as f32 + 0.5;
                if let Some(s) = perimeter(lx, ly) {
                    if dash_on(pattern, t, s) {
                        blend(pixels.get_pixel_mut(x, y), backdrop.border.0, 1.0);
                    }
                }
            }
        }
    }

    Some(Sprite {
        pixels,
        origin_x: -left,
        origin_y: -top,
    })
}

fn image_sprite(sprite: &ImageSprite, window: &Window) -> Option<Sprite> {
    let w = sprite.rect.w.round();
    let h = sprite.rect.h.round();
    let (sw, sh) = sprite.pixels.dimensions();
    if !(w >= 1.0 && h >= 1.0) || sw == 0 || sh == 0 {
        return None;
    }
    let (left, right) = window.span_x(0.0, w)?;
    let (top, bottom) = window.span_y(0.0, h)?;

    if w * h <= 4.0 * window.area() {
        let (w, h) = (w as u32, h as u32);
        let pixels = if (sw, sh) == (w, h) {
            (*sprite.pixels).clone()
        } else {
            image::imageops::resize(&*sprite.pixels, w, h, FilterType::Triangle)
        };
        return Some(Sprite {
            pixels,
            origin_x: 0.0,
            origin_y: 0.0,
        });
    }

    // Much larger than the card: sample only the visible part.
    let width = (right - left).ceil() as u32;
    let height = (bottom - top).ceil() as u32;
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let u = ((left + x as f32 + 0.5) / w * sw as f32) as u32;
        let v = ((top + y as f32 + 0.5) / h * sh as f32) as u32;
        *sprite.pixels.get_pixel(u.min(sw - 1), v.min(sh - 1))
    });
    Some(Sprite {
        pixels,
        origin_x: -left,
        origin_y: -top,
    })
}

/// Draw `text` with `font` at `baseline`, starting at `x`.
fn draw_glyphs(target: &mut RgbaImage, font: &FontArc, px: f32, text: &str, x: f32, baseline: f32, color: Rgba) {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let (tw, th) = target.dimensions();
    let mut caret = x;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        let Some(outline) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outline.px_bounds();
        outline.draw(|gx, gy, coverage| {
            let px = bounds.min.x as i64 + i64::from(gx);
            let py = bounds.min.y as i64 + i64::from(gy);
            if px >= 0 && py >= 0 && px < i64::from(tw) && py < i64::from(th) {
                blend(target.get_pixel_mut(px as u32, py as u32), color.0, coverage);
            }
        });
    }
}

fn text_sprite(run: &TextRun, fonts: &FontBook, card_width: u32, window: &Window) -> Option<Sprite> {
    let layout = &run.text.layout;
    let block = &run.text.block;

    let extent = layout
        .lines
        .iter()
        .flat_map(|l| l.pieces.iter().map(|p| p.x + p.width))
        .fold(layout.width, f32::max);
    let em = points_to_pixels(block.base_style.typesize, card_width);
    let margin = em.ceil().max(2.0);
    let (left, right) = window.span_x(-margin, extent + margin)?;
    let (top, bottom) = window.span_y(-margin, layout.height + margin)?;
    let width = (right - left).ceil().max(1.0) as u32;
    let height = (bottom - top).ceil().max(1.0) as u32;
    let mut pixels = RgbaImage::new(width, height);
    let mut drew = false;

    for line in &layout.lines {
        let baseline = line.y + line.ascent - top;
        for piece in &line.pieces {
            let Some(span) = block.spans.get(piece.span) else {
                continue;
            };
            match (&piece.kind, span) {
                (PieceKind::Text(text), Span::Text { style, .. }) => {
                    let Some(font) = fonts.font_for(&style.typeface) else {
                        continue;
                    };
                    let color = run.recolor.unwrap_or(style.textcolor);
                    let px = points_to_pixels(style.typesize, card_width);
                    draw_glyphs(&mut pixels, font, px, text, piece.x - left, baseline, color);
                    drew = true;
                }
                (PieceKind::Image, Span::Image { pixels: icon, size, .. }) if run.recolor.is_none() => {
                    let x = (piece.x - left).round() as i64;
                    let y = (baseline - size.height).round() as i64;
                    image::imageops::overlay(&mut pixels, icon, x, y);
                    drew = true;
                }
                _ => {}
            }
        }
    }

    if !drew && fonts.is_empty() && !block.plain_text().trim().is_empty() {
        tracing::debug!(text = %block.plain_text(), "no fonts loaded, text not drawn");
    }
    Some(Sprite {
        pixels,
        origin_x: -left,
        origin_y: -top,
    })
}
