//! Print geometry: rescaling and bleed padding.
//!
//! The bleed pad grows an image by `pad` pixels on every side. The outermost
//! row or column of each edge is smeared outward as a trapezoid: the strip
//! `i` pixels out from an edge is a copy of that edge stretched a little
//! wider than the previous one, so the corners fill in along the diagonals.

use image::imageops::FilterType;
use image::RgbaImage;

use crate::core::PrintProfile;

use super::canvas::blend;

/// Resize to exactly `size`, ignoring aspect ratio.
#[must_use]
pub fn rescale(img: &RgbaImage, size: (u32, u32)) -> RgbaImage {
    if img.dimensions() == size {
        return img.clone();
    }
    image::imageops::resize(img, size.0.max(1), size.1.max(1), FilterType::Triangle)
}

/// Stretch `source` over `length` pixels starting at `start` along one
/// row (`horizontal`) or column of `out`, at `fixed` on the other axis.
fn smear(out: &mut RgbaImage, source: &[image::Rgba<u8>], start: f32, length: f32, fixed: i64, horizontal: bool) {
    let (ow, oh) = out.dimensions();
    let (along_max, across_max) = if horizontal { (ow, oh) } else { (oh, ow) };
    if fixed < 0 || fixed >= i64::from(across_max) || source.is_empty() || length <= 0.0 {
        return;
    }
    let first = start.round().max(0.0) as u32;
    let last = (start + length).round().min(along_max as f32).max(0.0) as u32;
    for p in first..last {
        let t = (p as f32 + 0.5 - start) / length;
        let index = ((t * source.len() as f32) as usize).min(source.len() - 1);
        let (x, y) = if horizontal {
            (p, fixed as u32)
        } else {
            (fixed as u32, p)
        };
        blend(out.get_pixel_mut(x, y), source[index].0, 1.0);
    }
}

/// Widening factor of one trapezoid: how much longer each strip gets.
fn spread(across: u32, depth: u32) -> f32 {
    (across + 1) as f32 / depth.saturating_sub(1).max(1) as f32
}

/// Add a `pad`-pixel bleed around `img`. A pad of 0 returns the image
/// unchanged.
#[must_use]
pub fn pad_image(img: &RgbaImage, pad: u32) -> RgbaImage {
    if pad == 0 {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let (l, r, t, b) = (pad, pad, pad, pad);
    let mut out = RgbaImage::new(w + l + r, h + t + b);
    if w == 0 || h == 0 {
        return out;
    }
    image::imageops::replace(&mut out, img, i64::from(l), i64::from(t));

    let row = |y: u32| (0..w).map(|x| *img.get_pixel(x, y)).collect::<Vec<_>>();
    let column = |x: u32| (0..h).map(|y| *img.get_pixel(x, y)).collect::<Vec<_>>();
    let (lf, tf) = (l as f32, t as f32);

    let top = row(0);
    let f = spread(l + r, t);
    for i in 0..t {
        let i_f = i as f32;
        let y = i64::from(t) - i64::from(i) - 1;
        smear(&mut out, &top, lf - i_f * f * 0.5 - 1.0, w as f32 + f * i_f + 2.0, y, true);
    }

    let bottom = row(h - 1);
    let f = spread(l + r, b);
    for i in 0..b {
        let i_f = i as f32;
        let y = i64::from(t + h + i);
        smear(&mut out, &bottom, lf - i_f * f * 0.5 - 1.0, w as f32 + f * i_f + 2.0, y, true);
    }

    let left = column(0);
    let f = spread(t + b, l);
    for i in 0..l {
        let i_f = i as f32;
        let x = i64::from(l) - i64::from(i) - 1;
        smear(&mut out, &left, tf - i_f * f * 0.5 - 1.0, h as f32 + f * i_f + 2.0, x, false);
    }

    let right = column(w - 1);
    let f = spread(t + b, r);
    for i in 0..r {
        let i_f = i as f32;
        let x = i64::from(l + w + i);
        smear(&mut out, &right, tf - i_f * f * 0.5 - 1.0, h as f32 + f * i_f + 2.0, x, false);
    }

    out
}

/// Rescale to the profile's target size (if any), then pad.
#[must_use]
pub fn apply_profile(img: &RgbaImage, profile: &PrintProfile) -> RgbaImage {
    match profile.target_size {
        Some(size) if size != img.dimensions() => pad_image(&rescale(img, size), profile.pad),
        _ => pad_image(img, profile.pad),
    }
}
