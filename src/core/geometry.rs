//! Rectangles and the `-1` / `-2` size sentinels.
//!
//! Every rectangle in a deck (image crops, renderable placements, inline
//! image sizes) may use two sentinel values for its width or height:
//!
//! - `-1` ([`NATURAL`]): use the natural size of the content on that axis.
//! - `-2` ([`ASPECT`]): derive the size from the other, explicit axis so the
//!   content keeps its aspect ratio.
//!
//! ```
//! use rust_cardforge::core::{resolve_size, Size};
//!
//! let natural = Size::new(200.0, 100.0);
//! assert_eq!(resolve_size(-1.0, -1.0, natural), natural);
//! assert_eq!(resolve_size(-2.0, 50.0, natural), Size::new(100.0, 50.0));
//! ```

use serde::{Deserialize, Serialize};

/// Sentinel: take the natural size of the content.
pub const NATURAL: f32 = -1.0;

/// Sentinel: keep the aspect ratio using the paired dimension.
pub const ASPECT: f32 = -2.0;

/// A width/height pair in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Round to whole pixels, never below 1x1.
    #[must_use]
    pub fn to_pixels(self) -> (u32, u32) {
        (
            self.width.round().max(1.0) as u32,
            self.height.round().max(1.0) as u32,
        )
    }
}

/// Position and size of a drawable or a crop, in pixels.
///
/// `w` and `h` may hold [`NATURAL`] or [`ASPECT`]; call [`Rect::resolved`]
/// to get concrete dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// A rect at the origin that takes its content's natural size.
    #[must_use]
    pub const fn natural() -> Self {
        Self::new(0.0, 0.0, NATURAL, NATURAL)
    }

    /// Replace sentinels using the natural size of the content.
    #[must_use]
    pub fn resolved(self, natural: Size) -> Self {
        let size = resolve_size(self.w, self.h, natural);
        Self::new(self.x, self.y, size.width, size.height)
    }

    /// Grow the rect outward by `by` pixels on every side.
    #[must_use]
    pub fn outset(self, by: f32) -> Self {
        Self::new(self.x - by, self.y - by, self.w + 2.0 * by, self.h + 2.0 * by)
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Parse the persisted `"x y w h"` form.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace().map(str::parse::<f32>);
        let x = parts.next()?.ok()?;
        let y = parts.next()?.ok()?;
        let w = parts.next()?.ok()?;
        let h = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(x, y, w, h))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.w, self.h)
    }
}

fn is_sentinel(v: f32, sentinel: f32) -> bool {
    (v - sentinel).abs() < f32::EPSILON
}

/// Resolve a possibly-sentinel width/height against a natural size.
///
/// `-1` is resolved first on both axes. A `-2` width then becomes
/// `natural.width * h / natural.height` when the resolved height is
/// positive (otherwise the natural width), and a `-2` height is derived the
/// same way from the resolved width.
#[must_use]
pub fn resolve_size(w: f32, h: f32, natural: Size) -> Size {
    let mut w = if is_sentinel(w, NATURAL) { natural.width } else { w };
    let mut h = if is_sentinel(h, NATURAL) { natural.height } else { h };

    if is_sentinel(w, ASPECT) {
        w = if h > 0.0 && natural.height > 0.0 {
            h / natural.height * natural.width
        } else {
            natural.width
        };
    }
    if is_sentinel(h, ASPECT) {
        h = if w > 0.0 && natural.width > 0.0 {
            w / natural.width * natural.height
        } else {
            natural.height
        };
    }
    Size::new(w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAT: Size = Size::new(300.0, 150.0);

    #[test]
    fn test_explicit_sizes_untouched() {
        assert_eq!(resolve_size(40.0, 20.0, NAT), Size::new(40.0, 20.0));
    }

    #[test]
    fn test_natural_sentinel() {
        assert_eq!(resolve_size(-1.0, 20.0, NAT), Size::new(300.0, 20.0));
        assert_eq!(resolve_size(40.0, -1.0, NAT), Size::new(40.0, 150.0));
    }

    #[test]
    fn test_aspect_from_height() {
        assert_eq!(resolve_size(-2.0, 75.0, NAT), Size::new(150.0, 75.0));
    }

    #[test]
    fn test_aspect_from_width() {
        assert_eq!(resolve_size(600.0, -2.0, NAT), Size::new(600.0, 300.0));
    }

    #[test]
    fn test_aspect_with_natural_partner() {
        // -1 resolves first, so the aspect axis sees the natural partner.
        assert_eq!(resolve_size(-2.0, -1.0, NAT), NAT);
    }

    #[test]
    fn test_both_aspect_falls_back_to_natural() {
        assert_eq!(resolve_size(-2.0, -2.0, NAT), NAT);
    }

    #[test]
    fn test_rect_parse_and_display() {
        let r = Rect::parse("10 20 -1 -2").unwrap();
        assert_eq!(r, Rect::new(10.0, 20.0, -1.0, -2.0));
        assert_eq!(r.to_string(), "10 20 -1 -2");
        assert!(Rect::parse("1 2 3").is_none());
        assert!(Rect::parse("1 2 3 4 5").is_none());
        assert!(Rect::parse("a b c d").is_none());
    }

    #[test]
    fn test_outset() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0).outset(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 110.0, 60.0));
    }

    #[test]
    fn test_to_pixels_never_zero() {
        assert_eq!(Size::new(0.2, 0.0).to_pixels(), (1, 1));
        assert_eq!(Size::new(10.4, 9.6).to_pixels(), (10, 10));
    }
}
