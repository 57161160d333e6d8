//! Renderables and faces.
//!
//! A `Face` is one printable side of a card: an ordered list of
//! `Renderable`s. Each renderable is one of three kinds, held as a
//! tagged variant in `RenderKind`:
//!
//! - `Image`: draws a named `ImageAsset`
//! - `Text`: lays out text (macros, inline styles and images) over a
//!   styled backdrop
//! - `Rect`: a styled backdrop only

use serde::{Deserialize, Serialize};

use crate::core::Rect;

/// What a renderable draws.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RenderKind {
    /// A named image crop.
    Image { image: String },
    /// Raw text (with macros and inline tokens) in a named style.
    Text { text: String, style: String },
    /// A backdrop rectangle in a named style.
    Rect { style: String },
}

impl RenderKind {
    /// Element name used by the deck file format.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            RenderKind::Image { .. } => "render_image",
            RenderKind::Text { .. } => "render_text",
            RenderKind::Rect { .. } => "render_rect",
        }
    }

    /// The style this renderable formats with, if any.
    #[must_use]
    pub fn style(&self) -> Option<&str> {
        match self {
            RenderKind::Text { style, .. } | RenderKind::Rect { style } => Some(style),
            RenderKind::Image { .. } => None,
        }
    }
}

/// A positioned, styled drawable unit within a face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    pub name: String,

    /// Placement. `w`/`h` accept the `-1`/`-2` sentinels.
    pub rect: Rect,

    /// Clockwise rotation in degrees about (`rect.x`, `rect.y`).
    pub rotation: f32,

    /// Paint priority; higher paints on top. Recomputed before drawing.
    pub order: f32,

    /// On background cards: paint before the foreground card's content.
    pub underlay: bool,

    pub kind: RenderKind,
}

impl Renderable {
    fn with_kind(name: impl Into<String>, kind: RenderKind) -> Self {
        Self {
            name: name.into(),
            rect: Rect::natural(),
            rotation: 0.0,
            order: 0.0,
            underlay: false,
            kind,
        }
    }

    #[must_use]
    pub fn image(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self::with_kind(name, RenderKind::Image { image: image.into() })
    }

    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>, style: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            RenderKind::Text {
                text: text.into(),
                style: style.into(),
            },
        )
    }

    #[must_use]
    pub fn rect(name: impl Into<String>, style: impl Into<String>) -> Self {
        Self::with_kind(name, RenderKind::Rect { style: style.into() })
    }

    #[must_use]
    pub fn at(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    #[must_use]
    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    #[must_use]
    pub fn underlay(mut self, underlay: bool) -> Self {
        self.underlay = underlay;
        self
    }
}

/// Which side of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceSide {
    Top,
    Bottom,
}

impl FaceSide {
    /// Short name used in output file names.
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            FaceSide::Top => "top",
            FaceSide::Bottom => "bot",
        }
    }

    /// Element name used by the deck file format.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            FaceSide::Top => "top",
            FaceSide::Bottom => "bottom",
        }
    }
}

/// One printable side of a card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub renderables: Vec<Renderable>,
}

impl Face {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a renderable (builder pattern).
    #[must_use]
    pub fn with(mut self, renderable: Renderable) -> Self {
        self.renderables.push(renderable);
        self
    }

    pub fn push(&mut self, renderable: Renderable) {
        self.renderables.push(renderable);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderable_builders() {
        let r = Renderable::text("title", "{cs}", "body")
            .at(Rect::new(1.0, 2.0, 3.0, 4.0))
            .rotated(90.0)
            .underlay(true);
        assert_eq!(r.rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r.rotation, 90.0);
        assert!(r.underlay);
        assert_eq!(r.kind.style(), Some("body"));
        assert_eq!(r.kind.tag(), "render_text");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Renderable::image("a", "b").kind.tag(), "render_image");
        assert_eq!(Renderable::rect("a", "s").kind.tag(), "render_rect");
        assert_eq!(Renderable::image("a", "b").kind.style(), None);
    }

    #[test]
    fn test_face_side_names() {
        assert_eq!(FaceSide::Top.file_tag(), "top");
        assert_eq!(FaceSide::Bottom.file_tag(), "bot");
        assert_eq!(FaceSide::Bottom.element(), "bottom");
    }

    #[test]
    fn test_face_serialization() {
        let face = Face::new().with(Renderable::rect("bg", "frame"));
        let json = serde_json::to_string(&face).unwrap();
        let back: Face = serde_json::from_str(&json).unwrap();
        assert_eq!(face, back);
    }
}
