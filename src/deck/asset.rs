//! Deck assets: source files, image crops and styles.
//!
//! - `FileAsset`: a decoded raster, embedded in the deck or referenced by path
//! - `ImageAsset`: a named crop of a `FileAsset`
//! - `Style`: a named formatting bundle for text and backdrop rectangles

use std::path::PathBuf;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::core::{Rect, Rgba, Size};

/// URI scheme marking files bundled with the tool rather than the deck.
pub const BUILTIN_SCHEME: &str = "builtin:";

/// Where a file's bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileSource {
    /// Encoded image bytes stored inline in the deck file.
    Embedded(Vec<u8>),
    /// A path on disk, relative to the deck directory when not absolute.
    Path(PathBuf),
    /// A bundled asset (`builtin:<name>`).
    Builtin(String),
}

impl FileSource {
    /// Classify a persisted path reference.
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        match reference.strip_prefix(BUILTIN_SCHEME) {
            Some(name) => FileSource::Builtin(name.to_string()),
            None => FileSource::Path(PathBuf::from(reference)),
        }
    }

    /// The persisted form of a non-embedded source.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        match self {
            FileSource::Embedded(_) => None,
            FileSource::Path(p) => Some(p.to_string_lossy().into_owned()),
            FileSource::Builtin(name) => Some(format!("{BUILTIN_SCHEME}{name}")),
        }
    }
}

/// A raster source image.
///
/// `pixels` is `None` when the source could not be read or decoded; images
/// cropping such a file render as a placeholder.
#[derive(Clone, Debug)]
pub struct FileAsset {
    pub name: String,
    pub source: FileSource,
    pub pixels: Option<RgbaImage>,
}

impl FileAsset {
    #[must_use]
    pub fn new(name: impl Into<String>, source: FileSource) -> Self {
        Self {
            name: name.into(),
            source,
            pixels: None,
        }
    }

    /// Attach decoded pixels (builder pattern).
    #[must_use]
    pub fn with_pixels(mut self, pixels: RgbaImage) -> Self {
        self.pixels = Some(pixels);
        self
    }

    /// Pixel dimensions, or zero when undecoded.
    #[must_use]
    pub fn size(&self) -> Size {
        self.pixels
            .as_ref()
            .map(|p| Size::new(p.width() as f32, p.height() as f32))
            .unwrap_or_default()
    }
}

/// A named crop of a `FileAsset`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub name: String,

    /// Name of the source `FileAsset`.
    pub file: String,

    /// Crop rectangle in source pixels. `-1` extends to the source edge,
    /// `-2` keeps the remaining area's aspect ratio.
    pub rect: Rect,

    /// Free-form usage tag (face, badge, token...).
    pub usage: String,
}

impl ImageAsset {
    #[must_use]
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            rect: Rect::natural(),
            usage: String::new(),
        }
    }

    #[must_use]
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Crop `source` by this image's rectangle.
    ///
    /// The natural size for the sentinels is what remains of the source to
    /// the right of and below the crop origin. The crop is clamped to the
    /// source bounds; `None` if nothing is left.
    #[must_use]
    pub fn crop(&self, source: &RgbaImage) -> Option<RgbaImage> {
        let (sw, sh) = source.dimensions();
        let x = self.rect.x.max(0.0).round() as u32;
        let y = self.rect.y.max(0.0).round() as u32;
        if x >= sw || y >= sh {
            return None;
        }
        let remaining = Size::new((sw - x) as f32, (sh - y) as f32);
        let size = crate::core::resolve_size(self.rect.w, self.rect.h, remaining);
        let w = (size.width.round().max(0.0) as u32).min(sw - x);
        let h = (size.height.round().max(0.0) as u32).min(sh - y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(image::imageops::crop_imm(source, x, y, w, h).to_image())
    }
}

/// Border line style of a style's backdrop rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    /// Outline text with the border color instead of stroking the backdrop.
    Halo,
}

impl LineStyle {
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "solid" => Some(Self::Solid),
            "dash" => Some(Self::Dash),
            "dot" => Some(Self::Dot),
            "dashdot" => Some(Self::DashDot),
            "halo" => Some(Self::Halo),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dash => "dash",
            Self::Dot => "dot",
            Self::DashDot => "dashdot",
            Self::Halo => "halo",
        }
    }
}

/// Paragraph alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Justification {
    /// Stretch inter-word gaps so lines fill the width.
    Full,
    Left,
    Right,
    #[default]
    Center,
}

impl Justification {
    /// Unknown values mean `Full`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "left" => Self::Left,
            "right" => Self::Right,
            "center" => Self::Center,
            _ => Self::Full,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

/// A typeface split into family and weight/slant flags.
///
/// Persisted as `family[:bold][:italic]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Typeface {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
}

impl Typeface {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(':');
        let family = parts.next().unwrap_or_default().trim().to_string();
        let mut face = Self {
            family,
            bold: false,
            italic: false,
        };
        for modifier in parts {
            match modifier.trim() {
                "bold" => face.bold = true,
                "italic" => face.italic = true,
                _ => {}
            }
        }
        face
    }
}

impl std::fmt::Display for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.family)?;
        if self.bold {
            f.write_str(":bold")?;
        }
        if self.italic {
            f.write_str(":italic")?;
        }
        Ok(())
    }
}

/// Named formatting bundle for text and backdrops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub typeface: Typeface,

    /// Type size in points (72 per inch of card width / 2.75).
    pub typesize: f32,

    pub fillcolor: Rgba,
    pub bordercolor: Rgba,
    pub textcolor: Rgba,
    pub borderthickness: f32,
    pub linestyle: LineStyle,
    pub justification: Justification,

    /// Outward padding of the backdrop rectangle.
    pub boundary_offset: f32,
}

impl Style {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typeface: Typeface::parse("Arial"),
            typesize: 10.0,
            fillcolor: Rgba::TRANSPARENT,
            bordercolor: Rgba::BLACK,
            textcolor: Rgba::BLACK,
            borderthickness: 0.0,
            linestyle: LineStyle::Solid,
            justification: Justification::Center,
            boundary_offset: 0.0,
        }
    }

    #[must_use]
    pub fn with_typeface(mut self, typeface: &str) -> Self {
        self.typeface = Typeface::parse(typeface);
        self
    }

    #[must_use]
    pub fn with_typesize(mut self, points: f32) -> Self {
        self.typesize = points;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, fill: Rgba, border: Rgba, text: Rgba) -> Self {
        self.fillcolor = fill;
        self.bordercolor = border;
        self.textcolor = text;
        self
    }

    #[must_use]
    pub fn with_border(mut self, thickness: f32, linestyle: LineStyle) -> Self {
        self.borderthickness = thickness;
        self.linestyle = linestyle;
        self
    }

    #[must_use]
    pub fn with_justification(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    #[must_use]
    pub fn with_boundary_offset(mut self, offset: f32) -> Self {
        self.boundary_offset = offset;
        self
    }

    /// Border color actually used on the backdrop rectangle.
    ///
    /// Transparent when the border has no thickness or the style draws a
    /// halo around its text instead.
    #[must_use]
    pub fn backdrop_border_color(&self) -> Rgba {
        if self.borderthickness <= 0.0 || self.linestyle == LineStyle::Halo {
            self.bordercolor.with_alpha(0)
        } else {
            self.bordercolor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_reference() {
        assert_eq!(
            FileSource::from_reference("builtin:icons.png"),
            FileSource::Builtin("icons.png".into())
        );
        assert_eq!(
            FileSource::from_reference("art/a.png"),
            FileSource::Path(PathBuf::from("art/a.png"))
        );
        assert_eq!(
            FileSource::Builtin("x.png".into()).reference().as_deref(),
            Some("builtin:x.png")
        );
        assert_eq!(FileSource::Embedded(vec![1]).reference(), None);
    }

    #[test]
    fn test_crop_natural_remaining() {
        let src = RgbaImage::new(100, 60);
        let img = ImageAsset::new("i", "f").with_rect(Rect::new(10.0, 20.0, -1.0, -1.0));
        let crop = img.crop(&src).unwrap();
        assert_eq!(crop.dimensions(), (90, 40));
    }

    #[test]
    fn test_crop_aspect() {
        let src = RgbaImage::new(100, 50);
        let img = ImageAsset::new("i", "f").with_rect(Rect::new(0.0, 0.0, 40.0, -2.0));
        assert_eq!(img.crop(&src).unwrap().dimensions(), (40, 20));
    }

    #[test]
    fn test_crop_clamped_and_empty() {
        let src = RgbaImage::new(10, 10);
        let img = ImageAsset::new("i", "f").with_rect(Rect::new(5.0, 5.0, 50.0, 50.0));
        assert_eq!(img.crop(&src).unwrap().dimensions(), (5, 5));

        let outside = ImageAsset::new("i", "f").with_rect(Rect::new(20.0, 0.0, -1.0, -1.0));
        assert!(outside.crop(&src).is_none());
    }

    #[test]
    fn test_typeface_parse() {
        let tf = Typeface::parse("Garamond:bold:italic");
        assert_eq!(tf.family, "Garamond");
        assert!(tf.bold && tf.italic);
        assert_eq!(tf.to_string(), "Garamond:bold:italic");

        let plain = Typeface::parse("Arial");
        assert!(!plain.bold && !plain.italic);
        assert_eq!(plain.to_string(), "Arial");
    }

    #[test]
    fn test_line_style_parse() {
        for ls in [
            LineStyle::Solid,
            LineStyle::Dash,
            LineStyle::Dot,
            LineStyle::DashDot,
            LineStyle::Halo,
        ] {
            assert_eq!(LineStyle::parse(ls.as_str()), Some(ls));
        }
        assert_eq!(LineStyle::parse("wavy"), None);
    }

    #[test]
    fn test_justification_unknown_is_full() {
        assert_eq!(Justification::parse("center"), Justification::Center);
        assert_eq!(Justification::parse("whatever"), Justification::Full);
    }

    #[test]
    fn test_halo_suppresses_backdrop_border() {
        let style = Style::new("halo")
            .with_colors(Rgba::WHITE, Rgba::new(255, 0, 0, 255), Rgba::BLACK)
            .with_border(4.0, LineStyle::Halo);
        assert_eq!(style.backdrop_border_color().alpha(), 0);

        let solid = style.clone().with_border(4.0, LineStyle::Solid);
        assert_eq!(solid.backdrop_border_color().alpha(), 255);

        let thin = style.with_border(0.0, LineStyle::Dash);
        assert_eq!(thin.backdrop_border_color().alpha(), 0);
    }
}
