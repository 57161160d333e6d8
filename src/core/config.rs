//! Render and load configuration.
//!
//! Callers configure the pipeline with:
//! - `PrintProfile`: output size and bleed pad for a print target
//! - `RenderConfig`: fonts, base fill, single-card filter
//! - `LoadOptions`: where path and `builtin:` file references resolve
//!
//! All follow the same builder pattern: start from `Default` (or a preset)
//! and chain `with_*` calls.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::color::Rgba;

/// Card canvas size used when a deck does not declare `<decksize>`.
pub const DEFAULT_CARD_SIZE: (u32, u32) = (945, 1535);

/// Physical output size demanded by the commercial print profile.
pub const COMMERCIAL_CARD_SIZE: (u32, u32) = (825, 1425);

/// Bleed pad demanded by the commercial print profile.
pub const COMMERCIAL_PAD: u32 = 36;

/// Card width in inches; fixes the point-to-pixel ratio for type sizes.
pub const CARD_WIDTH_INCHES: f32 = 2.75;

/// Convert a style's point size to pixels on a canvas `card_width` wide.
#[must_use]
pub fn points_to_pixels(points: f32, card_width: u32) -> f32 {
    let dpi = card_width as f32 / CARD_WIDTH_INCHES;
    points * (dpi / 72.0)
}

/// Output geometry for a print target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintProfile {
    /// Rescale every face to this size (ignoring aspect) before padding.
    /// `None` keeps the deck's canvas size.
    pub target_size: Option<(u32, u32)>,

    /// Bleed pad width in pixels added on every side (0 = none).
    pub pad: u32,
}

impl PrintProfile {
    /// Canvas size as-is, no bleed.
    #[must_use]
    pub fn screen() -> Self {
        Self::default()
    }

    /// Fixed 825x1425 output with a 36 pixel bleed pad.
    #[must_use]
    pub fn commercial() -> Self {
        Self {
            target_size: Some(COMMERCIAL_CARD_SIZE),
            pad: COMMERCIAL_PAD,
        }
    }

    /// Set the bleed pad width.
    #[must_use]
    pub fn with_pad(mut self, pad: u32) -> Self {
        self.pad = pad;
        self
    }

    /// Force a physical output size.
    #[must_use]
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some((width, height));
        self
    }

    /// Size of an output file for a canvas of `card_size`.
    #[must_use]
    pub fn output_size(&self, card_size: (u32, u32)) -> (u32, u32) {
        let (w, h) = self.target_size.unwrap_or(card_size);
        (w + 2 * self.pad, h + 2 * self.pad)
    }
}

/// Renderer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output geometry.
    pub profile: PrintProfile,

    /// Directories scanned for `.ttf`/`.otf` files.
    pub font_dirs: Vec<PathBuf>,

    /// Only write the card with this output index (all cards if `None`).
    pub target_card: Option<usize>,

    /// Full-canvas fill painted under everything else.
    pub base_fill: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            profile: PrintProfile::screen(),
            font_dirs: Vec::new(),
            target_card: None,
            base_fill: Rgba::new(0xE0, 0xE0, 0xFF, 0xFF),
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_profile(mut self, profile: PrintProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    #[must_use]
    pub fn with_target_card(mut self, index: usize) -> Self {
        self.target_card = Some(index);
        self
    }

    #[must_use]
    pub fn with_base_fill(mut self, fill: Rgba) -> Self {
        self.base_fill = fill;
        self
    }
}

/// Where file assets referenced by path resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Relative paths resolve against this directory (usually the deck's).
    pub base_dir: Option<PathBuf>,

    /// `builtin:` references resolve against this directory.
    pub builtin_dir: Option<PathBuf>,
}

impl LoadOptions {
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_builtin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builtin_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_to_pixels() {
        // 825 px / 2.75 in = 300 dpi, so 72 pt = 300 px
        assert!((points_to_pixels(72.0, 825) - 300.0).abs() < 1e-3);
        assert!((points_to_pixels(12.0, 825) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_profiles() {
        let screen = PrintProfile::screen();
        assert_eq!(screen.target_size, None);
        assert_eq!(screen.pad, 0);
        assert_eq!(screen.output_size((945, 1535)), (945, 1535));

        let mpc = PrintProfile::commercial();
        assert_eq!(mpc.output_size((945, 1535)), (825 + 72, 1425 + 72));
    }

    #[test]
    fn test_profile_builder() {
        let p = PrintProfile::screen().with_pad(10).with_target_size(100, 200);
        assert_eq!(p.output_size((1, 1)), (120, 220));
    }

    #[test]
    fn test_render_config_builder() {
        let config = RenderConfig::default()
            .with_font_dir("/fonts")
            .with_target_card(3)
            .with_profile(PrintProfile::commercial());

        assert_eq!(config.font_dirs, vec![PathBuf::from("/fonts")]);
        assert_eq!(config.target_card, Some(3));
        assert_eq!(config.profile.pad, COMMERCIAL_PAD);
        assert_eq!(config.base_fill, Rgba::new(0xE0, 0xE0, 0xFF, 0xFF));
    }

    #[test]
    fn test_serialization() {
        let config = RenderConfig::default().with_target_card(2);
        let json = serde_json::to_string(&config).unwrap();
        let back: RenderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.target_card, Some(2));
        assert_eq!(back.profile, config.profile);
    }
}
