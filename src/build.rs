//! Batch generation: load a deck, render every card, post-process.
//!
//! `run` is the whole `build_deck` pipeline behind the command line:
//!
//! 1. resolve the source (local files only)
//! 2. load and number the deck
//! 3. prepare `<output_dir>/generated_cards`
//! 4. render faces with the selected print profile
//! 5. optionally pack tabletop tile sheets and lay out a printable PDF

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{LoadOptions, PrintProfile, RenderConfig};
use crate::error::{CardforgeError, Result};
use crate::export::{build_pdf_sheets, build_tile_sheets};
use crate::persist::load_deck;
use crate::raster::{RenderReport, Renderer};

/// Name of the directory rendered faces go into.
pub const GENERATED_DIR: &str = "generated_cards";

/// Options of one batch build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Deck file to build.
    pub source: PathBuf,

    /// Directory `generated_cards` is created in (the deck's directory if
    /// `None`).
    pub output_dir: Option<PathBuf>,

    /// Bleed pad width in pixels. With `commercial` set, 0 means the
    /// commercial default pad.
    pub pad_width: u32,

    /// Rescale to the commercial print size and pad for it.
    pub commercial: bool,

    /// Render only the card with this output index.
    pub card: Option<usize>,

    /// Pack tabletop tile sheets after rendering.
    pub tabletop: bool,

    /// Lay the rendered faces out as a printable PDF after rendering.
    pub pdf: bool,

    pub font_dirs: Vec<PathBuf>,
    pub builtin_dir: Option<PathBuf>,
}

impl BuildOptions {
    #[must_use]
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_pad_width(mut self, pad: u32) -> Self {
        self.pad_width = pad;
        self
    }

    #[must_use]
    pub fn with_commercial(mut self, commercial: bool) -> Self {
        self.commercial = commercial;
        self
    }

    #[must_use]
    pub fn with_card(mut self, index: usize) -> Self {
        self.card = Some(index);
        self
    }

    #[must_use]
    pub fn with_tabletop(mut self, tabletop: bool) -> Self {
        self.tabletop = tabletop;
        self
    }

    #[must_use]
    pub fn with_pdf(mut self, pdf: bool) -> Self {
        self.pdf = pdf;
        self
    }

    #[must_use]
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    #[must_use]
    pub fn with_builtin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.builtin_dir = Some(dir.into());
        self
    }

    /// Print profile these options select.
    #[must_use]
    pub fn profile(&self) -> PrintProfile {
        match (self.commercial, self.pad_width) {
            (true, 0) => PrintProfile::commercial(),
            (true, pad) => PrintProfile::commercial().with_pad(pad),
            (false, pad) => PrintProfile::screen().with_pad(pad),
        }
    }

    /// Renderer configuration these options select.
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default().with_profile(self.profile());
        config.font_dirs.clone_from(&self.font_dirs);
        config.target_card = self.card;
        config
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            base_dir: None,
            builtin_dir: self.builtin_dir.clone(),
        }
    }
}

/// What a build produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub deck_name: String,
    /// The `generated_cards` directory.
    pub output_dir: PathBuf,
    pub render: RenderReport,
    pub tile_sheets: Vec<PathBuf>,
    pub pdf: Option<PathBuf>,
}

/// Whether `source` names a remote repository rather than a local file.
#[must_use]
pub fn is_remote_source(source: &Path) -> bool {
    let text = source.to_string_lossy();
    text.starts_with("http") && text.ends_with(".git")
}

/// Create (and, for full builds, empty) the generated-cards directory.
fn prepare_output_dir(dir: &Path, clear: bool) -> Result<()> {
    let output_error = |source| CardforgeError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    if clear {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => tracing::debug!(path = %dir.display(), "cleared output directory"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(output_error(err)),
        }
    }
    std::fs::create_dir_all(dir).map_err(output_error)
}

/// Run a batch build.
pub fn run(options: &BuildOptions) -> Result<BuildReport> {
    if is_remote_source(&options.source) {
        return Err(CardforgeError::RemoteSource(
            options.source.to_string_lossy().into_owned(),
        ));
    }

    tracing::info!(source = %options.source.display(), "reading deck");
    let mut deck = load_deck(&options.source, &options.load_options())?;
    deck.renumber_entities();
    deck.recompute_render_orders();

    let base = match &options.output_dir {
        Some(dir) => dir.clone(),
        None => options
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let output_dir = base.join(GENERATED_DIR);
    prepare_output_dir(&output_dir, options.card.is_none())?;

    if let Some(card) = options.card {
        tracing::info!(card, "rendering single card");
    }
    let config = options.render_config();
    let face_size = config.profile.output_size(deck.card_size());
    let renderer = Renderer::new(config);
    let render = renderer.render_deck(&deck, &output_dir)?;

    let tile_sheets = if options.tabletop {
        tracing::info!("generating tabletop tile sheets");
        build_tile_sheets(&output_dir, face_size)?
    } else {
        Vec::new()
    };
    let pdf = if options.pdf {
        tracing::info!("generating pdf sheets");
        build_pdf_sheets(&output_dir, face_size)?
    } else {
        None
    };

    Ok(BuildReport {
        deck_name: deck.name,
        output_dir,
        render,
        tile_sheets,
        pdf,
    })
}
