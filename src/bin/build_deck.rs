//! `build_deck`: render every card of a deck file to PNG.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rust_cardforge::build::{self, BuildOptions};
use rust_cardforge::persist::{build_empty_deck, save_deck};

#[derive(Parser, Debug)]
#[command(name = "build_deck")]
#[command(about = "Render the cards of a deck file to print-ready PNG images")]
struct Args {
    /// Deck file to render (or to create with --default-deck)
    cardfile: PathBuf,

    /// Directory the 'generated_cards' directory is created in.
    /// Defaults to the directory containing the deck file.
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Extra border padding for printing, in pixels
    #[arg(long, default_value_t = 0)]
    pad_width: u32,

    /// Render a single card by output index
    #[arg(long, value_name = "CARD_NUMBER")]
    card: Option<usize>,

    /// Commercial print profile: 825x1425 with a 36 pixel pad
    #[arg(long)]
    mpc: bool,

    /// Generate tabletop simulator tile sheets from the rendered cards
    #[arg(long)]
    tabletop: bool,

    /// Lay the rendered cards out on printable Letter pages (deck.pdf)
    #[arg(long)]
    pdf: bool,

    /// Create a new deck from the images in these directories and save it
    /// as CARDFILE instead of rendering
    #[arg(long, value_name = "DIR", num_args = 0..)]
    default_deck: Option<Vec<PathBuf>>,

    /// Directory to load .ttf/.otf fonts from (repeatable)
    #[arg(long, value_name = "DIR")]
    font_dir: Vec<PathBuf>,

    /// Directory `builtin:` file references resolve against
    #[arg(long, value_name = "DIR")]
    builtin_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    logfile: Option<PathBuf>,
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    match &args.logfile {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
            registry
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)).init(),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if let Some(dirs) = &args.default_deck {
        tracing::info!(deck = %args.cardfile.display(), "building starter deck");
        let deck = build_empty_deck(dirs)?;
        save_deck(&deck, &args.cardfile)?;
        return Ok(());
    }

    let mut options = BuildOptions::new(&args.cardfile)
        .with_pad_width(args.pad_width)
        .with_commercial(args.mpc)
        .with_tabletop(args.tabletop)
        .with_pdf(args.pdf);
    if let Some(dir) = &args.outdir {
        options = options.with_output_dir(dir);
    }
    if let Some(card) = args.card {
        options = options.with_card(card);
    }
    for dir in &args.font_dir {
        options = options.with_font_dir(dir);
    }
    if let Some(dir) = &args.builtin_dir {
        options = options.with_builtin_dir(dir);
    }

    let report = build::run(&options).with_context(|| format!("building {}", args.cardfile.display()))?;
    tracing::info!(
        deck = %report.deck_name,
        cards = report.render.cards_rendered(),
        output = %report.output_dir.display(),
        "done"
    );
    Ok(())
}
