use anyhow::{Context, Result, bail};
use card_sheet::constants::{DEFAULT_COLUMNS, DEFAULT_ROWS};
use card_sheet::deck::{ImageDirectory, card_count, load_decklist, resolve_deck};
use card_sheet::{
    CardImagePair, GridPolicy, ImageFailure, ImageRef, PageEvent, SheetObserver, SheetOptions,
    SheetSide,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cardsheet", about = "Print-ready card sheet PDFs", version)]
struct Cli {
    /// Log every page and image
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a decklist using images from a local directory
    Deck {
        /// Decklist file ("4 Lightning Bolt" per line)
        #[arg(short, long)]
        deck: PathBuf,

        /// Directory holding <Card_Name>.jpg / .png images
        #[arg(short, long)]
        images: PathBuf,

        /// Default card back image
        #[arg(short, long)]
        back: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Lay out the cards listed in a CSV manifest
    Manifest {
        /// Input CSV file (columns: front, back, quantity)
        #[arg(short, long)]
        input: PathBuf,

        /// Back image for rows without one
        #[arg(short, long)]
        back: Option<PathBuf>,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show page statistics for a card count without generating a PDF
    Stats {
        /// Number of cards
        #[arg(short, long)]
        cards: usize,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Layout flags shared by every command. Flags override `--config`.
#[derive(Args)]
struct LayoutArgs {
    /// Options JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output paper size
    #[arg(long, value_enum)]
    paper: Option<PaperArg>,

    /// Output orientation
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,

    /// Cards per row
    #[arg(long)]
    columns: Option<usize>,

    /// Rows per page
    #[arg(long)]
    rows: Option<usize>,

    /// Fit as many cards as the page holds instead of a fixed grid
    #[arg(long, conflicts_with_all = ["columns", "rows"])]
    fit_grid: bool,

    /// Smallest margin kept by --fit-grid, in mm
    #[arg(long, default_value = "5.0")]
    min_margin: f32,

    /// Card width in mm
    #[arg(long)]
    card_width: Option<f32>,

    /// Card height in mm
    #[arg(long)]
    card_height: Option<f32>,

    /// Enlarge cards by this many percent (e.g. 2 for +2% bleed)
    #[arg(long)]
    bleed: Option<f32>,

    /// How images fill their cells
    #[arg(long, value_enum)]
    fit: Option<FitArg>,

    /// Leave out crop marks
    #[arg(long)]
    no_crop_marks: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum FitArg {
    Contain,
    Cover,
}

impl From<PaperArg> for card_sheet::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

impl From<OrientationArg> for card_sheet::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<FitArg> for card_sheet::ImageFit {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Contain => Self::Contain,
            FitArg::Cover => Self::Cover,
        }
    }
}

impl LayoutArgs {
    async fn options(&self) -> Result<SheetOptions> {
        let mut options = match &self.config {
            Some(path) => SheetOptions::load(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?,
            None => SheetOptions::default(),
        };

        if let Some(paper) = self.paper {
            options.paper_size = paper.into();
        }
        if let Some(orientation) = self.orientation {
            options.orientation = orientation.into();
        }
        if let Some(width) = self.card_width {
            options.card_width_mm = width;
        }
        if let Some(height) = self.card_height {
            options.card_height_mm = height;
        }
        if let Some(bleed) = self.bleed {
            options.scale = 1.0 + bleed / 100.0;
        }
        if let Some(fit) = self.fit {
            options.image_fit = fit.into();
        }
        if self.no_crop_marks {
            options.crop_marks.enabled = false;
        }

        if self.fit_grid {
            options.grid = GridPolicy::FitToPage {
                min_margin_mm: self.min_margin,
            };
        } else if self.columns.is_some() || self.rows.is_some() {
            let (columns, rows) = match options.grid {
                GridPolicy::Fixed { columns, rows } => (columns, rows),
                GridPolicy::FitToPage { .. } => (DEFAULT_COLUMNS, DEFAULT_ROWS),
            };
            options.grid = GridPolicy::Fixed {
                columns: self.columns.unwrap_or(columns),
                rows: self.rows.unwrap_or(rows),
            };
        }

        options.validate()?;
        Ok(options)
    }
}

/// Logs each written page and every placeholder
struct ProgressLog {
    sheets: usize,
}

impl SheetObserver for ProgressLog {
    fn page_sealed(&mut self, event: &PageEvent) {
        let side = match event.side {
            SheetSide::Front => "front",
            SheetSide::Back => "back",
        };
        log::info!(
            "Sheet {}/{} {}: {} cards",
            event.group_index + 1,
            self.sheets,
            side,
            event.cards
        );
    }

    fn image_failed(&mut self, failure: &ImageFailure) {
        log::error!("Missing image {}: {}", failure.image, failure.message);
    }
}

async fn write_sheet(cards: &[CardImagePair], options: &SheetOptions, output: &Path) -> Result<()> {
    let stats = card_sheet::calculate_statistics(cards.len(), options)?;
    let observer = ProgressLog {
        sheets: stats.groups,
    };

    let pages = card_sheet::generate_pdf_with_observer(cards, options, output, observer).await?;
    println!(
        "Generated {} cards on {} pages → {}",
        cards.len(),
        pages,
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Deck {
            deck,
            images,
            back,
            output,
            layout,
        } => {
            let options = layout.options().await?;
            let entries = load_decklist(&deck)
                .await
                .with_context(|| format!("reading {}", deck.display()))?;
            log::info!(
                "Decklist has {} entries, {} cards",
                entries.len(),
                card_count(&entries)
            );

            let directory = ImageDirectory::new(images, ImageRef::Path(back));
            let resolution = resolve_deck(&entries, &directory).await?;
            for entry in &resolution.missing {
                println!("  No image for {}x {}", entry.quantity, entry.name);
            }
            if resolution.pairs.is_empty() && !entries.is_empty() {
                bail!("none of the {} decklist entries has an image", entries.len());
            }

            write_sheet(&resolution.pairs, &options, &output).await?;
        }

        Commands::Manifest {
            input,
            back,
            output,
            layout,
        } => {
            let options = layout.options().await?;
            let cards = card_sheet::load_manifest(&input, back.map(ImageRef::Path))
                .await
                .with_context(|| format!("reading {}", input.display()))?;

            write_sheet(&cards, &options, &output).await?;
        }

        Commands::Stats { cards, layout } => {
            let options = layout.options().await?;
            let geometry = card_sheet::compute_geometry(&options)?;
            let stats = card_sheet::calculate_statistics(cards, &options)?;

            println!("Card Sheet Statistics:");
            println!("  Grid: {} x {}", geometry.columns, geometry.rows);
            println!(
                "  Margin: {:.2} mm, row gap: {:.2} mm",
                card_sheet::constants::pt_to_mm(geometry.margin),
                card_sheet::constants::pt_to_mm(geometry.gap)
            );
            println!("  Cards: {}", stats.cards);
            println!("  Sheets: {}", stats.groups);
            println!("  Output pages: {}", stats.output_pages);
            println!("  Cards on last sheet: {}", stats.last_group_size);
            println!("  Empty slots: {}", stats.empty_slots);
        }
    }

    Ok(())
}
