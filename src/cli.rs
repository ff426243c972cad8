use crate::config::{Config, MaskConfig, PlacementMode, load_config};
use crate::fonts::FontData;
use crate::layout::{SizeFunction, WordCloud};
use crate::mask::load_mask;
use crate::raster::RasterCanvas;
use crate::words::load_words;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "wcr", version, about = "Word cloud renderer: weighted words packed around the canvas center")]
pub struct Args {
    /// Word list: JSON object of word -> count, or plain text to count
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output PNG file
    #[arg(short = 'o', long = "output", default_value = "output.png")]
    pub output: PathBuf,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<u32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<u32>,

    /// Font file; defaults to the system sans-serif font
    #[arg(short = 'f', long = "font")]
    pub font: Option<PathBuf>,

    /// Mask image (PNG); pixels matching the mask color are kept free
    #[arg(short = 'm', long = "mask")]
    pub mask: Option<PathBuf>,

    /// Weight to size mapping: linear, sqrt or sqrtinverse
    #[arg(short = 's', long = "size-function")]
    pub size_function: Option<String>,

    /// Place words at random instead of on rings around the center
    #[arg(long = "random")]
    pub random: bool,

    /// Seed for color choice and random placement
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Stroke every occupied rectangle
    #[arg(long = "debug")]
    pub debug: bool,

    /// Log every placement
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = resolve_config(&args)?;
    info!(
        "canvas {}x{}, font sizes {}..{}, {} placement, {} sizing",
        config.canvas.width,
        config.canvas.height,
        config.font.min_size,
        config.font.max_size,
        match config.placement.mode {
            PlacementMode::Ring => "ring",
            PlacementMode::Random => "random",
        },
        config.placement.size_function
    );

    let words = load_words(&args.input)?;
    let font = match &config.font.file {
        Some(path) => FontData::from_file(path)
            .with_context(|| format!("loading font {}", path.display()))?,
        None => FontData::from_system(&config.font.family)?,
    };
    let mask = match &config.mask {
        Some(mask) => load_mask(&mask.file, config.canvas.width, config.canvas.height, mask.color)?,
        None => Vec::new(),
    };

    let started = Instant::now();
    let canvas = RasterCanvas::new(
        config.canvas.width,
        config.canvas.height,
        config.theme.background,
        font,
    )?;
    let cloud = WordCloud::new(words, &config, canvas, &mask)?;
    let rendered = cloud.draw()?;
    rendered.canvas.save_png(&args.output)?;
    info!(
        "wrote {} ({} placed, {} skipped) in {:.2?}",
        args.output.display(),
        rendered.report.placed.len(),
        rendered.report.skipped.len(),
        started.elapsed()
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(font) = &args.font {
        config.font.file = Some(font.clone());
    }
    if let Some(mask) = &args.mask {
        let color = config
            .mask
            .as_ref()
            .map(|m| m.color)
            .unwrap_or(crate::theme::Rgba::TRANSPARENT);
        config.mask = Some(MaskConfig {
            file: mask.clone(),
            color,
        });
    }
    if let Some(name) = &args.size_function {
        config.placement.size_function = name.parse::<SizeFunction>()?;
    }
    if args.random {
        config.placement.mode = PlacementMode::Random;
    }
    if args.seed.is_some() {
        config.placement.seed = args.seed;
    }
    if args.debug {
        config.placement.debug = true;
    }
    Ok(config)
}
