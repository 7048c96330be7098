use anyhow::Context;
use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use digitcv::recognition::build_standard_preprocessor;
use digitcv::recognition::model::{DEFAULT_MODEL_PATH, MODEL_PATH_ENV, lazy_rten_classifier};
use digitcv::{CanvasBitmap, DigitPipeline, report};

#[derive(Parser)]
#[command(name = "digitcv")]
#[command(about = "Guess which digit (0-9) a freehand drawing shows")]
struct Cli {
    /// Path to the drawing (RGB or RGBA image, white strokes on black)
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Path to the pre-trained .rten model
    #[arg(long, env = MODEL_PATH_ENV, default_value = DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save intermediate preprocessing stages to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    // .env must be read before parsing so it can feed the env fallbacks
    let dotenv = dotenvy::dotenv();
    let args = Cli::parse();
    init_tracing(args.verbose);

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => anyhow::bail!("failed to load .env file: {}", e),
    }

    // Load the model up front; without it nothing can be classified
    let classifier = lazy_rten_classifier(args.model.clone());
    classifier.ensure_loaded()?;

    tracing::info!("Loading image: {}", args.image_path.display());
    let img = ImageReader::open(&args.image_path)
        .with_context(|| format!("Failed to open {}", args.image_path.display()))?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
    tracing::info!("Image loaded: {}x{}", img.width(), img.height());

    let bitmap = CanvasBitmap::from_image(&img)?;

    let mut pipeline = DigitPipeline::new(Arc::new(classifier));
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_preprocessor(build_standard_preprocessor().with_debug(debug_dir)?);
    }

    match pipeline.classify(&bitmap)? {
        None => println!("Nothing drawn - nothing to classify."),
        Some(prediction) if args.json => println!("{}", report::render_json(&prediction)?),
        Some(prediction) => print!("{}", report::render_text(&prediction)),
    }

    Ok(())
}
