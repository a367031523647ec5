use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canvas::render::BoxRasterizer;
use printdesk::DesignEngine;
use printdesk::catalog::{Catalog, CatalogError};
use printdesk::config::EngineConfig;
use printdesk::design::DesignState;
use printdesk::export::fonts::{FontBook, FontError};
use printdesk::export::store::DirectoryArtifactStore;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid design JSON: {0}")]
    Design(serde_json::Error),
    #[error("cannot encode output: {0}")]
    Output(serde_json::Error),
    #[error("cannot load fonts: {0}")]
    Fonts(#[from] FontError),
    #[error("cannot start runtime: {0}")]
    Runtime(std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "printdesk", about = "Quote and export apparel designs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore a design onto every catalog side and print its price quote.
    Quote(QuoteArgs),
    /// Write one SVG per text object and print the side to file map.
    ExportText(ExportTextArgs),
}

#[derive(Args, Debug)]
struct Inputs {
    #[arg(long, env = "PRINTDESK_CATALOG", help = "Catalog JSON file")]
    catalog: PathBuf,

    #[arg(long, env = "PRINTDESK_DESIGN", help = "Saved design JSON file")]
    design: PathBuf,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    #[command(flatten)]
    inputs: Inputs,

    #[arg(long, default_value_t = 1)]
    quantity: u32,

    #[arg(long, env = "PRINTDESK_ASSETS", help = "Directory of image files named by their src")]
    assets: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportTextArgs {
    #[command(flatten)]
    inputs: Inputs,

    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long, env = "PRINTDESK_FONTS", help = "Directory of .ttf/.otf files")]
    fonts: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let output = match cli.command {
        Command::Quote(args) => runtime.block_on(quote(args))?,
        Command::ExportText(args) => runtime.block_on(export_text(args))?,
    };
    println!("{output}");
    Ok(())
}

async fn quote(args: QuoteArgs) -> Result<String, CliError> {
    let (catalog, state) = load_inputs(&args.inputs)?;
    let mut engine = DesignEngine::new(catalog, EngineConfig::from_env());
    if let Some(dir) = &args.assets {
        engine = engine.with_rasterizer(load_assets(dir)?);
    }

    engine.mount_all();
    let report = engine.restore(&state).await;
    if !report.is_complete() {
        tracing::warn!(
            abandoned = ?report.abandoned,
            skipped = report.skipped(),
            "design restored partially"
        );
    }

    let quote = engine.price_sides(args.quantity);
    serde_json::to_string_pretty(&quote).map_err(CliError::Output)
}

async fn export_text(args: ExportTextArgs) -> Result<String, CliError> {
    let (catalog, state) = load_inputs(&args.inputs)?;
    let fonts = match &args.fonts {
        Some(dir) => FontBook::load_dir(dir)?,
        None => FontBook::new(),
    };
    let engine = DesignEngine::new(catalog, EngineConfig::from_env()).with_fonts(fonts);

    let store = DirectoryArtifactStore::new(&args.out_dir);
    let report = engine.export_and_upload(&state, None, &store).await;
    serde_json::to_string_pretty(&report).map_err(CliError::Output)
}

fn load_inputs(inputs: &Inputs) -> Result<(Catalog, DesignState), CliError> {
    let catalog = Catalog::from_json(&read(&inputs.catalog)?)?;
    let state = DesignState::from_json(&read(&inputs.design)?).map_err(CliError::Design)?;
    Ok((catalog, state))
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

/// Decode every image in `dir` into a rasterizer, keyed by file name.
fn load_assets(dir: &Path) -> Result<BoxRasterizer, CliError> {
    let entries = std::fs::read_dir(dir).map_err(|source| CliError::Read { path: dir.to_path_buf(), source })?;
    let mut rasterizer = BoxRasterizer::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        match image::open(&path) {
            Ok(img) => rasterizer.insert_bitmap(name, img.to_rgba8()),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping asset"),
        }
    }
    Ok(rasterizer)
}
