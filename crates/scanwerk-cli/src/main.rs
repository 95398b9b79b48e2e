// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — command-line front end.
//
// Reads photographed pages from disk, runs them through corner detection,
// rectification, and tone adjustment, and writes one PDF. This binary is the
// only part of the workspace that touches the filesystem.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use scanwerk_core::error::{Result, ScanError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::{CornerSet, Point, ScanConfig, SourceFormat, ToneSettings, check_import};
use scanwerk_document::{ImageProcessor, PageCollection, PageEditor, ScanPipeline};

#[derive(Parser)]
#[command(name = "scanwerk")]
#[command(version, about = "Scanwerk - turn photographed pages into a single PDF", long_about = None)]
struct Cli {
    /// JSON configuration file (missing keys use defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect, rectify, and tone each image, then write them as one PDF
    Scan {
        /// Input images (JPEG, PNG, or WebP), in page order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Output PDF path
        #[arg(short, long, default_value = "scan.pdf")]
        output: PathBuf,

        /// Brightness, -100 to 100
        #[arg(long, default_value_t = 0, allow_negative_numbers = true,
              value_parser = clap::value_parser!(i32).range(-100..=100))]
        brightness: i32,

        /// Contrast, -100 to 100
        #[arg(long, default_value_t = 0, allow_negative_numbers = true,
              value_parser = clap::value_parser!(i32).range(-100..=100))]
        contrast: i32,

        /// Hard black/white threshold
        #[arg(long)]
        monochrome: bool,

        /// Corners for every page as percentages: x1,y1,x2,y2,x3,y3,x4,y4
        /// (top-left, top-right, bottom-right, bottom-left). Skips detection.
        #[arg(long, value_delimiter = ',')]
        corners: Option<Vec<f64>>,
    },

    /// Print the detected corners of one image as JSON
    Detect {
        /// Input image
        image: PathBuf,
    },

    /// Print the effective configuration, or write it to a file
    Config {
        /// Write here instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// How a run ended when no error occurred.
enum Outcome {
    Done,
    Cancelled,
}

#[derive(Serialize)]
struct DetectReport {
    image: PathBuf,
    width: u32,
    height: u32,
    corners: CornerSet,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return report(&ScanError::Io(err)),
    };

    // One Ctrl-C listener covers the whole command, including encoding and
    // the final write.
    let outcome = runtime.block_on(until_cancelled(run(cli), tokio::signal::ctrl_c()));
    // An abandoned page may still be running on the blocking pool.
    runtime.shutdown_background();

    match outcome {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => {
            warn!("Interrupted; scan abandoned");
            ExitCode::from(130)
        }
        Err(err) => report(&err),
    }
}

fn report(err: &ScanError) -> ExitCode {
    let human = humanize_error(err);
    eprintln!("error: {}", human.message);
    eprintln!("  {}", human.suggestion);
    eprintln!("  ({})", err);
    ExitCode::FAILURE
}

/// Drive `work` to completion unless `cancel` resolves first. If the
/// cancel signal cannot be installed, `work` runs uninterrupted.
async fn until_cancelled<W, C>(work: W, cancel: C) -> Result<Outcome>
where
    W: Future<Output = Result<Outcome>>,
    C: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(work);
    tokio::select! {
        result = &mut work => result,
        signal = cancel => match signal {
            Ok(()) => Ok(Outcome::Cancelled),
            Err(err) => {
                warn!(error = %err, "Ctrl-C handler unavailable; running to completion");
                work.await
            }
        },
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };

    match cli.command {
        Command::Scan {
            images,
            output,
            brightness,
            contrast,
            monochrome,
            corners,
        } => {
            let corners = corners.map(|values| parse_corners(&values)).transpose()?;
            let tone = ToneSettings {
                brightness,
                contrast,
                monochrome,
            };
            scan(&images, &output, corners, tone, config).await
        }
        Command::Detect { image } => detect(&image, config).await,
        Command::Config { output } => {
            match output {
                Some(path) => {
                    config.save(&path)?;
                    info!(path = %path.display(), "Configuration written");
                }
                None => println!("{}", serde_json::to_string_pretty(&config)?),
            }
            Ok(Outcome::Done)
        }
    }
}

async fn scan(
    images: &[PathBuf],
    output: &Path,
    corners: Option<CornerSet>,
    tone: ToneSettings,
    config: ScanConfig,
) -> Result<Outcome> {
    let mut pages = PageCollection::new();

    // One page at a time, in the order given.
    for (index, path) in images.iter().enumerate() {
        let (bytes, format) = read_import(path, &config).await?;
        let page_config = config.clone();
        let task = move || {
            let mut editor = PageEditor::from_bytes(&bytes, format, page_config)?;
            if let Some(corners) = corners {
                editor.set_corners(corners);
            }
            editor.set_tone(tone);
            editor.finish()
        };
        let page = run_blocking(task).await?;
        info!(
            page = index + 1,
            path = %path.display(),
            width = page.width(),
            height = page.height(),
            "Page prepared"
        );
        pages.add(page);
    }

    let document = match pages.encode() {
        Ok(document) => document,
        Err(err) => {
            save_pages(&pages, output).await;
            return Err(err);
        }
    };
    tokio::fs::write(output, document.as_bytes()).await?;
    info!(path = %output.display(), pages = pages.len(), bytes = document.len(), "PDF written");
    Ok(Outcome::Done)
}

async fn detect(path: &Path, config: ScanConfig) -> Result<Outcome> {
    let (bytes, format) = read_import(path, &config).await?;
    let task = move || {
        let raster = ImageProcessor::from_bytes(&bytes, format)?.into_raster();
        let corners = ScanPipeline::new(config).detect_corners(&raster);
        Ok((raster.width(), raster.height(), corners))
    };
    let (width, height, corners) = run_blocking(task).await?;

    let report = DetectReport {
        image: path.to_path_buf(),
        width,
        height,
        corners,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(Outcome::Done)
}

/// Check format and size before reading the whole file.
async fn read_import(path: &Path, config: &ScanConfig) -> Result<(Vec<u8>, SourceFormat)> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let format = SourceFormat::from_extension(extension)?;
    let len = tokio::fs::metadata(path).await?.len();
    check_import(format.mime_type(), len, config)?;
    let bytes = tokio::fs::read(path).await?;
    Ok((bytes, format))
}

/// Run CPU-bound work off the async runtime.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| ScanError::Io(std::io::Error::other(err)))?
}

/// Keep the finished pages as JPEG files next to `output` so a failed
/// document write loses nothing.
async fn save_pages(pages: &PageCollection, output: &Path) {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("scan");
    let dir = output.parent().unwrap_or_else(|| Path::new("."));
    for (index, page) in pages.iter().enumerate() {
        let path = dir.join(format!("{stem}-page-{}.jpg", index + 1));
        match tokio::fs::write(&path, page.jpeg_bytes()).await {
            Ok(()) => info!(path = %path.display(), "Page kept"),
            Err(err) => warn!(path = %path.display(), error = %err, "Could not keep page"),
        }
    }
}

/// Eight comma-separated percentages into a corner set.
fn parse_corners(values: &[f64]) -> Result<CornerSet> {
    let &[x1, y1, x2, y2, x3, y3, x4, y4] = values else {
        return Err(ScanError::InvalidInput(format!(
            "--corners needs 8 values, got {}",
            values.len()
        )));
    };
    Ok(CornerSet::new([
        Point::new(x1, y1),
        Point::new(x2, y2),
        Point::new(x3, y3),
        Point::new(x4, y4),
    ]))
}
