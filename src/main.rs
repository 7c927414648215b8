use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use serde::Deserialize;

use mnist_canvas::client::{self, Predictor};
use mnist_canvas::tui::{self, App};
use mnist_canvas::PixelVector;

#[derive(Debug, Parser)]
#[command(name = "mnist-canvas", version, about = "Draw a digit, get an MNIST prediction")]
struct Cli {
    /// Predict route of the prediction server (overrides config and environment)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// Log file for the drawing canvas
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the drawing canvas (default)
    Draw,
    /// Check the prediction server's health route
    Health,
    /// Show the prediction server's usage metrics
    Metrics,
    /// Submit saved pixel vectors (JSON array or {"pixel_values": [...]})
    Predict {
        /// Send every file in one request to the batch route (at most 10)
        #[arg(long)]
        batch: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Accepted shapes for `predict <FILE>`
#[derive(Deserialize)]
#[serde(untagged)]
enum PixelFile {
    Wrapped { pixel_values: PixelVector },
    Bare(PixelVector),
}

fn load_pixels(path: &Path) -> anyhow::Result<PixelVector> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file: PixelFile = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a 784-value pixel vector", path.display()))?;
    Ok(match file {
        PixelFile::Wrapped { pixel_values } => pixel_values,
        PixelFile::Bare(pixels) => pixels,
    })
}

fn default_log_file() -> PathBuf {
    ProjectDirs::from("com", "mnist-canvas", "mnist-canvas")
        .map_or_else(std::env::temp_dir, |dirs| dirs.data_dir().to_path_buf())
        .join("mnist-canvas.log")
}

/// Logs go to stderr, except under the canvas where they would tear the screen
fn init_logging(cli: &Cli, to_file: bool) -> anyhow::Result<()> {
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);

    if to_file {
        let path = cli.log_file.clone().unwrap_or_else(default_log_file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Command::Draw);

    init_logging(&cli, matches!(command, Command::Draw))?;
    tracing::info!("Starting mnist-canvas version {}", env!("CARGO_PKG_VERSION"));

    // Configuration is read once, here
    let client = client::from_startup(cli.config.as_deref(), cli.endpoint.as_deref())?;

    match command {
        Command::Draw => {
            let endpoint = client.config().endpoint.clone();
            let app = App::new(Arc::new(client), endpoint);
            tui::run(app).map_err(|e| anyhow::anyhow!("{e:?}"))?;
            tracing::info!("Canvas closed");
        }
        Command::Health => {
            let health = client.health().await?;
            tracing::info!("Server status: {}", health.status);
            print_json(&health)?;
            if !health.is_healthy() {
                anyhow::bail!("prediction server is not healthy");
            }
        }
        Command::Metrics => {
            let metrics = client.metrics().await?;
            if let Some((digit, count)) = metrics.most_predicted() {
                tracing::info!("Most predicted digit: {} ({} times)", digit, count);
            }
            print_json(&metrics)?;
        }
        Command::Predict { batch: false, files } => {
            let [file] = files.as_slice() else {
                anyhow::bail!("predict takes one file; pass --batch to send several");
            };
            let pixels = load_pixels(file)?;
            let prediction = client.predict(&pixels).await?;
            print_json(&prediction)?;
        }
        Command::Predict { batch: true, files } => {
            let images = files
                .iter()
                .map(|file| load_pixels(file))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let response = client.predict_batch(&images).await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
