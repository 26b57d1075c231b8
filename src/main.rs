// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use fotopi::backends::camera::{RpicamBackend, capture_channel};
use fotopi::config::{self, Config};
use fotopi::constants::VERSION;
use fotopi::constants::logging::{CLI_LEVEL, KIOSK_LEVEL};
use fotopi::App;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

mod cli;

#[derive(Parser)]
#[command(name = "fotopi")]
#[command(about = "Kiosk camera front-end for the Raspberry Pi camera module")]
#[command(version = VERSION)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Photo {
        /// Folder to save into (default: the configured image folder)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format: jpg, png or dng (default: the configured format)
        #[arg(short, long, value_parser = cli::parse_format)]
        format: Option<fotopi::backends::camera::CaptureFormat>,

        /// Manual exposure at this ISO
        #[arg(short, long)]
        iso: Option<u32>,

        /// Shutter speed: a preset such as 1/125, or decimal seconds
        #[arg(short, long)]
        shutter: Option<String>,
    },

    /// List one page of the gallery
    Gallery {
        /// Page to show, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Folder to list (default: the configured image folder)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Print the name the next capture would get
    NextName {
        /// Folder to look in (default: the configured image folder)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output format (default: the configured format)
        #[arg(short, long, value_parser = cli::parse_format)]
        format: Option<fotopi::backends::camera::CaptureFormat>,
    },

    /// Show or change preferences
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the preferences and where they are stored
    Show,
    /// Change the image folder
    SetFolder { folder: PathBuf },
    /// Change the capture format (jpg, png or dng)
    SetFormat {
        #[arg(value_parser = cli::parse_format)]
        format: fotopi::backends::camera::CaptureFormat,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        init_file_logging();
        return run_kiosk();
    };

    init_stderr_logging();
    match command {
        Commands::Photo {
            output_dir,
            format,
            iso,
            shutter,
        } => cli::take_photo(output_dir, format, iso, shutter),
        Commands::Gallery { page, dir } => cli::print_gallery(page, dir),
        Commands::NextName { dir, format } => cli::print_next_name(dir, format),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::show_config(),
            ConfigAction::SetFolder { folder } => cli::set_folder(folder),
            ConfigAction::SetFormat { format } => cli::set_format(format),
        },
    }
}

fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=fotopi=debug, RUST_LOG=info
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

/// Command-line use logs to stderr
fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(CLI_LEVEL))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();
}

/// The kiosk owns the terminal, so it logs to a file per session
fn init_file_logging() {
    let dir = config::data_dir().join("logs");
    let name = chrono::Local::now()
        .format("FotoPi_%H-%M_%d-%m-%Y.log")
        .to_string();
    let path = dir.join(name);

    let file = std::fs::create_dir_all(&dir).and_then(|()| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    });

    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter(KIOSK_LEVEL))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_level(true)
            .init(),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter(KIOSK_LEVEL))
                .with_writer(std::io::sink)
                .init();
        }
    }
}

fn run_kiosk() -> Result<(), Box<dyn std::error::Error>> {
    info!(version = VERSION, "Starting FotoPi");

    let config_path = config::config_path().ok();
    let config = match &config_path {
        Some(path) => Config::load_from(path),
        None => Config::default(),
    };

    // Capture processes run here; it must outlive the app
    let runtime = tokio::runtime::Runtime::new()?;
    let camera = RpicamBackend::new(runtime.handle().clone());
    let (capture_tx, capture_rx) = capture_channel();

    let mut app = App::new(config, camera, capture_tx);
    if let Some(path) = config_path {
        app = app.with_config_path(path);
    }

    fotopi::terminal::run(app, capture_rx)
}
