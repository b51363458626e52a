//! polycrop — pick a polygonal region on one rendered PDF page, then
//! crop that region out of every page at full resolution.
//!
//! Two strictly ordered phases: an interactive selection window on one
//! page, then a batch crop across all pages. Both run at the same DPI so
//! the clicked coordinates land on the same pixels.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use polycrop_core::error::CropError;
use polycrop_core::options::CropOptions;

#[derive(Parser)]
#[command(
    name = "polycrop",
    version,
    about = "Crop a polygonal region from every page of a PDF"
)]
struct Cli {
    /// Input PDF (a file picker opens when omitted)
    input: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Render DPI for both the preview and the extraction (default: 200)
    #[arg(long)]
    dpi: Option<u16>,

    /// Directory the per-page crops are written into
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Preview fit target as WxH (default: 1600x900)
    #[arg(long)]
    viewport: Option<String>,

    /// Use this 1-based page for the selection preview instead of a random one
    #[arg(long)]
    page: Option<u32>,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

/// Load config from global and project-local TOML files.
/// Later files override earlier ones. Missing files are silently ignored.
fn load_config() -> CropOptions {
    let mut opts = CropOptions::default();

    // 1. Global config: ~/.config/polycrop/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("polycrop").join("config.toml");
        if let Ok(contents) = std::fs::read_to_string(&global_path) {
            match toml::from_str::<CropOptions>(&contents) {
                Ok(parsed) => opts = parsed,
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", global_path.display(), e);
                }
            }
        }
    }

    // 2. Project-local config: ./.polycrop.toml
    let local_path = PathBuf::from(".polycrop.toml");
    if let Ok(contents) = std::fs::read_to_string(&local_path) {
        match toml::from_str::<CropOptions>(&contents) {
            Ok(parsed) => {
                merge_config(&mut opts, &parsed);
            }
            Err(e) => {
                log::warn!("Failed to parse {}: {}", local_path.display(), e);
            }
        }
    }

    opts
}

/// Merge `from` into `base`. Since serde(default) fills in defaults for
/// missing fields, the project-local config fully overrides the global
/// one.
fn merge_config(base: &mut CropOptions, from: &CropOptions) {
    *base = from.clone();
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(opts: &mut CropOptions, cli: &Cli) {
    let matches = Cli::command().get_matches_from(std::env::args_os());

    if matches.value_source("verbose") == Some(clap::parser::ValueSource::CommandLine) {
        opts.verbose = cli.verbose;
    }

    if let Some(dpi) = cli.dpi {
        opts.dpi = dpi;
    }

    if let Some(ref dir) = cli.output_dir {
        opts.output_dir = dir.clone();
    }

    if let Some(ref size_str) = cli.viewport {
        if let Some((w, h)) = parse_size(size_str) {
            opts.viewport_width = w;
            opts.viewport_height = h;
        }
    }

    if cli.page.is_some() {
        opts.preview_page = cli.page;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Handle --dump-config
    if cli.dump_config {
        let mut opts = load_config();
        apply_cli_overrides(&mut opts, &cli);
        match toml::to_string_pretty(&opts) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let pdf_path = match cli.input.clone().or_else(pick_pdf) {
        Some(path) => path,
        None => {
            println!("No PDF file selected.");
            return;
        }
    };

    if let Err(e) = run(&pdf_path, &cli) {
        if matches!(e.downcast_ref::<CropError>(), Some(CropError::NoPages)) {
            // User input, not a program failure: report and end normally.
            eprintln!("Error: {}", e);
            return;
        }
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Native file-open dialog, filtered to PDFs.
fn pick_pdf() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("PDF Files", &["pdf"])
        .pick_file()
}

fn run(pdf_path: &Path, cli: &Cli) -> Result<()> {
    // Build options: config files first, then CLI overrides. Both phases
    // get the same value.
    let mut options = load_config();
    apply_cli_overrides(&mut options, cli);

    log::info!("Processing {}", pdf_path.display());

    let points = polycrop_select::select_polygon(pdf_path, &options)?;
    polycrop_extract::extract_all_pages(pdf_path, &points, &options)?;

    Ok(())
}

fn parse_size(s: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() == 2 {
        let w = parts[0].parse().ok()?;
        let h = parts[1].parse().ok()?;
        Some((w, h))
    } else {
        None
    }
}
