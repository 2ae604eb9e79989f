//! Main entry point for the pckedit CLI application.
//!
//! Dispatches the selected mode to [`PckEditor`] on the local filesystem
//! and chooses the default output locations.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use pckedit::{Cli, LocalStorage, Mode, PckEditor, read_name_list};

/// Application entry point.
///
/// Parses command-line arguments, installs logging and runs the selected
/// mode. Failures are reported once through the log and turn into a
/// non-zero exit code.
fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    tracing::debug!("Args: {:?}", std::env::args().collect::<Vec<_>>());

    match run(&cli) {
        Ok(()) => {
            tracing::info!("Finished!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the log subscriber.
///
/// The console layer writes to stderr at the level chosen by `-v` / `-q` /
/// `-qq`. With `--log-file` a second layer writes every message down to
/// DEBUG into that file, without colors, so the file also keeps the
/// per-entry lines the console hides.
///
/// # Arguments
///
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` once the subscriber is installed, or an error if the
/// log file cannot be created.
fn init_logging(cli: &Cli) -> Result<()> {
    let console = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(LevelFilter::from_level(cli.console_level()));

    let file = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file \"{}\"", path.display()))?;
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(())
}

/// Run the selected mode against the local filesystem.
///
/// Extract-all and replace write under `output_<stem>/`, which is wiped
/// first; extract-one and list-all write into the current directory.
/// `-d DIR` replaces either default and is never wiped.
///
/// # Arguments
///
/// * `cli` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` on success, or the first error with the failing
/// mode as context.
fn run(cli: &Cli) -> Result<()> {
    let editor = PckEditor::new(Arc::new(LocalStorage::new()))
        .with_clean_output(cli.cleans_output_dir());
    let archive = cli.archive.as_path();

    match &cli.mode {
        Mode::ExtractAll => {
            let dir = cli.output_dir();
            let count = editor
                .extract_all(archive, &dir)
                .with_context(|| format!("extracting \"{}\"", archive.display()))?;
            if !cli.is_quiet() {
                println!("{} sounds extracted to \"{}\"", count, dir.display());
            }
        }
        Mode::Extract { name } => {
            let dir = cli.output_dir.clone().unwrap_or_default();
            let path = editor
                .extract_one(archive, name, &dir)
                .with_context(|| format!("extracting \"{}\" from \"{}\"", name, archive.display()))?;
            if !cli.is_quiet() {
                println!("  extracting: {}", path.display());
            }
        }
        Mode::Repack {
            source_dir,
            names_file,
        } => {
            let text = std::fs::read_to_string(names_file)
                .with_context(|| format!("reading name list \"{}\"", names_file.display()))?;
            let names = read_name_list(&text);
            let count = editor
                .repack(archive, source_dir, &names)
                .with_context(|| format!("repacking \"{}\"", archive.display()))?;
            if !cli.is_quiet() {
                println!("{} sounds packed into \"{}\"", count, archive.display());
            }
        }
        Mode::Replace { name, new_file } => {
            let dir = cli.output_dir();
            let path = editor
                .replace(archive, name, new_file, &dir)
                .with_context(|| format!("replacing \"{}\" in \"{}\"", name, archive.display()))?;
            if !cli.is_quiet() {
                println!("Wrote \"{}\"", path.display());
            }
        }
        Mode::ListAll => {
            let dir = cli.output_dir.clone().unwrap_or_default();
            let output = dir.join(format!("{}.txt", cli.archive_stem()));
            let names = editor
                .list(archive, &output)
                .with_context(|| format!("listing \"{}\"", archive.display()))?;
            if !cli.is_quiet() {
                for name in &names {
                    println!("{}", name);
                }
            }
        }
    }

    Ok(())
}
