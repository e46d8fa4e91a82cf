//! CLI for inspecting repogen configuration and cache state.
//!
//! Orchestration itself is a library entry point driven by the host,
//! which owns the real compiler. The CLI covers what can be done without
//! one: validating configuration and reporting cache freshness.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use repogen::cache::{self, Metadata};
use repogen::config::Config;
use repogen::error::Error;

/// Parsed command line.
#[derive(Parser)]
#[command(name = "repogen", about = "Repository code generation orchestration")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "repogen.toml")]
    config: PathBuf,

    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Report freshness of every cached artifact
    Status,
    /// Load and validate the configuration
    Validate,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| return tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    return match cli.command {
        Commands::Status => match cmd_status(&cli.config) {
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            },
            Ok(code) => code,
        },
        Commands::Validate => match cmd_validate(&cli.config) {
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            },
            Ok(()) => ExitCode::SUCCESS,
        },
    };
}

/// Load the configuration and report what it would orchestrate.
///
/// # Errors
///
/// Returns errors from config loading or validation.
fn cmd_validate(config_path: &Path) -> Result<(), Error> {
    let config = Config::load(config_path)?;
    config.validate()?;

    println!("default database: {}", config.default_database);
    for (name, connection) in &config.databases {
        println!("database {name} -> {connection}");
    }
    for root in &config.source_roots {
        println!("source root {} -> {}", root.path.display(), root.namespace);
    }
    println!("output dir: {}", config.output_dir().display());

    return Ok(());
}

/// Per-entry outcome of a cache status check.
enum EntryStatus {
    /// The artifact or its metadata is missing or unreadable.
    Broken(&'static str),
    /// Every recorded dependency is unchanged.
    Fresh,
    /// A recorded dependency changed since compile time.
    Stale,
}

/// Check one artifact/metadata pair against the current dependency state.
fn check_entry(artifact: &Path, meta_path: &Path) -> EntryStatus {
    if !artifact.exists() {
        return EntryStatus::Broken("artifact missing");
    }
    if Metadata::read(meta_path).is_err() {
        return EntryStatus::Broken("metadata corrupt");
    }
    // Always check strictly here: status exists to answer "what would a
    // debug-mode run recompile".
    if cache::is_fresh(artifact, meta_path, true) {
        return EntryStatus::Fresh;
    }
    return EntryStatus::Stale;
}

/// Walk the output directory and report every cached artifact's freshness.
///
/// # Errors
///
/// Returns errors from config loading.
fn cmd_status(config_path: &Path) -> Result<ExitCode, Error> {
    let config = Config::load(config_path)?;
    let output_dir = config.output_dir();

    if !output_dir.is_dir() {
        println!("No cache at {}", output_dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut fresh_count = 0_u32;
    let mut stale_count = 0_u32;
    let mut broken_count = 0_u32;

    for entry in WalkDir::new(&output_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == "meta"))
    {
        let meta_path = entry.path();
        let artifact = meta_path.with_extension("");
        let display = artifact
            .strip_prefix(&output_dir)
            .unwrap_or(&artifact)
            .display()
            .to_string();

        match check_entry(&artifact, meta_path) {
            EntryStatus::Broken(reason) => {
                broken_count = broken_count.saturating_add(1);
                println!("BROKEN  {display} ({reason})");
            },
            EntryStatus::Fresh => fresh_count = fresh_count.saturating_add(1),
            EntryStatus::Stale => {
                stale_count = stale_count.saturating_add(1);
                println!("STALE   {display}");
            },
        }
    }

    // Exit code priority: broken (2) > stale (1) > fresh (0).
    if broken_count > 0 {
        println!("{broken_count} broken, {stale_count} stale, {fresh_count} fresh");
        return Ok(ExitCode::from(2));
    } else if stale_count > 0 {
        println!("{stale_count} stale, {fresh_count} fresh");
        return Ok(ExitCode::from(1));
    } else {
        println!("All {fresh_count} artifacts fresh");
        return Ok(ExitCode::SUCCESS);
    }
}
