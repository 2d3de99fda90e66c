//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{load::LoadArgs, makes::MakesArgs, models::ModelsArgs, trims::TrimsArgs};
use crate::core::store::BackendKind;

#[derive(Parser)]
#[command(name = "vcat")]
#[command(author, version, about = "Vehicle Catalog Toolkit")]
#[command(
    long_about = "Cascading Year/Make/Model/Trim lookups over a VCDB/ACES-style reference catalog, served from pluggable storage backends."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Storage backend (default: from config, then relational)
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    /// Database path for the SQLite-backed backends
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Catalog document used by load/reload and the memory backend
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog years, newest first
    Years,

    /// List makes offered for a year
    Makes(MakesArgs),

    /// List models offered for a year and make
    Models(ModelsArgs),

    /// List submodels/trims offered for a year, make, and model
    Trims(TrimsArgs),

    /// List the static engine/powertrain options
    Engines,

    /// Import a catalog document into the reference store
    Load(LoadArgs),

    /// Remove all catalog data from the reference store
    Clear,

    /// Re-import from the configured catalog document
    Reload,

    /// Show catalog status and counts
    Status,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for list commands, JSON for admin commands
    #[default]
    Auto,
    /// JSON response envelopes (for programming)
    Json,
    /// Human-readable tables
    Table,
    /// Tab-separated values (for piping)
    Tsv,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse()
}
