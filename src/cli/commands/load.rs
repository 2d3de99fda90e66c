//! `vcat load` - import a catalog document into the reference store

use clap::Args;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{data_file, load_config, open_service};
use crate::cli::table::print_json;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::service::LoadResponse;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Catalog document to import (default: configured data file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub fn run(args: LoadArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let config = load_config();
    let path = args.file.unwrap_or_else(|| data_file(global, &config));

    let resp = service.load(&path);
    render(&resp, &path.display().to_string(), global);
    Ok(())
}

pub(super) fn render(resp: &LoadResponse, source: &str, global: &GlobalOpts) {
    if global.format == OutputFormat::Json {
        print_json(resp);
        return;
    }

    match (&resp.counts, &resp.error) {
        (Some(counts), _) => {
            println!("{} Imported catalog from {}", style("✓").green(), source);
            if !global.quiet {
                println!("  Years:       {}", counts.years);
                println!("  Makes:       {}", counts.makes);
                println!("  Models:      {}", counts.models);
                println!("  Submodels:   {}", counts.submodels);
                println!(
                    "  Associations: {}",
                    counts.year_makes + counts.year_make_models + counts.ymm_submodels
                );
            }
        }
        (None, Some(error)) => {
            eprintln!("{} Import failed: {}", style("✗").red(), error);
        }
        (None, None) => {}
    }
}
