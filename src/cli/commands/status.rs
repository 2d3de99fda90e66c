//! `vcat status` - catalog status dashboard

use console::style;
use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::print_json;
use crate::cli::{GlobalOpts, OutputFormat};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let status = service.status();

    if global.format == OutputFormat::Json {
        print_json(&status);
        return Ok(());
    }

    println!("{}", style("Catalog Status").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Backend:     {}", status.backend);
    println!(
        "  Loaded:      {}",
        if status.loaded {
            style("yes").green()
        } else {
            style("no").yellow()
        }
    );
    println!("  Years:       {}", style(status.years_count).cyan());
    println!("  Makes:       {}", style(status.makes_count).cyan());
    println!("  Models:      {}", style(status.models_count).cyan());
    println!("  Submodels:   {}", style(status.submodels_count).cyan());

    if !status.sample_years.is_empty() && !global.quiet {
        let sample: Vec<String> = status.sample_years.iter().map(|y| y.to_string()).collect();
        println!("  Newest:      {}", sample.join(", "));
    }

    if let Some(report) = &status.last_import {
        if !global.quiet {
            println!();
            println!("  Last import: {}", report.source.display());
            println!("  Imported at: {}", report.imported_at.to_rfc3339());
            println!("  Digest:      {}", &report.digest[..16.min(report.digest.len())]);
        }
    }

    if let Some(error) = &status.error {
        eprintln!("{} {}", style("!").yellow(), error.message);
    }

    Ok(())
}
