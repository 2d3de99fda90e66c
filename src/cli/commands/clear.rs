//! `vcat clear` - remove all catalog data from the reference store

use console::style;
use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::print_json;
use crate::cli::{GlobalOpts, OutputFormat};

pub fn run(global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let resp = service.clear();

    if global.format == OutputFormat::Json {
        print_json(&resp);
        return Ok(());
    }

    if resp.success {
        println!(
            "{} Catalog cleared ({} records)",
            style("✓").green(),
            resp.cleared
        );
    } else {
        eprintln!("{} Clear failed", style("✗").red());
    }
    Ok(())
}
