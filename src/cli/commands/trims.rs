//! `vcat trims` - list submodels/trims for a year, make, and model

use clap::Args;
use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::render_listing;
use crate::cli::GlobalOpts;

#[derive(Args, Debug)]
pub struct TrimsArgs {
    /// Catalog year
    #[arg(long)]
    pub year: Option<i32>,

    /// Make identifier from the catalog
    #[arg(long)]
    pub make_id: Option<String>,

    /// Model identifier from the catalog
    #[arg(long)]
    pub model_id: Option<String>,
}

pub fn run(args: TrimsArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let resp = service.trims(args.year, args.make_id.as_deref(), args.model_id.as_deref());
    render_listing(
        &resp,
        &resp.trims,
        resp.error.as_ref(),
        "trim",
        global.format,
        global.quiet,
    );
    Ok(())
}
