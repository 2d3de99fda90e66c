//! `vcat models` - list models offered for a year and make

use clap::Args;
use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::render_listing;
use crate::cli::GlobalOpts;

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Catalog year
    #[arg(long)]
    pub year: Option<i32>,

    /// Make identifier from the catalog
    #[arg(long)]
    pub make_id: Option<String>,
}

pub fn run(args: ModelsArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let resp = service.models(args.year, args.make_id.as_deref());
    render_listing(
        &resp,
        &resp.models,
        resp.error.as_ref(),
        "model",
        global.format,
        global.quiet,
    );
    Ok(())
}
