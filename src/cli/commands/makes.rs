//! `vcat makes` - list makes offered for a year

use clap::Args;
use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::render_listing;
use crate::cli::GlobalOpts;

#[derive(Args, Debug)]
pub struct MakesArgs {
    /// Catalog year
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run(args: MakesArgs, global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let resp = service.makes(args.year);
    render_listing(
        &resp,
        &resp.makes,
        resp.error.as_ref(),
        "make",
        global.format,
        global.quiet,
    );
    Ok(())
}
