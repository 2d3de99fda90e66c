//! `vcat years` - list catalog years, newest first

use miette::Result;

use crate::cli::helpers::open_service;
use crate::cli::table::render_values;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let resp = service.years();
    render_values(
        &resp,
        &resp.years,
        resp.error.as_ref(),
        "years",
        global.format,
        global.quiet,
    );
    Ok(())
}
