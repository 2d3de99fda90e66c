//! `vcat engines` - list the static engine/powertrain options
//!
//! Catalog-external metadata; no store is opened.

use miette::Result;

use crate::cli::table::render_values;
use crate::cli::GlobalOpts;
use crate::core::resolver::Resolver;
use crate::core::service::EnginesResponse;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let resp = EnginesResponse {
        engines: Resolver::engine_options().to_vec(),
    };
    render_values(
        &resp,
        &resp.engines,
        None,
        "engines",
        global.format,
        global.quiet,
    );
    Ok(())
}
