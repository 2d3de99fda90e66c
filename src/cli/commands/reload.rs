//! `vcat reload` - re-import from the configured catalog document
//!
//! The cache-invalidation workflow: an updated catalog file is picked up
//! without touching the rest of the deployment. Each CLI invocation is a
//! fresh process, so the configured data file stands in as the last known
//! source.

use miette::Result;

use crate::cli::commands::load;
use crate::cli::helpers::{data_file, load_config, open_service};
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let service = open_service(global)?;
    let config = load_config();
    let path = data_file(global, &config);

    let resp = service.load(&path);
    load::render(&resp, &path.display().to_string(), global);
    Ok(())
}
