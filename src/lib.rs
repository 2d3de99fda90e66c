//! VCAT: Vehicle Catalog Toolkit
//!
//! Cascading Year/Make/Model/Trim lookups over a VCDB/ACES-style reference
//! catalog, served from pluggable storage backends.

pub mod cli;
pub mod core;
