//! Output rendering for CLI commands
//!
//! List commands render id/name pairs as a table, TSV, or the raw JSON
//! response envelope. Auto resolves to table for list commands; admin
//! commands render JSON envelopes or styled human summaries.

use console::style;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::OutputFormat;
use crate::core::dataset::IdName;
use crate::core::error::ErrorBody;

#[derive(Tabled)]
struct IdNameRow<'a> {
    #[tabled(rename = "ID")]
    id: &'a str,
    #[tabled(rename = "Name")]
    name: &'a str,
}

/// Render a list response: the JSON envelope as-is, or the items as
/// table/TSV with any reason code reported on stderr
pub fn render_listing<T: Serialize>(
    envelope: &T,
    items: &[IdName],
    error: Option<&ErrorBody>,
    label: &str,
    format: OutputFormat,
    quiet: bool,
) {
    match format {
        OutputFormat::Json => print_json(envelope),
        OutputFormat::Tsv => {
            report_reason(error);
            for item in items {
                println!("{}\t{}", item.id, item.name);
            }
        }
        OutputFormat::Auto | OutputFormat::Table => {
            report_reason(error);
            if items.is_empty() {
                if !quiet && error.is_none() {
                    println!("No {} found", label);
                }
                return;
            }
            let rows: Vec<IdNameRow> = items
                .iter()
                .map(|item| IdNameRow {
                    id: &item.id,
                    name: &item.name,
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
            if !quiet {
                println!("{} {}(s)", items.len(), label);
            }
        }
    }
}

/// Render a plain sequence (years, engines)
pub fn render_values<T: Serialize, V: std::fmt::Display>(
    envelope: &T,
    values: &[V],
    error: Option<&ErrorBody>,
    label: &str,
    format: OutputFormat,
    quiet: bool,
) {
    match format {
        OutputFormat::Json => print_json(envelope),
        _ => {
            report_reason(error);
            for value in values {
                println!("{}", value);
            }
            if !quiet && values.is_empty() && error.is_none() {
                println!("No {} found", label);
            }
        }
    }
}

/// Serialize an envelope to pretty JSON on stdout
pub fn print_json<T: Serialize>(envelope: &T) {
    match serde_json::to_string_pretty(envelope) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{} failed to serialize response: {}", style("✗").red(), e),
    }
}

fn report_reason(error: Option<&ErrorBody>) {
    if let Some(body) = error {
        eprintln!("{} {}", style("!").yellow(), body.message);
    }
}
