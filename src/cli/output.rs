//! Output formatting utilities

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::helpers::{escape_csv, escape_md};
use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Auto => OutputFormat::Table,
        other => other,
    }
}

/// Print a value as YAML or JSON.
///
/// Returns `false` for row-oriented formats, which the caller renders itself.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Render rows as a boxed table, TSV, CSV or a markdown table
pub fn render_rows<T: Tabled>(rows: &[T], format: OutputFormat) {
    if format == OutputFormat::Table || format == OutputFormat::Auto {
        println!("{}", Table::new(rows).with(Style::sharp()));
        return;
    }

    let headers: Vec<String> = T::headers().into_iter().map(|h| h.into_owned()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.fields().into_iter().map(|f| f.into_owned()).collect())
        .collect();

    match format {
        OutputFormat::Csv => {
            println!("{}", headers.join(","));
            for row in &cells {
                let escaped: Vec<String> = row.iter().map(|c| escape_csv(c)).collect();
                println!("{}", escaped.join(","));
            }
        }
        OutputFormat::Md => {
            println!("| {} |", headers.join(" | "));
            println!("|{}", "---|".repeat(headers.len()));
            for row in &cells {
                let escaped: Vec<String> = row.iter().map(|c| escape_md(c)).collect();
                println!("| {} |", escaped.join(" | "));
            }
        }
        _ => {
            println!("{}", headers.join("\t"));
            for row in &cells {
                println!("{}", row.join("\t"));
            }
        }
    }
}
