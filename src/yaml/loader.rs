//! Order file discovery and loading
//!
//! Accepts a single YAML/JSON file or a directory scanned recursively for
//! order files. Files are read in sorted path order so the resulting order
//! list is stable.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::entities::order::{Order, OrderFile, OrderFileShape};
use crate::yaml::diagnostics::YamlError;
use crate::yaml::parser::parse_for_path;

/// Errors that can occur while loading order snapshots
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("Path not found: {}", .0.display())]
    #[diagnostic(code(fleetline::load::not_found))]
    NotFound(PathBuf),

    #[error("No order files found under {}", .0.display())]
    #[diagnostic(
        code(fleetline::load::empty),
        help("Order files must end in .yaml, .yml or .json")
    )]
    NoOrderFiles(PathBuf),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] YamlError),

    #[error("Failed to walk directory: {0}")]
    #[diagnostic(code(fleetline::load::walk))]
    Walk(#[from] walkdir::Error),
}

fn is_order_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e, "yaml" | "yml" | "json"))
}

/// Collect order file paths under `root`, sorted
pub fn discover_order_files(root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !root.exists() {
        return Err(LoadError::NotFound(root.to_path_buf()));
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && is_order_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(LoadError::NoOrderFiles(root.to_path_buf()));
    }
    Ok(files)
}

/// Parse one order file.
///
/// The layout is classified from an untyped read first, so a bad field is
/// reported against the shape the file actually has, with its location.
pub fn parse_order_file(path: &Path) -> Result<OrderFile, YamlError> {
    let content = std::fs::read_to_string(path)?;
    let document: serde_json::Value = parse_for_path(&content, path)?;

    Ok(match OrderFileShape::of(&document) {
        OrderFileShape::Book => OrderFile::Book(parse_for_path(&content, path)?),
        OrderFileShape::List => OrderFile::List(parse_for_path(&content, path)?),
        OrderFileShape::Single => OrderFile::Single(Box::new(parse_for_path(&content, path)?)),
        OrderFileShape::Empty => OrderFile::List(Vec::new()),
    })
}

/// Load every order found at `path`
pub fn load_orders(path: &Path) -> Result<Vec<Order>, LoadError> {
    let mut orders = Vec::new();
    for file in discover_order_files(path)? {
        let parsed = parse_order_file(&file)?;
        let batch = parsed.into_orders();
        tracing::debug!(file = %file.display(), orders = batch.len(), "loaded order file");
        orders.extend(batch);
    }
    Ok(orders)
}
