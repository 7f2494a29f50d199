//! Diagnostic errors for order and config files

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised while reading a YAML or JSON input file
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Failed to read file: {0}")]
    #[diagnostic(code(fleetline::io))]
    Io(#[from] std::io::Error),
}

/// A parse failure pointing at the offending location in the source
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid document: {message}")]
#[diagnostic(
    code(fleetline::yaml::syntax),
    help("Check field names and value types against the order format")
)]
pub struct YamlSyntaxError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error, mapping its location to a byte span
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err
            .location()
            .map(|loc| SourceSpan::from((loc.index().min(content.len()), 1)));
        Self {
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }

    /// Build from a serde_json error using its line/column
    pub fn from_json_error(err: &serde_json::Error, content: &str, filename: &str) -> Self {
        let offset = line_col_to_offset(content, err.line(), err.column());
        Self {
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span: offset.map(|o| SourceSpan::from((o, 1))),
        }
    }
}

/// Convert a 1-based line/column into a byte offset
fn line_col_to_offset(content: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let line_start: usize = content
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    Some((line_start + column.saturating_sub(1)).min(content.len()))
}
