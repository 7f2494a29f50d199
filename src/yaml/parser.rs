//! YAML/JSON parsing with error handling

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with nice error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse JSON content into a typed value
pub fn parse_json<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_json::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_json_error(&e, content, filename))
    })
}

/// Parse already-read content, choosing JSON or YAML by the path's extension
pub fn parse_for_path<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T, YamlError> {
    let filename = path.display().to_string();
    if path.extension().is_some_and(|e| e == "json") {
        parse_json(content, &filename)
    } else {
        parse_yaml(content, &filename)
    }
}

/// Parse a file, choosing JSON or YAML by extension
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = std::fs::read_to_string(path)?;
    parse_for_path(&content, path)
}
