//! YAML/JSON parsing, order loading and error handling

pub mod diagnostics;
pub mod loader;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use loader::{discover_order_files, load_orders, LoadError};
pub use parser::{parse_for_path, parse_json, parse_yaml, parse_yaml_file};
