//! CLI command implementations

pub mod completions;
pub mod report;
pub mod stages;
pub mod timeline;
pub mod utils;
