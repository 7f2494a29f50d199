//! Command-line argument definitions

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::report::ReportArgs;
use crate::cli::commands::timeline::TimelineArgs;
use crate::cli::filters::{PriorityFilter, StatusFilter};
use crate::cli::helpers::parse_as_of;

#[derive(Parser, Debug)]
#[command(
    name = "fleetline",
    version,
    about = "Timeline reconstruction and delay analytics for commercial-vehicle fulfillment orders"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Analytics config file (YAML)
    #[arg(long, short = 'c', global = true, env = "FLEETLINE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table for terminals
    #[default]
    Auto,
    Table,
    Yaml,
    Json,
    Tsv,
    Csv,
    Md,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the fulfillment pipeline stages
    Stages,

    /// Reconstruct per-stage timelines for orders
    Timeline(TimelineArgs),

    /// Full fleet report (status, on-time, delays, SLA, aging, forecast)
    Report(ReportArgs),

    /// Receivables aging for delivered, unpaid orders
    Aging(ReportArgs),

    /// Delivery SLA compliance by priority
    Sla(ReportArgs),

    /// Credit-utilization forecast
    Forecast(ReportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Order source and filters shared by the analysis commands
#[derive(clap::Args, Debug, Clone)]
pub struct OrderSource {
    /// Order file (YAML/JSON) or directory of order files
    pub path: PathBuf,

    /// Filter by priority
    #[arg(long, short = 'p', default_value = "all")]
    pub priority: PriorityFilter,

    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,
}

/// Reference instant for age-based metrics
#[derive(clap::Args, Debug, Clone)]
pub struct AsOfArg {
    /// Evaluate as of this date (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long, value_parser = parse_as_of)]
    pub as_of: Option<DateTime<Utc>>,
}

impl AsOfArg {
    pub fn resolve(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}
