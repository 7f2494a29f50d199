//! Analytics configuration
//!
//! Every section is optional in the YAML file; anything left out falls back
//! to the defaults below.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::pipeline::Stage;
use crate::yaml::{parse_yaml_file, YamlError};

/// Offset used for a stage missing from `estimate_offsets_days`
pub const FALLBACK_OFFSET_DAYS: i64 = 1;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub timeline: TimelineConfig,
    pub aging: AgingConfig,
    pub forecast: ForecastConfig,
}

impl AnalyticsConfig {
    /// Load from a YAML file, or return defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, YamlError> {
        match path {
            Some(path) => parse_yaml_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Timeline reconstruction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Days subtracted from the nearest downstream planned ETA when a reached
    /// stage has no recorded date. Empirical approximations, not invariants.
    pub estimate_offsets_days: BTreeMap<Stage, i64>,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        let estimate_offsets_days = [
            (Stage::OemAllocated, 3),
            (Stage::OemInProduction, 2),
            (Stage::OemInTransit, 1),
            (Stage::AtUpfitter, 1),
            (Stage::UpfitInProgress, 3),
            (Stage::ReadyForDelivery, 1),
            (Stage::Delivered, 1),
        ]
        .into_iter()
        .collect();

        Self {
            estimate_offsets_days,
        }
    }
}

impl TimelineConfig {
    /// Heuristic offset for a stage
    pub fn offset_for(&self, stage: Stage) -> i64 {
        self.estimate_offsets_days
            .get(&stage)
            .copied()
            .unwrap_or(FALLBACK_OFFSET_DAYS)
    }
}

/// Receivables aging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingConfig {
    /// Delivered orders older than this are assumed resolved and dropped
    pub window_days: i64,

    /// Probability that each bucket is collected within one period
    pub collection_probability: CollectionProbabilities,
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            window_days: 90,
            collection_probability: CollectionProbabilities::default(),
        }
    }
}

/// Collection probability per aging bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionProbabilities {
    pub current: f64,
    pub days_31_60: f64,
    pub days_61_90: f64,
    pub over_90: f64,
}

impl Default for CollectionProbabilities {
    fn default() -> Self {
        Self {
            current: 1.0,
            days_31_60: 0.75,
            days_61_90: 0.5,
            over_90: 0.5,
        }
    }
}

/// Credit-utilization forecast settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of monthly periods to project, at most six
    pub horizon_months: usize,

    /// Credit line ceiling
    pub credit_ceiling: f64,

    /// Months of order history used for intake averages
    pub lookback_months: u32,

    /// Maximum +/- percentage applied to projected inflow, capped at 100
    pub variation_pct: f64,

    /// Seed for the inflow variation sequence
    pub seed: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_months: 6,
            credit_ceiling: 5_000_000.0,
            lookback_months: 6,
            variation_pct: 10.0,
            seed: 42,
        }
    }
}
