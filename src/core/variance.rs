//! Stage durations and planned-vs-actual variances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::days::ceil_days_between;
use crate::core::timeline::{ResolvedStage, StageRecord, TimestampSource};

/// Variances for the three milestones, in days (positive = late)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneVariances {
    pub oem_transit: Option<i64>,
    pub upfit_completion: Option<i64>,
    pub final_delivery: Option<i64>,
}

/// Elapsed whole days per stage.
///
/// Stage 0 is 0 by convention when its timestamp is known. Every later stage
/// needs both its own and its predecessor's timestamp; the result is rounded
/// up and never negative.
pub fn stage_durations(timestamps: &[Option<DateTime<Utc>>]) -> Vec<Option<i64>> {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, current)| {
            let current = (*current)?;
            if i == 0 {
                return Some(0);
            }
            let previous = timestamps[i - 1]?;
            Some(ceil_days_between(previous, current).max(0))
        })
        .collect()
}

/// `ceil(actual - planned)` in days, or `None` if either side is missing
pub fn variance_days(
    planned: Option<DateTime<Utc>>,
    actual: Option<DateTime<Utc>>,
) -> Option<i64> {
    match (planned, actual) {
        (Some(planned), Some(actual)) => Some(ceil_days_between(planned, actual)),
        _ => None,
    }
}

/// Timestamp usable as an actual completion. Estimates are derived from the
/// planned ETA itself, so they never count.
fn actual_timestamp(resolved: &ResolvedStage) -> Option<DateTime<Utc>> {
    match resolved.source {
        Some(TimestampSource::Estimated) | None => None,
        Some(_) => resolved.timestamp,
    }
}

/// Turn resolved stages into output records
pub fn annotate(stages: &[ResolvedStage]) -> Vec<StageRecord> {
    let timestamps: Vec<Option<DateTime<Utc>>> = stages.iter().map(|s| s.timestamp).collect();
    let durations = stage_durations(&timestamps);

    stages
        .iter()
        .zip(durations)
        .map(|(resolved, duration_days)| StageRecord {
            stage: resolved.stage,
            timestamp: resolved.timestamp,
            duration_days,
            variance_days: variance_days(resolved.planned, actual_timestamp(resolved)),
            planned: resolved.planned,
            reached: resolved.reached,
            source: resolved.source,
        })
        .collect()
}
