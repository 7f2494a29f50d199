//! Order timeline reconstruction
//!
//! Resolves a best-effort timestamp for every pipeline stage of one order
//! from whatever the snapshot carries: transition events, the creation date,
//! supplied milestone completions, and planned ETAs. Resolution never fails;
//! anything that cannot be determined stays `None`.
//!
//! Precedence per stage:
//! 1. a transition event for the stage (authoritative)
//! 2. the creation timestamp, for the first stage
//! 3. for stages the current status has reached: the supplied actual
//!    completion for that milestone, else an estimate from the nearest
//!    downstream planned ETA minus a configured offset
//!
//! Afterwards timestamps are forced non-decreasing in pipeline order: a stage
//! earlier than its predecessor is moved to predecessor + 1 day and the
//! rewrite is recorded as a [`ClampAdjustment`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::cascade::{self, CascadeAssessment};
use crate::core::config::TimelineConfig;
use crate::core::days::{add_days, sub_days};
use crate::core::pipeline::{Milestone, OrderStatus, Stage};
use crate::core::variance::{self, MilestoneVariances};
use crate::entities::order::{Order, StageTransitionEvent};

/// Where a resolved stage timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// A stage transition event
    Event,
    /// The order's creation date (first stage only)
    Created,
    /// A supplied actual milestone completion date
    ActualCompletion,
    /// Planned ETA minus a heuristic offset
    Estimated,
    /// An event or supplied date moved forward to keep the timeline monotonic
    Clamped,
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::Event => write!(f, "event"),
            TimestampSource::Created => write!(f, "created"),
            TimestampSource::ActualCompletion => write!(f, "actual"),
            TimestampSource::Estimated => write!(f, "estimated"),
            TimestampSource::Clamped => write!(f, "clamped"),
        }
    }
}

/// One stage after timestamp resolution, before duration/variance math
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStage {
    pub stage: Stage,
    pub timestamp: Option<DateTime<Utc>>,
    pub source: Option<TimestampSource>,
    /// Planned ETA for the milestone this stage completes
    pub planned: Option<DateTime<Utc>>,
    pub reached: bool,
}

/// A monotonicity rewrite applied to one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampAdjustment {
    pub stage: Stage,
    pub original: DateTime<Utc>,
    pub adjusted: DateTime<Utc>,
}

/// Result of resolving every stage of one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub stages: Vec<ResolvedStage>,
    pub adjustments: Vec<ClampAdjustment>,
    pub canceled_at: Option<DateTime<Utc>>,
}

/// Resolves stage timestamps for single orders
pub struct TimelineReconstructor<'a> {
    config: &'a TimelineConfig,
}

impl<'a> TimelineReconstructor<'a> {
    pub fn new(config: &'a TimelineConfig) -> Self {
        Self { config }
    }

    /// Reconstruct using the order's own event log
    pub fn reconstruct(&self, order: &Order) -> Reconstruction {
        self.reconstruct_with_events(order, &order.events)
    }

    /// Reconstruct using an event log supplied separately from the order
    pub fn reconstruct_with_events(
        &self,
        order: &Order,
        events: &[StageTransitionEvent],
    ) -> Reconstruction {
        let (stage_events, canceled_at) = index_events(events);

        let mut stages: Vec<ResolvedStage> = Stage::ALL
            .iter()
            .map(|&stage| self.resolve_stage(order, stage, &stage_events))
            .collect();

        let adjustments = enforce_monotonic(&order.id, &mut stages);

        Reconstruction {
            stages,
            adjustments,
            canceled_at,
        }
    }

    fn resolve_stage(
        &self,
        order: &Order,
        stage: Stage,
        stage_events: &BTreeMap<Stage, DateTime<Utc>>,
    ) -> ResolvedStage {
        let planned = stage.milestone().and_then(|m| order.planned_eta(m));
        let event = stage_events.get(&stage).copied();
        let reached = order.status.has_reached(stage) || event.is_some();

        let (timestamp, source) = if let Some(at) = event {
            (Some(at), Some(TimestampSource::Event))
        } else if stage == Stage::first() {
            (
                order.created_at,
                order.created_at.map(|_| TimestampSource::Created),
            )
        } else if order.status.has_reached(stage) {
            self.resolve_reached_stage(order, stage)
        } else {
            (None, None)
        };

        ResolvedStage {
            stage,
            timestamp,
            source,
            planned,
            reached,
        }
    }

    /// Supplied completion date, else an estimate from the planned ETAs
    fn resolve_reached_stage(
        &self,
        order: &Order,
        stage: Stage,
    ) -> (Option<DateTime<Utc>>, Option<TimestampSource>) {
        if let Some(actual) = stage.milestone().and_then(|m| order.actual_completion(m)) {
            return (Some(actual), Some(TimestampSource::ActualCompletion));
        }

        let Some(eta) = nearest_downstream_eta(order, stage) else {
            return (None, None);
        };
        let offset = self.config.offset_for(stage);
        match sub_days(eta, offset) {
            Some(estimate) => {
                tracing::debug!(
                    order = %order.id,
                    stage = %stage,
                    offset_days = offset,
                    "estimated stage timestamp from planned ETA"
                );
                (Some(estimate), Some(TimestampSource::Estimated))
            }
            None => {
                tracing::warn!(
                    order = %order.id,
                    stage = %stage,
                    offset_days = offset,
                    "estimate offset out of range; leaving stage undefined"
                );
                (None, None)
            }
        }
    }
}

/// First planned ETA among milestones completing at or after `stage`
fn nearest_downstream_eta(order: &Order, stage: Stage) -> Option<DateTime<Utc>> {
    Milestone::ALL
        .into_iter()
        .filter(|m| !m.completion_stage().is_before(stage))
        .find_map(|m| order.planned_eta(m))
}

/// Earliest event per pipeline stage, plus the cancellation time if logged.
/// Events for unknown statuses are ignored.
fn index_events(
    events: &[StageTransitionEvent],
) -> (BTreeMap<Stage, DateTime<Utc>>, Option<DateTime<Utc>>) {
    let mut by_stage: BTreeMap<Stage, DateTime<Utc>> = BTreeMap::new();
    let mut canceled_at: Option<DateTime<Utc>> = None;

    for event in events {
        match event.to_stage {
            OrderStatus::Stage(stage) => {
                by_stage
                    .entry(stage)
                    .and_modify(|at| *at = (*at).min(event.occurred_at))
                    .or_insert(event.occurred_at);
            }
            OrderStatus::Canceled => {
                canceled_at = Some(match canceled_at {
                    Some(at) => at.min(event.occurred_at),
                    None => event.occurred_at,
                });
            }
            OrderStatus::Unknown => {}
        }
    }

    (by_stage, canceled_at)
}

/// Clamp each defined timestamp to at least the previous defined one.
/// Undefined stages are skipped, not treated as breaks.
fn enforce_monotonic(order_id: &str, stages: &mut [ResolvedStage]) -> Vec<ClampAdjustment> {
    let mut adjustments = Vec::new();
    let mut previous: Option<DateTime<Utc>> = None;

    for resolved in stages.iter_mut() {
        let Some(current) = resolved.timestamp else {
            continue;
        };

        if let Some(prev) = previous {
            if current < prev {
                match add_days(prev, 1) {
                    Some(adjusted) => {
                        tracing::warn!(
                            order = %order_id,
                            stage = %resolved.stage,
                            original = %current,
                            adjusted = %adjusted,
                            "stage timestamp precedes previous stage; clamped forward"
                        );
                        adjustments.push(ClampAdjustment {
                            stage: resolved.stage,
                            original: current,
                            adjusted,
                        });
                        resolved.timestamp = Some(adjusted);
                        // A moved estimate is still an estimate
                        if resolved.source != Some(TimestampSource::Estimated) {
                            resolved.source = Some(TimestampSource::Clamped);
                        }
                    }
                    None => {
                        tracing::warn!(
                            order = %order_id,
                            stage = %resolved.stage,
                            original = %current,
                            "stage timestamp precedes previous stage and cannot be clamped; dropped"
                        );
                        resolved.timestamp = None;
                        resolved.source = None;
                        continue;
                    }
                }
            }
        }

        previous = resolved.timestamp;
    }

    adjustments
}

/// Per-stage derived record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub timestamp: Option<DateTime<Utc>>,
    pub duration_days: Option<i64>,
    pub variance_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planned: Option<DateTime<Utc>>,
    pub reached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<TimestampSource>,
}

/// Complete derived timeline for one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub order_id: String,
    pub status: OrderStatus,
    pub stages: Vec<StageRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<ClampAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,
}

impl Timeline {
    /// Reconstruct and annotate the timeline of one order
    pub fn build(order: &Order, config: &TimelineConfig) -> Self {
        let reconstruction = TimelineReconstructor::new(config).reconstruct(order);
        Self::from_reconstruction(order, reconstruction)
    }

    /// Annotate an existing reconstruction with durations and variances
    pub fn from_reconstruction(order: &Order, reconstruction: Reconstruction) -> Self {
        let stages = variance::annotate(&reconstruction.stages);
        Self {
            order_id: order.id.clone(),
            status: order.status,
            stages,
            adjustments: reconstruction.adjustments,
            canceled_at: reconstruction.canceled_at,
        }
    }

    pub fn record(&self, stage: Stage) -> Option<&StageRecord> {
        self.stages.get(stage.index())
    }

    pub fn timestamp(&self, stage: Stage) -> Option<DateTime<Utc>> {
        self.record(stage).and_then(|r| r.timestamp)
    }

    pub fn variance(&self, milestone: Milestone) -> Option<i64> {
        self.record(milestone.completion_stage())
            .and_then(|r| r.variance_days)
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp(Stage::Delivered)
    }

    pub fn milestone_variances(&self) -> MilestoneVariances {
        MilestoneVariances {
            oem_transit: self.variance(Milestone::OemTransit),
            upfit_completion: self.variance(Milestone::UpfitCompletion),
            final_delivery: self.variance(Milestone::FinalDelivery),
        }
    }

    /// Cascade classification of this timeline
    pub fn assess(&self) -> CascadeAssessment {
        cascade::assess(&self.milestone_variances())
    }

    /// True if defined timestamps never decrease in pipeline order
    pub fn is_monotonic(&self) -> bool {
        let defined: Vec<DateTime<Utc>> =
            self.stages.iter().filter_map(|r| r.timestamp).collect();
        defined.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
