//! Cascading delay attribution
//!
//! A raw delivery variance can look fine while an upstream milestone ran
//! late and the slack was eaten further down the line. Classification here
//! looks at all three milestones so that kind of catch-up never reads as
//! "on time". Missing upstream variances count as 0 (nothing to attribute).

use serde::{Deserialize, Serialize};

use crate::core::pipeline::Milestone;
use crate::core::variance::MilestoneVariances;

/// Fleet-level schedule classification of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Every milestone finished strictly early
    AheadOfSchedule,
    /// No milestone finished late
    OnTime,
    /// At least one milestone finished late
    BehindSchedule,
    /// Delivery variance not known yet and nothing is late so far
    Unknown,
}

impl ScheduleStatus {
    pub fn is_on_time(self) -> bool {
        matches!(self, ScheduleStatus::OnTime | ScheduleStatus::AheadOfSchedule)
    }
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStatus::AheadOfSchedule => write!(f, "ahead"),
            ScheduleStatus::OnTime => write!(f, "on_time"),
            ScheduleStatus::BehindSchedule => write!(f, "behind"),
            ScheduleStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Cascade analysis result for one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeAssessment {
    pub variances: MilestoneVariances,
    pub status: ScheduleStatus,
    /// Delivery variance plus any upstream lateness
    pub cumulative_delay_days: Option<i64>,
    /// Earliest milestone that ran late
    pub delay_origin: Option<Milestone>,
    /// Delivery looked on time on its own but an upstream milestone was late
    pub masked_delay: bool,
}

impl CascadeAssessment {
    pub fn is_on_time(&self) -> bool {
        self.status.is_on_time()
    }
}

/// `delivery + max(0, oem) + max(0, upfit)`, or `None` without a delivery variance
pub fn cumulative_delay(variances: &MilestoneVariances) -> Option<i64> {
    let delivery = variances.final_delivery?;
    Some(
        delivery
            + variances.oem_transit.unwrap_or(0).max(0)
            + variances.upfit_completion.unwrap_or(0).max(0),
    )
}

/// On time iff every milestone variance is <= 0. `None` when the delivery
/// variance is missing and no upstream milestone is late.
pub fn is_on_time(variances: &MilestoneVariances) -> Option<bool> {
    if upstream_late(variances) {
        return Some(false);
    }
    variances.final_delivery.map(|delivery| delivery <= 0)
}

fn upstream_late(variances: &MilestoneVariances) -> bool {
    variances.oem_transit.unwrap_or(0) > 0 || variances.upfit_completion.unwrap_or(0) > 0
}

/// Classify an order from its milestone variances
pub fn assess(variances: &MilestoneVariances) -> CascadeAssessment {
    let oem = variances.oem_transit.unwrap_or(0);
    let upfit = variances.upfit_completion.unwrap_or(0);

    let status = match variances.final_delivery {
        _ if upstream_late(variances) => ScheduleStatus::BehindSchedule,
        None => ScheduleStatus::Unknown,
        Some(delivery) if delivery > 0 => ScheduleStatus::BehindSchedule,
        Some(delivery) if delivery < 0 && oem < 0 && upfit < 0 => {
            ScheduleStatus::AheadOfSchedule
        }
        Some(_) => ScheduleStatus::OnTime,
    };

    let delay_origin = Milestone::ALL.into_iter().find(|m| {
        let v = match m {
            Milestone::OemTransit => variances.oem_transit,
            Milestone::UpfitCompletion => variances.upfit_completion,
            Milestone::FinalDelivery => variances.final_delivery,
        };
        v.is_some_and(|v| v > 0)
    });

    let masked_delay =
        upstream_late(variances) && variances.final_delivery.is_some_and(|d| d <= 0);

    CascadeAssessment {
        variances: *variances,
        status,
        cumulative_delay_days: cumulative_delay(variances),
        delay_origin,
        masked_delay,
    }
}
