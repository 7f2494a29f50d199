//! Fulfillment pipeline definition
//!
//! The eight ordered stages every order moves through, plus the terminal
//! canceled state. Stage ordering is a plain ordinal comparison on a closed
//! enum; canceled and unknown statuses never take part in it.

use serde::{Deserialize, Serialize};

/// One discrete phase of the fulfillment lifecycle, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Stage {
    ConfigReceived = 0,
    OemAllocated = 1,
    OemInProduction = 2,
    OemInTransit = 3,
    AtUpfitter = 4,
    UpfitInProgress = 5,
    ReadyForDelivery = 6,
    Delivered = 7,
}

impl Stage {
    /// All stages in pipeline order
    pub const ALL: [Stage; 8] = [
        Stage::ConfigReceived,
        Stage::OemAllocated,
        Stage::OemInProduction,
        Stage::OemInTransit,
        Stage::AtUpfitter,
        Stage::UpfitInProgress,
        Stage::ReadyForDelivery,
        Stage::Delivered,
    ];

    /// Number of pipeline stages
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based position in the pipeline
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage at the given pipeline position
    pub fn from_index(index: usize) -> Option<Stage> {
        Self::ALL.get(index).copied()
    }

    /// First stage of the pipeline
    pub fn first() -> Stage {
        Stage::ConfigReceived
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Stage::ConfigReceived => "Configuration Received",
            Stage::OemAllocated => "OEM Allocated",
            Stage::OemInProduction => "OEM In Production",
            Stage::OemInTransit => "OEM In Transit",
            Stage::AtUpfitter => "At Upfitter",
            Stage::UpfitInProgress => "Upfit In Progress",
            Stage::ReadyForDelivery => "Ready For Delivery",
            Stage::Delivered => "Delivered",
        }
    }

    /// Identifier used in order files
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::ConfigReceived => "config_received",
            Stage::OemAllocated => "oem_allocated",
            Stage::OemInProduction => "oem_in_production",
            Stage::OemInTransit => "oem_in_transit",
            Stage::AtUpfitter => "at_upfitter",
            Stage::UpfitInProgress => "upfit_in_progress",
            Stage::ReadyForDelivery => "ready_for_delivery",
            Stage::Delivered => "delivered",
        }
    }

    /// True if `self` comes strictly earlier in the pipeline than `other`
    pub fn is_before(self, other: Stage) -> bool {
        self.index() < other.index()
    }

    /// Milestone whose completion this stage marks, if any
    pub fn milestone(self) -> Option<Milestone> {
        Milestone::ALL
            .into_iter()
            .find(|m| m.completion_stage() == self)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_identifier(s);
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| format!("Unknown pipeline stage: {}", s))
    }
}

/// Lowercase and fold `-` / spaces into `_` so "OEM In-Transit" and
/// "oem_in_transit" name the same stage
fn normalize_identifier(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// Pipeline index for a stage identifier; unknown identifiers yield `None`
pub fn stage_index(identifier: &str) -> Option<usize> {
    identifier.parse::<Stage>().ok().map(Stage::index)
}

/// True when the order's current stage is at or past the target stage
pub fn is_reached(current: Stage, target: Stage) -> bool {
    current.index() >= target.index()
}

/// The three milestones that carry planned ETAs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// Chassis leaves the OEM and arrives at the upfitter
    OemTransit,
    /// Upfitter finishes the body work
    UpfitCompletion,
    /// Vehicle handed over to the buyer
    FinalDelivery,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [
        Milestone::OemTransit,
        Milestone::UpfitCompletion,
        Milestone::FinalDelivery,
    ];

    /// Stage boundary at which this milestone counts as complete
    pub fn completion_stage(self) -> Stage {
        match self {
            Milestone::OemTransit => Stage::AtUpfitter,
            Milestone::UpfitCompletion => Stage::ReadyForDelivery,
            Milestone::FinalDelivery => Stage::Delivered,
        }
    }
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Milestone::OemTransit => write!(f, "oem_transit"),
            Milestone::UpfitCompletion => write!(f, "upfit_completion"),
            Milestone::FinalDelivery => write!(f, "final_delivery"),
        }
    }
}

/// Current status of an order: a pipeline stage, canceled, or unrecognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Stage(Stage),
    Canceled,
    Unknown,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Stage(Stage::first())
    }
}

impl OrderStatus {
    /// Parse a status identifier, degrading to `Unknown` instead of failing
    pub fn parse_lenient(s: &str) -> OrderStatus {
        let normalized = normalize_identifier(s);
        if normalized == "canceled" || normalized == "cancelled" {
            return OrderStatus::Canceled;
        }
        normalized
            .parse::<Stage>()
            .map(OrderStatus::Stage)
            .unwrap_or(OrderStatus::Unknown)
    }

    /// Pipeline stage, if the status is one
    pub fn stage(self) -> Option<Stage> {
        match self {
            OrderStatus::Stage(stage) => Some(stage),
            OrderStatus::Canceled | OrderStatus::Unknown => None,
        }
    }

    /// Canceled is the only terminal state outside the pipeline
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Canceled)
    }

    pub fn is_delivered(self) -> bool {
        self == OrderStatus::Stage(Stage::Delivered)
    }

    /// True when the status is a stage at or past `target`.
    /// Canceled and unknown statuses have reached nothing.
    pub fn has_reached(self, target: Stage) -> bool {
        self.stage().is_some_and(|current| is_reached(current, target))
    }

    /// True when the status is a stage strictly before `target`
    pub fn is_before(self, target: Stage) -> bool {
        self.stage().is_some_and(|current| current.is_before(target))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Stage(stage) => write!(f, "{}", stage),
            OrderStatus::Canceled => write!(f, "canceled"),
            OrderStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        OrderStatus::parse_lenient(&s)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl From<Stage> for OrderStatus {
    fn from(stage: Stage) -> Self {
        OrderStatus::Stage(stage)
    }
}
