//! Unified filter enums for CLI commands

use clap::ValueEnum;

use crate::core::pipeline::{OrderStatus, Stage};
use crate::entities::order::{Order, Priority};

/// Status filter for analysis commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Orders still moving through the pipeline
    Active,
    /// Delivered orders only
    Delivered,
    /// Canceled orders only
    Canceled,
    /// Every order, including unknown statuses - default
    #[default]
    All,
}

impl StatusFilter {
    /// Check if an OrderStatus matches this filter
    pub fn matches(&self, status: &OrderStatus) -> bool {
        match self {
            StatusFilter::Active => status
                .stage()
                .is_some_and(|stage| stage != Stage::Delivered),
            StatusFilter::Delivered => status.is_delivered(),
            StatusFilter::Canceled => status.is_terminal(),
            StatusFilter::All => true,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Active => write!(f, "active"),
            StatusFilter::Delivered => write!(f, "delivered"),
            StatusFilter::Canceled => write!(f, "canceled"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Priority filter for analysis commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Low priority only
    Low,
    /// Standard priority only
    Standard,
    /// High priority only
    High,
    /// Critical priority only
    Critical,
    /// High and critical only
    Urgent,
    /// All priorities - default
    #[default]
    All,
}

impl PriorityFilter {
    /// Check if a Priority matches this filter
    pub fn matches(&self, priority: &Priority) -> bool {
        match self {
            PriorityFilter::Low => *priority == Priority::Low,
            PriorityFilter::Standard => *priority == Priority::Standard,
            PriorityFilter::High => *priority == Priority::High,
            PriorityFilter::Critical => *priority == Priority::Critical,
            PriorityFilter::Urgent => {
                *priority == Priority::High || *priority == Priority::Critical
            }
            PriorityFilter::All => true,
        }
    }
}

impl std::fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityFilter::Low => write!(f, "low"),
            PriorityFilter::Standard => write!(f, "standard"),
            PriorityFilter::High => write!(f, "high"),
            PriorityFilter::Critical => write!(f, "critical"),
            PriorityFilter::Urgent => write!(f, "urgent"),
            PriorityFilter::All => write!(f, "all"),
        }
    }
}

/// Keep the orders matching both filters
pub fn apply_filters(
    orders: Vec<Order>,
    status: StatusFilter,
    priority: PriorityFilter,
) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| status.matches(&o.status))
        .filter(|o| priority.matches(&o.priority))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_status_filter_matches() {
        let transit = OrderStatus::Stage(Stage::OemInTransit);
        let delivered = OrderStatus::Stage(Stage::Delivered);

        assert!(StatusFilter::Active.matches(&transit));
        assert!(!StatusFilter::Active.matches(&delivered));
        assert!(!StatusFilter::Active.matches(&OrderStatus::Canceled));

        assert!(StatusFilter::Delivered.matches(&delivered));
        assert!(StatusFilter::Canceled.matches(&OrderStatus::Canceled));

        assert!(StatusFilter::All.matches(&OrderStatus::Unknown));
    }

    #[test]
    fn test_priority_filter_matches() {
        assert!(PriorityFilter::High.matches(&Priority::High));
        assert!(!PriorityFilter::High.matches(&Priority::Low));

        assert!(PriorityFilter::Urgent.matches(&Priority::High));
        assert!(PriorityFilter::Urgent.matches(&Priority::Critical));
        assert!(!PriorityFilter::Urgent.matches(&Priority::Standard));

        assert!(PriorityFilter::All.matches(&Priority::Low));
    }

    #[test]
    fn test_apply_filters() {
        let mut a = Order::new("A", Utc::now());
        a.priority = Priority::Critical;
        let mut b = Order::new("B", Utc::now());
        b.status = OrderStatus::Canceled;
        let c = Order::new("C", Utc::now());

        let kept = apply_filters(vec![a, b, c], StatusFilter::Active, PriorityFilter::Urgent);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "A");
    }
}
