//! Order entity type - a commercial-vehicle fulfillment order snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::pipeline::{Milestone, OrderStatus, Stage};
use crate::entities::lenient;

/// Order priority class, used for SLA reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum Priority {
    Low,
    #[default]
    Standard,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Standard,
        Priority::High,
        Priority::Critical,
    ];
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Standard => write!(f, "standard"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "standard" => Ok(Priority::Standard),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!(
                "Invalid priority: {}. Use low, standard, high, or critical",
                s
            )),
        }
    }
}

/// Who is buying the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum BuyerSegment {
    #[default]
    Fleet,
    Government,
    Dealer,
    Retail,
}

impl std::fmt::Display for BuyerSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuyerSegment::Fleet => write!(f, "fleet"),
            BuyerSegment::Government => write!(f, "government"),
            BuyerSegment::Dealer => write!(f, "dealer"),
            BuyerSegment::Retail => write!(f, "retail"),
        }
    }
}

/// Whether the buyer has settled the invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Pricing captured when the order was configured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSnapshot {
    /// OEM chassis cost
    #[serde(deserialize_with = "lenient::or_default")]
    pub chassis_price: f64,

    /// Upfit body and equipment cost
    #[serde(deserialize_with = "lenient::or_default")]
    pub upfit_price: f64,

    /// Price invoiced to the buyer
    #[serde(deserialize_with = "lenient::or_default")]
    pub total_price: f64,
}

impl PricingSnapshot {
    /// Cost carried on the credit line while the vehicle is in the pipeline
    pub fn inventory_cost(&self) -> f64 {
        self.chassis_price + self.upfit_price
    }
}

/// One date per milestone, used for both planned ETAs and actual completions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDates {
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub oem_transit: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub upfit_completion: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub final_delivery: Option<DateTime<Utc>>,
}

impl MilestoneDates {
    pub fn get(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        match milestone {
            Milestone::OemTransit => self.oem_transit,
            Milestone::UpfitCompletion => self.upfit_completion,
            Milestone::FinalDelivery => self.final_delivery,
        }
    }

    pub fn set(&mut self, milestone: Milestone, date: Option<DateTime<Utc>>) {
        match milestone {
            Milestone::OemTransit => self.oem_transit = date,
            Milestone::UpfitCompletion => self.upfit_completion = date,
            Milestone::FinalDelivery => self.final_delivery = date,
        }
    }
}

/// Append-only record of a status advance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransitionEvent {
    /// Status the order moved into
    pub to_stage: OrderStatus,

    /// When the move happened
    pub occurred_at: DateTime<Utc>,
}

/// A fulfillment order as supplied by the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    pub id: String,

    /// Buyer name, for display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    /// Current pipeline status
    #[serde(default, deserialize_with = "lenient::status")]
    pub status: OrderStatus,

    /// When the configuration was received
    #[serde(
        default,
        deserialize_with = "lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    /// Planned milestone ETAs
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub planned: MilestoneDates,

    /// Actual milestone completion dates
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub actual: MilestoneDates,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub priority: Priority,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub buyer_segment: BuyerSegment,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub pricing: PricingSnapshot,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub payment: PaymentStatus,

    /// Status transition log; malformed entries are dropped
    #[serde(
        default,
        deserialize_with = "lenient::valid_entries",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub events: Vec<StageTransitionEvent>,
}

impl Order {
    /// Create a new order at the first pipeline stage
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            customer: None,
            status: OrderStatus::Stage(Stage::first()),
            created_at: Some(created_at),
            planned: MilestoneDates::default(),
            actual: MilestoneDates::default(),
            priority: Priority::default(),
            buyer_segment: BuyerSegment::default(),
            pricing: PricingSnapshot::default(),
            payment: PaymentStatus::default(),
            events: Vec::new(),
        }
    }

    /// Planned ETA for a milestone
    pub fn planned_eta(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        self.planned.get(milestone)
    }

    /// Supplied actual completion date for a milestone
    pub fn actual_completion(&self, milestone: Milestone) -> Option<DateTime<Utc>> {
        self.actual.get(milestone)
    }

    /// Append a transition event to the log
    pub fn record_event(&mut self, to_stage: impl Into<OrderStatus>, occurred_at: DateTime<Utc>) {
        self.events.push(StageTransitionEvent {
            to_stage: to_stage.into(),
            occurred_at,
        });
    }

    pub fn is_paid(&self) -> bool {
        self.payment == PaymentStatus::Paid
    }

    /// Still moving through the pipeline (not delivered, not canceled)
    pub fn is_in_pipeline(&self) -> bool {
        matches!(self.status.stage(), Some(stage) if stage != Stage::Delivered)
    }
}

/// `{ orders: [...] }` wrapper used by exported order books
#[derive(Debug, Default, Deserialize)]
pub struct OrderBook {
    #[serde(default)]
    pub orders: Vec<Order>,
}

/// Accepted shapes for an order file: an order book, a bare list, or one order
#[derive(Debug)]
pub enum OrderFile {
    Book(OrderBook),
    List(Vec<Order>),
    Single(Box<Order>),
}

/// Top-level layout of an order file, decided before typed decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFileShape {
    Book,
    List,
    Single,
    Empty,
}

impl OrderFileShape {
    /// Classify an untyped document
    pub fn of(document: &serde_json::Value) -> Self {
        match document {
            serde_json::Value::Null => OrderFileShape::Empty,
            serde_json::Value::Array(_) => OrderFileShape::List,
            serde_json::Value::Object(map) if map.contains_key("orders") => OrderFileShape::Book,
            _ => OrderFileShape::Single,
        }
    }
}

impl OrderFile {
    pub fn into_orders(self) -> Vec<Order> {
        match self {
            OrderFile::Book(book) => book.orders,
            OrderFile::List(orders) => orders,
            OrderFile::Single(order) => vec![*order],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_order_starts_at_first_stage() {
        let order = Order::new("ORD-1", day(1));
        assert_eq!(order.status, OrderStatus::Stage(Stage::ConfigReceived));
        assert_eq!(order.created_at, Some(day(1)));
        assert!(order.events.is_empty());
        assert!(order.is_in_pipeline());
        assert!(!order.is_paid());
    }

    #[test]
    fn test_milestone_dates_accessors() {
        let mut dates = MilestoneDates::default();
        dates.set(Milestone::UpfitCompletion, Some(day(9)));
        assert_eq!(dates.get(Milestone::UpfitCompletion), Some(day(9)));
        assert_eq!(dates.get(Milestone::OemTransit), None);
    }

    #[test]
    fn test_parse_order_yaml_with_defaults() {
        let yaml = r#"
id: ORD-100
status: oem_in_transit
created_at: 2025-03-01T12:00:00Z
planned:
  final_delivery: 2025-04-01T12:00:00Z
events:
  - to_stage: oem_allocated
    occurred_at: 2025-03-03T12:00:00Z
"#;
        let order: Order = serde_yml::from_str(yaml).unwrap();
        assert_eq!(order.status, OrderStatus::Stage(Stage::OemInTransit));
        assert_eq!(order.priority, Priority::Standard);
        assert_eq!(order.payment, PaymentStatus::Unpaid);
        assert_eq!(order.events.len(), 1);
        assert_eq!(order.planned.oem_transit, None);
        assert!(order.planned.final_delivery.is_some());
    }

    #[test]
    fn test_unknown_status_does_not_fail_parsing() {
        let yaml = "id: ORD-7\nstatus: teleported\n";
        let order: Order = serde_yml::from_str(yaml).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert_eq!(order.created_at, None);
    }

    #[test]
    fn test_order_file_shapes() {
        let shape = |yaml: &str| {
            let document: serde_json::Value = serde_yml::from_str(yaml).unwrap();
            OrderFileShape::of(&document)
        };
        assert_eq!(shape("orders:\n  - id: A\n  - id: B\n"), OrderFileShape::Book);
        assert_eq!(shape("- id: A\n"), OrderFileShape::List);
        assert_eq!(shape("id: A\n"), OrderFileShape::Single);
        assert_eq!(shape("~\n"), OrderFileShape::Empty);

        let book: OrderBook = serde_yml::from_str("orders:\n  - id: A\n  - id: B\n").unwrap();
        assert_eq!(OrderFile::Book(book).into_orders().len(), 2);
    }

    #[test]
    fn test_malformed_optional_fields_degrade() {
        let yaml = r#"
id: ORD-ODD
status: delivered
priority: urgent
buyer_segment: 17
payment: maybe
created_at: not-a-date
planned:
  final_delivery: next week
  oem_transit: 2025-03-05T12:00:00Z
pricing:
  chassis_price: lots
  total_price: 71500
events:
  - to_stage: oem_allocated
    occurred_at: 2025-03-03T12:00:00Z
  - to_stage: oem_in_production
    occurred_at: sometime
"#;
        let order: Order = serde_yml::from_str(yaml).unwrap();
        assert_eq!(order.status, OrderStatus::Stage(Stage::Delivered));
        assert_eq!(order.priority, Priority::Standard);
        assert_eq!(order.buyer_segment, BuyerSegment::Fleet);
        assert_eq!(order.payment, PaymentStatus::Unpaid);
        assert_eq!(order.created_at, None);
        assert_eq!(order.planned.final_delivery, None);
        assert!(order.planned.oem_transit.is_some());
        assert_eq!(order.pricing.chassis_price, 0.0);
        assert_eq!(order.pricing.total_price, 71_500.0);
        assert_eq!(order.events.len(), 1);
    }

    #[test]
    fn test_non_string_status_is_unknown() {
        let order: Order = serde_yml::from_str("id: ORD-8\nstatus: 3\n").unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_inventory_cost() {
        let pricing = PricingSnapshot {
            chassis_price: 42_000.0,
            upfit_price: 18_000.0,
            total_price: 71_500.0,
        };
        assert_eq!(pricing.inventory_cost(), 60_000.0);
    }
}
