//! Fleet-wide rollups over reconstructed orders
//!
//! Every report takes an explicit `as_of` instant and an immutable slice of
//! orders; nothing here reads the clock or keeps state between calls. Empty
//! inputs produce zero counts and "no data" averages, never a division error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::cascade::{CascadeAssessment, ScheduleStatus};
use crate::core::config::{AgingConfig, AnalyticsConfig};
use crate::core::days::floor_days_between;
use crate::core::forecast::{self, CreditForecast};
use crate::core::pipeline::{Milestone, OrderStatus, Stage};
use crate::core::timeline::Timeline;
use crate::entities::order::{Order, Priority};

/// An order together with its derived timeline and cascade assessment
#[derive(Debug, Clone)]
pub struct AnalyzedOrder<'a> {
    pub order: &'a Order,
    pub timeline: Timeline,
    pub cascade: CascadeAssessment,
}

impl<'a> AnalyzedOrder<'a> {
    pub fn new(order: &'a Order, config: &AnalyticsConfig) -> Self {
        let timeline = Timeline::build(order, &config.timeline);
        let cascade = timeline.assess();
        Self {
            order,
            timeline,
            cascade,
        }
    }
}

/// Reconstruct and assess every order
pub fn analyze_all<'a>(orders: &'a [Order], config: &AnalyticsConfig) -> Vec<AnalyzedOrder<'a>> {
    orders.iter().map(|o| AnalyzedOrder::new(o, config)).collect()
}

/// Days-since-delivery bucket for outstanding receivables
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "0-30")]
    Current,
    #[serde(rename = "31-60")]
    Days31To60,
    #[serde(rename = "61-90")]
    Days61To90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 4] = [
        AgingBucket::Current,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    /// Bucket for a number of days since delivery; future dates count as 0
    pub fn for_days(days: i64) -> AgingBucket {
        match days.max(0) {
            0..=30 => AgingBucket::Current,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Current => "0-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }

    /// Chance the bucket is collected within one period
    pub fn collection_probability(self, config: &AgingConfig) -> f64 {
        let p = &config.collection_probability;
        match self {
            AgingBucket::Current => p.current,
            AgingBucket::Days31To60 => p.days_31_60,
            AgingBucket::Days61To90 => p.days_61_90,
            AgingBucket::Over90 => p.over_90,
        }
    }

    /// Bucket one period (30 days) older
    pub fn next(self) -> AgingBucket {
        match self {
            AgingBucket::Current => AgingBucket::Days31To60,
            AgingBucket::Days31To60 => AgingBucket::Days61To90,
            AgingBucket::Days61To90 | AgingBucket::Over90 => AgingBucket::Over90,
        }
    }
}

impl std::fmt::Display for AgingBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingRow {
    pub bucket: AgingBucket,
    pub orders: usize,
    pub amount: f64,
}

/// Outstanding receivables for delivered, unpaid orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingReport {
    pub as_of: DateTime<Utc>,
    pub window_days: i64,
    pub rows: Vec<AgingRow>,
    /// Delivered, unpaid orders older than the window
    pub excluded: usize,
    pub total_outstanding: f64,
}

impl AgingReport {
    pub fn row(&self, bucket: AgingBucket) -> Option<&AgingRow> {
        self.rows.iter().find(|r| r.bucket == bucket)
    }

    pub fn amount(&self, bucket: AgingBucket) -> f64 {
        self.row(bucket).map(|r| r.amount).unwrap_or(0.0)
    }
}

/// Bucket delivered, unpaid orders by days since delivery
pub fn aging_report(
    analyzed: &[AnalyzedOrder<'_>],
    as_of: DateTime<Utc>,
    config: &AgingConfig,
) -> AgingReport {
    let mut totals: BTreeMap<AgingBucket, (usize, f64)> =
        AgingBucket::ALL.iter().map(|b| (*b, (0, 0.0))).collect();
    let mut excluded = 0;

    for entry in analyzed {
        if !entry.order.status.is_delivered() || entry.order.is_paid() {
            continue;
        }
        let Some(delivered_at) = entry.timeline.delivered_at() else {
            continue;
        };

        let days = floor_days_between(delivered_at, as_of);
        if days > config.window_days {
            excluded += 1;
            continue;
        }

        let slot = totals.entry(AgingBucket::for_days(days)).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += entry.order.pricing.total_price;
    }

    let rows: Vec<AgingRow> = totals
        .into_iter()
        .map(|(bucket, (orders, amount))| AgingRow {
            bucket,
            orders,
            amount,
        })
        .collect();
    let total_outstanding = rows.iter().map(|r| r.amount).sum();

    AgingReport {
        as_of,
        window_days: config.window_days,
        rows,
        excluded,
        total_outstanding,
    }
}

/// Cascade-aware on-time rate over delivered orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnTimeSummary {
    /// Delivered orders with both a planned and an actual delivery date
    pub eligible: usize,
    pub on_time: usize,
    pub ahead: usize,
    pub behind: usize,
    /// Behind only because of an upstream milestone
    pub masked: usize,
    /// `on_time / eligible`, 0 when nothing is eligible
    pub rate: f64,
}

pub fn on_time_summary(analyzed: &[AnalyzedOrder<'_>]) -> OnTimeSummary {
    let eligible: Vec<&AnalyzedOrder<'_>> = analyzed
        .iter()
        .filter(|a| a.order.status.is_delivered())
        .filter(|a| a.cascade.variances.final_delivery.is_some())
        .collect();

    let count = |status: ScheduleStatus| {
        eligible
            .iter()
            .filter(|a| a.cascade.status == status)
            .count()
    };
    let on_time = eligible.iter().filter(|a| a.cascade.is_on_time()).count();
    let masked = eligible.iter().filter(|a| a.cascade.masked_delay).count();

    OnTimeSummary {
        eligible: eligible.len(),
        on_time,
        ahead: count(ScheduleStatus::AheadOfSchedule),
        behind: count(ScheduleStatus::BehindSchedule),
        masked,
        rate: ratio(on_time, eligible.len()).unwrap_or(0.0),
    }
}

/// Mean variance for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDelayRow {
    pub stage: Stage,
    pub samples: usize,
    /// `None` means no order reported a variance for this stage
    pub average_days: Option<f64>,
}

pub fn stage_delays(analyzed: &[AnalyzedOrder<'_>]) -> Vec<StageDelayRow> {
    Stage::ALL
        .iter()
        .map(|&stage| {
            let values: Vec<i64> = analyzed
                .iter()
                .filter_map(|a| a.timeline.record(stage).and_then(|r| r.variance_days))
                .collect();
            let sum: i64 = values.iter().sum();
            StageDelayRow {
                stage,
                samples: values.len(),
                average_days: (!values.is_empty()).then(|| sum as f64 / values.len() as f64),
            }
        })
        .collect()
}

/// Delivery SLA compliance for one priority class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaRow {
    pub priority: Priority,
    /// Orders with both a planned and an actual delivery date
    pub total: usize,
    /// Of those, delivered on or before plan
    pub compliant: usize,
    pub rate: Option<f64>,
}

pub fn sla_compliance(analyzed: &[AnalyzedOrder<'_>]) -> Vec<SlaRow> {
    Priority::ALL
        .iter()
        .map(|&priority| {
            let variances: Vec<i64> = analyzed
                .iter()
                .filter(|a| a.order.priority == priority)
                .filter_map(|a| a.timeline.variance(Milestone::FinalDelivery))
                .collect();
            let compliant = variances.iter().filter(|&&v| v <= 0).count();
            SlaRow {
                priority,
                total: variances.len(),
                compliant,
                rate: ratio(compliant, variances.len()),
            }
        })
        .collect()
}

/// Orders per status, pipeline order first, then canceled and unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

pub fn status_counts(orders: &[Order]) -> Vec<StatusCount> {
    Stage::ALL
        .iter()
        .map(|&s| OrderStatus::Stage(s))
        .chain([OrderStatus::Canceled, OrderStatus::Unknown])
        .map(|status| StatusCount {
            status: status.to_string(),
            count: orders.iter().filter(|o| o.status == status).count(),
        })
        .collect()
}

fn ratio(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64)
}

/// Everything the dashboard layer consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReport {
    pub as_of: DateTime<Utc>,
    pub order_count: usize,
    pub status_counts: Vec<StatusCount>,
    pub aging: AgingReport,
    pub on_time: OnTimeSummary,
    pub stage_delays: Vec<StageDelayRow>,
    pub sla: Vec<SlaRow>,
    /// Sum of cumulative delivery variance across delivered orders
    pub total_delay_days: i64,
    pub orders_with_clamps: usize,
    pub forecast: CreditForecast,
}

/// Rolls up order collections into fleet reports
pub struct FleetAggregator<'a> {
    config: &'a AnalyticsConfig,
}

impl<'a> FleetAggregator<'a> {
    pub fn new(config: &'a AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Reconstruct every order and produce the full report
    pub fn aggregate(&self, orders: &[Order], as_of: DateTime<Utc>) -> FleetReport {
        let analyzed = analyze_all(orders, self.config);
        self.aggregate_analyzed(orders, &analyzed, as_of)
    }

    /// Produce the report from already-reconstructed orders
    pub fn aggregate_analyzed(
        &self,
        orders: &[Order],
        analyzed: &[AnalyzedOrder<'_>],
        as_of: DateTime<Utc>,
    ) -> FleetReport {
        let aging = aging_report(analyzed, as_of, &self.config.aging);
        let forecast = forecast::project(analyzed, &aging, as_of, self.config);

        let total_delay_days = analyzed
            .iter()
            .filter(|a| a.order.status.is_delivered())
            .filter_map(|a| a.cascade.cumulative_delay_days)
            .sum();

        tracing::debug!(
            orders = orders.len(),
            outstanding = aging.total_outstanding,
            "aggregated fleet report"
        );

        FleetReport {
            as_of,
            order_count: orders.len(),
            status_counts: status_counts(orders),
            on_time: on_time_summary(analyzed),
            stage_delays: stage_delays(analyzed),
            sla: sla_compliance(analyzed),
            total_delay_days,
            orders_with_clamps: analyzed
                .iter()
                .filter(|a| !a.timeline.adjustments.is_empty())
                .count(),
            aging,
            forecast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::PaymentStatus;
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap()
    }

    fn days_ago(n: i64) -> DateTime<Utc> {
        as_of() - Duration::days(n)
    }

    fn delivered_order(id: &str, delivered_days_ago: i64, total_price: f64) -> Order {
        let mut order = Order::new(id, days_ago(delivered_days_ago + 40));
        order.status = Stage::Delivered.into();
        order.actual.final_delivery = Some(days_ago(delivered_days_ago));
        order.pricing.total_price = total_price;
        order
    }

    /// OEM +2, upfit -2, delivery -1 relative to creation on day 0
    fn worked_example(id: &str) -> Order {
        let start = days_ago(100);
        let mut order = Order::new(id, start);
        order.status = Stage::Delivered.into();
        order.planned.oem_transit = Some(start + Duration::days(10));
        order.actual.oem_transit = Some(start + Duration::days(12));
        order.planned.upfit_completion = Some(start + Duration::days(20));
        order.actual.upfit_completion = Some(start + Duration::days(18));
        order.planned.final_delivery = Some(start + Duration::days(35));
        order.actual.final_delivery = Some(start + Duration::days(34));
        order
    }

    #[test]
    fn test_aging_bucket_boundaries() {
        assert_eq!(AgingBucket::for_days(-3), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(30), AgingBucket::Current);
        assert_eq!(AgingBucket::for_days(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(45), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_days(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_days(91), AgingBucket::Over90);
        assert_eq!(AgingBucket::Days61To90.next(), AgingBucket::Over90);
    }

    #[test]
    fn test_aging_report_buckets_and_excludes() {
        let orders = vec![
            delivered_order("A", 45, 80_000.0),
            delivered_order("B", 95, 60_000.0),
            delivered_order("C", 5, 50_000.0),
        ];
        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        let report = aging_report(&analyzed, as_of(), &config.aging);

        assert_eq!(report.row(AgingBucket::Days31To60).unwrap().orders, 1);
        assert_eq!(report.amount(AgingBucket::Days31To60), 80_000.0);
        assert_eq!(report.row(AgingBucket::Current).unwrap().orders, 1);
        assert_eq!(report.row(AgingBucket::Over90).unwrap().orders, 0);
        assert_eq!(report.excluded, 1);
        assert_eq!(report.total_outstanding, 130_000.0);
    }

    #[test]
    fn test_aging_skips_paid_and_undelivered() {
        let mut paid = delivered_order("P", 10, 10_000.0);
        paid.payment = PaymentStatus::Paid;
        let mut in_flight = Order::new("F", days_ago(20));
        in_flight.status = Stage::AtUpfitter.into();
        in_flight.pricing.total_price = 99_000.0;

        let orders = vec![paid, in_flight];
        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        let report = aging_report(&analyzed, as_of(), &config.aging);
        assert_eq!(report.total_outstanding, 0.0);
        assert_eq!(report.excluded, 0);
    }

    #[test]
    fn test_wider_window_populates_over_90() {
        let orders = vec![delivered_order("A", 120, 40_000.0)];
        let mut config = AnalyticsConfig::default();
        config.aging.window_days = 180;
        let analyzed = analyze_all(&orders, &config);
        let report = aging_report(&analyzed, as_of(), &config.aging);
        assert_eq!(report.row(AgingBucket::Over90).unwrap().orders, 1);
    }

    #[test]
    fn test_on_time_rate_uses_cascade_rule() {
        let mut clean = worked_example("CLEAN");
        clean.actual.oem_transit = clean.planned.oem_transit;
        let orders = vec![worked_example("MASKED"), clean];

        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        let summary = on_time_summary(&analyzed);

        assert_eq!(summary.eligible, 2);
        assert_eq!(summary.on_time, 1);
        assert_eq!(summary.behind, 1);
        assert_eq!(summary.masked, 1);
        assert!((summary.rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_worked_example_cumulative_delay() {
        let orders = vec![worked_example("W")];
        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);

        assert_eq!(analyzed[0].cascade.variances.oem_transit, Some(2));
        assert_eq!(analyzed[0].cascade.variances.upfit_completion, Some(-2));
        assert_eq!(analyzed[0].cascade.variances.final_delivery, Some(-1));
        assert_eq!(analyzed[0].cascade.cumulative_delay_days, Some(1));
        assert!(!analyzed[0].cascade.is_on_time());

        let report = FleetAggregator::new(&config).aggregate(&orders, as_of());
        assert_eq!(report.total_delay_days, 1);
    }

    #[test]
    fn test_stage_delays_report_no_data() {
        let orders = vec![worked_example("W1"), {
            let mut o = worked_example("W2");
            o.actual.oem_transit = o.planned.oem_transit.map(|d| d + Duration::days(4));
            o
        }];
        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        let rows = stage_delays(&analyzed);

        assert_eq!(rows.len(), Stage::COUNT);
        let at_upfitter = &rows[Stage::AtUpfitter.index()];
        assert_eq!(at_upfitter.samples, 2);
        assert_eq!(at_upfitter.average_days, Some(3.0));
        let production = &rows[Stage::OemInProduction.index()];
        assert_eq!(production.samples, 0);
        assert_eq!(production.average_days, None);
    }

    #[test]
    fn test_sla_by_priority() {
        let mut late = worked_example("LATE");
        late.priority = Priority::High;
        late.actual.final_delivery = late.planned.final_delivery.map(|d| d + Duration::days(2));
        let mut ok = worked_example("OK");
        ok.priority = Priority::High;

        let orders = vec![late, ok];
        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        let rows = sla_compliance(&analyzed);

        let high = rows.iter().find(|r| r.priority == Priority::High).unwrap();
        assert_eq!(high.total, 2);
        assert_eq!(high.compliant, 1);
        assert_eq!(high.rate, Some(0.5));

        let low = rows.iter().find(|r| r.priority == Priority::Low).unwrap();
        assert_eq!(low.total, 0);
        assert_eq!(low.rate, None);
    }

    #[test]
    fn test_planned_only_delivery_is_not_measured() {
        let start = days_ago(100);
        let mut order = Order::new("PLANNED-ONLY", start);
        order.status = Stage::Delivered.into();
        order.planned.oem_transit = Some(start + Duration::days(10));
        order.planned.upfit_completion = Some(start + Duration::days(20));
        order.planned.final_delivery = Some(start + Duration::days(35));
        let orders = vec![order];

        let config = AnalyticsConfig::default();
        let analyzed = analyze_all(&orders, &config);
        assert_eq!(analyzed[0].cascade.status, ScheduleStatus::Unknown);
        assert!(analyzed[0].timeline.delivered_at().is_some());

        let report = FleetAggregator::new(&config).aggregate(&orders, as_of());
        assert_eq!(report.on_time.eligible, 0);
        assert_eq!(report.on_time.ahead, 0);
        assert_eq!(report.on_time.rate, 0.0);
        assert!(report.sla.iter().all(|r| r.total == 0));
        assert!(report.stage_delays.iter().all(|r| r.samples == 0));
        assert_eq!(report.total_delay_days, 0);
    }

    #[test]
    fn test_empty_collection() {
        let config = AnalyticsConfig::default();
        let report = FleetAggregator::new(&config).aggregate(&[], as_of());

        assert_eq!(report.order_count, 0);
        assert_eq!(report.on_time.rate, 0.0);
        assert_eq!(report.on_time.eligible, 0);
        assert!(report.stage_delays.iter().all(|r| r.average_days.is_none()));
        assert!(report.sla.iter().all(|r| r.rate.is_none()));
        assert_eq!(report.aging.total_outstanding, 0.0);
        assert_eq!(report.total_delay_days, 0);
        assert_eq!(report.forecast.periods.len(), 6);
    }

    #[test]
    fn test_status_counts() {
        let mut canceled = Order::new("X", days_ago(3));
        canceled.status = OrderStatus::Canceled;
        let orders = vec![Order::new("A", days_ago(1)), canceled];

        let counts = status_counts(&orders);
        assert_eq!(counts.len(), Stage::COUNT + 2);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[Stage::COUNT].status, "canceled");
        assert_eq!(counts[Stage::COUNT].count, 1);
    }
}
