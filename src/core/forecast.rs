//! Credit-utilization and cash-flow forecast
//!
//! A month-by-month projection of the credit line. The opening balance is
//! outstanding receivables plus inventory still in the pipeline. Each period
//! adds the projected cost of new vehicles entering the pipeline and
//! subtracts expected collections, weighted by how old each receivable is.
//!
//! This is an estimate for planning, not a ledger. Inflow variation comes
//! from a seeded RNG so the same inputs always project the same numbers.

use chrono::{DateTime, Months, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::config::AnalyticsConfig;
use crate::core::fleet::{AgingBucket, AgingReport, AnalyzedOrder};

/// Longest projection the forecast will produce
pub const MAX_HORIZON_MONTHS: usize = 6;

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    /// 1-based period number
    pub period: usize,
    /// Calendar month, `YYYY-MM`
    pub month: String,
    pub opening_balance: f64,
    pub inflow: f64,
    pub collections: f64,
    pub closing_balance: f64,
    pub available_credit: f64,
    pub utilization_pct: f64,
}

/// Multi-period projection plus the inputs it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditForecast {
    pub credit_ceiling: f64,
    pub starting_receivables: f64,
    pub starting_inventory: f64,
    /// Average orders entering the pipeline per month
    pub monthly_intake: f64,
    /// Average inventory cost per order
    pub average_unit_cost: f64,
    pub periods: Vec<ForecastPeriod>,
}

impl CreditForecast {
    pub fn starting_balance(&self) -> f64 {
        self.starting_receivables + self.starting_inventory
    }

    /// Highest projected utilization across the horizon
    pub fn peak_utilization(&self) -> f64 {
        self.periods
            .iter()
            .map(|p| p.utilization_pct)
            .fold(0.0, f64::max)
    }
}

/// Receivable amounts per aging bucket, oldest last
#[derive(Debug, Clone, Copy, Default)]
struct Receivables([f64; 4]);

impl Receivables {
    fn from_aging(aging: &AgingReport) -> Self {
        let mut amounts = [0.0; 4];
        for (slot, bucket) in amounts.iter_mut().zip(AgingBucket::ALL) {
            *slot = aging.amount(bucket);
        }
        Self(amounts)
    }

    /// Expected collections this period, and what is left uncollected
    fn collect(&self, config: &AnalyticsConfig) -> (f64, [f64; 4]) {
        let mut remaining = [0.0; 4];
        let mut collected = 0.0;
        for (i, bucket) in AgingBucket::ALL.into_iter().enumerate() {
            let probability = bucket.collection_probability(&config.aging).clamp(0.0, 1.0);
            let amount = self.0[i] * probability;
            collected += amount;
            remaining[i] = self.0[i] - amount;
        }
        (collected, remaining)
    }

    /// Age uncollected amounts one bucket and add fresh receivables
    fn roll_forward(remaining: [f64; 4], fresh: f64) -> Self {
        Self([
            fresh,
            remaining[0],
            remaining[1],
            remaining[2] + remaining[3],
        ])
    }
}

/// Average new orders per month over the lookback window ending at `as_of`
fn monthly_intake(analyzed: &[AnalyzedOrder<'_>], as_of: DateTime<Utc>, lookback: u32) -> f64 {
    if lookback == 0 {
        return 0.0;
    }
    let since = as_of
        .checked_sub_months(Months::new(lookback))
        .unwrap_or(as_of);
    let intake = analyzed
        .iter()
        .filter_map(|a| a.order.created_at)
        .filter(|created| *created > since && *created <= as_of)
        .count();
    intake as f64 / lookback as f64
}

/// Mean inventory cost over orders that carry pricing
fn average_unit_cost(analyzed: &[AnalyzedOrder<'_>]) -> f64 {
    let costs: Vec<f64> = analyzed
        .iter()
        .map(|a| a.order.pricing.inventory_cost())
        .filter(|cost| *cost > 0.0)
        .collect();
    if costs.is_empty() {
        0.0
    } else {
        costs.iter().sum::<f64>() / costs.len() as f64
    }
}

fn month_label(as_of: DateTime<Utc>, offset: usize) -> String {
    let offset = u32::try_from(offset).unwrap_or(u32::MAX);
    as_of
        .checked_add_months(Months::new(offset))
        .unwrap_or(as_of)
        .format("%Y-%m")
        .to_string()
}

/// Configured percentage as a fraction in `[0, 1]`; non-finite values disable variation
fn inflow_variation(pct: f64) -> f64 {
    let fraction = (pct / 100.0).abs();
    if fraction.is_finite() {
        fraction.min(1.0)
    } else {
        tracing::warn!(variation_pct = pct, "variation is not a finite number; ignoring");
        0.0
    }
}

/// Project credit utilization forward from the current fleet state
pub fn project(
    analyzed: &[AnalyzedOrder<'_>],
    aging: &AgingReport,
    as_of: DateTime<Utc>,
    config: &AnalyticsConfig,
) -> CreditForecast {
    let settings = &config.forecast;

    let starting_receivables = aging.total_outstanding;
    let starting_inventory: f64 = analyzed
        .iter()
        .filter(|a| a.order.is_in_pipeline())
        .map(|a| a.order.pricing.inventory_cost())
        .sum();

    let intake = monthly_intake(analyzed, as_of, settings.lookback_months);
    let unit_cost = average_unit_cost(analyzed);
    let base_inflow = intake * unit_cost;
    let variation = inflow_variation(settings.variation_pct);
    let horizon = settings.horizon_months.min(MAX_HORIZON_MONTHS);

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut receivables = Receivables::from_aging(aging);
    let mut balance = starting_receivables + starting_inventory;
    let mut periods = Vec::with_capacity(horizon);

    for period in 1..=horizon {
        let factor = if variation > 0.0 {
            1.0 + rng.random_range(-variation..=variation)
        } else {
            1.0
        };
        let inflow = base_inflow * factor;
        let (collections, remaining) = receivables.collect(config);

        let opening_balance = balance;
        let closing_balance = (opening_balance + inflow - collections).max(0.0);
        let available_credit = (settings.credit_ceiling - closing_balance).max(0.0);
        let utilization_pct = if settings.credit_ceiling > 0.0 {
            closing_balance / settings.credit_ceiling * 100.0
        } else {
            0.0
        };

        periods.push(ForecastPeriod {
            period,
            month: month_label(as_of, period),
            opening_balance,
            inflow,
            collections,
            closing_balance,
            available_credit,
            utilization_pct,
        });

        balance = closing_balance;
        receivables = Receivables::roll_forward(remaining, inflow);
    }

    CreditForecast {
        credit_ceiling: settings.credit_ceiling,
        starting_receivables,
        starting_inventory,
        monthly_intake: intake,
        average_unit_cost: unit_cost,
        periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fleet::{aging_report, analyze_all};
    use crate::core::pipeline::Stage;
    use crate::entities::order::{Order, PricingSnapshot};
    use chrono::{Duration, TimeZone};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 30, 12, 0, 0).unwrap()
    }

    fn priced(id: &str, created_days_ago: i64, stage: Stage) -> Order {
        let mut order = Order::new(id, as_of() - Duration::days(created_days_ago));
        order.status = stage.into();
        order.pricing = PricingSnapshot {
            chassis_price: 40_000.0,
            upfit_price: 20_000.0,
            total_price: 75_000.0,
        };
        order
    }

    fn run(orders: &[Order], config: &AnalyticsConfig) -> CreditForecast {
        let analyzed = analyze_all(orders, config);
        let aging = aging_report(&analyzed, as_of(), &config.aging);
        project(&analyzed, &aging, as_of(), config)
    }

    #[test]
    fn test_empty_fleet_projects_zeros() {
        let config = AnalyticsConfig::default();
        let forecast = run(&[], &config);

        assert_eq!(forecast.periods.len(), 6);
        for period in &forecast.periods {
            assert_eq!(period.closing_balance, 0.0);
            assert_eq!(period.utilization_pct, 0.0);
            assert_eq!(period.available_credit, config.forecast.credit_ceiling);
        }
    }

    #[test]
    fn test_starting_balance_is_receivables_plus_inventory() {
        let mut delivered = priced("D", 60, Stage::Delivered);
        delivered.actual.final_delivery = Some(as_of() - Duration::days(10));
        let orders = vec![
            delivered,
            priced("P1", 20, Stage::AtUpfitter),
            priced("P2", 10, Stage::OemAllocated),
        ];

        let config = AnalyticsConfig::default();
        let forecast = run(&orders, &config);

        assert_eq!(forecast.starting_receivables, 75_000.0);
        assert_eq!(forecast.starting_inventory, 120_000.0);
        assert_eq!(forecast.starting_balance(), 195_000.0);
        assert_eq!(forecast.periods[0].opening_balance, 195_000.0);
        // 0-30 receivables are fully collected in the first period
        assert_eq!(forecast.periods[0].collections, 75_000.0);
    }

    #[test]
    fn test_inflow_variation_is_bounded() {
        let orders: Vec<Order> = (0..12)
            .map(|i| priced(&format!("O{}", i), 10 + i * 10, Stage::OemInProduction))
            .collect();
        let config = AnalyticsConfig::default();
        let forecast = run(&orders, &config);

        let base = forecast.monthly_intake * forecast.average_unit_cost;
        assert!(base > 0.0);
        for period in &forecast.periods {
            assert!(period.inflow >= base * 0.9 - 1e-6);
            assert!(period.inflow <= base * 1.1 + 1e-6);
        }
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let orders: Vec<Order> = (0..5)
            .map(|i| priced(&format!("O{}", i), 15 * (i + 1), Stage::UpfitInProgress))
            .collect();
        let config = AnalyticsConfig::default();
        assert_eq!(run(&orders, &config), run(&orders, &config));
    }

    #[test]
    fn test_collections_weighted_by_age() {
        let mut old = priced("OLD", 120, Stage::Delivered);
        old.actual.final_delivery = Some(as_of() - Duration::days(75));
        let orders = vec![old];

        let mut config = AnalyticsConfig::default();
        config.forecast.variation_pct = 0.0;
        config.forecast.lookback_months = 0;
        let forecast = run(&orders, &config);

        // 61-90 bucket collects at 50%
        assert!((forecast.periods[0].collections - 37_500.0).abs() < 1e-6);
        // Remainder ages into 90+, collected at 50% next period
        assert!((forecast.periods[1].collections - 18_750.0).abs() < 1e-6);
    }

    #[test]
    fn test_utilization_and_available_credit() {
        let orders = vec![priced("P", 10, Stage::AtUpfitter)];
        let mut config = AnalyticsConfig::default();
        config.forecast.credit_ceiling = 100_000.0;
        config.forecast.variation_pct = 0.0;
        config.forecast.lookback_months = 0;
        let forecast = run(&orders, &config);

        let first = &forecast.periods[0];
        assert_eq!(first.inflow, 0.0);
        assert_eq!(first.closing_balance, 60_000.0);
        assert_eq!(first.available_credit, 40_000.0);
        assert!((first.utilization_pct - 60.0).abs() < 1e-9);
        assert!((forecast.peak_utilization() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_variation_is_ignored() {
        let orders: Vec<Order> = (0..4)
            .map(|i| priced(&format!("O{}", i), 10 + i * 20, Stage::OemInProduction))
            .collect();
        for pct in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut config = AnalyticsConfig::default();
            config.forecast.variation_pct = pct;
            let forecast = run(&orders, &config);

            let base = forecast.monthly_intake * forecast.average_unit_cost;
            assert!(base > 0.0);
            for period in &forecast.periods {
                assert_eq!(period.inflow, base);
            }
        }
    }

    #[test]
    fn test_variation_clamped_to_full_inflow() {
        assert_eq!(inflow_variation(10.0), 0.1);
        assert_eq!(inflow_variation(-25.0), 0.25);
        assert_eq!(inflow_variation(1e9), 1.0);

        let orders = vec![priced("O", 10, Stage::OemInProduction)];
        let mut config = AnalyticsConfig::default();
        config.forecast.variation_pct = 500.0;
        let forecast = run(&orders, &config);
        for period in &forecast.periods {
            assert!(period.inflow >= 0.0);
            assert!(period.closing_balance.is_finite());
        }
    }

    #[test]
    fn test_horizon_is_capped() {
        let mut config = AnalyticsConfig::default();
        config.forecast.horizon_months = usize::MAX;
        let forecast = run(&[], &config);
        assert_eq!(forecast.periods.len(), MAX_HORIZON_MONTHS);

        config.forecast.horizon_months = 2;
        assert_eq!(run(&[], &config).periods.len(), 2);
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(as_of(), 1), "2025-10");
        assert_eq!(month_label(as_of(), 4), "2026-01");
    }
}
