//! Shared utilities for CLI commands

use miette::Result;

use crate::cli::args::OrderSource;
use crate::cli::filters::apply_filters;
use crate::cli::GlobalOpts;
use crate::core::config::AnalyticsConfig;
use crate::entities::order::Order;
use crate::yaml::load_orders;

/// Load the analytics config named by `--config` / FLEETLINE_CONFIG, or defaults
pub fn load_config(global: &GlobalOpts) -> Result<AnalyticsConfig> {
    Ok(AnalyticsConfig::load(global.config.as_deref())?)
}

/// Load orders from the source path and apply its status/priority filters
pub fn load_filtered_orders(source: &OrderSource) -> Result<Vec<Order>> {
    let orders = load_orders(&source.path)?;
    let total = orders.len();
    let orders = apply_filters(orders, source.status, source.priority);
    tracing::debug!(
        total,
        kept = orders.len(),
        status = %source.status,
        priority = %source.priority,
        "filtered orders"
    );
    Ok(orders)
}
