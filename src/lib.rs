//! Fleetline: fulfillment analytics for commercial-vehicle orders
//!
//! Reconstructs per-stage timelines from sparse order snapshots and rolls
//! them up into fleet reports: aging, on-time rate, SLA compliance,
//! per-stage delay and a credit-utilization forecast.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
