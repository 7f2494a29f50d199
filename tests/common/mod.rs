//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get a fleetline command
pub fn fleetline() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("fleetline"));
    cmd.env_remove("FLEETLINE_CONFIG").env_remove("FLEETLINE_LOG");
    cmd
}

/// Write an order file into the temp dir and return its path
pub fn write_orders(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, yaml).unwrap();
    path
}

/// Delivered order that ran +2 at OEM transit, -2 at upfit, -1 at delivery
pub const WORKED_EXAMPLE: &str = r#"
orders:
  - id: ORD-WORKED
    customer: Metro Utilities
    status: delivered
    priority: high
    created_at: 2025-01-01T12:00:00Z
    planned:
      oem_transit: 2025-01-11T12:00:00Z
      upfit_completion: 2025-01-21T12:00:00Z
      final_delivery: 2025-02-05T12:00:00Z
    actual:
      oem_transit: 2025-01-13T12:00:00Z
      upfit_completion: 2025-01-19T12:00:00Z
      final_delivery: 2025-02-04T12:00:00Z
    pricing:
      chassis_price: 42000
      upfit_price: 18000
      total_price: 71500
"#;

/// Two delivered, unpaid orders 45 and 95 days before 2025-06-30, plus a paid one
pub const AGING_BOOK: &str = r#"
orders:
  - id: ORD-45
    status: delivered
    priority: standard
    created_at: 2025-03-01T00:00:00Z
    planned:
      final_delivery: 2025-05-16T00:00:00Z
    actual:
      final_delivery: 2025-05-16T00:00:00Z
    pricing:
      chassis_price: 30000
      upfit_price: 10000
      total_price: 50000
  - id: ORD-95
    status: delivered
    priority: low
    created_at: 2025-01-10T00:00:00Z
    actual:
      final_delivery: 2025-03-27T00:00:00Z
    pricing:
      total_price: 80000
  - id: ORD-PAID
    status: delivered
    payment: paid
    created_at: 2025-04-01T00:00:00Z
    actual:
      final_delivery: 2025-06-20T00:00:00Z
    pricing:
      total_price: 99000
"#;

/// Orders still moving through the pipeline
pub const IN_FLIGHT: &str = r#"
- id: ORD-UPFIT
  status: upfit_in_progress
  priority: critical
  created_at: 2025-06-01T00:00:00Z
  planned:
    oem_transit: 2025-06-10T00:00:00Z
    upfit_completion: 2025-06-25T00:00:00Z
    final_delivery: 2025-07-05T00:00:00Z
  actual:
    oem_transit: 2025-06-12T00:00:00Z
  events:
    - to_stage: oem_allocated
      occurred_at: 2025-06-03T00:00:00Z
    - to_stage: at_upfitter
      occurred_at: 2025-06-12T00:00:00Z
- id: ORD-GONE
  status: canceled
  created_at: 2025-05-01T00:00:00Z
  events:
    - to_stage: canceled
      occurred_at: 2025-05-04T00:00:00Z
"#;
