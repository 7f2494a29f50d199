//! Row types for tabular command output

use tabled::Tabled;

use crate::cli::helpers::{
    format_average, format_date, format_days, format_duration, format_money, format_rate,
};
use crate::core::fleet::{AgingRow, SlaRow, StageDelayRow, StatusCount};
use crate::core::forecast::ForecastPeriod;
use crate::core::pipeline::Stage;
use crate::core::timeline::StageRecord;

#[derive(Tabled)]
pub struct StageListRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "STAGE")]
    pub id: String,
    #[tabled(rename = "LABEL")]
    pub label: String,
    #[tabled(rename = "MILESTONE")]
    pub milestone: String,
}

impl From<Stage> for StageListRow {
    fn from(stage: Stage) -> Self {
        Self {
            index: stage.index(),
            id: stage.to_string(),
            label: stage.label().to_string(),
            milestone: stage
                .milestone()
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct TimelineRow {
    #[tabled(rename = "ORDER")]
    pub order: String,
    #[tabled(rename = "STAGE")]
    pub stage: String,
    #[tabled(rename = "DATE")]
    pub date: String,
    #[tabled(rename = "SOURCE")]
    pub source: String,
    #[tabled(rename = "DAYS")]
    pub duration: String,
    #[tabled(rename = "PLANNED")]
    pub planned: String,
    #[tabled(rename = "VARIANCE")]
    pub variance: String,
}

impl TimelineRow {
    pub fn new(order_id: &str, record: &StageRecord) -> Self {
        Self {
            order: order_id.to_string(),
            stage: record.stage.to_string(),
            date: format_date(record.timestamp),
            source: record
                .source
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            duration: format_duration(record.duration_days),
            planned: format_date(record.planned),
            variance: format_days(record.variance_days),
        }
    }
}

#[derive(Tabled)]
pub struct StatusCountRow {
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "ORDERS")]
    pub count: usize,
}

impl From<&StatusCount> for StatusCountRow {
    fn from(c: &StatusCount) -> Self {
        Self {
            status: c.status.clone(),
            count: c.count,
        }
    }
}

#[derive(Tabled)]
pub struct AgingTableRow {
    #[tabled(rename = "DAYS SINCE DELIVERY")]
    pub bucket: String,
    #[tabled(rename = "ORDERS")]
    pub orders: usize,
    #[tabled(rename = "OUTSTANDING")]
    pub amount: String,
}

impl From<&AgingRow> for AgingTableRow {
    fn from(row: &AgingRow) -> Self {
        Self {
            bucket: row.bucket.to_string(),
            orders: row.orders,
            amount: format_money(row.amount),
        }
    }
}

#[derive(Tabled)]
pub struct StageDelayTableRow {
    #[tabled(rename = "STAGE")]
    pub stage: String,
    #[tabled(rename = "SAMPLES")]
    pub samples: usize,
    #[tabled(rename = "AVG VARIANCE (DAYS)")]
    pub average: String,
}

impl From<&StageDelayRow> for StageDelayTableRow {
    fn from(row: &StageDelayRow) -> Self {
        Self {
            stage: row.stage.to_string(),
            samples: row.samples,
            average: format_average(row.average_days),
        }
    }
}

#[derive(Tabled)]
pub struct SlaTableRow {
    #[tabled(rename = "PRIORITY")]
    pub priority: String,
    #[tabled(rename = "MEASURED")]
    pub total: usize,
    #[tabled(rename = "ON/BEFORE PLAN")]
    pub compliant: usize,
    #[tabled(rename = "COMPLIANCE")]
    pub rate: String,
}

impl From<&SlaRow> for SlaTableRow {
    fn from(row: &SlaRow) -> Self {
        Self {
            priority: row.priority.to_string(),
            total: row.total,
            compliant: row.compliant,
            rate: format_rate(row.rate),
        }
    }
}

#[derive(Tabled)]
pub struct ForecastTableRow {
    #[tabled(rename = "MONTH")]
    pub month: String,
    #[tabled(rename = "OPENING")]
    pub opening: String,
    #[tabled(rename = "INFLOW")]
    pub inflow: String,
    #[tabled(rename = "COLLECTIONS")]
    pub collections: String,
    #[tabled(rename = "CLOSING")]
    pub closing: String,
    #[tabled(rename = "AVAILABLE")]
    pub available: String,
    #[tabled(rename = "UTILIZATION")]
    pub utilization: String,
}

impl From<&ForecastPeriod> for ForecastTableRow {
    fn from(p: &ForecastPeriod) -> Self {
        Self {
            month: p.month.clone(),
            opening: format_money(p.opening_balance),
            inflow: format_money(p.inflow),
            collections: format_money(p.collections),
            closing: format_money(p.closing_balance),
            available: format_money(p.available_credit),
            utilization: format!("{:.1}%", p.utilization_pct),
        }
    }
}
