//! Core module - pipeline definition and order analytics

pub mod cascade;
pub mod config;
pub mod days;
pub mod fleet;
pub mod forecast;
pub mod pipeline;
pub mod timeline;
pub mod variance;

pub use cascade::{CascadeAssessment, ScheduleStatus};
pub use config::{AgingConfig, AnalyticsConfig, ForecastConfig, TimelineConfig};
pub use fleet::{
    aging_report, analyze_all, on_time_summary, sla_compliance, stage_delays, AgingBucket,
    AgingReport, AnalyzedOrder, FleetAggregator, FleetReport, OnTimeSummary, SlaRow,
    StageDelayRow,
};
pub use forecast::{CreditForecast, ForecastPeriod};
pub use pipeline::{is_reached, stage_index, Milestone, OrderStatus, Stage};
pub use timeline::{
    ClampAdjustment, Reconstruction, StageRecord, Timeline, TimelineReconstructor,
    TimestampSource,
};
pub use variance::MilestoneVariances;
