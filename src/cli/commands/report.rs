//! `fleetline report|aging|sla|forecast` commands - Fleet rollups

use console::style;
use miette::Result;

use crate::cli::args::{AsOfArg, OrderSource};
use crate::cli::commands::utils::{load_config, load_filtered_orders};
use crate::cli::helpers::{format_days, format_money, format_rate};
use crate::cli::output::{effective_format, print_structured, render_rows};
use crate::cli::table::{
    AgingTableRow, ForecastTableRow, SlaTableRow, StageDelayTableRow, StatusCountRow,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::fleet::{AgingReport, FleetAggregator, FleetReport, OnTimeSummary};
use crate::core::forecast::CreditForecast;

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: OrderSource,

    #[command(flatten)]
    pub as_of: AsOfArg,
}

/// Which slice of the fleet report to print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportView {
    Full,
    Aging,
    Sla,
    Forecast,
}

fn build_report(args: &ReportArgs, global: &GlobalOpts) -> Result<FleetReport> {
    let config = load_config(global)?;
    let orders = load_filtered_orders(&args.source)?;
    let as_of = args.as_of.resolve();
    Ok(FleetAggregator::new(&config).aggregate(&orders, as_of))
}

pub fn run(args: ReportArgs, global: &GlobalOpts, view: ReportView) -> Result<()> {
    let report = build_report(&args, global)?;
    let format = effective_format(global.output);

    match view {
        ReportView::Full => {
            if !print_structured(&report, format)? {
                print_full(&report, format);
            }
        }
        ReportView::Aging => {
            if !print_structured(&report.aging, format)? {
                print_aging(&report.aging, format);
            }
        }
        ReportView::Sla => {
            if !print_structured(&report.sla, format)? {
                let rows: Vec<SlaTableRow> = report.sla.iter().map(SlaTableRow::from).collect();
                render_rows(&rows, format);
            }
        }
        ReportView::Forecast => {
            if !print_structured(&report.forecast, format)? {
                print_forecast(&report.forecast, format);
            }
        }
    }

    Ok(())
}

fn section(title: &str, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!();
        println!("{}", style(title).bold().underlined());
    }
}

fn print_full(report: &FleetReport, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!(
            "{} {} order(s) as of {}",
            style("Fleet report:").bold(),
            style(report.order_count).cyan(),
            report.as_of.format("%Y-%m-%d")
        );
    }

    section("Orders by status", format);
    let status_rows: Vec<StatusCountRow> =
        report.status_counts.iter().map(StatusCountRow::from).collect();
    render_rows(&status_rows, format);

    section("On-time delivery", format);
    print_on_time(&report.on_time, report.total_delay_days, format);

    section("Average variance by stage", format);
    let delay_rows: Vec<StageDelayTableRow> = report
        .stage_delays
        .iter()
        .map(StageDelayTableRow::from)
        .collect();
    render_rows(&delay_rows, format);

    section("SLA compliance by priority", format);
    let sla_rows: Vec<SlaTableRow> = report.sla.iter().map(SlaTableRow::from).collect();
    render_rows(&sla_rows, format);

    section("Receivables aging", format);
    print_aging(&report.aging, format);

    section("Credit forecast", format);
    print_forecast(&report.forecast, format);

    if format == OutputFormat::Table && report.orders_with_clamps > 0 {
        println!();
        println!(
            "{} {} order(s) had out-of-order stage dates adjusted; see `fleetline timeline`",
            style("!").yellow(),
            report.orders_with_clamps
        );
    }
}

fn print_on_time(summary: &OnTimeSummary, total_delay_days: i64, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!(
            "  Rate:        {} ({} of {} delivered orders)",
            style(format_rate(Some(summary.rate))).cyan(),
            summary.on_time,
            summary.eligible
        );
        println!("  Ahead:       {}", summary.ahead);
        println!(
            "  Behind:      {} ({} masked by downstream catch-up)",
            summary.behind, summary.masked
        );
        println!("  Total delay: {} day(s)", format_days(Some(total_delay_days)));
    } else {
        let rows = vec![
            OnTimeRow::new("rate", format!("{:.4}", summary.rate)),
            OnTimeRow::new("eligible", summary.eligible.to_string()),
            OnTimeRow::new("on_time", summary.on_time.to_string()),
            OnTimeRow::new("ahead", summary.ahead.to_string()),
            OnTimeRow::new("behind", summary.behind.to_string()),
            OnTimeRow::new("masked", summary.masked.to_string()),
            OnTimeRow::new("total_delay_days", total_delay_days.to_string()),
        ];
        render_rows(&rows, format);
    }
}

#[derive(tabled::Tabled)]
struct OnTimeRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

impl OnTimeRow {
    fn new(metric: &'static str, value: String) -> Self {
        Self { metric, value }
    }
}

fn print_aging(aging: &AgingReport, format: OutputFormat) {
    let rows: Vec<AgingTableRow> = aging.rows.iter().map(AgingTableRow::from).collect();
    render_rows(&rows, format);
    if format == OutputFormat::Table {
        println!(
            "  Outstanding: {} ({} order(s) older than {} days excluded)",
            style(format_money(aging.total_outstanding)).cyan(),
            aging.excluded,
            aging.window_days
        );
    }
}

fn print_forecast(forecast: &CreditForecast, format: OutputFormat) {
    if format == OutputFormat::Table {
        println!(
            "  Starting balance {} (receivables {}, inventory {}), ceiling {}",
            format_money(forecast.starting_balance()),
            format_money(forecast.starting_receivables),
            format_money(forecast.starting_inventory),
            format_money(forecast.credit_ceiling)
        );
    }
    let rows: Vec<ForecastTableRow> = forecast.periods.iter().map(ForecastTableRow::from).collect();
    render_rows(&rows, format);
    if format == OutputFormat::Table {
        println!(
            "  Peak utilization {:.1}%. {}",
            forecast.peak_utilization(),
            style("Projection only; inflow varies within configured bounds.").dim()
        );
    }
}
