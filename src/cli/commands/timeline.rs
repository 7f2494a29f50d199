//! `fleetline timeline` command - Reconstructed per-stage timelines

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::args::OrderSource;
use crate::cli::commands::utils::{load_config, load_filtered_orders};
use crate::cli::helpers::{format_days, read_ids_from_stdin};
use crate::cli::output::{effective_format, print_structured, render_rows};
use crate::cli::table::TimelineRow;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cascade::{CascadeAssessment, ScheduleStatus};
use crate::core::timeline::Timeline;

#[derive(clap::Args, Debug)]
pub struct TimelineArgs {
    #[command(flatten)]
    pub source: OrderSource,

    /// Only these order IDs (repeatable; "-" reads IDs from stdin)
    #[arg(long = "order", short = 'O')]
    pub orders: Vec<String>,
}

/// Timeline plus its cascade classification, as emitted in YAML/JSON
#[derive(Serialize)]
struct TimelineView {
    #[serde(flatten)]
    timeline: Timeline,
    cascade: CascadeAssessment,
}

fn requested_ids(args: &TimelineArgs) -> Vec<String> {
    let mut ids: Vec<String> = args.orders.iter().filter(|id| *id != "-").cloned().collect();
    if args.orders.iter().any(|id| id == "-") {
        ids.extend(read_ids_from_stdin().unwrap_or_default());
    }
    ids
}

pub fn run(args: TimelineArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let mut orders = load_filtered_orders(&args.source)?;

    let ids = requested_ids(&args);
    if !ids.is_empty() {
        orders.retain(|o| ids.contains(&o.id));
        if orders.is_empty() {
            return Err(miette::miette!("No matching orders for: {}", ids.join(", ")));
        }
    }

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    let views: Vec<TimelineView> = orders
        .iter()
        .map(|order| {
            let timeline = Timeline::build(order, &config.timeline);
            let cascade = timeline.assess();
            TimelineView { timeline, cascade }
        })
        .collect();

    let format = effective_format(global.output);
    if print_structured(&views, format)? {
        return Ok(());
    }

    let rows: Vec<TimelineRow> = views
        .iter()
        .flat_map(|v| {
            v.timeline
                .stages
                .iter()
                .map(|record| TimelineRow::new(&v.timeline.order_id, record))
        })
        .collect();
    render_rows(&rows, format);

    if format == OutputFormat::Table {
        println!();
        for view in &views {
            print_summary(view);
        }
    }

    Ok(())
}

fn print_summary(view: &TimelineView) {
    let cascade = &view.cascade;
    let status = match cascade.status {
        ScheduleStatus::AheadOfSchedule => style(cascade.status.to_string()).green(),
        ScheduleStatus::OnTime => style(cascade.status.to_string()).cyan(),
        ScheduleStatus::BehindSchedule => style(cascade.status.to_string()).red(),
        ScheduleStatus::Unknown => style(cascade.status.to_string()).dim(),
    };

    print!(
        "{} {} ({}), cumulative delay {}",
        style(&view.timeline.order_id).bold(),
        status,
        view.timeline.status,
        format_days(cascade.cumulative_delay_days)
    );
    if let Some(origin) = cascade.delay_origin {
        print!(", first late at {}", origin);
    }
    if cascade.masked_delay {
        print!(" {}", style("[masked by downstream catch-up]").yellow());
    }
    println!();

    for adj in &view.timeline.adjustments {
        println!(
            "  {} {} moved {} -> {} to keep stages in order",
            style("!").yellow(),
            adj.stage,
            adj.original.format("%Y-%m-%d"),
            adj.adjusted.format("%Y-%m-%d")
        );
    }
}
