use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use fleetline::cli::commands::report::{self, ReportView};
use fleetline::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    // Diagnostics go to stderr so piped report output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("FLEETLINE_LOG")
                .unwrap_or_else(|_| EnvFilter::new("fleetline=warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Stages => fleetline::cli::commands::stages::run(global),
        Commands::Timeline(args) => fleetline::cli::commands::timeline::run(args, global),
        Commands::Report(args) => report::run(args, global, ReportView::Full),
        Commands::Aging(args) => report::run(args, global, ReportView::Aging),
        Commands::Sla(args) => report::run(args, global, ReportView::Sla),
        Commands::Forecast(args) => report::run(args, global, ReportView::Forecast),
        Commands::Completions(args) => fleetline::cli::commands::completions::run(args),
    }
}
