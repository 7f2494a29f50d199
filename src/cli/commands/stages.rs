//! `fleetline stages` command - Show the fulfillment pipeline

use miette::Result;

use crate::cli::output::{effective_format, print_structured, render_rows};
use crate::cli::table::StageListRow;
use crate::cli::GlobalOpts;
use crate::core::pipeline::Stage;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let format = effective_format(global.output);
    let rows: Vec<StageListRow> = Stage::ALL.into_iter().map(StageListRow::from).collect();

    if !print_structured(&Stage::ALL, format)? {
        render_rows(&rows, format);
    }
    Ok(())
}
