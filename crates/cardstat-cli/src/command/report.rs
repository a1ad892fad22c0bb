//! Report command
//!
//! Builds the statistics tables and prints them as aligned text or JSON.

use std::{fmt::Write as _, path::PathBuf};

use cardstat_analysis::{
    classify::Rules,
    report::{StatsReport, build_report},
    table::TableId,
};
use clap::{Args, ValueEnum};

use super::input::InputArg;
use crate::util::Output;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: Format,

    /// Tables to include (repeatable); all tables by default
    #[arg(long = "table", value_name = "ID")]
    pub tables: Vec<TableId>,

    /// Output file path (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let (config, collection) = arg.input.load()?;
    let mut report = build_report(&collection, &config.stats, &Rules::new(&config.stats))?;
    if !arg.tables.is_empty() {
        report.tables.retain(|table| arg.tables.contains(&table.id));
    }

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        Format::Text => output.write_text(&render_text(&report)?)?,
        Format::Json => output.write_json(&report)?,
    }
    Ok(())
}

fn render_text(report: &StatsReport) -> anyhow::Result<String> {
    let mut text = String::new();
    for table in &report.tables {
        writeln!(text, "{table}")?;
    }
    if !report.warnings.is_empty() {
        text.push_str("Warnings\n");
        for warning in &report.warnings {
            writeln!(text, "- {warning}")?;
        }
    }
    Ok(text)
}
