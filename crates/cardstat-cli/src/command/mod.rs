use clap::{Parser, Subcommand};

use self::{export::ExportArg, report::ReportArg};
use crate::logging;

mod export;
mod input;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug messages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Print the statistics tables
    Report(#[clap(flatten)] ReportArg),
    /// Write card and review datasets as TSV files
    Export(#[clap(flatten)] ExportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(args.verbose)?;
    match args.mode {
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Export(arg) => export::run(&arg)?,
    }
    Ok(())
}
