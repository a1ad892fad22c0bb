//! Export command
//!
//! Writes the classified collection as `cards.tsv` and `reviews.tsv`.

use std::path::PathBuf;

use cardstat_analysis::{
    classify::{Classification, Rules},
    dataset,
    report::study_clock,
};
use clap::Args;

use super::input::InputArg;
use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct ExportArg {
    #[clap(flatten)]
    pub input: InputArg,

    /// Directory to write the TSV files into
    #[arg(long)]
    pub out_dir: PathBuf,
}

pub(crate) fn run(arg: &ExportArg) -> anyhow::Result<()> {
    let (config, collection) = arg.input.load()?;
    let clock = study_clock(&collection, config.stats.resolve_now());
    let classification = Classification::new(&collection, &Rules::new(&config.stats), &clock);

    let cards = util::write_dataset(
        &arg.out_dir,
        "cards.tsv",
        &dataset::cards_tsv(&collection, &classification),
    )?;
    eprintln!("Cards saved to: {}", cards.display());
    let reviews = util::write_dataset(
        &arg.out_dir,
        "reviews.tsv",
        &dataset::reviews_tsv(&collection, &classification),
    )?;
    eprintln!("Reviews saved to: {}", reviews.display());
    Ok(())
}
