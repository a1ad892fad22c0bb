//! Review statistics over a loaded flashcard collection
//!
//! This crate turns a [`cardstat_core::Collection`] into the tables of the
//! host application's statistics window, plus tab-separated datasets for
//! further analysis.
//!
//! # Overview
//!
//! ## Report Workflow
//!
//! 1. **Classify** ([`classify::Classification`]): Annotate every review and
//!    card with derived attributes (phase, accuracy eligibility, study day,
//!    status, bins) using the swappable [`classify::Rules`]
//! 2. **Stratify** ([`stratify`]): Assign each table's population to the
//!    buckets of its dimension
//! 3. **Build Tables** ([`report::build_report`]): Tally counts, percentages
//!    and summed times into [`table::Table`]s, collecting
//!    [`warning::AmbiguousRuleWarning`]s along the way
//!
//! ## Dataset Workflow
//!
//! After classification, [`dataset::cards_tsv`] and [`dataset::reviews_tsv`]
//! render one row per card and per review with the derived columns.
//!
//! # Examples
//!
//! ```no_run
//! use cardstat_analysis::{classify::Rules, config::StatsConfig, report::build_report};
//! use cardstat_core::loader::{LoadOptions, load_collection};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let collection = load_collection("cards.tsv".as_ref(), None, &LoadOptions::default())?;
//! let config = StatsConfig::default();
//! let report = build_report(&collection, &config, &Rules::new(&config))?;
//!
//! for table in &report.tables {
//!     println!("{table}");
//! }
//! for warning in &report.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod config;
pub mod dataset;
pub mod report;
pub mod stratify;
pub mod table;
pub mod warning;
