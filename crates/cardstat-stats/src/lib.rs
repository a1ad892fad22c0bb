//! Aggregation primitives for the cardstat report tables.
//!
//! This crate knows nothing about flashcards. It provides the building blocks
//! the table builder stratifies records with:
//!
//! - **Bucket sets**: ordered, contiguous buckets a key is assigned to
//! - **Frequency tables**: counts, percentages and running totals per bucket
//! - **Weighted tables**: summed weights (e.g. study time) per bucket
//! - **Descriptive statistics**: mean, median and spread of a sample
//!
//! # Modules
//!
//! - [`bucket`]: Bucket set definitions (categories, integer ranges, fixed-width bins)
//! - [`frequency`]: Frequency and weighted tables built over a bucket set
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//!
//! Every bucket of a bucket set is emitted, including empty ones, so that two
//! tables built with the same bucket set line up row by row.
//!
//! # Examples
//!
//! ## Counting keys into integer buckets
//!
//! ```
//! use cardstat_stats::{bucket::IntegerRange, frequency::FrequencyTable};
//!
//! let hours = [9, 9, 10, 23];
//! let table = FrequencyTable::tally(&IntegerRange::new(0, 23), hours);
//!
//! assert_eq!(table.rows.len(), 24);
//! assert_eq!(table.rows[9].count, 2);
//! assert_eq!(table.rows[9].percent, 50.0);
//! assert_eq!(table.total, 4);
//! ```
//!
//! ## Binning percentages
//!
//! ```
//! use cardstat_stats::bucket::{BucketSet, FixedWidthBins};
//!
//! let bins = FixedWidthBins::new(0.0, 5.0, 20).closed_last().with_unit("%");
//! assert_eq!(bins.index_of(&100.0), Some(19));
//! assert_eq!(bins.label(19), "[95%, 100%]");
//! assert_eq!(bins.label(0), "[0%, 5%)");
//! ```
//!
//! ## Summarizing a sample
//!
//! ```
//! use cardstat_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([4.0, 2.0, 6.0]).unwrap();
//! assert_eq!(stats.mean, 4.0);
//! assert_eq!(stats.sum, 12.0);
//! ```

pub mod bucket;
pub mod descriptive;
pub mod frequency;
