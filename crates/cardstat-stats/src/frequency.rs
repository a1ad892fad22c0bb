//! Frequency and weighted tables over a bucket set
//!
//! A [`FrequencyTable`] counts keys per bucket and derives percentages and
//! running totals. A [`WeightedTable`] sums a weight per bucket instead.
//! Both emit one row per bucket of the bucket set, in bucket order, including
//! buckets no key fell into.
//!
//! Keys that fall outside every bucket are not dropped silently: they are
//! counted in `unbinned` so callers can detect a mismatch between the
//! population they filtered and the bucket set they chose.

use crate::bucket::BucketSet;

/// A single row of a frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    /// Bucket label.
    pub label: String,
    /// Number of keys in this bucket.
    pub count: u64,
    /// `count / total * 100`, or 0 when the table is empty.
    pub percent: f64,
    /// Running total of `count` up to and including this row.
    pub cumulative_count: u64,
    /// `cumulative_count / total * 100`, or 0 when the table is empty.
    pub cumulative_percent: f64,
}

/// Counts per bucket with percentages and running totals.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    /// One row per bucket, in bucket order.
    pub rows: Vec<FrequencyRow>,
    /// Number of keys assigned to a bucket; the denominator of every
    /// percentage.
    pub total: u64,
    /// Number of keys outside every bucket.
    pub unbinned: u64,
}

impl FrequencyTable {
    /// Counts `keys` into `buckets`.
    ///
    /// Percentages are taken over the binned keys, so the caller's filter
    /// defines the population.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardstat_stats::{bucket::Categories, frequency::FrequencyTable};
    ///
    /// let buckets = Categories::new([(true, "Correct"), (false, "Incorrect")]);
    /// let table = FrequencyTable::tally(&buckets, [true, false, true, true]);
    ///
    /// assert_eq!(table.rows[0].count, 3);
    /// assert_eq!(table.rows[0].percent, 75.0);
    /// assert_eq!(table.rows[1].cumulative_count, 4);
    /// assert_eq!(table.rows[1].cumulative_percent, 100.0);
    /// ```
    #[must_use]
    pub fn tally<B, I>(buckets: &B, keys: I) -> Self
    where
        B: BucketSet,
        I: IntoIterator<Item = B::Key>,
    {
        let mut counts = vec![0_u64; buckets.len()];
        let mut unbinned = 0;
        for key in keys {
            match buckets.index_of(&key) {
                Some(index) => counts[index] += 1,
                None => unbinned += 1,
            }
        }

        let total = counts.iter().sum::<u64>();

        let mut cumulative_count = 0;
        let rows = counts
            .into_iter()
            .enumerate()
            .map(|(index, count)| {
                cumulative_count += count;
                FrequencyRow {
                    label: buckets.label(index),
                    count,
                    percent: percent(count, total),
                    cumulative_count,
                    cumulative_percent: percent(cumulative_count, total),
                }
            })
            .collect();

        Self {
            rows,
            total,
            unbinned,
        }
    }
}

/// A single row of a weighted table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRow {
    /// Bucket label.
    pub label: String,
    /// Number of keys in this bucket.
    pub count: u64,
    /// Sum of the weights of the keys in this bucket.
    pub sum: f64,
}

/// Summed weights per bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable {
    /// One row per bucket, in bucket order.
    pub rows: Vec<WeightedRow>,
    /// Sum of all binned weights.
    pub total: f64,
    /// Number of keys outside every bucket.
    pub unbinned: u64,
}

impl WeightedTable {
    /// Sums the weights of `entries` per bucket of `buckets`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cardstat_stats::{bucket::IntegerRange, frequency::WeightedTable};
    ///
    /// let table = WeightedTable::sum(&IntegerRange::new(-1, 0), [(0, 1.5), (0, 2.0), (-1, 0.5)]);
    /// assert_eq!(table.rows[1].sum, 3.5);
    /// assert_eq!(table.rows[1].count, 2);
    /// assert_eq!(table.total, 4.0);
    /// ```
    #[must_use]
    pub fn sum<B, I>(buckets: &B, entries: I) -> Self
    where
        B: BucketSet,
        I: IntoIterator<Item = (B::Key, f64)>,
    {
        let mut counts = vec![0_u64; buckets.len()];
        let mut sums = vec![0.0_f64; buckets.len()];
        let mut unbinned = 0;
        for (key, weight) in entries {
            match buckets.index_of(&key) {
                Some(index) => {
                    counts[index] += 1;
                    sums[index] += weight;
                }
                None => unbinned += 1,
            }
        }

        let total = sums.iter().sum::<f64>();
        let rows = counts
            .into_iter()
            .zip(sums)
            .enumerate()
            .map(|(index, (count, sum))| WeightedRow {
                label: buckets.label(index),
                count,
                sum,
            })
            .collect();

        Self {
            rows,
            total,
            unbinned,
        }
    }
}

/// Percentage of `count` in `total`, or 0 when `total` is 0.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
