//! Bucket sets for stratifying records
//!
//! A bucket set is an ordered sequence of buckets plus a rule assigning a key
//! to at most one of them. Buckets are contiguous and, for numeric keys,
//! half-open (`[start, end)`), so a key on a boundary always belongs to the
//! upper bucket.
//!
//! Three kinds of bucket sets are provided:
//!
//! - [`Categories`]: an explicit, ordered list of category keys with labels
//! - [`IntegerRange`]: one bucket per integer in an inclusive range
//! - [`FixedWidthBins`]: fixed-width float bins, optionally closing the last bin
//!
//! [`Product`] combines two bucket sets into a cross tabulation.
//!
//! # Examples
//!
//! ```
//! use cardstat_stats::bucket::{BucketSet, Categories};
//!
//! let phases = Categories::new([("learn", "Learning"), ("review", "Review")]);
//! assert_eq!(phases.len(), 2);
//! assert_eq!(phases.index_of(&"review"), Some(1));
//! assert_eq!(phases.index_of(&"other"), None);
//! assert_eq!(phases.label(0), "Learning");
//! ```

use std::{collections::BTreeMap, fmt};

/// An ordered set of buckets that keys can be assigned to.
pub trait BucketSet {
    /// The type of key assigned to buckets.
    type Key;

    /// Number of buckets in the set.
    fn len(&self) -> usize;

    /// Returns `true` if the set has no buckets.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the bucket containing `key`, or `None` if no bucket contains it.
    fn index_of(&self, key: &Self::Key) -> Option<usize>;

    /// Display label of the bucket at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn label(&self, index: usize) -> String;
}

/// Explicit ordered categories.
///
/// Each category is a key with a display label. Bucket order is the order in
/// which categories were given. If the same key is given twice, the first
/// occurrence wins.
#[derive(Debug, Clone)]
pub struct Categories<K> {
    index: BTreeMap<K, usize>,
    labels: Vec<String>,
}

impl<K> Categories<K>
where
    K: Ord,
{
    /// Creates categories from `(key, label)` pairs in bucket order.
    pub fn new<I, L>(categories: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        L: Into<String>,
    {
        let mut index = BTreeMap::new();
        let mut labels = Vec::new();
        for (key, label) in categories {
            if index.contains_key(&key) {
                continue;
            }
            index.insert(key, labels.len());
            labels.push(label.into());
        }
        Self { index, labels }
    }

    /// Creates categories labelled by the keys' `Display` output.
    pub fn from_display<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: fmt::Display,
    {
        Self::new(keys.into_iter().map(|key| {
            let label = key.to_string();
            (key, label)
        }))
    }
}

impl<K> BucketSet for Categories<K>
where
    K: Ord,
{
    type Key = K;

    fn len(&self) -> usize {
        self.labels.len()
    }

    fn index_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn label(&self, index: usize) -> String {
        self.labels[index].clone()
    }
}

/// One bucket per integer in `start..=end`.
///
/// An empty range (`start > end`) has no buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerRange {
    start: i64,
    end: i64,
}

impl IntegerRange {
    /// Creates buckets for every integer from `start` to `end`, inclusive.
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// First bucket value.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    /// Last bucket value (inclusive).
    #[must_use]
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Key of the bucket at `index`.
    #[expect(clippy::cast_possible_wrap)]
    #[must_use]
    pub const fn value(&self, index: usize) -> i64 {
        self.start + index as i64
    }
}

impl BucketSet for IntegerRange {
    type Key = i64;

    /// Saturates at `usize::MAX` for ranges wider than the address space.
    fn len(&self) -> usize {
        if self.start > self.end {
            return 0;
        }
        self.end
            .checked_sub(self.start)
            .and_then(|span| span.checked_add(1))
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or(usize::MAX)
    }

    fn index_of(&self, key: &i64) -> Option<usize> {
        if !(self.start..=self.end).contains(key) {
            return None;
        }
        key.checked_sub(self.start)
            .and_then(|offset| usize::try_from(offset).ok())
    }

    fn label(&self, index: usize) -> String {
        assert!(index < self.len(), "bucket index out of bounds");
        self.value(index).to_string()
    }
}

/// Fixed-width, half-open float bins.
///
/// Bin `i` covers `[start + i * width, start + (i + 1) * width)`. When the
/// last bin is closed (see [`FixedWidthBins::closed_last`]), it also contains
/// its upper bound, which is how percentage scales ending at 100% are binned.
/// Non-finite keys never fall into a bin.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWidthBins {
    start: f64,
    width: f64,
    count: usize,
    close_last: bool,
    unit: &'static str,
}

impl FixedWidthBins {
    /// Creates `count` bins of `width` starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not a positive finite number.
    #[must_use]
    pub fn new(start: f64, width: f64, count: usize) -> Self {
        assert!(
            width.is_finite() && width > 0.0,
            "bin width must be positive"
        );
        Self {
            start,
            width,
            count,
            close_last: false,
            unit: "",
        }
    }

    /// Makes the last bin include its upper bound.
    #[must_use]
    pub fn closed_last(mut self) -> Self {
        self.close_last = true;
        self
    }

    /// Appends `unit` to both bounds in bin labels.
    #[must_use]
    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = unit;
        self
    }

    /// Lower bound of bin `index`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn lower_bound(&self, index: usize) -> f64 {
        self.start + self.width * index as f64
    }

    /// Upper bound of the last bin.
    #[must_use]
    pub fn upper_bound(&self) -> f64 {
        self.lower_bound(self.count)
    }
}

impl BucketSet for FixedWidthBins {
    type Key = f64;

    fn len(&self) -> usize {
        self.count
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn index_of(&self, key: &f64) -> Option<usize> {
        let key = *key;
        if !key.is_finite() || self.count == 0 {
            return None;
        }
        let position = (key - self.start) / self.width;
        if position < 0.0 {
            return None;
        }
        let index = position.floor() as usize;
        if index < self.count {
            Some(index)
        } else if self.close_last && key <= self.upper_bound() {
            Some(self.count - 1)
        } else {
            None
        }
    }

    fn label(&self, index: usize) -> String {
        assert!(index < self.count, "bucket index out of bounds");
        let lower = self.lower_bound(index);
        let upper = self.lower_bound(index + 1);
        let unit = self.unit;
        if self.close_last && index == self.count - 1 {
            format!("[{lower}{unit}, {upper}{unit}]")
        } else {
            format!("[{lower}{unit}, {upper}{unit})")
        }
    }
}

/// Cross product of two bucket sets, in row-major order.
///
/// The bucket at index `i` pairs row bucket `i / columns.len()` with column
/// bucket `i % columns.len()`.
#[derive(Debug, Clone)]
pub struct Product<R, C> {
    rows: R,
    columns: C,
}

impl<R, C> Product<R, C>
where
    R: BucketSet,
    C: BucketSet,
{
    #[must_use]
    pub fn new(rows: R, columns: C) -> Self {
        Self { rows, columns }
    }

    #[must_use]
    pub fn rows(&self) -> &R {
        &self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &C {
        &self.columns
    }

    /// Row and column index of the bucket at `index`.
    #[must_use]
    pub fn split(&self, index: usize) -> (usize, usize) {
        let width = self.columns.len();
        (index / width, index % width)
    }
}

impl<R, C> BucketSet for Product<R, C>
where
    R: BucketSet,
    C: BucketSet,
{
    type Key = (R::Key, C::Key);

    fn len(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    fn index_of(&self, (row, column): &Self::Key) -> Option<usize> {
        let row = self.rows.index_of(row)?;
        let column = self.columns.index_of(column)?;
        Some(row * self.columns.len() + column)
    }

    fn label(&self, index: usize) -> String {
        let (row, column) = self.split(index);
        format!("{} / {}", self.rows.label(row), self.columns.label(column))
    }
}
