//! Bucket sets for the report's dimensions
//!
//! Every table stratifies its population along one of these dimensions (or
//! the product of two). Each table filters its population to the range of
//! its bucket set first, so `unbinned` is expected to stay 0; a non-zero
//! value means a table's filter and buckets disagree and is logged.

use cardstat_core::ReviewKind;
use cardstat_stats::{
    bucket::{BucketSet, Categories, FixedWidthBins, IntegerRange},
    frequency::{FrequencyTable, WeightedTable},
};
use chrono::NaiveDate;

use crate::classify::{ButtonSubcategory, CardStatus, TimeCategory};

/// Review phases that record a study event.
#[must_use]
pub fn study_phases() -> Categories<ReviewKind> {
    Categories::new(
        ReviewKind::ALL
            .into_iter()
            .filter(|kind| kind.is_study())
            .map(|kind| (kind, kind.label())),
    )
}

#[must_use]
pub fn correctness() -> Categories<bool> {
    Categories::new([(false, "Incorrect"), (true, "Correct")])
}

#[must_use]
pub fn card_statuses() -> Categories<CardStatus> {
    Categories::new(CardStatus::ALL.map(|status| (status, status.label())))
}

#[must_use]
pub fn time_categories() -> Categories<TimeCategory> {
    Categories::new(TimeCategory::ALL.map(|category| (category, category.label())))
}

#[must_use]
pub fn button_subcategories() -> Categories<ButtonSubcategory> {
    Categories::new(ButtonSubcategory::ALL.map(|category| (category, category.label())))
}

/// Answer buttons 1 (again) to 4 (easy).
#[must_use]
pub fn buttons() -> Categories<u8> {
    Categories::from_display(1..=4)
}

#[must_use]
pub fn hours() -> IntegerRange {
    IntegerRange::new(0, 23)
}

/// The last `days` days up to today (`-days..=0`).
#[must_use]
pub fn past_days(days: i64) -> IntegerRange {
    IntegerRange::new(-days.max(0), 0)
}

/// One bucket per date from `start` to `end`, inclusive.
#[must_use]
pub fn dates(start: NaiveDate, end: NaiveDate) -> Categories<NaiveDate> {
    Categories::from_display(start.iter_days().take_while(|date| *date <= end))
}

/// 5% bins over 0-100%, the last one closed.
#[must_use]
pub fn percent_bins() -> FixedWidthBins {
    FixedWidthBins::new(0.0, 5.0, 20).closed_last().with_unit("%")
}

/// 10% ease bins spanning the observed bins, given by their lower bounds.
#[must_use]
pub fn ease_bins<I>(observed: I) -> FixedWidthBins
where
    I: IntoIterator<Item = u32>,
{
    let range = observed
        .into_iter()
        .fold(None, |range: Option<(u32, u32)>, bin| match range {
            None => Some((bin, bin)),
            Some((min, max)) => Some((min.min(bin), max.max(bin))),
        });
    let Some((min, max)) = range else {
        return FixedWidthBins::new(0.0, 10.0, 0).with_unit("%");
    };
    let count = ((max - min) / 10 + 1) as usize;
    FixedWidthBins::new(f64::from(min), 10.0, count).with_unit("%")
}

/// [`FrequencyTable::tally`], logging keys outside every bucket.
pub fn tally<B, I>(table: &str, buckets: &B, keys: I) -> FrequencyTable
where
    B: BucketSet,
    I: IntoIterator<Item = B::Key>,
{
    let frequency = FrequencyTable::tally(buckets, keys);
    if frequency.unbinned > 0 {
        tracing::warn!(table, unbinned = frequency.unbinned, "keys outside every bucket");
    }
    frequency
}

/// [`WeightedTable::sum`], logging keys outside every bucket.
pub fn sum<B, I>(table: &str, buckets: &B, entries: I) -> WeightedTable
where
    B: BucketSet,
    I: IntoIterator<Item = (B::Key, f64)>,
{
    let weighted = WeightedTable::sum(buckets, entries);
    if weighted.unbinned > 0 {
        tracing::warn!(table, unbinned = weighted.unbinned, "keys outside every bucket");
    }
    weighted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_study_phases_exclude_schedule_changes() {
        let phases = study_phases();
        assert_eq!(phases.len(), 4);
        assert_eq!(phases.index_of(&ReviewKind::Review), Some(1));
        assert_eq!(phases.index_of(&ReviewKind::Manual), None);
        assert_eq!(phases.label(1), "Reviewing");
    }

    #[test]
    fn test_past_days() {
        let days = past_days(30);
        assert_eq!(days.len(), 31);
        assert_eq!(days.label(0), "-30");
    }

    #[test]
    fn test_dates_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let dates = dates(start, end);
        assert_eq!(dates.len(), 3);
        assert_eq!(dates.label(2), "2024-01-03");
        assert!(super::dates(end, start).is_empty());
    }

    #[test]
    fn test_ease_bins_span_observed_range() {
        let bins = ease_bins([250, 130, 250, 310]);
        assert_eq!(bins.len(), 19);
        assert_eq!(bins.label(0), "[130%, 140%)");
        assert_eq!(bins.label(18), "[310%, 320%)");
        assert_eq!(bins.index_of(&250.0), Some(12));

        assert!(ease_bins([]).is_empty());
        assert_eq!(ease_bins([250]).len(), 1);
    }

    #[test]
    fn test_percent_bins() {
        let bins = percent_bins();
        assert_eq!(bins.index_of(&100.0), Some(19));
        assert_eq!(bins.label(0), "[0%, 5%)");
    }
}
