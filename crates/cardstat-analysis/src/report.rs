//! Report assembly
//!
//! [`build_report`] is the pipeline entry point: it classifies the
//! collection, stratifies each table's population and assembles the tables
//! in [`TableId::ALL`] order.
//!
//! Retrospective tables (built from reviews) skip reviews excluded by the
//! exclusion rule as well as manual and rescheduling entries. Card tables
//! skip excluded cards.

use cardstat_core::{CardRecord, CardType, Collection, DayClock, ReviewRecord, StudyCalendar};
use cardstat_stats::{
    bucket::{BucketSet, Categories, FixedWidthBins, IntegerRange, Product},
    descriptive::DescriptiveStats,
    frequency::{FrequencyTable, WeightedTable, percent},
};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::{
    classify::{CardClass, Classification, ReviewClass, Rules},
    config::{InvalidConfig, StatsConfig},
    stratify,
    table::{Cell, Table, TableId},
    warning::AmbiguousRuleWarning,
};

/// Periods of the true-retention table as inclusive relative-day ranges;
/// `None` covers all history.
const RETENTION_PERIODS: [(&str, Option<(i64, i64)>); 6] = [
    ("Today", Some((0, 0))),
    ("Yesterday", Some((-1, -1))),
    ("Last week", Some((-6, 0))),
    ("Last month", Some((-29, 0))),
    ("Last year", Some((-364, 0))),
    ("All time", None),
];

const FREQUENCY_COLUMNS: [&str; 4] = ["Count", "Percent", "Cum Count", "Cum Percent"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub generated_at: DateTime<FixedOffset>,
    pub tables: Vec<Table>,
    pub warnings: Vec<AmbiguousRuleWarning>,
}

impl StatsReport {
    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|table| table.id == id)
    }
}

/// Builds every table of the report.
///
/// # Errors
///
/// Returns [`InvalidConfig`] when a day count of `config` is out of range.
pub fn build_report(
    collection: &Collection,
    config: &StatsConfig,
    rules: &Rules,
) -> Result<StatsReport, InvalidConfig> {
    config.validate()?;
    let now = config.resolve_now();
    let clock = study_clock(collection, now);
    let classification = Classification::new(collection, rules, &clock);

    let builder = TableBuilder {
        collection,
        classification: &classification,
        config,
        clock: &clock,
    };
    let tables = TableId::ALL
        .into_iter()
        .map(|id| builder.build(id))
        .collect::<Vec<_>>();
    tracing::debug!(tables = tables.len(), "built report");

    Ok(StatsReport {
        generated_at: now,
        tables,
        warnings: classification.warnings,
    })
}

/// Clock placing the collection's reviews on study days as seen at `now`.
#[must_use]
pub fn study_clock(collection: &Collection, now: DateTime<FixedOffset>) -> DayClock {
    let calendar = StudyCalendar::new(*now.offset(), collection.info.rollover_hour);
    DayClock::new(calendar, now.to_utc())
}

/// Builds tables from a classified collection.
#[derive(Debug, Clone, Copy)]
pub struct TableBuilder<'a> {
    pub collection: &'a Collection,
    pub classification: &'a Classification,
    pub config: &'a StatsConfig,
    pub clock: &'a DayClock,
}

impl<'a> TableBuilder<'a> {
    #[must_use]
    pub fn build(&self, id: TableId) -> Table {
        match id {
            TableId::Today => self.today(),
            TableId::TodayCorrect => self.today_correct(id, false),
            TableId::TodayCorrectMature => self.today_correct(id, true),
            TableId::FutureDue => self.future_due(),
            TableId::FutureDueByTemplate => self.future_due_by_template(),
            TableId::Calendar => self.calendar(),
            TableId::ReviewCounts => self.review_counts(),
            TableId::ReviewTime => self.review_time(),
            TableId::ReviewTimeByType => self.review_time_by_type(),
            TableId::CardCounts => self.card_counts(),
            TableId::Intervals => self.intervals(),
            TableId::Ease => self.ease(),
            TableId::Stability => self.stability(),
            TableId::Difficulty => self.difficulty(),
            TableId::Retrievability => self.retrievability(),
            TableId::Hourly => self.hourly(),
            TableId::AnswerButtons => self.answer_buttons(),
            TableId::Added => self.added(),
            TableId::TrueRetention => self.true_retention(),
        }
    }

    fn reviews(&self) -> impl Iterator<Item = (&'a ReviewRecord, &'a ReviewClass)> + use<'a> {
        self.collection
            .reviews
            .iter()
            .zip(&self.classification.reviews)
            .filter(|(_, class)| class.is_retrospective())
    }

    fn cards(&self) -> impl Iterator<Item = (&'a CardRecord, &'a CardClass)> + use<'a> {
        self.collection
            .cards
            .iter()
            .zip(&self.classification.cards)
            .filter(|(_, class)| !class.excluded)
    }

    fn recent_reviews(
        &self,
        days: i64,
    ) -> impl Iterator<Item = (&'a ReviewRecord, &'a ReviewClass)> + use<'a> {
        let range = stratify::past_days(days);
        self.reviews()
            .filter(move |(_, class)| range.index_of(&class.relative_day).is_some())
    }

    fn today(&self) -> Table {
        let id = TableId::Today;
        let today = self
            .reviews()
            .filter(|(_, class)| class.relative_day == 0)
            .collect::<Vec<_>>();
        let frequency = stratify::tally(
            id.as_str(),
            &stratify::study_phases(),
            today.iter().map(|(_, class)| class.phase_at_review),
        );
        let mut table = frequency_table(id, "Type", &frequency);

        #[expect(clippy::cast_precision_loss)]
        let seconds = today
            .iter()
            .map(|(review, _)| review.taken_millis as f64 / 1000.0);
        match DescriptiveStats::new(seconds) {
            Some(stats) => table.notes.push(format!(
                "Studied {} cards in {:.2} minutes today ({:.2}s/card, median {:.2}s)",
                stats.count,
                stats.sum / 60.0,
                stats.mean,
                stats.median
            )),
            None => table.notes.push("No cards have been studied today.".to_owned()),
        }
        table
    }

    fn today_correct(&self, id: TableId, mature_only: bool) -> Table {
        let keys = self
            .reviews()
            .filter(|(review, class)| {
                class.relative_day == 0 && (!mature_only || review.is_mature())
            })
            .filter_map(|(_, class)| class.correct);
        let frequency = stratify::tally(id.as_str(), &stratify::correctness(), keys);
        frequency_table(id, "Answer", &frequency)
    }

    fn future_due(&self) -> Table {
        let id = TableId::FutureDue;
        let days = IntegerRange::new(0, self.config.future_due_days.max(0));
        let keys = self
            .cards()
            .filter(|(card, class)| {
                card.card_type != CardType::New
                    && !card.queue.is_suspended()
                    && !(card.queue.is_buried() && class.due_days <= 0)
            })
            .map(|(_, class)| class.due_days)
            .filter(|due| days.index_of(due).is_some());
        let frequency = stratify::tally(id.as_str(), &days, keys);
        frequency_table(id, "Due In Days", &frequency)
    }

    /// Unlike `future-due`, suspended and buried cards are kept.
    fn future_due_by_template(&self) -> Table {
        let id = TableId::FutureDueByTemplate;
        let days = IntegerRange::new(0, self.config.future_due_days.max(0));
        let scheduled = self
            .cards()
            .filter(|(card, class)| {
                card.card_type != CardType::New && days.index_of(&class.due_days).is_some()
            })
            .collect::<Vec<_>>();
        // templates in order of first appearance
        let templates =
            Categories::from_display(scheduled.iter().map(|(card, _)| card.template.clone()));
        let buckets = Product::new(days, templates);
        let keys = scheduled
            .iter()
            .map(|(card, class)| (class.due_days, card.template.clone()));
        let frequency = stratify::tally(id.as_str(), &buckets, keys);

        let templates = buckets.columns();
        let width = templates.len();
        let mut table = Table::new(
            id,
            ["Due In Days".to_owned()]
                .into_iter()
                .chain((0..width).map(|i| templates.label(i)))
                .chain(["Total".to_owned()]),
        );
        for day in 0..buckets.rows().len() {
            let row = &frequency.rows[day * width..(day + 1) * width];
            let mut cells = vec![Cell::Text(buckets.rows().label(day))];
            cells.extend(row.iter().map(|cell| Cell::Count(cell.count)));
            cells.push(Cell::Count(row.iter().map(|cell| cell.count).sum()));
            table.rows.push(cells);
        }
        table.notes.push(format!("Total: {}", frequency.total));
        table
    }

    fn calendar(&self) -> Table {
        let id = TableId::Calendar;
        let today = self.clock.today();
        let start = NaiveDate::from_yo_opt(today.year(), 1).unwrap_or(today);
        let dates = stratify::dates(start, today);
        let keys = self
            .reviews()
            .map(|(_, class)| class.study_date)
            .filter(|date| (start..=today).contains(date));
        let frequency = stratify::tally(id.as_str(), &dates, keys);
        frequency_table(id, "Date", &frequency)
    }

    fn review_counts(&self) -> Table {
        let id = TableId::ReviewCounts;
        let days = self.config.review_days;
        let keys = self.recent_reviews(days).map(|(_, class)| class.relative_day);
        let frequency = stratify::tally(id.as_str(), &stratify::past_days(days), keys);
        frequency_table(id, "Day", &frequency)
    }

    fn review_time(&self) -> Table {
        let id = TableId::ReviewTime;
        let days = self.config.review_days;
        let entries = self
            .recent_reviews(days)
            .map(|(review, class)| (class.relative_day, review.taken_hours()));
        let weighted = stratify::sum(id.as_str(), &stratify::past_days(days), entries);
        weighted_table(id, "Day", &weighted)
    }

    fn review_time_by_type(&self) -> Table {
        let id = TableId::ReviewTimeByType;
        let days = self.config.review_days;
        let buckets = Product::new(stratify::past_days(days), stratify::time_categories());
        let entries = self.recent_reviews(days).filter_map(|(review, class)| {
            class
                .time_category
                .map(|category| ((class.relative_day, category), review.taken_hours()))
        });
        let weighted = stratify::sum(id.as_str(), &buckets, entries);

        let categories = buckets.columns();
        let mut table = Table::new(
            id,
            ["Day".to_owned()]
                .into_iter()
                .chain((0..categories.len()).map(|i| categories.label(i)))
                .chain(["Total".to_owned()]),
        );
        for (day, row) in weighted.rows.chunks(categories.len().max(1)).enumerate() {
            let mut cells = vec![Cell::Text(buckets.rows().label(day))];
            cells.extend(row.iter().map(|cell| Cell::Hours(cell.sum)));
            cells.push(Cell::Hours(row.iter().map(|cell| cell.sum).sum()));
            table.rows.push(cells);
        }
        table
            .notes
            .push(format!("Total: {}", Cell::Hours(weighted.total)));
        table
    }

    fn card_counts(&self) -> Table {
        let id = TableId::CardCounts;
        let keys = self.cards().map(|(_, class)| class.status);
        let frequency = stratify::tally(id.as_str(), &stratify::card_statuses(), keys);
        frequency_table(id, "Status", &frequency)
    }

    fn intervals(&self) -> Table {
        let id = TableId::Intervals;
        let days = IntegerRange::new(0, 31);
        let keys = self
            .cards()
            .filter(|(card, _)| in_review(card))
            .map(|(card, _)| card.interval)
            .filter(|interval| days.index_of(interval).is_some());
        let frequency = stratify::tally(id.as_str(), &days, keys);
        frequency_table(id, "Interval (days)", &frequency)
    }

    fn ease(&self) -> Table {
        let id = TableId::Ease;
        let observed = self
            .cards()
            .filter(|(card, _)| in_review(card))
            .filter_map(|(_, class)| class.ease_bin)
            .collect::<Vec<_>>();
        let bins = stratify::ease_bins(observed.iter().copied());
        let keys = observed.into_iter().map(f64::from);
        let frequency = stratify::tally(id.as_str(), &bins, keys);
        frequency_table(id, "Ease", &frequency)
    }

    fn stability(&self) -> Table {
        let id = TableId::Stability;
        let days = IntegerRange::new(0, 30);
        let keys = self
            .cards()
            .filter_map(|(_, class)| class.stability_days)
            .filter(|days_| days.index_of(days_).is_some());
        let frequency = stratify::tally(id.as_str(), &days, keys);
        frequency_table(id, "Stability (days)", &frequency)
    }

    fn difficulty(&self) -> Table {
        let id = TableId::Difficulty;
        let keys = self.cards().filter_map(|(_, class)| class.scaled_difficulty);
        percent_table(id, "Difficulty", keys)
    }

    fn retrievability(&self) -> Table {
        let id = TableId::Retrievability;
        let keys = self
            .cards()
            .filter(|(_, class)| class.scaled_difficulty.is_some())
            .filter_map(|(_, class)| class.retrievability)
            .map(|r| r * 100.0);
        percent_table(id, "Retrievability", keys)
    }

    fn hourly(&self) -> Table {
        let id = TableId::Hourly;
        let window = self.config.hourly_days.map(stratify::past_days);
        let population = self
            .reviews()
            .filter(|(review, _)| !review.in_filtered_deck())
            .filter(|(_, class)| {
                window
                    .as_ref()
                    .is_none_or(|range| range.index_of(&class.relative_day).is_some())
            })
            .map(|(_, class)| class)
            .collect::<Vec<_>>();
        let hours = stratify::hours();
        let frequency = stratify::tally(
            id.as_str(),
            &hours,
            population.iter().map(|class| i64::from(class.local_hour)),
        );
        let answered = FrequencyTable::tally(
            &hours,
            population
                .iter()
                .filter(|class| class.correct.is_some())
                .map(|class| i64::from(class.local_hour)),
        );
        let correct = FrequencyTable::tally(
            &hours,
            population
                .iter()
                .filter(|class| class.correct == Some(true))
                .map(|class| i64::from(class.local_hour)),
        );

        let mut table = Table::new(id, ["Hour", "Count", "Percent", "Correct"]);
        let rows = frequency.rows.iter().zip(&answered.rows).zip(&correct.rows);
        for ((row, answered), correct) in rows {
            table.rows.push(vec![
                Cell::text(&row.label),
                Cell::Count(row.count),
                Cell::Percent(Some(row.percent)),
                ratio(correct.count, answered.count),
            ]);
        }
        table
    }

    fn answer_buttons(&self) -> Table {
        let id = TableId::AnswerButtons;
        let buckets = Product::new(stratify::button_subcategories(), stratify::buttons());
        let keys = self.reviews().filter_map(|(review, class)| {
            review.button.map(|button| (class.subcategory, button))
        });
        let frequency = stratify::tally(id.as_str(), &buckets, keys);

        let buttons = buckets.columns();
        let mut table = Table::new(
            id,
            ["Type".to_owned()]
                .into_iter()
                .chain((0..buttons.len()).map(|i| buttons.label(i)))
                .chain(["Total".to_owned(), "Correct".to_owned()]),
        );
        for (category, row) in frequency.rows.chunks(buttons.len()).enumerate() {
            let total = row.iter().map(|cell| cell.count).sum::<u64>();
            let again = row.first().map_or(0, |cell| cell.count);
            let mut cells = vec![Cell::Text(buckets.rows().label(category))];
            cells.extend(row.iter().map(|cell| Cell::Count(cell.count)));
            cells.push(Cell::Count(total));
            cells.push(ratio(total - again, total));
            table.rows.push(cells);
        }
        table
    }

    fn added(&self) -> Table {
        let id = TableId::Added;
        let days = stratify::past_days(self.config.added_days);
        let keys = self
            .cards()
            .map(|(_, class)| class.added_days)
            .filter(|added| days.index_of(added).is_some());
        let frequency = stratify::tally(id.as_str(), &days, keys);
        frequency_table(id, "Day", &frequency)
    }

    fn true_retention(&self) -> Table {
        let population = self
            .reviews()
            .filter(|(_, class)| class.counts_for_accuracy)
            .map(|(_, class)| class)
            .collect::<Vec<&ReviewClass>>();

        let mut table = Table::new(
            TableId::TrueRetention,
            ["Period", "Young", "Mature", "Total", "Count"],
        );
        for (label, range) in RETENTION_PERIODS {
            let in_period = population
                .iter()
                .copied()
                .filter(|class| {
                    range.is_none_or(|(start, end)| (start..=end).contains(&class.relative_day))
                })
                .collect::<Vec<&ReviewClass>>();
            let young = in_period.iter().filter(|class| class.maturity.is_young());
            let mature = in_period.iter().filter(|class| class.maturity.is_mature());
            table.rows.push(vec![
                Cell::text(label),
                percent_correct(young.copied()),
                percent_correct(mature.copied()),
                percent_correct(in_period.iter().copied()),
                Cell::Count(in_period.len() as u64),
            ]);
        }
        table
    }
}

fn in_review(card: &CardRecord) -> bool {
    matches!(card.card_type, CardType::Review | CardType::Relearning)
}

fn frequency_table(id: TableId, dimension: &str, frequency: &FrequencyTable) -> Table {
    let mut table = Table::new(
        id,
        std::iter::once(dimension).chain(FREQUENCY_COLUMNS.iter().copied()),
    );
    for row in &frequency.rows {
        table.rows.push(vec![
            Cell::text(&row.label),
            Cell::Count(row.count),
            Cell::Percent(Some(row.percent)),
            Cell::Count(row.cumulative_count),
            Cell::Percent(Some(row.cumulative_percent)),
        ]);
    }
    table.notes.push(format!("Total: {}", frequency.total));
    table
}

fn weighted_table(id: TableId, dimension: &str, weighted: &WeightedTable) -> Table {
    let mut table = Table::new(id, [dimension, "Count", "Time"]);
    for row in &weighted.rows {
        table.rows.push(vec![
            Cell::text(&row.label),
            Cell::Count(row.count),
            Cell::Hours(row.sum),
        ]);
    }
    table
        .notes
        .push(format!("Total: {}", Cell::Hours(weighted.total)));
    table
}

fn percent_table<I>(id: TableId, dimension: &str, keys: I) -> Table
where
    I: IntoIterator<Item = f64>,
{
    let bins: FixedWidthBins = stratify::percent_bins();
    let frequency = stratify::tally(id.as_str(), &bins, keys);
    frequency_table(id, dimension, &frequency)
}

fn ratio(count: u64, total: u64) -> Cell {
    Cell::Percent((total > 0).then(|| percent(count, total)))
}

fn percent_correct<'c, I>(classes: I) -> Cell
where
    I: IntoIterator<Item = &'c ReviewClass>,
{
    let (answered, correct) = classes
        .into_iter()
        .filter_map(|class| class.correct)
        .fold((0, 0), |(answered, correct), is_correct| {
            (answered + 1, correct + u64::from(is_correct))
        });
    ratio(correct, answered)
}

#[cfg(test)]
mod tests {
    use cardstat_core::{CardQueue, CollectionInfo, Removal, ReviewKind};
    use chrono::{Offset, TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::classify::test_util::{card, now, on_day, review};

    fn config() -> StatsConfig {
        StatsConfig {
            now: Some(now().with_timezone(&Utc.fix())),
            ..StatsConfig::default()
        }
    }

    fn collection(cards: Vec<CardRecord>, reviews: Vec<ReviewRecord>) -> Collection {
        let calendar = StudyCalendar::new(Utc.fix(), 4);
        Collection::new(CollectionInfo::default(), cards, reviews, &calendar).unwrap()
    }

    fn report(collection: &Collection) -> StatsReport {
        build_report(collection, &config(), &Rules::default()).unwrap()
    }

    fn count(table: &Table, label: &str) -> u64 {
        let row = table
            .rows
            .iter()
            .find(|row| row[0] == Cell::text(label))
            .unwrap_or_else(|| panic!("no row {label} in {}", table.id));
        match row[1] {
            Cell::Count(count) => count,
            ref cell => panic!("unexpected cell {cell:?}"),
        }
    }

    fn reviewed_at(mut review: ReviewRecord, at: DateTime<Utc>) -> ReviewRecord {
        review.reviewed_at = at;
        review.id = at.timestamp_millis();
        review
    }

    fn retention_row(table: &Table, period: &str) -> Vec<Cell> {
        table
            .rows
            .iter()
            .find(|row| row[0] == Cell::text(period))
            .unwrap()
            .clone()
    }

    #[test]
    fn test_accuracy_scenario() {
        let collection = collection(
            vec![card(1), card(2), card(3)],
            vec![
                review(1, 0, ReviewKind::Learning, 3),
                review(2, 0, ReviewKind::Review, 3),
                review(3, 0, ReviewKind::Review, 1),
            ],
        );
        let report = report(&collection);

        let today = report.table(TableId::Today).unwrap();
        assert_eq!(count(today, "Learning"), 1);
        assert_eq!(count(today, "Reviewing"), 2);
        assert_eq!(count(today, "Relearning"), 0);

        let retention = report.table(TableId::TrueRetention).unwrap();
        let row = retention_row(retention, "Today");
        assert_eq!(row[3], Cell::Percent(Some(50.0)));
        assert_eq!(row[4], Cell::Count(2));
        assert_eq!(row[1], Cell::Percent(Some(50.0)));
        assert_eq!(row[2], Cell::Percent(None));
        let yesterday = retention_row(retention, "Yesterday");
        assert_eq!(yesterday[3], Cell::Percent(None));
        assert_eq!(yesterday[4], Cell::Count(0));
    }

    #[test]
    fn test_removed_card_is_excluded_from_retrospective_tables() {
        let mut removed = card(2);
        removed.removal = Some(Removal::Deleted);
        let collection = collection(
            vec![card(1), removed],
            vec![
                review(1, 0, ReviewKind::Review, 3),
                review(2, -1, ReviewKind::Review, 3),
            ],
        );
        let report = report(&collection);

        assert_eq!(count(report.table(TableId::Today).unwrap(), "Reviewing"), 1);
        assert_eq!(count(report.table(TableId::ReviewCounts).unwrap(), "-1"), 0);
        assert_eq!(count(report.table(TableId::CardCounts).unwrap(), "Young"), 1);
        let retention = report.table(TableId::TrueRetention).unwrap();
        assert_eq!(retention_row(retention, "All time")[4], Cell::Count(1));
    }

    #[test]
    fn test_empty_collection_emits_every_table() {
        let report = report(&Collection::empty());
        assert_eq!(report.tables.len(), TableId::ALL.len());
        for table in &report.tables {
            for row in &table.rows {
                for cell in &row[1..] {
                    match cell {
                        Cell::Count(count) => assert_eq!(*count, 0, "{}", table.id),
                        Cell::Percent(Some(p)) => assert_eq!(*p, 0.0, "{}", table.id),
                        Cell::Hours(h) => assert_eq!(*h, 0.0, "{}", table.id),
                        Cell::Percent(None) | Cell::Text(_) => {}
                    }
                }
            }
        }
        assert_eq!(report.table(TableId::ReviewCounts).unwrap().rows.len(), 31);
        assert_eq!(report.table(TableId::Hourly).unwrap().rows.len(), 24);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_report_is_idempotent() {
        let collection = collection(
            vec![card(1), card(2)],
            vec![
                review(1, -3, ReviewKind::Learning, 1),
                review(1, 0, ReviewKind::Review, 3),
                review(2, -2, ReviewKind::Filtered, 4),
            ],
        );
        let first = report(&collection);
        let second = report(&collection);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_frequency_counts_sum_to_total() {
        let collection = collection(
            vec![card(1), card(2)],
            (0..10)
                .map(|day| review(1 + day % 2, -day, ReviewKind::Review, 3))
                .collect(),
        );
        let report = report(&collection);
        let table = report.table(TableId::ReviewCounts).unwrap();
        let sum = table
            .rows
            .iter()
            .map(|row| match row[1] {
                Cell::Count(count) => count,
                _ => 0,
            })
            .sum::<u64>();
        assert_eq!(sum, 10);
        for row in &table.rows {
            let Cell::Percent(Some(p)) = row[2] else {
                panic!("percent expected");
            };
            assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn test_future_due_skips_suspended_and_overdue_buried() {
        let mut suspended = card(2);
        suspended.queue = CardQueue::Suspended;
        let mut buried = card(3);
        buried.queue = CardQueue::SiblingBuried;
        buried.due = 0;
        let mut new = card(4);
        new.card_type = CardType::New;
        new.due = 5;
        let mut info_card = card(1);
        info_card.due = 3;
        let collection = collection(vec![info_card, suspended, buried, new], vec![]);
        let report = report(&collection);
        let table = report.table(TableId::FutureDue).unwrap();
        assert_eq!(table.rows.len(), 31);
        assert_eq!(count(table, "3"), 1);
        assert_eq!(count(table, "0"), 0);
        assert_eq!(count(table, "5"), 0);
    }

    #[test]
    fn test_hourly_excludes_filtered_reviews() {
        let collection = collection(
            vec![card(1)],
            vec![
                review(1, -2, ReviewKind::Filtered, 3),
                review(1, -1, ReviewKind::Review, 1),
                review(1, 0, ReviewKind::Review, 3),
            ],
        );
        let report = report(&collection);
        let table = report.table(TableId::Hourly).unwrap();
        assert_eq!(count(table, "10"), 2);
        assert_eq!(table.rows[10][3], Cell::Percent(Some(50.0)));
        assert_eq!(table.rows[9][3], Cell::Percent(None));
    }

    #[test]
    fn test_answer_buttons() {
        let mut mature = review(1, 0, ReviewKind::Review, 4);
        mature.last_interval = 40;
        let collection = collection(
            vec![card(1)],
            vec![
                review(1, -3, ReviewKind::Learning, 1),
                review(1, -2, ReviewKind::Learning, 3),
                review(1, -1, ReviewKind::Review, 2),
                mature,
            ],
        );
        let report = report(&collection);
        let table = report.table(TableId::AnswerButtons).unwrap();
        assert_eq!(table.columns, ["Type", "1", "2", "3", "4", "Total", "Correct"]);
        let learning = &table.rows[0];
        assert_eq!(learning[1], Cell::Count(1));
        assert_eq!(learning[3], Cell::Count(1));
        assert_eq!(learning[5], Cell::Count(2));
        assert_eq!(learning[6], Cell::Percent(Some(50.0)));
        assert_eq!(table.rows[2][4], Cell::Count(1));
        assert_eq!(table.rows[3][6], Cell::Percent(None));
    }

    #[test]
    fn test_review_time_by_type() {
        let collection = collection(
            vec![card(1)],
            vec![
                review(1, -1, ReviewKind::Learning, 3),
                review(1, 0, ReviewKind::Review, 3),
            ],
        );
        let report = report(&collection);
        let table = report.table(TableId::ReviewTimeByType).unwrap();
        assert_eq!(
            table.columns,
            ["Day", "Filtered", "Learning", "Relearning", "Young", "Mature", "Total"]
        );
        let today = table.rows.last().unwrap();
        assert_eq!(today[0], Cell::text("0"));
        assert_eq!(today[4], Cell::Hours(6000.0 / 3_600_000.0));
        assert_eq!(today[6], Cell::Hours(6000.0 / 3_600_000.0));
    }

    #[test]
    fn test_card_tables() {
        let mut c = card(1);
        c.factor = 2500;
        c.memory.difficulty = Some(10.0);
        c.memory.stability = Some(30.4);
        c.memory.retrievability = Some(0.42);
        let collection = collection(vec![c], vec![]);
        let report = report(&collection);
        assert_eq!(count(report.table(TableId::Ease).unwrap(), "[250%, 260%)"), 1);
        assert_eq!(count(report.table(TableId::Stability).unwrap(), "30"), 1);
        assert_eq!(count(report.table(TableId::Difficulty).unwrap(), "[95%, 100%]"), 1);
        assert_eq!(count(report.table(TableId::Retrievability).unwrap(), "[40%, 45%)"), 1);
        assert_eq!(count(report.table(TableId::Intervals).unwrap(), "10"), 1);
        assert_eq!(count(report.table(TableId::Added).unwrap(), "-31"), 0);
    }

    #[test]
    fn test_out_of_range_config_is_rejected() {
        let config = StatsConfig {
            review_days: i64::MAX,
            ..config()
        };
        let err = build_report(&Collection::empty(), &config, &Rules::default()).unwrap_err();
        assert_eq!(err.field, "review_days");
    }

    #[test]
    fn test_future_due_by_template() {
        let mut basic = card(1);
        basic.due = 3;
        let mut reverse = card(2);
        reverse.template = "Reverse".to_owned();
        reverse.due = 3;
        let mut suspended = card(3);
        suspended.queue = CardQueue::Suspended;
        suspended.due = 5;
        let mut new = card(4);
        new.card_type = CardType::New;
        new.template = "Cloze".to_owned();
        new.due = 3;
        let mut far = card(5);
        far.due = 31;
        let collection = collection(vec![basic, reverse, suspended, new, far], vec![]);
        let report = report(&collection);

        let table = report.table(TableId::FutureDueByTemplate).unwrap();
        assert_eq!(table.columns, ["Due In Days", "Basic", "Reverse", "Total"]);
        assert_eq!(table.rows.len(), 31);
        assert_eq!(
            table.rows[3],
            [Cell::text("3"), Cell::Count(1), Cell::Count(1), Cell::Count(2)]
        );
        assert_eq!(table.rows[5][1], Cell::Count(1));
        assert_eq!(table.rows[0][3], Cell::Count(0));
        assert_eq!(table.notes, ["Total: 3"]);
    }

    #[test]
    fn test_calendar_starts_on_january_first() {
        let collection = collection(
            vec![card(1)],
            vec![
                // 03:00 is still Dec 31st's study day with a 04:00 rollover
                reviewed_at(
                    review(1, 0, ReviewKind::Review, 3),
                    Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
                ),
                reviewed_at(
                    review(1, 0, ReviewKind::Review, 3),
                    Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap(),
                ),
                review(1, 0, ReviewKind::Review, 3),
            ],
        );
        let report = report(&collection);

        let table = report.table(TableId::Calendar).unwrap();
        // Jan 1st to May 10th of a leap year
        assert_eq!(table.rows.len(), 131);
        assert_eq!(table.rows[0][0], Cell::text("2024-01-01"));
        assert_eq!(table.rows[0][1], Cell::Count(1));
        assert_eq!(table.rows[130][0], Cell::text("2024-05-10"));
        assert_eq!(table.rows[130][1], Cell::Count(1));
        assert_eq!(table.notes, ["Total: 2"]);
    }

    #[test]
    fn test_today_correct_mature_needs_mature_last_interval() {
        let young = review(1, 0, ReviewKind::Review, 3);
        let mut mature_wrong = review(1, 0, ReviewKind::Review, 1);
        mature_wrong.last_interval = 30;
        let mut mature_right = reviewed_at(
            review(1, 0, ReviewKind::Review, 3),
            on_day(0) + TimeDelta::minutes(5),
        );
        mature_right.last_interval = 21;
        let collection = collection(vec![card(1)], vec![young, mature_wrong, mature_right]);
        let report = report(&collection);

        let all = report.table(TableId::TodayCorrect).unwrap();
        assert_eq!(count(all, "Correct"), 2);
        assert_eq!(count(all, "Incorrect"), 1);
        let mature = report.table(TableId::TodayCorrectMature).unwrap();
        assert_eq!(count(mature, "Correct"), 1);
        assert_eq!(count(mature, "Incorrect"), 1);
    }

    #[test]
    fn test_review_time_sums_hours_per_day() {
        let mut long = review(1, -2, ReviewKind::Review, 3);
        long.taken_millis = 7_200_000;
        let second = reviewed_at(
            review(1, 0, ReviewKind::Review, 3),
            on_day(0) + TimeDelta::minutes(5),
        );
        let collection = collection(
            vec![card(1)],
            vec![long, review(1, 0, ReviewKind::Review, 3), second],
        );
        let report = report(&collection);

        let table = report.table(TableId::ReviewTime).unwrap();
        assert_eq!(table.columns, ["Day", "Count", "Time"]);
        assert_eq!(table.rows.len(), 31);
        assert_eq!(
            table.rows[30],
            [Cell::text("0"), Cell::Count(2), Cell::Hours(12_000.0 / 3_600_000.0)]
        );
        assert_eq!(
            table.rows[28],
            [Cell::text("-2"), Cell::Count(1), Cell::Hours(2.0)]
        );
        assert_eq!(table.notes, ["Total: 2.00 hours"]);
    }

    #[test]
    fn test_hourly_window() {
        let collection = collection(
            vec![card(1)],
            vec![
                review(1, -2, ReviewKind::Review, 3),
                review(1, -1, ReviewKind::Review, 3),
                review(1, 0, ReviewKind::Review, 3),
            ],
        );
        let all_history = report(&collection);
        assert_eq!(count(all_history.table(TableId::Hourly).unwrap(), "10"), 3);

        let config = StatsConfig {
            hourly_days: Some(1),
            ..config()
        };
        let windowed = build_report(&collection, &config, &Rules::default()).unwrap();
        assert_eq!(count(windowed.table(TableId::Hourly).unwrap(), "10"), 2);
    }

    #[test]
    fn test_stability_cutoff_after_rounding() {
        let mut kept = card(1);
        kept.memory.stability = Some(30.4);
        let mut dropped = card(2);
        dropped.memory.stability = Some(30.5);
        let collection = collection(vec![kept, dropped], vec![]);
        let report = report(&collection);

        let table = report.table(TableId::Stability).unwrap();
        assert_eq!(table.rows.len(), 31);
        assert_eq!(count(table, "30"), 1);
        assert_eq!(table.notes, ["Total: 1"]);
    }

    #[test]
    fn test_added_counts_cards_inside_window() {
        let mut recent = card(1);
        recent.created_at = on_day(-5);
        let mut old = card(2);
        old.created_at = on_day(-40);
        let collection = collection(vec![recent, old], vec![]);
        let report = report(&collection);

        let table = report.table(TableId::Added).unwrap();
        assert_eq!(table.rows.len(), 32);
        assert_eq!(count(table, "-5"), 1);
        assert_eq!(table.notes, ["Total: 1"]);
    }

    #[test]
    fn test_reviews_after_now_are_skipped() {
        let later = reviewed_at(
            review(1, 0, ReviewKind::Review, 1),
            now() + TimeDelta::hours(8),
        );
        let collection = collection(
            vec![card(1)],
            vec![review(1, 0, ReviewKind::Review, 3), later],
        );
        let report = report(&collection);

        assert_eq!(count(report.table(TableId::Today).unwrap(), "Reviewing"), 1);
        let retention = report.table(TableId::TrueRetention).unwrap();
        assert_eq!(retention_row(retention, "Today")[3], Cell::Percent(Some(100.0)));
    }
}
