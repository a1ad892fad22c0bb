//! Eligibility classification of reviews and cards
//!
//! Classification annotates every review and card of a [`Collection`] with
//! the derived attributes the tables filter and group on. Results are
//! index-aligned with `collection.reviews` and `collection.cards`; records
//! themselves are never modified.
//!
//! # Rules
//!
//! The host application does not document how it decides some of these
//! attributes. Each such decision is a trait object in [`Rules`], so a
//! corrected rule can replace the default without touching the table
//! builder:
//!
//! - [`AccuracyRule`]: which reviews form the accuracy population
//!   (default [`HostAccuracyRule`])
//! - [`TimelinessRule`]: early / on-time / late reviews
//!   (default [`IntervalTolerance`])
//! - [`ExclusionRule`]: which records retrospective tables drop
//!   (default [`RemovedCardRule`])
//!
//! The remaining attributes (phase, calendar placement, card status, bins)
//! follow the host's behavior directly and are not configurable.

use std::fmt;

use cardstat_core::{
    CardQueue, CardRecord, CardType, Collection, DayClock, MATURE_INTERVAL_DAYS, Removal,
    ReviewKind, ReviewRecord,
};
use chrono::NaiveDate;

use crate::{
    config::{FilteredReviewPolicy, StatsConfig},
    warning::AmbiguousRuleWarning,
};

/// Decay of the memory model's forgetting curve.
const DECAY: f64 = -0.5;
/// `0.9^(1 / DECAY) - 1`, making retrievability 90% when elapsed days equal
/// stability.
const CURVE_FACTOR: f64 = 19.0 / 81.0;
/// Retrievability values this close to a bin boundary may be binned
/// differently by the host, which rounds before binning.
const RETRIEVABILITY_PRECISION: f64 = 0.0005;

pub trait AccuracyRule: fmt::Debug + Send + Sync {
    /// Whether `review` belongs to the population accuracy is computed over.
    fn counts_for_accuracy(&self, review: &ReviewRecord) -> bool;

    /// Warning to report when the rule is uncertain for `reviews`.
    fn ambiguity(&self, _reviews: &[ReviewRecord]) -> Option<AmbiguousRuleWarning> {
        None
    }
}

/// Accuracy population as the host's true-retention table computes it.
///
/// A review counts when an answer button was pressed and either it is a
/// review-phase entry or the interval before it was at least a day.
/// Filtered-deck reviews additionally have to satisfy `filtered`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostAccuracyRule {
    pub filtered: FilteredReviewPolicy,
}

impl AccuracyRule for HostAccuracyRule {
    fn counts_for_accuracy(&self, review: &ReviewRecord) -> bool {
        let answered = review.button.is_some();
        let scheduled = review.kind.is_review() || review.last_interval_spans_a_day();
        let filtered = !review.in_filtered_deck()
            || match self.filtered {
                // an absent factor is not a reset one
                FilteredReviewPolicy::WhenRescheduled => review.factor != Some(0),
                FilteredReviewPolicy::Always => true,
                FilteredReviewPolicy::Never => false,
            };
        answered && scheduled && filtered
    }

    fn ambiguity(&self, reviews: &[ReviewRecord]) -> Option<AmbiguousRuleWarning> {
        let filtered = reviews
            .iter()
            .filter(|review| review.in_filtered_deck() && review.button.is_some())
            .count();
        (filtered > 0).then_some(AmbiguousRuleWarning::FilteredDeckAccuracy {
            reviews: filtered,
            policy: self.filtered,
        })
    }
}

/// Whether a review happened before, on or after its scheduled day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Timeliness {
    Early,
    OnTime,
    Late,
    /// No schedule to compare against: first reviews, reviews after a
    /// learning step, and entries that are not study events.
    Unscheduled,
}

pub trait TimelinessRule: fmt::Debug + Send + Sync {
    fn timeliness(&self, review: &ReviewRecord) -> Timeliness;
}

/// Compares the elapsed study days with the previous interval, allowing
/// `days` of deviation either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTolerance {
    pub days: i64,
}

impl TimelinessRule for IntervalTolerance {
    fn timeliness(&self, review: &ReviewRecord) -> Timeliness {
        if !review.kind.is_study() || review.last_interval <= 0 {
            return Timeliness::Unscheduled;
        }
        let Some(elapsed) = review.elapsed_days else {
            return Timeliness::Unscheduled;
        };
        if elapsed < review.last_interval - self.days {
            Timeliness::Early
        } else if elapsed > review.last_interval + self.days {
            Timeliness::Late
        } else {
            Timeliness::OnTime
        }
    }
}

pub trait ExclusionRule: fmt::Debug + Send + Sync {
    /// Whether retrospective tables drop `review`.
    fn excludes_review(&self, review: &ReviewRecord) -> bool;
    /// Whether card tables drop `card`.
    fn excludes_card(&self, card: &CardRecord) -> bool;
}

/// Drops the history of reset and deleted cards, and deleted cards
/// themselves. A reset card is still in the collection as a new card.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovedCardRule;

impl ExclusionRule for RemovedCardRule {
    fn excludes_review(&self, review: &ReviewRecord) -> bool {
        review.card_removal.is_some()
    }

    fn excludes_card(&self, card: &CardRecord) -> bool {
        card.removal == Some(Removal::Deleted)
    }
}

/// The swappable classification rules.
#[derive(Debug)]
pub struct Rules {
    pub accuracy: Box<dyn AccuracyRule>,
    pub timeliness: Box<dyn TimelinessRule>,
    pub exclusion: Box<dyn ExclusionRule>,
}

impl Rules {
    /// Default rules parameterized by `config`.
    #[must_use]
    pub fn new(config: &StatsConfig) -> Self {
        Self {
            accuracy: Box::new(HostAccuracyRule {
                filtered: config.filtered_reviews,
            }),
            timeliness: Box::new(IntervalTolerance {
                days: config.timeliness_tolerance_days,
            }),
            exclusion: Box::new(RemovedCardRule),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(&StatsConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::IsVariant)]
pub enum Maturity {
    Young,
    Mature,
}

/// Row category of the answer-buttons table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ButtonSubcategory {
    /// Learning, relearning and filtered reviews.
    Learning,
    Young,
    Mature,
    Other,
}

impl ButtonSubcategory {
    pub const ALL: [Self; 4] = [Self::Learning, Self::Young, Self::Mature, Self::Other];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Learning => "Learning",
            Self::Young => "Young",
            Self::Mature => "Mature",
            Self::Other => "Other",
        }
    }
}

/// Column category of the time-by-type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeCategory {
    Filtered,
    Learning,
    Relearning,
    Young,
    Mature,
}

impl TimeCategory {
    pub const ALL: [Self; 5] = [
        Self::Filtered,
        Self::Learning,
        Self::Relearning,
        Self::Young,
        Self::Mature,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Filtered => "Filtered",
            Self::Learning => "Learning",
            Self::Relearning => "Relearning",
            Self::Young => "Young",
            Self::Mature => "Mature",
        }
    }
}

/// Derived attributes of one review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewClass {
    pub phase_at_review: ReviewKind,
    pub counts_for_accuracy: bool,
    /// `None` when no answer button was pressed.
    pub correct: Option<bool>,
    pub maturity: Maturity,
    pub timeliness: Timeliness,
    pub excluded_by_reset_or_delete: bool,
    /// Logged after the report's "now"; happens when "now" is overridden
    /// with a past time.
    pub after_now: bool,
    /// Study-day offset from today (0 today, -1 yesterday).
    pub relative_day: i64,
    pub local_hour: u32,
    pub study_date: NaiveDate,
    pub subcategory: ButtonSubcategory,
    pub time_category: Option<TimeCategory>,
}

impl ReviewClass {
    #[must_use]
    pub fn is_early(&self) -> bool {
        self.timeliness.is_early()
    }

    #[must_use]
    pub fn is_late(&self) -> bool {
        self.timeliness.is_late()
    }

    /// Whether retrospective tables include the review.
    #[must_use]
    pub fn is_retrospective(&self) -> bool {
        !self.excluded_by_reset_or_delete && !self.after_now && self.phase_at_review.is_study()
    }
}

/// Current state of a card as the card-counts table groups it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, derive_more::IsVariant)]
pub enum CardStatus {
    New,
    Learning,
    Relearning,
    Young,
    Mature,
    Suspended,
    /// Either buried queue.
    Buried,
}

impl CardStatus {
    pub const ALL: [Self; 7] = [
        Self::New,
        Self::Learning,
        Self::Relearning,
        Self::Young,
        Self::Mature,
        Self::Suspended,
        Self::Buried,
    ];

    #[must_use]
    pub fn of(card: &CardRecord) -> Self {
        match card.queue {
            CardQueue::Suspended => return Self::Suspended,
            CardQueue::ManuallyBuried | CardQueue::SiblingBuried => return Self::Buried,
            _ => {}
        }
        match card.card_type {
            CardType::New => Self::New,
            CardType::Learning => Self::Learning,
            CardType::Relearning => Self::Relearning,
            CardType::Review if card.interval < MATURE_INTERVAL_DAYS => Self::Young,
            CardType::Review => Self::Mature,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Learning => "Learning",
            Self::Relearning => "Relearning",
            Self::Young => "Young",
            Self::Mature => "Mature",
            Self::Suspended => "Suspended",
            Self::Buried => "Buried",
        }
    }
}

/// Derived attributes of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardClass {
    pub status: CardStatus,
    /// Days from today until the card is due in its home deck.
    pub due_days: i64,
    /// Days since the card was added (0 today, negative in the past).
    pub added_days: i64,
    /// Stability rounded half away from zero.
    pub stability_days: Option<i64>,
    /// Lower bound (percent) of the card's 10% ease bin.
    pub ease_bin: Option<u32>,
    /// Difficulty scaled to 0-100.
    pub scaled_difficulty: Option<f64>,
    /// Retrievability in 0-1, exported or estimated.
    pub retrievability: Option<f64>,
    pub retrievability_estimated: bool,
    pub excluded: bool,
}

/// Classification of a whole collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Aligned with `collection.reviews`.
    pub reviews: Vec<ReviewClass>,
    /// Aligned with `collection.cards`.
    pub cards: Vec<CardClass>,
    pub warnings: Vec<AmbiguousRuleWarning>,
}

impl Classification {
    #[must_use]
    pub fn new(collection: &Collection, rules: &Rules, clock: &DayClock) -> Self {
        let reviews = collection
            .reviews
            .iter()
            .map(|review| classify_review(review, rules, clock))
            .collect::<Vec<_>>();

        let last_studied = collection.last_studied();
        let cards = collection
            .cards
            .iter()
            .map(|card| {
                let elapsed = last_studied.get(&card.id).map(|at| clock.days_since(*at));
                classify_card(card, rules, clock, collection.info.today_days_elapsed, elapsed)
            })
            .collect::<Vec<_>>();

        let mut warnings = vec![];
        warnings.extend(rules.accuracy.ambiguity(&collection.reviews));
        let estimated = cards.iter().filter(|card| card.retrievability_estimated).count();
        if estimated > 0 {
            warnings.push(AmbiguousRuleWarning::RetrievabilityEstimated { cards: estimated });
        }
        let imprecise = collection
            .cards
            .iter()
            .filter_map(|card| card.memory.retrievability)
            .filter(|r| near_bin_boundary(*r))
            .count();
        if imprecise > 0 {
            warnings.push(AmbiguousRuleWarning::RetrievabilityPrecision { cards: imprecise });
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        tracing::debug!(
            reviews = reviews.len(),
            accuracy_population = reviews.iter().filter(|r| r.counts_for_accuracy).count(),
            excluded = reviews.iter().filter(|r| r.excluded_by_reset_or_delete).count(),
            after_now = reviews.iter().filter(|r| r.after_now).count(),
            cards = cards.len(),
            "classified collection"
        );

        Self {
            reviews,
            cards,
            warnings,
        }
    }
}

#[must_use]
pub fn classify_review(review: &ReviewRecord, rules: &Rules, clock: &DayClock) -> ReviewClass {
    let maturity = if review.is_mature() {
        Maturity::Mature
    } else {
        Maturity::Young
    };
    let subcategory = match review.kind {
        ReviewKind::Learning | ReviewKind::Relearning | ReviewKind::Filtered => {
            ButtonSubcategory::Learning
        }
        ReviewKind::Review => match maturity {
            Maturity::Young => ButtonSubcategory::Young,
            Maturity::Mature => ButtonSubcategory::Mature,
        },
        ReviewKind::Manual | ReviewKind::Rescheduled => ButtonSubcategory::Other,
    };
    let time_category = match review.kind {
        ReviewKind::Filtered => Some(TimeCategory::Filtered),
        ReviewKind::Learning => Some(TimeCategory::Learning),
        ReviewKind::Relearning => Some(TimeCategory::Relearning),
        ReviewKind::Review => Some(match maturity {
            Maturity::Young => TimeCategory::Young,
            Maturity::Mature => TimeCategory::Mature,
        }),
        ReviewKind::Manual | ReviewKind::Rescheduled => None,
    };

    ReviewClass {
        phase_at_review: review.kind,
        counts_for_accuracy: rules.accuracy.counts_for_accuracy(review),
        correct: review.button.map(|button| button > 1),
        maturity,
        timeliness: rules.timeliness.timeliness(review),
        excluded_by_reset_or_delete: rules.exclusion.excludes_review(review),
        after_now: review.reviewed_at > clock.now(),
        relative_day: clock.relative_day(review.reviewed_at),
        local_hour: clock.calendar().local_hour(review.reviewed_at),
        study_date: clock.calendar().study_date(review.reviewed_at),
        subcategory,
        time_category,
    }
}

/// Classifies `card`; `days_since_review` is the time since its last study
/// event, used to estimate retrievability when none was exported.
#[expect(clippy::cast_possible_truncation)]
#[must_use]
pub fn classify_card(
    card: &CardRecord,
    rules: &Rules,
    clock: &DayClock,
    today_days_elapsed: i64,
    days_since_review: Option<f64>,
) -> CardClass {
    let memory = card.memory;
    let (retrievability, retrievability_estimated) = match memory.retrievability {
        Some(r) => (Some(r), false),
        None => match (memory.stability, days_since_review) {
            (Some(stability), Some(elapsed)) if stability > 0.0 => {
                (Some(forgetting_curve(elapsed.max(0.0), stability)), true)
            }
            _ => (None, false),
        },
    };

    CardClass {
        status: CardStatus::of(card),
        due_days: clock.due_in_days(card.home_due(), today_days_elapsed),
        added_days: clock.relative_day_ceil(card.created_at),
        stability_days: memory.stability.map(|s| s.round() as i64),
        ease_bin: (card.factor != 0).then_some(card.factor / 100 * 10),
        scaled_difficulty: memory.difficulty.map(|d| 100.0 * (d - 1.0) / 9.0),
        retrievability,
        retrievability_estimated,
        excluded: rules.exclusion.excludes_card(card),
    }
}

/// Probability of recall after `elapsed` days for a memory of `stability`.
#[must_use]
pub fn forgetting_curve(elapsed: f64, stability: f64) -> f64 {
    (1.0 + CURVE_FACTOR * elapsed / stability).powf(DECAY)
}

fn near_bin_boundary(retrievability: f64) -> bool {
    let boundary = (retrievability * 20.0).round();
    (1.0..=19.0).contains(&boundary)
        && (retrievability - boundary / 20.0).abs() < RETRIEVABILITY_PRECISION
}


#[cfg(test)]
mod tests {
    use cardstat_core::{CardQueue, CardType, CollectionInfo, DeckId, ReviewKind, StudyCalendar};
    use chrono::FixedOffset;

    use super::{test_util::*, *};

    fn accuracy(policy: FilteredReviewPolicy) -> HostAccuracyRule {
        HostAccuracyRule { filtered: policy }
    }

    #[test]
    fn test_review_phase_counts_for_accuracy() {
        let rule = HostAccuracyRule::default();
        assert!(rule.counts_for_accuracy(&review(1, 0, ReviewKind::Review, 3)));
        assert!(rule.counts_for_accuracy(&review(1, 0, ReviewKind::Review, 1)));
        assert!(!rule.counts_for_accuracy(&review(1, 0, ReviewKind::Review, 0)));
    }

    #[test]
    fn test_learning_steps_do_not_count_for_accuracy() {
        let rule = HostAccuracyRule::default();
        let mut r = review(1, 0, ReviewKind::Learning, 3);
        assert!(!rule.counts_for_accuracy(&r));
        r.last_interval = -86_400;
        assert!(rule.counts_for_accuracy(&r));

        let mut r = review(1, 0, ReviewKind::Relearning, 3);
        r.last_interval = 12;
        assert!(rule.counts_for_accuracy(&r));
    }

    #[test]
    fn test_filtered_review_policies() {
        let mut rescheduled = review(1, 0, ReviewKind::Filtered, 3);
        rescheduled.last_interval = 4;
        let mut preview = rescheduled.clone();
        preview.factor = Some(0);

        let default = accuracy(FilteredReviewPolicy::WhenRescheduled);
        assert!(default.counts_for_accuracy(&rescheduled));
        assert!(!default.counts_for_accuracy(&preview));

        let always = accuracy(FilteredReviewPolicy::Always);
        assert!(always.counts_for_accuracy(&preview));

        let never = accuracy(FilteredReviewPolicy::Never);
        assert!(!never.counts_for_accuracy(&rescheduled));
    }

    #[test]
    fn test_filtered_reviews_raise_warning() {
        let rule = HostAccuracyRule::default();
        let reviews = [
            review(1, 0, ReviewKind::Filtered, 3),
            review(1, 0, ReviewKind::Review, 3),
        ];
        assert_eq!(
            rule.ambiguity(&reviews),
            Some(AmbiguousRuleWarning::FilteredDeckAccuracy {
                reviews: 1,
                policy: FilteredReviewPolicy::WhenRescheduled,
            })
        );
        assert_eq!(rule.ambiguity(&reviews[1..]), None);
    }

    #[test]
    fn test_timeliness() {
        let rule = IntervalTolerance { days: 0 };
        let mut r = review(1, 0, ReviewKind::Review, 3);
        r.last_interval = 5;
        assert_eq!(rule.timeliness(&r), Timeliness::Unscheduled);
        r.elapsed_days = Some(3);
        assert_eq!(rule.timeliness(&r), Timeliness::Early);
        r.elapsed_days = Some(5);
        assert_eq!(rule.timeliness(&r), Timeliness::OnTime);
        r.elapsed_days = Some(8);
        assert_eq!(rule.timeliness(&r), Timeliness::Late);

        let tolerant = IntervalTolerance { days: 1 };
        r.elapsed_days = Some(4);
        assert_eq!(tolerant.timeliness(&r), Timeliness::OnTime);

        let mut learning = review(1, 0, ReviewKind::Learning, 3);
        learning.elapsed_days = Some(0);
        assert_eq!(rule.timeliness(&learning), Timeliness::Unscheduled);
        let mut manual = review(1, 0, ReviewKind::Manual, 0);
        manual.last_interval = 5;
        manual.elapsed_days = Some(1);
        assert_eq!(rule.timeliness(&manual), Timeliness::Unscheduled);
    }

    #[test]
    fn test_removed_card_rule() {
        let rule = RemovedCardRule;
        let mut r = review(1, 0, ReviewKind::Review, 3);
        assert!(!rule.excludes_review(&r));
        r.card_removal = Some(Removal::Reset);
        assert!(rule.excludes_review(&r));

        let mut c = card(1);
        c.removal = Some(Removal::Reset);
        assert!(!rule.excludes_card(&c));
        c.removal = Some(Removal::Deleted);
        assert!(rule.excludes_card(&c));
    }

    #[test]
    fn test_review_class_attributes() {
        let rules = Rules::default();
        let clock = clock();

        let class = classify_review(&review(1, -1, ReviewKind::Review, 1), &rules, &clock);
        assert_eq!(class.phase_at_review, ReviewKind::Review);
        assert_eq!(class.relative_day, -1);
        assert_eq!(class.local_hour, 10);
        assert_eq!(class.study_date, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        assert_eq!(class.correct, Some(false));
        assert_eq!(class.maturity, Maturity::Young);
        assert_eq!(class.subcategory, ButtonSubcategory::Young);
        assert_eq!(class.time_category, Some(TimeCategory::Young));
        assert!(class.is_retrospective());

        let mut mature = review(1, 0, ReviewKind::Review, 4);
        mature.last_interval = 30;
        let class = classify_review(&mature, &rules, &clock);
        assert_eq!(class.subcategory, ButtonSubcategory::Mature);
        assert_eq!(class.time_category, Some(TimeCategory::Mature));

        let class = classify_review(&review(1, 0, ReviewKind::Filtered, 3), &rules, &clock);
        assert_eq!(class.subcategory, ButtonSubcategory::Learning);
        assert_eq!(class.time_category, Some(TimeCategory::Filtered));

        let class = classify_review(&review(1, 0, ReviewKind::Rescheduled, 0), &rules, &clock);
        assert_eq!(class.correct, None);
        assert_eq!(class.subcategory, ButtonSubcategory::Other);
        assert_eq!(class.time_category, None);
        assert!(!class.is_retrospective());
    }

    #[test]
    fn test_review_after_now_is_not_retrospective() {
        let rules = Rules::default();
        let mut r = review(1, 0, ReviewKind::Review, 3);
        r.reviewed_at = now() + chrono::TimeDelta::hours(8);
        let class = classify_review(&r, &rules, &clock());
        assert_eq!(class.relative_day, 0);
        assert!(class.after_now);
        assert!(!class.is_retrospective());

        r.reviewed_at = now();
        assert!(classify_review(&r, &rules, &clock()).is_retrospective());
    }

    #[test]
    fn test_card_status() {
        let mut c = card(1);
        assert_eq!(CardStatus::of(&c), CardStatus::Young);
        c.interval = 21;
        assert_eq!(CardStatus::of(&c), CardStatus::Mature);
        c.card_type = CardType::Relearning;
        assert_eq!(CardStatus::of(&c), CardStatus::Relearning);
        c.queue = CardQueue::SiblingBuried;
        assert_eq!(CardStatus::of(&c), CardStatus::Buried);
        c.queue = CardQueue::ManuallyBuried;
        assert_eq!(CardStatus::of(&c), CardStatus::Buried);
        c.queue = CardQueue::Suspended;
        assert_eq!(CardStatus::of(&c), CardStatus::Suspended);
        c.queue = CardQueue::New;
        c.card_type = CardType::New;
        assert_eq!(CardStatus::of(&c), CardStatus::New);
    }

    #[test]
    fn test_card_class_bins() {
        let rules = Rules::default();
        let clock = clock();
        let mut c = card(1);
        c.factor = 2650;
        c.memory.stability = Some(2.5);
        c.memory.difficulty = Some(5.5);
        c.memory.retrievability = Some(0.873);

        let class = classify_card(&c, &rules, &clock, 100, None);
        assert_eq!(class.due_days, 10);
        assert_eq!(class.added_days, -100);
        assert_eq!(class.ease_bin, Some(260));
        assert_eq!(class.stability_days, Some(3));
        assert!((class.scaled_difficulty.unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(class.retrievability, Some(0.873));
        assert!(!class.retrievability_estimated);
        assert!(!class.excluded);

        c.factor = 0;
        let class = classify_card(&c, &rules, &clock, 100, None);
        assert_eq!(class.ease_bin, None);
    }

    #[test]
    fn test_due_days_uses_home_deck_in_filtered_deck() {
        let rules = Rules::default();
        let mut c = card(1);
        c.original_deck_id = DeckId(9);
        c.due = -100_000;
        c.original_due = 103;
        let class = classify_card(&c, &rules, &clock(), 100, None);
        assert_eq!(class.due_days, 3);
    }

    #[test]
    fn test_retrievability_estimated_from_stability() {
        let rules = Rules::default();
        let mut c = card(1);
        c.memory.stability = Some(10.0);
        let class = classify_card(&c, &rules, &clock(), 100, Some(10.0));
        assert!(class.retrievability_estimated);
        assert!((class.retrievability.unwrap() - 0.9).abs() < 1e-9);

        let class = classify_card(&c, &rules, &clock(), 100, None);
        assert_eq!(class.retrievability, None);
    }

    #[test]
    fn test_classification_warns_about_retrievability() {
        let mut exported = card(1);
        exported.memory.retrievability = Some(0.9002);
        let mut estimated = card(2);
        estimated.memory.stability = Some(10.0);
        // stability but never studied, so nothing to estimate from
        let mut unstudied = card(3);
        unstudied.memory.stability = Some(10.0);
        let calendar = StudyCalendar::new(FixedOffset::east_opt(0).unwrap(), 4);
        let collection = Collection::new(
            CollectionInfo::default(),
            vec![exported, estimated, unstudied],
            vec![review(2, -10, ReviewKind::Review, 3)],
            &calendar,
        )
        .unwrap();

        let classification = Classification::new(&collection, &Rules::default(), &clock());
        assert_eq!(
            classification.warnings,
            [
                AmbiguousRuleWarning::RetrievabilityEstimated { cards: 1 },
                AmbiguousRuleWarning::RetrievabilityPrecision { cards: 1 },
            ]
        );
        assert!(classification.cards[1].retrievability_estimated);
        assert_eq!(classification.cards[2].retrievability, None);
    }

    #[test]
    fn test_near_bin_boundary() {
        assert!(near_bin_boundary(0.8997));
        assert!(near_bin_boundary(0.9003));
        assert!(!near_bin_boundary(0.9006));
        assert!(!near_bin_boundary(0.92));
        assert!(!near_bin_boundary(0.9999));
    }
}
