//! Typed card and review records
//!
//! Records are immutable once a [`Collection`] is assembled. Everything the
//! report derives from them (classifications, buckets) lives in separate,
//! index-aligned structures.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::{ReferentialError, timing::StudyCalendar};

/// Last interval (in days) from which a review counts as mature.
pub const MATURE_INTERVAL_DAYS: i64 = 21;

/// Seconds in a day, the threshold for learning intervals counted as a day.
const SECS_PER_DAY: i64 = 86_400;

/// Card identifier (the card's creation time in epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct CardId(pub i64);

/// Note identifier, kept as exported text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct NoteId(pub String);

/// Deck identifier; `0` means "no deck" for original deck ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
#[display("{_0}")]
pub struct DeckId(pub i64);

/// Kind of a review-log entry, i.e. the learning phase the card was in
/// when it was studied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::IsVariant,
)]
pub enum ReviewKind {
    Learning,
    Review,
    Relearning,
    /// Studied in a filtered deck.
    Filtered,
    /// Manually changed (e.g. reset or set due date) without studying.
    Manual,
    /// Rescheduled by the scheduler without studying.
    Rescheduled,
}

impl ReviewKind {
    pub const ALL: [Self; 6] = [
        Self::Learning,
        Self::Review,
        Self::Relearning,
        Self::Filtered,
        Self::Manual,
        Self::Rescheduled,
    ];

    /// Parses the numeric code stored in the review log.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::Learning,
            1 => Self::Review,
            2 => Self::Relearning,
            3 => Self::Filtered,
            4 => Self::Manual,
            5 => Self::Rescheduled,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Learning => "Learning",
            Self::Review => "Reviewing",
            Self::Relearning => "Relearning",
            Self::Filtered => "Filtered",
            Self::Manual => "Manual",
            Self::Rescheduled => "Rescheduled",
        }
    }

    /// Whether the entry records an actual study event.
    ///
    /// Manual and rescheduling entries only change the schedule.
    #[must_use]
    pub const fn is_study(self) -> bool {
        !matches!(self, Self::Manual | Self::Rescheduled)
    }
}

/// Scheduling type of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::IsVariant)]
pub enum CardType {
    New,
    Learning,
    Review,
    Relearning,
}

impl CardType {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::New,
            1 => Self::Learning,
            2 => Self::Review,
            3 => Self::Relearning,
            _ => return None,
        })
    }
}

/// Queue a card currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::IsVariant)]
pub enum CardQueue {
    ManuallyBuried,
    SiblingBuried,
    Suspended,
    New,
    Learning,
    Review,
    DayLearnRelearn,
    Preview,
}

impl CardQueue {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            -3 => Self::ManuallyBuried,
            -2 => Self::SiblingBuried,
            -1 => Self::Suspended,
            0 => Self::New,
            1 => Self::Learning,
            2 => Self::Review,
            3 => Self::DayLearnRelearn,
            4 => Self::Preview,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn is_buried(self) -> bool {
        matches!(self, Self::ManuallyBuried | Self::SiblingBuried)
    }
}

/// Why a card no longer takes part in retrospective statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Removal {
    /// The card was reset to new; its earlier history no longer counts.
    #[display("reset")]
    Reset,
    /// The card was deleted from the collection.
    #[display("deleted")]
    Deleted,
}

/// Scheduler memory state (difficulty 1-10, stability in days,
/// retrievability 0-1). Absent for cards never scheduled by the memory model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryState {
    pub difficulty: Option<f64>,
    pub stability: Option<f64>,
    pub retrievability: Option<f64>,
}

/// One row per card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRecord {
    pub id: CardId,
    pub note_id: NoteId,
    pub deck_id: DeckId,
    /// Home deck while the card is in a filtered deck, otherwise `0`.
    pub original_deck_id: DeckId,
    /// Card template name.
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub card_type: CardType,
    pub queue: CardQueue,
    /// Day number (review cards) or epoch seconds (learning cards).
    pub due: i64,
    /// Due value in the home deck while the card is in a filtered deck.
    pub original_due: i64,
    /// Current interval in days.
    pub interval: i64,
    /// Ease factor in permille; `0` for cards without one.
    pub factor: u32,
    pub memory: MemoryState,
    /// Raw scheduler data blob as exported.
    pub data: String,
    pub removal: Option<Removal>,
}

impl CardRecord {
    #[must_use]
    pub fn in_filtered_deck(&self) -> bool {
        self.original_deck_id != DeckId(0)
    }

    /// The due value that applies to the card's home deck.
    #[must_use]
    pub fn home_due(&self) -> i64 {
        if self.in_filtered_deck() {
            self.original_due
        } else {
            self.due
        }
    }
}

/// One row per historical study event.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    /// Review-log id (the review time in epoch milliseconds).
    pub id: i64,
    pub card_id: CardId,
    /// Deck of the owning card.
    pub deck_id: DeckId,
    pub reviewed_at: DateTime<Utc>,
    pub kind: ReviewKind,
    /// Answer button pressed (1-4); `None` when the entry has no answer.
    pub button: Option<u8>,
    /// Interval after the review (positive: days, negative: seconds).
    pub interval: i64,
    /// Interval before the review (positive: days, negative: seconds).
    pub last_interval: i64,
    pub taken_millis: u64,
    /// Ease factor in permille after the review, if logged.
    pub factor: Option<u32>,
    pub memory: MemoryState,
    /// Study days since the previous review of the same card.
    pub elapsed_days: Option<i64>,
    /// Removal flag of the owning card.
    pub card_removal: Option<Removal>,
}

impl ReviewRecord {
    #[must_use]
    pub fn in_filtered_deck(&self) -> bool {
        self.kind.is_filtered()
    }

    /// Whether the interval before this review was at least one day.
    #[must_use]
    pub fn last_interval_spans_a_day(&self) -> bool {
        self.last_interval >= 1 || self.last_interval <= -SECS_PER_DAY
    }

    #[must_use]
    pub fn is_mature(&self) -> bool {
        self.last_interval >= MATURE_INTERVAL_DAYS
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn taken_hours(&self) -> f64 {
        self.taken_millis as f64 / 3_600_000.0
    }
}

/// Collection-wide settings exported alongside the cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Days from collection creation until today.
    pub today_days_elapsed: i64,
    /// Hour (0-23) at which a new study day starts.
    pub rollover_hour: u32,
}

impl CollectionInfo {
    pub const DEFAULT_ROLLOVER_HOUR: u32 = 4;
}

impl Default for CollectionInfo {
    fn default() -> Self {
        Self {
            today_days_elapsed: 0,
            rollover_hour: Self::DEFAULT_ROLLOVER_HOUR,
        }
    }
}

/// Extra per-card columns from a card-browser export, kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserColumns {
    /// Column names in export order, without `cid`.
    pub names: Vec<String>,
    /// One value per name for each exported card.
    pub rows: BTreeMap<CardId, Vec<String>>,
}

/// All records of one export, with reviews referencing existing cards.
#[derive(Debug, Clone)]
pub struct Collection {
    pub info: CollectionInfo,
    pub cards: Vec<CardRecord>,
    /// Reviews grouped by card (in card order), oldest first.
    pub reviews: Vec<ReviewRecord>,
    /// Review-log rows dropped because their card was unknown.
    pub dropped_reviews: usize,
    /// Browser-export columns passed through to the card dataset.
    pub browser: Option<BrowserColumns>,
}

impl Collection {
    /// Assembles a collection from loaded records.
    ///
    /// Orders reviews by card and time, and fills the fields reviews inherit
    /// from their card (`deck_id`, `card_removal`) as well as `elapsed_days`.
    /// Card ids are expected to be unique; for duplicates the first card wins.
    ///
    /// # Errors
    ///
    /// Returns [`ReferentialError`] for the first review whose card is not
    /// among `cards`.
    pub fn new(
        info: CollectionInfo,
        cards: Vec<CardRecord>,
        reviews: Vec<ReviewRecord>,
        calendar: &StudyCalendar,
    ) -> Result<Self, ReferentialError> {
        let mut card_index = BTreeMap::new();
        for (position, card) in cards.iter().enumerate() {
            card_index.entry(card.id).or_insert(position);
        }

        let mut keyed = Vec::with_capacity(reviews.len());
        for mut review in reviews {
            let Some(&position) = card_index.get(&review.card_id) else {
                return Err(ReferentialError {
                    review_id: review.id,
                    card_id: review.card_id,
                });
            };
            let card = &cards[position];
            review.deck_id = card.deck_id;
            review.card_removal = card.removal;
            keyed.push((position, review));
        }
        keyed.sort_by_key(|(position, review)| (*position, review.id));

        let mut previous: Option<(CardId, chrono::NaiveDate)> = None;
        let reviews = keyed
            .into_iter()
            .map(|(_, mut review)| {
                let date = calendar.study_date(review.reviewed_at);
                review.elapsed_days = previous
                    .filter(|(card_id, _)| *card_id == review.card_id)
                    .map(|(_, previous_date)| (date - previous_date).num_days());
                previous = Some((review.card_id, date));
                review
            })
            .collect();

        Ok(Self {
            info,
            cards,
            reviews,
            dropped_reviews: 0,
            browser: None,
        })
    }

    /// An empty collection with default settings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            info: CollectionInfo::default(),
            cards: vec![],
            reviews: vec![],
            dropped_reviews: 0,
            browser: None,
        }
    }

    /// Left-joins browser-export columns onto the cards; rows of cards that
    /// are not in the collection are discarded.
    #[must_use]
    pub fn with_browser(mut self, mut browser: BrowserColumns) -> Self {
        let ids = self.cards.iter().map(|card| card.id).collect::<BTreeSet<_>>();
        let exported = browser.rows.len();
        browser.rows.retain(|id, _| ids.contains(id));
        let unmatched = exported - browser.rows.len();
        if unmatched > 0 {
            tracing::debug!(unmatched, "browser rows without a matching card");
        }
        self.browser = Some(browser);
        self
    }

    /// Time of the most recent study event of each card.
    #[must_use]
    pub fn last_studied(&self) -> BTreeMap<CardId, DateTime<Utc>> {
        let mut last = BTreeMap::new();
        for review in self.reviews.iter().filter(|review| review.kind.is_study()) {
            last.insert(review.card_id, review.reviewed_at);
        }
        last
    }
}
