//! Report configuration
//!
//! Every option of the statistics window that the report reproduces is fixed
//! here, one field per table option. All fields have defaults, so an empty
//! JSON object is a valid configuration:
//!
//! ```json
//! {
//!   "now": "2024-05-10T12:00:00+09:00",
//!   "future_due_days": 30,
//!   "review_days": 30,
//!   "added_days": 31,
//!   "hourly_days": null,
//!   "filtered_reviews": "when-rescheduled",
//!   "timeliness_tolerance_days": 0
//! }
//! ```
//!
//! Day counts must lie within `0..=`[`MAX_WINDOW_DAYS`]; see
//! [`StatsConfig::validate`].

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// Largest accepted day count (100 years).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Point in time the report is computed for. Its offset places reviews on
    /// study days. Defaults to the current local time.
    pub now: Option<DateTime<FixedOffset>>,
    /// Last day shown by the future-due table (1 month).
    pub future_due_days: i64,
    /// Days of history shown by the review tables (1 month).
    pub review_days: i64,
    /// Days of history shown by the added table (1 month).
    pub added_days: i64,
    /// Days of history used by the hourly breakdown; `None` uses all history.
    pub hourly_days: Option<i64>,
    pub filtered_reviews: FilteredReviewPolicy,
    /// Days an elapsed interval may deviate from the scheduled one and still
    /// count as on time.
    pub timeliness_tolerance_days: i64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            now: None,
            future_due_days: 30,
            review_days: 30,
            added_days: 31,
            hourly_days: None,
            filtered_reviews: FilteredReviewPolicy::default(),
            timeliness_tolerance_days: 0,
        }
    }
}

impl StatsConfig {
    /// The configured "now", or the current local time.
    #[must_use]
    pub fn resolve_now(&self) -> DateTime<FixedOffset> {
        self.now.unwrap_or_else(|| Local::now().fixed_offset())
    }

    /// Checks that every day count lies within `0..=MAX_WINDOW_DAYS`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`] naming the first field out of range.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        let fields = [
            ("future_due_days", Some(self.future_due_days)),
            ("review_days", Some(self.review_days)),
            ("added_days", Some(self.added_days)),
            ("hourly_days", self.hourly_days),
            ("timeliness_tolerance_days", Some(self.timeliness_tolerance_days)),
        ];
        for (field, value) in fields {
            if let Some(value) = value.filter(|days| !(0..=MAX_WINDOW_DAYS).contains(days)) {
                return Err(InvalidConfig { field, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("`{field}` must be between 0 and {} days, got {value}", MAX_WINDOW_DAYS)]
pub struct InvalidConfig {
    pub field: &'static str,
    pub value: i64,
}

/// Whether reviews done in a filtered deck count toward accuracy.
///
/// The host application's rule is not documented. With the default,
/// a filtered-deck review counts only when it rescheduled the card, which
/// shows as a non-zero ease factor in the review log.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum FilteredReviewPolicy {
    #[default]
    #[display("when-rescheduled")]
    WhenRescheduled,
    #[display("always")]
    Always,
    #[display("never")]
    Never,
}
