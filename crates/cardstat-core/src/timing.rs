//! Study days and day offsets
//!
//! A study day starts at the collection's rollover hour rather than at
//! midnight. [`StudyCalendar`] maps timestamps to study dates and local hours;
//! [`DayClock`] additionally fixes "now" and expresses timestamps as day
//! offsets from the start of the next study day, which is how the host
//! application places reviews and dues on its charts.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Timelike, Utc};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Dues above this value are epoch seconds rather than day numbers.
pub const EPOCH_DUE_THRESHOLD: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyCalendar {
    offset: FixedOffset,
    rollover_hour: u32,
}

impl StudyCalendar {
    /// Rollover hours above 23 are clamped to 23.
    #[must_use]
    pub fn new(offset: FixedOffset, rollover_hour: u32) -> Self {
        Self {
            offset,
            rollover_hour: rollover_hour.min(23),
        }
    }

    #[must_use]
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local date shifted back by the rollover hour.
    #[must_use]
    pub fn study_date(&self, at: DateTime<Utc>) -> NaiveDate {
        let local = at.with_timezone(&self.offset).naive_local();
        (local - TimeDelta::hours(i64::from(self.rollover_hour))).date()
    }

    /// Local wall-clock hour (0-23).
    #[must_use]
    pub fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.offset).hour()
    }
}

/// A [`StudyCalendar`] anchored at a fixed "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayClock {
    calendar: StudyCalendar,
    now: DateTime<Utc>,
    next_day_start: DateTime<Utc>,
}

impl DayClock {
    #[must_use]
    pub fn new(calendar: StudyCalendar, now: DateTime<Utc>) -> Self {
        let local = now.with_timezone(&calendar.offset).naive_local();
        let rollover = TimeDelta::hours(i64::from(calendar.rollover_hour));
        let mut start = local.date().and_time(NaiveTime::MIN) + rollover;
        if local.hour() >= calendar.rollover_hour {
            start += TimeDelta::days(1);
        }
        let utc_offset = TimeDelta::seconds(i64::from(calendar.offset.local_minus_utc()));
        let next_day_start = DateTime::from_naive_utc_and_offset(start - utc_offset, Utc);
        Self {
            calendar,
            now,
            next_day_start,
        }
    }

    #[must_use]
    pub fn calendar(&self) -> &StudyCalendar {
        &self.calendar
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn next_day_start(&self) -> DateTime<Utc> {
        self.next_day_start
    }

    /// Study date of "now".
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.calendar.study_date(self.now)
    }

    /// Whole days from the next day start, rounded toward zero
    /// (0 is today, -1 yesterday).
    ///
    /// Times up to a day after the next day start also map to 0, so a time
    /// after "now" is indistinguishable from one earlier today; callers
    /// compare against [`DayClock::now`] to tell them apart.
    #[must_use]
    pub fn relative_day(&self, at: DateTime<Utc>) -> i64 {
        self.millis_since_next_day(at) / MILLIS_PER_DAY
    }

    /// Days from the next day start, rounded up.
    #[must_use]
    pub fn relative_day_ceil(&self, at: DateTime<Utc>) -> i64 {
        -(-self.millis_since_next_day(at)).div_euclid(MILLIS_PER_DAY)
    }

    /// Days from today until a due value.
    ///
    /// Dues above [`EPOCH_DUE_THRESHOLD`] are epoch seconds; smaller values are
    /// day numbers counted from collection creation.
    #[must_use]
    pub fn due_in_days(&self, due: i64, today_days_elapsed: i64) -> i64 {
        if due > EPOCH_DUE_THRESHOLD {
            let due_ms = due.saturating_mul(1000);
            (due_ms - self.next_day_start.timestamp_millis()) / MILLIS_PER_DAY
        } else {
            due - today_days_elapsed
        }
    }

    /// Days elapsed between `at` and now, as a fraction.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn days_since(&self, at: DateTime<Utc>) -> f64 {
        (self.now - at).num_milliseconds() as f64 / MILLIS_PER_DAY as f64
    }

    fn millis_since_next_day(&self, at: DateTime<Utc>) -> i64 {
        at.timestamp_millis() - self.next_day_start.timestamp_millis()
    }
}
