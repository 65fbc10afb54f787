//! Listing windows, in UTC epoch seconds, with calendar days taken in
//! Europe/Madrid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Madrid;
use serde::{Deserialize, Serialize};

/// Inclusive `[start, end]` range of document dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The last `minutes` up to `now`.
    pub fn last_minutes(now: DateTime<Utc>, minutes: u32) -> Self {
        let start = now - Duration::minutes(i64::from(minutes));
        Self::new(start.timestamp(), now.timestamp())
    }

    /// One Madrid calendar day, 00:00:00 to 23:59:59 local time.
    pub fn madrid_day(date: NaiveDate) -> Option<Self> {
        let start = Madrid
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest()?;
        let end = Madrid
            .from_local_datetime(&date.and_hms_opt(23, 59, 59)?)
            .latest()?;
        Some(Self::new(start.timestamp(), end.timestamp()))
    }

    /// Today plus `previous` earlier days, newest first, one window per day.
    pub fn recent_days(now: DateTime<Utc>, previous: u32) -> Vec<Self> {
        let today = now.with_timezone(&Madrid).date_naive();
        (0..=i64::from(previous))
            .filter_map(|back| today.checked_sub_signed(Duration::days(back)))
            .filter_map(Self::madrid_day)
            .collect()
    }

    /// 1 January (Madrid) up to `now`.
    pub fn year_to_date(now: DateTime<Utc>) -> Option<Self> {
        let jan1 = NaiveDate::from_ymd_opt(now.with_timezone(&Madrid).year(), 1, 1)?;
        let start = Self::madrid_day(jan1)?.start;
        Some(Self::new(start, now.timestamp()))
    }
}
