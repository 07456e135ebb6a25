//! Calendar days and the day grid of a backfill window

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use std::fmt;

/// A calendar day, represented as midnight UTC.
///
/// Wrapping `NaiveDate` keeps equality and ordering on the date alone, so two
/// values can never describe the same day with different times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Day(date)
    }

    /// Build a day from year/month/day, `None` for an impossible date
    #[cfg(test)]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Day)
    }

    /// The UTC calendar day containing `instant`
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Day(instant.date_naive())
    }

    /// Today in UTC
    pub fn today() -> Self {
        Self::containing(Utc::now())
    }

    /// Parse an RFC 3339 timestamp that must sit exactly on midnight UTC.
    ///
    /// Returns `None` for unparseable input or any other time of day, since a
    /// day key carrying a time component would break key uniqueness.
    pub fn parse_rfc3339(s: &str) -> Option<Self> {
        let instant = DateTime::parse_from_rfc3339(s).ok()?.with_timezone(&Utc);
        if instant.time() != NaiveTime::MIN {
            return None;
        }
        Some(Self::containing(instant))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Midnight UTC of this day
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }

    /// Unix seconds at midnight UTC
    pub fn unix_timestamp(&self) -> i64 {
        self.start().timestamp()
    }

    /// The day 24 hours earlier
    pub fn previous(&self) -> Option<Self> {
        self.0.pred_opt().map(Day)
    }

    /// RFC 3339 timestamp of midnight UTC, e.g. `2020-12-01T00:00:00Z`
    pub fn to_rfc3339(&self) -> String {
        self.start().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// The span of days a series should cover, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: Day,
    pub end: Day,
}

impl Window {
    pub fn new(start: Day, end: Day) -> Self {
        Self { start, end }
    }

    /// Window from a fixed start through the current UTC day
    pub fn through_today(start: Day) -> Self {
        Self::new(start, Day::today())
    }

    /// Every day of the window in ascending order
    pub fn days(&self) -> DayGrid {
        DayGrid::new(self.start, self.end)
    }

    pub fn contains(&self, day: Day) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Ascending sequence of days from `start` to `end`, one day apart.
///
/// Yields nothing when `start > end`. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct DayGrid {
    cursor: Option<Day>,
    end: Day,
}

impl DayGrid {
    const STEP: i64 = 1;

    pub fn new(start: Day, end: Day) -> Self {
        Self {
            cursor: Some(start),
            end,
        }
    }
}

impl Iterator for DayGrid {
    type Item = Day;

    fn next(&mut self) -> Option<Day> {
        let current = self.cursor.filter(|day| *day <= self.end)?;
        self.cursor = current
            .date()
            .checked_add_signed(Duration::days(Self::STEP))
            .map(Day);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Some(day) if day <= self.end => {
                let remaining = (self.end.date() - day.date()).num_days() as usize + 1;
                (remaining, Some(remaining))
            }
            _ => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for DayGrid {}
