use std::fmt;
use std::mem;

use chrono::{Datelike, Duration, NaiveDate};
use log::{info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";
const FALLBACK_DAYS: i64 = 180;

/// Inclusive range of days to export. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds the range from two `YYYY-MM-DD` strings.
    ///
    /// Never fails. If either string does not parse, the whole range becomes
    /// `today ..= today + 180 days`. Otherwise reversed bounds are swapped and
    /// an end date in February past the 28th is pulled back to the 28th.
    pub fn resolve(start: &str, end: &str, today: NaiveDate) -> Self {
        let parsed = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).and_then(|start| {
            NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).map(|end| (start, end))
        });

        let (mut start, mut end) = match parsed {
            Ok(bounds) => bounds,
            Err(err) => {
                let range = Self::fallback(today);
                warn!(
                    "Invalid date range `{start}` .. `{end}` ({err}), using {} .. {}",
                    range.start, range.end
                );
                return range;
            }
        };

        if start > end {
            warn!("Start date {start} is after end date {end}, swapping them");
            mem::swap(&mut start, &mut end);
        }

        if end.month() == 2 && end.day() > 28 {
            // Feb 29 is never produced, even in leap years.
            if let Some(clamped) = end.with_day(28) {
                warn!("End date {end} clamped to {clamped}");
                end = clamped;
            }
        }

        if start > end {
            warn!("Start date {start} is after clamped end date {end}, starting on {end}");
            start = end;
        }

        info!("Exporting agenda from {start} to {end}");
        Self { start, end }
    }

    pub fn fallback(today: NaiveDate) -> Self {
        Self {
            start: today,
            end: today + Duration::days(FALLBACK_DAYS),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn weeks(&self) -> WeekRange {
        WeekRange {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Walks a [`DateRange`] in 7-day strides, yielding every stride `<= end`.
pub struct WeekRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for WeekRange {
    type Item = Week;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|date| *date <= self.end)?;
        self.next = current.checked_add_signed(Duration::days(7));
        Some(Week(current))
    }
}

/// First day of one stride, as handed to the agenda source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Week(pub NaiveDate);

impl Week {
    /// `DD-MM`
    pub fn day_month(&self) -> String {
        self.0.format("%d-%m").to_string()
    }

    /// `YYYY`
    pub fn year(&self) -> String {
        self.0.format("%Y").to_string()
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.day_month(), self.year())
    }
}
