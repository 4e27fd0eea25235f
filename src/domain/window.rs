//! Date window and month arithmetic.

use chrono::{Datelike, NaiveDate};

use crate::error::AppError;

/// Half-open date range `[start, end)` that every query in a run shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::invalid_input(format!(
                "Date window start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Last day inside the window, `None` when the window is empty.
    pub fn last_day(&self) -> Option<NaiveDate> {
        if self.is_empty() { None } else { self.end.pred_opt() }
    }

    /// Timeframe string understood by the trends service (`"YYYY-MM-DD YYYY-MM-DD"`).
    ///
    /// The service treats both bounds as inclusive, so the upper bound is the
    /// last day before `end`.
    pub fn timeframe(&self) -> String {
        let last = self.last_day().unwrap_or(self.end);
        format!("{} {}", self.start.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
    }

    /// Ordered month-start grid covering the window.
    ///
    /// Starts at the month containing `start` and stops at the month
    /// containing the last day before `end`, so every date inside the window
    /// truncates to a month on this grid.
    pub fn months(&self) -> Vec<NaiveDate> {
        let Some(last_day) = self.last_day() else {
            return Vec::new();
        };

        let last = month_start(last_day);
        let mut out = Vec::new();
        let mut cursor = Some(month_start(self.start));
        while let Some(month) = cursor {
            if month > last {
                break;
            }
            out.push(month);
            cursor = next_month(month);
        }
        out
    }
}

/// Truncate a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    if month.month() == 12 {
        NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
    }
}
