use chrono::{Days, NaiveDate};

use crate::error::{Result, ScrapeError};

/// Half-open range of calendar days, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ScrapeError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Range covering `days` consecutive days beginning at `start`.
    pub fn from_day_count(start: NaiveDate, days: u32) -> Result<Self> {
        let end = start
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| ScrapeError::Config(format!("{} days past {} overflows", days, start)))?;
        DateRange::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> DateIter {
        DateIter {
            cursor: self.start,
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = DateIter;

    fn into_iter(self) -> DateIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct DateIter {
    cursor: NaiveDate,
    end: NaiveDate,
}

impl Iterator for DateIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.cursor == self.end {
            return None;
        }
        let current = self.cursor;
        // end is a valid date past cursor, so the successor exists
        self.cursor = self.cursor.succ_opt()?;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.cursor).num_days() as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateIter {}
