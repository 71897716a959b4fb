//! Calendar-free time of day and the last known calendar date.
//!
//! [`CivilTime`] is advanced locally one second per tick between resyncs and
//! wraps at midnight without touching the date. [`CalendarDate`] is only ever
//! replaced by a resync; it never advances on its own.

use core::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

const SECONDS_PER_DAY: u32 = 86_400;

/// Errors that can occur when building a [`CivilTime`] from raw parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CivilTimeError {
    /// Hour, minute or second out of range
    OutOfRange,
}

/// Time of day with second resolution.
///
/// All three fields are always in range (`0..24`, `0..60`, `0..60`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CivilTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl CivilTime {
    /// Midnight, the value the clock starts from before its first resync.
    pub const MIDNIGHT: CivilTime = CivilTime {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Creates a time of day, validating every component.
    ///
    /// # Arguments
    /// * `hour` - 0-23
    /// * `minute` - 0-59
    /// * `second` - 0-59
    ///
    /// # Returns
    /// * `Ok(CivilTime)` when all components are in range
    /// * `Err(CivilTimeError::OutOfRange)` otherwise
    pub const fn new(hour: u8, minute: u8, second: u8) -> Result<Self, CivilTimeError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(CivilTimeError::OutOfRange);
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Advances by one second, cascading into minutes and hours and wrapping
    /// at midnight.
    pub fn advance(&mut self) {
        self.second += 1;
        if self.second >= 60 {
            self.second = 0;
            self.minute += 1;
            if self.minute >= 60 {
                self.minute = 0;
                self.hour += 1;
                if self.hour >= 24 {
                    self.hour = 0;
                }
            }
        }
    }

    /// Advances by `seconds`, equivalent to calling [`advance`](Self::advance)
    /// that many times.
    pub fn advance_by(&mut self, seconds: u32) {
        let total = (self.seconds_of_day() + seconds % SECONDS_PER_DAY) % SECONDS_PER_DAY;
        // total < 86_400, so every component fits in a u8
        self.hour = (total / 3600) as u8;
        self.minute = (total / 60 % 60) as u8;
        self.second = (total % 60) as u8;
    }

    fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }
}

impl From<NaiveTime> for CivilTime {
    fn from(t: NaiveTime) -> Self {
        // chrono reports a leap second as second 59 with a nanosecond overflow,
        // so second() never exceeds 59
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
        }
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Calendar date as reported by the time source, passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl From<NaiveDate> for CalendarDate {
    fn from(d: NaiveDate) -> Self {
        Self {
            year: d.year(),
            month: d.month() as u8,
            day: d.day() as u8,
        }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}.{:02}.{:02}", self.year, self.month, self.day)
    }
}
