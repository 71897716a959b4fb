//! Fixed-rule local time for an EET/EEST zone.
//!
//! The offset is approximated from the calendar date alone: summer time
//! (UTC+3) from 25 March until 30 October, standard time (UTC+2) otherwise.
//!
//! # Known limitation
//!
//! The offset is added to the hour modulo 24 and the date is left as the
//! UTC date. Between 21:00 and 23:59 UTC (22:00 in winter) the displayed
//! time has already rolled past local midnight while the displayed date is
//! still the previous day. This is accepted; the date is not corrected.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::civil::{CalendarDate, CivilTime};

/// Standard time offset in hours.
pub const STANDARD_OFFSET_HOURS: u8 = 2;
/// Summer time offset in hours.
pub const SUMMER_OFFSET_HOURS: u8 = 3;

/// Returns the UTC offset in hours for a calendar date.
///
/// `3` when the month is strictly between March and October, from 25 March
/// on, or before 31 October; `2` otherwise.
pub const fn utc_offset_hours(month: u32, day: u32) -> u8 {
    if (month > 3 && month < 10) || (month == 3 && day >= 25) || (month == 10 && day < 31) {
        SUMMER_OFFSET_HOURS
    } else {
        STANDARD_OFFSET_HOURS
    }
}

/// Result of a successful resync: the local time of day plus the UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resync {
    pub time: CivilTime,
    pub date: CalendarDate,
    pub offset_hours: u8,
}

/// Converts a UTC timestamp into the local time of day and the unadjusted
/// UTC date.
pub fn localize(utc: &NaiveDateTime) -> Resync {
    let offset_hours = utc_offset_hours(utc.month(), utc.day());
    let mut time = CivilTime::from(utc.time());
    time.advance_by(u32::from(offset_hours) * 3600);
    debug!(
        "localized {}:{}:{} UTC with offset +{}",
        utc.hour(),
        utc.minute(),
        utc.second(),
        offset_hours
    );
    Resync {
        time,
        date: CalendarDate::from(utc.date()),
        offset_hours,
    }
}
