//! State owned by the scheduler loop.

use crate::civil::{CalendarDate, CivilTime};
use crate::sensor::SensorReading;
use crate::zone::Resync;

/// Everything the clock face shows.
///
/// Owned by exactly one scheduler and only changed from its loop: by ticks,
/// by resync results and by successful sensor reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockState {
    pub time: CivilTime,
    /// `None` until the first successful resync
    pub date: Option<CalendarDate>,
    pub reading: SensorReading,
}

impl ClockState {
    /// State at power-on: midnight, no date, no reading.
    pub const fn new() -> Self {
        Self {
            time: CivilTime::MIDNIGHT,
            date: None,
            reading: SensorReading::EMPTY,
        }
    }

    /// Advances the clock by `ticks` seconds.
    pub fn tick(&mut self, ticks: u32) {
        if ticks == 1 {
            self.time.advance();
        } else {
            self.time.advance_by(ticks);
        }
    }

    /// Overwrites time and date with a resync result.
    pub fn apply_resync(&mut self, resync: &Resync) {
        self.time = resync.time;
        self.date = Some(resync.date);
    }

    /// Takes over every value present in `reading`; absent values keep the
    /// last known one.
    pub fn record(&mut self, reading: SensorReading) {
        if reading.temperature.is_some() {
            self.reading.temperature = reading.temperature;
        }
        if reading.humidity.is_some() {
            self.reading.humidity = reading.humidity;
        }
    }
}
