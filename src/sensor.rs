//! Sensor adapter: settle, transact, report.

use embedded_hal::delay::DelayNs;

use crate::console::Report;
use crate::error::SensorError;

/// Report message for a failed sensor read.
pub const READ_ERROR: &str = "DHT11 read error:";

/// One successful sensor transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
}

/// Last known sensor values; `None` until the sensor has delivered one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorReading {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

impl SensorReading {
    pub const EMPTY: SensorReading = SensorReading {
        temperature: None,
        humidity: None,
    };
}

impl From<Measurement> for SensorReading {
    fn from(m: Measurement) -> Self {
        Self {
            temperature: Some(m.temperature),
            humidity: Some(m.humidity),
        }
    }
}

/// Sensor transaction primitive.
pub trait SensorBus {
    /// Performs one complete transaction with the sensor.
    fn transact(&mut self) -> Result<Measurement, SensorError>;
}

impl<T: SensorBus + ?Sized> SensorBus for &mut T {
    fn transact(&mut self) -> Result<Measurement, SensorError> {
        T::transact(self)
    }
}

/// Wraps a [`SensorBus`] with the settling delay and error reporting.
pub struct Sensor<B, W> {
    bus: B,
    delay: W,
    settle_ms: u32,
}

impl<B: SensorBus, W: DelayNs> Sensor<B, W> {
    pub fn new(bus: B, delay: W, settle_ms: u32) -> Self {
        Self {
            bus,
            delay,
            settle_ms,
        }
    }

    /// Waits for the sensor to settle, then reads it.
    ///
    /// A failure is reported through `reporter` before it is returned. The
    /// caller must keep its previous reading.
    pub fn read<R: Report>(&mut self, reporter: &mut R) -> Result<SensorReading, SensorError> {
        self.delay.delay_ms(self.settle_ms);
        match self.bus.transact() {
            Ok(m) => {
                debug!("sensor: {} C, {} %", m.temperature, m.humidity);
                Ok(m.into())
            }
            Err(e) => {
                reporter.report(READ_ERROR, e.as_str());
                Err(e)
            }
        }
    }
}
