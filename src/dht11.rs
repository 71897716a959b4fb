//! DHT11 sensor on a single open-drain data line.
//!
//! The transaction itself (start pulse, 40-bit capture, checksum) is done by
//! the `dht-sensor` crate. [`Dht11`] owns the pin and the microsecond delay
//! it needs and exposes the sensor as a [`SensorBus`].

use dht_sensor::{dht11, DhtError};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;
use crate::sensor::{Measurement, SensorBus};

/// DHT11 on `pin`, timed with `delay`.
///
/// The pin must be configured as open drain with a pull-up, so that both
/// the host and the sensor can drive the line low.
pub struct Dht11<P, W> {
    pin: P,
    delay: W,
}

impl<P, W> Dht11<P, W>
where
    P: InputPin + OutputPin,
{
    /// Takes the data line and releases it high, the idle level the sensor
    /// expects before a start pulse.
    pub fn new(mut pin: P, delay: W) -> Self {
        if pin.set_high().is_err() {
            warn!("DHT11: could not release the data line");
        }
        Self { pin, delay }
    }
}

fn measurement(reading: dht11::Reading) -> Measurement {
    Measurement {
        temperature: f32::from(reading.temperature),
        humidity: f32::from(reading.relative_humidity),
    }
}

fn sensor_error<E>(e: DhtError<E>) -> SensorError {
    match e {
        DhtError::ChecksumMismatch => SensorError::Checksum,
        // no answer, a short frame or a pin fault all look like silence
        _ => SensorError::Timeout,
    }
}

impl<P, W> SensorBus for Dht11<P, W>
where
    P: InputPin + OutputPin,
    W: DelayNs,
{
    fn transact(&mut self) -> Result<Measurement, SensorError> {
        let reading = dht11::blocking::read(&mut self.delay, &mut self.pin).map_err(sensor_error)?;
        trace!(
            "DHT11: {} C, {} %",
            reading.temperature,
            reading.relative_humidity
        );
        Ok(measurement(reading))
    }
}

#[cfg(feature = "async")]
impl<P, W> crate::asynch::SensorBus for Dht11<P, W>
where
    P: InputPin + OutputPin,
    W: embedded_hal_async::delay::DelayNs,
{
    async fn transact(&mut self) -> Result<Measurement, SensorError> {
        let reading = dht11::r#async::read(&mut self.delay, &mut self.pin)
            .await
            .map_err(sensor_error)?;
        trace!(
            "DHT11: {} C, {} %",
            reading.temperature,
            reading.relative_humidity
        );
        Ok(measurement(reading))
    }
}
