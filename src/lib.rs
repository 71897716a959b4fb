//! Firmware core of a network-synchronised desk clock.
//!
//! A single cooperative [`Scheduler`] keeps local time of day with a one
//! second tick, redraws a small text display, samples a temperature and
//! humidity sensor every two seconds and resynchronises from an SNTP server
//! every minute. Hardware and network access go through small traits
//! ([`Link`], [`NetworkTime`], [`SensorBus`], [`TextDisplay`]) implemented by
//! the board support code. [`ntp`] provides the SNTP packet codec for the
//! usual [`NetworkTime`] implementation and [`dht11`] a ready [`SensorBus`]
//! for a DHT11 on a GPIO pin.
//!
//! Every transient failure is shown on the display for a few seconds, logged
//! and then absorbed. Only a failure to bring the display or the network up
//! ends the scheduler.
//!
//! # Features
//!
//! - `async`: adds [`asynch`], the same clock on `embedded-hal-async`
//! - `log` / `defmt`: route diagnostics to the respective logger
//!
//! # Example
//!
//! ```rust,ignore
//! use netclock::{Config, Scheduler};
//!
//! let scheduler = Scheduler::new(Config::default(), sntp, dht, oled, || millis(), delay);
//! // only returns if startup fails
//! let err = scheduler.run(&mut wifi).unwrap_err();
//! ```

#![no_std]

#[macro_use]
mod fmt;

pub mod civil;
pub mod config;
pub mod console;
pub mod dht11;
pub mod display;
pub mod error;
pub mod net;
pub mod ntp;
pub mod schedule;
pub mod scheduler;
pub mod sensor;
pub mod state;
pub mod time_source;
pub mod zone;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(test)]
mod testing;

pub use civil::{CalendarDate, CivilTime, CivilTimeError};
pub use config::{Config, ResyncPolicy};
pub use console::{Console, Report};
pub use dht11::Dht11;
pub use display::{compose, Frame, TextDisplay};
pub use error::{LinkError, QueryError, SensorError, StartupError, TimeSourceError};
pub use net::{Link, NetworkTime};
pub use schedule::{Due, Monotonic, Schedule};
pub use scheduler::Scheduler;
pub use sensor::{Measurement, Sensor, SensorBus, SensorReading};
pub use state::ClockState;
pub use time_source::TimeSource;
pub use zone::{localize, utc_offset_hours, Resync};
