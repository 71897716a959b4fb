//! Async variant of the clock.
//!
//! Mirrors the blocking API with `async` primitives, for executors such as
//! Embassy where the network stack and sensor driver are async. Only
//! available with the `async` feature.
//!
//! The scheduling rules, state, compositor and zone conversion are shared
//! with the blocking scheduler. The display stays a blocking
//! [`TextDisplay`]; drawing text into a framebuffer does not await.
//!
//! # Example
//!
//! ```rust,ignore
//! use netclock::asynch::Scheduler;
//! use netclock::Config;
//!
//! let scheduler = Scheduler::new(Config::default(), sntp, dht, oled, || now_ms(), Delay);
//! let err = scheduler.run(&mut wifi).await.unwrap_err();
//! ```

use core::convert::Infallible;

use chrono::NaiveDateTime;
use embedded_hal_async::delay::DelayNs;

use crate::config::Config;
use crate::display::{compose, Frame, TextDisplay};
use crate::error::{LinkError, QueryError, SensorError, StartupError, TimeSourceError};
use crate::schedule::{Due, Monotonic, Schedule};
use crate::scheduler::STARTUP_ERROR;
use crate::sensor::{Measurement, SensorReading, READ_ERROR};
use crate::state::ClockState;
use crate::time_source::FETCH_ERROR;
use crate::zone::{localize, Resync};

/// Async network association.
#[allow(async_fn_in_trait)]
pub trait Link {
    async fn connect(&mut self) -> Result<(), LinkError>;
}

impl<T: Link> Link for &mut T {
    async fn connect(&mut self) -> Result<(), LinkError> {
        T::connect(self).await
    }
}

/// Async network time query.
#[allow(async_fn_in_trait)]
pub trait NetworkTime {
    /// Asks `host` for the current time, returned as UTC.
    async fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError>;
}

impl<T: NetworkTime> NetworkTime for &mut T {
    async fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError> {
        T::query(self, host).await
    }
}

/// Async sensor transaction.
#[allow(async_fn_in_trait)]
pub trait SensorBus {
    async fn transact(&mut self) -> Result<Measurement, SensorError>;
}

impl<T: SensorBus> SensorBus for &mut T {
    async fn transact(&mut self) -> Result<Measurement, SensorError> {
        T::transact(self).await
    }
}

/// Async sink for user-visible error reports.
#[allow(async_fn_in_trait)]
pub trait Report {
    async fn report(&mut self, message: &str, details: &str);
}

impl<R: Report> Report for &mut R {
    async fn report(&mut self, message: &str, details: &str) {
        R::report(self, message, details).await
    }
}

/// Display owner and error reporter.
pub struct Console<D, W> {
    display: D,
    delay: W,
    hold_ms: u32,
}

impl<D: TextDisplay, W: DelayNs> Console<D, W> {
    pub fn new(display: D, delay: W, hold_ms: u32) -> Self {
        Self {
            display,
            delay,
            hold_ms,
        }
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<(), D::Error> {
        frame.draw(&mut self.display)
    }

    pub fn status(&mut self, text: &str) -> Result<(), D::Error> {
        debug!("status: {}", text);
        self.draw(&Frame::from_lines(&[text]))
    }

    pub async fn hold(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }
}

impl<D: TextDisplay, W: DelayNs> Report for Console<D, W> {
    async fn report(&mut self, message: &str, details: &str) {
        error!("{} {}", message, details);
        if self.draw(&Frame::from_lines(&[message, details])).is_err() {
            warn!("display unavailable, error report is only logged");
        }
        self.delay.delay_ms(self.hold_ms).await;
    }
}

/// Bounded-retry network time acquisition.
pub struct TimeSource<N, W> {
    net: N,
    delay: W,
    host: &'static str,
    attempts: u8,
    backoff_ms: u32,
}

impl<N: NetworkTime, W: DelayNs> TimeSource<N, W> {
    pub fn new(net: N, delay: W, host: &'static str, attempts: u8, backoff_ms: u32) -> Self {
        Self {
            net,
            delay,
            host,
            attempts: attempts.max(1),
            backoff_ms,
        }
    }

    /// Fetches the current local time and date.
    ///
    /// Same contract as [`crate::TimeSource::fetch`].
    pub async fn fetch<R: Report>(&mut self, reporter: &mut R) -> Result<Resync, TimeSourceError> {
        let mut last = QueryError::Transport;
        for attempt in 1..=self.attempts {
            debug!("querying {} (attempt {})", self.host, attempt);
            match self.net.query(self.host).await {
                Ok(utc) => {
                    info!("time synchronized on attempt {}", attempt);
                    return Ok(localize(&utc));
                }
                Err(e) => {
                    last = e;
                    reporter.report(FETCH_ERROR, e.as_str()).await;
                    if attempt < self.attempts {
                        self.delay.delay_ms(self.backoff_ms).await;
                    }
                }
            }
        }
        error!("Failed to fetch time after {} attempts", self.attempts);
        Err(TimeSourceError::RetriesExhausted {
            attempts: self.attempts,
            last,
        })
    }
}

/// Sensor with settling delay and error reporting.
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

    pub async fn read<R: Report>(
        &mut self,
        reporter: &mut R,
    ) -> Result<SensorReading, SensorError> {
        self.delay.delay_ms(self.settle_ms).await;
        match self.bus.transact().await {
            Ok(m) => {
                debug!("sensor: {} C, {} %", m.temperature, m.humidity);
                Ok(m.into())
            }
            Err(e) => {
                reporter.report(READ_ERROR, e.as_str()).await;
                Err(e)
            }
        }
    }
}

/// Async scheduler loop. See [`crate::Scheduler`] for the loop rules.
pub struct Scheduler<N, B, D, M, W> {
    config: Config,
    time_source: TimeSource<N, W>,
    sensor: Sensor<B, W>,
    console: Console<D, W>,
    monotonic: M,
    idle: W,
    state: ClockState,
    schedule: Schedule,
}

impl<N, B, D, M, W> Scheduler<N, B, D, M, W>
where
    N: NetworkTime,
    B: SensorBus,
    D: TextDisplay,
    M: Monotonic,
    W: DelayNs + Clone,
{
    pub fn new(config: Config, net: N, bus: B, display: D, mut monotonic: M, delay: W) -> Self {
        let now = monotonic.now_ms();
        Self {
            time_source: TimeSource::new(
                net,
                delay.clone(),
                config.ntp_host,
                config.sync_attempts,
                config.sync_backoff_ms,
            ),
            sensor: Sensor::new(bus, delay.clone(), config.sensor_settle_ms),
            console: Console::new(display, delay.clone(), config.error_hold_ms),
            monotonic,
            idle: delay,
            state: ClockState::new(),
            schedule: Schedule::new(now),
            config,
        }
    }

    pub async fn start<L: Link>(&mut self, link: &mut L) -> Result<(), StartupError<D::Error>> {
        self.console
            .status("Connecting...")
            .map_err(StartupError::Display)?;
        link.connect().await?;
        info!("network connected");
        if self.console.status("Connected!").is_err() {
            warn!("display refresh failed");
        }
        self.console.hold(self.config.connected_hold_ms).await;

        self.resync().await;

        let now = self.monotonic.now_ms();
        self.schedule = Schedule::new(now);
        Ok(())
    }

    pub async fn step(&mut self) -> Due {
        let now = self.monotonic.now_ms();
        let due = self.schedule.poll(now, &self.config);

        if due.tick() {
            self.state.tick(due.ticks);
            if due.sensor {
                if let Ok(reading) = self.sensor.read(&mut self.console).await {
                    self.state.record(reading);
                }
            }
            if self.console.draw(&compose(&self.state)).is_err() {
                warn!("display refresh failed");
            }
        }

        if due.resync {
            self.resync().await;
        }

        due
    }

    pub async fn run<L: Link>(
        mut self,
        link: &mut L,
    ) -> Result<Infallible, StartupError<D::Error>> {
        if let Err(e) = self.start(link).await {
            self.console.report(STARTUP_ERROR, e.as_str()).await;
            return Err(e);
        }
        info!("entering scheduler loop");
        loop {
            self.step().await;
            self.idle.delay_ms(self.config.idle_quantum_ms).await;
        }
    }

    async fn resync(&mut self) {
        if let Ok(resync) = self.time_source.fetch(&mut self.console).await {
            self.state.apply_resync(&resync);
            let now = self.monotonic.now_ms();
            self.schedule.skip_tick_backlog(now, &self.config);
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }
}
