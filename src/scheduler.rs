//! The cooperative scheduler loop.
//!
//! One logical task drives everything. Each iteration takes a single
//! monotonic snapshot and, against that snapshot:
//!
//! 1. advances the clock and redraws the face when a tick is due,
//! 2. within that same tick, reads the sensor when its cadence has elapsed,
//! 3. independently of the tick, resyncs when the resync cadence is due,
//!
//! then sleeps for the idle quantum. Adapter calls run to completion; a slow
//! adapter stalls the whole loop and the missed ticks are caught up on the
//! next iteration.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::console::{Console, Report};
use crate::display::{compose, TextDisplay};
use crate::error::StartupError;
use crate::net::{Link, NetworkTime};
use crate::schedule::{Due, Monotonic, Schedule};
use crate::sensor::{Sensor, SensorBus};
use crate::state::ClockState;
use crate::time_source::TimeSource;

/// Report message for an unrecoverable startup failure.
pub const STARTUP_ERROR: &str = "Startup error:";
const CONNECTING: &str = "Connecting...";
const CONNECTED: &str = "Connected!";

/// Owns the clock state and every adapter.
///
/// `W` is cloned once per adapter so that each pause goes through its own
/// delay instance.
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
    /// Creates a scheduler. Nothing is touched until [`start`](Self::start).
    ///
    /// # Arguments
    /// * `config` - Timing and server configuration
    /// * `net` - Network time query primitive
    /// * `bus` - Sensor transaction primitive
    /// * `display` - Display primitive
    /// * `monotonic` - Millisecond counter the cadences are measured against
    /// * `delay` - Delay used for every pause
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

    /// Brings the clock up: associates with the network, runs the first
    /// resync and seeds the schedule.
    ///
    /// A failed first resync is not fatal; the clock starts from midnight
    /// and retries on the resync cadence.
    ///
    /// # Returns
    /// * `Ok(())` when the loop may start
    /// * `Err(StartupError::Display)` if the display rejects the first frame
    /// * `Err(StartupError::Link)` if network association fails
    pub fn start<L: Link>(&mut self, link: &mut L) -> Result<(), StartupError<D::Error>> {
        self.console
            .status(CONNECTING)
            .map_err(StartupError::Display)?;
        link.connect()?;
        info!("network connected");
        if self.console.status(CONNECTED).is_err() {
            warn!("display refresh failed");
        }
        self.console.hold(self.config.connected_hold_ms);

        self.resync();

        let now = self.monotonic.now_ms();
        self.schedule = Schedule::new(now);
        Ok(())
    }

    /// Runs one loop iteration, without the idle pause.
    ///
    /// Returns what was due at this iteration's snapshot.
    pub fn step(&mut self) -> Due {
        let now = self.monotonic.now_ms();
        let due = self.schedule.poll(now, &self.config);

        if due.tick() {
            self.state.tick(due.ticks);
            if due.sensor {
                if let Ok(reading) = self.sensor.read(&mut self.console) {
                    self.state.record(reading);
                }
            }
            if self.console.draw(&compose(&self.state)).is_err() {
                warn!("display refresh failed");
            }
        }

        if due.resync {
            self.resync();
        }

        due
    }

    /// Starts the clock and loops forever.
    ///
    /// Only returns on a startup failure, after it has been reported. The
    /// caller is expected to halt or reset.
    pub fn run<L: Link>(mut self, link: &mut L) -> Result<Infallible, StartupError<D::Error>> {
        if let Err(e) = self.start(link) {
            self.console.report(STARTUP_ERROR, e.as_str());
            return Err(e);
        }
        info!("entering scheduler loop");
        loop {
            self.step();
            self.idle.delay_ms(self.config.idle_quantum_ms);
        }
    }

    fn resync(&mut self) {
        // failures were already reported and logged by the time source
        if let Ok(resync) = self.time_source.fetch(&mut self.console) {
            self.state.apply_resync(&resync);
            let now = self.monotonic.now_ms();
            self.schedule.skip_tick_backlog(now, &self.config);
            info!(
                "clock set to {}:{}:{} (UTC+{})",
                resync.time.hour(),
                resync.time.minute(),
                resync.time.second(),
                resync.offset_hours
            );
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }
}
