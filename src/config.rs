//! Timing and server configuration.

/// How the scheduler decides that a resync is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResyncPolicy {
    /// Resync once `period_ms` of monotonic time has elapsed since the last
    /// attempt.
    Elapsed { period_ms: u64 },
    /// Resync whenever the monotonic seconds counter is a multiple of
    /// `period_secs`, at most once per boundary second. Only as regular as
    /// the loop is able to observe that exact second.
    Aligned { period_secs: u64 },
}

/// Scheduler configuration.
///
/// The defaults reproduce the reference device: a one second tick, a sensor
/// read every two seconds and a resync every minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Hostname handed to the network time query
    pub ntp_host: &'static str,
    /// Period of the clock tick and display redraw
    pub tick_period_ms: u64,
    /// Minimum spacing between sensor reads, checked on each tick
    pub sensor_period_ms: u64,
    pub resync: ResyncPolicy,
    /// Pause at the end of every loop iteration
    pub idle_quantum_ms: u32,
    /// Network time queries per resync before giving up
    pub sync_attempts: u8,
    /// Pause between failed network time queries
    pub sync_backoff_ms: u32,
    /// Pause before every sensor transaction
    pub sensor_settle_ms: u32,
    /// How long an error report stays on screen
    pub error_hold_ms: u32,
    /// How long "Connected!" stays on screen during startup
    pub connected_hold_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ntp_host: "pool.ntp.org",
            tick_period_ms: 1_000,
            sensor_period_ms: 2_000,
            resync: ResyncPolicy::Elapsed { period_ms: 60_000 },
            idle_quantum_ms: 100,
            sync_attempts: 5,
            sync_backoff_ms: 2_000,
            sensor_settle_ms: 1_000,
            error_hold_ms: 5_000,
            connected_hold_ms: 2_000,
        }
    }
}
