//! Due-ness bookkeeping for the three independently timed activities.
//!
//! [`Schedule`] only holds "last fired" timestamps. It is polled once per
//! loop iteration with a single monotonic snapshot and answers which
//! activities are due against that snapshot.

use crate::config::{Config, ResyncPolicy};

/// Monotonic millisecond counter, e.g. milliseconds since boot.
pub trait Monotonic {
    fn now_ms(&mut self) -> u64;
}

impl<F: FnMut() -> u64> Monotonic for F {
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

/// Activities due in one loop iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Due {
    /// Whole tick periods elapsed since the last tick; zero when no tick is due
    pub ticks: u32,
    /// A sensor read is due; only ever set together with a tick
    pub sensor: bool,
    pub resync: bool,
}

impl Due {
    pub const fn tick(&self) -> bool {
        self.ticks > 0
    }
}

/// Last-fired timestamps, in monotonic milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    last_tick: u64,
    last_sensor: u64,
    last_resync: u64,
    last_aligned_second: Option<u64>,
}

impl Schedule {
    /// Starts every cadence at `now`. Nothing is due until a full period has
    /// elapsed.
    pub const fn new(now: u64) -> Self {
        Self {
            last_tick: now,
            last_sensor: now,
            last_resync: now,
            last_aligned_second: None,
        }
    }

    /// Decides which activities are due at `now` and records them as fired.
    ///
    /// The tick stays phase-locked to its period: when several periods have
    /// elapsed, all of them are reported at once in [`Due::ticks`].
    pub fn poll(&mut self, now: u64, config: &Config) -> Due {
        let mut due = Due::default();

        let tick_period = config.tick_period_ms.max(1);
        let behind = now.saturating_sub(self.last_tick) / tick_period;
        if behind > 0 {
            self.last_tick += behind * tick_period;
            due.ticks = u32::try_from(behind).unwrap_or(u32::MAX);
            if behind > 1 {
                debug!("catching up {} missed ticks", behind);
            }

            if now.saturating_sub(self.last_sensor) >= config.sensor_period_ms {
                self.last_sensor = now;
                due.sensor = true;
            }
        }

        due.resync = match config.resync {
            ResyncPolicy::Elapsed { period_ms } => {
                let fire = now.saturating_sub(self.last_resync) >= period_ms;
                if fire {
                    self.last_resync = now;
                }
                fire
            }
            ResyncPolicy::Aligned { period_secs } => {
                let second = now / 1_000;
                let fire = period_secs > 0
                    && second % period_secs == 0
                    && self.last_aligned_second != Some(second);
                if fire {
                    self.last_aligned_second = Some(second);
                    self.last_resync = now;
                }
                fire
            }
        };

        trace!(
            "poll at {}: ticks={} sensor={} resync={}",
            now,
            due.ticks,
            due.sensor,
            due.resync
        );
        due
    }

    /// Drops the tick backlog accumulated up to `now`, keeping the phase.
    ///
    /// Called after the clock has been overwritten by a resync, whose value
    /// already accounts for the time spent obtaining it. Only whole periods
    /// are skipped, so ticks keep falling on the same boundaries.
    pub fn skip_tick_backlog(&mut self, now: u64, config: &Config) {
        let tick_period = config.tick_period_ms.max(1);
        let behind = now.saturating_sub(self.last_tick) / tick_period;
        self.last_tick += behind * tick_period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn test_nothing_due_before_first_period() {
        let cfg = config();
        let mut schedule = Schedule::new(0);
        for now in (0..1_000).step_by(100) {
            assert_eq!(schedule.poll(now, &cfg), Due::default());
        }
    }

    #[test]
    fn test_tick_is_phase_locked() {
        let cfg = config();
        let mut schedule = Schedule::new(0);
        let mut ticks = 0;
        // a quantum that does not divide the tick period
        for now in (0..=10_000).step_by(300) {
            ticks += schedule.poll(now, &cfg).ticks;
        }
        // last poll at 9_900
        assert_eq!(ticks, 9);
    }

    #[test]
    fn test_missed_ticks_are_reported_together() {
        let cfg = config();
        let mut schedule = Schedule::new(0);
        let due = schedule.poll(3_500, &cfg);
        assert_eq!(due.ticks, 3);
        assert_eq!(schedule.poll(3_600, &cfg).ticks, 0);
        assert_eq!(schedule.poll(4_000, &cfg).ticks, 1);
    }

    #[test]
    fn test_sensor_only_with_tick() {
        let cfg = Config {
            sensor_period_ms: 2_000,
            ..config()
        };
        let mut schedule = Schedule::new(0);
        assert!(!schedule.poll(1_000, &cfg).sensor);
        let due = schedule.poll(2_000, &cfg);
        assert!(due.tick() && due.sensor);
        // sensor cadence elapsed but no tick boundary crossed
        assert_eq!(schedule.poll(2_050, &cfg), Due::default());
        assert!(!schedule.poll(3_000, &cfg).sensor);
        assert!(schedule.poll(4_000, &cfg).sensor);
    }

    #[test]
    fn test_elapsed_resync_independent_of_tick() {
        let cfg = Config {
            resync: ResyncPolicy::Elapsed { period_ms: 60_500 },
            ..config()
        };
        let mut schedule = Schedule::new(0);
        let due = schedule.poll(60_000, &cfg);
        assert!(due.tick());
        assert!(!due.resync);
        let due = schedule.poll(60_500, &cfg);
        assert!(due.resync);
        assert!(!due.tick());
        assert!(!schedule.poll(60_600, &cfg).resync);
        assert!(!schedule.poll(120_900, &cfg).resync);
        assert!(schedule.poll(121_000, &cfg).resync);
    }

    #[test]
    fn test_aligned_resync_fires_once_per_boundary() {
        let cfg = Config {
            resync: ResyncPolicy::Aligned { period_secs: 60 },
            ..config()
        };
        let mut schedule = Schedule::new(0);
        // second 0 is itself a boundary
        assert!(schedule.poll(0, &cfg).resync);
        assert!(!schedule.poll(500, &cfg).resync);
        assert!(!schedule.poll(59_900, &cfg).resync);
        assert!(schedule.poll(60_000, &cfg).resync);
        assert!(!schedule.poll(60_100, &cfg).resync);
        assert!(!schedule.poll(60_900, &cfg).resync);
        // a boundary second the loop never observes is skipped
        assert!(!schedule.poll(121_000, &cfg).resync);
        assert!(schedule.poll(180_400, &cfg).resync);
    }

    #[test]
    fn test_skipped_backlog_keeps_phase() {
        let cfg = config();
        let mut schedule = Schedule::new(0);
        schedule.skip_tick_backlog(5_400, &cfg);
        assert_eq!(schedule.poll(5_500, &cfg).ticks, 0);
        assert_eq!(schedule.poll(6_000, &cfg).ticks, 1);
        assert_eq!(schedule.poll(6_999, &cfg).ticks, 0);
        assert_eq!(schedule.poll(7_000, &cfg).ticks, 1);
    }

    #[test]
    fn test_skipping_without_backlog_changes_nothing() {
        let cfg = config();
        let mut schedule = Schedule::new(0);
        assert_eq!(schedule.poll(3_200, &cfg).ticks, 3);
        schedule.skip_tick_backlog(3_200, &cfg);
        assert_eq!(schedule.poll(4_000, &cfg).ticks, 1);
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let cfg = config();
        let mut schedule = Schedule::new(10_000);
        assert_eq!(schedule.poll(5_000, &cfg), Due::default());
    }
}
