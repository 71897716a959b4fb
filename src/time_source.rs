//! Time source adapter: bounded-retry network time acquisition.

use embedded_hal::delay::DelayNs;

use crate::console::Report;
use crate::error::{QueryError, TimeSourceError};
use crate::net::NetworkTime;
use crate::zone::{localize, Resync};

/// Report message for a failed time query.
pub const FETCH_ERROR: &str = "Error fetching time:";

/// Wraps a [`NetworkTime`] with retries, back-off and zone conversion.
pub struct TimeSource<N, W> {
    net: N,
    delay: W,
    host: &'static str,
    attempts: u8,
    backoff_ms: u32,
}

impl<N: NetworkTime, W: DelayNs> TimeSource<N, W> {
    /// Creates a time source.
    ///
    /// # Arguments
    /// * `net` - The network time query primitive
    /// * `delay` - Used for the back-off between attempts
    /// * `host` - Server hostname passed to every query
    /// * `attempts` - Queries per fetch; at least one is always made
    /// * `backoff_ms` - Pause after a failed attempt before the next one
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
    /// Every failed attempt is reported through `reporter`. After the last
    /// attempt fails the failure is logged and returned; the caller keeps
    /// its previous time and date.
    ///
    /// # Returns
    /// * `Ok(Resync)` - Local time of day and the UTC date
    /// * `Err(TimeSourceError::RetriesExhausted)` - All attempts failed
    pub fn fetch<R: Report>(&mut self, reporter: &mut R) -> Result<Resync, TimeSourceError> {
        let mut last = QueryError::Transport;
        for attempt in 1..=self.attempts {
            debug!("querying {} (attempt {})", self.host, attempt);
            match self.net.query(self.host) {
                Ok(utc) => {
                    let resync = localize(&utc);
                    info!("time synchronized on attempt {}", attempt);
                    return Ok(resync);
                }
                Err(e) => {
                    last = e;
                    reporter.report(FETCH_ERROR, e.as_str());
                    if attempt < self.attempts {
                        self.delay.delay_ms(self.backoff_ms);
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
