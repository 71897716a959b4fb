//! Error kinds reported by the clock's collaborators.
//!
//! Transient errors ([`QueryError`], [`TimeSourceError`], [`SensorError`]) are
//! absorbed at the adapter boundary: they are shown on the display, logged,
//! and handed back to the scheduler as plain values. Only a [`StartupError`]
//! ends the scheduler.
//!
//! Every kind has a short `&'static str` form used as the detail line of an
//! error report, so reporting never needs to allocate.

use core::fmt;

/// Failure of a single network time query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueryError {
    /// The request could not be sent or the response could not be received
    Transport,
    /// No response arrived in time
    Timeout,
    /// The server answered with a packet that cannot be used
    InvalidResponse,
}

impl QueryError {
    /// Short text shown as the detail line of an error report.
    pub const fn as_str(&self) -> &'static str {
        match self {
            QueryError::Transport => "transport error",
            QueryError::Timeout => "timed out",
            QueryError::InvalidResponse => "invalid response",
        }
    }
}

/// Failure of the time source after its bounded retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeSourceError {
    /// Every attempt failed; `last` is the error of the final attempt
    RetriesExhausted { attempts: u8, last: QueryError },
}

impl TimeSourceError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeSourceError::RetriesExhausted { .. } => "retries exhausted",
        }
    }
}

/// Failure of a single sensor transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The frame arrived but its checksum did not match
    Checksum,
    /// The sensor did not answer
    Timeout,
}

impl SensorError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SensorError::Checksum => "checksum mismatch",
            SensorError::Timeout => "timed out",
        }
    }
}

/// Failure to associate with the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The access point rejected or never completed the association
    Association,
}

impl LinkError {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LinkError::Association => "association failed",
        }
    }
}

/// Unrecoverable failure during startup.
///
/// This is the one error that stops the scheduler; the firmware is expected
/// to halt or reset after it has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError<DE> {
    /// The display rejected the first frame
    Display(DE),
    /// Network association failed
    Link(LinkError),
}

impl<DE> StartupError<DE> {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StartupError::Display(_) => "display unavailable",
            StartupError::Link(e) => e.as_str(),
        }
    }
}

impl<DE> From<LinkError> for StartupError<DE> {
    fn from(e: LinkError) -> Self {
        StartupError::Link(e)
    }
}

macro_rules! display_as_str {
    ($($typ:ty),+) => {
        $(
            impl fmt::Display for $typ {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(QueryError, TimeSourceError, SensorError, LinkError);

impl<DE> fmt::Display for StartupError<DE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
