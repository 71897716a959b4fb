//! Network primitives the clock consumes.
//!
//! Both traits are implemented by the board support code: the Wi-Fi driver
//! for [`Link`], a UDP socket speaking SNTP for [`NetworkTime`] (see
//! [`crate::ntp`] for the packet codec).

use chrono::NaiveDateTime;

use crate::error::{LinkError, QueryError};

/// Network association.
pub trait Link {
    /// Associates with the network, blocking until connected.
    ///
    /// There is no timeout; an implementation gives up only when the
    /// association is definitively rejected.
    fn connect(&mut self) -> Result<(), LinkError>;
}

/// Network time query.
pub trait NetworkTime {
    /// Asks `host` for the current time, returned as UTC.
    fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError>;
}

impl<T: Link + ?Sized> Link for &mut T {
    fn connect(&mut self) -> Result<(), LinkError> {
        T::connect(self)
    }
}

impl<T: NetworkTime + ?Sized> NetworkTime for &mut T {
    fn query(&mut self, host: &str) -> Result<NaiveDateTime, QueryError> {
        T::query(self, host)
    }
}
