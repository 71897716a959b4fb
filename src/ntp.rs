//! Minimal SNTP (RFC 4330) packet codec.
//!
//! Only what a [`NetworkTime`](crate::net::NetworkTime) implementation needs
//! on top of a UDP socket: build the client request and pull the server's
//! transmit timestamp out of the response. Round-trip correction is not
//! applied; the clock only has one second resolution.

use bitfield::bitfield;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::QueryError;

/// Length of an SNTP packet without extensions.
pub const PACKET_LEN: usize = 48;

/// SNTP server port.
pub const PORT: u16 = 123;

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch.
pub const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

bitfield! {
    /// First byte of an SNTP packet.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Header(u8);
    impl Debug;
    pub u8, leap, set_leap: 7, 6;
    pub u8, version, set_version: 5, 3;
    pub u8, mode, set_mode: 2, 0;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Header {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Header({=u8:#x})", self.0);
    }
}

const VERSION: u8 = 3;
const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
/// Strata above this mean the server is not synchronised
const MAX_STRATUM: u8 = 15;

const TRANSMIT_OFFSET: usize = 40;

/// Builds a client request packet.
pub fn request() -> [u8; PACKET_LEN] {
    let mut header = Header(0);
    header.set_version(VERSION);
    header.set_mode(MODE_CLIENT);
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = header.0;
    packet
}

/// Extracts the server's transmit time from a response, as UTC.
///
/// # Returns
/// * `Ok(NaiveDateTime)` - Transmit timestamp, truncated to whole seconds
/// * `Err(QueryError::InvalidResponse)` - Packet too short, not from a
///   server, from an unsynchronised server, or with an unusable timestamp
pub fn parse_response(packet: &[u8]) -> Result<NaiveDateTime, QueryError> {
    if packet.len() < PACKET_LEN {
        warn!("SNTP response too short: {} bytes", packet.len());
        return Err(QueryError::InvalidResponse);
    }

    let header = Header(packet[0]);
    if header.mode() != MODE_SERVER {
        warn!("SNTP response has mode {}", header.mode());
        return Err(QueryError::InvalidResponse);
    }

    let stratum = packet[1];
    if stratum == 0 || stratum > MAX_STRATUM {
        warn!("SNTP server stratum {} is not usable", stratum);
        return Err(QueryError::InvalidResponse);
    }

    let secs = u32::from_be_bytes([
        packet[TRANSMIT_OFFSET],
        packet[TRANSMIT_OFFSET + 1],
        packet[TRANSMIT_OFFSET + 2],
        packet[TRANSMIT_OFFSET + 3],
    ]);
    let unix = u64::from(secs)
        .checked_sub(NTP_UNIX_OFFSET)
        .ok_or(QueryError::InvalidResponse)?;
    let unix = i64::try_from(unix).map_err(|_| QueryError::InvalidResponse)?;
    trace!("SNTP transmit timestamp {} (unix {})", secs, unix);

    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|dt| dt.naive_utc())
        .ok_or(QueryError::InvalidResponse)
}
