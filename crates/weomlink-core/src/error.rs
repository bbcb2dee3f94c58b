//! Library errors
//!
//! One flat error enumeration shared by every layer. The device layer matches
//! on individual variants to decide between retry, busy backoff, and giving up,
//! so the packet-level variants are kept distinct rather than wrapped.

use thiserror::Error;

/// Errors reported by the packet codec, the data link, the protocol engine,
/// and the device engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Packet codec
    #[error("packet size is below minimum or does not match the count byte")]
    InvalidSize,

    #[error("packet synchronization nibble is invalid")]
    InvalidSync,

    #[error("packet status or command byte is unknown")]
    InvalidStatusOrCommand,

    #[error("packet checksum mismatch")]
    InvalidChecksum,

    #[error("response address does not match the request")]
    InvalidResponseAddress,

    #[error("device responded busy (camera not ready)")]
    ResponseDeviceBusy,

    #[error("device responded with error status 0x{0:02x}")]
    ResponseStatusError(u8),

    // Data link
    #[error("data link has no connection")]
    NoConnection,

    #[error("data link read/write timed out")]
    Timeout,

    // Protocol engine
    #[error("no data link set on the protocol engine")]
    NoDataLink,

    // Memory space
    #[error("address range does not match any known memory region")]
    UnknownAddress,

    // Device engine
    #[error("no protocol engine set or protocol cannot carry any payload")]
    NoProtocol,

    #[error("data size is zero or not allowed for the target memory region")]
    InvalidDataSize,

    #[error("address is invalid for the target memory region")]
    InvalidAddress,

    #[error("transfer failed repeatedly, assuming the connection broke")]
    Disconnected,

    #[error("device stayed busy longer than the allowed budget")]
    Busy,

    // Typed conversions
    #[error("device value does not map to any known variant")]
    InvalidData,
}

impl Error {
    /// True for the transient packet/link failures the device engine counts
    /// into its sliding retry window.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Timeout
                | Error::InvalidSize
                | Error::InvalidSync
                | Error::InvalidStatusOrCommand
                | Error::InvalidChecksum
                | Error::InvalidResponseAddress
                | Error::ResponseStatusError(_)
        )
    }
}
