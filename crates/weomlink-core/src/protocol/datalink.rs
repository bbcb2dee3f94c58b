//! Data-link contract
//!
//! The protocol engine drives any byte stream that can do bounded, timed,
//! exact-length transfers. The serial implementation lives in
//! [`super::serial`]; tests substitute scripted mocks.

use std::time::Duration;

use crate::error::Error;

/// A byte-stream transport with per-call timeouts.
///
/// `read` and `write` transfer exactly `buffer.len()` bytes or fail; partial
/// transfers are never reported as success. Implementations surface
/// [`Error::Timeout`] when the deadline passes and [`Error::NoConnection`]
/// when the underlying channel is gone.
pub trait DataLink: Send {
    /// Whether the link is currently open.
    fn is_open(&self) -> bool;

    /// Close the link. Further transfers fail with [`Error::NoConnection`].
    fn close(&mut self);

    /// Upper bound on a single read or write, in bytes.
    fn max_data_size(&self) -> usize;

    /// Fill `buffer` completely within `timeout`.
    fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<(), Error>;

    /// Transmit `buffer` completely within `timeout`.
    fn write(&mut self, buffer: &[u8], timeout: Duration) -> Result<(), Error>;

    /// Discard any bytes buffered on the receive side.
    fn drop_pending(&mut self);

    /// Whether the link itself considers the connection lost.
    fn is_connection_lost(&self) -> bool;
}
