//! TCSI transaction engine
//!
//! Stop-and-wait request/response over a [`DataLink`]: one transaction at a
//! time behind a mutex, a 4-bit packet id to discard stale responses, a
//! two-pass receive (fixed-size prefix, then the announced payload tail), and
//! a straight-timeout tracker that flags connection loss.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{DataLink, TcsiPacket, MIN_PACKET_SIZE};
use crate::error::Error;
use crate::timer::{default_sleep_fn, ElapsedTimer, SleepFn};

/// Straight read timeouts tolerated before the connection counts as lost.
const MAX_STRAIGHT_NO_RESPONSES: u32 = 2;

struct ProtocolState {
    link: Option<Box<dyn DataLink>>,
    last_packet_id: u8,
    straight_no_responses: u32,
}

/// The TCSI protocol engine. Owns the data link for the lifetime of a
/// session; safe to share between threads, which are serialized per
/// transaction.
pub struct TcsiProtocol {
    state: Mutex<ProtocolState>,
    connection_lost: AtomicBool,
    sleep_fn: SleepFn,
}

impl TcsiProtocol {
    /// Engine with the default thread-sleep backoff.
    pub fn new() -> Self {
        Self::with_sleep_fn(default_sleep_fn())
    }

    /// Engine with a caller-supplied sleep function. The sleep is used to
    /// drain pending bytes after a framing failure; returning early from it
    /// is the cooperative cancellation point.
    pub fn with_sleep_fn(sleep_fn: SleepFn) -> Self {
        Self {
            state: Mutex::new(ProtocolState {
                link: None,
                last_packet_id: 0,
                straight_no_responses: 0,
            }),
            connection_lost: AtomicBool::new(false),
            sleep_fn,
        }
    }

    /// Replace the owned data link. Resets the packet-id counter and the
    /// disconnection tracking.
    pub fn set_data_link(&self, link: Box<dyn DataLink>) {
        let mut state = self.lock_state();
        state.link = Some(link);
        state.last_packet_id = 0;
        state.straight_no_responses = 0;
        self.connection_lost.store(false, Ordering::Relaxed);
    }

    /// Largest payload a single transaction can carry: the link's transfer
    /// bound minus the frame overhead, capped by the single-byte count field.
    /// Zero when no link is set or the link cannot fit a minimal frame.
    pub fn max_data_size(&self) -> u32 {
        let state = self.lock_state();
        let Some(link) = state.link.as_ref() else {
            return 0;
        };
        if link.max_data_size() < MIN_PACKET_SIZE {
            return 0;
        }

        let link_bound = (link.max_data_size() - MIN_PACKET_SIZE) as u32;
        link_bound.min(u8::MAX as u32)
    }

    /// One READ transaction for exactly `data.len()` bytes at `address`.
    /// On success `data` is overwritten with the response payload.
    pub fn read_data(
        &self,
        data: &mut [u8],
        address: u32,
        timeout: Duration,
    ) -> Result<(), Error> {
        if data.is_empty() {
            debug_assert!(false, "trying to read nothing? - weird");
            return Ok(());
        }
        debug_assert!(data.len() <= u8::MAX as usize);

        let mut state = self.lock_state();
        let packet_id = state.next_packet_id();
        let request = TcsiPacket::create_read_request(packet_id, address, data.len() as u8);

        let response = self.transact(&mut state, &request, address, data.len() as u8, timeout)?;
        data.copy_from_slice(response.payload());
        Ok(())
    }

    /// One WRITE transaction. The response must be OK with an empty payload.
    pub fn write_data(&self, data: &[u8], address: u32, timeout: Duration) -> Result<(), Error> {
        if data.is_empty() {
            debug_assert!(false, "trying to write nothing? - weird");
            return Ok(());
        }
        debug_assert!(data.len() <= u8::MAX as usize);

        let mut state = self.lock_state();
        let packet_id = state.next_packet_id();
        let request = TcsiPacket::create_write_request(packet_id, address, data);

        self.transact(&mut state, &request, address, 0, timeout)?;
        Ok(())
    }

    /// Open a flash burst window at `address`.
    pub fn flash_burst_start(&self, address: u32, timeout: Duration) -> Result<(), Error> {
        let mut state = self.lock_state();
        let packet_id = state.next_packet_id();
        let request = TcsiPacket::create_burst_start_request(packet_id, address);

        self.transact(&mut state, &request, address, 0, timeout)?;
        Ok(())
    }

    /// Close the flash burst window at `address`.
    pub fn flash_burst_end(&self, address: u32, timeout: Duration) -> Result<(), Error> {
        let mut state = self.lock_state();
        let packet_id = state.next_packet_id();
        let request = TcsiPacket::create_burst_end_request(packet_id, address);

        self.transact(&mut state, &request, address, 0, timeout)?;
        Ok(())
    }

    /// Sticky flag set after too many straight read timeouts. Cleared by
    /// [`TcsiProtocol::set_data_link`] or by any framed response.
    pub fn is_connection_lost(&self) -> bool {
        self.connection_lost.load(Ordering::Relaxed)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ProtocolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the request, then keep receiving until a frame echoes our packet
    /// id or the budget runs out. Frames with a foreign id are discarded
    /// silently; any malformed frame drops pending bytes and fails the
    /// transaction.
    fn transact(
        &self,
        state: &mut ProtocolState,
        request: &TcsiPacket,
        address: u32,
        expected_payload_size: u8,
        timeout: Duration,
    ) -> Result<TcsiPacket, Error> {
        let timer = ElapsedTimer::new(timeout);

        let link = state.link.as_mut().ok_or(Error::NoDataLink)?;
        link.write(request.as_bytes(), timeout)?;

        loop {
            let response = self.receive_response_packet(state, &timer)?;

            if let Err(error) = response.validate_as_response(address) {
                self.drop_pending(state, &timer);
                return Err(error);
            }

            if response.packet_id() == request.packet_id() {
                response.validate_as_ok_response(address, expected_payload_size)?;
                return Ok(response);
            }
            // Foreign id: a stale or echoed frame. Keep listening until the
            // timer expires.
        }
    }

    /// Two-pass receive: a fixed prefix of `MIN_PACKET_SIZE` bytes covers any
    /// empty response outright, then the count byte sizes the tail read for a
    /// payload-carrying one.
    fn receive_response_packet(
        &self,
        state: &mut ProtocolState,
        timer: &ElapsedTimer,
    ) -> Result<TcsiPacket, Error> {
        let link = state.link.as_mut().ok_or(Error::NoDataLink)?;

        let mut data = vec![0u8; MIN_PACKET_SIZE];
        if let Err(error) = link.read(&mut data, timer.rest_of_timeout()) {
            if error == Error::Timeout {
                state.straight_no_responses += 1;
                if state.straight_no_responses > MAX_STRAIGHT_NO_RESPONSES {
                    self.connection_lost.store(true, Ordering::Relaxed);
                }
            }
            self.drop_pending(state, timer);
            return Err(error);
        }
        state.straight_no_responses = 0;

        let mut response = TcsiPacket::from_bytes(data);
        let expected_data_size = match response.expected_data_size() {
            Ok(size) => size,
            Err(error) => {
                self.drop_pending(state, timer);
                return Err(error);
            }
        };

        if expected_data_size > 0 {
            let mut data = response.into_bytes();
            let prefix_size = data.len();
            data.resize(prefix_size + expected_data_size as usize, 0);

            let link = state.link.as_mut().ok_or(Error::NoDataLink)?;
            if let Err(error) = link.read(&mut data[prefix_size..], timer.rest_of_timeout()) {
                self.drop_pending(state, timer);
                return Err(error);
            }

            response = TcsiPacket::from_bytes(data);
        }

        Ok(response)
    }

    /// Wait out the rest of the budget so any in-flight bytes land, then
    /// discard them. Keeps a half-received frame from poisoning the next
    /// transaction.
    fn drop_pending(&self, state: &mut ProtocolState, timer: &ElapsedTimer) {
        (self.sleep_fn)(timer.rest_of_timeout());
        if let Some(link) = state.link.as_mut() {
            link.drop_pending();
        }
    }
}

impl Default for TcsiProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolState {
    fn next_packet_id(&mut self) -> u8 {
        self.last_packet_id = (self.last_packet_id + 1) & 0x0F;
        self.last_packet_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_datalink() {
        let protocol = TcsiProtocol::new();
        assert_eq!(protocol.max_data_size(), 0);

        let mut buffer = [0u8; 4];
        assert_eq!(
            protocol.read_data(&mut buffer, 0x0, Duration::from_millis(10)),
            Err(Error::NoDataLink)
        );
        assert_eq!(
            protocol.write_data(&buffer, 0x0, Duration::from_millis(10)),
            Err(Error::NoDataLink)
        );
        assert!(!protocol.is_connection_lost());
    }

    #[test]
    fn test_packet_id_wraps_modulo_16() {
        let mut state = ProtocolState {
            link: None,
            last_packet_id: 0,
            straight_no_responses: 0,
        };
        let ids: Vec<u8> = (0..20).map(|_| state.next_packet_id()).collect();
        assert_eq!(ids[0], 1);
        assert_eq!(ids[14], 15);
        assert_eq!(ids[15], 0);
        assert_eq!(ids[16], 1);
    }
}
