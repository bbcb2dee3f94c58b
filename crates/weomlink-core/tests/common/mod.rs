//! Shared test doubles: a scripted data link and a recording sleep function.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use weomlink_core::error::Error;
use weomlink_core::protocol::{DataLink, Status, TcsiPacket};
use weomlink_core::timer::SleepFn;

/// What the mock device answers to one written request.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// OK response echoing the request id and address, with this payload
    Ok(Vec<u8>),
    /// OK response with an empty payload
    OkEmpty,
    /// Error response with the given status
    Error(Status),
    /// OK response whose checksum byte is corrupted
    BadChecksum(Vec<u8>),
    /// No bytes at all; the read times out
    Nothing,
    /// Literal bytes, for hand-crafted frames
    Raw(Vec<u8>),
}

#[derive(Default)]
pub struct MockLinkState {
    script: VecDeque<ScriptedResponse>,
    rx: VecDeque<u8>,
    pub written: Vec<Vec<u8>>,
    pub dropped_pending: usize,
    pub fail_writes: bool,
}

/// A [`DataLink`] that answers writes from a script. Each write consumes the
/// next scripted response and queues its bytes for reading; reads deliver
/// exactly the requested length or time out.
pub struct MockLink {
    shared: Arc<Mutex<MockLinkState>>,
    max_data_size: usize,
}

impl MockLink {
    pub fn new(script: Vec<ScriptedResponse>) -> Self {
        Self::with_max_data_size(script, 255)
    }

    pub fn with_max_data_size(script: Vec<ScriptedResponse>, max_data_size: usize) -> Self {
        Self {
            shared: Arc::new(Mutex::new(MockLinkState {
                script: script.into(),
                ..Default::default()
            })),
            max_data_size,
        }
    }

    /// Handle to the state surviving after the link is boxed away.
    pub fn state(&self) -> Arc<Mutex<MockLinkState>> {
        self.shared.clone()
    }
}

impl DataLink for MockLink {
    fn is_open(&self) -> bool {
        true
    }

    fn close(&mut self) {}

    fn max_data_size(&self) -> usize {
        self.max_data_size
    }

    fn read(&mut self, buffer: &mut [u8], _timeout: Duration) -> Result<(), Error> {
        let mut state = self.shared.lock().unwrap();
        if state.rx.len() < buffer.len() {
            return Err(Error::Timeout);
        }
        for byte in buffer.iter_mut() {
            *byte = state.rx.pop_front().unwrap();
        }
        Ok(())
    }

    fn write(&mut self, buffer: &[u8], _timeout: Duration) -> Result<(), Error> {
        let mut state = self.shared.lock().unwrap();
        if state.fail_writes {
            return Err(Error::NoConnection);
        }
        state.written.push(buffer.to_vec());

        let request = TcsiPacket::from_bytes(buffer.to_vec());
        let packet_id = request.packet_id();
        let address = request.address();

        let response_bytes = match state.script.pop_front() {
            Some(ScriptedResponse::Ok(payload)) => {
                TcsiPacket::create_ok_response(packet_id, address, &payload)
                    .as_bytes()
                    .to_vec()
            }
            Some(ScriptedResponse::OkEmpty) => {
                TcsiPacket::create_ok_response(packet_id, address, &[])
                    .as_bytes()
                    .to_vec()
            }
            Some(ScriptedResponse::Error(status)) => {
                TcsiPacket::create_error_response(packet_id, address, status)
                    .as_bytes()
                    .to_vec()
            }
            Some(ScriptedResponse::BadChecksum(payload)) => {
                let mut bytes = TcsiPacket::create_ok_response(packet_id, address, &payload)
                    .as_bytes()
                    .to_vec();
                let last = bytes.len() - 1;
                bytes[last] ^= 0xFF;
                bytes
            }
            Some(ScriptedResponse::Raw(bytes)) => bytes,
            Some(ScriptedResponse::Nothing) | None => Vec::new(),
        };

        state.rx.extend(response_bytes);
        Ok(())
    }

    fn drop_pending(&mut self) {
        let mut state = self.shared.lock().unwrap();
        state.rx.clear();
        state.dropped_pending += 1;
    }

    fn is_connection_lost(&self) -> bool {
        false
    }
}

/// Sleep function that records requested durations and returns immediately.
pub fn recording_sleep_fn() -> (SleepFn, Arc<Mutex<Vec<Duration>>>) {
    let slept: Arc<Mutex<Vec<Duration>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = slept.clone();
    let sleep_fn: SleepFn = Arc::new(move |duration| {
        recorder.lock().unwrap().push(duration);
    });
    (sleep_fn, slept)
}
