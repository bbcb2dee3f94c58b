//! WEOM device engine
//!
//! Splits logical register reads/writes into aligned chunks per the memory
//! map, retries transient protocol failures within a sliding error window,
//! and backs off on device-busy responses until a total busy budget expires.

pub mod memory;

pub use memory::{MemoryDescriptor, MemorySpace, MemoryType};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;
use crate::protocol::{AddressRange, TcsiProtocol};
use crate::timer::{default_sleep_fn, SleepFn};

/// Per-chunk protocol timeout.
const TIMEOUT_DEFAULT: Duration = Duration::from_millis(1_000);

/// Sleep between retries of a busy device.
const BUSY_DEVICE_DELAY: Duration = Duration::from_millis(500);

/// Total busy backoff allowed within one logical operation.
const BUSY_DEVICE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Errors tolerated among the last eight attempts before giving up.
const MAX_ERRORS_IN_WINDOW: u32 = 4;

/// Byte order of integer payloads on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEndianness {
    Little,
    Big,
}

impl DeviceEndianness {
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            DeviceEndianness::Little => LittleEndian::read_u16(bytes),
            DeviceEndianness::Big => BigEndian::read_u16(bytes),
        }
    }

    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            DeviceEndianness::Little => LittleEndian::read_u32(bytes),
            DeviceEndianness::Big => BigEndian::read_u32(bytes),
        }
    }

    pub fn write_u16(self, bytes: &mut [u8], value: u16) {
        match self {
            DeviceEndianness::Little => LittleEndian::write_u16(bytes, value),
            DeviceEndianness::Big => BigEndian::write_u16(bytes, value),
        }
    }

    pub fn write_u32(self, bytes: &mut [u8], value: u32) {
        match self {
            DeviceEndianness::Little => LittleEndian::write_u32(bytes, value),
            DeviceEndianness::Big => BigEndian::write_u32(bytes, value),
        }
    }
}

/// Sliding window over the last eight chunk attempts. Bit 0 is the most
/// recent attempt; a set bit is a failure.
#[derive(Debug, Default, Clone, Copy)]
struct ErrorWindow(u8);

impl ErrorWindow {
    /// Age the window by one attempt.
    fn shift(&mut self) {
        self.0 <<= 1;
    }

    /// Mark the most recent attempt as failed.
    fn record_error(&mut self) {
        self.0 |= 1;
    }

    /// Failures among the tracked attempts.
    fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// The device engine: owns a [`TcsiProtocol`] and the memory-space table.
pub struct WeomDevice {
    protocol: TcsiProtocol,
    memory_space: MemorySpace,
    endianness: DeviceEndianness,
    sleep_fn: SleepFn,
}

impl WeomDevice {
    /// Engine over `protocol`. WEOM payload integers are little-endian.
    pub fn new(protocol: TcsiProtocol) -> Self {
        Self::with_sleep_fn(protocol, default_sleep_fn())
    }

    /// Engine with a caller-supplied sleep for the busy backoff.
    pub fn with_sleep_fn(protocol: TcsiProtocol, sleep_fn: SleepFn) -> Self {
        Self {
            protocol,
            memory_space: MemorySpace::device_space(),
            endianness: DeviceEndianness::Little,
            sleep_fn,
        }
    }

    /// The owned protocol engine.
    pub fn protocol(&self) -> &TcsiProtocol {
        &self.protocol
    }

    /// The memory-space table in use.
    pub fn memory_space(&self) -> &MemorySpace {
        &self.memory_space
    }

    /// Replace the memory-space table.
    pub fn set_memory_space(&mut self, memory_space: MemorySpace) {
        self.memory_space = memory_space;
    }

    /// Byte order applied to payload integers.
    pub fn endianness(&self) -> DeviceEndianness {
        self.endianness
    }

    /// Read `data.len()` bytes starting at `address`, chunked and retried.
    /// Partial progress is preserved across chunks.
    pub fn read_data(&self, data: &mut [u8], address: u32) -> Result<(), Error> {
        let descriptor = self.descriptor_with_checks(address, data.len())?;
        let max_chunk = self.max_chunk(&descriptor) as usize;

        let mut window = ErrorWindow::default();
        let mut busy_total = Duration::ZERO;
        let mut offset = 0usize;

        while offset < data.len() {
            let chunk_size = (data.len() - offset).min(max_chunk);
            let chunk_address = address + offset as u32;

            let result = self.protocol.read_data(
                &mut data[offset..offset + chunk_size],
                chunk_address,
                TIMEOUT_DEFAULT,
            );
            window.shift();
            match result {
                Ok(()) => offset += chunk_size,
                Err(error) => self.handle_chunk_error(error, &mut window, &mut busy_total)?,
            }
        }

        Ok(())
    }

    /// Write `data` starting at `address`, chunked and retried.
    pub fn write_data(&self, data: &[u8], address: u32) -> Result<(), Error> {
        let descriptor = self.descriptor_with_checks(address, data.len())?;
        let max_chunk = self.max_chunk(&descriptor) as usize;

        let mut window = ErrorWindow::default();
        let mut busy_total = Duration::ZERO;
        let mut offset = 0usize;

        while offset < data.len() {
            let chunk_size = (data.len() - offset).min(max_chunk);
            let chunk_address = address + offset as u32;

            let result = self.protocol.write_data(
                &data[offset..offset + chunk_size],
                chunk_address,
                TIMEOUT_DEFAULT,
            );
            window.shift();
            match result {
                Ok(()) => offset += chunk_size,
                Err(error) => self.handle_chunk_error(error, &mut window, &mut busy_total)?,
            }
        }

        Ok(())
    }

    /// Read a whole named register window.
    pub fn read_range(&self, address_range: AddressRange) -> Result<Vec<u8>, Error> {
        let mut data = vec![0u8; address_range.size() as usize];
        self.read_data(&mut data, address_range.first_address())?;
        Ok(data)
    }

    /// Decide what a failed chunk means: transient failures burn the error
    /// window, busy responses burn the busy budget after a sleep, anything
    /// else is final. `Ok(())` means the same chunk should be retried.
    fn handle_chunk_error(
        &self,
        error: Error,
        window: &mut ErrorWindow,
        busy_total: &mut Duration,
    ) -> Result<(), Error> {
        if error.is_transient() {
            window.record_error();
            if window.count() <= MAX_ERRORS_IN_WINDOW {
                return Ok(());
            }
            return Err(Error::Disconnected);
        }

        if error == Error::ResponseDeviceBusy {
            *busy_total += BUSY_DEVICE_DELAY;
            if *busy_total < BUSY_DEVICE_TIMEOUT {
                (self.sleep_fn)(BUSY_DEVICE_DELAY);
                return Ok(());
            }
            return Err(Error::Busy);
        }

        Err(error)
    }

    /// The pre-flight checks of a logical operation, in order: a usable
    /// protocol, a non-empty size, no address wraparound, a known memory
    /// region, and min-size alignment of both address and size.
    fn descriptor_with_checks(
        &self,
        address: u32,
        data_size: usize,
    ) -> Result<MemoryDescriptor, Error> {
        if self.protocol.max_data_size() == 0 {
            return Err(Error::NoProtocol);
        }

        if data_size == 0 {
            return Err(Error::InvalidDataSize);
        }

        if data_size as u64 - 1 > (u32::MAX - address) as u64 {
            return Err(Error::InvalidAddress);
        }

        let range = AddressRange::first_and_size(address, data_size as u32);
        let descriptor = self.memory_space.descriptor_for(&range)?;

        if address % descriptor.minimum_data_size != 0 {
            return Err(Error::InvalidAddress);
        }

        if data_size as u32 % descriptor.minimum_data_size != 0 {
            return Err(Error::InvalidDataSize);
        }

        Ok(descriptor)
    }

    /// Largest chunk honoring both the descriptor and the protocol bound,
    /// floored to the descriptor's alignment.
    fn max_chunk(&self, descriptor: &MemoryDescriptor) -> u32 {
        let protocol_bound = (self.protocol.max_data_size() / descriptor.minimum_data_size)
            * descriptor.minimum_data_size;
        debug_assert!(protocol_bound > 0);
        descriptor.maximum_data_size.min(protocol_bound)
    }
}
