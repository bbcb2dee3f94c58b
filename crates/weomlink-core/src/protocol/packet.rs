//! TCSI packet encoding/decoding
//!
//! Frame layout (addresses little-endian):
//!
//! ```text
//! offset 0     (0xA << 4) | packet_id      sync nibble + 4-bit id
//! offset 1     status or command byte
//! offset 2..6  address (u32, little-endian)
//! offset 6     payload size N
//! offset 7..   payload (N bytes)
//! offset 7+N   checksum = sum of all preceding bytes, mod 256
//! ```
//!
//! Packets built by the constructors are valid by construction; the only
//! packet that can fail validation is one parsed off the wire.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use super::{HEADER_SIZE, MAX_PAYLOAD_SIZE, MIN_PACKET_SIZE};
use crate::error::Error;

const SYNC_AND_ID_POSITION: usize = 0;
const STATUS_OR_COMMAND_POSITION: usize = 1;
const ADDRESS_POSITION: usize = 2;
const COUNT_POSITION: usize = 6;
const DATA_POSITION: usize = 7;

const SYNC_VALUE: u8 = 0xA0;
const SYNC_MASK: u8 = 0xF0;
const PACKET_ID_MASK: u8 = 0x0F;

/// Request-direction command bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    /// Read a register window
    Read = 0x80,
    /// Write a register window
    Write = 0x81,
    /// Open a flash burst transfer
    FlashBurstStart = 0x82,
    /// Close a flash burst transfer
    FlashBurstEnd = 0x83,
}

impl Command {
    /// Decode a raw command byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x80 => Some(Command::Read),
            0x81 => Some(Command::Write),
            0x82 => Some(Command::FlashBurstStart),
            0x83 => Some(Command::FlashBurstEnd),
            _ => None,
        }
    }
}

/// Response-direction status bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    /// Device cannot serve the request yet; retry after a delay
    CameraNotReady = 0x01,
    UnknownCommand = 0x02,
    WrongChecksum = 0x03,
    WrongAddress = 0x04,
    WrongArgumentCount = 0x05,
    FlashBurstError = 0x06,
    InvalidSettings = 0x07,
    IncorrectValue = 0x08,
}

impl Status {
    /// Decode a raw status byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::CameraNotReady),
            0x02 => Some(Status::UnknownCommand),
            0x03 => Some(Status::WrongChecksum),
            0x04 => Some(Status::WrongAddress),
            0x05 => Some(Status::WrongArgumentCount),
            0x06 => Some(Status::FlashBurstError),
            0x07 => Some(Status::InvalidSettings),
            0x08 => Some(Status::IncorrectValue),
            _ => None,
        }
    }
}

/// A TCSI frame that owns its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcsiPacket {
    data: Vec<u8>,
}

impl TcsiPacket {
    /// Wrap raw bytes received off the wire. No validation happens here; call
    /// one of the validators before trusting the contents.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// READ request: the single payload byte carries the number of payload
    /// bytes the response must return.
    pub fn create_read_request(packet_id: u8, address: u32, payload_size: u8) -> Self {
        let request = Self::build(Command::Read as u8, packet_id, address, &[payload_size]);
        debug_assert!(request.validate_as_request().is_ok());
        request
    }

    /// WRITE request carrying `payload`. The payload must be non-empty.
    pub fn create_write_request(packet_id: u8, address: u32, payload: &[u8]) -> Self {
        let request = Self::build(Command::Write as u8, packet_id, address, payload);
        debug_assert!(request.validate_as_request().is_ok());
        request
    }

    /// FLASH_BURST_START request. The fixed payload is `{0, 0, 0, 1}`.
    pub fn create_burst_start_request(packet_id: u8, address: u32) -> Self {
        let request = Self::build(
            Command::FlashBurstStart as u8,
            packet_id,
            address,
            &[0, 0, 0, 1],
        );
        debug_assert!(request.validate_as_request().is_ok());
        request
    }

    /// FLASH_BURST_END request, empty payload.
    pub fn create_burst_end_request(packet_id: u8, address: u32) -> Self {
        let request = Self::build(Command::FlashBurstEnd as u8, packet_id, address, &[]);
        debug_assert!(request.validate_as_request().is_ok());
        request
    }

    /// OK response carrying `payload`.
    pub fn create_ok_response(packet_id: u8, address: u32, payload: &[u8]) -> Self {
        let response = Self::build(Status::Ok as u8, packet_id, address, payload);
        debug_assert!(response
            .validate_as_ok_response(address, payload.len() as u8)
            .is_ok());
        response
    }

    /// Error response with the given non-OK status, empty payload.
    pub fn create_error_response(packet_id: u8, address: u32, status: Status) -> Self {
        Self::build(status as u8, packet_id, address, &[])
    }

    fn build(status_or_command: u8, packet_id: u8, address: u32, payload: &[u8]) -> Self {
        debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);

        let mut data = vec![0u8; MIN_PACKET_SIZE + payload.len()];
        data[SYNC_AND_ID_POSITION] = (SYNC_VALUE & SYNC_MASK) | (packet_id & PACKET_ID_MASK);
        data[STATUS_OR_COMMAND_POSITION] = status_or_command;
        LittleEndian::write_u32(&mut data[ADDRESS_POSITION..ADDRESS_POSITION + 4], address);
        data[COUNT_POSITION] = payload.len() as u8;
        data[DATA_POSITION..DATA_POSITION + payload.len()].copy_from_slice(payload);

        let checksum_position = data.len() - 1;
        data[checksum_position] = checksum(&data[..checksum_position]);

        Self { data }
    }

    /// Structural validation: size, sync nibble, known status/command, count
    /// byte, checksum. Violations are reported in that order.
    pub fn validate(&self) -> Result<(), Error> {
        if self.data.len() < MIN_PACKET_SIZE {
            return Err(Error::InvalidSize);
        }

        if (self.data[SYNC_AND_ID_POSITION] & SYNC_MASK) != (SYNC_VALUE & SYNC_MASK) {
            return Err(Error::InvalidSync);
        }

        let byte = self.status_or_command();
        if Command::from_byte(byte).is_none() && Status::from_byte(byte).is_none() {
            return Err(Error::InvalidStatusOrCommand);
        }

        if self.data[COUNT_POSITION] as usize != self.data.len() - MIN_PACKET_SIZE {
            return Err(Error::InvalidSize);
        }

        let checksum_position = self.data.len() - 1;
        if self.data[checksum_position] != checksum(&self.data[..checksum_position]) {
            return Err(Error::InvalidChecksum);
        }

        Ok(())
    }

    /// Validation for the request direction: structural checks plus the
    /// per-command payload size rules.
    pub fn validate_as_request(&self) -> Result<(), Error> {
        self.validate()?;

        match Command::from_byte(self.status_or_command()) {
            Some(Command::Read) => {
                if self.payload().len() != 1 {
                    return Err(Error::InvalidSize);
                }
            }
            Some(Command::Write) => {
                if self.payload().is_empty() {
                    return Err(Error::InvalidSize);
                }
            }
            Some(Command::FlashBurstStart) => {
                if self.payload().len() != 4 {
                    return Err(Error::InvalidSize);
                }
            }
            Some(Command::FlashBurstEnd) => {
                if !self.payload().is_empty() {
                    return Err(Error::InvalidSize);
                }
            }
            None => return Err(Error::InvalidStatusOrCommand),
        }

        Ok(())
    }

    /// Validation for the response direction: structural checks, the byte must
    /// be a status (not a command), and the address must echo the request.
    pub fn validate_as_response(&self, address: u32) -> Result<(), Error> {
        self.validate()?;

        if Status::from_byte(self.status_or_command()).is_none() {
            return Err(Error::InvalidStatusOrCommand);
        }

        if self.address() != address {
            return Err(Error::InvalidResponseAddress);
        }

        Ok(())
    }

    /// Validation for a successful response: on top of the response checks the
    /// status must be OK and the payload must have the expected size. A busy
    /// status maps to [`Error::ResponseDeviceBusy`], any other non-OK status
    /// to [`Error::ResponseStatusError`].
    pub fn validate_as_ok_response(&self, address: u32, payload_size: u8) -> Result<(), Error> {
        self.validate_as_response(address)?;

        match Status::from_byte(self.status_or_command()) {
            Some(Status::Ok) => {}
            Some(Status::CameraNotReady) => return Err(Error::ResponseDeviceBusy),
            _ => return Err(Error::ResponseStatusError(self.status_or_command())),
        }

        if self.payload().len() != payload_size as usize {
            return Err(Error::InvalidSize);
        }

        Ok(())
    }

    /// For a partial frame of at least `HEADER_SIZE` bytes: check the sync
    /// nibble and that the byte is a response status, then return the payload
    /// size announced by the count byte. Used to size the tail read.
    pub fn expected_data_size(&self) -> Result<u8, Error> {
        if self.data.len() < HEADER_SIZE {
            return Err(Error::InvalidSize);
        }

        if (self.data[SYNC_AND_ID_POSITION] & SYNC_MASK) != (SYNC_VALUE & SYNC_MASK) {
            return Err(Error::InvalidSync);
        }

        if Status::from_byte(self.status_or_command()).is_none() {
            return Err(Error::InvalidStatusOrCommand);
        }

        Ok(self.data[COUNT_POSITION])
    }

    /// The 4-bit packet id from byte 0.
    pub fn packet_id(&self) -> u8 {
        self.data[SYNC_AND_ID_POSITION] & PACKET_ID_MASK
    }

    /// The raw status or command byte.
    pub fn status_or_command(&self) -> u8 {
        self.data[STATUS_OR_COMMAND_POSITION]
    }

    /// The frame address.
    pub fn address(&self) -> u32 {
        LittleEndian::read_u32(&self.data[ADDRESS_POSITION..ADDRESS_POSITION + 4])
    }

    /// The payload bytes between header and checksum.
    pub fn payload(&self) -> &[u8] {
        &self.data[DATA_POSITION..self.data.len() - 1]
    }

    /// The whole encoded frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the frame bytes back, e.g. to append the payload tail of a
    /// partially received frame before reconstructing.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Additive checksum over every byte before the checksum position.
fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}
