//! TCSI protocol communication
//!
//! Implements the framed request/response protocol spoken by WEOM camera
//! cores: the packet codec, the data-link contract, a serialport-backed data
//! link, and the stop-and-wait transaction engine.

pub mod address_range;
pub mod datalink;
pub mod packet;
pub mod serial;
mod tcsi;

pub use address_range::AddressRange;
pub use datalink::DataLink;
pub use packet::{Command, Status, TcsiPacket};
pub use serial::{list_ports, open_port, PortInfo, SerialConfig, SerialLink};
pub use tcsi::TcsiProtocol;

/// Fixed part of every frame: sync/id byte, status/command byte, 4-byte
/// address, payload count byte.
pub const HEADER_SIZE: usize = 7;

/// Smallest valid frame: header plus checksum, no payload.
pub const MIN_PACKET_SIZE: usize = HEADER_SIZE + 1;

/// Largest frame the single-byte count field allows.
pub const MAX_PACKET_SIZE: usize = 255;

/// Largest payload that still fits a maximum-size frame.
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - MIN_PACKET_SIZE;

/// Default baud rate of WEOM serial links.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
