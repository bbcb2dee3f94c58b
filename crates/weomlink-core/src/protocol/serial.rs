//! Serial data link
//!
//! serialport-backed implementation of [`DataLink`], plus port enumeration
//! and opening helpers. Reads poll `bytes_to_read()` instead of blocking in
//! `read()`, which keeps timeout behavior reliable across platforms.

use serde::{Deserialize, Serialize};
use serialport::{SerialPort, SerialPortInfo, SerialPortType};
use std::io::{Read, Write};
use std::time::Duration;

use super::{DataLink, DEFAULT_BAUD_RATE};
use crate::error::Error;
use crate::timer::ElapsedTimer;

/// Poll interval while waiting for bytes to arrive.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Default cap on a single transfer. One maximum-size TCSI frame.
const DEFAULT_MAX_TRANSFER: usize = 255;

/// Information about an available serial port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortInfo {
    /// Port name (e.g., "/dev/ttyUSB0" or "COM3")
    pub name: String,
    /// USB vendor ID (if USB device)
    pub vid: Option<u16>,
    /// USB product ID (if USB device)
    pub pid: Option<u16>,
    /// Product name (if available)
    pub product: Option<String>,
    /// Serial number (if available)
    pub serial_number: Option<String>,
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        let (vid, pid, product, serial_number) = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                (Some(usb.vid), Some(usb.pid), usb.product, usb.serial_number)
            }
            _ => (None, None, None, None),
        };

        Self {
            name: info.port_name,
            vid,
            pid,
            product,
            serial_number,
        }
    }
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Camera cores usually enumerate as CDC-ACM devices; those rank before
/// USB-serial bridges, which rank before everything else.
fn device_class(basename: &str) -> u8 {
    if basename.starts_with("ttyACM") || basename.starts_with("cu.usbmodem") {
        0
    } else if basename.starts_with("ttyUSB") || basename.starts_with("COM") {
        1
    } else {
        2
    }
}

/// Numeric suffix of a port name, so "ttyACM10" sorts after "ttyACM2".
/// Names without one sort last within their class.
fn trailing_number(basename: &str) -> u32 {
    let suffix_start = basename
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    basename[suffix_start..].parse().unwrap_or(u32::MAX)
}

fn compare_port_names(a: &str, b: &str) -> std::cmp::Ordering {
    let (a_base, b_base) = (basename(a), basename(b));
    device_class(a_base)
        .cmp(&device_class(b_base))
        .then(trailing_number(a_base).cmp(&trailing_number(b_base)))
        .then(a.cmp(b))
}

/// List available serial ports, most camera-like first, in a stable order.
pub fn list_ports() -> Vec<PortInfo> {
    let mut ports: Vec<PortInfo> = serialport::available_ports()
        .unwrap_or_default()
        .into_iter()
        .map(PortInfo::from)
        .collect();
    ports.sort_by(|a, b| compare_port_names(&a.name, &b.name));
    ports
}

/// Serial link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Serial port name
    pub port_name: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Cap on a single read/write, in bytes
    pub max_transfer_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            max_transfer_size: DEFAULT_MAX_TRANSFER,
        }
    }
}

/// Open and configure a serial port for camera communication: 8N1, no flow
/// control, DTR and RTS asserted.
pub fn open_port(name: &str, baud_rate: u32) -> Result<Box<dyn SerialPort>, Error> {
    let mut port = serialport::new(name, baud_rate)
        .timeout(Duration::from_millis(100))
        .open()
        .map_err(|e| {
            eprintln!("[WARN] open_port: failed to open {}: {}", name, e);
            Error::NoConnection
        })?;

    let configure = |e: serialport::Error| {
        eprintln!("[WARN] open_port: failed to configure {}: {}", name, e);
        Error::NoConnection
    };
    port.set_data_bits(serialport::DataBits::Eight)
        .map_err(configure)?;
    port.set_parity(serialport::Parity::None).map_err(configure)?;
    port.set_stop_bits(serialport::StopBits::One)
        .map_err(configure)?;
    port.set_flow_control(serialport::FlowControl::None)
        .map_err(configure)?;

    // DTR/RTS high keeps some USB adapters from dropping the line on open.
    if let Err(e) = port.write_data_terminal_ready(true) {
        eprintln!("[DEBUG] open_port: failed to set DTR high: {} (continuing)", e);
    }
    if let Err(e) = port.write_request_to_send(true) {
        eprintln!("[DEBUG] open_port: failed to set RTS high: {} (continuing)", e);
    }

    Ok(port)
}

/// A [`DataLink`] over a serial port.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
    max_transfer_size: usize,
}

impl SerialLink {
    /// Open the port named in `config` and wrap it.
    pub fn open(config: &SerialConfig) -> Result<Self, Error> {
        let port = open_port(&config.port_name, config.baud_rate)?;
        Ok(Self {
            port: Some(port),
            max_transfer_size: config.max_transfer_size,
        })
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>, max_transfer_size: usize) -> Self {
        Self {
            port: Some(port),
            max_transfer_size,
        }
    }
}

impl DataLink for SerialLink {
    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn close(&mut self) {
        self.port = None;
    }

    fn max_data_size(&self) -> usize {
        self.max_transfer_size
    }

    fn read(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<(), Error> {
        let port = self.port.as_mut().ok_or(Error::NoConnection)?;
        let timer = ElapsedTimer::new(timeout);
        let mut offset = 0;

        while offset < buffer.len() {
            if timer.timed_out() {
                return Err(Error::Timeout);
            }

            let available = port.bytes_to_read().map_err(|e| {
                eprintln!("[DEBUG] SerialLink::read: bytes_to_read error: {}", e);
                Error::NoConnection
            })? as usize;

            if available == 0 {
                std::thread::sleep(READ_POLL_INTERVAL);
                continue;
            }

            let to_read = available.min(buffer.len() - offset);
            match port.read(&mut buffer[offset..offset + to_read]) {
                Ok(0) => return Err(Error::NoConnection),
                Ok(n) => offset += n,
                Err(ref e)
                    if e.kind() == std::io::ErrorKind::TimedOut
                        || e.kind() == std::io::ErrorKind::WouldBlock => {}
                Err(e) => {
                    eprintln!("[DEBUG] SerialLink::read: read error: {}", e);
                    return Err(Error::NoConnection);
                }
            }
        }

        Ok(())
    }

    fn write(&mut self, buffer: &[u8], _timeout: Duration) -> Result<(), Error> {
        let port = self.port.as_mut().ok_or(Error::NoConnection)?;

        port.write_all(buffer).map_err(|e| {
            eprintln!("[DEBUG] SerialLink::write: write error: {}", e);
            Error::NoConnection
        })?;
        // write_all hands the bytes to the kernel buffer; flushing would block
        // in tcdrain on some platforms, so transmission latency is left to the
        // caller's response timeout.
        Ok(())
    }

    fn drop_pending(&mut self) {
        if let Some(port) = self.port.as_mut() {
            let _ = port.clear(serialport::ClearBuffer::Input);
        }
    }

    fn is_connection_lost(&self) -> bool {
        self.port.is_none()
    }
}
