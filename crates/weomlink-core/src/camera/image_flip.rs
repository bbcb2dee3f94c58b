//! Image flip register

use serde::{Deserialize, Serialize};

/// Vertical/horizontal image mirroring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFlip {
    pub vertical: bool,
    pub horizontal: bool,
}

impl ImageFlip {
    pub fn new(vertical: bool, horizontal: bool) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Register encoding: bit 0 vertical, bit 1 horizontal.
    pub fn device_value(self) -> u8 {
        (self.vertical as u8) | ((self.horizontal as u8) << 1)
    }

    pub fn from_device_value(value: u8) -> Self {
        Self {
            vertical: value & 0b01 != 0,
            horizontal: value & 0b10 != 0,
        }
    }
}
