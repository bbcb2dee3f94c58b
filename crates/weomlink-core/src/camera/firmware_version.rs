//! Firmware version register

use std::fmt;

use serde::{Deserialize, Serialize};

/// Firmware version as major.minor.minor2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub minor2: u16,
}

impl FirmwareVersion {
    pub fn new(major: u8, minor: u8, minor2: u16) -> Self {
        Self {
            major,
            minor,
            minor2,
        }
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.minor2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(FirmwareVersion::new(2, 11, 4096).to_string(), "2.11.4096");
    }
}
