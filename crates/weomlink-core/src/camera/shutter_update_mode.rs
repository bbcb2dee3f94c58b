//! Shutter (NUC) update mode register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// When the internal shutter closes for a NUC update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutterUpdateMode {
    /// Updates occur at regular intervals
    Periodic,
    /// Updates occur adaptively based on sensor drift
    Adaptive,
}

impl ShutterUpdateMode {
    pub fn device_value(self) -> u8 {
        match self {
            ShutterUpdateMode::Periodic => 1,
            ShutterUpdateMode::Adaptive => 2,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            1 => Ok(ShutterUpdateMode::Periodic),
            2 => Ok(ShutterUpdateMode::Adaptive),
            _ => Err(Error::InvalidData),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_values_start_at_one() {
        assert_eq!(ShutterUpdateMode::Periodic.device_value(), 1);
        assert_eq!(ShutterUpdateMode::from_device_value(0), Err(Error::InvalidData));
    }
}
