//! Time-domain averaging filter register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Temporal noise filter depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeDomainAveraging {
    Off,
    Frames2,
    Frames4,
}

impl TimeDomainAveraging {
    pub fn device_value(self) -> u8 {
        match self {
            TimeDomainAveraging::Off => 0,
            TimeDomainAveraging::Frames2 => 1,
            TimeDomainAveraging::Frames4 => 2,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(TimeDomainAveraging::Off),
            1 => Ok(TimeDomainAveraging::Frames2),
            2 => Ok(TimeDomainAveraging::Frames4),
            _ => Err(Error::InvalidData),
        }
    }
}
