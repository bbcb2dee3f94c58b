//! Image equalization register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How pixel intensities map to the output range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageEqualizationType {
    /// Automatic gain control with noise-handling smoothing
    AgcNh,
    /// Manual gain control
    Mgc,
}

impl ImageEqualizationType {
    pub fn device_value(self) -> u8 {
        match self {
            ImageEqualizationType::AgcNh => 0,
            ImageEqualizationType::Mgc => 1,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(ImageEqualizationType::AgcNh),
            1 => Ok(ImageEqualizationType::Mgc),
            _ => Err(Error::InvalidData),
        }
    }
}
