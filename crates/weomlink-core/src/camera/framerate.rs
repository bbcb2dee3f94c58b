//! Frame rate register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Selectable sensor frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Framerate {
    /// 8.57 FPS
    Fps8_57,
    /// 30 FPS
    Fps30,
    /// 60 FPS
    Fps60,
}

impl Framerate {
    pub fn device_value(self) -> u8 {
        match self {
            Framerate::Fps8_57 => 0,
            Framerate::Fps30 => 1,
            Framerate::Fps60 => 2,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(Framerate::Fps8_57),
            1 => Ok(Framerate::Fps30),
            2 => Ok(Framerate::Fps60),
            _ => Err(Error::InvalidData),
        }
    }
}
