//! Test pattern register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Source of the video signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageGenerator {
    /// Image from sensor
    Sensor,
    /// Image from ADC 1
    Adc1,
    /// Image from ADC 2
    Adc2,
    /// Image from internal dynamic generator
    InternalDynamic,
    /// Image from internal static generator
    InternalStatic,
}

impl ImageGenerator {
    pub fn device_value(self) -> u8 {
        match self {
            ImageGenerator::Sensor => 0,
            ImageGenerator::Adc1 => 1,
            ImageGenerator::Adc2 => 2,
            ImageGenerator::InternalDynamic => 3,
            ImageGenerator::InternalStatic => 4,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(ImageGenerator::Sensor),
            1 => Ok(ImageGenerator::Adc1),
            2 => Ok(ImageGenerator::Adc2),
            3 => Ok(ImageGenerator::InternalDynamic),
            4 => Ok(ImageGenerator::InternalStatic),
            _ => Err(Error::InvalidData),
        }
    }
}
