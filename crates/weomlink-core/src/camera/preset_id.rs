//! Preset identification
//!
//! A preset is a (range, lens) pair. The device encodes each half as a 16-bit
//! field with its own value table; unknown raw values are rejected rather
//! than mapped to a default.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Measurement range of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    NotDefined,
    /// Radiometric 1
    R1,
    /// Radiometric 2
    R2,
    /// Radiometric 3
    R3,
    HighGain,
    LowGain,
}

impl Range {
    pub fn device_value(self) -> u16 {
        match self {
            Range::NotDefined => 0x0F,
            Range::R1 => 0x00,
            Range::R2 => 0x01,
            Range::R3 => 0x02,
            Range::HighGain => 0x07,
            Range::LowGain => 0x08,
        }
    }

    pub fn from_device_value(value: u16) -> Result<Self, Error> {
        match value {
            0x0F => Ok(Range::NotDefined),
            0x00 => Ok(Range::R1),
            0x01 => Ok(Range::R2),
            0x02 => Ok(Range::R3),
            0x07 => Ok(Range::HighGain),
            0x08 => Ok(Range::LowGain),
            _ => Err(Error::InvalidData),
        }
    }

    /// Whether temperatures can be measured in this range.
    pub fn is_radiometric(self) -> bool {
        matches!(self, Range::R1 | Range::R2 | Range::R3)
    }

    /// Lower temperature bound in degrees Celsius.
    pub fn lower_temperature(self) -> Option<i32> {
        match self {
            Range::R1 => Some(-15),
            Range::R2 => Some(0),
            Range::R3 => Some(300),
            Range::HighGain | Range::LowGain => Some(-50),
            Range::NotDefined => None,
        }
    }

    /// Upper temperature bound in degrees Celsius.
    pub fn upper_temperature(self) -> Option<i32> {
        match self {
            Range::R1 => Some(160),
            Range::R2 => Some(650),
            Range::R3 => Some(1500),
            Range::HighGain => Some(160),
            Range::LowGain => Some(600),
            Range::NotDefined => None,
        }
    }
}

/// Lens of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lens {
    NotDefined,
    /// L-WTC-35-11
    Wtc35,
    /// L-WTC-25-12
    Wtc25,
    /// L-WTC-14-12
    Wtc14,
    /// L-WTC-7-12
    Wtc7_5,
    User1,
    User2,
}

impl Lens {
    pub fn device_value(self) -> u16 {
        match self {
            Lens::NotDefined => 0x0F,
            Lens::Wtc35 => 0x00,
            Lens::Wtc25 => 0x01,
            Lens::Wtc14 => 0x02,
            Lens::Wtc7_5 => 0x03,
            Lens::User1 => 0x07,
            Lens::User2 => 0x08,
        }
    }

    pub fn from_device_value(value: u16) -> Result<Self, Error> {
        match value {
            0x0F => Ok(Lens::NotDefined),
            0x00 => Ok(Lens::Wtc35),
            0x01 => Ok(Lens::Wtc25),
            0x02 => Ok(Lens::Wtc14),
            0x03 => Ok(Lens::Wtc7_5),
            0x07 => Ok(Lens::User1),
            0x08 => Ok(Lens::User2),
            _ => Err(Error::InvalidData),
        }
    }

    pub fn is_user_defined(self) -> bool {
        matches!(self, Lens::User1 | Lens::User2)
    }
}

/// A (range, lens) preset selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetId {
    pub range: Range,
    pub lens: Lens,
}

impl PresetId {
    pub fn new(range: Range, lens: Lens) -> Self {
        Self { range, lens }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_device_values() {
        // Pinned bit patterns: decoding is a plain table over the masked
        // 16-bit field, not a truthiness check.
        assert_eq!(Range::from_device_value(0x00), Ok(Range::R1));
        assert_eq!(Range::from_device_value(0x01), Ok(Range::R2));
        assert_eq!(Range::from_device_value(0x02), Ok(Range::R3));
        assert_eq!(Range::from_device_value(0x07), Ok(Range::HighGain));
        assert_eq!(Range::from_device_value(0x08), Ok(Range::LowGain));
        assert_eq!(Range::from_device_value(0x0F), Ok(Range::NotDefined));
        assert_eq!(Range::from_device_value(0x03), Err(Error::InvalidData));
        assert_eq!(Range::from_device_value(0x100), Err(Error::InvalidData));
    }

    #[test]
    fn test_lens_device_values() {
        assert_eq!(Lens::from_device_value(0x03), Ok(Lens::Wtc7_5));
        assert_eq!(Lens::from_device_value(0x04), Err(Error::InvalidData));
        for lens in [
            Lens::NotDefined,
            Lens::Wtc35,
            Lens::Wtc25,
            Lens::Wtc14,
            Lens::Wtc7_5,
            Lens::User1,
            Lens::User2,
        ] {
            assert_eq!(Lens::from_device_value(lens.device_value()), Ok(lens));
        }
    }

    #[test]
    fn test_radiometric_ranges() {
        assert!(Range::R1.is_radiometric());
        assert!(!Range::HighGain.is_radiometric());
        assert_eq!(Range::R3.upper_temperature(), Some(1500));
        assert_eq!(Range::NotDefined.lower_temperature(), None);
    }

    #[test]
    fn test_user_lenses() {
        assert!(Lens::User1.is_user_defined());
        assert!(!Lens::Wtc35.is_user_defined());
    }
}
