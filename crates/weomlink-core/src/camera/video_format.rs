//! Video format register values

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Where the video tap sits relative to the image gain correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoFormat {
    /// Raw signal before image gain correction
    PreIgc,
    /// Corrected signal after image gain correction
    PostIgc,
}

impl VideoFormat {
    pub fn device_value(self) -> u8 {
        match self {
            VideoFormat::PreIgc => 0,
            VideoFormat::PostIgc => 1,
        }
    }

    pub fn from_device_value(value: u8) -> Result<Self, Error> {
        match value {
            0 => Ok(VideoFormat::PreIgc),
            1 => Ok(VideoFormat::PostIgc),
            _ => Err(Error::InvalidData),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_value_roundtrip() {
        assert_eq!(VideoFormat::from_device_value(0), Ok(VideoFormat::PreIgc));
        assert_eq!(VideoFormat::from_device_value(1), Ok(VideoFormat::PostIgc));
        assert_eq!(VideoFormat::from_device_value(2), Err(Error::InvalidData));
    }
}
