//! Device status word
//!
//! The status register is a 32-bit flag word; this module gives the bits
//! names.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// State of the bayonet lens connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BayonetState {
    UnknownState,
    Disconnected,
    ConnectedUnknown,
    ConnectedKnown,
}

impl BayonetState {
    fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => BayonetState::UnknownState,
            0b01 => BayonetState::Disconnected,
            0b10 => BayonetState::ConnectedUnknown,
            _ => BayonetState::ConnectedKnown,
        }
    }
}

/// Which program the core is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    /// Main program in user mode
    MainUser,
    /// Main program in admin mode
    MainAdmin,
    /// Loader
    Loader,
}

impl DeviceType {
    fn from_bits(bits: u32) -> Result<Self, Error> {
        match bits & 0b11 {
            0b00 => Ok(DeviceType::MainUser),
            0b01 => Ok(DeviceType::MainAdmin),
            0b10 => Ok(DeviceType::Loader),
            _ => Err(Error::InvalidData),
        }
    }
}

/// Decoded view of the status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatus(u32);

impl DeviceStatus {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn is_nuc_active(&self) -> bool {
        self.0 & (1 << 0) != 0
    }

    pub fn is_camera_not_ready(&self) -> bool {
        self.0 & (1 << 1) != 0
    }

    pub fn is_valid_tfpa(&self) -> bool {
        self.0 & (1 << 2) != 0
    }

    pub fn device_type(&self) -> Result<DeviceType, Error> {
        DeviceType::from_bits(self.0 >> 3)
    }

    pub fn is_motorfocus_busy(&self) -> bool {
        self.0 & (1 << 5) != 0
    }

    pub fn is_motorfocus_available(&self) -> bool {
        self.0 & (1 << 6) != 0
    }

    pub fn bayonet_state(&self) -> BayonetState {
        BayonetState::from_bits(self.0 >> 7)
    }

    pub fn is_motorfocus_running(&self) -> bool {
        self.0 & (1 << 9) != 0
    }

    pub fn is_motorfocus_position_reached(&self) -> bool {
        self.0 & (1 << 10) != 0
    }

    pub fn is_any_trigger_active(&self) -> bool {
        self.0 & (1 << 11) != 0
    }

    pub fn nuc_registers_changed(&self) -> bool {
        self.0 & (1 << 27) != 0
    }

    pub fn bolometer_registers_changed(&self) -> bool {
        self.0 & (1 << 28) != 0
    }

    pub fn focus_registers_changed(&self) -> bool {
        self.0 & (1 << 30) != 0
    }

    pub fn presets_registers_changed(&self) -> bool {
        self.0 & (1 << 31) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits() {
        let status = DeviceStatus::new(0b1000_0000_0110);
        assert!(!status.is_nuc_active());
        assert!(status.is_camera_not_ready());
        assert!(status.is_valid_tfpa());
        assert!(status.is_any_trigger_active());
        assert!(!status.is_motorfocus_busy());
    }

    #[test]
    fn test_device_type_field() {
        assert_eq!(
            DeviceStatus::new(0b01 << 3).device_type(),
            Ok(DeviceType::MainAdmin)
        );
        assert_eq!(
            DeviceStatus::new(0b10 << 3).device_type(),
            Ok(DeviceType::Loader)
        );
        assert_eq!(
            DeviceStatus::new(0b11 << 3).device_type(),
            Err(Error::InvalidData)
        );
    }

    #[test]
    fn test_bayonet_field() {
        assert_eq!(
            DeviceStatus::new(0b11 << 7).bayonet_state(),
            BayonetState::ConnectedKnown
        );
        assert_eq!(
            DeviceStatus::new(0).bayonet_state(),
            BayonetState::UnknownState
        );
    }

    #[test]
    fn test_register_change_bits() {
        assert!(DeviceStatus::new(1 << 27).nuc_registers_changed());
        assert!(DeviceStatus::new(1 << 28).bolometer_registers_changed());
        assert!(DeviceStatus::new(1 << 30).focus_registers_changed());
        assert!(DeviceStatus::new(1 << 31).presets_registers_changed());

        // Bit 29 is unassigned and must not read as any change flag.
        let status = DeviceStatus::new(1 << 29);
        assert!(!status.focus_registers_changed());
        assert!(!status.presets_registers_changed());
    }
}
