//! Trigger register
//!
//! Writing a trigger bit starts the corresponding device action; the register
//! reads back the actions still in flight.

use serde::{Deserialize, Serialize};

/// One-shot device actions, each a bit in the trigger register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum Trigger {
    /// Resets FPGA
    ResetFpga = 1 << 0,
    /// Resets FPGA to loader
    ResetToLoader = 1 << 1,
    /// Performs NUC offset update
    NucOffsetUpdate = 1 << 2,
    /// Cleans user dead pixels
    CleanUserDeadPixels = 1 << 3,
    /// Sets selected preset as current
    SetSelectedPreset = 1 << 4,
    /// Performs motorfocus calibration
    MotorfocusCalibration = 1 << 5,
    /// Starts frame capture
    FrameCaptureStart = 1 << 6,
    /// Resets all settings to factory default
    ResetToFactoryDefault = 1 << 7,
    /// Performs autofocus
    PerformAutofocus = 1 << 8,
}

/// Snapshot of the trigger register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Triggers(u32);

impl Triggers {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Whether the given action is still running.
    pub fn is_active(&self, trigger: Trigger) -> bool {
        self.0 & trigger as u32 != 0
    }

    /// Whether any action is still running.
    pub fn is_any_active(&self) -> bool {
        self.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_triggers() {
        let triggers = Triggers::new((Trigger::NucOffsetUpdate as u32) | (Trigger::PerformAutofocus as u32));
        assert!(triggers.is_active(Trigger::NucOffsetUpdate));
        assert!(triggers.is_active(Trigger::PerformAutofocus));
        assert!(!triggers.is_active(Trigger::ResetFpga));
        assert!(triggers.is_any_active());
    }

    #[test]
    fn test_idle_register() {
        assert!(!Triggers::new(0).is_any_active());
    }
}
