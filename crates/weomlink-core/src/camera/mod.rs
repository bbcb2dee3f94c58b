//! Typed WEOM camera façade
//!
//! Thin accessors over the device engine: one `get`/`set` pair per register,
//! with the enum and bitfield conversions the registers need. The data link
//! must be set with [`Weom::set_data_link`] before anything else works.

pub mod contrast_brightness;
pub mod firmware_version;
pub mod framerate;
pub mod image_equalization;
pub mod image_flip;
pub mod image_generator;
pub mod preset_id;
pub mod shutter_update_mode;
pub mod status;
pub mod time_domain_averaging;
pub mod triggers;
pub mod video_format;

pub use contrast_brightness::ContrastBrightness;
pub use firmware_version::FirmwareVersion;
pub use framerate::Framerate;
pub use image_equalization::ImageEqualizationType;
pub use image_flip::ImageFlip;
pub use image_generator::ImageGenerator;
pub use preset_id::{Lens, PresetId, Range};
pub use shutter_update_mode::ShutterUpdateMode;
pub use status::{BayonetState, DeviceStatus, DeviceType};
pub use time_domain_averaging::TimeDomainAveraging;
pub use triggers::{Trigger, Triggers};
pub use video_format::VideoFormat;

use serde::{Deserialize, Serialize};

use crate::device::{MemorySpace, WeomDevice};
use crate::error::Error;
use crate::protocol::{AddressRange, DataLink, TcsiProtocol};
use crate::timer::{default_sleep_fn, SleepFn};

/// First bytes of the device identificator register on a WEOM core.
const WEOM_IDENTIFICATOR: [u8; 3] = [0x57, 0x06, 0x4D];

/// Where a written setting should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryTarget {
    /// The live register image; lost on power cycle
    Ram,
    /// The persistent copy in flash
    Flash,
}

/// A WEOM camera core.
pub struct Weom {
    device: Option<WeomDevice>,
    sleep_fn: SleepFn,
}

impl Weom {
    /// Camera handle with the default thread-sleep backoff. No data link is
    /// set yet.
    pub fn new() -> Self {
        Self::with_sleep_fn(default_sleep_fn())
    }

    /// Camera handle with a caller-supplied sleep function, used for busy
    /// backoff and receive draining all the way down the stack.
    pub fn with_sleep_fn(sleep_fn: SleepFn) -> Self {
        Self {
            device: None,
            sleep_fn,
        }
    }

    /// Build a fresh protocol + device stack over `link`, then read the
    /// device identificator to confirm a WEOM core is on the other end. The
    /// previous stack is dropped either way.
    pub fn set_data_link(&mut self, link: Box<dyn DataLink>) -> Result<(), Error> {
        let protocol = TcsiProtocol::with_sleep_fn(self.sleep_fn.clone());
        protocol.set_data_link(link);
        self.device = Some(WeomDevice::with_sleep_fn(protocol, self.sleep_fn.clone()));

        let identificator = self.read_register(MemorySpace::DEVICE_IDENTIFICATOR)?;
        if identificator[..3] != WEOM_IDENTIFICATOR {
            eprintln!(
                "[WARN] set_data_link: device identificator mismatch: {:02x?}",
                &identificator[..3]
            );
            self.device = None;
            return Err(Error::NoProtocol);
        }
        Ok(())
    }

    /// Whether the protocol engine flagged the connection as lost.
    pub fn is_connection_lost(&self) -> bool {
        self.device
            .as_ref()
            .map(|device| device.protocol().is_connection_lost())
            .unwrap_or(false)
    }

    /// The device status word.
    pub fn get_status(&self) -> Result<DeviceStatus, Error> {
        let data = self.read_register(MemorySpace::STATUS)?;
        Ok(DeviceStatus::new(self.device()?.endianness().read_u32(&data)))
    }

    /// Actions currently in flight.
    pub fn get_triggers(&self) -> Result<Triggers, Error> {
        let data = self.read_register(MemorySpace::TRIGGER)?;
        Ok(Triggers::new(self.device()?.endianness().read_u32(&data)))
    }

    /// Start a one-shot device action.
    pub fn activate_trigger(&self, trigger: Trigger) -> Result<(), Error> {
        let mut data = [0u8; 4];
        self.device()?
            .endianness()
            .write_u32(&mut data, trigger as u32);
        self.write_register(MemorySpace::TRIGGER, MemoryTarget::Ram, &data)
    }

    /// The device serial number.
    pub fn get_serial_number(&self) -> Result<String, Error> {
        let data = self.device()?.read_range(MemorySpace::SERIAL_NUMBER_CURRENT)?;
        Ok(trim_register_string(&data))
    }

    /// The device article number.
    pub fn get_article_number(&self) -> Result<String, Error> {
        let data = self.device()?.read_range(MemorySpace::ARTICLE_NUMBER_CURRENT)?;
        Ok(trim_register_string(&data))
    }

    /// The main firmware version.
    pub fn get_firmware_version(&self) -> Result<FirmwareVersion, Error> {
        let data = self.read_register(MemorySpace::MAIN_FIRMWARE_VERSION)?;
        let minor2 = self.device()?.endianness().read_u16(&data[0..2]);
        Ok(FirmwareVersion::new(data[3], data[2], minor2))
    }

    /// Index of the active palette.
    pub fn get_palette_index(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::PALETTE_INDEX_CURRENT)?;
        Ok(data[0])
    }

    /// Select a palette, in RAM or persistently.
    pub fn set_palette_index(&self, index: u8, target: MemoryTarget) -> Result<(), Error> {
        let data = [index, 0, 0, 0];
        self.write_register(MemorySpace::PALETTE_INDEX_CURRENT, target, &data)
    }

    /// Human-readable name of a palette slot.
    pub fn get_palette_name(&self, palette_index: u32) -> Result<String, Error> {
        let range = MemorySpace::palette_name_range(palette_index);
        let data = self.device()?.read_range(range)?;
        Ok(trim_register_string(&data))
    }

    pub fn get_framerate(&self) -> Result<Framerate, Error> {
        let data = self.read_register(MemorySpace::FRAME_RATE_CURRENT)?;
        Framerate::from_device_value(data[0])
    }

    pub fn set_framerate(&self, framerate: Framerate) -> Result<(), Error> {
        let data = [framerate.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::FRAME_RATE_CURRENT, MemoryTarget::Ram, &data)
    }

    pub fn get_image_flip(&self) -> Result<ImageFlip, Error> {
        let data = self.read_register(MemorySpace::IMAGE_FLIP_CURRENT)?;
        Ok(ImageFlip::from_device_value(data[0]))
    }

    pub fn set_image_flip(&self, flip: ImageFlip) -> Result<(), Error> {
        let data = [flip.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::IMAGE_FLIP_CURRENT, MemoryTarget::Ram, &data)
    }

    pub fn get_image_freeze(&self) -> Result<bool, Error> {
        let data = self.read_register(MemorySpace::IMAGE_FREEZE)?;
        Ok(data[0] == 1)
    }

    pub fn set_image_freeze(&self, freeze: bool) -> Result<(), Error> {
        let data = [freeze as u8, 0, 0, 0];
        self.write_register(MemorySpace::IMAGE_FREEZE, MemoryTarget::Ram, &data)
    }

    pub fn get_image_generator(&self) -> Result<ImageGenerator, Error> {
        let data = self.read_register(MemorySpace::TEST_PATTERN)?;
        ImageGenerator::from_device_value(data[0])
    }

    pub fn set_image_generator(&self, generator: ImageGenerator) -> Result<(), Error> {
        let data = [generator.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::TEST_PATTERN, MemoryTarget::Ram, &data)
    }

    pub fn get_shutter_update_mode(&self) -> Result<ShutterUpdateMode, Error> {
        let data = self.read_register(MemorySpace::NUC_UPDATE_MODE_CURRENT)?;
        ShutterUpdateMode::from_device_value(data[0])
    }

    pub fn set_shutter_update_mode(
        &self,
        mode: ShutterUpdateMode,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let data = [mode.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::NUC_UPDATE_MODE_CURRENT, target, &data)
    }

    /// Longest interval between periodic shutter updates, in seconds.
    pub fn get_shutter_max_period(&self) -> Result<u16, Error> {
        let data = self.read_register(MemorySpace::NUC_MAX_PERIOD_CURRENT)?;
        Ok(self.device()?.endianness().read_u16(&data[0..2]))
    }

    pub fn set_shutter_max_period(&self, period: u16, target: MemoryTarget) -> Result<(), Error> {
        let mut data = [0u8; 4];
        self.device()?.endianness().write_u16(&mut data[0..2], period);
        self.write_register(MemorySpace::NUC_MAX_PERIOD_CURRENT, target, &data)
    }

    /// Sensor drift (kelvin) that triggers an adaptive shutter update. The
    /// register holds hundredths.
    pub fn get_shutter_adaptive_threshold(&self) -> Result<f64, Error> {
        let data = self.read_register(MemorySpace::NUC_ADAPTIVE_THRESHOLD_CURRENT)?;
        let raw = self.device()?.endianness().read_u16(&data[0..2]);
        Ok(f64::from(raw) / 100.0)
    }

    pub fn set_shutter_adaptive_threshold(
        &self,
        threshold: f64,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let raw = (threshold * 100.0).round();
        if !(0.0..=f64::from(u16::MAX)).contains(&raw) {
            return Err(Error::InvalidData);
        }
        let mut data = [0u8; 4];
        self.device()?.endianness().write_u16(&mut data[0..2], raw as u16);
        self.write_register(MemorySpace::NUC_ADAPTIVE_THRESHOLD_CURRENT, target, &data)
    }

    pub fn get_time_domain_averaging(&self) -> Result<TimeDomainAveraging, Error> {
        let data = self.read_register(MemorySpace::TIME_DOMAIN_AVERAGE_CURRENT)?;
        TimeDomainAveraging::from_device_value(data[0])
    }

    pub fn set_time_domain_averaging(
        &self,
        averaging: TimeDomainAveraging,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let data = [averaging.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::TIME_DOMAIN_AVERAGE_CURRENT, target, &data)
    }

    pub fn get_image_equalization_type(&self) -> Result<ImageEqualizationType, Error> {
        let data = self.read_register(MemorySpace::IMAGE_EQUALIZATION_TYPE_CURRENT)?;
        ImageEqualizationType::from_device_value(data[0])
    }

    pub fn set_image_equalization_type(
        &self,
        kind: ImageEqualizationType,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let data = [kind.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::IMAGE_EQUALIZATION_TYPE_CURRENT, target, &data)
    }

    pub fn get_mgc_contrast_brightness(&self) -> Result<ContrastBrightness, Error> {
        let data = self.read_register(MemorySpace::MGC_CONTRAST_BRIGHTNESS_CURRENT)?;
        let endianness = self.device()?.endianness();
        Ok(ContrastBrightness::from_raw(
            endianness.read_u16(&data[0..2]),
            endianness.read_u16(&data[2..4]),
        ))
    }

    pub fn set_mgc_contrast_brightness(
        &self,
        value: ContrastBrightness,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let mut data = [0u8; 4];
        let endianness = self.device()?.endianness();
        endianness.write_u16(&mut data[0..2], value.contrast_raw());
        endianness.write_u16(&mut data[2..4], value.brightness_raw());
        self.write_register(MemorySpace::MGC_CONTRAST_BRIGHTNESS_CURRENT, target, &data)
    }

    pub fn get_agc_nh_smoothing_frames(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::AGC_NH_SMOOTHING_CURRENT)?;
        Ok(data[0])
    }

    pub fn set_agc_nh_smoothing_frames(&self, frames: u8, target: MemoryTarget) -> Result<(), Error> {
        let data = [frames, 0, 0, 0];
        self.write_register(MemorySpace::AGC_NH_SMOOTHING_CURRENT, target, &data)
    }

    /// Weight of the linear component in the AGC gain mix.
    pub fn get_linear_gain_weight(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::AGC_LINEAR_GAIN_WEIGHT_CURRENT)?;
        Ok(data[0])
    }

    pub fn set_linear_gain_weight(&self, weight: u8, target: MemoryTarget) -> Result<(), Error> {
        let data = [weight, 0, 0, 0];
        self.write_register(MemorySpace::AGC_LINEAR_GAIN_WEIGHT_CURRENT, target, &data)
    }

    /// Histogram clip limit of the AGC equalization.
    pub fn get_clip_limit(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::AGC_CLIP_LIMIT_CURRENT)?;
        Ok(data[0])
    }

    pub fn set_clip_limit(&self, limit: u8, target: MemoryTarget) -> Result<(), Error> {
        let data = [limit, 0, 0, 0];
        self.write_register(MemorySpace::AGC_CLIP_LIMIT_CURRENT, target, &data)
    }

    /// How much of the histogram plateau tail the AGC discards.
    pub fn get_plateau_tail_rejection(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::AGC_PLATEAU_TAIL_REJECTION_CURRENT)?;
        Ok(data[0])
    }

    pub fn set_plateau_tail_rejection(&self, rejection: u8, target: MemoryTarget) -> Result<(), Error> {
        let data = [rejection, 0, 0, 0];
        self.write_register(MemorySpace::AGC_PLATEAU_TAIL_REJECTION_CURRENT, target, &data)
    }

    pub fn get_spatial_median_filter_enabled(&self) -> Result<bool, Error> {
        let data = self.read_register(MemorySpace::SPATIAL_MEDIAN_FILTER_ENABLE_CURRENT)?;
        Ok(data[0] == 1)
    }

    pub fn set_spatial_median_filter_enabled(
        &self,
        enabled: bool,
        target: MemoryTarget,
    ) -> Result<(), Error> {
        let data = [enabled as u8, 0, 0, 0];
        self.write_register(MemorySpace::SPATIAL_MEDIAN_FILTER_ENABLE_CURRENT, target, &data)
    }

    /// Route the video tap before or after image gain correction.
    pub fn set_video_format(&self, format: VideoFormat, target: MemoryTarget) -> Result<(), Error> {
        let data = [format.device_value(), 0, 0, 0];
        self.write_register(MemorySpace::VIDEO_FORMAT_CURRENT, target, &data)
    }

    /// The preset the device is currently running.
    pub fn get_preset_id(&self) -> Result<PresetId, Error> {
        self.decode_preset_id(MemorySpace::CURRENT_PRESET_ID)
    }

    /// The preset stored at the given table slot.
    pub fn get_preset_id_at(&self, preset_index: u8) -> Result<PresetId, Error> {
        self.decode_preset_id(MemorySpace::preset_id_range(preset_index))
    }

    /// Number of populated preset table slots.
    pub fn get_preset_id_count(&self) -> Result<u8, Error> {
        let data = self.read_register(MemorySpace::PRESET_ID_COUNT)?;
        Ok(data[0])
    }

    /// Select a preset and trigger the switch to it.
    pub fn set_preset_id(&self, id: PresetId) -> Result<(), Error> {
        let mut data = [0u8; 4];
        let endianness = self.device()?.endianness();
        endianness.write_u16(&mut data[0..2], id.range.device_value());
        endianness.write_u16(&mut data[2..4], id.lens.device_value());
        self.write_register(MemorySpace::SELECTED_PRESET_ID, MemoryTarget::Ram, &data)?;
        self.activate_trigger(Trigger::SetSelectedPreset)
    }

    /// Persist the running preset selection, so the device boots into it.
    pub fn save_current_preset_index_to_flash(&self) -> Result<(), Error> {
        let data = self.read_register(MemorySpace::CURRENT_PRESET_ID)?;
        self.write_register(MemorySpace::SELECTED_PRESET_ID, MemoryTarget::Flash, &data)
    }

    fn decode_preset_id(&self, range: AddressRange) -> Result<PresetId, Error> {
        let data = self.read_register(range)?;
        let endianness = self.device()?.endianness();
        let range = Range::from_device_value(endianness.read_u16(&data[0..2]))?;
        let lens = Lens::from_device_value(endianness.read_u16(&data[2..4]))?;
        Ok(PresetId::new(range, lens))
    }

    fn device(&self) -> Result<&WeomDevice, Error> {
        self.device.as_ref().ok_or(Error::NoDataLink)
    }

    fn read_register(&self, range: AddressRange) -> Result<[u8; 4], Error> {
        let mut data = [0u8; 4];
        self.device()?.read_data(&mut data, range.first_address())?;
        Ok(data)
    }

    fn write_register(
        &self,
        range: AddressRange,
        target: MemoryTarget,
        data: &[u8],
    ) -> Result<(), Error> {
        let address = match target {
            MemoryTarget::Ram => range.first_address(),
            MemoryTarget::Flash => {
                MemorySpace::ADDRESS_FLASH_REGISTERS_START + range.first_address()
            }
        };
        self.device()?.write_data(data, address)
    }
}

impl Default for Weom {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers store strings NUL-padded; cut at the first NUL.
fn trim_register_string(data: &[u8]) -> String {
    let end = data.iter().position(|&byte| byte == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_link() {
        let camera = Weom::new();
        assert_eq!(camera.get_palette_index(), Err(Error::NoDataLink));
        assert!(!camera.is_connection_lost());
    }

    #[test]
    fn test_trim_register_string() {
        assert_eq!(trim_register_string(b"WTC640\0\0\0\0"), "WTC640");
        assert_eq!(trim_register_string(b"FULL"), "FULL");
        assert_eq!(trim_register_string(b"\0\0"), "");
    }
}
