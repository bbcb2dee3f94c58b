//! WEOM memory map
//!
//! A compile-time table of named register windows plus the memory-space
//! descriptors that govern alignment and chunking for device I/O.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::protocol::AddressRange;

/// Kinds of device memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryType {
    /// RAM-backed image of the configuration registers
    RegistersConfiguration,
    /// Persistent copy living in the flash window
    FlashMemory,
}

impl MemoryType {
    /// Smallest transfer allowed in this memory; addresses and sizes must be
    /// multiples of it.
    pub const fn minimum_data_size(self) -> u32 {
        match self {
            MemoryType::RegistersConfiguration => 4,
            MemoryType::FlashMemory => 4,
        }
    }

    /// Largest transfer a single protocol exchange may carry here.
    pub const fn maximum_data_size(self) -> u32 {
        match self {
            MemoryType::RegistersConfiguration => 4,
            MemoryType::FlashMemory => 4,
        }
    }
}

/// One contiguous memory region and its transfer constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDescriptor {
    pub address_range: AddressRange,
    pub memory_type: MemoryType,
    pub minimum_data_size: u32,
    pub maximum_data_size: u32,
}

impl MemoryDescriptor {
    pub const fn new(address_range: AddressRange, memory_type: MemoryType) -> Self {
        Self::with_sizes(
            address_range,
            memory_type,
            memory_type.minimum_data_size(),
            memory_type.maximum_data_size(),
        )
    }

    /// Descriptor with explicit transfer bounds instead of the per-type
    /// defaults.
    pub const fn with_sizes(
        address_range: AddressRange,
        memory_type: MemoryType,
        minimum_data_size: u32,
        maximum_data_size: u32,
    ) -> Self {
        Self {
            address_range,
            memory_type,
            minimum_data_size,
            maximum_data_size,
        }
    }
}

/// The device memory layout: an ordered, non-overlapping list of descriptors.
#[derive(Debug, Clone)]
pub struct MemorySpace {
    descriptors: Vec<MemoryDescriptor>,
}

impl MemorySpace {
    /// Space over the given descriptors. Regions must not overlap.
    pub fn new(descriptors: Vec<MemoryDescriptor>) -> Self {
        debug_assert!(descriptors.iter().enumerate().all(|(i, a)| {
            descriptors[i + 1..]
                .iter()
                .all(|b| !a.address_range.overlaps(&b.address_range))
        }));
        Self { descriptors }
    }

    /// The WEOM memory layout: the configuration register window (which
    /// includes the palette-name block) and the flash window.
    pub fn device_space() -> Self {
        Self::new(vec![
            MemoryDescriptor::new(
                Self::CONFIGURATION_REGISTERS,
                MemoryType::RegistersConfiguration,
            ),
            MemoryDescriptor::new(Self::FLASH_MEMORY, MemoryType::FlashMemory),
        ])
    }

    /// The descriptor whose region fully contains `address_range`. Regions do
    /// not overlap, so a linear scan is order-independent.
    pub fn descriptor_for(&self, address_range: &AddressRange) -> Result<MemoryDescriptor, Error> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.address_range.contains(address_range))
            .copied()
            .ok_or(Error::UnknownAddress)
    }

    /// All descriptors, in table order.
    pub fn descriptors(&self) -> &[MemoryDescriptor] {
        &self.descriptors
    }

    /// Configuration register window, palette names included.
    pub const CONFIGURATION_REGISTERS: AddressRange =
        AddressRange::first_to_last(0x0000_0000, 0x3000_40FF);
    /// Flash window.
    pub const FLASH_MEMORY: AddressRange = AddressRange::first_to_last(0xD000_0000, 0xDFFF_FFFF);
    /// Base of the flash-resident register image; add a register offset to
    /// address its persistent copy.
    pub const ADDRESS_FLASH_REGISTERS_START: u32 = Self::FLASH_MEMORY.first_address() + 0x0080_0000;

    // Control - 0x00xx
    pub const DEVICE_IDENTIFICATOR: AddressRange = AddressRange::first_and_size(0x0000, 4);
    pub const TRIGGER: AddressRange = AddressRange::first_and_size(0x0004, 4);
    pub const STATUS: AddressRange = AddressRange::first_and_size(0x000C, 4);

    // General - 0x01xx
    pub const MAIN_FIRMWARE_VERSION: AddressRange = AddressRange::first_and_size(0x0100, 4);
    pub const SERIAL_NUMBER_CURRENT: AddressRange = AddressRange::first_and_size(0x0114, 32);
    pub const ARTICLE_NUMBER_CURRENT: AddressRange = AddressRange::first_and_size(0x0134, 32);

    // Video - 0x02xx
    pub const PALETTE_INDEX_CURRENT: AddressRange = AddressRange::first_and_size(0x0200, 4);
    pub const FRAME_RATE_CURRENT: AddressRange = AddressRange::first_and_size(0x0204, 4);
    pub const IMAGE_FLIP_CURRENT: AddressRange = AddressRange::first_and_size(0x0208, 4);
    pub const IMAGE_FREEZE: AddressRange = AddressRange::first_and_size(0x020C, 4);
    pub const VIDEO_FORMAT_CURRENT: AddressRange = AddressRange::first_and_size(0x0210, 4);
    pub const TEST_PATTERN: AddressRange = AddressRange::first_and_size(0x0214, 4);

    // NUC - 0x03xx
    pub const NUC_UPDATE_MODE_CURRENT: AddressRange = AddressRange::first_and_size(0x0308, 4);
    pub const NUC_MAX_PERIOD_CURRENT: AddressRange = AddressRange::first_and_size(0x0320, 4);
    pub const NUC_ADAPTIVE_THRESHOLD_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0324, 4);

    // Filters - 0x06xx
    pub const TIME_DOMAIN_AVERAGE_CURRENT: AddressRange = AddressRange::first_and_size(0x0600, 4);
    pub const IMAGE_EQUALIZATION_TYPE_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0604, 4);
    pub const MGC_CONTRAST_BRIGHTNESS_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0608, 4);
    pub const AGC_NH_SMOOTHING_CURRENT: AddressRange = AddressRange::first_and_size(0x0610, 4);
    pub const SPATIAL_MEDIAN_FILTER_ENABLE_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0614, 4);
    pub const AGC_LINEAR_GAIN_WEIGHT_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0618, 4);
    pub const AGC_CLIP_LIMIT_CURRENT: AddressRange = AddressRange::first_and_size(0x061C, 4);
    pub const AGC_PLATEAU_TAIL_REJECTION_CURRENT: AddressRange =
        AddressRange::first_and_size(0x0620, 4);

    // Presets - 0x0Axx
    pub const PRESET_ID_COUNT: AddressRange = AddressRange::first_and_size(0x0A10, 4);
    pub const SELECTED_PRESET_ID: AddressRange = AddressRange::first_and_size(0x0A14, 4);
    pub const CURRENT_PRESET_ID: AddressRange = AddressRange::first_and_size(0x0A18, 4);
    /// Base of the preset id table, one 4-byte entry per preset index.
    pub const PRESET_ID_TABLE_START: AddressRange = AddressRange::first_and_size(0x0A1C, 4);

    /// The id entry of one preset slot.
    pub fn preset_id_range(preset_index: u8) -> AddressRange {
        Self::PRESET_ID_TABLE_START.moved(u32::from(preset_index) * 4)
    }

    // Palette names - 0x3000xxxx
    pub const PALETTE_NAMES: AddressRange = AddressRange::first_and_size(0x3000_0000, 0x4100);
    pub const PALETTE_NAME_SIZE: u32 = 32;

    /// The name window of one palette slot.
    pub fn palette_name_range(palette_index: u32) -> AddressRange {
        AddressRange::first_and_size(
            Self::PALETTE_NAMES.first_address() + palette_index * Self::PALETTE_NAME_SIZE,
            Self::PALETTE_NAME_SIZE,
        )
    }
}

impl Default for MemorySpace {
    fn default() -> Self {
        Self::device_space()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_space_lookup() {
        let space = MemorySpace::device_space();

        let status = space.descriptor_for(&MemorySpace::STATUS).unwrap();
        assert_eq!(status.memory_type, MemoryType::RegistersConfiguration);
        assert_eq!(status.minimum_data_size, 4);
        assert_eq!(status.maximum_data_size, 4);

        let flash = space
            .descriptor_for(&AddressRange::first_and_size(
                MemorySpace::ADDRESS_FLASH_REGISTERS_START,
                4,
            ))
            .unwrap();
        assert_eq!(flash.memory_type, MemoryType::FlashMemory);
    }

    #[test]
    fn test_lookup_unknown_address() {
        let space = MemorySpace::device_space();
        let outside = AddressRange::first_and_size(0x4000_0000, 4);
        assert_eq!(space.descriptor_for(&outside), Err(Error::UnknownAddress));
    }

    #[test]
    fn test_lookup_range_straddling_region_end() {
        let space = MemorySpace::device_space();
        let straddling =
            AddressRange::first_and_size(MemorySpace::CONFIGURATION_REGISTERS.last_address(), 8);
        assert_eq!(
            space.descriptor_for(&straddling),
            Err(Error::UnknownAddress)
        );
    }

    #[test]
    fn test_regions_do_not_overlap() {
        let space = MemorySpace::device_space();
        let descriptors = space.descriptors();
        for (i, a) in descriptors.iter().enumerate() {
            for b in &descriptors[i + 1..] {
                assert!(!a.address_range.overlaps(&b.address_range));
            }
        }
    }

    #[test]
    fn test_palette_name_window() {
        assert!(MemorySpace::CONFIGURATION_REGISTERS.contains(&MemorySpace::PALETTE_NAMES));

        let slot = MemorySpace::palette_name_range(2);
        assert_eq!(slot.first_address(), 0x3000_0040);
        assert_eq!(slot.size(), 32);
        assert!(MemorySpace::PALETTE_NAMES.contains(&slot));
    }

    #[test]
    fn test_register_windows_inside_configuration_space() {
        for range in [
            MemorySpace::DEVICE_IDENTIFICATOR,
            MemorySpace::TRIGGER,
            MemorySpace::STATUS,
            MemorySpace::SERIAL_NUMBER_CURRENT,
            MemorySpace::VIDEO_FORMAT_CURRENT,
            MemorySpace::AGC_LINEAR_GAIN_WEIGHT_CURRENT,
            MemorySpace::AGC_CLIP_LIMIT_CURRENT,
            MemorySpace::AGC_PLATEAU_TAIL_REJECTION_CURRENT,
            MemorySpace::PRESET_ID_COUNT,
            MemorySpace::SELECTED_PRESET_ID,
            MemorySpace::CURRENT_PRESET_ID,
            MemorySpace::preset_id_range(7),
        ] {
            assert!(MemorySpace::CONFIGURATION_REGISTERS.contains(&range));
        }
    }

    #[test]
    fn test_preset_table_stride() {
        assert_eq!(MemorySpace::preset_id_range(0).first_address(), 0x0A1C);
        assert_eq!(MemorySpace::preset_id_range(2).first_address(), 0x0A24);
        assert_eq!(MemorySpace::preset_id_range(2).size(), 4);
    }
}
