//! # WEOMLINK Core Library
//!
//! Host-side control of WEOM thermal camera cores over a serial link.
//!
//! This library provides:
//! - The TCSI framed packet codec with strict validation
//! - A stop-and-wait transaction engine over a pluggable data link
//! - A chunking, retrying device engine driven by the camera memory map
//! - A typed register façade (palettes, presets, filters, triggers, ...)
//!
//! ## Example
//!
//! ```rust,ignore
//! use weomlink_core::camera::{MemoryTarget, Weom};
//! use weomlink_core::protocol::{SerialConfig, SerialLink};
//!
//! let link = SerialLink::open(&SerialConfig {
//!     port_name: "/dev/ttyUSB0".into(),
//!     ..Default::default()
//! })?;
//!
//! let mut camera = Weom::new();
//! camera.set_data_link(Box::new(link))?;
//!
//! println!("serial number: {}", camera.get_serial_number()?);
//! camera.set_palette_index(2, MemoryTarget::Ram)?;
//! ```

pub mod camera;
pub mod device;
pub mod error;
pub mod protocol;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::camera::{MemoryTarget, Weom};
    pub use crate::device::{DeviceEndianness, MemorySpace, WeomDevice};
    pub use crate::error::Error;
    pub use crate::protocol::{
        AddressRange, DataLink, SerialConfig, SerialLink, TcsiPacket, TcsiProtocol,
    };
    pub use crate::timer::{ElapsedTimer, SleepFn};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
