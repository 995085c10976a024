//! Platform collaborators: driver listing and mode enumeration
//!
//! The catalogs only consume the [`Platform`] trait. Two implementations are
//! provided: a serde-described driver table and the Linux framebuffer.

/// Linux framebuffer devices
pub mod fbdev;
/// Driver tables loaded from TOML or JSON
pub mod table;

pub use fbdev::FbdevPlatform;
pub use table::{TableDriver, TablePlatform};

use crate::catalog::DriverId;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A driver as reported by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Driver id
    pub id: DriverId,
    /// Display name
    pub name: String,
}

impl DriverInfo {
    /// Driver `id` shown as `name`
    pub fn new(id: DriverId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One raw (width, height, bpp) triple from mode enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMode {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bits per pixel as reported by the driver
    pub bpp: u32,
}

/// Source of drivers and their modes
#[cfg_attr(test, mockall::automock)]
pub trait Platform {
    /// Drivers provided by the system driver, or `None` when it has no list
    /// of its own and the fallback table applies
    fn list_drivers(&self) -> Option<Vec<DriverInfo>>;

    /// Raw modes of one driver.
    ///
    /// Returns [`ModeSelError::EnumerationUnsupported`](crate::ModeSelError::EnumerationUnsupported)
    /// when the driver cannot list modes, or
    /// [`ModeSelError::EnumerationFailed`](crate::ModeSelError::EnumerationFailed)
    /// when the attempt fails.
    fn enumerate_modes(&self, driver: DriverId) -> Result<Vec<RawMode>>;
}

/// Static driver table used when the system driver lists nothing
pub fn fallback_drivers() -> Vec<DriverInfo> {
    vec![
        DriverInfo::new(DriverId::from_tag("VGA"), "Standard VGA"),
        DriverInfo::new(DriverId::from_tag("MODX"), "Mode-X"),
        DriverInfo::new(DriverId::from_tag("VBE1"), "VESA 1.x"),
        DriverInfo::new(DriverId::from_tag("VBE2"), "VESA 2.0 (linear)"),
        DriverInfo::new(DriverId::from_tag("VBAF"), "VBE/AF"),
    ]
}
