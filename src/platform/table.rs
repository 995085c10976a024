//! Driver table platform
//!
//! Describes a set of drivers and their enumeration behaviour in TOML or
//! JSON, e.g.:
//!
//! ```toml
//! [[drivers]]
//! id = "FBDV"
//! name = "Framebuffer"
//! modes = [
//!     { width = 640, height = 480, bpp = 8 },
//!     { width = 640, height = 480, bpp = 16 },
//! ]
//!
//! [[drivers]]
//! id = "VGA"
//! name = "Standard VGA"   # no modes: enumeration unsupported
//!
//! [[drivers]]
//! id = "BRKN"
//! name = "Broken"
//! failure = "device busy"
//! ```

use super::{DriverInfo, Platform, RawMode};
use crate::catalog::DriverId;
use crate::error::{ModeSelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One driver in the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDriver {
    /// Driver id
    pub id: DriverId,
    /// Display name
    pub name: String,

    /// Raw modes; `None` means the driver cannot enumerate
    #[serde(default)]
    pub modes: Option<Vec<RawMode>>,

    /// When set, enumeration fails with this message
    #[serde(default)]
    pub failure: Option<String>,
}

/// Platform backed by a static driver table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePlatform {
    /// Drivers in table order
    #[serde(default)]
    pub drivers: Vec<TableDriver>,

    /// Report no system list so the built-in fallback table is used
    #[serde(default)]
    pub use_fallback_table: bool,
}

impl TablePlatform {
    /// Platform serving `drivers`
    pub fn new(drivers: Vec<TableDriver>) -> Self {
        Self {
            drivers,
            use_fallback_table: false,
        }
    }

    /// Load a table from a `.json` or TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let table: Self = if is_json {
            serde_json::from_str(&raw).map_err(|e| {
                ModeSelError::ParseError(format!("{}: {}", path.display(), e))
            })?
        } else {
            toml::from_str(&raw).map_err(|e| {
                ModeSelError::ParseError(format!("{}: {}", path.display(), e))
            })?
        };

        log::debug!(
            "Loaded driver table {} ({} drivers)",
            path.display(),
            table.drivers.len()
        );
        Ok(table)
    }
}

impl Platform for TablePlatform {
    fn list_drivers(&self) -> Option<Vec<DriverInfo>> {
        if self.use_fallback_table {
            return None;
        }
        Some(
            self.drivers
                .iter()
                .map(|d| DriverInfo::new(d.id, d.name.clone()))
                .collect(),
        )
    }

    fn enumerate_modes(&self, driver: DriverId) -> Result<Vec<RawMode>> {
        let entry = self
            .drivers
            .iter()
            .find(|d| d.id == driver)
            .ok_or(ModeSelError::EnumerationUnsupported(driver))?;

        if let Some(failure) = &entry.failure {
            return Err(ModeSelError::enumeration(driver, failure.clone()));
        }

        entry
            .modes
            .clone()
            .ok_or(ModeSelError::EnumerationUnsupported(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const TABLE: &str = r#"
[[drivers]]
id = "FBDV"
name = "Framebuffer"
modes = [
    { width = 640, height = 480, bpp = 8 },
    { width = 640, height = 480, bpp = 16 },
]

[[drivers]]
id = "VGA"
name = "Standard VGA"

[[drivers]]
id = "BRKN"
name = "Broken"
failure = "device busy"
"#;

    #[test]
    fn test_parse_toml_table() {
        let table: TablePlatform = toml::from_str(TABLE).unwrap();
        assert_eq!(table.drivers.len(), 3);

        let names: Vec<String> = table
            .list_drivers()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Framebuffer", "Standard VGA", "Broken"]);
    }

    #[test]
    fn test_enumeration_outcomes() {
        let table: TablePlatform = toml::from_str(TABLE).unwrap();

        let modes = table.enumerate_modes(DriverId::from_tag("FBDV")).unwrap();
        assert_eq!(modes.len(), 2);

        assert!(matches!(
            table.enumerate_modes(DriverId::from_tag("VGA")),
            Err(ModeSelError::EnumerationUnsupported(_))
        ));
        assert!(matches!(
            table.enumerate_modes(DriverId::from_tag("BRKN")),
            Err(ModeSelError::EnumerationFailed { .. })
        ));
        assert!(matches!(
            table.enumerate_modes(DriverId::from_tag("NONE")),
            Err(ModeSelError::EnumerationUnsupported(_))
        ));
    }

    #[test]
    fn test_fallback_flag() {
        let table = TablePlatform {
            drivers: Vec::new(),
            use_fallback_table: true,
        };
        assert_eq!(table.list_drivers(), None);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"drivers": [{{"id": "X11", "name": "X11 window", "modes": [{{"width": 800, "height": 600, "bpp": 32}}]}}]}}"#
        )
        .unwrap();

        let table = TablePlatform::load(file.path()).unwrap();
        assert_eq!(table.drivers[0].id, DriverId::from_tag("X11"));
        assert_eq!(table.drivers[0].modes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "drivers = 3").unwrap();
        assert!(matches!(
            TablePlatform::load(file.path()),
            Err(ModeSelError::ParseError(_))
        ));
    }
}
