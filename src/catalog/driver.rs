//! Driver catalog: the ordered list of selectable drivers and their modes

use super::mode::{build_mode_list, ModeList};
use crate::error::{ModeSelError, Result};
use crate::platform::{self, DriverInfo, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque graphics driver identifier
///
/// Real drivers use four-character tags packed big-endian into an `i32`
/// (`'VBE2'`, `'FBDV'`). The first three synthetic ids are small integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DriverIdRepr", into = "DriverIdRepr")]
pub struct DriverId(pub i32);

impl DriverId {
    /// Let the platform pick a driver
    pub const AUTODETECT: DriverId = DriverId(0);
    /// Let the platform pick a fullscreen driver
    pub const AUTODETECT_FULLSCREEN: DriverId = DriverId(1);
    /// Let the platform pick a windowed driver
    pub const AUTODETECT_WINDOWED: DriverId = DriverId(2);
    /// Safe fallback mode
    pub const SAFE: DriverId = DriverId::from_tag_bytes(*b"SAFE");

    const fn from_tag_bytes(tag: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(tag))
    }

    /// Build an id from a four-character tag, padding short tags with spaces
    pub fn from_tag(tag: &str) -> Self {
        let mut bytes = [b' '; 4];
        for (slot, b) in bytes.iter_mut().zip(tag.bytes()) {
            *slot = b;
        }
        Self::from_tag_bytes(bytes)
    }

    /// The four-character tag, when the id is one
    pub fn tag(&self) -> Option<String> {
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') && bytes[0] != b' ' {
            Some(String::from_utf8_lossy(&bytes).trim_end().to_string())
        } else {
            None
        }
    }

    /// Autodetect or safe ids, which never enumerate modes
    pub fn is_synthetic(&self) -> bool {
        matches!(
            *self,
            Self::AUTODETECT | Self::AUTODETECT_FULLSCREEN | Self::AUTODETECT_WINDOWED | Self::SAFE
        )
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "{}", tag),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for DriverId {
    type Err = ModeSelError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "auto" | "autodetect" => return Ok(Self::AUTODETECT),
            "fullscreen" => return Ok(Self::AUTODETECT_FULLSCREEN),
            "windowed" => return Ok(Self::AUTODETECT_WINDOWED),
            "safe" => return Ok(Self::SAFE),
            _ => {}
        }
        if let Ok(n) = s.parse::<i32>() {
            return Ok(Self(n));
        }
        if !s.is_empty() && s.len() <= 4 && s.is_ascii() {
            return Ok(Self::from_tag(s));
        }
        Err(ModeSelError::ParseError(format!("Invalid driver id '{}'", s)))
    }
}

/// Serialized form: a number or a tag string
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DriverIdRepr {
    Number(i32),
    Tag(String),
}

impl TryFrom<DriverIdRepr> for DriverId {
    type Error = ModeSelError;

    fn try_from(repr: DriverIdRepr) -> Result<Self> {
        match repr {
            DriverIdRepr::Number(n) => Ok(Self(n)),
            DriverIdRepr::Tag(tag) => tag.parse(),
        }
    }
}

impl From<DriverId> for DriverIdRepr {
    fn from(id: DriverId) -> Self {
        match id.tag() {
            Some(tag) => Self::Tag(tag),
            None => Self::Number(id.0),
        }
    }
}

/// One selectable driver with its resolution list
#[derive(Debug, Clone)]
pub struct DriverEntry {
    /// Driver identifier
    pub id: DriverId,
    /// Display name
    pub name: String,
    /// Resolutions offered under this driver
    pub modes: ModeList,
}

/// Ordered driver list, always starting with the three autodetect entries
///
/// Built fresh for every dialog and released by [`DriverCatalog::teardown`],
/// which consumes the catalog so it cannot run twice.
#[derive(Debug)]
pub struct DriverCatalog {
    drivers: Vec<DriverEntry>,
}

impl DriverCatalog {
    /// Number of synthetic entries at the head of every catalog
    pub const SYNTHETIC_COUNT: usize = 3;

    /// Enumerate drivers from the platform (or the fallback table) and build
    /// every driver's mode list
    pub fn build(platform: &dyn Platform) -> Result<Self> {
        let infos = match platform.list_drivers() {
            Some(infos) => infos,
            None => {
                log::debug!("Platform has no driver list, using the fallback table");
                platform::fallback_drivers()
            }
        };

        let mut catalog = Self {
            drivers: Vec::new(),
        };

        let synthetic = [
            (DriverId::AUTODETECT, "Autodetect"),
            (DriverId::AUTODETECT_FULLSCREEN, "Autodetect fullscreen"),
            (DriverId::AUTODETECT_WINDOWED, "Autodetect windowed"),
        ];
        for (id, name) in synthetic {
            catalog.push(id, name.to_string(), platform)?;
        }

        for info in infos {
            let DriverInfo { id, name } = info;
            catalog.push(id, name, platform)?;
        }

        log::debug!("Driver catalog built with {} entries", catalog.len());
        Ok(catalog)
    }

    fn push(&mut self, id: DriverId, name: String, platform: &dyn Platform) -> Result<()> {
        self.drivers.try_reserve(1).map_err(|e| {
            ModeSelError::AllocationFailure(format!("driver list: {}", e))
        })?;
        let modes = build_mode_list(id, platform)?;
        self.drivers.push(DriverEntry { id, name, modes });
        Ok(())
    }

    /// Assemble a catalog from prepared entries
    pub fn from_entries(drivers: Vec<DriverEntry>) -> Self {
        Self { drivers }
    }

    /// Entries in list order, synthetic ids first
    pub fn drivers(&self) -> &[DriverEntry] {
        &self.drivers
    }

    /// Entry at `index`, if any
    pub fn get(&self, index: usize) -> Option<&DriverEntry> {
        self.drivers.get(index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Index of the first driver with the given id
    pub fn position(&self, id: DriverId) -> Option<usize> {
        self.drivers.iter().position(|d| d.id == id)
    }

    /// Release every owned resolution list and the driver list itself.
    /// Borrowed default lists are skipped. Returns the number of owned lists
    /// released.
    pub fn teardown(self) -> usize {
        let mut released = 0;
        for driver in self.drivers {
            match driver.modes {
                ModeList::Owned(entries) => {
                    drop(entries);
                    released += 1;
                }
                ModeList::Default => {}
            }
        }
        log::debug!("Driver catalog released ({} owned mode lists)", released);
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MockPlatform, RawMode};
    use pretty_assertions::assert_eq;

    fn info(tag: &str, name: &str) -> DriverInfo {
        DriverInfo {
            id: DriverId::from_tag(tag),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_driver_id_tags() {
        assert_eq!(DriverId::SAFE.tag().as_deref(), Some("SAFE"));
        assert_eq!(DriverId::from_tag("VGA").to_string(), "VGA");
        assert_eq!(DriverId::AUTODETECT.tag(), None);
        assert_eq!(DriverId::AUTODETECT_WINDOWED.to_string(), "2");
        assert!(DriverId::SAFE.is_synthetic());
        assert!(!DriverId::from_tag("VBE2").is_synthetic());
    }

    #[test]
    fn test_driver_id_parse() {
        assert_eq!("auto".parse::<DriverId>().unwrap(), DriverId::AUTODETECT);
        assert_eq!("1".parse::<DriverId>().unwrap(), DriverId::AUTODETECT_FULLSCREEN);
        assert_eq!("FBDV".parse::<DriverId>().unwrap(), DriverId::from_tag("FBDV"));
        assert!("too long".parse::<DriverId>().is_err());
    }

    #[test]
    fn test_driver_id_serde() {
        let id: DriverId = serde_json::from_str("\"VBE2\"").unwrap();
        assert_eq!(id, DriverId::from_tag("VBE2"));
        let id: DriverId = serde_json::from_str("2").unwrap();
        assert_eq!(id, DriverId::AUTODETECT_WINDOWED);
        assert_eq!(serde_json::to_string(&DriverId::SAFE).unwrap(), "\"SAFE\"");
    }

    #[test]
    fn test_catalog_always_has_synthetic_entries() {
        let mut platform = MockPlatform::new();
        platform.expect_list_drivers().returning(|| Some(Vec::new()));
        platform.expect_enumerate_modes().never();

        let catalog = DriverCatalog::build(&platform).unwrap();
        assert_eq!(catalog.len(), DriverCatalog::SYNTHETIC_COUNT);
        let names: Vec<&str> = catalog.drivers().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Autodetect", "Autodetect fullscreen", "Autodetect windowed"]
        );
        assert!(catalog.drivers().iter().all(|d| d.modes.is_borrowed()));
    }

    #[test]
    fn test_catalog_uses_fallback_table() {
        let mut platform = MockPlatform::new();
        platform.expect_list_drivers().returning(|| None);
        platform
            .expect_enumerate_modes()
            .returning(|id| Err(ModeSelError::EnumerationUnsupported(id)));

        let catalog = DriverCatalog::build(&platform).unwrap();
        assert_eq!(
            catalog.len(),
            DriverCatalog::SYNTHETIC_COUNT + platform::fallback_drivers().len()
        );
    }

    #[test]
    fn test_teardown_releases_only_owned_lists() {
        let mut platform = MockPlatform::new();
        platform
            .expect_list_drivers()
            .returning(|| Some(vec![info("FBDV", "Framebuffer"), info("VGA", "VGA"), info("X11", "X11")]));
        platform.expect_enumerate_modes().returning(|id| {
            if id == DriverId::from_tag("VGA") {
                Err(ModeSelError::EnumerationUnsupported(id))
            } else {
                Ok(vec![RawMode {
                    width: 640,
                    height: 480,
                    bpp: 8,
                }])
            }
        });

        let catalog = DriverCatalog::build(&platform).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.teardown(), 2);
    }

    #[test]
    fn test_teardown_all_borrowed() {
        let mut platform = MockPlatform::new();
        platform.expect_list_drivers().returning(|| Some(Vec::new()));

        let catalog = DriverCatalog::build(&platform).unwrap();
        assert_eq!(catalog.teardown(), 0);
    }

    #[test]
    fn test_position_finds_driver() {
        let mut platform = MockPlatform::new();
        platform
            .expect_list_drivers()
            .returning(|| Some(vec![info("FBDV", "Framebuffer")]));
        platform.expect_enumerate_modes().returning(|_| Ok(Vec::new()));

        let catalog = DriverCatalog::build(&platform).unwrap();
        assert_eq!(catalog.position(DriverId::from_tag("FBDV")), Some(3));
        assert_eq!(catalog.position(DriverId::SAFE), None);
    }
}
