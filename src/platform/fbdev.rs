//! Linux framebuffer platform using /sys/class/graphics
//!
//! Each `fbN` device is one driver (id tag `FBN`). Its `modes` file lists
//! lines like `U:1024x768p-60`; every mode is reported at the device's
//! current `bits_per_pixel`.

use super::{DriverInfo, Platform, RawMode};
use crate::catalog::DriverId;
use crate::error::{ModeSelError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

fn mode_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]:(\d+)x(\d+)").expect("valid mode regex"))
}

/// Framebuffer device discovery
pub struct FbdevPlatform {
    root: PathBuf,
}

impl FbdevPlatform {
    /// Use the live sysfs tree
    pub fn new() -> Self {
        Self::with_root(SYSFS_GRAPHICS)
    }

    /// Use another directory laid out like /sys/class/graphics
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Framebuffer index encoded in a device name (`fb0` -> 0)
    fn device_index(name: &str) -> Option<u32> {
        name.strip_prefix("fb")?.parse().ok()
    }

    fn driver_id(index: u32) -> DriverId {
        DriverId::from_tag(&format!("FB{}", index))
    }

    /// Reverse of [`FbdevPlatform::driver_id`]
    fn device_dir(&self, driver: DriverId) -> Option<PathBuf> {
        let tag = driver.tag()?;
        let index: u32 = tag.strip_prefix("FB")?.parse().ok()?;
        Some(self.root.join(format!("fb{}", index)))
    }

    fn read_trimmed(path: &Path) -> Option<String> {
        fs::read_to_string(path).ok().map(|s| s.trim().to_string())
    }

    /// Parse the contents of a `modes` file
    pub fn parse_modes(contents: &str, bpp: u32) -> Vec<RawMode> {
        contents
            .lines()
            .filter_map(|line| {
                let caps = mode_line_regex().captures(line.trim())?;
                Some(RawMode {
                    width: caps[1].parse().ok()?,
                    height: caps[2].parse().ok()?,
                    bpp,
                })
            })
            .collect()
    }
}

impl Default for FbdevPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for FbdevPlatform {
    fn list_drivers(&self) -> Option<Vec<DriverInfo>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("{} not readable: {}", self.root.display(), e);
                return None;
            }
        };

        let mut devices: Vec<(u32, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let index = Self::device_index(&name.to_string_lossy())?;
                Some((index, entry.path()))
            })
            .collect();
        devices.sort_by_key(|(index, _)| *index);

        Some(
            devices
                .into_iter()
                .map(|(index, path)| {
                    let name = Self::read_trimmed(&path.join("name"))
                        .filter(|n| !n.is_empty())
                        .unwrap_or_else(|| format!("Framebuffer {}", index));
                    DriverInfo::new(Self::driver_id(index), name)
                })
                .collect(),
        )
    }

    fn enumerate_modes(&self, driver: DriverId) -> Result<Vec<RawMode>> {
        let dir = self
            .device_dir(driver)
            .ok_or(ModeSelError::EnumerationUnsupported(driver))?;

        let modes_path = dir.join("modes");
        if !modes_path.exists() {
            return Err(ModeSelError::EnumerationUnsupported(driver));
        }

        let contents = fs::read_to_string(&modes_path).map_err(|e| {
            ModeSelError::enumeration(driver, format!("{}: {}", modes_path.display(), e))
        })?;

        let bpp_path = dir.join("bits_per_pixel");
        let bpp = Self::read_trimmed(&bpp_path)
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| {
                ModeSelError::enumeration(
                    driver,
                    format!("{}: missing or invalid", bpp_path.display()),
                )
            })?;

        Ok(Self::parse_modes(&contents, bpp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fake_device(root: &Path, name: &str, label: &str, modes: Option<&str>, bpp: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("name"), label).unwrap();
        fs::write(dir.join("bits_per_pixel"), bpp).unwrap();
        if let Some(modes) = modes {
            fs::write(dir.join("modes"), modes).unwrap();
        }
    }

    #[test]
    fn test_parse_modes() {
        let modes = FbdevPlatform::parse_modes("U:1024x768p-60\nS:640x480p-75\ngarbage\n", 32);
        assert_eq!(
            modes,
            vec![
                RawMode { width: 1024, height: 768, bpp: 32 },
                RawMode { width: 640, height: 480, bpp: 32 },
            ]
        );
    }

    #[test]
    fn test_device_index() {
        assert_eq!(FbdevPlatform::device_index("fb0"), Some(0));
        assert_eq!(FbdevPlatform::device_index("fb12"), Some(12));
        assert_eq!(FbdevPlatform::device_index("fbcon"), None);
    }

    #[test]
    fn test_list_and_enumerate() {
        let root = tempfile::tempdir().unwrap();
        fake_device(root.path(), "fb1", "simplefb", None, "16\n");
        fake_device(root.path(), "fb0", "EFI VGA\n", Some("U:800x600p-0\n"), "32\n");
        fs::create_dir_all(root.path().join("fbcon")).unwrap();

        let platform = FbdevPlatform::with_root(root.path());
        let drivers = platform.list_drivers().unwrap();
        assert_eq!(
            drivers,
            vec![
                DriverInfo::new(DriverId::from_tag("FB0"), "EFI VGA"),
                DriverInfo::new(DriverId::from_tag("FB1"), "simplefb"),
            ]
        );

        let modes = platform.enumerate_modes(DriverId::from_tag("FB0")).unwrap();
        assert_eq!(modes, vec![RawMode { width: 800, height: 600, bpp: 32 }]);

        assert!(matches!(
            platform.enumerate_modes(DriverId::from_tag("FB1")),
            Err(ModeSelError::EnumerationUnsupported(_))
        ));
        assert!(matches!(
            platform.enumerate_modes(DriverId::from_tag("VGA")),
            Err(ModeSelError::EnumerationUnsupported(_))
        ));
    }

    #[test]
    fn test_bad_bpp_fails_enumeration() {
        let root = tempfile::tempdir().unwrap();
        fake_device(root.path(), "fb0", "EFI VGA", Some("U:800x600p-0\n"), "lots");

        let platform = FbdevPlatform::with_root(root.path());
        assert!(matches!(
            platform.enumerate_modes(DriverId::from_tag("FB0")),
            Err(ModeSelError::EnumerationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_root_uses_fallback() {
        let platform = FbdevPlatform::with_root("/nonexistent/graphics");
        assert_eq!(platform.list_drivers(), None);
    }
}
