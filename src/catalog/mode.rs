//! Mode catalog: per-driver resolution lists and their supported colour depths
//!
//! Live enumeration results arrive as flat (width, height, bpp) triples and are
//! grouped here into one entry per resolution. Drivers that cannot enumerate
//! share the built-in default list instead.

use super::DriverId;
use crate::error::{ModeSelError, Result};
use crate::platform::{Platform, RawMode};
use serde::Serialize;
use std::fmt;

/// One of the five canonical colour depth buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DepthClass {
    /// 8 bpp, palette
    Bpp8,
    /// 15 bpp, 5-5-5
    Bpp15,
    /// 16 bpp, 5-6-5
    Bpp16,
    /// 24 bpp, packed
    Bpp24,
    /// 32 bpp
    Bpp32,
}

impl DepthClass {
    /// All depth classes in list order
    pub const ALL: [DepthClass; 5] = [
        Self::Bpp8,
        Self::Bpp15,
        Self::Bpp16,
        Self::Bpp24,
        Self::Bpp32,
    ];

    /// Bits per pixel
    pub fn bits(self) -> u32 {
        match self {
            Self::Bpp8 => 8,
            Self::Bpp15 => 15,
            Self::Bpp16 => 16,
            Self::Bpp24 => 24,
            Self::Bpp32 => 32,
        }
    }

    /// Map a bits-per-pixel value onto its class, if it is one of the five
    pub fn from_bits(bpp: u32) -> Option<Self> {
        match bpp {
            8 => Some(Self::Bpp8),
            15 => Some(Self::Bpp15),
            16 => Some(Self::Bpp16),
            24 => Some(Self::Bpp24),
            32 => Some(Self::Bpp32),
            _ => None,
        }
    }

    /// Human readable list label
    pub fn label(self) -> &'static str {
        match self {
            Self::Bpp8 => "8 bpp (256 color)",
            Self::Bpp15 => "15 bpp (32K color)",
            Self::Bpp16 => "16 bpp (64K color)",
            Self::Bpp24 => "24 bpp (16M color)",
            Self::Bpp32 => "32 bpp (16M color)",
        }
    }

    fn mask(self) -> u8 {
        match self {
            Self::Bpp8 => 1 << 0,
            Self::Bpp15 => 1 << 1,
            Self::Bpp16 => 1 << 2,
            Self::Bpp24 => 1 << 3,
            Self::Bpp32 => 1 << 4,
        }
    }
}

impl fmt::Display for DepthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Set of depth classes supported by one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthSet(u8);

impl DepthSet {
    /// Every depth class
    pub const ALL: DepthSet = DepthSet(0b1_1111);

    /// No depth class
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Add a depth class
    pub fn insert(&mut self, depth: DepthClass) {
        self.0 |= depth.mask();
    }

    /// Whether `depth` is in the set
    pub fn contains(&self, depth: DepthClass) -> bool {
        self.0 & depth.mask() != 0
    }

    /// Number of supported depths
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Supported depths, always in 8/15/16/24/32 order
    pub fn iter(&self) -> impl Iterator<Item = DepthClass> + '_ {
        DepthClass::ALL.into_iter().filter(|d| self.contains(*d))
    }

    /// Depth at a dense ordinal over the supported depths only
    pub fn nth(&self, ordinal: usize) -> Option<DepthClass> {
        self.iter().nth(ordinal)
    }

    /// Inverse of [`DepthSet::nth`]
    pub fn ordinal_of(&self, depth: DepthClass) -> Option<usize> {
        self.iter().position(|d| d == depth)
    }
}

impl FromIterator<DepthClass> for DepthSet {
    fn from_iter<I: IntoIterator<Item = DepthClass>>(iter: I) -> Self {
        let mut set = DepthSet::empty();
        for depth in iter {
            set.insert(depth);
        }
        set
    }
}

impl Serialize for DepthSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(DepthClass::bits))
    }
}

/// A resolution and the depths it supports under its owning driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionEntry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Depths offered at this size
    pub depths: DepthSet,
}

impl ResolutionEntry {
    const fn all_bpp(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depths: DepthSet::ALL,
        }
    }

    /// List label, e.g. `640x480`
    pub fn label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Shared list used by synthetic drivers and drivers that cannot enumerate
pub static DEFAULT_MODES: [ResolutionEntry; 32] = [
    ResolutionEntry::all_bpp(320, 200),
    ResolutionEntry::all_bpp(320, 240),
    ResolutionEntry::all_bpp(640, 400),
    ResolutionEntry::all_bpp(640, 480),
    ResolutionEntry::all_bpp(800, 600),
    ResolutionEntry::all_bpp(1024, 768),
    ResolutionEntry::all_bpp(1280, 1024),
    ResolutionEntry::all_bpp(1600, 1200),
    ResolutionEntry::all_bpp(80, 80),
    ResolutionEntry::all_bpp(160, 120),
    ResolutionEntry::all_bpp(256, 200),
    ResolutionEntry::all_bpp(256, 224),
    ResolutionEntry::all_bpp(256, 240),
    ResolutionEntry::all_bpp(256, 256),
    ResolutionEntry::all_bpp(320, 100),
    ResolutionEntry::all_bpp(320, 350),
    ResolutionEntry::all_bpp(320, 400),
    ResolutionEntry::all_bpp(320, 480),
    ResolutionEntry::all_bpp(320, 600),
    ResolutionEntry::all_bpp(360, 200),
    ResolutionEntry::all_bpp(360, 240),
    ResolutionEntry::all_bpp(360, 270),
    ResolutionEntry::all_bpp(360, 360),
    ResolutionEntry::all_bpp(360, 400),
    ResolutionEntry::all_bpp(360, 480),
    ResolutionEntry::all_bpp(360, 600),
    ResolutionEntry::all_bpp(376, 282),
    ResolutionEntry::all_bpp(376, 308),
    ResolutionEntry::all_bpp(376, 564),
    ResolutionEntry::all_bpp(400, 150),
    ResolutionEntry::all_bpp(400, 300),
    ResolutionEntry::all_bpp(400, 600),
];

/// Resolution list of one driver
///
/// `Default` borrows [`DEFAULT_MODES`] and is never released; `Owned` holds
/// the grouped result of a live enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeList {
    /// Borrowed built-in catalog
    Default,
    /// Grouped live enumeration
    Owned(Vec<ResolutionEntry>),
}

impl ModeList {
    /// Resolutions in list order
    pub fn entries(&self) -> &[ResolutionEntry] {
        match self {
            Self::Default => &DEFAULT_MODES,
            Self::Owned(entries) => entries,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Entry at `index`, if any
    pub fn get(&self, index: usize) -> Option<&ResolutionEntry> {
        self.entries().get(index)
    }

    /// True when the list is the shared default catalog
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Index of the entry matching a resolution
    pub fn position(&self, width: u32, height: u32) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.width == width && e.height == height)
    }
}

/// Build the resolution list for one driver
///
/// Synthetic drivers bind to the default list without asking the platform.
/// Unsupported or failing enumeration also falls back to the default list;
/// only an allocation failure is returned as an error.
pub fn build_mode_list(driver: DriverId, platform: &dyn Platform) -> Result<ModeList> {
    if driver.is_synthetic() {
        return Ok(ModeList::Default);
    }

    // The enumeration buffer is dropped at the end of this scope on every path
    let raw = match platform.enumerate_modes(driver) {
        Ok(raw) => raw,
        Err(e) if e.is_recoverable() => {
            log::warn!("Using default mode list for driver {}: {}", driver, e);
            return Ok(ModeList::Default);
        }
        Err(e) => return Err(e),
    };

    let entries = group_modes(&raw)?;
    log::debug!(
        "Driver {}: {} raw modes grouped into {} resolutions",
        driver,
        raw.len(),
        entries.len()
    );
    Ok(ModeList::Owned(entries))
}

/// Group raw (width, height, bpp) triples into one entry per resolution,
/// keeping discovery order
pub fn group_modes(raw: &[RawMode]) -> Result<Vec<ResolutionEntry>> {
    let mut entries: Vec<ResolutionEntry> = Vec::new();

    for mode in raw {
        if mode.width == 0 || mode.height == 0 {
            log::debug!("Skipping zero-sized mode {}x{}", mode.width, mode.height);
            continue;
        }

        let depth = DepthClass::from_bits(mode.bpp);
        if depth.is_none() {
            log::debug!(
                "Ignoring unsupported depth {} for {}x{}",
                mode.bpp,
                mode.width,
                mode.height
            );
        }

        match entries
            .iter_mut()
            .find(|e| e.width == mode.width && e.height == mode.height)
        {
            Some(entry) => {
                if let Some(depth) = depth {
                    entry.depths.insert(depth);
                }
            }
            None => {
                entries.try_reserve(1).map_err(|e| {
                    ModeSelError::AllocationFailure(format!(
                        "resolution list ({} entries): {}",
                        entries.len(),
                        e
                    ))
                })?;
                entries.push(ResolutionEntry {
                    width: mode.width,
                    height: mode.height,
                    depths: depth.into_iter().collect(),
                });
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use pretty_assertions::assert_eq;

    fn raw(width: u32, height: u32, bpp: u32) -> RawMode {
        RawMode { width, height, bpp }
    }

    #[test]
    fn test_default_catalog_has_all_depths() {
        assert_eq!(DEFAULT_MODES.len(), 32);
        assert!(DEFAULT_MODES.iter().all(|e| e.depths == DepthSet::ALL));
        assert_eq!(ModeList::Default.position(640, 480), Some(3));
    }

    #[test]
    fn test_group_modes_deduplicates() {
        let modes = vec![
            raw(640, 480, 8),
            raw(800, 600, 16),
            raw(640, 480, 32),
            raw(640, 480, 8),
            raw(800, 600, 24),
        ];
        let entries = group_modes(&modes).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].width, entries[0].height), (640, 480));
        assert_eq!(
            entries[0].depths.iter().collect::<Vec<_>>(),
            vec![DepthClass::Bpp8, DepthClass::Bpp32]
        );
        assert_eq!(
            entries[1].depths.iter().collect::<Vec<_>>(),
            vec![DepthClass::Bpp16, DepthClass::Bpp24]
        );
    }

    #[test]
    fn test_group_modes_keeps_unknown_depth_resolution() {
        let entries = group_modes(&[raw(320, 200, 4)]).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].depths.is_empty());
    }

    #[test]
    fn test_group_modes_skips_zero_size() {
        let entries = group_modes(&[raw(0, 0, 8), raw(320, 200, 8)]).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_depth_ordinals_are_dense() {
        let set: DepthSet = [DepthClass::Bpp16, DepthClass::Bpp32].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.nth(0).map(DepthClass::label), Some("16 bpp (64K color)"));
        assert_eq!(set.nth(1).map(DepthClass::label), Some("32 bpp (16M color)"));
        assert_eq!(set.nth(1).map(DepthClass::bits), Some(32));
        assert_eq!(set.nth(2), None);
        assert_eq!(set.ordinal_of(DepthClass::Bpp32), Some(1));
        assert_eq!(set.ordinal_of(DepthClass::Bpp8), None);
    }

    #[test]
    fn test_synthetic_driver_never_enumerates() {
        let mut platform = MockPlatform::new();
        platform.expect_enumerate_modes().never();

        for id in [
            DriverId::AUTODETECT,
            DriverId::AUTODETECT_FULLSCREEN,
            DriverId::AUTODETECT_WINDOWED,
            DriverId::SAFE,
        ] {
            let list = build_mode_list(id, &platform).unwrap();
            assert!(list.is_borrowed());
            assert_eq!(list.len(), DEFAULT_MODES.len());
        }
    }

    #[test]
    fn test_unsupported_enumeration_falls_back() {
        let mut platform = MockPlatform::new();
        platform
            .expect_enumerate_modes()
            .returning(|id| Err(ModeSelError::EnumerationUnsupported(id)));

        let list = build_mode_list(DriverId::from_tag("VGA "), &platform).unwrap();
        assert!(list.is_borrowed());
    }

    #[test]
    fn test_failed_enumeration_falls_back() {
        let mut platform = MockPlatform::new();
        platform
            .expect_enumerate_modes()
            .returning(|id| Err(ModeSelError::enumeration(id, "device busy")));

        let list = build_mode_list(DriverId::from_tag("FBDV"), &platform).unwrap();
        assert!(list.is_borrowed());
        assert!(!list.is_empty());
    }

    #[test]
    fn test_live_enumeration_is_owned() {
        let mut platform = MockPlatform::new();
        platform
            .expect_enumerate_modes()
            .times(1)
            .returning(|_| Ok(vec![raw(1024, 768, 32), raw(1024, 768, 16)]));

        let list = build_mode_list(DriverId::from_tag("X11W"), &platform).unwrap();
        assert!(!list.is_borrowed());
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).map(ResolutionEntry::label), Some("1024x768".to_string()));
    }

    #[test]
    fn test_empty_enumeration_is_empty_owned_list() {
        let mut platform = MockPlatform::new();
        platform.expect_enumerate_modes().returning(|_| Ok(Vec::new()));

        let list = build_mode_list(DriverId::from_tag("NULL"), &platform).unwrap();
        assert!(!list.is_borrowed());
        assert!(list.is_empty());
    }
}
