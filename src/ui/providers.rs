//! List data providers for the driver, mode and depth lists
//!
//! Each provider answers "how many entries" and "what is the label at i"
//! from the session's catalog and current selections. The mode and depth
//! providers follow whatever their ancestors currently select.

use super::session::Session;

/// Source of list labels
pub trait ListSource {
    /// Number of entries
    fn len(&self, session: &Session) -> usize;

    /// Label of entry `index`, `None` when out of range
    fn label(&self, index: usize, session: &Session) -> Option<String>;
}

/// Driver names
#[derive(Debug, Clone, Copy, Default)]
pub struct CardSource;

impl ListSource for CardSource {
    fn len(&self, session: &Session) -> usize {
        session.catalog.len()
    }

    fn label(&self, index: usize, session: &Session) -> Option<String> {
        session.catalog.get(index).map(|d| d.name.clone())
    }
}

/// `WIDTHxHEIGHT` entries of the selected driver
#[derive(Debug, Clone, Copy, Default)]
pub struct ModeSource;

impl ListSource for ModeSource {
    fn len(&self, session: &Session) -> usize {
        session.current_driver().map(|d| d.modes.len()).unwrap_or(0)
    }

    fn label(&self, index: usize, session: &Session) -> Option<String> {
        session
            .current_driver()?
            .modes
            .get(index)
            .map(|m| m.label())
    }
}

/// Depths supported by the selected resolution.
///
/// Indices are dense over the supported depths only, in 8/15/16/24/32 order:
/// index 1 is the second supported depth, not 15 bpp.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthSource;

impl ListSource for DepthSource {
    fn len(&self, session: &Session) -> usize {
        session.current_mode().map(|m| m.depths.len()).unwrap_or(0)
    }

    fn label(&self, index: usize, session: &Session) -> Option<String> {
        session
            .current_mode()?
            .depths
            .nth(index)
            .map(|d| d.label().to_string())
    }
}
