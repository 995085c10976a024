//! Per-dialog session state shared by providers, widgets and the cascade

use crate::catalog::{DriverCatalog, DriverEntry, ResolutionEntry};

/// Selection state of one list widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListState {
    /// Selected index; `None` while the backing list is empty
    pub selected: Option<usize>,
    /// Index of the first visible row
    pub first: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::at(0)
    }
}

impl ListState {
    /// State with `index` selected and scrolled to the top
    pub fn at(index: usize) -> Self {
        Self {
            selected: Some(index),
            first: 0,
        }
    }

    /// Selected index, or 0 while nothing is selected
    pub fn index(&self) -> usize {
        self.selected.unwrap_or(0)
    }

    /// Back to the first entry
    pub fn reset(&mut self) {
        *self = Self::at(0);
    }

    /// Keep the selection inside a list of `len` entries. An out of range
    /// selection snaps back to 0; an empty list has no selection.
    /// Returns true when the state changed.
    pub fn clamp(&mut self, len: usize) -> bool {
        let before = *self;
        match self.selected {
            _ if len == 0 => {
                self.selected = None;
                self.first = 0;
            }
            Some(index) if index < len => {
                if self.first >= len {
                    self.first = 0;
                }
            }
            _ => self.reset(),
        }
        *self != before
    }

    /// Move the selection to `index` within a list of `len` entries
    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if len == 0 {
            return self.clamp(0);
        }
        let index = index.min(len - 1);
        let changed = self.selected != Some(index);
        self.selected = Some(index);
        changed
    }

    /// Adjust the first visible row so the selection is inside `rows` rows
    pub fn scroll_into_view(&mut self, rows: usize) {
        let Some(index) = self.selected else {
            self.first = 0;
            return;
        };
        let rows = rows.max(1);
        if index < self.first {
            self.first = index;
        } else if index >= self.first + rows {
            self.first = index + 1 - rows;
        }
    }
}

/// Which list a widget shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSlot {
    /// Driver list
    Driver,
    /// Resolution list
    Mode,
    /// Colour depth list
    Depth,
}

/// Selection state of the three cascading lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selections {
    /// Driver list
    pub driver: ListState,
    /// Resolution list
    pub mode: ListState,
    /// Colour depth list
    pub depth: ListState,
}

impl Selections {
    /// State of the list bound to `slot`
    pub fn get(&self, slot: ListSlot) -> &ListState {
        match slot {
            ListSlot::Driver => &self.driver,
            ListSlot::Mode => &self.mode,
            ListSlot::Depth => &self.depth,
        }
    }

    /// Mutable state of the list bound to `slot`
    pub fn get_mut(&mut self, slot: ListSlot) -> &mut ListState {
        match slot {
            ListSlot::Driver => &mut self.driver,
            ListSlot::Mode => &mut self.mode,
            ListSlot::Depth => &mut self.depth,
        }
    }
}

/// Everything one open selection dialog works on: the catalog built for it
/// and the live list selections.
///
/// A session is created when a dialog opens and consumed when it closes, so
/// each dialog has its own and nothing is process-global.
#[derive(Debug)]
pub struct Session {
    /// Drivers and their resolutions
    pub catalog: DriverCatalog,
    /// Current list selections
    pub selections: Selections,
}

impl Session {
    /// Session over `catalog` with every list at row 0
    pub fn new(catalog: DriverCatalog) -> Self {
        Self {
            catalog,
            selections: Selections::default(),
        }
    }

    /// Driver under the driver list selection
    pub fn current_driver(&self) -> Option<&DriverEntry> {
        self.catalog.get(self.selections.driver.selected?)
    }

    /// Resolution under the mode list selection
    pub fn current_mode(&self) -> Option<&ResolutionEntry> {
        self.current_driver()?
            .modes
            .get(self.selections.mode.selected?)
    }

    /// Clamp all three selections against the lists they index, top-down
    pub fn clamp_selections(&mut self) {
        let drivers = self.catalog.len();
        self.selections.driver.clamp(drivers);
        let modes = self.current_driver().map(|d| d.modes.len()).unwrap_or(0);
        self.selections.mode.clamp(modes);
        let depths = self.current_mode().map(|m| m.depths.len()).unwrap_or(0);
        self.selections.depth.clamp(depths);
    }

    /// Release the session and hand back its catalog for teardown
    pub fn into_catalog(self) -> DriverCatalog {
        self.catalog
    }
}
