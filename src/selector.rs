//! Graphics mode selection dialogs
//!
//! [`ModeSelector`] composes the widgets, catalogs and cascade controller
//! into the two public dialogs:
//!
//! - [`ModeSelector::select`]: driver and resolution
//! - [`ModeSelector::select_extended`]: driver, resolution and colour depth,
//!   pre-selected from the caller's current values
//!
//! Both write the highlighted values back into the caller's [`GfxMode`] even
//! when the dialog is cancelled; the return value tells OK from Cancel.

use crate::catalog::{DepthClass, DriverCatalog, DriverId};
use crate::config::Config;
use crate::error::Result;
use crate::platform::Platform;
use crate::ui::cascade::CascadeController;
use crate::ui::context::{Backend, Key, Rect};
use crate::ui::dialog::Dialog;
use crate::ui::providers::{CardSource, DepthSource, ModeSource};
use crate::ui::session::{ListSlot, ListState, Session};
use crate::ui::widgets::{Button, CenteredText, ListBox, ShadowBox, Yield};
use serde::{Deserialize, Serialize};

/// Dialog index of the OK button
pub const OK_BUTTON: usize = 2;
/// Dialog index of the Cancel button
pub const CANCEL_BUTTON: usize = 3;
/// Dialog index of the driver list, which has focus when a dialog opens
pub const DRIVER_LIST: usize = 4;
/// Dialog index of the mode list
pub const MODE_LIST: usize = 5;
/// Dialog index of the depth list in the extended dialog
pub const DEPTH_LIST: usize = 6;

/// Mode list entry highlighted when nothing else applies (640x480 in the
/// default list)
pub const DEFAULT_MODE_INDEX: usize = 3;

/// A driver, resolution and colour depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GfxMode {
    /// Driver id
    pub driver: DriverId,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bits per pixel; only read and written by the extended dialog
    pub depth: u32,
}

impl Default for GfxMode {
    fn default() -> Self {
        Self {
            driver: DriverId::AUTODETECT,
            width: 640,
            height: 480,
            depth: 8,
        }
    }
}

/// Which dialog to compose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Simple,
    Extended,
}

/// Opens mode selection dialogs against a platform
///
/// Each call builds a fresh catalog, runs the dialog on the given backend
/// and tears the catalog down again. Calls must not be nested.
pub struct ModeSelector {
    config: Config,
    platform: Box<dyn Platform>,
}

impl ModeSelector {
    /// Create a selector drawing modes from `platform`
    pub fn new(config: Config, platform: Box<dyn Platform>) -> Self {
        Self { config, platform }
    }

    /// Build the catalog this selector's dialogs would show
    pub fn catalog(&self) -> Result<DriverCatalog> {
        DriverCatalog::build(self.platform.as_ref())
    }

    /// Pick a driver and resolution. Returns true when the dialog was closed
    /// with OK.
    pub fn select(&self, backend: &mut dyn Backend, mode: &mut GfxMode) -> Result<bool> {
        self.run(Variant::Simple, backend, mode)
    }

    /// Pick a driver, resolution and colour depth, starting from `mode`.
    /// Returns true when the dialog was closed with OK.
    pub fn select_extended(&self, backend: &mut dyn Backend, mode: &mut GfxMode) -> Result<bool> {
        self.run(Variant::Extended, backend, mode)
    }

    fn run(&self, variant: Variant, backend: &mut dyn Backend, mode: &mut GfxMode) -> Result<bool> {
        backend.flush_input()?;

        let mut session = Session::new(self.catalog()?);
        match variant {
            Variant::Simple => {
                session.selections.mode = ListState::at(DEFAULT_MODE_INDEX);
                session.clamp_selections();
            }
            Variant::Extended => seed_selection(&mut session, mode),
        }

        let mut dialog = self.compose(variant);
        dialog.set_style(self.config.style);
        dialog.centre(backend.size());

        log::info!("Opening {:?} mode selection dialog", variant);
        let result = dialog.run(backend, &mut session, DRIVER_LIST);

        // Cancel writes back too
        if result.is_ok() {
            write_back(&session, variant, mode);
        }
        session.into_catalog().teardown();

        let accepted = result? != CANCEL_BUTTON;
        log::info!(
            "Mode selection {}: {} {}x{} {} bpp",
            if accepted { "accepted" } else { "cancelled" },
            mode.driver,
            mode.width,
            mode.height,
            mode.depth
        );
        Ok(accepted)
    }

    fn compose(&self, variant: Variant) -> Dialog {
        let labels = &self.config.labels;
        let mut dialog = Dialog::new();

        dialog.push(Box::new(ShadowBox::new(Rect::new(0, 0, 60, 20))));
        dialog.push(Box::new(CenteredText::new(labels.title.clone(), 30, 1)));
        dialog.push(Box::new(Button::new(
            labels.ok.clone(),
            Rect::new(40, 13, 16, 3),
            None,
        )));
        dialog.push(Box::new(Button::new(
            labels.cancel.clone(),
            Rect::new(40, 16, 16, 3),
            Some(Key::Escape),
        )));

        let driver_height = match variant {
            Variant::Simple => 16,
            Variant::Extended => 9,
        };
        dialog.push(Box::new(ListBox::new(
            Rect::new(2, 3, 34, driver_height),
            ListSlot::Driver,
            Box::new(CardSource),
        )));
        dialog.push(Box::new(ListBox::new(
            Rect::new(40, 3, 16, 9),
            ListSlot::Mode,
            Box::new(ModeSource),
        )));

        match variant {
            Variant::Simple => {
                dialog.push(Box::new(CascadeController::new(MODE_LIST, None)));
            }
            Variant::Extended => {
                dialog.push(Box::new(ListBox::new(
                    Rect::new(2, 13, 34, 6),
                    ListSlot::Depth,
                    Box::new(DepthSource),
                )));
                dialog.push(Box::new(CascadeController::new(MODE_LIST, Some(DEPTH_LIST))));
            }
        }

        dialog.push(Box::new(Yield));
        dialog
    }
}

/// Pre-select the list entries matching `mode`.
///
/// An unknown driver selects the first entry. An unknown resolution selects
/// [`DEFAULT_MODE_INDEX`], clamped to the driver's list. A depth the selected
/// resolution does not support leaves the first depth selected.
pub fn seed_selection(session: &mut Session, mode: &GfxMode) {
    let driver = session.catalog.position(mode.driver).unwrap_or(0);
    session.selections.driver = ListState::at(driver);

    let resolution = session
        .current_driver()
        .and_then(|d| d.modes.position(mode.width, mode.height))
        .unwrap_or(DEFAULT_MODE_INDEX);
    session.selections.mode = ListState::at(resolution);
    session.selections.depth = ListState::at(0);
    session.clamp_selections();

    let ordinal = DepthClass::from_bits(mode.depth).and_then(|class| {
        session
            .current_mode()
            .and_then(|m| m.depths.ordinal_of(class))
    });
    if let Some(ordinal) = ordinal {
        session.selections.depth = ListState::at(ordinal);
    }

    log::debug!(
        "Seeded selection for {} {}x{} {} bpp: {:?}",
        mode.driver,
        mode.width,
        mode.height,
        mode.depth,
        session.selections
    );
}

/// Copy the highlighted entries into `mode`. Lists without a selection leave
/// the corresponding fields untouched.
fn write_back(session: &Session, variant: Variant, mode: &mut GfxMode) {
    if let Some(driver) = session.current_driver() {
        mode.driver = driver.id;
    }
    let Some(resolution) = session.current_mode() else {
        return;
    };
    mode.width = resolution.width;
    mode.height = resolution.height;

    if variant == Variant::Extended {
        let depth = session
            .selections
            .depth
            .selected
            .and_then(|ordinal| resolution.depths.nth(ordinal));
        if let Some(depth) = depth {
            mode.depth = depth.bits();
        }
    }
}
