//! Graphics Mode Selector Library
//!
//! A cascading driver / resolution / colour depth selection dialog with:
//! - Live mode enumeration with a built-in default catalog as fallback
//! - Driver tables described in TOML or JSON, or read from the Linux framebuffer
//! - A headless backend for scripted runs and an optional Notcurses TUI
//!
//! # Architecture
//!
//! The selector is organized into modules:
//! - `catalog`: Driver and mode catalogs
//! - `platform`: Driver listing and mode enumeration sources
//! - `ui`: Dialog engine, widgets, list providers and backends
//! - `selector`: The two selection dialogs
//! - `config`: Labels and colours
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```rust,no_run
//! use gfx_modesel::*;
//!
//! # fn main() -> Result<()> {
//! let platform = TablePlatform::load(std::path::Path::new("drivers.toml"))?;
//! let selector = ModeSelector::new(Config::default(), Box::new(platform));
//!
//! let mut backend = HeadlessBackend::new(80, 25).with_events(parse_script("down,enter")?);
//! let mut mode = GfxMode::default();
//! if selector.select_extended(&mut backend, &mut mode)? {
//!     println!("{} {}x{} {} bpp", mode.driver, mode.width, mode.height, mode.depth);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod platform;
pub mod selector;
pub mod ui;

// Re-export commonly used types
pub use catalog::{DepthClass, DriverCatalog, DriverId, ModeList, ResolutionEntry};
pub use config::{Config, Labels, Rgb, Style};
pub use error::{ModeSelError, Result};
pub use platform::{DriverInfo, FbdevPlatform, Platform, RawMode, TablePlatform};
pub use selector::{seed_selection, GfxMode, ModeSelector};
pub use ui::{parse_script, Backend, HeadlessBackend, InputEvent, Key};

#[cfg(feature = "tui")]
pub use ui::NotcursesContext;
