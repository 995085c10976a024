//! Driver and mode catalogs
//!
//! Both catalogs are built eagerly when a selection dialog opens, read while
//! it runs, and released when it closes.

/// Driver catalog
pub mod driver;
/// Resolution catalog and depth classes
pub mod mode;

pub use driver::{DriverCatalog, DriverEntry, DriverId};
pub use mode::{DepthClass, DepthSet, ModeList, ResolutionEntry, DEFAULT_MODES};
