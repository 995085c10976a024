//! Dialog runtime: backends, widgets, list providers and the modal loop
//!
//! The runtime is single-threaded and cooperative. A dialog run owns its
//! [`Session`] exclusively; opening a second dialog from inside a running
//! one is not supported.

/// Driver → mode → depth dependency tracking
pub mod cascade;
/// Geometry, input events and drawing backends
pub mod context;
/// Modal dialog engine
pub mod dialog;
/// List data sources
pub mod providers;
/// Per-dialog state
pub mod session;
/// Dialog widgets
pub mod widgets;

#[cfg(feature = "tui")]
pub use context::NotcursesContext;
pub use cascade::{CascadeController, Transition};
pub use context::{parse_script, Backend, DrawOp, HeadlessBackend, InputEvent, Key, Rect};
pub use dialog::{Dialog, DialogContext, Message, Status, Widget};
pub use providers::{CardSource, DepthSource, ListSource, ModeSource};
pub use session::{ListSlot, ListState, Selections, Session};
