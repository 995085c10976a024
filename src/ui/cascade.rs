//! Keeps the driver -> mode -> depth lists consistent
//!
//! The controller is an invisible widget polled on every idle tick. It
//! remembers the driver and mode selections it saw last; when the live value
//! differs, the dependent lists are reset to their first entry and redrawn.
//! A driver change resets both the mode and the depth list, a mode change
//! only the depth list.

use super::dialog::{DialogContext, Message, Status, Widget};
use super::session::Selections;
use crate::error::Result;

/// Outcome of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Selections match the cache
    Unchanged,
    /// Driver moved; mode and depth reset
    DriverChanged,
    /// Mode moved; depth reset
    ModeChanged,
}

/// Invisible widget resetting dependent lists on change
#[derive(Debug)]
pub struct CascadeController {
    mode_widget: usize,
    depth_widget: Option<usize>,
    seen_driver: Option<usize>,
    seen_mode: Option<usize>,
}

impl CascadeController {
    /// `mode_widget` and `depth_widget` are the dialog indices of the lists
    /// to redraw after a reset
    pub fn new(mode_widget: usize, depth_widget: Option<usize>) -> Self {
        Self {
            mode_widget,
            depth_widget,
            seen_driver: Some(0),
            seen_mode: Some(0),
        }
    }

    /// Take the current selections as already seen
    pub fn adopt(&mut self, selections: &Selections) {
        self.seen_driver = selections.driver.selected;
        self.seen_mode = selections.mode.selected;
    }

    /// Compare the live selections against the last seen ones and reset
    /// whatever depends on a changed list
    pub fn poll(&mut self, selections: &mut Selections) -> Transition {
        if selections.driver.selected != self.seen_driver {
            self.seen_driver = selections.driver.selected;
            selections.mode.reset();
            self.seen_mode = selections.mode.selected;
            selections.depth.reset();
            Transition::DriverChanged
        } else if selections.mode.selected != self.seen_mode {
            self.seen_mode = selections.mode.selected;
            selections.depth.reset();
            Transition::ModeChanged
        } else {
            Transition::Unchanged
        }
    }
}

impl Widget for CascadeController {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        match msg {
            Message::Start => self.adopt(&ctx.session.selections),
            Message::Idle => {
                let transition = self.poll(&mut ctx.session.selections);
                if transition != Transition::Unchanged {
                    log::debug!(
                        "{:?}: driver {:?}, mode {:?}",
                        transition,
                        self.seen_driver,
                        self.seen_mode
                    );
                }
                if transition == Transition::DriverChanged {
                    ctx.request_redraw(self.mode_widget);
                }
                if transition != Transition::Unchanged {
                    if let Some(depth) = self.depth_widget {
                        ctx.request_redraw(depth);
                    }
                }
            }
            _ => {}
        }
        Ok(Status::Ok)
    }
}
