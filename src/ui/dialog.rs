//! Dialog engine: an ordered set of widgets driven by a modal loop
//!
//! Every tick the engine sends [`Message::Idle`] to every widget in order,
//! redraws whatever was invalidated, then blocks for one input event and
//! routes it to the focused (or hit, or shortcut) widget. The loop ends as
//! soon as a widget answers [`Status::Close`].

use super::context::{Backend, InputEvent, Key, Rect};
use super::session::Session;
use crate::config::Style;
use crate::error::{ModeSelError, Result};

/// Messages understood by widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Sent once before the first draw
    Start,
    /// Sent once after the loop exits
    End,
    /// Paint the widget
    Draw,
    /// Sent to every widget once per tick
    Idle,
    /// Key routed to the focused widget
    Key(Key),
    /// Pointer press inside the widget
    Click {
        /// Screen column
        x: u32,
        /// Screen row
        y: u32,
    },
    /// The widget's shortcut key was pressed
    Shortcut,
}

/// Widget answer to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not handled
    Ok,
    /// Handled, nothing to redraw
    Used,
    /// Handled, redraw this widget
    Redraw,
    /// Close the dialog with this widget as the exit reason
    Close,
}

/// What a widget sees while handling a message
pub struct DialogContext<'a> {
    /// Catalog and selections shared by the widgets
    pub session: &'a mut Session,
    /// Drawing and input backend
    pub backend: &'a mut dyn Backend,
    /// Colours the widgets draw with
    pub style: Style,
    current: usize,
    focus: usize,
    redraw: Vec<usize>,
}

impl<'a> DialogContext<'a> {
    /// Context with nothing focused and nothing to redraw
    pub fn new(session: &'a mut Session, backend: &'a mut dyn Backend, style: Style) -> Self {
        Self {
            session,
            backend,
            style,
            current: 0,
            focus: 0,
            redraw: Vec::new(),
        }
    }

    /// True when the widget handling the current message has focus
    pub fn has_focus(&self) -> bool {
        self.current == self.focus
    }

    /// Move focus, redrawing the old and new focus widgets
    pub fn set_focus(&mut self, index: usize) {
        if index != self.focus {
            self.request_redraw(self.focus);
            self.request_redraw(index);
            self.focus = index;
        }
    }

    /// Queue a redraw of a widget for the end of the current phase
    pub fn request_redraw(&mut self, index: usize) {
        if !self.redraw.contains(&index) {
            self.redraw.push(index);
        }
    }

    fn take_redraws(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.redraw)
    }
}

/// A dialog object
pub trait Widget {
    /// Handle one message. Unhandled messages return [`Status::Ok`].
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status>;

    /// Screen area; empty for invisible widgets
    fn frame(&self) -> Rect {
        Rect::default()
    }

    /// Mutable screen area, used for layout
    fn frame_mut(&mut self) -> Option<&mut Rect> {
        None
    }

    /// Whether the widget takes focus and pointer input
    fn wants_focus(&self) -> bool {
        false
    }

    /// Key that activates the widget from anywhere in the dialog
    fn shortcut(&self) -> Option<Key> {
        None
    }
}

/// Ordered widget sequence plus the modal loop that runs it
#[derive(Default)]
pub struct Dialog {
    widgets: Vec<Box<dyn Widget>>,
    style: Style,
}

impl Dialog {
    /// Empty dialog
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a widget, returning its index
    pub fn push(&mut self, widget: Box<dyn Widget>) -> usize {
        self.widgets.push(widget);
        self.widgets.len() - 1
    }

    /// Number of widgets
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widget at `index` in push order
    pub fn widget(&self, index: usize) -> Option<&dyn Widget> {
        self.widgets.get(index).map(|w| w.as_ref())
    }

    /// Colours for every widget
    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    /// Area covered by all visible widgets
    pub fn bounds(&self) -> Rect {
        let frames: Vec<Rect> = self
            .widgets
            .iter()
            .map(|w| w.frame())
            .filter(|f| !f.is_empty())
            .collect();
        let (Some(x), Some(y)) = (
            frames.iter().map(|f| f.x).min(),
            frames.iter().map(|f| f.y).min(),
        ) else {
            return Rect::default();
        };
        let right = frames.iter().map(|f| f.x + f.width).max().unwrap_or(x);
        let bottom = frames.iter().map(|f| f.y + f.height).max().unwrap_or(y);
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Move every widget so the dialog sits in the middle of the screen.
    /// Widgets are laid out from the origin; a dialog larger than the screen
    /// stays at the top-left corner.
    pub fn centre(&mut self, screen: (u32, u32)) {
        let bounds = self.bounds();
        let dx = screen.0.saturating_sub(bounds.width) / 2;
        let dy = screen.1.saturating_sub(bounds.height) / 2;
        for widget in &mut self.widgets {
            if let Some(frame) = widget.frame_mut() {
                frame.offset(dx, dy);
            }
        }
    }

    /// Run the modal loop until a widget closes the dialog, returning the
    /// index of that widget
    pub fn run(
        &mut self,
        backend: &mut dyn Backend,
        session: &mut Session,
        focus: usize,
    ) -> Result<usize> {
        if self.widgets.is_empty() {
            return Err(ModeSelError::ui("Cannot run an empty dialog"));
        }

        let mut ctx = DialogContext::new(session, backend, self.style);
        ctx.focus = focus.min(self.widgets.len() - 1);

        self.broadcast(Message::Start, &mut ctx)?;
        self.broadcast(Message::Draw, &mut ctx)?;
        ctx.take_redraws();

        let exit = loop {
            if let Some(exit) = self.idle(&mut ctx)? {
                break exit;
            }
            self.flush_redraws(&mut ctx)?;
            ctx.backend.present()?;

            let event = ctx.backend.wait_event()?;
            if let Some(exit) = self.dispatch(event, &mut ctx)? {
                break exit;
            }
            self.flush_redraws(&mut ctx)?;
        };

        log::debug!("Dialog closed by widget {}", exit);
        self.broadcast(Message::End, &mut ctx)?;
        ctx.backend.present()?;
        Ok(exit)
    }

    fn send(&mut self, index: usize, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        ctx.current = index;
        let status = self.widgets[index].respond(msg, ctx)?;
        if status == Status::Redraw {
            ctx.request_redraw(index);
        }
        Ok(status)
    }

    fn broadcast(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<()> {
        for index in 0..self.widgets.len() {
            self.send(index, msg, ctx)?;
        }
        Ok(())
    }

    fn idle(&mut self, ctx: &mut DialogContext<'_>) -> Result<Option<usize>> {
        for index in 0..self.widgets.len() {
            if self.send(index, Message::Idle, ctx)? == Status::Close {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn flush_redraws(&mut self, ctx: &mut DialogContext<'_>) -> Result<()> {
        // A draw may queue further redraws; drain until quiet
        loop {
            let pending = ctx.take_redraws();
            if pending.is_empty() {
                return Ok(());
            }
            for index in pending {
                if index < self.widgets.len() {
                    ctx.current = index;
                    self.widgets[index].respond(Message::Draw, ctx)?;
                }
            }
        }
    }

    fn dispatch(&mut self, event: InputEvent, ctx: &mut DialogContext<'_>) -> Result<Option<usize>> {
        match event {
            InputEvent::Tick => Ok(None),
            InputEvent::Key(key) => self.dispatch_key(key, ctx),
            InputEvent::Click { x, y } => self.dispatch_click(x, y, ctx),
            InputEvent::Close => match self.find_shortcut(Key::Escape) {
                Some(index) => self.activate(index, ctx),
                None => Err(ModeSelError::ui("Input closed and the dialog has no cancel key")),
            },
        }
    }

    fn dispatch_key(&mut self, key: Key, ctx: &mut DialogContext<'_>) -> Result<Option<usize>> {
        let focus = ctx.focus;
        match self.send(focus, Message::Key(key), ctx)? {
            Status::Close => return Ok(Some(focus)),
            Status::Used | Status::Redraw => return Ok(None),
            Status::Ok => {}
        }

        if let Some(index) = self.find_shortcut(key) {
            return self.activate(index, ctx);
        }

        match key {
            Key::Tab | Key::Right => self.move_focus(ctx, true),
            Key::BackTab | Key::Left => self.move_focus(ctx, false),
            _ => {}
        }
        Ok(None)
    }

    fn dispatch_click(&mut self, x: u32, y: u32, ctx: &mut DialogContext<'_>) -> Result<Option<usize>> {
        let hit = self
            .widgets
            .iter()
            .rposition(|w| w.wants_focus() && w.frame().contains(x, y));
        let Some(index) = hit else {
            return Ok(None);
        };

        ctx.set_focus(index);
        match self.send(index, Message::Click { x, y }, ctx)? {
            Status::Close => Ok(Some(index)),
            _ => Ok(None),
        }
    }

    fn find_shortcut(&self, key: Key) -> Option<usize> {
        self.widgets.iter().position(|w| w.shortcut() == Some(key))
    }

    fn activate(&mut self, index: usize, ctx: &mut DialogContext<'_>) -> Result<Option<usize>> {
        match self.send(index, Message::Shortcut, ctx)? {
            Status::Close => Ok(Some(index)),
            _ => Ok(None),
        }
    }

    fn move_focus(&self, ctx: &mut DialogContext<'_>, forward: bool) {
        let n = self.widgets.len();
        for step in 1..n {
            let index = if forward {
                (ctx.focus + step) % n
            } else {
                (ctx.focus + n - step) % n
            };
            if self.widgets[index].wants_focus() {
                ctx.set_focus(index);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DriverCatalog;
    use crate::ui::context::HeadlessBackend;
    use crate::ui::widgets::{Button, ShadowBox};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every message it receives
    struct Recorder {
        log: Rc<RefCell<Vec<Message>>>,
        frame: Rect,
        close_on_idle: bool,
    }

    impl Recorder {
        fn new(log: &Rc<RefCell<Vec<Message>>>) -> Self {
            Self {
                log: Rc::clone(log),
                frame: Rect::default(),
                close_on_idle: false,
            }
        }
    }

    impl Widget for Recorder {
        fn respond(&mut self, msg: Message, _ctx: &mut DialogContext<'_>) -> Result<Status> {
            self.log.borrow_mut().push(msg);
            if msg == Message::Idle && self.close_on_idle {
                return Ok(Status::Close);
            }
            Ok(Status::Ok)
        }

        fn frame(&self) -> Rect {
            self.frame
        }

        fn frame_mut(&mut self) -> Option<&mut Rect> {
            Some(&mut self.frame)
        }
    }

    fn session() -> Session {
        Session::new(DriverCatalog::from_entries(Vec::new()))
    }

    fn buttons(dialog: &mut Dialog) -> (usize, usize) {
        let ok = dialog.push(Box::new(Button::new("OK", Rect::new(0, 0, 8, 3), None)));
        let cancel = dialog.push(Box::new(Button::new(
            "Cancel",
            Rect::new(10, 0, 8, 3),
            Some(Key::Escape),
        )));
        (ok, cancel)
    }

    #[test]
    fn test_escape_exits_without_further_idle() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dialog = Dialog::new();
        let (ok, cancel) = buttons(&mut dialog);
        dialog.push(Box::new(Recorder::new(&log)));

        let mut backend = HeadlessBackend::new(80, 25)
            .with_events([InputEvent::Tick, InputEvent::Key(Key::Escape)]);
        let exit = dialog.run(&mut backend, &mut session(), ok).unwrap();

        assert_eq!(exit, cancel);
        let messages = log.borrow();
        let idles = messages.iter().filter(|m| **m == Message::Idle).count();
        assert_eq!(idles, 2);
        assert_eq!(messages.last(), Some(&Message::End));
        assert_eq!(messages[messages.len() - 2], Message::Idle);
    }

    #[test]
    fn test_enter_on_focused_button_exits() {
        let mut dialog = Dialog::new();
        let (ok, _) = buttons(&mut dialog);
        let mut backend = HeadlessBackend::new(80, 25).with_events([InputEvent::Key(Key::Enter)]);
        assert_eq!(dialog.run(&mut backend, &mut session(), ok).unwrap(), ok);
    }

    #[test]
    fn test_tab_moves_focus_to_next_button() {
        let mut dialog = Dialog::new();
        let (ok, cancel) = buttons(&mut dialog);
        let mut backend = HeadlessBackend::new(80, 25)
            .with_events([InputEvent::Key(Key::Tab), InputEvent::Key(Key::Space)]);
        assert_eq!(dialog.run(&mut backend, &mut session(), ok).unwrap(), cancel);
    }

    #[test]
    fn test_click_hits_widget() {
        let mut dialog = Dialog::new();
        let (ok, cancel) = buttons(&mut dialog);
        let mut backend = HeadlessBackend::new(18, 3).with_events([
            InputEvent::Click { x: 9, y: 1 },
            InputEvent::Click { x: 12, y: 1 },
        ]);
        assert_eq!(dialog.run(&mut backend, &mut session(), ok).unwrap(), cancel);
    }

    #[test]
    fn test_closed_input_cancels() {
        let mut dialog = Dialog::new();
        let (ok, cancel) = buttons(&mut dialog);
        let mut backend = HeadlessBackend::new(80, 25);
        assert_eq!(dialog.run(&mut backend, &mut session(), ok).unwrap(), cancel);
    }

    #[test]
    fn test_closed_input_without_cancel_is_error() {
        let mut dialog = Dialog::new();
        dialog.push(Box::new(Button::new("OK", Rect::new(0, 0, 8, 3), None)));
        let mut backend = HeadlessBackend::new(80, 25);
        assert!(dialog.run(&mut backend, &mut session(), 0).is_err());
    }

    #[test]
    fn test_idle_close_exits_before_input() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut dialog = Dialog::new();
        let mut recorder = Recorder::new(&log);
        recorder.close_on_idle = true;
        let index = dialog.push(Box::new(recorder));

        let mut backend = HeadlessBackend::new(80, 25);
        assert_eq!(dialog.run(&mut backend, &mut session(), 0).unwrap(), index);
        assert_eq!(backend.waits(), 0);
    }

    #[test]
    fn test_empty_dialog_is_error() {
        let mut backend = HeadlessBackend::new(80, 25);
        assert!(Dialog::new().run(&mut backend, &mut session(), 0).is_err());
    }

    #[test]
    fn test_centre_moves_all_frames() {
        let mut dialog = Dialog::new();
        dialog.push(Box::new(ShadowBox::new(Rect::new(0, 0, 40, 10))));
        dialog.push(Box::new(Button::new("OK", Rect::new(30, 7, 8, 3), None)));
        dialog.centre((80, 30));

        assert_eq!(dialog.bounds(), Rect::new(20, 10, 40, 10));
        assert_eq!(dialog.widget(1).map(|w| w.frame()), Some(Rect::new(50, 17, 8, 3)));
    }

    #[test]
    fn test_centre_oversized_dialog_stays_at_origin() {
        let mut dialog = Dialog::new();
        dialog.push(Box::new(ShadowBox::new(Rect::new(0, 0, 100, 40))));
        dialog.centre((80, 25));
        assert_eq!(dialog.bounds(), Rect::new(0, 0, 100, 40));
    }
}
