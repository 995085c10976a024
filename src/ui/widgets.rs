//! Widgets used by the mode selection dialogs

use super::context::{Key, ListView, Rect};
use super::dialog::{DialogContext, Message, Status, Widget};
use super::providers::ListSource;
use super::session::{ListSlot, Session};
use crate::error::Result;

/// Framed background box with a drop shadow
pub struct ShadowBox {
    frame: Rect,
}

impl ShadowBox {
    /// Box filling `frame`
    pub fn new(frame: Rect) -> Self {
        Self { frame }
    }
}

impl Widget for ShadowBox {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        if msg == Message::Draw {
            ctx.backend.draw_box(self.frame, ctx.style, true)?;
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

/// Text centred on its x coordinate
pub struct CenteredText {
    frame: Rect,
    text: String,
}

impl CenteredText {
    /// Text centred on column `x` of row `y`
    pub fn new(text: impl Into<String>, x: u32, y: u32) -> Self {
        Self {
            frame: Rect::new(x, y, 1, 1),
            text: text.into(),
        }
    }
}

impl Widget for CenteredText {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        if msg == Message::Draw {
            ctx.backend
                .draw_text(self.frame.x, self.frame.y, &self.text, ctx.style, true)?;
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

/// Push button that closes the dialog when activated
pub struct Button {
    frame: Rect,
    label: String,
    shortcut: Option<Key>,
}

impl Button {
    /// Button closing the dialog when clicked, or on `shortcut`
    pub fn new(label: impl Into<String>, frame: Rect, shortcut: Option<Key>) -> Self {
        Self {
            frame,
            label: label.into(),
            shortcut,
        }
    }
}

impl Widget for Button {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        match msg {
            Message::Draw => {
                let focused = ctx.has_focus();
                ctx.backend
                    .draw_button(self.frame, &self.label, ctx.style, focused)?;
                Ok(Status::Ok)
            }
            Message::Key(Key::Enter | Key::Space) | Message::Click { .. } | Message::Shortcut => {
                Ok(Status::Close)
            }
            _ => Ok(Status::Ok),
        }
    }

    fn frame(&self) -> Rect {
        self.frame
    }

    fn frame_mut(&mut self) -> Option<&mut Rect> {
        Some(&mut self.frame)
    }

    fn wants_focus(&self) -> bool {
        true
    }

    fn shortcut(&self) -> Option<Key> {
        self.shortcut
    }
}

/// Scrolling list backed by a [`ListSource`]; its selection lives in the
/// session under `slot`.
///
/// Enter, or a double click on the selected row, closes the dialog. Two
/// clicks count as a double click when they hit the same row in consecutive
/// events.
pub struct ListBox {
    frame: Rect,
    slot: ListSlot,
    source: Box<dyn ListSource>,
    /// Idle ticks seen so far
    ticks: u64,
    /// Row index and tick of the previous click
    last_click: Option<(usize, u64)>,
}

impl ListBox {
    /// List showing `source` inside `frame`
    pub fn new(frame: Rect, slot: ListSlot, source: Box<dyn ListSource>) -> Self {
        Self {
            frame,
            slot,
            source,
            ticks: 0,
            last_click: None,
        }
    }

    fn click(&mut self, y: u32, ctx: &mut DialogContext<'_>) -> Status {
        let top = self.frame.y + 1;
        let row = y.saturating_sub(top) as usize;
        if y < top || row >= self.rows() {
            self.last_click = None;
            return Status::Redraw;
        }
        let len = self.source.len(ctx.session);
        let state = ctx.session.selections.get_mut(self.slot);
        let index = state.first + row;
        if index >= len {
            self.last_click = None;
            return Status::Redraw;
        }

        let double = self.last_click == Some((index, self.ticks.wrapping_sub(1)));
        if double && state.selected == Some(index) {
            self.last_click = None;
            return Status::Close;
        }
        state.select(index, len);
        self.last_click = Some((index, self.ticks));
        Status::Redraw
    }

    /// Rows available inside the border
    fn rows(&self) -> usize {
        self.frame.height.saturating_sub(2).max(1) as usize
    }

    fn draw(&self, ctx: &mut DialogContext<'_>) -> Result<()> {
        let len = self.source.len(ctx.session);
        let rows = self.rows();
        let state = ctx.session.selections.get_mut(self.slot);
        state.clamp(len);
        state.scroll_into_view(rows);
        let state = *state;

        let end = (state.first + rows).min(len);
        let session: &Session = ctx.session;
        let items: Vec<String> = (state.first..end)
            .filter_map(|i| self.source.label(i, session))
            .collect();

        let view = ListView {
            items: &items,
            first: state.first,
            selected: state.selected,
            focused: ctx.has_focus(),
        };
        ctx.backend.draw_list(self.frame, view, ctx.style)
    }

    fn move_selection(&self, key: Key, ctx: &mut DialogContext<'_>) -> Status {
        let len = self.source.len(ctx.session);
        let page = self.rows();
        let state = ctx.session.selections.get_mut(self.slot);
        let Some(current) = state.selected else {
            return Status::Used;
        };

        let target = match key {
            Key::Up => current.saturating_sub(1),
            Key::Down => current + 1,
            Key::Home => 0,
            Key::End => len.saturating_sub(1),
            Key::PageUp => current.saturating_sub(page),
            Key::PageDown => current + page,
            _ => current,
        };

        if state.select(target, len) {
            Status::Redraw
        } else {
            Status::Used
        }
    }
}

impl Widget for ListBox {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        match msg {
            Message::Draw => {
                self.draw(ctx)?;
                Ok(Status::Ok)
            }
            Message::Idle => {
                self.ticks = self.ticks.wrapping_add(1);
                let len = self.source.len(ctx.session);
                if ctx.session.selections.get_mut(self.slot).clamp(len) {
                    Ok(Status::Redraw)
                } else {
                    Ok(Status::Ok)
                }
            }
            Message::Key(
                key @ (Key::Up | Key::Down | Key::Home | Key::End | Key::PageUp | Key::PageDown),
            ) => Ok(self.move_selection(key, ctx)),
            Message::Key(Key::Enter) => Ok(Status::Close),
            Message::Click { y, .. } => Ok(self.click(y, ctx)),
            _ => Ok(Status::Ok),
        }
    }

    fn frame(&self) -> Rect {
        self.frame
    }

    fn frame_mut(&mut self) -> Option<&mut Rect> {
        Some(&mut self.frame)
    }

    fn wants_focus(&self) -> bool {
        true
    }
}

/// Gives up the processor once per tick
pub struct Yield;

impl Widget for Yield {
    fn respond(&mut self, msg: Message, ctx: &mut DialogContext<'_>) -> Result<Status> {
        if msg == Message::Idle {
            ctx.backend.rest();
        }
        Ok(Status::Ok)
    }
}
