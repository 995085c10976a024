//! Rendering and input backends
//!
//! The dialog engine draws through the [`Backend`] trait and blocks on it for
//! input. [`HeadlessBackend`] records draw calls and replays scripted input;
//! `NotcursesContext` (feature `tui`) drives a real terminal.

use crate::config::Style;
use crate::error::{ModeSelError, Result};
use std::collections::VecDeque;
use std::str::FromStr;

#[cfg(feature = "tui")]
use libnotcurses_sys::{Nc, NcInput, NcReceived};

#[cfg(feature = "tui")]
use libnotcurses_sys::c_api::{
    NCKEY_DOWN, NCKEY_END, NCKEY_ENTER, NCKEY_ESC, NCKEY_HOME, NCKEY_LEFT, NCKEY_MOD_SHIFT,
    NCKEY_PGDOWN, NCKEY_PGUP, NCKEY_RIGHT, NCKEY_SPACE, NCKEY_TAB, NCKEY_UP,
};

/// Widget geometry in screen cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
}

impl Rect {
    /// Rectangle at `x`, `y` of the given size
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the cell lies inside
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Move by `dx`, `dy`
    pub fn offset(&mut self, dx: u32, dy: u32) {
        self.x += dx;
        self.y += dy;
    }
}

/// Keys the dialog understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Cursor up
    Up,
    /// Cursor down
    Down,
    /// Cursor left
    Left,
    /// Cursor right
    Right,
    /// Home
    Home,
    /// End
    End,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
    /// Tab
    Tab,
    /// Shift-Tab
    BackTab,
    /// Enter or Return
    Enter,
    /// Space bar
    Space,
    /// Escape
    Escape,
    /// Any other printable key
    Char(char),
}

/// One input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Key press
    Key(Key),
    /// Pointer button press at a cell
    Click {
        /// Screen column
        x: u32,
        /// Screen row
        y: u32,
    },
    /// Timer tick with no input
    Tick,
    /// The input source is gone; handled like the cancel key
    Close,
}

impl FromStr for InputEvent {
    type Err = ModeSelError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        let key = match token.to_ascii_lowercase().as_str() {
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pgup" | "pageup" => Key::PageUp,
            "pgdn" | "pagedown" => Key::PageDown,
            "tab" => Key::Tab,
            "backtab" => Key::BackTab,
            "enter" => Key::Enter,
            "space" => Key::Space,
            "esc" | "escape" => Key::Escape,
            "tick" => return Ok(Self::Tick),
            "close" => return Ok(Self::Close),
            lower => {
                if let Some(pos) = lower.strip_prefix("click:") {
                    let (x, y) = pos.split_once(':').ok_or_else(|| {
                        ModeSelError::ParseError(format!("Invalid click '{}'", token))
                    })?;
                    let parse = |v: &str| {
                        v.parse::<u32>().map_err(|e| {
                            ModeSelError::ParseError(format!("Invalid click '{}': {}", token, e))
                        })
                    };
                    return Ok(Self::Click {
                        x: parse(x)?,
                        y: parse(y)?,
                    });
                }
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => {
                        return Err(ModeSelError::ParseError(format!(
                            "Unknown input event '{}'",
                            token
                        )))
                    }
                }
            }
        };
        Ok(Self::Key(key))
    }
}

/// Parse a comma separated event script such as `down,down,tab,enter`
pub fn parse_script(script: &str) -> Result<Vec<InputEvent>> {
    script
        .split(',')
        .filter(|t| !t.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Visible slice of a list widget
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    /// Labels of the visible rows
    pub items: &'a [String],
    /// List index of the first visible row
    pub first: usize,
    /// List index of the highlighted row
    pub selected: Option<usize>,
    /// Whether the list has focus
    pub focused: bool,
}

/// Drawing primitives and input source used by the dialog engine
pub trait Backend {
    /// Screen size as (columns, rows)
    fn size(&self) -> (u32, u32);

    /// Fill `rect` and frame it, optionally with a drop shadow
    fn draw_box(&mut self, rect: Rect, style: Style, shadow: bool) -> Result<()>;

    /// Draw text at a cell; centred text is centred on `x`
    fn draw_text(&mut self, x: u32, y: u32, text: &str, style: Style, centered: bool) -> Result<()>;

    /// Framed button with a centred label
    fn draw_button(&mut self, rect: Rect, label: &str, style: Style, focused: bool) -> Result<()>;

    /// Framed list showing `view`
    fn draw_list(&mut self, rect: Rect, view: ListView<'_>, style: Style) -> Result<()>;

    /// Show everything drawn since the last call
    fn present(&mut self) -> Result<()>;

    /// Block until the next input event or timer tick
    fn wait_event(&mut self) -> Result<InputEvent>;

    /// Drop pending keystrokes and wait for pointer buttons to be released
    fn flush_input(&mut self) -> Result<()>;

    /// Give up the processor for a moment
    fn rest(&mut self) {
        std::thread::yield_now();
    }
}

/// Draw call recorded by [`HeadlessBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOp {
    /// [`Backend::draw_box`]
    Box {
        /// Filled area
        rect: Rect,
        /// Drop shadow drawn
        shadow: bool,
    },
    /// [`Backend::draw_text`], after centring
    Text {
        /// First column of the text
        x: u32,
        /// Row
        y: u32,
        /// Text drawn
        text: String,
    },
    /// [`Backend::draw_button`]
    Button {
        /// Button frame
        rect: Rect,
        /// Label
        label: String,
        /// Drawn as focused
        focused: bool,
    },
    /// [`Backend::draw_list`]
    List {
        /// List frame
        rect: Rect,
        /// Visible row labels
        items: Vec<String>,
        /// List index of the first visible row
        first: usize,
        /// Highlighted list index
        selected: Option<usize>,
        /// Drawn as focused
        focused: bool,
    },
    /// [`Backend::present`]
    Present,
}

/// Backend without a screen: records draws, replays scripted input
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    size: (u32, u32),
    events: VecDeque<InputEvent>,
    ops: Vec<DrawOp>,
    flushes: usize,
    waits: usize,
}

impl HeadlessBackend {
    /// Screen of `cols` x `rows` with no queued input
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            size: (cols, rows),
            ..Self::default()
        }
    }

    /// Queue input events to replay
    pub fn with_events(mut self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Everything drawn so far
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of `flush_input` calls
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    /// Number of `wait_event` calls
    pub fn waits(&self) -> usize {
        self.waits
    }

    /// Lists drawn so far, in draw order
    pub fn lists(&self) -> impl Iterator<Item = (&Rect, &[String], Option<usize>)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::List {
                rect,
                items,
                selected,
                ..
            } => Some((rect, items.as_slice(), *selected)),
            _ => None,
        })
    }
}

impl Backend for HeadlessBackend {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw_box(&mut self, rect: Rect, _style: Style, shadow: bool) -> Result<()> {
        self.ops.push(DrawOp::Box { rect, shadow });
        Ok(())
    }

    fn draw_text(&mut self, x: u32, y: u32, text: &str, _style: Style, _centered: bool) -> Result<()> {
        self.ops.push(DrawOp::Text {
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_button(&mut self, rect: Rect, label: &str, _style: Style, focused: bool) -> Result<()> {
        self.ops.push(DrawOp::Button {
            rect,
            label: label.to_string(),
            focused,
        });
        Ok(())
    }

    fn draw_list(&mut self, rect: Rect, view: ListView<'_>, _style: Style) -> Result<()> {
        self.ops.push(DrawOp::List {
            rect,
            items: view.items.to_vec(),
            first: view.first,
            selected: view.selected,
            focused: view.focused,
        });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ops.push(DrawOp::Present);
        Ok(())
    }

    fn wait_event(&mut self) -> Result<InputEvent> {
        self.waits += 1;
        Ok(self.events.pop_front().unwrap_or(InputEvent::Close))
    }

    fn flush_input(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }

    fn rest(&mut self) {}
}

/// Notcurses context wrapper
#[cfg(feature = "tui")]
pub struct NotcursesContext {
    nc: &'static mut Nc,
    rows: u32,
    cols: u32,
}

#[cfg(feature = "tui")]
impl NotcursesContext {
    /// Initialize notcurses
    pub fn init() -> Result<Self> {
        let nc = unsafe { Nc::new() }
            .map_err(|e| ModeSelError::ui(format!("Failed to initialize notcurses: {:?}", e)))?;

        let stdplane = unsafe { nc.stdplane() };
        let (rows, cols) = stdplane.dim_yx();

        Ok(Self { nc, rows, cols })
    }

    fn putstr_yx(&mut self, y: u32, x: u32, text: &str, channels: u64) -> Result<()> {
        let plane = unsafe { self.nc.stdplane() };
        plane.set_channels(channels);
        let _ = plane.putstr_yx(Some(y), Some(x), text);
        Ok(())
    }

    fn frame(&mut self, rect: Rect, channels: u64) -> Result<()> {
        if rect.width < 2 || rect.height < 2 {
            return Ok(());
        }
        let inner = "─".repeat(rect.width as usize - 2);
        self.putstr_yx(rect.y, rect.x, &format!("┌{}┐", inner), channels)?;
        let blank = " ".repeat(rect.width as usize - 2);
        for i in 1..rect.height - 1 {
            self.putstr_yx(rect.y + i, rect.x, &format!("│{}│", blank), channels)?;
        }
        self.putstr_yx(rect.y + rect.height - 1, rect.x, &format!("└{}┘", inner), channels)
    }

    fn get_nonblocking(&mut self) -> Result<Option<NcInput>> {
        let mut input = NcInput::default();
        let result = self
            .nc
            .get_nblock(Some(&mut input))
            .map_err(|e| ModeSelError::ui(format!("Failed to get input: {:?}", e)))?;

        match result {
            NcReceived::NoInput => Ok(None),
            _ => Ok(Some(input)),
        }
    }

    /// Translate a notcurses key id and modifier mask
    fn map_key(id: u32, modifiers: u32) -> Option<Key> {
        let shift = modifiers & (NCKEY_MOD_SHIFT as u32) != 0;
        let key = match id {
            NCKEY_UP => Key::Up,
            NCKEY_DOWN => Key::Down,
            NCKEY_LEFT => Key::Left,
            NCKEY_RIGHT => Key::Right,
            NCKEY_HOME => Key::Home,
            NCKEY_END => Key::End,
            NCKEY_PGUP => Key::PageUp,
            NCKEY_PGDOWN => Key::PageDown,
            NCKEY_TAB if shift => Key::BackTab,
            NCKEY_TAB => Key::Tab,
            NCKEY_ENTER => Key::Enter,
            NCKEY_SPACE => Key::Space,
            NCKEY_ESC => Key::Escape,
            _ => Key::Char(char::from_u32(id)?),
        };
        Some(key)
    }
}

#[cfg(feature = "tui")]
impl Backend for NotcursesContext {
    fn size(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    fn draw_box(&mut self, rect: Rect, style: Style, shadow: bool) -> Result<()> {
        self.frame(rect, channels::from_style(style))?;
        if shadow {
            let dark = channels::from_rgb(0, 0, 0, 0, 0, 0);
            for i in 1..=rect.height {
                self.putstr_yx(rect.y + i, rect.x + rect.width, " ", dark)?;
            }
            let bottom = " ".repeat(rect.width as usize);
            self.putstr_yx(rect.y + rect.height, rect.x + 1, &bottom, dark)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, x: u32, y: u32, text: &str, style: Style, centered: bool) -> Result<()> {
        let x = if centered {
            x.saturating_sub(text.chars().count() as u32 / 2)
        } else {
            x
        };
        self.putstr_yx(y, x, text, channels::from_style(style))
    }

    fn draw_button(&mut self, rect: Rect, label: &str, style: Style, focused: bool) -> Result<()> {
        let channels = if focused {
            channels::from_style(style.inverted())
        } else {
            channels::from_style(style)
        };
        self.frame(rect, channels)?;
        let width = rect.width.saturating_sub(2) as usize;
        let text = format!("{:^width$}", label, width = width);
        self.putstr_yx(rect.y + rect.height / 2, rect.x + 1, &text, channels)
    }

    fn draw_list(&mut self, rect: Rect, view: ListView<'_>, style: Style) -> Result<()> {
        let normal = channels::from_style(style);
        self.frame(rect, normal)?;
        let width = rect.width.saturating_sub(2) as usize;
        for (row, item) in view.items.iter().enumerate() {
            let index = view.first + row;
            let channels = if Some(index) == view.selected {
                channels::from_style(style.inverted())
            } else {
                normal
            };
            let marker = if view.focused && Some(index) == view.selected {
                "▶"
            } else {
                " "
            };
            let text = format!("{}{:<width$}", marker, item, width = width.saturating_sub(1));
            self.putstr_yx(rect.y + 1 + row as u32, rect.x + 1, &text, channels)?;
        }
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.nc
            .render()
            .map_err(|e| ModeSelError::ui(format!("Failed to render: {:?}", e)))
    }

    fn wait_event(&mut self) -> Result<InputEvent> {
        let mut input = NcInput::default();
        self.nc
            .get_blocking(Some(&mut input))
            .map_err(|e| ModeSelError::ui(format!("Failed to get input: {:?}", e)))?;
        Ok(match Self::map_key(input.id, input.modifiers) {
            Some(key) => InputEvent::Key(key),
            None => InputEvent::Tick,
        })
    }

    fn flush_input(&mut self) -> Result<()> {
        while self.get_nonblocking()?.is_some() {}
        Ok(())
    }
}

#[cfg(feature = "tui")]
impl Drop for NotcursesContext {
    fn drop(&mut self) {
        let _ = unsafe { self.nc.stop() };
    }
}

/// Helper functions for creating channel values (color pairs)
#[cfg(feature = "tui")]
pub mod channels {
    use crate::config::Style;

    /// Create a channel with RGB colors
    pub fn from_rgb(fg_r: u8, fg_g: u8, fg_b: u8, bg_r: u8, bg_g: u8, bg_b: u8) -> u64 {
        let fg = ((fg_r as u32) << 16) | ((fg_g as u32) << 8) | (fg_b as u32);
        let bg = ((bg_r as u32) << 16) | ((bg_g as u32) << 8) | (bg_b as u32);
        // Set the "not default color" bit for both fg and bg
        let fg_channel = (fg as u64) | 0x4000_0000;
        let bg_channel = (bg as u64) | 0x4000_0000;
        (fg_channel << 32) | bg_channel
    }

    /// Channel pair for a `Style`
    pub fn from_style(style: Style) -> u64 {
        from_rgb(
            style.fg.r, style.fg.g, style.fg.b, style.bg.r, style.bg.g, style.bg.b,
        )
    }
}
