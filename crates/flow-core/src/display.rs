//! Abstract display capability.
//!
//! The shell never speaks a window-system protocol directly. Backends
//! implement [`DisplayServer`] and feed translated [`Event`]s into the
//! dispatcher's queue.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hotkey::Hotkey;
use crate::{Error, Result};

/// Opaque window identifier issued by the display server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u32);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 24-bit RGB pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0x00FF_FFFF);
    pub const BLACK: Rgb = Rgb(0x0000_0000);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts `0x333333`, `#333333` or `333333`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .or_else(|| trimmed.strip_prefix('#'))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 6 {
            return Err(Error::Config(format!("Invalid color: {s}")));
        }

        u32::from_str_radix(digits, 16)
            .map(Rgb)
            .map_err(|e| Error::Config(format!("Invalid color {s}: {e}")))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Position and size of a window or rectangle, in protocol units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    #[must_use]
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Creation-time attributes of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyle {
    pub background: Rgb,
    pub border_width: u16,
    /// Bypass the window manager (taskbar and its children).
    pub override_redirect: bool,
}

/// Input the shell wants delivered for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventMask {
    pub exposure: bool,
    pub button_press: bool,
}

impl EventMask {
    pub const EXPOSE: EventMask = EventMask {
        exposure: true,
        button_press: false,
    };

    pub const EXPOSE_AND_PRESS: EventMask = EventMask {
        exposure: true,
        button_press: true,
    };
}

/// Input delivered by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The window needs its contents redrawn.
    Expose { window: WindowHandle },
    /// Pointer button pressed; coordinates are relative to `window`.
    ButtonPress { window: WindowHandle, x: i16, y: i16 },
    /// A grabbed global key, independent of focus.
    Hotkey(Hotkey),
}

/// Window-system operations the shell needs.
///
/// Implementations buffer requests; [`DisplayServer::flush`] pushes them
/// to the server.
pub trait DisplayServer {
    /// Root screen size in pixels.
    fn screen_size(&self) -> (u16, u16);

    /// Create an unmapped window. `parent` of `None` means the root window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] when the server refuses the window.
    fn create_window(
        &mut self,
        parent: Option<WindowHandle>,
        geometry: Geometry,
        style: &WindowStyle,
    ) -> Result<WindowHandle>;

    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn map_window(&mut self, window: WindowHandle) -> Result<()>;

    /// Map the window if needed and restack it above its siblings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn raise_window(&mut self, window: WindowHandle) -> Result<()>;

    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn destroy_window(&mut self, window: WindowHandle) -> Result<()>;

    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn select_events(&mut self, window: WindowHandle, mask: EventMask) -> Result<()>;

    /// Draw `text` with its baseline at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn draw_text(
        &mut self,
        window: WindowHandle,
        x: i16,
        y: i16,
        text: &str,
        color: Rgb,
    ) -> Result<()>;

    /// # Errors
    ///
    /// Returns [`Error::Display`] on protocol failure.
    fn fill_rect(&mut self, window: WindowHandle, rect: Geometry, color: Rgb) -> Result<()>;

    /// Grab `hotkey` on the root window for any modifier state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] when the key has no keycode or the grab fails.
    fn grab_hotkey(&mut self, hotkey: Hotkey) -> Result<()>;

    /// # Errors
    ///
    /// Returns [`Error::Display`] when the connection is broken.
    fn flush(&mut self) -> Result<()>;
}
