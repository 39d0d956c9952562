pub mod catalog;
pub mod clock;
pub mod config;
pub mod dispatcher;
pub mod display;
pub mod hotkey;
pub mod launcher;
pub mod layout;
pub mod panel;
pub mod popup;
pub mod registry;
pub mod shell;

mod error;

#[cfg(test)]
mod tests;

pub use dispatcher::{StopReason, run};
pub use display::{DisplayServer, Event, EventMask, Geometry, Rgb, WindowHandle, WindowStyle};
pub use error::{Error, Result};
pub use hotkey::Hotkey;
pub use launcher::{DetachedLauncher, Launcher};
pub use shell::{Flow, Shell};
