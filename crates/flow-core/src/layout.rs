//! Fixed pixel layout of the taskbar, popup and panels.

use crate::display::{Geometry, Rgb};

pub const TASKBAR_HEIGHT: u16 = 40;
pub const TASKBAR_BOTTOM_GAP: u16 = 10;

pub const BUTTON_WIDTH: u16 = 80;
pub const BUTTON_HEIGHT: u16 = 30;
pub const BUTTON_MARGIN: u16 = 10;
pub const BUTTON_TOP: i16 = 5;
pub const BUTTON_COLOR: Rgb = Rgb(0x55_5555);
pub const LABEL_X: i16 = 5;
pub const LABEL_BASELINE: i16 = 20;
/// Left inset of text in the clock and info panels.
pub const TEXT_INSET: i16 = 10;

pub const CLOCK_WIDTH: u16 = 120;

pub const MENU_GEOMETRY: Geometry = Geometry::new(100, 100, 300, 400);
pub const MENU_BACKGROUND: Rgb = Rgb(0x22_2222);
pub const MENU_BORDER: u16 = 2;
pub const MENU_TEXT_X: i16 = 10;
/// Baseline of the first entry.
pub const MENU_FIRST_SLOT: i16 = 20;
pub const MENU_ROW_HEIGHT: i16 = 20;
/// Distance from a slot's baseline to the bottom of its hit band.
pub const BAND_MARGIN: i16 = 5;

pub const PANEL_BORDER: u16 = 2;

/// The floating bar: 80% of the screen width, centred, just above the bottom edge.
///
/// The bar is widened to fit `button_count` buttons and the clock, up to the
/// full screen width.
#[must_use]
pub fn taskbar_geometry(screen_width: u16, screen_height: u16, button_count: usize) -> Geometry {
    let preferred = u16::try_from(u32::from(screen_width) * 4 / 5).unwrap_or(screen_width);
    let needed = clock_min_x(button_count)
        .saturating_add(CLOCK_WIDTH)
        .saturating_add(BUTTON_MARGIN);
    let width = preferred.max(needed).min(screen_width);
    let x = i16::try_from((screen_width - width) / 2).unwrap_or(0);
    let y = i16::try_from(
        screen_height.saturating_sub(TASKBAR_HEIGHT + TASKBAR_BOTTOM_GAP),
    )
    .unwrap_or(0);
    Geometry::new(x, y, width, TASKBAR_HEIGHT)
}

/// Geometry of the `index`-th button, relative to the taskbar.
#[must_use]
pub fn button_geometry(index: usize) -> Geometry {
    let step = usize::from(BUTTON_WIDTH + BUTTON_MARGIN);
    let x = i16::try_from(usize::from(BUTTON_MARGIN) + index * step).unwrap_or(i16::MAX);
    Geometry::new(x, BUTTON_TOP, BUTTON_WIDTH, BUTTON_HEIGHT)
}

/// Right edge of the last of `button_count` buttons.
#[must_use]
pub fn buttons_end(button_count: usize) -> u16 {
    let step = usize::from(BUTTON_WIDTH + BUTTON_MARGIN);
    u16::try_from(button_count * step).unwrap_or(u16::MAX)
}

/// Leftmost clock x that keeps it clear of the buttons.
fn clock_min_x(button_count: usize) -> u16 {
    buttons_end(button_count).saturating_add(BUTTON_MARGIN)
}

/// Clock geometry, right-aligned inside a taskbar of `taskbar_width` but
/// never over any of the `button_count` buttons.
#[must_use]
pub fn clock_geometry(taskbar_width: u16, button_count: usize) -> Geometry {
    let x = taskbar_width
        .saturating_sub(CLOCK_WIDTH + BUTTON_MARGIN)
        .max(clock_min_x(button_count));
    Geometry::new(
        i16::try_from(x).unwrap_or(i16::MAX),
        BUTTON_TOP,
        CLOCK_WIDTH,
        BUTTON_HEIGHT,
    )
}
