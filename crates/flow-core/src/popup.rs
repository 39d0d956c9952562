//! The application menu popup.
//!
//! ```text
//! Closed --show--> Open(empty) --populate--> Open(populated)
//! Open(populated) --show--> Open(populated)      (re-map, no rescan)
//! Open(populated) --hit_test(y) in a band--> Closed (after launching)
//! Open(*) --close--> Closed
//! ```

use tracing::{debug, info, warn};

use crate::catalog::{AppCatalog, AppEntry};
use crate::display::{DisplayServer, EventMask, Geometry, Rgb, WindowHandle, WindowStyle};
use crate::launcher::Launcher;
use crate::layout::{MENU_BACKGROUND, MENU_BORDER, MENU_GEOMETRY, MENU_TEXT_X};
use crate::registry::{Widget, WidgetRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupPhase {
    Closed,
    Empty,
    Populated,
}

#[derive(Debug)]
pub struct PopupController {
    catalog: AppCatalog,
    handle: Option<WindowHandle>,
    entries: Vec<AppEntry>,
    populated: bool,
    /// Rescan the catalog on every show instead of only on creation.
    rescan_on_show: bool,
}

impl PopupController {
    #[must_use]
    pub fn new(catalog: AppCatalog, rescan_on_show: bool) -> Self {
        Self {
            catalog,
            handle: None,
            entries: Vec::new(),
            populated: false,
            rescan_on_show,
        }
    }

    #[must_use]
    pub fn phase(&self) -> PopupPhase {
        match (self.handle, self.populated) {
            (None, _) => PopupPhase::Closed,
            (Some(_), false) => PopupPhase::Empty,
            (Some(_), true) => PopupPhase::Populated,
        }
    }

    #[must_use]
    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    #[must_use]
    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    /// Open the popup, or raise the existing one.
    ///
    /// A window that cannot be created leaves the popup closed; the user
    /// can simply try again.
    pub fn show<D: DisplayServer + ?Sized>(
        &mut self,
        display: &mut D,
        registry: &mut WidgetRegistry,
    ) {
        if let Some(handle) = self.handle {
            debug!("App menu already open, raising");
            if let Err(e) = display.raise_window(handle) {
                warn!("Failed to raise app menu: {e}");
            }
            if self.rescan_on_show {
                self.populate(display);
            }
            return;
        }

        let style = WindowStyle {
            background: MENU_BACKGROUND,
            border_width: MENU_BORDER,
            override_redirect: false,
        };
        let handle = match registry.open_widget(
            display,
            None,
            MENU_GEOMETRY,
            &style,
            EventMask::EXPOSE_AND_PRESS,
            Widget::Popup,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to open app menu: {e}");
                return;
            }
        };

        self.handle = Some(handle);
        self.entries.clear();
        self.populated = false;
        self.populate(display);
    }

    /// Scan the catalog into the open popup and draw it.
    pub fn populate<D: DisplayServer + ?Sized>(&mut self, display: &mut D) {
        if self.handle.is_none() {
            return;
        }
        self.entries = self.catalog.scan();
        self.populated = true;
        info!("App menu populated with {} entries", self.entries.len());
        self.redraw(display);
    }

    pub fn redraw<D: DisplayServer + ?Sized>(&self, display: &mut D) {
        let Some(handle) = self.handle else {
            return;
        };
        let area = Geometry::new(0, 0, MENU_GEOMETRY.width, MENU_GEOMETRY.height);
        if let Err(e) = display.fill_rect(handle, area, MENU_BACKGROUND) {
            warn!("Failed to clear app menu: {e}");
            return;
        }
        for entry in &self.entries {
            if let Err(e) = display.draw_text(
                handle,
                MENU_TEXT_X,
                entry.vertical_slot,
                &entry.display_name,
                Rgb::WHITE,
            ) {
                warn!("Failed to draw app menu entry: {e}");
                return;
            }
        }
    }

    /// First entry whose hit band contains `y`.
    #[must_use]
    pub fn entry_at(&self, y: i16) -> Option<&AppEntry> {
        let layout = self.catalog.layout();
        self.entries
            .iter()
            .find(|entry| layout.band(entry.vertical_slot).contains(y))
    }

    /// Launch the entry under `y` and close the popup.
    ///
    /// Returns whether an entry was hit; a miss changes nothing.
    pub fn hit_test<D, L>(
        &mut self,
        y: i16,
        display: &mut D,
        registry: &mut WidgetRegistry,
        launcher: &L,
    ) -> bool
    where
        D: DisplayServer + ?Sized,
        L: Launcher + ?Sized,
    {
        let Some(entry) = self.entry_at(y) else {
            debug!("App menu click at y={y} hit no entry");
            return false;
        };
        info!("Launching {} ({})", entry.display_name, entry.command);
        launcher.launch(&entry.command);
        self.close(display, registry);
        true
    }

    pub fn close<D: DisplayServer + ?Sized>(
        &mut self,
        display: &mut D,
        registry: &mut WidgetRegistry,
    ) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        debug!("Closing app menu");
        registry.close_widget(display, handle);
        self.entries.clear();
        self.populated = false;
    }
}
