//! Small static info windows opened from the taskbar.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::display::{DisplayServer, EventMask, Geometry, Rgb, WindowHandle, WindowStyle};
use crate::layout::{LABEL_BASELINE, PANEL_BORDER, TEXT_INSET};
use crate::registry::{Widget, WidgetRegistry};

const LINE_HEIGHT: i16 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PanelKind {
    Settings,
    Volume,
    About,
}

impl PanelKind {
    #[must_use]
    pub fn geometry(self) -> Geometry {
        match self {
            PanelKind::Settings => Geometry::new(200, 200, 300, 200),
            PanelKind::Volume => Geometry::new(250, 150, 200, 60),
            PanelKind::About => Geometry::new(300, 300, 300, 200),
        }
    }

    #[must_use]
    pub fn background(self) -> Rgb {
        match self {
            PanelKind::Settings | PanelKind::About => Rgb(0x44_4444),
            PanelKind::Volume => Rgb(0x33_3355),
        }
    }

    #[must_use]
    pub fn lines(self) -> Vec<String> {
        match self {
            PanelKind::Settings => vec!["Settings (Coming Soon)".to_string()],
            PanelKind::Volume => vec!["Volume: Use keys".to_string()],
            PanelKind::About => vec![
                format!("Flow Desktop v{}", env!("CARGO_PKG_VERSION")),
                "A minimal X11 shell".to_string(),
            ],
        }
    }
}

/// Lazily created panels, at most one window per kind.
#[derive(Debug, Default)]
pub struct InfoPanels {
    open: HashMap<PanelKind, WindowHandle>,
}

impl InfoPanels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn handle(&self, kind: PanelKind) -> Option<WindowHandle> {
        self.open.get(&kind).copied()
    }

    /// Open `kind`, or raise it when already open. Creation failures are logged.
    pub fn show<D: DisplayServer + ?Sized>(
        &mut self,
        kind: PanelKind,
        display: &mut D,
        registry: &mut WidgetRegistry,
    ) {
        if let Some(handle) = self.handle(kind) {
            debug!("Raising {kind:?} panel");
            if let Err(e) = display.raise_window(handle) {
                warn!("Failed to raise {kind:?} panel: {e}");
            }
            return;
        }

        let style = WindowStyle {
            background: kind.background(),
            border_width: PANEL_BORDER,
            override_redirect: false,
        };
        match registry.open_widget(
            display,
            None,
            kind.geometry(),
            &style,
            EventMask::EXPOSE_AND_PRESS,
            Widget::Panel(kind),
        ) {
            Ok(handle) => {
                self.open.insert(kind, handle);
                self.redraw(kind, display);
            }
            Err(e) => warn!("Failed to open {kind:?} panel: {e}"),
        }
    }

    pub fn redraw<D: DisplayServer + ?Sized>(&self, kind: PanelKind, display: &mut D) {
        let Some(handle) = self.handle(kind) else {
            return;
        };
        let mut y = LABEL_BASELINE;
        for line in kind.lines() {
            if let Err(e) = display.draw_text(handle, TEXT_INSET, y, &line, Rgb::WHITE) {
                warn!("Failed to draw {kind:?} panel: {e}");
                return;
            }
            y += LINE_HEIGHT;
        }
    }

    pub fn close<D: DisplayServer + ?Sized>(
        &mut self,
        kind: PanelKind,
        display: &mut D,
        registry: &mut WidgetRegistry,
    ) {
        if let Some(handle) = self.open.remove(&kind) {
            debug!("Closing {kind:?} panel");
            registry.close_widget(display, handle);
        }
    }

    pub fn close_all<D: DisplayServer + ?Sized>(
        &mut self,
        display: &mut D,
        registry: &mut WidgetRegistry,
    ) {
        for (_, handle) in self.open.drain() {
            registry.close_widget(display, handle);
        }
    }
}
