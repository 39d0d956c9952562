//! Widget registry mapping window handles to the shell's logical widgets.
//!
//! Handles are registered as soon as their window exists and unregistered
//! before the window is destroyed, so a recycled handle can never resolve
//! to a stale widget.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::Result;
use crate::display::{DisplayServer, EventMask, Geometry, WindowHandle, WindowStyle};
use crate::panel::PanelKind;

/// What clicking a taskbar button does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    ShowAppMenu,
    Launch(String),
    ShowPanel(PanelKind),
    ToggleTheme,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// The bar itself; parent of buttons and clock.
    Taskbar,
    Button { label: String, action: ButtonAction },
    Clock,
    /// The application menu popup.
    Popup,
    Panel(PanelKind),
}

#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: HashMap<WindowHandle, Widget>,
    /// Creation order, oldest first.
    order: Vec<WindowHandle>,
}

impl WidgetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `widget` for `handle`, returning any widget it replaced.
    pub fn register(&mut self, handle: WindowHandle, widget: Widget) -> Option<Widget> {
        debug!("Registering {handle} as {widget:?}");
        let previous = self.widgets.insert(handle, widget);
        if let Some(ref old) = previous {
            warn!("Handle {handle} was already registered as {old:?}");
            self.order.retain(|h| *h != handle);
        }
        self.order.push(handle);
        previous
    }

    #[must_use]
    pub fn lookup(&self, handle: WindowHandle) -> Option<&Widget> {
        self.widgets.get(&handle)
    }

    pub fn unregister(&mut self, handle: WindowHandle) -> Option<Widget> {
        let removed = self.widgets.remove(&handle)?;
        self.order.retain(|h| *h != handle);
        debug!("Unregistered {handle}");
        Some(removed)
    }

    /// Remove and return the most recently registered widget.
    pub fn pop_newest(&mut self) -> Option<(WindowHandle, Widget)> {
        let handle = self.order.pop()?;
        let widget = self.widgets.remove(&handle)?;
        Some((handle, widget))
    }

    #[must_use]
    pub fn contains(&self, handle: WindowHandle) -> bool {
        self.widgets.contains_key(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Create, register, subscribe and map a window for `widget`.
    ///
    /// Events are selected only after registration, so nothing can arrive
    /// for an unknown handle. A half-built window is torn down again.
    ///
    /// # Errors
    ///
    /// Returns the display error from whichever step failed.
    pub fn open_widget<D: DisplayServer + ?Sized>(
        &mut self,
        display: &mut D,
        parent: Option<WindowHandle>,
        geometry: Geometry,
        style: &WindowStyle,
        mask: EventMask,
        widget: Widget,
    ) -> Result<WindowHandle> {
        let handle = display.create_window(parent, geometry, style)?;
        self.register(handle, widget);

        let mapped = display
            .select_events(handle, mask)
            .and_then(|()| display.map_window(handle));
        if let Err(e) = mapped {
            self.close_widget(display, handle);
            return Err(e);
        }
        Ok(handle)
    }

    /// Unregister `handle`, then destroy its window.
    pub fn close_widget<D: DisplayServer + ?Sized>(
        &mut self,
        display: &mut D,
        handle: WindowHandle,
    ) {
        self.unregister(handle);
        if let Err(e) = display.destroy_window(handle) {
            warn!("Failed to destroy window {handle}: {e}");
        }
    }

    /// Registered widgets in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (WindowHandle, &Widget)> {
        self.order
            .iter()
            .filter_map(|h| self.widgets.get(h).map(|w| (*h, w)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(label: &str) -> Widget {
        Widget::Button {
            label: label.to_string(),
            action: ButtonAction::Launch(label.to_lowercase()),
        }
    }

    #[test]
    fn test_lookup_unregistered_is_none() {
        let registry = WidgetRegistry::new();
        assert!(registry.lookup(WindowHandle(42)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = WidgetRegistry::new();
        assert!(registry.register(WindowHandle(1), Widget::Clock).is_none());
        assert_eq!(registry.lookup(WindowHandle(1)), Some(&Widget::Clock));
        assert!(registry.contains(WindowHandle(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_removes_entry() {
        let mut registry = WidgetRegistry::new();
        registry.register(WindowHandle(1), Widget::Popup);

        assert_eq!(registry.unregister(WindowHandle(1)), Some(Widget::Popup));
        assert!(registry.lookup(WindowHandle(1)).is_none());
        assert!(registry.unregister(WindowHandle(1)).is_none());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_reregister_replaces_and_keeps_one_entry() {
        let mut registry = WidgetRegistry::new();
        registry.register(WindowHandle(7), Widget::Popup);
        registry.register(WindowHandle(8), Widget::Clock);

        let previous = registry.register(WindowHandle(7), button("Term"));
        assert_eq!(previous, Some(Widget::Popup));
        assert_eq!(registry.len(), 2);

        let order: Vec<_> = registry.iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec![WindowHandle(8), WindowHandle(7)]);
    }

    #[test]
    fn test_pop_newest_is_reverse_creation_order() {
        let mut registry = WidgetRegistry::new();
        registry.register(WindowHandle(10), Widget::Taskbar);
        registry.register(WindowHandle(11), button("Apps"));
        registry.register(WindowHandle(12), Widget::Clock);
        registry.unregister(WindowHandle(11));
        registry.register(WindowHandle(13), Widget::Popup);

        let mut popped = Vec::new();
        while let Some((handle, _)) = registry.pop_newest() {
            popped.push(handle);
        }

        assert_eq!(
            popped,
            vec![WindowHandle(13), WindowHandle(12), WindowHandle(10)]
        );
        assert!(registry.is_empty());
    }
}
