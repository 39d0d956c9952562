//! The shell's owned state and event handling.
//!
//! [`Shell`] is built once at startup, mutated only by the dispatch loop,
//! and torn down by [`Shell::shutdown`].

use tracing::{debug, info, warn};

use crate::Result;
use crate::catalog::AppCatalog;
use crate::clock::time_string;
use crate::config::Config;
use crate::display::{DisplayServer, Event, EventMask, Geometry, Rgb, WindowHandle, WindowStyle};
use crate::hotkey::Hotkey;
use crate::launcher::Launcher;
use crate::layout::{
    BUTTON_COLOR, BUTTON_HEIGHT, CLOCK_WIDTH, LABEL_BASELINE, LABEL_X, TEXT_INSET,
    button_geometry, clock_geometry, taskbar_geometry,
};
use crate::panel::{InfoPanels, PanelKind};
use crate::popup::PopupController;
use crate::registry::{ButtonAction, Widget, WidgetRegistry};

const ALTERNATE_THEME: Rgb = Rgb(0x44_4444);
const FALLBACK_THEME: Rgb = Rgb(0x33_3333);

/// Whether the dispatch loop should keep going after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Taskbar buttons, left to right.
#[must_use]
pub fn taskbar_buttons(config: &Config) -> Vec<(&'static str, ButtonAction)> {
    let settings = config
        .settings
        .clone()
        .filter(|program| !program.trim().is_empty())
        .map_or(
            ButtonAction::ShowPanel(PanelKind::Settings),
            ButtonAction::Launch,
        );
    vec![
        ("Apps", ButtonAction::ShowAppMenu),
        ("Term", ButtonAction::Launch(config.terminal.clone())),
        ("Web", ButtonAction::Launch(config.browser.clone())),
        ("Files", ButtonAction::Launch(config.file_manager.clone())),
        ("Set", settings),
        ("Vol", ButtonAction::ShowPanel(PanelKind::Volume)),
        ("Theme", ButtonAction::ToggleTheme),
        ("About", ButtonAction::ShowPanel(PanelKind::About)),
        ("Logout", ButtonAction::Logout),
    ]
}

pub struct Shell<D, L> {
    display: D,
    launcher: L,
    config: Config,
    registry: WidgetRegistry,
    popup: PopupController,
    panels: InfoPanels,
    theme_color: Rgb,
    taskbar: Option<WindowHandle>,
    clock: Option<WindowHandle>,
}

impl<D: DisplayServer, L: Launcher> Shell<D, L> {
    /// A shell whose catalog scans the configured application dirs.
    #[must_use]
    pub fn new(display: D, launcher: L, config: Config) -> Self {
        let catalog = AppCatalog::new(config.application_dirs());
        Self::with_catalog(display, launcher, config, catalog)
    }

    #[must_use]
    pub fn with_catalog(display: D, launcher: L, config: Config, catalog: AppCatalog) -> Self {
        let popup = PopupController::new(catalog, config.rescan_on_show);
        Self {
            display,
            launcher,
            theme_color: config.theme_color,
            config,
            registry: WidgetRegistry::new(),
            popup,
            panels: InfoPanels::new(),
            taskbar: None,
            clock: None,
        }
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    #[must_use]
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    #[must_use]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    #[must_use]
    pub fn popup(&self) -> &PopupController {
        &self.popup
    }

    #[must_use]
    pub fn panels(&self) -> &InfoPanels {
        &self.panels
    }

    #[must_use]
    pub fn theme_color(&self) -> Rgb {
        self.theme_color
    }

    #[must_use]
    pub fn taskbar(&self) -> Option<WindowHandle> {
        self.taskbar
    }

    #[must_use]
    pub fn clock(&self) -> Option<WindowHandle> {
        self.clock
    }

    /// Build the taskbar, run the startup commands and grab hotkeys.
    ///
    /// # Errors
    ///
    /// Returns an error when the taskbar cannot be created. Hotkey grabs
    /// and startup commands only log their failures.
    pub fn start(&mut self) -> Result<()> {
        self.build_taskbar()?;
        self.launch_session();
        Ok(())
    }

    /// Wallpaper, window manager, then hotkey grabs.
    pub fn launch_session(&mut self) {
        let wallpaper = self.config.wallpaper_launch_command();
        self.launcher.launch(&wallpaper);
        if let Some(wm) = self
            .config
            .window_manager
            .as_deref()
            .filter(|wm| !wm.trim().is_empty())
        {
            info!("Starting window manager: {wm}");
            self.launcher.launch(wm);
        }

        for hotkey in Hotkey::ALL {
            if let Err(e) = self.display.grab_hotkey(hotkey) {
                warn!("Failed to grab {hotkey:?}: {e}");
            }
        }

        if let Err(e) = self.display.flush() {
            warn!("Failed to flush display: {e}");
        }
    }

    /// Create the bar, its buttons and the clock.
    ///
    /// # Errors
    ///
    /// Any creation failure is returned; these widgets are required.
    pub fn build_taskbar(&mut self) -> Result<()> {
        let buttons = taskbar_buttons(&self.config);
        let button_count = buttons.len();
        let (screen_width, screen_height) = self.display.screen_size();
        let bar_geometry = taskbar_geometry(screen_width, screen_height, button_count);
        let bar_style = WindowStyle {
            background: self.theme_color,
            border_width: 0,
            override_redirect: true,
        };
        let bar = self.registry.open_widget(
            &mut self.display,
            None,
            bar_geometry,
            &bar_style,
            EventMask::EXPOSE_AND_PRESS,
            Widget::Taskbar,
        )?;
        self.taskbar = Some(bar);

        let button_style = WindowStyle {
            background: BUTTON_COLOR,
            ..bar_style
        };
        for (index, (label, action)) in buttons.into_iter().enumerate() {
            self.registry.open_widget(
                &mut self.display,
                Some(bar),
                button_geometry(index),
                &button_style,
                EventMask::EXPOSE_AND_PRESS,
                Widget::Button {
                    label: label.to_string(),
                    action,
                },
            )?;
        }

        let clock = self.registry.open_widget(
            &mut self.display,
            Some(bar),
            clock_geometry(bar_geometry.width, button_count),
            &bar_style,
            EventMask::EXPOSE,
            Widget::Clock,
        )?;
        self.clock = Some(clock);

        info!("Taskbar created with {} widgets", self.registry.len());
        Ok(())
    }

    /// Route one event. Events for unknown windows are ignored.
    pub fn handle_event(&mut self, event: Event) -> Flow {
        match event {
            Event::Expose { window } => {
                self.redraw(window);
                Flow::Continue
            }
            Event::ButtonPress { window, y, .. } => self.press(window, y),
            Event::Hotkey(hotkey) => {
                self.hotkey(hotkey);
                Flow::Continue
            }
        }
    }

    /// Periodic refresh: redraw the clock and flush buffered requests.
    pub fn tick(&mut self) {
        self.draw_clock();
        if let Err(e) = self.display.flush() {
            warn!("Failed to flush display: {e}");
        }
    }

    pub fn show_app_menu(&mut self) {
        self.popup.show(&mut self.display, &mut self.registry);
    }

    /// Release every widget, newest first, so children go before parents.
    pub fn shutdown(&mut self) {
        info!("Shutting down, releasing {} widgets", self.registry.len());
        self.popup.close(&mut self.display, &mut self.registry);
        self.panels.close_all(&mut self.display, &mut self.registry);

        while let Some((handle, widget)) = self.registry.pop_newest() {
            debug!("Destroying {widget:?} ({handle})");
            if let Err(e) = self.display.destroy_window(handle) {
                warn!("Failed to destroy window {handle}: {e}");
            }
        }
        self.taskbar = None;
        self.clock = None;

        if let Err(e) = self.display.flush() {
            warn!("Failed to flush display: {e}");
        }
    }

    fn redraw(&mut self, window: WindowHandle) {
        let Some(widget) = self.registry.lookup(window).cloned() else {
            debug!("Ignoring expose for unknown window {window}");
            return;
        };
        match widget {
            Widget::Button { label, .. } => {
                if let Err(e) =
                    self.display
                        .draw_text(window, LABEL_X, LABEL_BASELINE, &label, Rgb::WHITE)
                {
                    warn!("Failed to draw {label} button: {e}");
                }
            }
            Widget::Clock => self.draw_clock(),
            Widget::Popup => self.popup.redraw(&mut self.display),
            Widget::Panel(kind) => self.panels.redraw(kind, &mut self.display),
            Widget::Taskbar => {}
        }
    }

    fn press(&mut self, window: WindowHandle, y: i16) -> Flow {
        let Some(widget) = self.registry.lookup(window).cloned() else {
            debug!("Ignoring press on unknown window {window}");
            return Flow::Continue;
        };
        match widget {
            Widget::Button { label, action } => {
                debug!("{label} button pressed");
                return self.run_action(action);
            }
            Widget::Popup => {
                self.popup
                    .hit_test(y, &mut self.display, &mut self.registry, &self.launcher);
            }
            Widget::Panel(kind) => self.panels.close(kind, &mut self.display, &mut self.registry),
            Widget::Taskbar | Widget::Clock => {}
        }
        Flow::Continue
    }

    fn run_action(&mut self, action: ButtonAction) -> Flow {
        match action {
            ButtonAction::ShowAppMenu => self.show_app_menu(),
            ButtonAction::Launch(command) => self.launcher.launch(&command),
            ButtonAction::ShowPanel(kind) => {
                self.panels
                    .show(kind, &mut self.display, &mut self.registry);
            }
            ButtonAction::ToggleTheme => self.toggle_theme(),
            ButtonAction::Logout => {
                info!("Logout requested");
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    fn hotkey(&mut self, hotkey: Hotkey) {
        debug!("Hotkey {hotkey:?}");
        if hotkey == Hotkey::Menu {
            self.show_app_menu();
        } else if let Some(command) = self.config.volume_command(hotkey) {
            self.launcher.launch(command);
        }
    }

    fn toggle_theme(&mut self) {
        let alternate = if self.config.theme_color == ALTERNATE_THEME {
            FALLBACK_THEME
        } else {
            ALTERNATE_THEME
        };
        self.theme_color = if self.theme_color == self.config.theme_color {
            alternate
        } else {
            self.config.theme_color
        };
        debug!("Theme color now {}", self.theme_color);
        self.draw_clock();
    }

    fn draw_clock(&mut self) {
        let Some(clock) = self.clock else {
            return;
        };
        let area = Geometry::new(0, 0, CLOCK_WIDTH, BUTTON_HEIGHT);
        let drawn = self
            .display
            .fill_rect(clock, area, self.theme_color)
            .and_then(|()| {
                self.display
                    .draw_text(clock, TEXT_INSET, LABEL_BASELINE, &time_string(), Rgb::WHITE)
            });
        if let Err(e) = drawn {
            warn!("Failed to draw clock: {e}");
        }
    }
}
