//! X11 backend over x11rb's pure-Rust connection.
//!
//! [`X11Display`] issues buffered requests on behalf of the shell. A
//! separate reader thread blocks on the same connection and forwards
//! translated events into the dispatch queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::JoinHandle;

use flow_core::{
    DisplayServer, Error, Event, EventMask, Geometry, Hotkey, Result, Rgb, WindowHandle,
    WindowStyle,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::protocol::Event as XEvent;
use x11rb::protocol::xproto::{
    self, ChangeGCAux, ChangeWindowAttributesAux, ConfigureWindowAux, ConnectionExt as _,
    CreateGCAux, CreateWindowAux, GrabMode, Keycode, ModMask, Rectangle, StackMode, WindowClass,
};
use x11rb::rust_connection::RustConnection;

const TEXT_FONT: &[u8] = b"fixed";
const CURSOR_FONT: &[u8] = b"cursor";
/// `XC_left_ptr` in the standard cursor font; its mask is the next glyph
const LEFT_PTR: u16 = 68;
/// `ImageText8` carries at most 255 bytes
const MAX_TEXT_BYTES: usize = 255;

/// Colour each window was last painted with.
///
/// `ImageText8` fills the glyph box with the GC background, so text has to
/// be drawn over the colour most recently filled, not the creation-time one.
#[derive(Debug, Default)]
struct TextBackgrounds(HashMap<WindowHandle, Rgb>);

impl TextBackgrounds {
    fn painted(&mut self, window: WindowHandle, color: Rgb) {
        self.0.insert(window, color);
    }

    fn forget(&mut self, window: WindowHandle) {
        self.0.remove(&window);
    }

    fn behind_text(&self, window: WindowHandle) -> Rgb {
        self.0.get(&window).copied().unwrap_or(Rgb::BLACK)
    }
}

fn display_error(e: impl std::fmt::Display) -> Error {
    Error::Display(e.to_string())
}

pub struct X11Display {
    conn: Arc<RustConnection>,
    root: xproto::Window,
    root_visual: xproto::Visualid,
    width: u16,
    height: u16,
    gc: xproto::Gcontext,
    backgrounds: TextBackgrounds,
    keycodes: HashMap<Hotkey, Vec<Keycode>>,
}

impl X11Display {
    /// Connect to `display_name`, or `$DISPLAY` when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] if the server is unreachable or refuses
    /// the graphics context.
    pub fn connect(display_name: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = RustConnection::connect(display_name).map_err(display_error)?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::Display(format!("No screen {screen_num}")))?;
        let root = screen.root;
        let root_visual = screen.root_visual;
        let (width, height) = (screen.width_in_pixels, screen.height_in_pixels);
        info!("Connected to X display, screen {screen_num} is {width}x{height}");

        let font = conn.generate_id().map_err(display_error)?;
        conn.open_font(font, TEXT_FONT).map_err(display_error)?;
        let gc = conn.generate_id().map_err(display_error)?;
        conn.create_gc(
            gc,
            root,
            &CreateGCAux::new()
                .foreground(Rgb::WHITE.0)
                .background(Rgb::BLACK.0)
                .font(font),
        )
        .map_err(display_error)?;
        conn.close_font(font).map_err(display_error)?;

        let keycodes = hotkey_keycodes(&conn)?;

        Ok(Self {
            conn: Arc::new(conn),
            root,
            root_visual,
            width,
            height,
            gc,
            backgrounds: TextBackgrounds::default(),
            keycodes,
        })
    }

    /// Give the root window the standard arrow pointer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Display`] if the cursor font cannot be opened.
    pub fn set_root_cursor(&mut self) -> Result<()> {
        let font = self.conn.generate_id().map_err(display_error)?;
        self.conn
            .open_font(font, CURSOR_FONT)
            .map_err(display_error)?;
        let cursor = self.conn.generate_id().map_err(display_error)?;
        self.conn
            .create_glyph_cursor(
                cursor,
                font,
                font,
                LEFT_PTR,
                LEFT_PTR + 1,
                0,
                0,
                0,
                u16::MAX,
                u16::MAX,
                u16::MAX,
            )
            .map_err(display_error)?;
        self.conn
            .change_window_attributes(self.root, &ChangeWindowAttributesAux::new().cursor(cursor))
            .map_err(display_error)?;
        self.conn.close_font(font).map_err(display_error)?;
        Ok(())
    }

    /// Start the thread that reads events and forwards them to `events`.
    ///
    /// The thread exits when the connection fails or the receiver is
    /// dropped; either way the sender is dropped and the queue closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn_event_reader(&self, events: UnboundedSender<Event>) -> Result<JoinHandle<()>> {
        let conn = Arc::clone(&self.conn);
        let hotkeys: HashMap<Keycode, Hotkey> = self
            .keycodes
            .iter()
            .flat_map(|(hotkey, codes)| codes.iter().map(move |code| (*code, *hotkey)))
            .collect();

        let handle = std::thread::Builder::new()
            .name("x11-events".to_string())
            .spawn(move || read_events(&conn, &hotkeys, &events))?;
        Ok(handle)
    }
}

fn read_events(
    conn: &RustConnection,
    hotkeys: &HashMap<Keycode, Hotkey>,
    events: &UnboundedSender<Event>,
) {
    loop {
        let event = match conn.wait_for_event() {
            Ok(event) => event,
            Err(e) => {
                warn!("X connection lost: {e}");
                return;
            }
        };
        let Some(event) = translate(event, hotkeys) else {
            continue;
        };
        if events.send(event).is_err() {
            debug!("Event queue closed, reader exiting");
            return;
        }
    }
}

fn translate(event: XEvent, hotkeys: &HashMap<Keycode, Hotkey>) -> Option<Event> {
    match event {
        // Only the last of a series of exposes triggers a redraw
        XEvent::Expose(e) if e.count == 0 => Some(Event::Expose {
            window: WindowHandle(e.window),
        }),
        XEvent::ButtonPress(e) => Some(Event::ButtonPress {
            window: WindowHandle(e.event),
            x: e.event_x,
            y: e.event_y,
        }),
        XEvent::KeyPress(e) => hotkeys.get(&e.detail).copied().map(Event::Hotkey),
        XEvent::Error(e) => {
            warn!("X error: {e:?}");
            None
        }
        _ => None,
    }
}

/// Keycodes producing each hotkey's keysym in the current keyboard mapping.
fn hotkey_keycodes(conn: &RustConnection) -> Result<HashMap<Hotkey, Vec<Keycode>>> {
    let setup = conn.setup();
    let (min, max) = (setup.min_keycode, setup.max_keycode);
    let mapping = conn
        .get_keyboard_mapping(min, max - min + 1)
        .map_err(display_error)?
        .reply()
        .map_err(display_error)?;

    let per_keycode = usize::from(mapping.keysyms_per_keycode).max(1);
    let mut keycodes: HashMap<Hotkey, Vec<Keycode>> = HashMap::new();
    for (offset, syms) in mapping.keysyms.chunks(per_keycode).enumerate() {
        let Ok(offset) = u8::try_from(offset) else {
            break;
        };
        let code = min.saturating_add(offset);
        for hotkey in Hotkey::ALL {
            if syms.contains(&hotkey.keysym()) {
                keycodes.entry(hotkey).or_default().push(code);
            }
        }
    }
    debug!("Hotkey keycodes: {keycodes:?}");
    Ok(keycodes)
}

fn x_event_mask(mask: EventMask) -> xproto::EventMask {
    let mut x_mask = xproto::EventMask::NO_EVENT;
    if mask.exposure {
        x_mask = x_mask | xproto::EventMask::EXPOSURE;
    }
    if mask.button_press {
        x_mask = x_mask | xproto::EventMask::BUTTON_PRESS;
    }
    x_mask
}

impl DisplayServer for X11Display {
    fn screen_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn create_window(
        &mut self,
        parent: Option<WindowHandle>,
        geometry: Geometry,
        style: &WindowStyle,
    ) -> Result<WindowHandle> {
        let window = self.conn.generate_id().map_err(display_error)?;
        let parent = parent.map_or(self.root, |p| p.0);
        let aux = CreateWindowAux::new()
            .background_pixel(style.background.0)
            .border_pixel(Rgb::WHITE.0)
            .override_redirect(u32::from(style.override_redirect));
        self.conn
            .create_window(
                COPY_DEPTH_FROM_PARENT,
                window,
                parent,
                geometry.x,
                geometry.y,
                geometry.width,
                geometry.height,
                style.border_width,
                WindowClass::INPUT_OUTPUT,
                self.root_visual,
                &aux,
            )
            .map_err(display_error)?;

        let handle = WindowHandle(window);
        self.backgrounds.painted(handle, style.background);
        Ok(handle)
    }

    fn map_window(&mut self, window: WindowHandle) -> Result<()> {
        self.conn.map_window(window.0).map_err(display_error)?;
        Ok(())
    }

    fn raise_window(&mut self, window: WindowHandle) -> Result<()> {
        self.conn.map_window(window.0).map_err(display_error)?;
        self.conn
            .configure_window(window.0, &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE))
            .map_err(display_error)?;
        Ok(())
    }

    fn destroy_window(&mut self, window: WindowHandle) -> Result<()> {
        self.backgrounds.forget(window);
        self.conn.destroy_window(window.0).map_err(display_error)?;
        Ok(())
    }

    fn select_events(&mut self, window: WindowHandle, mask: EventMask) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().event_mask(x_event_mask(mask));
        self.conn
            .change_window_attributes(window.0, &aux)
            .map_err(display_error)?;
        Ok(())
    }

    fn draw_text(
        &mut self,
        window: WindowHandle,
        x: i16,
        y: i16,
        text: &str,
        color: Rgb,
    ) -> Result<()> {
        let background = self.backgrounds.behind_text(window);
        self.conn
            .change_gc(
                self.gc,
                &ChangeGCAux::new().foreground(color.0).background(background.0),
            )
            .map_err(display_error)?;
        let bytes = text.as_bytes();
        let bytes = &bytes[..bytes.len().min(MAX_TEXT_BYTES)];
        self.conn
            .image_text8(window.0, self.gc, x, y, bytes)
            .map_err(display_error)?;
        Ok(())
    }

    fn fill_rect(&mut self, window: WindowHandle, rect: Geometry, color: Rgb) -> Result<()> {
        self.conn
            .change_gc(self.gc, &ChangeGCAux::new().foreground(color.0))
            .map_err(display_error)?;
        self.backgrounds.painted(window, color);
        let rectangle = Rectangle {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        };
        self.conn
            .poly_fill_rectangle(window.0, self.gc, &[rectangle])
            .map_err(display_error)?;
        Ok(())
    }

    fn grab_hotkey(&mut self, hotkey: Hotkey) -> Result<()> {
        let codes = self
            .keycodes
            .get(&hotkey)
            .filter(|codes| !codes.is_empty())
            .ok_or_else(|| Error::Display(format!("No keycode for {hotkey:?}")))?;
        for &code in codes {
            self.conn
                .grab_key(
                    true,
                    self.root,
                    ModMask::ANY,
                    code,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )
                .map_err(display_error)?
                .check()
                .map_err(display_error)?;
        }
        debug!("Grabbed {hotkey:?} on keycodes {codes:?}");
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.conn.flush().map_err(display_error)
    }
}
