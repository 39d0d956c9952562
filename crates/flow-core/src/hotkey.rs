//! Global hotkeys grabbed on the root window.

/// Keys the shell reacts to regardless of focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    /// Launcher modifier key, opens the app menu
    Menu,
    VolumeUp,
    VolumeDown,
    Mute,
}

impl Hotkey {
    pub const ALL: [Hotkey; 4] = [
        Hotkey::Menu,
        Hotkey::VolumeUp,
        Hotkey::VolumeDown,
        Hotkey::Mute,
    ];

    /// X keysym bound to this hotkey.
    #[must_use]
    pub const fn keysym(self) -> u32 {
        match self {
            Hotkey::Menu => 0xffeb,             // Super_L
            Hotkey::VolumeUp => 0x1008_FF13,   // XF86AudioRaiseVolume
            Hotkey::VolumeDown => 0x1008_FF11, // XF86AudioLowerVolume
            Hotkey::Mute => 0x1008_FF12,       // XF86AudioMute
        }
    }

    #[must_use]
    pub fn from_keysym(keysym: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.keysym() == keysym)
    }
}
