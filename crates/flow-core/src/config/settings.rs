use crate::Result;
use crate::catalog::{application_dirs, default_data_dirs, parse_search_path};
use crate::display::Rgb;
use crate::hotkey::Hotkey;
use crate::launcher::DEFAULT_SHELL;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Shell configuration, read once at startup from `key=value` lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_wallpaper")]
    pub wallpaper: PathBuf,

    /// Command applying the wallpaper; `{uri}` is replaced by its file URI
    #[serde(default = "default_wallpaper_command")]
    pub wallpaper_command: String,

    /// Taskbar and clock background
    #[serde(default = "default_theme_color")]
    pub theme_color: Rgb,

    #[serde(default = "default_terminal")]
    pub terminal: String,

    #[serde(default = "default_browser")]
    pub browser: String,

    #[serde(default = "default_file_manager")]
    pub file_manager: String,

    /// External settings program; the built-in panel is shown when unset
    #[serde(default, deserialize_with = "optional_text")]
    pub settings: Option<String>,

    /// Launched once at startup when set
    #[serde(default, deserialize_with = "optional_text")]
    pub window_manager: Option<String>,

    /// Interpreter used to run every launched command
    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default = "default_volume_up")]
    pub volume_up: String,

    #[serde(default = "default_volume_down")]
    pub volume_down: String,

    #[serde(default = "default_volume_mute")]
    pub volume_mute: String,

    /// Colon-separated data dirs; `$XDG_DATA_DIRS` when unset
    #[serde(default, deserialize_with = "optional_text")]
    pub search_paths: Option<String>,

    /// Rescan the app catalog every time the menu is shown
    #[serde(default, deserialize_with = "bool_from_text")]
    pub rescan_on_show: bool,
}

fn default_wallpaper() -> PathBuf {
    PathBuf::from("/usr/share/backgrounds/default.jpg")
}
fn default_wallpaper_command() -> String {
    "gsettings set org.gnome.desktop.background picture-uri '{uri}'".to_string()
}
fn default_theme_color() -> Rgb {
    Rgb(0x33_3333)
}
fn default_terminal() -> String {
    "xterm".to_string()
}
fn default_browser() -> String {
    "x-www-browser".to_string()
}
fn default_file_manager() -> String {
    "xdg-open \"$HOME\"".to_string()
}
fn default_shell() -> String {
    DEFAULT_SHELL.to_string()
}
fn default_volume_up() -> String {
    "pactl set-sink-volume @DEFAULT_SINK@ +5%".to_string()
}
fn default_volume_down() -> String {
    "pactl set-sink-volume @DEFAULT_SINK@ -5%".to_string()
}
fn default_volume_mute() -> String {
    "pactl set-sink-mute @DEFAULT_SINK@ toggle".to_string()
}

/// Accept a JSON bool or the usual textual spellings
fn bool_from_text<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(D::Error::custom(format!("expected a boolean, got {other:?}"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

/// An optional string where a blank value means unset
fn optional_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallpaper: default_wallpaper(),
            wallpaper_command: default_wallpaper_command(),
            theme_color: default_theme_color(),
            terminal: default_terminal(),
            browser: default_browser(),
            file_manager: default_file_manager(),
            settings: None,
            window_manager: None,
            shell: default_shell(),
            volume_up: default_volume_up(),
            volume_down: default_volume_down(),
            volume_mute: default_volume_mute(),
            search_paths: None,
            rescan_on_show: false,
        }
    }
}

impl Config {
    /// Load config from file; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map_or_else(|| "config".to_string(), |n| n.to_string_lossy().into_owned());
        Self::parse(&content, &name)
    }

    /// Parse `key=value` lines. Blank lines and `#` comments are skipped;
    /// unknown keys and unusable values are warned about and ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if the cleaned values still fail to deserialize.
    pub fn parse(content: &str, config_name: &str) -> Result<Self> {
        let mut values = Map::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("Ignoring malformed line in {config_name}: {line}");
                continue;
            };
            values.insert(
                key.trim().to_string(),
                Value::String(value.trim().to_string()),
            );
        }

        super::validation::warn_unknown_keys(&mut values, config_name);
        super::validation::drop_invalid_values(&mut values, config_name);
        let config = serde_json::from_value(Value::Object(values))?;
        Ok(config)
    }

    /// The wallpaper command with `{uri}` filled in
    #[must_use]
    pub fn wallpaper_launch_command(&self) -> String {
        let uri = format!("file://{}", self.wallpaper.display());
        self.wallpaper_command.replace("{uri}", &uri)
    }

    /// Volume command bound to `hotkey`, if it is a volume key
    #[must_use]
    pub fn volume_command(&self, hotkey: Hotkey) -> Option<&str> {
        match hotkey {
            Hotkey::VolumeUp => Some(&self.volume_up),
            Hotkey::VolumeDown => Some(&self.volume_down),
            Hotkey::Mute => Some(&self.volume_mute),
            Hotkey::Menu => None,
        }
    }

    /// Data dirs searched for applications, in priority order
    #[must_use]
    pub fn data_dirs(&self) -> Vec<PathBuf> {
        self.search_paths
            .as_deref()
            .map(parse_search_path)
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(default_data_dirs)
    }

    /// Descriptor directories (`<data dir>/applications`)
    #[must_use]
    pub fn application_dirs(&self) -> Vec<PathBuf> {
        application_dirs(&self.data_dirs())
    }
}
