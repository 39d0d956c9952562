//! Config validation - warns about unknown keys and drops unusable values

use serde_json::{Map, Value};
use tracing::warn;

use super::settings::Config;

pub(crate) const KNOWN_KEYS: &[&str] = &[
    "wallpaper",
    "wallpaperCommand",
    "themeColor",
    "terminal",
    "browser",
    "fileManager",
    "settings",
    "windowManager",
    "shell",
    "volumeUp",
    "volumeDown",
    "volumeMute",
    "searchPaths",
    "rescanOnShow",
];

/// Warn about keys the shell does not know and remove them.
pub fn warn_unknown_keys(values: &mut Map<String, Value>, config_name: &str) {
    values.retain(|key, _| {
        let known = KNOWN_KEYS.contains(&key.as_str());
        if !known {
            warn!("Unknown config key in {config_name}: {key}");
        }
        known
    });
}

/// Remove keys whose value does not deserialize, so one bad line only
/// costs that key its override.
pub fn drop_invalid_values(values: &mut Map<String, Value>, config_name: &str) {
    values.retain(|key, value| {
        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        match serde_json::from_value::<Config>(Value::Object(single)) {
            Ok(_) => true,
            Err(e) => {
                warn!("Ignoring invalid value for {key} in {config_name}: {e}");
                false
            }
        }
    });
}
