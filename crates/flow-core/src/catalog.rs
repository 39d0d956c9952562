//! Application catalog built from `.desktop` descriptors.
//!
//! Entries are assigned popup rows in scan order: search directories in the
//! order given, then whatever order the OS lists each directory in. Nothing
//! is sorted or deduplicated.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::layout::{BAND_MARGIN, MENU_FIRST_SLOT, MENU_GEOMETRY, MENU_ROW_HEIGHT};

pub const DESCRIPTOR_SUFFIX: &str = ".desktop";
pub const DEFAULT_DATA_DIRS: &str = "/usr/share:/usr/local/share";

const MAIN_GROUP: &str = "[Desktop Entry]";

static FIELD_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(.)").expect("field code pattern is valid"));

/// One launchable application and its row in the popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    pub display_name: String,
    pub command: String,
    /// Text baseline of this entry inside the popup.
    pub vertical_slot: i16,
    pub source: PathBuf,
}

/// Half-open vertical pixel range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub start: i16,
    pub end: i16,
}

impl Band {
    #[must_use]
    pub fn contains(self, y: i16) -> bool {
        y >= self.start && y < self.end
    }
}

/// Row geometry used to assign slots and derive hit bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    pub first_slot: i16,
    pub row_height: i16,
    /// Height of the popup content area; bounds the number of rows.
    pub content_height: i16,
    pub band_margin: i16,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            first_slot: MENU_FIRST_SLOT,
            row_height: MENU_ROW_HEIGHT,
            content_height: i16::try_from(MENU_GEOMETRY.height).unwrap_or(i16::MAX),
            band_margin: BAND_MARGIN,
        }
    }
}

impl SlotLayout {
    /// Whether a row can start at `slot` without running off the popup.
    #[must_use]
    pub fn accepts(&self, slot: i16) -> bool {
        slot < self.content_height.saturating_sub(self.row_height)
    }

    /// Hit band of the row whose baseline is `slot`.
    #[must_use]
    pub fn band(&self, slot: i16) -> Band {
        Band {
            start: slot.saturating_sub(self.row_height - self.band_margin),
            end: slot.saturating_add(self.band_margin),
        }
    }
}

/// The fields of a descriptor the shell uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub exec: String,
}

/// Parse a descriptor, taking the first `Name=` and `Exec=` found.
///
/// Keys are read before any group header or inside `[Desktop Entry]`.
/// Returns `None` for missing keys, non-application types and hidden entries.
#[must_use]
pub fn parse_descriptor(content: &str) -> Option<Descriptor> {
    let mut in_main_group = true;
    let mut name = None;
    let mut exec = None;
    let mut kind = None;
    let mut hidden = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_main_group = line == MAIN_GROUP;
            continue;
        }
        if !in_main_group {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let slot = match key.trim() {
            "Name" => &mut name,
            "Exec" => &mut exec,
            "Type" => &mut kind,
            "Hidden" => &mut hidden,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.trim().to_string());
        }
    }

    if kind.as_deref().is_some_and(|k| k != "Application") {
        return None;
    }
    if hidden.as_deref().is_some_and(|h| h.eq_ignore_ascii_case("true")) {
        return None;
    }

    let name = name.filter(|n| !n.is_empty())?;
    let exec = strip_field_codes(&exec?);
    if exec.is_empty() {
        return None;
    }

    Some(Descriptor { name, exec })
}

/// Remove `%f`-style field codes from an `Exec=` value; `%%` becomes `%`.
#[must_use]
pub fn strip_field_codes(exec: &str) -> String {
    FIELD_CODE
        .replace_all(exec, |caps: &Captures| match &caps[1] {
            "%" => "%".to_string(),
            "f" | "F" | "u" | "U" | "d" | "D" | "n" | "N" | "i" | "c" | "k" | "v" | "m" => {
                String::new()
            }
            _ => caps[0].to_string(),
        })
        .trim()
        .to_string()
}

/// Split a colon-separated data dir list, dropping empty components.
#[must_use]
pub fn parse_search_path(value: &str) -> Vec<PathBuf> {
    value
        .split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `$XDG_DATA_DIRS`, or the conventional system locations when unset or empty.
#[must_use]
pub fn default_data_dirs() -> Vec<PathBuf> {
    let dirs = std::env::var("XDG_DATA_DIRS")
        .map(|v| parse_search_path(&v))
        .unwrap_or_default();
    if dirs.is_empty() {
        parse_search_path(DEFAULT_DATA_DIRS)
    } else {
        dirs
    }
}

/// Descriptor directories (`<data dir>/applications`) for each data dir.
#[must_use]
pub fn application_dirs(data_dirs: &[PathBuf]) -> Vec<PathBuf> {
    data_dirs.iter().map(|d| d.join("applications")).collect()
}

/// Scans descriptor directories into popup entries.
#[derive(Debug, Clone)]
pub struct AppCatalog {
    dirs: Vec<PathBuf>,
    layout: SlotLayout,
}

impl AppCatalog {
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self::with_layout(dirs, SlotLayout::default())
    }

    #[must_use]
    pub fn with_layout(dirs: Vec<PathBuf>, layout: SlotLayout) -> Self {
        Self { dirs, layout }
    }

    #[must_use]
    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    #[must_use]
    pub fn scan(&self) -> Vec<AppEntry> {
        scan(&self.dirs, &self.layout)
    }
}

/// Scan `dirs` in order, stopping once the popup has no room for another row.
///
/// Unreadable directories contribute nothing; malformed descriptors are skipped.
#[must_use]
pub fn scan<P: AsRef<Path>>(dirs: &[P], layout: &SlotLayout) -> Vec<AppEntry> {
    let mut entries = Vec::new();
    let mut slot = layout.first_slot;

    'dirs: for dir in dirs {
        let dir = dir.as_ref();
        if !layout.accepts(slot) {
            break;
        }

        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Skipping missing app dir {}", dir.display());
                continue;
            }
            Err(e) => {
                warn!("Failed to read app dir {}: {}", dir.display(), e);
                continue;
            }
        };

        for dir_entry in read_dir {
            if !layout.accepts(slot) {
                debug!("App menu full, stopping scan at {}", dir.display());
                break 'dirs;
            }
            let Ok(dir_entry) = dir_entry else {
                continue;
            };
            let path = dir_entry.path();
            let is_descriptor = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(DESCRIPTOR_SUFFIX));
            if !is_descriptor {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("Skipping unreadable descriptor {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(descriptor) = parse_descriptor(&content) else {
                debug!("Skipping malformed descriptor {}", path.display());
                continue;
            };

            entries.push(AppEntry {
                display_name: descriptor.name,
                command: descriptor.exec,
                vertical_slot: slot,
                source: path,
            });
            slot = slot.saturating_add(layout.row_height);
        }
    }

    debug!("Scanned {} app entries", entries.len());
    entries
}
