use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dispatcher::DEFAULT_RESULT_PREFIX;
use crate::error::PanelError;

// ── Panel settings ──────────────────────────────────────────────

/// Host-level settings for a command panel, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PanelSettings {
    pub version: u32,
    /// Whether newly seen commands start with their parameter rows open.
    #[serde(default)]
    pub expanded_by_default: bool,
    /// Prepended to every logged return value.
    #[serde(default = "default_result_prefix")]
    pub result_prefix: String,
    /// Draw the first target's read-only fields above the commands.
    #[serde(default = "default_true")]
    pub show_read_only_fields: bool,
    /// Emit an info log for every parameter drawn without an editor.
    #[serde(default)]
    pub log_missing_editors: bool,
}

const SETTINGS_VERSION: u32 = 1;

fn default_result_prefix() -> String {
    DEFAULT_RESULT_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            expanded_by_default: false,
            result_prefix: default_result_prefix(),
            show_read_only_fields: true,
            log_missing_editors: false,
        }
    }
}

/// Load settings from `path`. Returns None if the file is missing or cannot be
/// parsed.
pub fn load_settings(path: &Path) -> Option<PanelSettings> {
    if !path.exists() {
        return None;
    }
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            None
        }
    }
}

/// Save settings to `path` as pretty JSON (atomic write).
pub fn save_settings(path: &Path, settings: &PanelSettings) -> Result<(), PanelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    atomic_write(path, json.as_bytes())
}

/// Write to a sibling `.tmp` file, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), PanelError> {
    let mut tmp_name = OsString::from(path.file_name().unwrap_or_default());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
