use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use wordquiz_core::CoreError;

fn default_quota() -> usize {
    10
}

/// Session defaults; per-wordbook overrides live in the wordbook
/// registry and CLI flags override both.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_quota")]
    pub new_word_count: usize,
    #[serde(default = "default_quota")]
    pub review_word_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            new_word_count: default_quota(),
            review_word_count: default_quota(),
        }
    }
}

/// Missing or unreadable settings fall back to defaults; a malformed
/// file is reported, not fatal.
pub fn load_settings(root: &Path) -> Settings {
    let path = crate::paths::settings_file_in(root);
    match fs::read_to_string(&path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

pub fn save_settings(root: &Path, settings: &Settings) -> Result<(), CoreError> {
    fs::create_dir_all(root).map_err(|_| CoreError::Storage("io"))?;
    let path = crate::paths::settings_file_in(root);
    let json = serde_json::to_vec_pretty(settings).map_err(|_| CoreError::Storage("serialize"))?;
    let mut tmp = NamedTempFile::new_in(root).map_err(|_| CoreError::Storage("io"))?;
    tmp.write_all(&json).map_err(|_| CoreError::Storage("io"))?;
    tmp.flush().map_err(|_| CoreError::Storage("io"))?;
    tmp.persist(&path).map_err(|_| CoreError::Storage("io"))?;
    Ok(())
}
