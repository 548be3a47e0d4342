use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Result;

/// Names of the output folders and files of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    pub source_folder: String,
    pub source_prefix: String,
    pub target_folder: String,
    pub target_prefix: String,
    /// Appends `_{file stem}` to every output name.
    pub keep_original_filename: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            source_folder: "source".to_string(),
            source_prefix: "img_".to_string(),
            target_folder: "target".to_string(),
            target_prefix: "target_".to_string(),
            keep_original_filename: true,
        }
    }
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<ExportSettings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let settings = if matches!(extension.as_str(), "yaml" | "yml") {
        serde_yaml::from_str::<ExportSettings>(&raw)?
    } else {
        serde_json::from_str::<ExportSettings>(&raw)?
    };
    Ok(settings)
}
