use std::fs;
use std::path::Path;

use tracing::info;

use super::{ProjectError, ProjectRecord, RECORD_FILE, Result};

pub fn load_record(root: impl AsRef<Path>) -> Result<ProjectRecord> {
    let path = root.as_ref().join(RECORD_FILE);
    if !path.is_file() {
        return Err(ProjectError::MissingRecord(path));
    }
    let raw = fs::read_to_string(&path)?;
    let record = serde_yaml::from_str::<ProjectRecord>(&raw)?;
    record.validate()?;
    Ok(record)
}

/// Writes the whole record, replacing whatever was there.
pub fn save_record(root: impl AsRef<Path>, record: &ProjectRecord) -> Result<()> {
    let path = root.as_ref().join(RECORD_FILE);
    let serialized = serde_yaml::to_string(record)?;
    fs::write(&path, serialized)?;
    info!(path = %path.display(), files = record.file_paths.len(), "project record saved");
    Ok(())
}
