use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimensionality {
    #[serde(rename = "2D")]
    Planar,
    #[serde(rename = "3D")]
    Volume,
}

/// One row of `rois_infos.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub file_path: String,
    pub file_name: String,
    pub image_index: usize,
    pub roi_index: String,
    #[serde(rename = "nD")]
    pub dimensionality: Dimensionality,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub folder: PathBuf,
    pub records: Vec<ExportRecord>,
}

const COLUMNS: [&str; 6] = [
    "file_path",
    "file_name",
    "image_index",
    "roi_index",
    "nD",
    "size",
];

/// Writes the table with its header, even when there are no rows.
pub fn write_rois_infos(path: impl AsRef<Path>, records: &[ExportRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
