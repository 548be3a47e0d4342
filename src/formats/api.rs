use std::path::Path;

use crate::model::{DatasetF32, LabelDataset};

use super::raster::{read_common_raster, write_common_raster};
use super::tiff::{read_tiff, read_tiff_labels, write_tiff, write_tiff_labels};
use super::util::extension;
use super::{IoError, Result};

pub fn read_dataset(path: impl AsRef<Path>) -> Result<DatasetF32> {
    let path = path.as_ref();
    let extension = extension(path)?;
    match extension.as_str() {
        "png" | "jpg" | "jpeg" => read_common_raster(path),
        "tif" | "tiff" => read_tiff(path),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn write_dataset(path: impl AsRef<Path>, dataset: &DatasetF32) -> Result<()> {
    let path = path.as_ref();
    let extension = extension(path)?;
    match extension.as_str() {
        "png" | "jpg" | "jpeg" => write_common_raster(path, dataset),
        "tif" | "tiff" => write_tiff(path, dataset),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

/// Label arrays keep their raw integer values, so only TIFF is accepted.
pub fn read_labels(path: impl AsRef<Path>) -> Result<LabelDataset> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "tif" | "tiff" => read_tiff_labels(path),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}

pub fn write_labels(path: impl AsRef<Path>, labels: &LabelDataset) -> Result<()> {
    let path = path.as_ref();
    match extension(path)?.as_str() {
        "tif" | "tiff" => write_tiff_labels(path, labels),
        other => Err(IoError::UnsupportedFormat(other.to_string())),
    }
}
