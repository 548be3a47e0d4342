use std::path::Path;

use crate::model::{DatasetF32, LabelDataset};

use super::{Result, read_dataset, read_labels, write_dataset, write_labels};

pub trait ImageReader {
    fn read(&self, path: &Path) -> Result<DatasetF32>;
    fn read_labels(&self, path: &Path) -> Result<LabelDataset>;
}

pub trait ImageWriter {
    fn write(&self, path: &Path, dataset: &DatasetF32) -> Result<()>;
    fn write_labels(&self, path: &Path, labels: &LabelDataset) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultImageCodec;

impl ImageReader for DefaultImageCodec {
    fn read(&self, path: &Path) -> Result<DatasetF32> {
        read_dataset(path)
    }

    fn read_labels(&self, path: &Path) -> Result<LabelDataset> {
        read_labels(path)
    }
}

impl ImageWriter for DefaultImageCodec {
    fn write(&self, path: &Path, dataset: &DatasetF32) -> Result<()> {
        write_dataset(path, dataset)
    }

    fn write_labels(&self, path: &Path, labels: &LabelDataset) -> Result<()> {
        write_labels(path, labels)
    }
}
