use std::path::Path;

use ndarray::{Array, IxDyn};

use crate::export::{ExportError, ExportSource};
use crate::formats::{ImageReader, IoError};
use crate::model::{DatasetF32, LabelDataset, PixelType};
use crate::project::{Project, ProjectFile};

use super::{channel_index, channels_of, select_channel};

/// Reads project files and their saved annotations from disk for export.
pub struct DiskSource<'a, R> {
    project: &'a Project,
    reader: &'a R,
}

impl<'a, R: ImageReader> DiskSource<'a, R> {
    pub fn new(project: &'a Project, reader: &'a R) -> Self {
        Self { project, reader }
    }
}

impl<R: ImageReader> ExportSource for DiskSource<'_, R> {
    fn load(&mut self, file: &ProjectFile) -> crate::export::Result<(DatasetF32, LabelDataset)> {
        let image = self.reader.read(&self.project.resolve(&file.path))?;
        let names = channels_of(&file.stem(), &image);
        let index = channel_index(&names, file.channel.as_deref()).ok_or_else(|| {
            ExportError::UnknownChannel {
                file: file.path.clone(),
                channel: file.channel.clone().unwrap_or_default(),
            }
        })?;
        let image = select_channel(image, index)?;
        let labels = stored_labels(
            self.reader,
            &self.project.annotation_path(&file.path),
            image.shape(),
        )?;
        Ok((image, labels))
    }
}

/// Labels saved at `path`, or zeros when there are none yet.
///
/// Label TIFFs hold at most three axes, so stored labels are reshaped to
/// `shape` when their element counts agree.
pub(crate) fn stored_labels<R: ImageReader + ?Sized>(
    reader: &R,
    path: &Path,
    shape: &[usize],
) -> Result<LabelDataset, IoError> {
    if !path.is_file() {
        return Ok(LabelDataset::zeros_like(shape));
    }
    let labels = reader.read_labels(path)?;
    if labels.shape() == shape {
        return Ok(labels);
    }
    if labels.data.len() != shape.iter().product::<usize>() {
        return Err(IoError::UnsupportedLayout(format!(
            "labels at {} have shape {:?}, image has {shape:?}",
            path.display(),
            labels.shape()
        )));
    }
    let data = Array::from_shape_vec(IxDyn(shape), labels.data.iter().copied().collect())?;
    Ok(LabelDataset::from_data_with_default_metadata(
        data,
        PixelType::U16,
    ))
}
