use ndarray::{ArrayD, Axis};

use super::{AxisKind, CoreError, Metadata, PixelType, Result};

#[derive(Debug, Clone)]
pub struct Dataset<T> {
    pub data: ArrayD<T>,
    pub metadata: Metadata,
}

impl<T> Dataset<T> {
    pub fn new(data: ArrayD<T>, metadata: Metadata) -> Result<Self> {
        metadata.validate_shape(data.shape())?;
        Ok(Self { data, metadata })
    }

    pub fn from_data_with_default_metadata(data: ArrayD<T>, pixel_type: PixelType) -> Self {
        let metadata = Metadata::from_shape(data.shape(), pixel_type);
        Self { data, metadata }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn axis_index(&self, axis: AxisKind) -> Option<usize> {
        self.metadata.axis_index(axis)
    }
}

impl<T: Clone> Dataset<T> {
    /// Copies out the hyperplane at `index` along `axis`, dropping that axis.
    pub fn index_axis(&self, axis: usize, index: usize) -> Result<Self> {
        let size = self.shape().get(axis).copied().unwrap_or(0);
        if index >= size {
            return Err(CoreError::AxisIndexOutOfRange { axis, index, size });
        }
        let data = self.data.index_axis(Axis(axis), index).to_owned();
        Ok(Self {
            data,
            metadata: self.metadata.without_axis(axis),
        })
    }
}

impl Dataset<u16> {
    /// Empty label array matching `shape`.
    pub fn zeros_like(shape: &[usize]) -> Self {
        Self::from_data_with_default_metadata(ArrayD::zeros(shape), PixelType::U16)
    }
}

pub type DatasetF32 = Dataset<f32>;
pub type LabelDataset = Dataset<u16>;
