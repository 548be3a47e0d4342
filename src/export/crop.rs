use std::ops::Range;

use ndarray::{ArrayD, Axis, Slice};

use crate::geometry::Roi;
use crate::model::Dataset;

use super::{ExportError, Result};

/// Hyperrectangle cut out of an N-D array: leading axes pinned to one
/// position and dropped, an optional kept slice range, then rows and columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropPlan {
    pub fixed: Vec<usize>,
    pub slices: Option<Range<usize>>,
    pub rows: Range<usize>,
    pub cols: Range<usize>,
}

impl CropPlan {
    /// Planar crop of a standalone ROI in an array of `shape`.
    pub fn for_roi(roi: &Roi, shape: &[usize]) -> Result<Self> {
        let ndim = check_ndim(roi, shape)?;
        let fixed = roi
            .leading()
            .iter()
            .enumerate()
            .map(|(axis, value)| position(*value, axis, shape[axis]))
            .collect::<Result<Vec<_>>>()?;
        let (rows, cols) = spatial_ranges(roi, shape, ndim)?;
        Ok(Self {
            fixed,
            slices: None,
            rows,
            cols,
        })
    }

    /// Volume crop of a stack whose `members` are ordered by slice. Spatial
    /// bounds come from the first member.
    pub fn for_stack(members: &[&Roi], shape: &[usize]) -> Result<Self> {
        let Some(first) = members.first() else {
            return Err(ExportError::NonContiguousStack(Vec::new()));
        };
        let ndim = check_ndim(first, shape)?;
        if ndim < 3 {
            return Err(ExportError::DimensionMismatch {
                expected: 3,
                found: ndim,
            });
        }
        let slice_axis = ndim - 3;

        let slices = members
            .iter()
            .map(|roi| {
                check_ndim(roi, shape)?;
                position(roi.leading()[slice_axis], slice_axis, shape[slice_axis])
            })
            .collect::<Result<Vec<_>>>()?;
        if slices.windows(2).any(|pair| pair[1] != pair[0] + 1) {
            return Err(ExportError::NonContiguousStack(slices));
        }

        let fixed = first.leading()[..slice_axis]
            .iter()
            .enumerate()
            .map(|(axis, value)| position(*value, axis, shape[axis]))
            .collect::<Result<Vec<_>>>()?;
        let (rows, cols) = spatial_ranges(first, shape, ndim)?;
        Ok(Self {
            fixed,
            slices: Some(slices[0]..slices[slices.len() - 1] + 1),
            rows,
            cols,
        })
    }

    /// Dimensionality of the arrays this plan applies to.
    pub fn source_ndim(&self) -> usize {
        self.fixed.len() + usize::from(self.slices.is_some()) + 2
    }

    /// Shape of the cropped array.
    pub fn shape(&self) -> Vec<usize> {
        self.slices
            .iter()
            .map(|range| range.len())
            .chain([self.rows.len(), self.cols.len()])
            .collect()
    }

    pub fn apply<T: Clone>(&self, dataset: &Dataset<T>) -> Result<Dataset<T>> {
        self.check_fits(dataset.shape())?;
        let mut view = dataset.data.view();
        let mut metadata = dataset.metadata.clone();
        for index in &self.fixed {
            view = view.index_axis_move(Axis(0), *index);
            metadata = metadata.without_axis(0);
        }

        for (axis, range) in self.kept().enumerate() {
            view.slice_axis_inplace(Axis(axis), Slice::from(range.clone()));
        }

        let data = view.to_owned();
        for (dim, size) in metadata.dims.iter_mut().zip(data.shape()) {
            dim.size = *size;
        }
        Ok(Dataset::new(data, metadata)?)
    }

    /// Sets every element inside the plan to `value`.
    pub fn fill<T: Clone>(&self, data: &mut ArrayD<T>, value: T) -> Result<()> {
        self.check_fits(data.shape())?;
        let mut view = data.view_mut();
        for index in &self.fixed {
            view = view.index_axis_move(Axis(0), *index);
        }
        for (axis, range) in self.kept().enumerate() {
            view.slice_axis_inplace(Axis(axis), Slice::from(range.clone()));
        }
        view.fill(value);
        Ok(())
    }

    /// Ranges of the axes that survive the crop, in order.
    fn kept(&self) -> impl Iterator<Item = &Range<usize>> + '_ {
        self.slices.iter().chain([&self.rows, &self.cols])
    }

    fn check_fits(&self, shape: &[usize]) -> Result<()> {
        if shape.len() != self.source_ndim() {
            return Err(ExportError::DimensionMismatch {
                expected: self.source_ndim(),
                found: shape.len(),
            });
        }
        for (axis, index) in self.fixed.iter().enumerate() {
            if *index >= shape[axis] {
                return Err(ExportError::OutOfBounds {
                    axis,
                    value: *index as f64,
                    size: shape[axis],
                });
            }
        }
        for (offset, range) in self.kept().enumerate() {
            let axis = self.fixed.len() + offset;
            if range.end > shape[axis] {
                return Err(ExportError::OutOfBounds {
                    axis,
                    value: range.end as f64,
                    size: shape[axis],
                });
            }
        }
        Ok(())
    }
}

fn check_ndim(roi: &Roi, shape: &[usize]) -> Result<usize> {
    if roi.ndim() != shape.len() {
        return Err(ExportError::DimensionMismatch {
            expected: shape.len(),
            found: roi.ndim(),
        });
    }
    Ok(shape.len())
}

/// Truncates a coordinate to an array position on `axis`.
fn position(value: f64, axis: usize, size: usize) -> Result<usize> {
    let truncated = value.trunc();
    if truncated < 0.0 || truncated >= size as f64 {
        return Err(ExportError::OutOfBounds { axis, value, size });
    }
    Ok(truncated as usize)
}

/// Half-open range from truncated `min` to truncated `max`, both clamped to
/// the axis. A rectangle hanging over either edge keeps its inside part.
fn span(min: f64, max: f64, axis: usize, size: usize) -> Result<Range<usize>> {
    let clamp = |value: f64| (value.trunc().max(0.0) as usize).min(size);
    let (start, end) = (clamp(min), clamp(max));
    if end <= start {
        return Err(ExportError::EmptyCrop { axis });
    }
    Ok(start..end)
}

fn spatial_ranges(roi: &Roi, shape: &[usize], ndim: usize) -> Result<(Range<usize>, Range<usize>)> {
    let bounds = roi.spatial_bounds();
    let rows = span(bounds.row_min, bounds.row_max, ndim - 2, shape[ndim - 2])?;
    let cols = span(bounds.col_min, bounds.col_max, ndim - 1, shape[ndim - 1])?;
    Ok((rows, cols))
}
