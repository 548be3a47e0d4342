use std::path::Path;

use crate::model::{AxisKind, Dataset, DatasetF32, Dim, PixelType};
use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use ndarray::{Array, IxDyn};

use super::util::{metadata_for_dims, to_u8_samples};
use super::{IoError, Result};

pub(crate) fn read_common_raster(path: &Path) -> Result<DatasetF32> {
    let image = image::open(path)?;
    match image {
        DynamicImage::ImageLuma8(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer
                .pixels()
                .map(|pixel| f32::from(pixel.0[0]) / 255.0)
                .collect::<Vec<_>>();
            let data = Array::from_shape_vec((height as usize, width as usize), values)?.into_dyn();
            let metadata = metadata_for_dims(
                path,
                vec![
                    Dim::new(AxisKind::Y, height as usize),
                    Dim::new(AxisKind::X, width as usize),
                ],
                PixelType::U8,
            );
            Ok(Dataset::new(data, metadata)?)
        }
        DynamicImage::ImageLuma16(buffer) => {
            let (width, height) = buffer.dimensions();
            let values = buffer
                .pixels()
                .map(|pixel| f32::from(pixel.0[0]) / 65_535.0)
                .collect::<Vec<_>>();
            let data = Array::from_shape_vec((height as usize, width as usize), values)?.into_dyn();
            let metadata = metadata_for_dims(
                path,
                vec![
                    Dim::new(AxisKind::Y, height as usize),
                    Dim::new(AxisKind::X, width as usize),
                ],
                PixelType::U16,
            );
            Ok(Dataset::new(data, metadata)?)
        }
        other => {
            // Colour rasters are split into planes so the spatial axes stay last.
            let rgb = other.to_rgb8();
            let (width, height) = rgb.dimensions();
            let plane = height as usize * width as usize;
            let mut values = vec![0.0_f32; plane * 3];
            for (offset, pixel) in rgb.pixels().enumerate() {
                for channel in 0..3 {
                    values[channel * plane + offset] = f32::from(pixel.0[channel]) / 255.0;
                }
            }
            let data =
                Array::from_shape_vec((3usize, height as usize, width as usize), values)?.into_dyn();
            let mut metadata = metadata_for_dims(
                path,
                vec![
                    Dim::new(AxisKind::Channel, 3),
                    Dim::new(AxisKind::Y, height as usize),
                    Dim::new(AxisKind::X, width as usize),
                ],
                PixelType::U8,
            );
            metadata.channel_names = vec!["R".into(), "G".into(), "B".into()];
            Ok(Dataset::new(data, metadata)?)
        }
    }
}

pub(crate) fn write_common_raster(path: &Path, dataset: &DatasetF32) -> Result<()> {
    let shape = dataset.shape();
    let gray_plane = match shape {
        [_, _] => true,
        [1, _, _] => true,
        _ => false,
    };

    if gray_plane {
        let (height, width) = (shape[shape.len() - 2], shape[shape.len() - 1]);
        let values = dataset.data.iter().copied().collect::<Vec<_>>();
        let bytes = to_u8_samples(&values);
        let image = ImageBuffer::<Luma<u8>, _>::from_vec(width as u32, height as u32, bytes)
            .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
        image.save(path)?;
        return Ok(());
    }

    if let &[3, height, width] = shape {
        let mut bytes = Vec::with_capacity(height * width * 3);
        for y in 0..height {
            for x in 0..width {
                for channel in 0..3 {
                    let value = dataset.data[IxDyn(&[channel, y, x])];
                    bytes.push((value.clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
        }
        let image = ImageBuffer::<Rgb<u8>, _>::from_vec(width as u32, height as u32, bytes)
            .ok_or_else(|| IoError::UnsupportedLayout("failed to construct RGB image".into()))?;
        image.save(path)?;
        return Ok(());
    }

    Err(IoError::UnsupportedLayout(format!(
        "raster write expects [Y, X] or [C, Y, X], found shape {shape:?}"
    )))
}
