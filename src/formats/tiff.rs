use std::fs::File;
use std::path::Path;

use crate::model::{Dataset, DatasetF32, LabelDataset, PixelType};
use ndarray::{Array, IxDyn};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype};

use super::util::{metadata_for_dims, page_dims, to_u8_samples, to_u16_samples};
use super::{IoError, Result};

/// Decodes every page of a TIFF into one flat buffer, checking that all
/// pages share the first page's dimensions.
fn read_pages<T>(
    path: &Path,
    mut decode: impl FnMut(DecodingResult, usize) -> Result<Vec<T>>,
) -> Result<(Vec<T>, usize, usize, usize)> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;
    let plane = width as usize * height as usize;
    let mut values = Vec::new();
    let mut pages = 0;

    loop {
        let page = decode(decoder.read_image()?, plane)?;
        values.extend(page);
        pages += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
        let (other_width, other_height) = decoder.dimensions()?;
        if other_width != width || other_height != height {
            return Err(IoError::UnsupportedLayout(
                "TIFF pages must have identical dimensions".into(),
            ));
        }
    }

    Ok((values, pages, height as usize, width as usize))
}

fn check_plane(len: usize, plane: usize) -> Result<()> {
    if len != plane {
        return Err(IoError::UnsupportedLayout(
            "TIFF RGB/alpha pages are not yet supported".into(),
        ));
    }
    Ok(())
}

pub(crate) fn read_tiff(path: &Path) -> Result<DatasetF32> {
    let mut pixel_type = PixelType::F32;
    let (values, pages, height, width) = read_pages(path, |page, plane| {
        let values = match page {
            DecodingResult::U8(buffer) => {
                pixel_type = PixelType::U8;
                check_plane(buffer.len(), plane)?;
                buffer
                    .into_iter()
                    .map(|value| f32::from(value) / 255.0)
                    .collect::<Vec<_>>()
            }
            DecodingResult::U16(buffer) => {
                pixel_type = PixelType::U16;
                check_plane(buffer.len(), plane)?;
                buffer
                    .into_iter()
                    .map(|value| f32::from(value) / 65_535.0)
                    .collect::<Vec<_>>()
            }
            DecodingResult::F32(buffer) => {
                pixel_type = PixelType::F32;
                check_plane(buffer.len(), plane)?;
                buffer
            }
            other => {
                return Err(IoError::UnsupportedLayout(format!(
                    "unsupported TIFF sample type: {other:?}"
                )));
            }
        };
        Ok(values)
    })?;

    let dims = page_dims(pages, height, width);
    let shape = dims.iter().map(|dim| dim.size).collect::<Vec<_>>();
    let data = Array::from_shape_vec(IxDyn(&shape), values)?;
    let metadata = metadata_for_dims(path, dims, pixel_type);
    Ok(Dataset::new(data, metadata)?)
}

pub(crate) fn read_tiff_labels(path: &Path) -> Result<LabelDataset> {
    let (values, pages, height, width) = read_pages(path, |page, plane| {
        let values = match page {
            DecodingResult::U8(buffer) => {
                check_plane(buffer.len(), plane)?;
                buffer.into_iter().map(u16::from).collect::<Vec<_>>()
            }
            DecodingResult::U16(buffer) => {
                check_plane(buffer.len(), plane)?;
                buffer
            }
            other => {
                return Err(IoError::UnsupportedLayout(format!(
                    "label TIFF must hold 8- or 16-bit integers, found {other:?}"
                )));
            }
        };
        Ok(values)
    })?;

    let dims = page_dims(pages, height, width);
    let shape = dims.iter().map(|dim| dim.size).collect::<Vec<_>>();
    let data = Array::from_shape_vec(IxDyn(&shape), values)?;
    let metadata = metadata_for_dims(path, dims, PixelType::U16);
    Ok(Dataset::new(data, metadata)?)
}

/// Height, width and page count of an array whose last two axes are the
/// image plane. Every leading axis is flattened into the page series.
fn plane_layout(shape: &[usize]) -> Result<(u32, u32, usize)> {
    if shape.len() < 2 {
        return Err(IoError::UnsupportedLayout(format!(
            "TIFF needs at least [Y, X], found shape {shape:?}"
        )));
    }
    let height = shape[shape.len() - 2];
    let width = shape[shape.len() - 1];
    let pages = shape[..shape.len() - 2].iter().product::<usize>();
    Ok((height as u32, width as u32, pages))
}

pub(crate) fn write_tiff(path: &Path, dataset: &DatasetF32) -> Result<()> {
    let (height, width, pages) = plane_layout(dataset.shape())?;
    let values = dataset.data.iter().copied().collect::<Vec<_>>();
    let plane = height as usize * width as usize;
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;

    for page in values.chunks(plane.max(1)).take(pages) {
        match dataset.metadata.pixel_type {
            PixelType::U8 => {
                let page = to_u8_samples(page);
                let image = encoder.new_image::<colortype::Gray8>(width, height)?;
                image.write_data(&page)?;
            }
            PixelType::U16 => {
                let page = to_u16_samples(page);
                let image = encoder.new_image::<colortype::Gray16>(width, height)?;
                image.write_data(&page)?;
            }
            PixelType::F32 => {
                let image = encoder.new_image::<colortype::Gray32Float>(width, height)?;
                image.write_data(page)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn write_tiff_labels(path: &Path, labels: &LabelDataset) -> Result<()> {
    let (height, width, pages) = plane_layout(labels.shape())?;
    let values = labels.data.iter().copied().collect::<Vec<_>>();
    let plane = height as usize * width as usize;
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file)?;

    for page in values.chunks(plane.max(1)).take(pages) {
        let image = encoder.new_image::<colortype::Gray16>(width, height)?;
        image.write_data(page)?;
    }
    Ok(())
}
