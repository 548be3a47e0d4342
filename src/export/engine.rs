use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::formats::ImageWriter;
use crate::model::{DatasetF32, LabelDataset};
use crate::project::{Project, ProjectFile};
use crate::stacks::RoiKind;

use super::{
    CropPlan, Dimensionality, ExportError, ExportRecord, ExportReport, ExportSettings,
    ROIS_INFOS_FILE, Result, write_rois_infos,
};

/// Provides the pixels of a project file at export time.
pub trait ExportSource {
    /// The file's selected channel and its annotation labels, both shaped
    /// like the project's ROIs.
    fn load(&mut self, file: &ProjectFile) -> Result<(DatasetF32, LabelDataset)>;
}

/// Crops every standalone ROI and every stack of every file, writing image
/// and annotation TIFFs under `folder` with a running counter.
pub fn export_project(
    project: &Project,
    source: &mut dyn ExportSource,
    writer: &impl ImageWriter,
    folder: impl AsRef<Path>,
    settings: &ExportSettings,
) -> Result<ExportReport> {
    let folder = folder.as_ref();
    let images_dir = folder.join(&settings.source_folder);
    let labels_dir = folder.join(&settings.target_folder);
    fs::create_dir_all(&images_dir)?;
    fs::create_dir_all(&labels_dir)?;

    let mut records = Vec::new();
    for file in project.files() {
        if file.index.is_empty() {
            debug!(file = %file.path, "no ROIs to export");
            continue;
        }
        let (image, labels) = source.load(file)?;
        if image.shape() != labels.shape() {
            return Err(ExportError::ShapeMismatch {
                image: image.shape().to_vec(),
                labels: labels.shape().to_vec(),
            });
        }

        let file_name = file.stem();
        let suffix = if settings.keep_original_filename {
            format!("_{file_name}")
        } else {
            String::new()
        };
        let mut processed = BTreeSet::new();

        for (index, roi) in file.index.rois().iter().enumerate() {
            let (plan, roi_index, dimensionality) = match file.index.roi_kind(index)? {
                RoiKind::Standalone2D => (
                    CropPlan::for_roi(roi, image.shape())?,
                    index.to_string(),
                    Dimensionality::Planar,
                ),
                RoiKind::StackMember(stack) => {
                    if !processed.insert(stack) {
                        continue;
                    }
                    let members = file.index.stack_members(stack)?;
                    let (Some(&first), Some(&last)) = (members.first(), members.last()) else {
                        return Err(ExportError::StackOrder {
                            file: file.path.clone(),
                            stack,
                            index,
                            first: None,
                        });
                    };
                    if first != index {
                        return Err(ExportError::StackOrder {
                            file: file.path.clone(),
                            stack,
                            index,
                            first: Some(first),
                        });
                    }
                    let rois = members
                        .iter()
                        .map(|member| file.index.roi(*member))
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    (
                        CropPlan::for_stack(&rois, image.shape())?,
                        format!("{first}-{last}"),
                        Dimensionality::Volume,
                    )
                }
            };

            let image_crop = plan.apply(&image)?;
            let labels_crop = plan.apply(&labels)?;
            let image_index = records.len();
            writer.write(
                &images_dir.join(format!(
                    "{}{image_index}{suffix}.tiff",
                    settings.source_prefix
                )),
                &image_crop,
            )?;
            writer.write_labels(
                &labels_dir.join(format!(
                    "{}{image_index}{suffix}.tiff",
                    settings.target_prefix
                )),
                &labels_crop,
            )?;

            let size = image_crop
                .shape()
                .iter()
                .map(|extent| extent.to_string())
                .collect::<Vec<_>>()
                .join("x");
            debug!(file = %file.path, roi = %roi_index, %size, image_index, "ROI exported");
            records.push(ExportRecord {
                file_path: file.path.clone(),
                file_name: file_name.clone(),
                image_index,
                roi_index,
                dimensionality,
                size,
            });
        }
    }

    write_rois_infos(folder.join(ROIS_INFOS_FILE), &records)?;
    info!(folder = %folder.display(), crops = records.len(), "export finished");
    Ok(ExportReport {
        folder: folder.to_path_buf(),
        records,
    })
}
