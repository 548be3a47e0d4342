use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::export::{CropPlan, ExportReport, ExportSettings, export_project};
use crate::formats::{DefaultImageCodec, ImageReader, ImageWriter};
use crate::model::{DatasetF32, LabelDataset};
use crate::project::{Project, ProjectFile};
use crate::stacks::{RoiKind, ShapeChange, StackId};
use crate::viewer::ShapeLayer;

use super::source::stored_labels;
use super::{AppError, DiskSource, Result, channel_index, channels_of, select_channel};

/// The file currently shown in the viewer.
#[derive(Debug, Clone)]
pub struct OpenFile {
    pub path: String,
    pub channels: Vec<String>,
    /// Shape of one channel, which is also the shape of the labels.
    pub shape: Vec<usize>,
    labels: LabelDataset,
}

impl OpenFile {
    pub fn labels(&self) -> &LabelDataset {
        &self.labels
    }
}

/// Single owner of an open project. Every change to the project is written
/// back to its record before the call returns.
#[derive(Debug)]
pub struct ProjectSession<C = DefaultImageCodec> {
    project: Project,
    codec: C,
    open: Option<OpenFile>,
}

impl ProjectSession<DefaultImageCodec> {
    pub fn create(root: impl Into<PathBuf>, local_project: bool) -> Result<Self> {
        Ok(Self::with_codec(
            Project::create(root, local_project)?,
            DefaultImageCodec,
        ))
    }

    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_codec(Project::load(root)?, DefaultImageCodec))
    }
}

impl<C: ImageReader + ImageWriter> ProjectSession<C> {
    pub fn with_codec(project: Project, codec: C) -> Self {
        Self {
            project,
            codec,
            open: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn current(&self) -> Option<&OpenFile> {
        self.open.as_ref()
    }

    pub fn add_file(&mut self, source: impl AsRef<Path>) -> Result<Option<String>> {
        let added = self.project.add_file(source)?;
        if added.is_some() {
            self.project.save()?;
        }
        Ok(added)
    }

    /// Removes a file from the project, closing it first if it is open.
    pub fn remove_file(&mut self, path: &str, layer: &mut dyn ShapeLayer) -> Result<ProjectFile> {
        if self.open.as_ref().is_some_and(|open| open.path == path) {
            self.open = None;
            layer.clear();
        }
        let removed = self.project.remove_file(path)?;
        self.project.save()?;
        Ok(removed)
    }

    /// Shows `path`: the annotations of the previously open file are saved,
    /// its labels are loaded (or started empty) and its ROIs fill `layer`.
    ///
    /// A file whose dimensionality differs from the project's is refused
    /// without touching the current state.
    pub fn open_file(&mut self, path: &str, layer: &mut dyn ShapeLayer) -> Result<&OpenFile> {
        let file = self.project.file(path)?;
        let stem = file.stem();
        let rois = file.index.rois().to_vec();

        let image = self.codec.read(&self.project.resolve(path))?;
        let channels = channels_of(&stem, &image);
        let plane = select_channel(image, 0)?;
        let shape = plane.shape().to_vec();
        if let Some(expected) = self.project.ndim() {
            if expected != shape.len() {
                return Err(AppError::Dimensionality {
                    file: path.to_string(),
                    expected,
                    found: shape.len(),
                });
            }
        }

        self.save_annotations()?;
        let labels = stored_labels(&self.codec, &self.project.annotation_path(path), &shape)?;
        self.project.set_ndim(shape.len())?;
        self.project.save()?;

        layer.clear();
        layer.add_rectangles(rois);
        info!(file = %path, ?shape, channels = channels.len(), "file opened");
        Ok(&*self.open.insert(OpenFile {
            path: path.to_string(),
            channels,
            shape,
            labels,
        }))
    }

    /// Closes the open file after saving its annotations.
    pub fn close_file(&mut self, layer: &mut dyn ShapeLayer) -> Result<()> {
        self.save_annotations()?;
        self.open = None;
        layer.clear();
        Ok(())
    }

    /// Chooses the channel of `path` that is annotated and exported.
    pub fn select_channel(&mut self, path: &str, channel: &str) -> Result<()> {
        let channels = match self.open.as_ref().filter(|open| open.path == path) {
            Some(open) => open.channels.clone(),
            None => {
                let stem = self.project.file(path)?.stem();
                let image = self.codec.read(&self.project.resolve(path))?;
                channels_of(&stem, &image)
            }
        };
        if channel_index(&channels, Some(channel)).is_none() {
            return Err(AppError::UnknownChannel {
                file: path.to_string(),
                channel: channel.to_string(),
            });
        }
        self.project.set_channel(path, Some(channel.to_string()))?;
        self.project.save()?;
        Ok(())
    }

    /// Image of the selected channel of the open file.
    pub fn channel_image(&self) -> Result<DatasetF32> {
        let open = self.open.as_ref().ok_or(AppError::NoOpenFile)?;
        let file = self.project.file(&open.path)?;
        let image = self.codec.read(&self.project.resolve(&open.path))?;
        let index = channel_index(&open.channels, file.channel.as_deref()).ok_or_else(|| {
            AppError::UnknownChannel {
                file: open.path.clone(),
                channel: file.channel.clone().unwrap_or_default(),
            }
        })?;
        Ok(select_channel(image, index)?)
    }

    /// Brings the open file's ROI bookkeeping in line with `layer` after the
    /// viewer reported a change, then persists the project.
    pub fn shapes_changed(&mut self, layer: &mut dyn ShapeLayer) -> Result<ShapeChange> {
        let path = self.open_path()?;
        let change = self.project.file_mut(&path)?.index.reconcile(layer)?;
        if change != ShapeChange::Unchanged {
            self.project.save()?;
        }
        debug!(file = %path, ?change, "shapes changed");
        Ok(change)
    }

    /// Adds a square ROI of side `size` on `current_step`, spread over
    /// `width` slices as a stack when `width > 1`.
    pub fn add_fixed_stack(
        &mut self,
        layer: &mut dyn ShapeLayer,
        current_step: &[usize],
        width: usize,
        size: usize,
    ) -> Result<Option<StackId>> {
        let path = self.open_path()?;
        if let Some(expected) = self.project.ndim() {
            if expected != current_step.len() {
                return Err(AppError::Dimensionality {
                    file: path,
                    expected,
                    found: current_step.len(),
                });
            }
        }
        let stack = self
            .project
            .file_mut(&path)?
            .index
            .add_fixed_stack(layer, current_step, width, size)?;
        self.project.save()?;
        Ok(stack)
    }

    /// Writes `label` into the open file's labels over the area of ROI
    /// `roi`, through every slice of its stack if it has one.
    pub fn paint_roi(&mut self, roi: usize, label: u16) -> Result<()> {
        let path = self.open_path()?;
        let index = &self.project.file(&path)?.index;
        let rois = match index.roi_kind(roi)? {
            RoiKind::Standalone2D => vec![index.roi(roi)?],
            RoiKind::StackMember(stack) => index
                .stack_members(stack)?
                .into_iter()
                .map(|member| index.roi(member))
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };
        let open = self.open.as_mut().ok_or(AppError::NoOpenFile)?;
        for member in rois {
            let plan = CropPlan::for_roi(member, &open.shape)?;
            plan.fill(&mut open.labels.data, label)?;
        }
        debug!(file = %path, roi, label, "ROI painted");
        Ok(())
    }

    pub fn labels_mut(&mut self) -> Result<&mut LabelDataset> {
        Ok(&mut self.open.as_mut().ok_or(AppError::NoOpenFile)?.labels)
    }

    /// Writes the open file's labels to its annotation file. Does nothing
    /// when no file is open.
    pub fn save_annotations(&self) -> Result<()> {
        let Some(open) = &self.open else {
            return Ok(());
        };
        let path = self.project.annotation_path(&open.path);
        self.codec.write_labels(&path, &open.labels)?;
        info!(file = %open.path, path = %path.display(), "annotations saved");
        Ok(())
    }

    /// Saves the open annotations, then exports every file of the project.
    pub fn export(
        &self,
        folder: impl AsRef<Path>,
        settings: &ExportSettings,
    ) -> Result<ExportReport> {
        self.save_annotations()?;
        let mut source = DiskSource::new(&self.project, &self.codec);
        Ok(export_project(
            &self.project,
            &mut source,
            &self.codec,
            folder,
            settings,
        )?)
    }

    /// Dumps the open file's ROIs, one flat coordinate row each, next to its
    /// annotations. Returns `None` when there are no ROIs.
    pub fn rois_csv(&self) -> Result<Option<PathBuf>> {
        let open = self.open.as_ref().ok_or(AppError::NoOpenFile)?;
        let rois = self.project.file(&open.path)?.index.rois();
        let Some(first) = rois.first() else {
            return Ok(None);
        };
        let path = self.project.rois_csv_path(&open.path);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record((0..first.as_flat().len()).map(|column| column.to_string()))?;
        for roi in rois {
            writer.write_record(roi.as_flat().iter().map(|value| value.to_string()))?;
        }
        writer.flush().map_err(csv::Error::from)?;
        info!(path = %path.display(), rois = rois.len(), "ROI table written");
        Ok(Some(path))
    }

    fn open_path(&self) -> Result<String> {
        self.open
            .as_ref()
            .map(|open| open.path.clone())
            .ok_or(AppError::NoOpenFile)
    }
}
