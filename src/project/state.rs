use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::stacks::RoiStackIndex;

use super::{
    ANNOTATION_SUFFIX, ANNOTATIONS_DIR, IMAGES_DIR, ProjectError, ProjectRecord, ROIS_CSV_SUFFIX,
    Result, load_record, save_record,
};

/// One image of the project with its channel choice and ROI bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFile {
    /// Path as listed in the record; relative paths are below the project root.
    pub path: String,
    pub channel: Option<String>,
    pub index: RoiStackIndex,
}

impl ProjectFile {
    fn new(path: String) -> Self {
        Self {
            path,
            channel: None,
            index: RoiStackIndex::new(),
        }
    }

    pub fn stem(&self) -> String {
        stem_of(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    root: PathBuf,
    files: Vec<ProjectFile>,
    local_project: bool,
    ndim: Option<usize>,
}

impl Project {
    /// Creates the project folder layout and an empty record.
    pub fn create(root: impl Into<PathBuf>, local_project: bool) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(ANNOTATIONS_DIR))?;
        if local_project {
            fs::create_dir_all(root.join(IMAGES_DIR))?;
        }
        let project = Self {
            root,
            files: Vec::new(),
            local_project,
            ndim: None,
        };
        project.save()?;
        info!(root = %project.root.display(), local_project, "project created");
        Ok(project)
    }

    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let record = load_record(&root)?;
        let project = Self::from_record(root, record)?;
        info!(
            root = %project.root.display(),
            files = project.files.len(),
            "project loaded"
        );
        Ok(project)
    }

    pub fn save(&self) -> Result<()> {
        save_record(&self.root, &self.to_record())
    }

    /// The record's own `project_path` is informational; `root` wins.
    pub fn from_record(root: impl Into<PathBuf>, record: ProjectRecord) -> Result<Self> {
        record.validate()?;
        let files = record
            .file_paths
            .iter()
            .map(|path| {
                Ok(ProjectFile {
                    path: path.clone(),
                    channel: record.channels.get(path).cloned().flatten(),
                    index: record.stack_index(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let ndim = record.ndim.or_else(|| {
            files
                .iter()
                .find_map(|file| file.index.rois().first().map(|roi| roi.ndim()))
        });
        Ok(Self {
            root: root.into(),
            files,
            local_project: record.local_project,
            ndim,
        })
    }

    pub fn to_record(&self) -> ProjectRecord {
        let mut record = ProjectRecord::empty(&self.root, self.local_project);
        record.ndim = self.ndim;
        for file in &self.files {
            let key = file.path.clone();
            record.file_paths.push(key.clone());
            record.channels.insert(key.clone(), file.channel.clone());
            record.rois.insert(key.clone(), file.index.rois().to_vec());
            record
                .roi_index_to_stack_id
                .insert(key.clone(), file.index.roi_to_stack().clone());
            record
                .stack_id_to_roi_indexes
                .insert(key.clone(), file.index.stack_to_rois().clone());
            record.last_stack_id.insert(
                key,
                file.index.last_stack_id().map_or(-1, i64::from),
            );
        }
        record
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn local_project(&self) -> bool {
        self.local_project
    }

    pub fn ndim(&self) -> Option<usize> {
        self.ndim
    }

    /// Fixes the project dimensionality; it cannot change once set.
    pub fn set_ndim(&mut self, ndim: usize) -> Result<()> {
        match self.ndim {
            Some(existing) if existing != ndim => Err(ProjectError::Invalid(format!(
                "project images have {existing} dimensions, not {ndim}"
            ))),
            _ => {
                self.ndim = Some(ndim);
                Ok(())
            }
        }
    }

    pub fn file(&self, path: &str) -> Result<&ProjectFile> {
        self.files
            .iter()
            .find(|file| file.path == path)
            .ok_or_else(|| ProjectError::UnknownFile(path.to_string()))
    }

    pub fn file_mut(&mut self, path: &str) -> Result<&mut ProjectFile> {
        self.files
            .iter_mut()
            .find(|file| file.path == path)
            .ok_or_else(|| ProjectError::UnknownFile(path.to_string()))
    }

    /// Adds `source` to the project and returns its record key, or `None`
    /// when it is already listed. In copy-files mode the image is copied to
    /// `images/` and listed relative to the root.
    pub fn add_file(&mut self, source: impl AsRef<Path>) -> Result<Option<String>> {
        let source = source.as_ref();
        let key = if self.local_project {
            let name = source.file_name().ok_or_else(|| {
                ProjectError::Invalid(format!("`{}` has no file name", source.display()))
            })?;
            let images = self.root.join(IMAGES_DIR);
            fs::create_dir_all(&images)?;
            let destination = images.join(name);
            if !destination.exists() {
                fs::copy(source, &destination)?;
            }
            format!("{IMAGES_DIR}/{}", name.to_string_lossy())
        } else {
            source.to_string_lossy().into_owned()
        };

        if self.files.iter().any(|file| file.path == key) {
            debug!(file = %key, "file already in project");
            return Ok(None);
        }
        info!(file = %key, "file added to project");
        self.files.push(ProjectFile::new(key.clone()));
        Ok(Some(key))
    }

    /// Drops a file with its ROIs and stacks and deletes its annotation file.
    pub fn remove_file(&mut self, path: &str) -> Result<ProjectFile> {
        let position = self
            .files
            .iter()
            .position(|file| file.path == path)
            .ok_or_else(|| ProjectError::UnknownFile(path.to_string()))?;
        let annotation = self.annotation_path(path);
        if annotation.exists() {
            fs::remove_file(&annotation)?;
        }
        info!(file = %path, "file removed from project");
        Ok(self.files.remove(position))
    }

    pub fn set_channel(&mut self, path: &str, channel: Option<String>) -> Result<()> {
        self.file_mut(path)?.channel = channel;
        Ok(())
    }

    /// Location of a listed file on disk.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }

    pub fn annotation_path(&self, path: &str) -> PathBuf {
        self.sidecar_path(path, ANNOTATION_SUFFIX)
    }

    pub fn rois_csv_path(&self, path: &str) -> PathBuf {
        self.sidecar_path(path, ROIS_CSV_SUFFIX)
    }

    fn sidecar_path(&self, path: &str, suffix: &str) -> PathBuf {
        self.root
            .join(ANNOTATIONS_DIR)
            .join(format!("{}{suffix}", stem_of(path)))
    }
}

fn stem_of(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
