use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::Roi;
use crate::stacks::{RoiStackIndex, StackId};

use super::{ProjectError, Result};

/// Flat, per-file keyed form of a project as stored in `Parameters.yml`.
///
/// `last_stackID` uses `-1` for a file that never had a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectRecord {
    pub project_path: PathBuf,
    #[serde(default)]
    pub file_paths: Vec<String>,
    #[serde(default)]
    pub channels: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub rois: BTreeMap<String, Vec<Roi>>,
    #[serde(default, rename = "roi_index_to_stackID")]
    pub roi_index_to_stack_id: BTreeMap<String, BTreeMap<usize, StackId>>,
    #[serde(default, rename = "stackID_to_roi_indexes")]
    pub stack_id_to_roi_indexes: BTreeMap<String, BTreeMap<StackId, Vec<usize>>>,
    #[serde(default, rename = "last_stackID")]
    pub last_stack_id: BTreeMap<String, i64>,
    #[serde(default)]
    pub local_project: bool,
    #[serde(default)]
    pub ndim: Option<usize>,
}

impl ProjectRecord {
    pub fn empty(project_path: impl Into<PathBuf>, local_project: bool) -> Self {
        Self {
            project_path: project_path.into(),
            file_paths: Vec::new(),
            channels: BTreeMap::new(),
            rois: BTreeMap::new(),
            roi_index_to_stack_id: BTreeMap::new(),
            stack_id_to_roi_indexes: BTreeMap::new(),
            last_stack_id: BTreeMap::new(),
            local_project,
            ndim: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut files = BTreeSet::new();
        for file in &self.file_paths {
            if !files.insert(file.as_str()) {
                return Err(ProjectError::Invalid(format!("file `{file}` listed twice")));
            }
        }

        let keyed = self
            .channels
            .keys()
            .chain(self.rois.keys())
            .chain(self.roi_index_to_stack_id.keys())
            .chain(self.stack_id_to_roi_indexes.keys())
            .chain(self.last_stack_id.keys());
        for key in keyed {
            if !files.contains(key.as_str()) {
                return Err(ProjectError::Invalid(format!(
                    "entry for `{key}` which is not in file_paths"
                )));
            }
        }

        let mut ndim = self.ndim;
        for (file, rois) in &self.rois {
            for roi in rois {
                match ndim {
                    Some(expected) if expected != roi.ndim() => {
                        return Err(ProjectError::Invalid(format!(
                            "ROI of `{file}` has {} dimensions, project has {expected}",
                            roi.ndim()
                        )));
                    }
                    Some(_) => {}
                    None => ndim = Some(roi.ndim()),
                }
            }
        }

        for file in &self.file_paths {
            self.stack_index(file)?;
        }
        Ok(())
    }

    /// Builds the validated ROI/stack index of one listed file.
    pub fn stack_index(&self, file: &str) -> Result<RoiStackIndex> {
        let last_stack_id = match self.last_stack_id.get(file).copied().unwrap_or(-1) {
            -1 => None,
            value => Some(StackId::try_from(value).map_err(|_| {
                ProjectError::Invalid(format!("last_stackID {value} of `{file}` is out of range"))
            })?),
        };
        RoiStackIndex::from_parts(
            self.rois.get(file).cloned().unwrap_or_default(),
            self.roi_index_to_stack_id
                .get(file)
                .cloned()
                .unwrap_or_default(),
            self.stack_id_to_roi_indexes
                .get(file)
                .cloned()
                .unwrap_or_default(),
            last_stack_id,
        )
        .map_err(|source| ProjectError::Stack {
            file: file.to_string(),
            source,
        })
    }
}
