use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::stacks::StackId;

#[derive(Debug, Parser)]
#[command(
    name = "roi-annotate",
    version,
    about = "Annotation projects with stacked rectangular ROIs and cropped training-data export"
)]
pub(super) struct Cli {
    /// Project folder holding Parameters.yml
    #[arg(short, long, global = true, default_value = ".")]
    pub(super) project: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub(super) verbose: bool,

    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Creates the project folder, its annotations folder and an empty record
    Create {
        /// Copy added images into the project's images folder
        #[arg(long)]
        copy_files: bool,
    },
    Info,
    AddFile {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    RemoveFile {
        file: String,
    },
    /// Chooses the channel of a file that is annotated and exported
    Channel {
        file: String,
        channel: String,
    },
    /// Adds square ROIs on `width` consecutive slices, linked as one stack
    AddStack {
        file: String,
        /// Position of the current plane, one value per image axis
        #[arg(long, value_delimiter = ',', required = true)]
        step: Vec<usize>,
        #[arg(long, default_value_t = 3)]
        width: usize,
        #[arg(long, default_value_t = 128)]
        size: usize,
    },
    AddRoi {
        file: String,
        #[arg(long, value_delimiter = ',', required = true)]
        step: Vec<usize>,
        #[arg(long, default_value_t = 128)]
        size: usize,
    },
    /// Drags a ROI; the other members of its stack follow
    MoveRoi {
        file: String,
        index: usize,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        rows: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        cols: f64,
    },
    /// Deletes ROIs; deleting any member of a stack deletes the whole stack
    DeleteRoi {
        file: String,
        #[arg(required = true)]
        indices: Vec<usize>,
    },
    /// Writes a label value over the area of a ROI or of its whole stack
    Paint {
        file: String,
        roi: usize,
        label: u16,
    },
    SaveAnnotations {
        file: String,
        /// Also dump the file's ROI coordinates as CSV
        #[arg(long)]
        rois_csv: bool,
    },
    Export {
        folder: PathBuf,
        /// YAML or JSON file with export settings
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long)]
        source_folder: Option<String>,
        #[arg(long)]
        source_prefix: Option<String>,
        #[arg(long)]
        target_folder: Option<String>,
        #[arg(long)]
        target_prefix: Option<String>,
        /// Do not append the source file name to output names
        #[arg(long)]
        drop_filename: bool,
    },
}

#[derive(Debug, Serialize)]
pub(super) struct ProjectInfo {
    pub(super) root: String,
    pub(super) local_project: bool,
    pub(super) ndim: Option<usize>,
    pub(super) files: Vec<FileInfo>,
}

#[derive(Debug, Serialize)]
pub(super) struct FileInfo {
    pub(super) path: String,
    pub(super) channel: Option<String>,
    pub(super) rois: usize,
    pub(super) stacks: BTreeMap<StackId, Vec<usize>>,
    pub(super) last_stack_id: Option<StackId>,
}
