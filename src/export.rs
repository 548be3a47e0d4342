//! Cropped image/annotation pairs for training, one per standalone ROI or
//! per stack, plus a `rois_infos.csv` table describing them.

mod crop;
mod engine;
mod error;
mod report;
mod settings;


pub use crop::CropPlan;
pub use engine::{ExportSource, export_project};
pub use error::{ExportError, Result};
pub use report::{Dimensionality, ExportRecord, ExportReport, write_rois_infos};
pub use settings::{ExportSettings, load_settings};

pub const ROIS_INFOS_FILE: &str = "rois_infos.csv";
