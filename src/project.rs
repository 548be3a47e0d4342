//! On-disk annotation project: the `Parameters.yml` record, the files it
//! lists and the folders kept next to it.

mod error;
mod io;
mod record;
mod state;


pub use error::{ProjectError, Result};
pub use io::{load_record, save_record};
pub use record::ProjectRecord;
pub use state::{Project, ProjectFile};

pub const RECORD_FILE: &str = "Parameters.yml";
pub const ANNOTATIONS_DIR: &str = "annotations";
pub const IMAGES_DIR: &str = "images";
pub const ANNOTATION_SUFFIX: &str = "_annot.tif";
pub const ROIS_CSV_SUFFIX: &str = "_rois.csv";
