//! The open project as seen by a viewer: one session owns the project, the
//! image codec and the labels of the file on screen.

mod channels;
mod error;
mod session;
mod source;


pub use channels::{channel_index, channels_of, select_channel};
pub use error::{AppError, Result};
pub use session::{OpenFile, ProjectSession};
pub use source::DiskSource;
