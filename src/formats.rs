mod api;
mod codec;
mod error;
mod raster;
mod tiff;
mod util;


pub use api::{read_dataset, read_labels, write_dataset, write_labels};
pub use codec::{DefaultImageCodec, ImageReader, ImageWriter};
pub use error::{IoError, Result};
