//! Axis-aligned rectangular ROIs in N-dimensional image coordinates.

mod bounds;
mod error;
mod roi;

#[cfg(test)]
mod tests;

pub use bounds::SpatialBounds;
pub use error::{GeometryError, Result};
pub use roi::{CORNERS, Roi};
