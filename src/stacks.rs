//! Bookkeeping that links planar ROIs on consecutive slices into 3-D stacks.

mod error;
mod index;
mod reconcile;

#[cfg(test)]
mod tests;

pub use error::{Result, StackError};
pub use index::{RoiKind, RoiStackIndex, StackId};
pub use reconcile::{LayerDiff, ShapeChange, first_divergent_index};
