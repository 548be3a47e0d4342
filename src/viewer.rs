//! Contract with the shape layer of an image viewer.
//!
//! The viewer owns the live, user-editable list of ROI geometries. The core
//! reads it, appends to it, removes from it and rewrites single entries; the
//! host calls back into the session whenever the list changed.

mod layer;
mod store;


pub use layer::ShapeLayer;
pub use store::ShapeStore;
