use serde::{Deserialize, Serialize};

/// Extremes of a ROI over its four corners in the two spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialBounds {
    pub row_min: f64,
    pub row_max: f64,
    pub col_min: f64,
    pub col_max: f64,
}
