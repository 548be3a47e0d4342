use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    X,
    Y,
    Z,
    Channel,
    Time,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelType {
    U8,
    U16,
    #[default]
    F32,
}

/// Axes are laid out with the spatial plane last: `[.., T, Z, Y, X]`.
pub fn default_axis_for_index(index: usize, ndim: usize) -> AxisKind {
    match ndim.saturating_sub(index) {
        1 => AxisKind::X,
        2 => AxisKind::Y,
        3 => AxisKind::Z,
        4 => AxisKind::Time,
        _ => AxisKind::Unknown,
    }
}
