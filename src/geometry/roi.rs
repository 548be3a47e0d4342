use serde::{Deserialize, Serialize};

use super::{GeometryError, Result, SpatialBounds};

pub const CORNERS: usize = 4;

/// Four corner points stored flat and row-major (`4 * ndim` values).
///
/// Only the last two coordinates differ between corners; the leading ones
/// place the rectangle on a plane of the image (slice, time, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Roi {
    coords: Vec<f64>,
}

impl Roi {
    pub fn from_flat(coords: Vec<f64>) -> Result<Self> {
        if coords.len() % CORNERS != 0 || coords.len() < CORNERS * 2 {
            return Err(GeometryError::InvalidLength(coords.len()));
        }
        check_finite(&coords)?;
        Ok(Self { coords })
    }

    /// Fails on the first NaN or infinite coordinate.
    pub fn check_finite(&self) -> Result<()> {
        check_finite(&self.coords)
    }

    /// Rectangle on the plane given by `leading`, corners ordered
    /// `(r0, c0) (r0, c1) (r1, c1) (r1, c0)`.
    pub fn rectangle(leading: &[f64], rows: (f64, f64), cols: (f64, f64)) -> Self {
        let spatial = [
            [rows.0, cols.0],
            [rows.0, cols.1],
            [rows.1, cols.1],
            [rows.1, cols.0],
        ];
        let mut coords = Vec::with_capacity(CORNERS * (leading.len() + 2));
        for corner in spatial {
            coords.extend_from_slice(leading);
            coords.extend_from_slice(&corner);
        }
        Self { coords }
    }

    pub fn ndim(&self) -> usize {
        self.coords.len() / CORNERS
    }

    pub fn as_flat(&self) -> &[f64] {
        &self.coords
    }

    pub fn corner(&self, index: usize) -> &[f64] {
        let ndim = self.ndim();
        &self.coords[index * ndim..(index + 1) * ndim]
    }

    pub fn corners(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.coords.chunks(self.ndim())
    }

    /// Non-spatial coordinates, read from the first corner.
    pub fn leading(&self) -> &[f64] {
        let ndim = self.ndim();
        &self.corner(0)[..ndim - 2]
    }

    /// Coordinate on the slice axis (`ndim - 3`), if the ROI has one.
    pub fn slice_coord(&self) -> Option<f64> {
        let ndim = self.ndim();
        (ndim >= 3).then(|| self.corner(0)[ndim - 3])
    }

    pub fn spatial_bounds(&self) -> SpatialBounds {
        let ndim = self.ndim();
        let mut bounds = SpatialBounds {
            row_min: f64::INFINITY,
            row_max: f64::NEG_INFINITY,
            col_min: f64::INFINITY,
            col_max: f64::NEG_INFINITY,
        };
        for corner in self.corners() {
            let (row, col) = (corner[ndim - 2], corner[ndim - 1]);
            bounds.row_min = bounds.row_min.min(row);
            bounds.row_max = bounds.row_max.max(row);
            bounds.col_min = bounds.col_min.min(col);
            bounds.col_max = bounds.col_max.max(col);
        }
        bounds
    }

    /// Copy of `self` whose spatial coordinates (all four corners) are taken
    /// from `other`; leading coordinates are kept.
    pub fn with_spatial_from(&self, other: &Roi) -> Result<Roi> {
        if other.ndim() != self.ndim() {
            return Err(GeometryError::DimensionMismatch {
                expected: self.ndim(),
                found: other.ndim(),
            });
        }
        let ndim = self.ndim();
        let mut coords = self.coords.clone();
        for corner in 0..CORNERS {
            let base = corner * ndim;
            coords[base + ndim - 2] = other.coords[base + ndim - 2];
            coords[base + ndim - 1] = other.coords[base + ndim - 1];
        }
        Ok(Roi { coords })
    }

    pub fn translated(&self, rows: f64, cols: f64) -> Result<Roi> {
        check_finite(&[rows, cols])?;
        let ndim = self.ndim();
        let mut coords = self.coords.clone();
        for corner in coords.chunks_mut(ndim) {
            corner[ndim - 2] += rows;
            corner[ndim - 1] += cols;
        }
        Ok(Roi { coords })
    }

    pub fn rounded(&self) -> Roi {
        Roi {
            coords: self.coords.iter().map(|value| value.round()).collect(),
        }
    }

    /// Geometry equality after rounding every coordinate to an integer.
    pub fn same_rounded(&self, other: &Roi) -> bool {
        self.coords.len() == other.coords.len()
            && self
                .coords
                .iter()
                .zip(&other.coords)
                .all(|(left, right)| left.round() == right.round())
    }
}

fn check_finite(values: &[f64]) -> Result<()> {
    match values.iter().find(|value| !value.is_finite()) {
        Some(value) => Err(GeometryError::NonFinite(*value)),
        None => Ok(()),
    }
}

impl TryFrom<Vec<f64>> for Roi {
    type Error = GeometryError;

    fn try_from(coords: Vec<f64>) -> Result<Self> {
        Roi::from_flat(coords)
    }
}

impl From<Roi> for Vec<f64> {
    fn from(roi: Roi) -> Self {
        roi.coords
    }
}
