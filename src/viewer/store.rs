use std::collections::BTreeSet;

use crate::geometry::{Result, Roi};

use super::ShapeLayer;

/// In-memory shape layer with a selection, standing in for a canvas.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: Vec<Roi>,
    selected: BTreeSet<usize>,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shapes(shapes: Vec<Roi>) -> Self {
        Self {
            shapes,
            selected: BTreeSet::new(),
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.shapes.len() {
            return false;
        }
        self.selected.insert(index)
    }

    pub fn remove_selected(&mut self) -> usize {
        let indices = self.selected.iter().copied().collect::<Vec<_>>();
        self.remove_shapes(&indices);
        indices.len()
    }

    /// Drags one shape by `(rows, cols)`; returns false if there is no such
    /// shape. A non-finite offset is an error and leaves the shape in place.
    pub fn move_shape(&mut self, index: usize, rows: f64, cols: f64) -> Result<bool> {
        let Some(shape) = self.shapes.get(index) else {
            return Ok(false);
        };
        let moved = shape.translated(rows, cols)?;
        self.shapes[index] = moved;
        Ok(true)
    }

    /// Snaps every coordinate to the pixel grid, as done on mouse release.
    pub fn round_all(&mut self) {
        for shape in &mut self.shapes {
            *shape = shape.rounded();
        }
    }
}

impl ShapeLayer for ShapeStore {
    fn shapes(&self) -> &[Roi] {
        &self.shapes
    }

    fn add_rectangles(&mut self, rois: Vec<Roi>) {
        self.shapes.extend(rois);
    }

    fn remove_shapes(&mut self, indices: &[usize]) {
        let doomed = indices.iter().copied().collect::<BTreeSet<_>>();
        let mut position = 0;
        self.shapes.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
        self.selected = self
            .selected
            .iter()
            .filter(|index| !doomed.contains(index))
            .map(|index| index - doomed.range(..*index).count())
            .collect();
    }

    fn replace_shape(&mut self, index: usize, roi: Roi) {
        if let Some(slot) = self.shapes.get_mut(index) {
            *slot = roi;
        }
    }
}
