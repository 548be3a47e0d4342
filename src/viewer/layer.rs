use crate::geometry::Roi;

pub trait ShapeLayer {
    /// Current shapes in drawing order.
    fn shapes(&self) -> &[Roi];

    fn add_rectangles(&mut self, rois: Vec<Roi>);

    /// Removes the shapes at `indices` (positions before removal).
    fn remove_shapes(&mut self, indices: &[usize]);

    /// Overwrites the shape at `index`. An out-of-range `index` does nothing.
    fn replace_shape(&mut self, index: usize, roi: Roi);

    fn len(&self) -> usize {
        self.shapes().len()
    }

    fn is_empty(&self) -> bool {
        self.shapes().is_empty()
    }

    fn clear(&mut self) {
        let all = (0..self.len()).collect::<Vec<_>>();
        self.remove_shapes(&all);
    }
}
