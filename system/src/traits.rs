use crate::shape::DrawableObject;

/// Read access to an ordered sequence of shapes, shared by the hub's log and a client's mirror.
pub trait ShapesReadable {
    fn shapes(&self) -> &[DrawableObject];

    fn shape_count(&self) -> usize {
        self.shapes().len()
    }

    fn last_shape(&self) -> Option<&DrawableObject> {
        self.shapes().last()
    }

    fn snapshot_all(&self) -> Vec<DrawableObject> {
        self.shapes().to_vec()
    }
}
