use crate::message::Epoch;
use crate::shape::DrawableObject;
use crate::traits::ShapesReadable;

/// Authoritative, append-only shape sequence of one room.
///
/// Appends are never validated here; the protocol layer rejects incomplete
/// shapes before they reach the log. The only way to remove shapes is
/// [`ShapeLog::clear`], which empties the log and starts a new epoch.
#[derive(Debug, Clone, Default)]
pub struct ShapeLog {
    shapes: Vec<DrawableObject>,
    epoch: Epoch,
}

impl ShapeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of the shape within the current epoch.
    pub fn append(&mut self, shape: DrawableObject) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Returns the new epoch.
    pub fn clear(&mut self) -> Epoch {
        self.shapes.clear();
        self.epoch += 1;
        self.epoch
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl ShapesReadable for ShapeLog {
    fn shapes(&self) -> &[DrawableObject] {
        &self.shapes
    }
}
