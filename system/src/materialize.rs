use serde::Serialize;

use crate::message::{CursorState, Epoch, Participant, RoomId};
use crate::shape::DrawableObject;

/// Everything a renderer needs to paint one frame of a client's canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasMaterial {
    pub shapes: Vec<DrawableObject>,
    /// Shape of the gesture still being drawn; painted on top, never published.
    pub in_progress: Option<DrawableObject>,
    pub participants: Vec<Participant>,
    /// Sorted by connection id.
    pub cursors: Vec<CursorState>,
}

/// Hub-side description of a room, for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMaterial {
    pub room_id: RoomId,
    pub epoch: Epoch,
    pub shape_count: usize,
    pub participants: Vec<Participant>,
}
