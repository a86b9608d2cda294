use crate::shape::{DrawableObject, ShapeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ConnectionId = u32;
pub type RoomId = String;
/// Number of times a room's shape log has been cleared.
pub type Epoch = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub connection_id: ConnectionId,
    pub display_name: String,
}

/// Latest pointer position of a peer. Never logged, newest frame wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    pub connection_id: ConnectionId,
    pub x: f32,
    pub y: f32,
    pub display_name: String,
}

/// Client to hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    Join {
        display_name: String,
    },
    Draw {
        shape: DrawableObject,
        /// Epoch the shape was authored in. Unstamped draws are never treated as stale.
        #[serde(default)]
        epoch: Option<Epoch>,
    },
    CursorMove {
        x: f32,
        y: f32,
    },
    ClearCanvas,
}

/// Hub to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    InitialState {
        shapes: Vec<DrawableObject>,
        epoch: Epoch,
    },
    Users(Vec<Participant>),
    Draw {
        shape: DrawableObject,
    },
    CursorMove(CursorState),
    ClearCanvas {
        epoch: Epoch,
    },
}

impl ServerEvent {
    /// Ephemeral events may be dropped under backpressure without breaking any replica.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::CursorMove(_))
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed json frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed binary frame: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("display name must not be empty")]
    EmptyDisplayName,
    #[error("cursor position must be finite")]
    NonFiniteCursor,
    #[error("incomplete shape: {0}")]
    Shape(#[from] ShapeError),
}

impl ClientCommand {
    /// Rejects commands whose fields are present but unusable.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::Join { display_name } if display_name.trim().is_empty() => {
                Err(ProtocolError::EmptyDisplayName)
            }
            Self::Draw { shape, .. } => Ok(shape.validate()?),
            Self::CursorMove { x, y } if !(x.is_finite() && y.is_finite()) => {
                Err(ProtocolError::NonFiniteCursor)
            }
            _ => Ok(()),
        }
    }
}
