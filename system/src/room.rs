use crate::materialize::RoomMaterial;
use crate::message::{
    ClientCommand, ConnectionId, CursorState, Epoch, Participant, ProtocolError, ServerEvent,
};
use crate::presence_registry::PresenceRegistry;
use crate::shape_log::ShapeLog;
use crate::traits::ShapesReadable;
use thiserror::Error;

/// One event addressed to an explicit set of connections.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub to: Vec<ConnectionId>,
    pub event: ServerEvent,
}

impl Dispatch {
    fn new(to: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

#[derive(Debug, Error)]
pub enum RoomError {
    #[error(transparent)]
    Invalid(#[from] ProtocolError),
    #[error("connection {0} has not joined")]
    NotJoined(ConnectionId),
    #[error("draw authored in epoch {authored} but the room is in epoch {current}")]
    StaleDraw { authored: Epoch, current: Epoch },
}

/// State of one collaboration room: its shape log and who is present.
///
/// Every inbound event is handled to completion and turned into the list of
/// deliveries the caller has to perform. A rejected event leaves the room
/// untouched and produces nothing.
#[derive(Debug, Default)]
pub struct Room {
    shape_log: ShapeLog,
    presence: PresenceRegistry,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_command(
        &mut self,
        from: ConnectionId,
        command: ClientCommand,
    ) -> Result<Vec<Dispatch>, RoomError> {
        command.validate()?;

        match command {
            ClientCommand::Join { display_name } => {
                self.presence.join(from, display_name);
                Ok(vec![
                    Dispatch::new(
                        vec![from],
                        ServerEvent::InitialState {
                            shapes: self.shape_log.snapshot_all(),
                            epoch: self.shape_log.epoch(),
                        },
                    ),
                    self.users_dispatch(),
                ])
            }
            ClientCommand::Draw { shape, epoch } => {
                self.ensure_joined(from)?;
                let current = self.shape_log.epoch();
                if let Some(authored) = epoch.filter(|authored| *authored != current) {
                    return Err(RoomError::StaleDraw { authored, current });
                }
                let position = self.shape_log.append(shape.clone());
                log::debug!(
                    "Connection {} appended {} at {} (epoch {})",
                    from,
                    shape.kind(),
                    position,
                    current
                );
                Ok(vec![Dispatch::new(
                    self.others(from),
                    ServerEvent::Draw { shape },
                )])
            }
            ClientCommand::CursorMove { x, y } => {
                let display_name = self.ensure_joined(from)?.display_name.clone();
                Ok(vec![Dispatch::new(
                    self.others(from),
                    ServerEvent::CursorMove(CursorState {
                        connection_id: from,
                        x,
                        y,
                        display_name,
                    }),
                )])
            }
            ClientCommand::ClearCanvas => {
                self.ensure_joined(from)?;
                let epoch = self.shape_log.clear();
                log::info!("Connection {} cleared the canvas (epoch {})", from, epoch);
                Ok(vec![Dispatch::new(
                    self.presence.connection_ids().collect(),
                    ServerEvent::ClearCanvas { epoch },
                )])
            }
        }
    }

    /// Removes the participant if present. Unknown or repeated disconnects produce nothing.
    pub fn handle_disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Dispatch> {
        match self.presence.leave(connection_id) {
            Some(participant) => {
                log::info!(
                    "{} left (connection {}), {} remaining",
                    participant.display_name,
                    connection_id,
                    self.presence.len()
                );
                if self.presence.is_empty() {
                    Vec::new()
                } else {
                    vec![self.users_dispatch()]
                }
            }
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.presence.is_empty()
    }

    pub fn shape_log(&self) -> &ShapeLog {
        &self.shape_log
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn materialize(&self, room_id: &str) -> RoomMaterial {
        RoomMaterial {
            room_id: room_id.to_string(),
            epoch: self.shape_log.epoch(),
            shape_count: self.shape_log.len(),
            participants: self.presence.snapshot(),
        }
    }

    fn ensure_joined(&self, connection_id: ConnectionId) -> Result<&Participant, RoomError> {
        self.presence
            .get(&connection_id)
            .ok_or(RoomError::NotJoined(connection_id))
    }

    fn users_dispatch(&self) -> Dispatch {
        Dispatch::new(
            self.presence.connection_ids().collect(),
            ServerEvent::Users(self.presence.snapshot()),
        )
    }

    fn others(&self, from: ConnectionId) -> Vec<ConnectionId> {
        self.presence
            .connection_ids()
            .filter(|connection_id| *connection_id != from)
            .collect()
    }
}
