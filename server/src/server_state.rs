use std::collections::HashMap;
use system::{ClientCommand, ConnectionId, Dispatch, Room, RoomError, RoomId, RoomMaterial};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("connection {0} is not registered")]
    UnknownConnection(ConnectionId),
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Rooms and the room each connection addressed on upgrade.
///
/// A room exists while at least one participant has joined it.
#[derive(Default)]
pub struct ServerState {
    connection_rooms: HashMap<ConnectionId, RoomId>,
    rooms: HashMap<RoomId, Room>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, connection_id: ConnectionId, room_id: RoomId) {
        log::info!("Connection {} opened for room {:?}", connection_id, room_id);
        self.connection_rooms.insert(connection_id, room_id);
    }

    pub fn handle_command(
        &mut self,
        from: ConnectionId,
        command: ClientCommand,
    ) -> Result<Vec<Dispatch>, HubError> {
        let room_id = self
            .connection_rooms
            .get(&from)
            .ok_or(HubError::UnknownConnection(from))?
            .clone();

        let room = match command {
            ClientCommand::Join { .. } => self.rooms.entry(room_id.clone()).or_insert_with(|| {
                log::info!("Room {:?} created", room_id);
                Room::new()
            }),
            _ => self
                .rooms
                .get_mut(&room_id)
                .ok_or(RoomError::NotJoined(from))?,
        };
        let result = room.handle_command(from, command);
        self.drop_room_if_empty(&room_id);
        Ok(result?)
    }

    /// Forgets the connection. Repeated calls produce nothing.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Dispatch> {
        let room_id = match self.connection_rooms.remove(connection_id) {
            Some(room_id) => room_id,
            None => return Vec::new(),
        };
        let dispatches = self
            .rooms
            .get_mut(&room_id)
            .map(|room| room.handle_disconnect(connection_id))
            .unwrap_or_default();
        self.drop_room_if_empty(&room_id);
        dispatches
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Sorted by room id.
    pub fn rooms(&self) -> Vec<RoomMaterial> {
        let mut rooms = self
            .rooms
            .iter()
            .map(|(room_id, room)| room.materialize(room_id))
            .collect::<Vec<_>>();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    fn drop_room_if_empty(&mut self, room_id: &str) {
        if self.rooms.get(room_id).map(Room::is_empty).unwrap_or(false) {
            self.rooms.remove(room_id);
            log::info!("Room {:?} closed", room_id);
        }
    }
}
