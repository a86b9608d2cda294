use crate::message::{ConnectionId, Participant};

/// Current participants of one room, in join order.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    participants: Vec<Participant>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a participant. Joining again with the same connection only
    /// renames it, keeping its original position.
    pub fn join(&mut self, connection_id: ConnectionId, display_name: impl Into<String>) {
        let display_name = display_name.into();
        if let Some(existing) = self
            .participants
            .iter_mut()
            .find(|p| p.connection_id == connection_id)
        {
            log::debug!(
                "Connection {} joined again as {:?} (was {:?})",
                connection_id,
                display_name,
                existing.display_name
            );
            existing.display_name = display_name;
        } else {
            self.participants.push(Participant {
                connection_id,
                display_name,
            });
        }
    }

    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<Participant> {
        self.participants
            .iter()
            .position(|p| p.connection_id == *connection_id)
            .map(|pos| self.participants.remove(pos))
    }

    pub fn snapshot(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.connection_id == *connection_id)
    }

    pub fn display_name(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.get(connection_id).map(|p| p.display_name.as_str())
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.get(connection_id).is_some()
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.participants.iter().map(|p| p.connection_id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
