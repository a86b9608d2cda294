use std::collections::HashMap;

use thiserror::Error;

use crate::local_history::LocalHistory;
use crate::materialize::CanvasMaterial;
use crate::message::{ClientCommand, ConnectionId, CursorState, Epoch, Participant, ServerEvent};
use crate::shape::{DrawableObject, ShapeError};
use crate::traits::ShapesReadable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("initial state has not been received yet")]
    NotBootstrapped,
    #[error("initial state was already received")]
    AlreadyBootstrapped,
    #[error("no gesture in progress")]
    NoGesture,
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

#[derive(Debug)]
enum AgentState {
    AwaitingBootstrap,
    Ready { history: LocalHistory, epoch: Epoch },
}

/// Client-side replica of one room.
///
/// Mirrors the hub's shape log, applies local edits optimistically and keeps
/// a local undo history. Only edits authored here create checkpoints; shapes
/// drawn by peers are never reverted by this client's undo.
///
/// Nothing may happen before `initial-state` arrives: local edits are refused
/// and every other inbound event is discarded.
#[derive(Debug)]
pub struct ClientSyncAgent {
    state: AgentState,
    in_progress: Option<DrawableObject>,
    participants: Vec<Participant>,
    cursors: HashMap<ConnectionId, CursorState>,
}

impl Default for ClientSyncAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSyncAgent {
    pub fn new() -> Self {
        Self {
            state: AgentState::AwaitingBootstrap,
            in_progress: None,
            participants: Vec::new(),
            cursors: HashMap::new(),
        }
    }

    pub fn join(&self, display_name: impl Into<String>) -> ClientCommand {
        ClientCommand::Join {
            display_name: display_name.into(),
        }
    }

    pub fn cursor_move(&self, x: f32, y: f32) -> ClientCommand {
        ClientCommand::CursorMove { x, y }
    }

    /// Asks the hub to clear the room. Local state is reset only when the
    /// hub's `clear-canvas` comes back, like for every other participant.
    pub fn request_clear(&self) -> ClientCommand {
        ClientCommand::ClearCanvas
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AgentState::Ready { .. })
    }

    pub fn handle_server_event(&mut self, event: ServerEvent) -> Result<(), SyncError> {
        match event {
            ServerEvent::InitialState { shapes, epoch } => self.on_join_bootstrap(shapes, epoch),
            _ if !self.is_ready() => {
                log::warn!("Discarding {:?} received before initial state", event);
                Err(SyncError::NotBootstrapped)
            }
            ServerEvent::Users(users) => {
                self.on_users(users);
                Ok(())
            }
            ServerEvent::Draw { shape } => self.on_remote_draw(shape),
            ServerEvent::CursorMove(cursor) => {
                self.cursors.insert(cursor.connection_id, cursor);
                Ok(())
            }
            ServerEvent::ClearCanvas { epoch } => self.on_clear_canvas(epoch),
        }
    }

    pub fn on_join_bootstrap(
        &mut self,
        shapes: Vec<DrawableObject>,
        epoch: Epoch,
    ) -> Result<(), SyncError> {
        if self.is_ready() {
            log::warn!("Discarding repeated initial state");
            return Err(SyncError::AlreadyBootstrapped);
        }
        log::debug!("Bootstrapped with {} shapes (epoch {})", shapes.len(), epoch);
        self.state = AgentState::Ready {
            history: LocalHistory::new(shapes),
            epoch,
        };
        Ok(())
    }

    /// Forgets the session after the socket dropped. The replica waits for a
    /// fresh `initial-state`, which rebuilds it from the hub's log.
    pub fn on_disconnect(&mut self) {
        log::debug!(
            "Disconnected with {} shapes in view",
            self.history().map_or(0, |history| history.current().len())
        );
        self.state = AgentState::AwaitingBootstrap;
        self.in_progress = None;
        self.participants.clear();
        self.cursors.clear();
    }

    /// Applies a finished local shape and returns the command publishing it.
    pub fn apply_local_edit(&mut self, shape: DrawableObject) -> Result<ClientCommand, SyncError> {
        let (history, epoch) = self.ready_mut()?;
        shape.validate()?;
        history.push_local(shape.clone());
        Ok(ClientCommand::Draw {
            shape,
            epoch: Some(*epoch),
        })
    }

    pub fn on_remote_draw(&mut self, shape: DrawableObject) -> Result<(), SyncError> {
        let (history, _) = self.ready_mut()?;
        history.fold_remote(&shape);
        Ok(())
    }

    pub fn on_clear_canvas(&mut self, epoch: Epoch) -> Result<(), SyncError> {
        if !self.is_ready() {
            return Err(SyncError::NotBootstrapped);
        }
        if let Some(gesture) = self.in_progress.take() {
            log::debug!("Clear discarded in-progress {}", gesture.kind());
        }
        self.state = AgentState::Ready {
            history: LocalHistory::new(Vec::new()),
            epoch,
        };
        Ok(())
    }

    /// Returns whether the view changed.
    pub fn undo(&mut self) -> bool {
        self.ready_mut()
            .map(|(history, _)| history.undo())
            .unwrap_or(false)
    }

    /// Returns whether the view changed.
    pub fn redo(&mut self) -> bool {
        self.ready_mut()
            .map(|(history, _)| history.redo())
            .unwrap_or(false)
    }

    pub fn begin_gesture(&mut self, shape: DrawableObject) -> Result<(), SyncError> {
        self.ready_mut()?;
        self.in_progress = Some(shape);
        Ok(())
    }

    pub fn update_gesture(&mut self, shape: DrawableObject) -> Result<(), SyncError> {
        match self.in_progress.as_mut() {
            Some(current) => {
                *current = shape;
                Ok(())
            }
            None => Err(SyncError::NoGesture),
        }
    }

    /// Publishes the in-progress shape. An incomplete shape stays in progress.
    pub fn finish_gesture(&mut self) -> Result<ClientCommand, SyncError> {
        let shape = self.in_progress.take().ok_or(SyncError::NoGesture)?;
        if let Err(err) = shape.validate() {
            self.in_progress = Some(shape);
            return Err(err.into());
        }
        self.apply_local_edit(shape)
    }

    pub fn cancel_gesture(&mut self) -> Option<DrawableObject> {
        self.in_progress.take()
    }

    pub fn in_progress(&self) -> Option<&DrawableObject> {
        self.in_progress.as_ref()
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn cursor(&self, connection_id: &ConnectionId) -> Option<&CursorState> {
        self.cursors.get(connection_id)
    }

    pub fn epoch(&self) -> Option<Epoch> {
        match &self.state {
            AgentState::Ready { epoch, .. } => Some(*epoch),
            AgentState::AwaitingBootstrap => None,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history().map(LocalHistory::len).unwrap_or(0)
    }

    pub fn history_cursor(&self) -> usize {
        self.history().map(LocalHistory::cursor).unwrap_or(0)
    }

    pub fn can_undo(&self) -> bool {
        self.history().map(LocalHistory::can_undo).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        self.history().map(LocalHistory::can_redo).unwrap_or(false)
    }

    pub fn materialize(&self) -> CanvasMaterial {
        let mut cursors = self.cursors.values().cloned().collect::<Vec<_>>();
        cursors.sort_by_key(|cursor| cursor.connection_id);
        CanvasMaterial {
            shapes: self.snapshot_all(),
            in_progress: self.in_progress.clone(),
            participants: self.participants.clone(),
            cursors,
        }
    }

    fn on_users(&mut self, users: Vec<Participant>) {
        self.cursors
            .retain(|connection_id, _| users.iter().any(|u| u.connection_id == *connection_id));
        self.participants = users;
    }

    fn history(&self) -> Option<&LocalHistory> {
        match &self.state {
            AgentState::Ready { history, .. } => Some(history),
            AgentState::AwaitingBootstrap => None,
        }
    }

    fn ready_mut(&mut self) -> Result<(&mut LocalHistory, &mut Epoch), SyncError> {
        match &mut self.state {
            AgentState::Ready { history, epoch } => Ok((history, epoch)),
            AgentState::AwaitingBootstrap => Err(SyncError::NotBootstrapped),
        }
    }
}

impl ShapesReadable for ClientSyncAgent {
    fn shapes(&self) -> &[DrawableObject] {
        self.history().map(LocalHistory::current).unwrap_or(&[])
    }
}
