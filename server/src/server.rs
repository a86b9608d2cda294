use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ConnectionId, Dispatch};

use crate::admin::AdminCommand;
use crate::connection::{ConnectionCommand, ConnectionEvent};
use crate::connection_tx_storage::{ConnectionTxStorage, SendError};
use crate::server_state::ServerState;

pub type ServerTx = UnboundedSender<ServerCommand>;

#[derive(Debug)]
pub enum ServerCommand {
    Connection(ConnectionCommand),
    Admin(AdminCommand),
}

/// The hub: owns every room and handles one command at a time.
struct Server {
    server_state: ServerState,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new() -> Self {
        Self {
            server_state: ServerState::new(),
            connections: ConnectionTxStorage::new(),
        }
    }

    fn handle_command(&mut self, command: ServerCommand) {
        match command {
            ServerCommand::Connection(command) => self.handle_connection_command(command),
            ServerCommand::Admin(command) => self.handle_admin_command(command),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect {
                connection_id,
                room_id,
                tx,
            } => {
                self.connections.insert(connection_id, tx);
                self.server_state.connect(connection_id, room_id);
            }
            ConnectionCommand::Disconnect { from } => {
                self.connections.remove(&from);
                let dispatches = self.server_state.disconnect(&from);
                self.dispatch(dispatches);
            }
            ConnectionCommand::Command { from, command } => {
                match self.server_state.handle_command(from, command) {
                    Ok(dispatches) => self.dispatch(dispatches),
                    Err(err) => log::warn!("Dropping command from connection {}: {}", from, err),
                }
            }
        }
    }

    fn handle_admin_command(&mut self, command: AdminCommand) {
        match command {
            AdminCommand::ListRooms { tx } => {
                let _ = tx.send(self.server_state.rooms());
            }
            AdminCommand::DescribeRoom { room_id, tx } => {
                let room = self
                    .server_state
                    .room(&room_id)
                    .map(|room| room.materialize(&room_id));
                let _ = tx.send(room);
            }
        }
    }

    /// Delivers dispatches without ever waiting on a recipient.
    ///
    /// A recipient whose queue is full misses cursor frames; for any other
    /// event it is disconnected, and the resulting presence change is
    /// delivered in turn.
    fn dispatch(&mut self, dispatches: Vec<Dispatch>) {
        let mut queue = VecDeque::from(dispatches);
        while let Some(Dispatch { to, event }) = queue.pop_front() {
            let event = Arc::new(event);
            for connection_id in to {
                let message = ConnectionEvent::ServerEvent(event.clone());
                match self.connections.send(&connection_id, message) {
                    Ok(()) => (),
                    Err(SendError::Full(_)) if event.is_ephemeral() => {
                        log::debug!("Dropping cursor frame for slow connection {}", connection_id);
                    }
                    Err(SendError::Full(_)) => {
                        log::warn!(
                            "Disconnecting connection {}: outbound queue is full",
                            connection_id
                        );
                        queue.extend(self.kick(&connection_id));
                    }
                    Err(err) => log::debug!("{}", err),
                }
            }
        }
    }

    fn kick(&mut self, connection_id: &ConnectionId) -> Vec<Dispatch> {
        // Dropping the queue closes the socket once it has drained.
        self.connections.remove(connection_id);
        self.server_state.disconnect(connection_id)
    }
}

pub fn spawn_server() -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ServerCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new());

        while let Some(command) = srv_rx.recv().await {
            server.handle_command(command);
        }
        log::info!("Hub stopped");
    });

    srv_tx
}
