use crate::connection::ConnectionEvent;
use std::collections::HashMap;
use system::ConnectionId;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ConnectionEvent>;

#[derive(Debug, Error, PartialEq)]
pub enum SendError {
    #[error("outbound queue of connection {0} is full")]
    Full(ConnectionId),
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
    #[error("connection {0} is not registered")]
    Unknown(ConnectionId),
}

/// Outbound queues of every live connection. Sending never waits.
#[derive(Default)]
pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    pub fn send(&self, to: &ConnectionId, message: ConnectionEvent) -> Result<(), SendError> {
        let tx = self
            .connection_txs
            .get(to)
            .ok_or(SendError::Unknown(*to))?;
        tx.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => SendError::Full(*to),
            TrySendError::Closed(_) => SendError::Closed(*to),
        })
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }
}
