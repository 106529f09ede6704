use std::collections::HashMap;
use std::num::Wrapping;

use system::ConnectionId;

use crate::connection::ConnectionTx;

/// Replay progress of a registered connection. Closed is not a state here:
/// detecting a dead connection removes its entry immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Replaying,
    Live,
}

struct ClientConnection {
    tx: ConnectionTx,
    state: ConnectionState,
}

/// The authoritative set of live client connections.
pub struct SessionRegistry {
    connection_id_source: Wrapping<ConnectionId>,
    connections: HashMap<ConnectionId, ClientConnection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            connection_id_source: Wrapping(0),
            connections: HashMap::new(),
        }
    }

    pub fn register(&mut self, tx: ConnectionTx) -> ConnectionId {
        let connection_id = self.new_connection_id();
        self.connections.insert(
            connection_id,
            ClientConnection {
                tx,
                state: ConnectionState::Replaying,
            },
        );
        connection_id
    }

    /// Removing an absent connection is a no-op. The same connection may be
    /// reported dead both by a disconnect notification and by a failed send
    /// in the same broadcast cycle.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connections.remove(connection_id).map(|c| c.tx)
    }

    pub fn set_live(&mut self, connection_id: &ConnectionId) {
        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.state = ConnectionState::Live;
        }
    }

    pub fn is_live(&self, connection_id: &ConnectionId) -> bool {
        self.connections
            .get(connection_id)
            .map(|c| c.state == ConnectionState::Live)
            .unwrap_or(false)
    }

    pub fn tx(&self, connection_id: &ConnectionId) -> Option<&ConnectionTx> {
        self.connections.get(connection_id).map(|c| &c.tx)
    }

    /// Membership at call time, minus the sender. Handles are cloned so the
    /// fan-out loop can unregister failed connections while iterating.
    pub fn snapshot_except(&self, excluded: &ConnectionId) -> Vec<(ConnectionId, ConnectionTx)> {
        self.connections
            .iter()
            .filter(|&(id, _)| id != excluded)
            .map(|(id, c)| (*id, c.tx.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    fn new_connection_id(&mut self) -> ConnectionId {
        self.connection_id_source += Wrapping(1);
        self.connection_id_source.0
    }
}
