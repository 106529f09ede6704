use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{Action, ActionLog, ConnectionId};

use crate::connection::{ConnectionCommand, ConnectionEvent, ConnectionTx};
use crate::registry::SessionRegistry;

pub type RelayTx = UnboundedSender<ConnectionCommand>;

/// Single ordering authority for the shared canvas. Owns the registry and the
/// action log; all three transport events go through its mailbox, so no two
/// inbound actions are ever classified, recorded or broadcast concurrently.
struct Relay {
    registry: SessionRegistry,
    log: ActionLog,
}

impl Relay {
    fn new() -> Self {
        Self {
            registry: SessionRegistry::new(),
            log: ActionLog::new(),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => self.connect(tx),
            ConnectionCommand::Message { from, text } => self.message(&from, &text),
            ConnectionCommand::Disconnect { from } => self.close(&from),
        }
    }

    /// Register, replay the whole log in order, then go live. The connection
    /// is registered before the replay snapshot is taken, so actions arriving
    /// after the snapshot still reach it as live broadcasts.
    fn connect(&mut self, tx: ConnectionTx) {
        let connection_id = self.registry.register(tx);

        if self
            .send(&connection_id, ConnectionEvent::Connected { connection_id })
            .is_err()
        {
            self.close(&connection_id);
            return;
        }

        for action in self.log.actions().to_vec() {
            if self
                .send(&connection_id, ConnectionEvent::Action(action))
                .is_err()
            {
                self.close(&connection_id);
                return;
            }
        }

        self.registry.set_live(&connection_id);
        log::info!(
            "connection {} joined after replay of {} actions",
            connection_id,
            self.log.len()
        );
    }

    fn message(&mut self, from: &ConnectionId, text: &str) {
        if !self.registry.is_live(from) {
            log::debug!("dropping message from unknown connection {}", from);
            return;
        }

        let action = match Action::decode(text) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("dropping message from connection {}: {}", from, e);
                return;
            }
        };

        self.log.record(&action);
        self.broadcast(&action, from);
    }

    /// A failed delivery closes that connection; it never aborts the fan-out
    /// to the rest.
    fn broadcast(&mut self, action: &Action, sender: &ConnectionId) {
        let mut dead = Vec::new();
        for (connection_id, tx) in self.registry.snapshot_except(sender) {
            if tx.send(ConnectionEvent::Action(action.clone())).is_err() {
                dead.push(connection_id);
            }
        }
        for connection_id in dead {
            self.close(&connection_id);
        }
    }

    fn send(&self, connection_id: &ConnectionId, event: ConnectionEvent) -> Result<(), ()> {
        match self.registry.tx(connection_id) {
            Some(tx) => tx.send(event).map_err(|_| ()),
            None => Err(()),
        }
    }

    fn close(&mut self, connection_id: &ConnectionId) {
        if self.registry.unregister(connection_id).is_some() {
            log::info!(
                "connection {} closed, {} connections remain",
                connection_id,
                self.registry.len()
            );
        }
    }
}

pub fn spawn_relay() -> RelayTx {
    let (relay_tx, mut relay_rx) = unbounded_channel::<ConnectionCommand>();

    tokio::spawn(async move {
        let mut relay = Relay::new();

        while let Some(command) = relay_rx.recv().await {
            relay.handle_connection_command(command);
        }
    });

    relay_tx
}
