//! Connection registry: live transport sessions and their outbound queues

use crate::protocol::{ClientId, Role, RoomId, ServerMessage};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

/// One live transport session.
pub struct Connection {
    /// Room currently joined, if any
    pub room: Option<RoomId>,
    /// Role taken at join time; cleared on leave
    pub role: Option<Role>,
    /// Outbound frame queue, drained by the connection's pump task
    pub tx: UnboundedSender<ServerMessage>,
}

/// Identity map over every live connection.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ClientId, Connection>,
}

impl ConnectionRegistry {
    /// Tracks a new connection and hands back its fresh identity.
    pub fn register(&mut self, tx: UnboundedSender<ServerMessage>) -> ClientId {
        let id = ClientId::random();
        let connection = Connection {
            room: None,
            role: None,
            tx,
        };
        self.connections.insert(id.clone(), connection);
        id
    }

    pub fn lookup(&self, id: &ClientId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn lookup_mut(&mut self, id: &ClientId) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    /// Removes a connection; idempotent.
    pub fn unregister(&mut self, id: &ClientId) -> Option<Connection> {
        self.connections.remove(id)
    }

    /// Queues a frame for one connection. Delivery is never awaited; a dead
    /// or missing receiver is skipped.
    pub fn send_to(&self, id: &ClientId, message: ServerMessage) {
        let Some(connection) = self.connections.get(id) else {
            tracing::debug!(client_id = %id, "Dropping frame for unknown connection");
            return;
        };
        if connection.tx.send(message).is_err() {
            tracing::debug!(client_id = %id, "Dropping frame for closed connection");
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn register_assigns_unique_identities() {
        let mut registry = ConnectionRegistry::default();
        let (tx, _rx) = mpsc::unbounded_channel();

        let a = registry.register(tx.clone());
        let b = registry.register(tx);

        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = ConnectionRegistry::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);

        assert!(registry.unregister(&id).is_some());
        assert!(registry.unregister(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn send_to_queues_for_the_addressed_connection() {
        let mut registry = ConnectionRegistry::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);

        registry.send_to(
            &id,
            ServerMessage::PeerLeft {
                peer_id: ClientId::from("gone"),
            },
        );

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::PeerLeft {
                peer_id: ClientId::from("gone"),
            }
        );
    }

    #[test]
    fn send_to_missing_or_closed_connections_is_a_no_op() {
        let mut registry = ConnectionRegistry::default();
        registry.send_to(
            &ClientId::from("ghost"),
            ServerMessage::Error { error: "x".into() },
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx);
        drop(rx);
        registry.send_to(&id, ServerMessage::Error { error: "x".into() });
    }
}
