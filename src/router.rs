//! Signaling router: the protocol state machine.
//!
//! Owns the connection registry and the room directory behind one mutex, so
//! a join or leave that reads and writes across both structures is applied
//! atomically. Nothing is awaited while the lock is held; outbound frames go
//! through per-connection unbounded queues and a slow receiver never stalls
//! the router.

use crate::error::SignalingError;
use crate::protocol::{ClientId, ClientMessage, Participant, Role, RoomId, ServerMessage};
use crate::registry::ConnectionRegistry;
use crate::rooms::RoomDirectory;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

/// Aggregate counters reported by the health surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStats {
    pub connections: usize,
    pub rooms: usize,
}

/// Protocol state machine for the signaling relay.
///
/// Per connection the lifecycle is connected (post-accept) to joined (after
/// `join`) and back via `leave`, with transport close funneling into
/// [`SignalingRouter::disconnect`] as the single cleanup path.
pub struct SignalingRouter {
    state: Mutex<RouterState>,
}

struct RouterState {
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
}

impl SignalingRouter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RouterState {
                registry: ConnectionRegistry::default(),
                rooms: RoomDirectory::default(),
            }),
        }
    }

    /// Registers a transport connection and queues its `welcome` frame ahead
    /// of any other traffic.
    pub async fn connect(&self, tx: UnboundedSender<ServerMessage>) -> ClientId {
        let mut state = self.state.lock().await;
        let id = state.registry.register(tx);
        state
            .registry
            .send_to(&id, ServerMessage::Welcome { client_id: id.clone() });
        tracing::info!(client_id = %id, "Connection registered");
        id
    }

    /// Applies one inbound message from `sender`, run to completion before
    /// the next message is admitted.
    pub async fn handle(&self, sender: &ClientId, message: ClientMessage) {
        let mut state = self.state.lock().await;
        match message {
            ClientMessage::Join { room_id, role } => state.join(sender, &room_id, role),
            ClientMessage::Offer { target_id, offer } => {
                state.relay_offer(sender, ClientId::from(target_id), offer)
            }
            ClientMessage::Answer { target_id, answer } => {
                state.relay_answer(sender, ClientId::from(target_id), answer)
            }
            ClientMessage::IceCandidate {
                target_id,
                candidate,
            } => state.relay_ice_candidate(sender, ClientId::from(target_id), candidate),
            ClientMessage::Leave => state.leave(sender),
        }
    }

    /// Cleanup for a closed transport: identical to an explicit `leave`,
    /// then the identity is released. Safe to call more than once.
    pub async fn disconnect(&self, id: &ClientId) {
        let mut state = self.state.lock().await;
        state.leave(id);
        if state.registry.unregister(id).is_some() {
            tracing::info!(client_id = %id, "Connection closed");
        }
    }

    /// Current connection and room counts. Read-only.
    pub async fn stats(&self) -> RouterStats {
        let state = self.state.lock().await;
        RouterStats {
            connections: state.registry.len(),
            rooms: state.rooms.len(),
        }
    }
}

impl Default for SignalingRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterState {
    fn join(&mut self, sender: &ClientId, room_id: &str, role: Role) {
        let room_id = room_id.trim();
        if room_id.is_empty() {
            tracing::debug!(client_id = %sender, "Rejected join without a room id");
            self.registry
                .send_to(sender, SignalingError::MissingRoomId.into_message());
            return;
        }
        // Membership is only ever held for live connections.
        if self.registry.lookup(sender).is_none() {
            return;
        }
        let room_id = RoomId::from(room_id);

        // One room per connection: any prior membership is fully left first,
        // peer-left broadcast included.
        self.leave(sender);

        let created = !self.rooms.contains(&room_id);
        let members = self.rooms.join(room_id.clone(), sender.clone());
        if created {
            tracing::info!(room_id = %room_id, "Room created");
        }

        if let Some(connection) = self.registry.lookup_mut(sender) {
            connection.room = Some(room_id.clone());
            connection.role = Some(role);
        }

        let participants = self.participants(&members);
        self.registry.send_to(
            sender,
            ServerMessage::Joined {
                room_id: room_id.clone(),
                role,
                participants,
            },
        );
        self.broadcast_to_room(
            &room_id,
            sender,
            ServerMessage::PeerJoined {
                peer_id: sender.clone(),
                role,
            },
        );

        tracing::info!(
            client_id = %sender,
            room_id = %room_id,
            role = ?role,
            members = members.len(),
            "Joined room"
        );
    }

    fn leave(&mut self, sender: &ClientId) {
        let Some(connection) = self.registry.lookup_mut(sender) else {
            return;
        };
        let Some(room_id) = connection.room.take() else {
            return;
        };
        connection.role = None;

        let Some(remaining) = self.rooms.leave(&room_id, sender) else {
            return;
        };
        for member in &remaining {
            self.registry.send_to(
                member,
                ServerMessage::PeerLeft {
                    peer_id: sender.clone(),
                },
            );
        }

        tracing::info!(
            client_id = %sender,
            room_id = %room_id,
            remaining = remaining.len(),
            "Left room"
        );
        if remaining.is_empty() {
            tracing::info!(room_id = %room_id, "Room deleted");
        }
    }

    fn relay_offer(&self, sender: &ClientId, target: ClientId, offer: Value) {
        if self.registry.lookup(&target).is_none() {
            tracing::debug!(from = %sender, target = %target, "Offer target offline");
            self.registry
                .send_to(sender, SignalingError::UnknownTarget(target).into_message());
            return;
        }
        self.registry.send_to(
            &target,
            ServerMessage::Offer {
                from_id: sender.clone(),
                offer,
            },
        );
        tracing::debug!(from = %sender, to = %target, "Relayed offer");
    }

    fn relay_answer(&self, sender: &ClientId, target: ClientId, answer: Value) {
        if self.registry.lookup(&target).is_none() {
            tracing::debug!(from = %sender, target = %target, "Answer target offline");
            self.registry
                .send_to(sender, SignalingError::UnknownTarget(target).into_message());
            return;
        }
        self.registry.send_to(
            &target,
            ServerMessage::Answer {
                from_id: sender.clone(),
                answer,
            },
        );
        tracing::debug!(from = %sender, to = %target, "Relayed answer");
    }

    fn relay_ice_candidate(&self, sender: &ClientId, target: ClientId, candidate: Value) {
        // A target that vanished mid-negotiation is a benign race, not an
        // error worth reporting.
        if self.registry.lookup(&target).is_none() {
            tracing::debug!(from = %sender, target = %target, "Dropped ICE candidate for offline target");
            return;
        }
        self.registry.send_to(
            &target,
            ServerMessage::IceCandidate {
                from_id: sender.clone(),
                candidate,
            },
        );
        tracing::debug!(from = %sender, to = %target, "Relayed ICE candidate");
    }

    /// Snapshot of a member list with each member's role attached. A
    /// connection that has not completed a join carries no role and never
    /// appears.
    fn participants(&self, members: &[ClientId]) -> Vec<Participant> {
        members
            .iter()
            .filter_map(|id| {
                let connection = self.registry.lookup(id)?;
                Some(Participant {
                    id: id.clone(),
                    role: connection.role?,
                })
            })
            .collect()
    }

    /// Queues a frame for every member of the room except `except`.
    fn broadcast_to_room(&self, room_id: &RoomId, except: &ClientId, message: ServerMessage) {
        for member in self.rooms.members_of(room_id) {
            if &member != except {
                self.registry.send_to(&member, message.clone());
            }
        }
    }
}
