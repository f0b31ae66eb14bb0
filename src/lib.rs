//! WebRTC signaling server for SimCast live simulation streaming.
//!
//! Brokers session establishment between browser viewers and simulation
//! broadcasters. Clients join a room keyed by the simulation session id and
//! exchange SDP offers, answers, and ICE candidates through the server,
//! which forwards each payload verbatim without ever parsing it. Once
//! negotiation completes the media flows peer-to-peer; the server carries
//! signaling only.
//!
//! # Protocol
//!
//! JSON frames with a `type` discriminator over a persistent WebSocket at
//! `/ws`:
//!
//! - `welcome {clientId}`: sent to every connection before anything else
//! - `join {roomId, role}`: acked with `joined {roomId, role, participants}`
//!   and announced to the rest of the room as `peer-joined {peerId, role}`
//! - `offer`/`answer`/`ice-candidate` `{targetId, ...}`: forwarded to the
//!   target as `{fromId, ...}` with the payload untouched
//! - `leave`: announced to the remaining members as `peer-left {peerId}`
//! - `error {error}`: reply to malformed or unresolvable requests
//!
//! `GET /health` reports connection and room counts for orchestration.

pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod rooms;
pub mod router;
pub mod server;
