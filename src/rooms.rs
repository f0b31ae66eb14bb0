//! Room directory: room id to member set

use crate::protocol::{ClientId, RoomId};
use std::collections::{HashMap, HashSet};

/// Membership index over all live rooms. Rooms exist exactly while they have
/// members: creation is implicit on first join and deletion happens inside
/// the leave that empties the room, so an empty room is never observable.
#[derive(Default)]
pub struct RoomDirectory {
    rooms: HashMap<RoomId, HashSet<ClientId>>,
}

impl RoomDirectory {
    /// Adds a member, creating the room if needed. Returns the membership
    /// snapshot including the new member.
    pub fn join(&mut self, room_id: RoomId, id: ClientId) -> Vec<ClientId> {
        let members = self.rooms.entry(room_id).or_default();
        members.insert(id);
        members.iter().cloned().collect()
    }

    /// Removes a member. `None` if the member was not in the room; otherwise
    /// the remaining membership, with the room already deleted when it
    /// emptied.
    pub fn leave(&mut self, room_id: &RoomId, id: &ClientId) -> Option<Vec<ClientId>> {
        let members = self.rooms.get_mut(room_id)?;
        if !members.remove(id) {
            return None;
        }
        if members.is_empty() {
            self.rooms.remove(room_id);
            return Some(Vec::new());
        }
        Some(members.iter().cloned().collect())
    }

    /// Read-only membership snapshot; empty when the room does not exist.
    pub fn members_of(&self, room_id: &RoomId) -> Vec<ClientId> {
        self.rooms
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_join_creates_the_room() {
        let mut rooms = RoomDirectory::default();
        assert!(!rooms.contains(&RoomId::from("sim-1")));

        let members = rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        assert_eq!(members, vec![ClientId::from("a")]);
        assert!(rooms.contains(&RoomId::from("sim-1")));
        assert_eq!(rooms.len(), 1);
    }

    #[test]
    fn join_snapshot_lists_everyone_once() {
        let mut rooms = RoomDirectory::default();
        rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        let mut members = rooms.join(RoomId::from("sim-1"), ClientId::from("b"));
        members.sort_by(|x, y| x.as_str().cmp(y.as_str()));

        assert_eq!(members, vec![ClientId::from("a"), ClientId::from("b")]);
    }

    #[test]
    fn duplicate_join_does_not_double_count() {
        let mut rooms = RoomDirectory::default();
        rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        let members = rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        assert_eq!(members.len(), 1);
    }

    #[test]
    fn last_leave_deletes_the_room() {
        let mut rooms = RoomDirectory::default();
        rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        let remaining = rooms.leave(&RoomId::from("sim-1"), &ClientId::from("a"));

        assert_eq!(remaining, Some(Vec::new()));
        assert!(!rooms.contains(&RoomId::from("sim-1")));
        assert!(rooms.is_empty());
    }

    #[test]
    fn leaving_a_room_you_are_not_in_returns_none() {
        let mut rooms = RoomDirectory::default();
        rooms.join(RoomId::from("sim-1"), ClientId::from("a"));

        assert!(rooms
            .leave(&RoomId::from("sim-1"), &ClientId::from("b"))
            .is_none());
        assert!(rooms
            .leave(&RoomId::from("sim-2"), &ClientId::from("a"))
            .is_none());
        assert_eq!(
            rooms.members_of(&RoomId::from("sim-1")),
            vec![ClientId::from("a")]
        );
    }

    #[test]
    fn members_of_an_unknown_room_is_empty() {
        let rooms = RoomDirectory::default();
        assert!(rooms.members_of(&RoomId::from("nope")).is_empty());
    }
}
