//! Process-wide maps: rooms by id, and connections to their room.
//!
//! Neither structure locks anything itself — the controller owns both
//! behind one mutex and holds it only for map operations, never across a
//! room await. That lock is what makes `get_or_create` atomic (exactly
//! one caller ever observes `is_new == true` for a given id).

use std::collections::HashMap;

use typerace_protocol::{ConnectionId, RoomId};

use crate::room::{RoomHandle, spawn_room};
use crate::text::ParagraphSource;
use crate::GameConfig;

// ---------------------------------------------------------------------------
// RoomRegistry
// ---------------------------------------------------------------------------

/// All live rooms, keyed by room id.
///
/// Lifecycle: an entry appears on the first join to an unknown id and is
/// removed when its room empties. No two rooms ever exist for the same id
/// concurrently.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Monotonic actor instance counter; see [`RoomHandle::instance`].
    next_instance: u64,
}

impl RoomRegistry {
    /// Creates an empty registry. Constructed once, at controller build
    /// time — there is no global instance.
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            next_instance: 1,
        }
    }

    /// Returns the room for `room_id`, spawning a fresh actor when none
    /// exists. The boolean is `true` for the caller that created it.
    pub fn get_or_create<S: ParagraphSource>(
        &mut self,
        room_id: &RoomId,
        creator: ConnectionId,
        config: GameConfig,
        source: S,
    ) -> (RoomHandle, bool) {
        if let Some(handle) = self.rooms.get(room_id) {
            return (handle.clone(), false);
        }

        let instance = self.next_instance;
        self.next_instance += 1;
        let handle = spawn_room(room_id.clone(), creator, instance, config, source);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, instance, "room created");
        (handle, true)
    }

    /// Looks up a room by id.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Removes the entry for `room_id` — but only if it still refers to
    /// actor `instance`. Idempotent: removing an absent or already
    /// superseded entry is a no-op returning `false`.
    pub fn remove_if(&mut self, room_id: &RoomId, instance: u64) -> bool {
        match self.rooms.get(room_id) {
            Some(handle) if handle.instance() == instance => {
                self.rooms.remove(room_id);
                tracing::info!(%room_id, instance, "room removed");
                true
            }
            _ => false,
        }
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// ConnectionIndex
// ---------------------------------------------------------------------------

/// Maps each live connection to the room it is in. 1:1 — a connection is
/// in at most one room; on overlapping writes the most recent wins.
///
/// Entries are written only after a join has actually succeeded, so a
/// rejected join never leaves a dangling mapping behind.
#[derive(Debug, Default)]
pub struct ConnectionIndex {
    map: HashMap<ConnectionId, RoomId>,
}

impl ConnectionIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` as being in `room_id`, replacing any previous entry.
    pub fn set(&mut self, id: ConnectionId, room_id: RoomId) {
        self.map.insert(id, room_id);
    }

    /// The room `id` is currently in, if any.
    pub fn get(&self, id: ConnectionId) -> Option<RoomId> {
        self.map.get(&id).cloned()
    }

    /// Removes and returns `id`'s entry. Idempotent.
    pub fn remove(&mut self, id: ConnectionId) -> Option<RoomId> {
        self.map.remove(&id)
    }

    /// Number of indexed connections.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no connections are indexed.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
