//! Fixed pool of reusable minion slots
//!
//! Slot `i` is rebound to `snapshot[i]` on every reconciliation. Bindings are
//! positional, not sticky: when a minion disappears every later minion shifts
//! down one slot.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::minion::{MinionId, MinionSnapshot};
use crate::facing_angle;

/// One pooled visual entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Slot {
    /// Minion currently shown in this slot (None = idle/hidden)
    pub minion: Option<MinionId>,
    pub position: Vec3,
    /// Yaw in radians (only updated when facing is enabled)
    pub facing: f32,
}

impl Slot {
    pub fn is_visible(&self) -> bool {
        self.minion.is_some()
    }
}

/// Pre-allocated slot array (OBJ_COUNT entries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotPool {
    slots: Vec<Slot>,
    face_center: bool,
}

impl SlotPool {
    pub fn new(count: usize, face_center: bool) -> Self {
        Self {
            slots: vec![Slot::default(); count],
            face_center,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_visible()).count()
    }

    /// Bind slots to the snapshot in order, hiding the rest
    ///
    /// Minions beyond the pool size are not shown.
    pub fn reconcile(&mut self, snapshot: &MinionSnapshot) {
        if snapshot.len() > self.slots.len() {
            log::debug!(
                "Snapshot has {} minions but only {} slots",
                snapshot.len(),
                self.slots.len()
            );
        }

        for (i, slot) in self.slots.iter_mut().enumerate() {
            match snapshot.minions.get(i) {
                Some(minion) => {
                    slot.minion = Some(minion.id.clone());
                    slot.position = minion.position;
                    if self.face_center {
                        slot.facing = facing_angle(minion.position.x, minion.position.y);
                    }
                }
                None => {
                    // Keep last position; only visibility changes
                    slot.minion = None;
                }
            }
        }
    }
}
