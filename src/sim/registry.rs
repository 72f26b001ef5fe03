//! Client-side minion cache
//!
//! The cache is only ever replaced wholesale by a fetched snapshot. Responses
//! are gated by request sequence number so a slow response can never
//! overwrite a newer one, whichever order they land in.

use serde::{Deserialize, Serialize};

use super::minion::{Minion, MinionSnapshot, ServerSnapshot, UnitScale};

/// What happened to a delivered snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Snapshot replaced the cache
    Applied,
    /// A response to a later request was already applied; snapshot dropped
    Stale { applied_seq: u64 },
}

/// Authoritative minion cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinionRegistry {
    scale: UnitScale,
    snapshot: MinionSnapshot,
    /// Sequence number of the request whose response is cached (0 = none yet)
    applied_seq: u64,
}

impl MinionRegistry {
    pub fn new(scale: UnitScale) -> Self {
        Self {
            scale,
            snapshot: MinionSnapshot::default(),
            applied_seq: 0,
        }
    }

    pub fn snapshot(&self) -> &MinionSnapshot {
        &self.snapshot
    }

    pub fn minions(&self) -> &[Minion] {
        &self.snapshot.minions
    }

    pub fn killed(&self) -> u64 {
        self.snapshot.killed
    }

    pub fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    /// Replace the cache with a server snapshot fetched by request `seq`
    pub fn apply(&mut self, seq: u64, snapshot: ServerSnapshot) -> ApplyOutcome {
        if seq <= self.applied_seq {
            return ApplyOutcome::Stale {
                applied_seq: self.applied_seq,
            };
        }
        self.snapshot = self.scale.to_world(snapshot);
        self.applied_seq = seq;
        ApplyOutcome::Applied
    }
}
