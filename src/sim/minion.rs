//! Minion data model
//!
//! Two representations exist on purpose: `ServerSnapshot` mirrors the JSON the
//! authority sends (server units), `MinionSnapshot` is what the session works
//! with (world units). `UnitScale::to_world` is the only crossing point.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Opaque server-assigned minion identifier
///
/// The authority may send ids as strings or numbers; both normalize to the
/// same textual form so `1` and `"1"` name the same minion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireId", into = "String")]
pub struct MinionId(String);

impl MinionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MinionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<MinionId> for String {
    fn from(id: MinionId) -> Self {
        id.0
    }
}

impl From<u64> for MinionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for MinionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl From<WireId> for MinionId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Int(n) => Self(n.to_string()),
            WireId::UInt(n) => Self(n.to_string()),
            WireId::Float(n) => Self(n.to_string()),
            WireId::Text(s) => Self(s),
        }
    }
}

/// One minion as the authority reports it (server units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerObject {
    pub id: MinionId,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Body of `GET /objects` and `GET /objects/kill/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServerSnapshot {
    /// Server timestamp of this snapshot
    #[serde(default)]
    pub ts: f64,
    /// Total minions killed so far
    #[serde(default)]
    pub killed: u64,
    pub objects: Vec<ServerObject>,
}

/// A minion in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minion {
    pub id: MinionId,
    pub position: Vec3,
}

/// Full authoritative minion list in world units
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinionSnapshot {
    pub ts: f64,
    pub killed: u64,
    pub minions: Vec<Minion>,
}

impl MinionSnapshot {
    pub fn len(&self) -> usize {
        self.minions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minions.is_empty()
    }
}

/// Server units → world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitScale(pub f32);

impl UnitScale {
    pub fn point(&self, x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z) * self.0
    }

    /// Convert a whole server snapshot, preserving order
    pub fn to_world(&self, snapshot: ServerSnapshot) -> MinionSnapshot {
        MinionSnapshot {
            ts: snapshot.ts,
            killed: snapshot.killed,
            minions: snapshot
                .objects
                .into_iter()
                .map(|o| Minion {
                    position: self.point(o.x, o.y, o.z),
                    id: o.id,
                })
                .collect(),
        }
    }
}
