//! Kill scan run on each hit edge
//!
//! Depth already gated the hit, so reach is judged in the ground plane: the
//! hand is flattened to z = 0 before the sphere test.

use glam::Vec3;

use super::geometry::{flatten, spheres_overlap};
use super::minion::{Minion, MinionId};

/// Collision radii for the scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach {
    pub hand_radius: f32,
    pub minion_radius: f32,
}

/// Ids of every cached minion within reach of the hand
///
/// Order follows the cache; each colliding minion appears once.
pub fn minions_in_reach(minions: &[Minion], hand: Vec3, reach: Reach) -> Vec<MinionId> {
    let hand = flatten(hand);
    minions
        .iter()
        .filter(|m| spheres_overlap(m.position, reach.minion_radius, hand, reach.hand_radius))
        .map(|m| m.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REACH: Reach = Reach {
        hand_radius: 0.3,
        minion_radius: 0.15,
    };

    fn minion(id: u64, x: f32, y: f32) -> Minion {
        Minion {
            id: MinionId::from(id),
            position: Vec3::new(x, y, 0.0),
        }
    }

    #[test]
    fn test_close_minion_is_hit() {
        let hits = minions_in_reach(&[minion(1, 0.2, 0.0)], Vec3::ZERO, REACH);
        assert_eq!(hits, vec![MinionId::from(1u64)]);
    }

    #[test]
    fn test_depth_is_ignored() {
        // Hand well above the plane still reaches a minion below it
        let hits = minions_in_reach(&[minion(1, 0.2, 0.0)], Vec3::new(0.0, 0.0, 5.0), REACH);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_far_minion_is_missed() {
        let hits = minions_in_reach(&[minion(1, 1.0, 1.0)], Vec3::ZERO, REACH);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_every_overlapping_minion_is_hit() {
        let minions = [minion(1, 0.1, 0.0), minion(2, 5.0, 5.0), minion(3, -0.1, 0.2)];
        let hits = minions_in_reach(&minions, Vec3::ZERO, REACH);
        assert_eq!(hits, vec![MinionId::from(1u64), MinionId::from(3u64)]);
    }

    #[test]
    fn test_empty_cache_hits_nothing() {
        assert!(minions_in_reach(&[], Vec3::ZERO, REACH).is_empty());
    }
}
