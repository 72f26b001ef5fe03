//! Hit state machine
//!
//! Turns a continuously sampled hand depth into edge-triggered hit events.
//! Only changes of the striking condition are evaluated, so redundant
//! same-value ticks are free and never re-fire.

use serde::{Deserialize, Serialize};

/// Whether the hand is currently in striking position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitPhase {
    /// Hand above the threshold
    #[default]
    Idle,
    /// Hand below the threshold
    Striking,
}

/// Result of feeding a depth sample into the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTransition {
    /// Idle → Striking (the hit edge). Carries the new strike generation.
    Struck { generation: u64 },
    /// Striking → Idle
    Released,
}

/// Edge-triggered hit detector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitStateMachine {
    phase: HitPhase,
    /// Incremented on every hit edge; lets delayed work detect a newer strike
    generation: u64,
}

impl HitStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> HitPhase {
        self.phase
    }

    pub fn is_striking(&self) -> bool {
        self.phase == HitPhase::Striking
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Feed the current hand depth against `ground_z + margin`
    pub fn update(&mut self, hand_z: f32, threshold: f32) -> Option<HitTransition> {
        self.set_striking(hand_z < threshold)
    }

    /// Feed the already-evaluated striking condition
    pub fn set_striking(&mut self, striking: bool) -> Option<HitTransition> {
        match (self.phase, striking) {
            (HitPhase::Idle, true) => {
                self.phase = HitPhase::Striking;
                self.generation += 1;
                Some(HitTransition::Struck {
                    generation: self.generation,
                })
            }
            (HitPhase::Striking, false) => {
                self.phase = HitPhase::Idle;
                Some(HitTransition::Released)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let hit = HitStateMachine::new();
        assert_eq!(hit.phase(), HitPhase::Idle);
        assert_eq!(hit.generation(), 0);
    }

    #[test]
    fn test_fires_once_per_dip() {
        let mut hit = HitStateMachine::new();
        let threshold = 0.2;
        // Descend through the threshold, linger, then rise back out
        let zs = [0.6, 0.4, 0.25, 0.1, 0.05, 0.0, 0.05, 0.1, 0.3, 0.5];

        let mut edges = 0;
        let mut releases = 0;
        for z in zs {
            match hit.update(z, threshold) {
                Some(HitTransition::Struck { .. }) => edges += 1,
                Some(HitTransition::Released) => releases += 1,
                None => {}
            }
        }

        assert_eq!(edges, 1);
        assert_eq!(releases, 1);
        assert_eq!(hit.phase(), HitPhase::Idle);
    }

    #[test]
    fn test_redundant_ticks_do_not_refire() {
        let mut hit = HitStateMachine::new();
        assert!(matches!(
            hit.update(0.0, 0.2),
            Some(HitTransition::Struck { generation: 1 })
        ));
        for _ in 0..100 {
            assert_eq!(hit.update(0.0, 0.2), None);
        }
        assert!(hit.is_striking());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut hit = HitStateMachine::new();
        assert_eq!(hit.update(0.2, 0.2), None);
        assert_eq!(hit.phase(), HitPhase::Idle);
    }

    #[test]
    fn test_generation_advances_per_strike() {
        let mut hit = HitStateMachine::new();
        hit.update(0.0, 0.2);
        hit.update(1.0, 0.2);
        assert_eq!(
            hit.update(0.0, 0.2),
            Some(HitTransition::Struck { generation: 2 })
        );
    }
}
