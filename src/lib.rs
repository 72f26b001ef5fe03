//! Minion Hammer - an AR "whack the minion" minigame core
//!
//! The player's tracked hand is the hammer: dipping it below the ground plane
//! registers a hit, and any server-owned minion within reach gets killed.
//!
//! Core modules:
//! - `sim`: Deterministic session logic (hit detection, minion cache, kill scan, feedback timers)
//! - `net`: Wire protocol, in-process authority and browser fetch transport
//! - `settings`: Tuning and endpoint configuration

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod net;
pub mod settings;
pub mod sim;

pub use settings::{RetryPolicy, Settings, SettingsError};

/// Default tuning constants
pub mod consts {
    /// Number of pooled minion slots (OBJ_COUNT)
    pub const OBJ_COUNT: usize = 10;
    /// Server units → world units (UNIT_SCALE)
    pub const UNIT_SCALE: f32 = 0.1;

    /// Collision radius around the flattened hand
    pub const HAND_RADIUS: f32 = 0.3;
    /// Collision radius around each minion
    pub const MINION_RADIUS: f32 = 0.15;
    /// How far above the ground plane the hand still counts as striking
    pub const HIT_MARGIN: f32 = 0.2;

    /// Kill text stays up this long before being cleared
    pub const STATUS_RESET_MS: u32 = 1500;
    /// Delay after the status reset before the "lift your hand" hint check
    pub const HINT_DELAY_MS: u32 = 500;

    /// Fixed session timestep (60 Hz, matches typical AR frame rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
}

/// Yaw that turns a slot to face the arena center from (x, y)
#[inline]
pub fn facing_angle(x: f32, y: f32) -> f32 {
    y.atan2(x) + std::f32::consts::PI
}
