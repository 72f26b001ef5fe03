//! Session state
//!
//! One owned object per play session. Every handler takes it by `&mut`; there
//! is no module-level mutable state anywhere in the crate.

use glam::Vec3;

use super::feedback::{FeedbackController, FeedbackEvent};
use super::hit::HitStateMachine;
use super::minion::UnitScale;
use super::poller::Poller;
use super::reconciler::Reach;
use super::registry::MinionRegistry;
use super::slots::SlotPool;
use crate::net::{Request, RequestKind};
use crate::settings::Settings;

/// Derived, per-tick hand state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandState {
    /// World-space hand position
    pub position: Vec3,
    /// Whether the hand is below `ground_z + hit_margin`
    pub is_striking: bool,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Latest hand sample (None until tracking finds a hand)
    pub hand: Option<HandState>,
    /// Ground plane height reported by the plane tracker
    pub ground_z: f32,
    pub hit_margin: f32,
    /// On-screen hit indicator (shown while striking)
    pub hit_indicator_visible: bool,

    pub hit: HitStateMachine,
    pub registry: MinionRegistry,
    pub slots: SlotPool,
    pub poller: Poller,
    pub feedback: FeedbackController,
    pub reach: Reach,

    /// Session clock in seconds
    pub time: f64,
    /// Hit edges seen this session
    pub strikes: u64,
    /// Kill requests sent this session
    pub kills_requested: u64,
    /// Kill requests confirmed by the authority
    pub kills_confirmed: u64,

    outbox: Vec<Request>,
    next_seq: u64,
    /// In-flight kill requests: (seq, strike generation that issued them)
    pub(crate) pending_kills: Vec<(u64, u64)>,
}

impl SessionState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            hand: None,
            ground_z: 0.0,
            hit_margin: settings.hit_margin,
            hit_indicator_visible: false,

            hit: HitStateMachine::new(),
            registry: MinionRegistry::new(UnitScale(settings.unit_scale)),
            slots: SlotPool::new(settings.slot_count, settings.face_center),
            poller: Poller::new(settings.retry, settings.rng_seed),
            feedback: FeedbackController::new(settings.status_reset_ms, settings.hint_delay_ms),
            reach: Reach {
                hand_radius: settings.hand_radius,
                minion_radius: settings.minion_radius,
            },

            time: 0.0,
            strikes: 0,
            kills_requested: 0,
            kills_confirmed: 0,

            outbox: Vec::new(),
            next_seq: 1,
            pending_kills: Vec::new(),
        }
    }

    /// Striking threshold against the current ground plane
    pub fn threshold(&self) -> f32 {
        self.ground_z + self.hit_margin
    }

    /// Queue a request, returning its sequence number
    pub(crate) fn send(&mut self, kind: RequestKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.outbox.push(Request { seq, kind });
        seq
    }

    /// Drain requests the host should perform
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    /// Drain feedback the host should present
    pub fn take_events(&mut self) -> Vec<FeedbackEvent> {
        self.feedback.take_events()
    }
}
