//! Session tick and response delivery
//!
//! `tick` consumes one frame of host input; `deliver` consumes one finished
//! network request. Both run on the host's single logical thread, in
//! whatever order the host observes them.

use glam::{Mat4, Vec3};

use super::hit::HitTransition;
use super::minion::ServerSnapshot;
use super::reconciler::minions_in_reach;
use super::registry::ApplyOutcome;
use super::state::{HandState, SessionState};
use crate::net::{RequestKind, Response};

/// Host input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Hand position in camera space (None while tracking has no hand)
    pub hand_camera: Option<Vec3>,
    /// Camera → world transform
    pub camera_world: Mat4,
    /// New ground plane height (plane tracker re-anchored)
    pub ground_z: Option<f32>,
}

/// Kick off the poll chain without waiting for the first tick
pub fn start(state: &mut SessionState) {
    pump_poll(state);
}

/// Advance the session by one frame
pub fn tick(state: &mut SessionState, input: &TickInput, dt: f32) {
    state.time += dt as f64;

    if let Some(z) = input.ground_z {
        state.ground_z = z;
    }

    if let Some(hand_camera) = input.hand_camera {
        let position = input.camera_world.transform_point3(hand_camera);
        let is_striking = position.z < state.threshold();
        state.hand = Some(HandState {
            position,
            is_striking,
        });
        state.hit_indicator_visible = is_striking;

        match state.hit.set_striking(is_striking) {
            Some(HitTransition::Struck { generation }) => on_hit_edge(state, position, generation),
            Some(HitTransition::Released) => state.feedback.on_release(),
            None => {}
        }
    }

    state.poller.tick(dt);
    pump_poll(state);

    state.feedback.tick(dt, &state.hit);
}

/// Feed a completed request back into the session
pub fn deliver(state: &mut SessionState, response: Response) {
    let Response { seq, kind, result } = response;
    match kind {
        RequestKind::List => {
            if !state.poller.owns(seq) {
                log::debug!("Ignoring list response #{} outside the poll chain", seq);
                return;
            }
            match result {
                Ok(snapshot) => {
                    apply_snapshot(state, seq, snapshot);
                    state.poller.succeeded();
                }
                Err(e) => {
                    state.poller.failed();
                    if state.poller.is_stopped() {
                        log::error!("Minion poll failed, polling stopped: {}", e);
                    } else {
                        log::warn!(
                            "Minion poll failed ({} in a row), retrying: {}",
                            state.poller.failures(),
                            e
                        );
                    }
                }
            }
            pump_poll(state);
        }
        RequestKind::Kill(id) => {
            let generation = take_pending_kill(state, seq);
            match result {
                Ok(snapshot) => {
                    let killed = snapshot.killed;
                    apply_snapshot(state, seq, snapshot);
                    state.kills_confirmed += 1;
                    log::info!("Killed minion {} ({} total)", id, killed);
                    state
                        .feedback
                        .on_kill(killed, generation.unwrap_or(state.hit.generation()));
                }
                Err(e) => {
                    log::warn!("Kill request for minion {} failed: {}", id, e);
                }
            }
        }
    }
}

/// Rising edge: scan the cache and request a kill for every minion in reach
fn on_hit_edge(state: &mut SessionState, hand: Vec3, generation: u64) {
    state.strikes += 1;
    log::info!("HIT at ({:.2}, {:.2})", hand.x, hand.y);

    let targets = minions_in_reach(state.registry.minions(), hand, state.reach);
    for id in targets {
        log::info!("Requesting kill for minion {}", id);
        let seq = state.send(RequestKind::Kill(id));
        state.pending_kills.push((seq, generation));
        state.kills_requested += 1;
    }
}

fn take_pending_kill(state: &mut SessionState, seq: u64) -> Option<u64> {
    let index = state.pending_kills.iter().position(|&(s, _)| s == seq)?;
    Some(state.pending_kills.swap_remove(index).1)
}

fn apply_snapshot(state: &mut SessionState, seq: u64, snapshot: ServerSnapshot) {
    match state.registry.apply(seq, snapshot) {
        ApplyOutcome::Applied => state.slots.reconcile(state.registry.snapshot()),
        ApplyOutcome::Stale { applied_seq } => {
            log::debug!(
                "Dropping stale snapshot #{} (already applied #{})",
                seq,
                applied_seq
            );
        }
    }
}

/// Issue the next list request if the chain is ready for one
fn pump_poll(state: &mut SessionState) {
    if state.poller.wants_request() {
        let seq = state.send(RequestKind::List);
        state.poller.issued(seq);
    }
}
