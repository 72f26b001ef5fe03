//! Kill feedback: sound, status text and the "lift your hand" hint
//!
//! The controller never touches the host directly. It queues
//! `FeedbackEvent`s which the host replays through a `FeedbackSink`.
//!
//! Delayed text updates are timers owned by the controller and counted down
//! by the session tick. Each timer remembers the strike generation it was
//! scheduled under, and a newer kill cancels whatever is still pending.

use super::hit::HitStateMachine;

/// Shown after a kill; `{}` is the server's running kill count
pub fn kill_message(killed_total: u64) -> String {
    format!("Minion smashed! ({} total)", killed_total)
}

/// Shown when the hand is still down after the kill text clears
pub const LIFT_HINT: &str = "Lift your hand to strike again";

/// Host-visible side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    PlayKillSound,
    /// Replace the status text ("" clears it)
    StatusText(String),
    /// Replace the hint text ("" clears it)
    HintText(String),
}

/// Host capabilities the feedback events drive
pub trait FeedbackSink {
    fn play_kill_sound(&mut self);
    fn set_status_text(&mut self, text: &str);
    fn set_hint_text(&mut self, text: &str);
}

/// Replay queued events on a sink, in order
pub fn dispatch<S: FeedbackSink + ?Sized>(events: impl IntoIterator<Item = FeedbackEvent>, sink: &mut S) {
    for event in events {
        match event {
            FeedbackEvent::PlayKillSound => sink.play_kill_sound(),
            FeedbackEvent::StatusText(text) => sink.set_status_text(&text),
            FeedbackEvent::HintText(text) => sink.set_hint_text(&text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    ResetStatus,
    HintCheck,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    /// Seconds until it fires
    remaining: f32,
    action: TimerAction,
    /// Strike generation when the kill landed
    generation: u64,
}

/// Feedback timers and event queue
#[derive(Debug, Clone)]
pub struct FeedbackController {
    status_reset: f32,
    hint_delay: f32,
    timers: Vec<Timer>,
    events: Vec<FeedbackEvent>,
}

impl FeedbackController {
    pub fn new(status_reset_ms: u32, hint_delay_ms: u32) -> Self {
        Self {
            status_reset: status_reset_ms as f32 / 1000.0,
            hint_delay: hint_delay_ms as f32 / 1000.0,
            timers: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Drain queued events
    pub fn take_events(&mut self) -> Vec<FeedbackEvent> {
        std::mem::take(&mut self.events)
    }

    /// A kill request succeeded
    pub fn on_kill(&mut self, killed_total: u64, generation: u64) {
        self.events.push(FeedbackEvent::PlayKillSound);
        self.events
            .push(FeedbackEvent::StatusText(kill_message(killed_total)));

        // A newer kill owns the text now
        self.timers.clear();
        self.timers.push(Timer {
            remaining: self.status_reset,
            action: TimerAction::ResetStatus,
            generation,
        });
    }

    /// The hand left striking position
    pub fn on_release(&mut self) {
        self.events.push(FeedbackEvent::HintText(String::new()));
    }

    /// Count down timers; fired ones read the hit state as it is now but only
    /// act if it still belongs to the strike that scheduled them
    pub fn tick(&mut self, dt: f32, hit: &HitStateMachine) {
        let mut fired = Vec::new();
        self.timers.retain_mut(|t| {
            t.remaining -= dt;
            if t.remaining <= 0.0 {
                fired.push(*t);
                false
            } else {
                true
            }
        });

        for timer in fired {
            match timer.action {
                TimerAction::ResetStatus => {
                    self.events.push(FeedbackEvent::StatusText(String::new()));
                    self.timers.push(Timer {
                        remaining: self.hint_delay,
                        action: TimerAction::HintCheck,
                        generation: timer.generation,
                    });
                }
                TimerAction::HintCheck => {
                    if hit.is_striking() && hit.generation() == timer.generation {
                        self.events
                            .push(FeedbackEvent::HintText(LIFT_HINT.to_string()));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn run(ctrl: &mut FeedbackController, hit: &HitStateMachine, seconds: f32) {
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            ctrl.tick(DT, hit);
        }
    }

    fn striking() -> HitStateMachine {
        let mut hit = HitStateMachine::new();
        hit.set_striking(true);
        hit
    }

    #[test]
    fn test_kill_plays_sound_and_sets_text() {
        let mut ctrl = FeedbackController::new(1500, 500);
        ctrl.on_kill(3, 1);
        assert_eq!(
            ctrl.take_events(),
            vec![
                FeedbackEvent::PlayKillSound,
                FeedbackEvent::StatusText(kill_message(3)),
            ]
        );
        assert_eq!(ctrl.pending_timers(), 1);
    }

    #[test]
    fn test_status_resets_then_hint_shows_while_striking() {
        let hit = striking();
        let mut ctrl = FeedbackController::new(1500, 500);
        ctrl.on_kill(1, hit.generation());
        ctrl.take_events();

        run(&mut ctrl, &hit, 1.4);
        assert!(ctrl.take_events().is_empty());

        run(&mut ctrl, &hit, 0.2);
        assert_eq!(ctrl.take_events(), vec![FeedbackEvent::StatusText(String::new())]);

        run(&mut ctrl, &hit, 0.6);
        assert_eq!(
            ctrl.take_events(),
            vec![FeedbackEvent::HintText(LIFT_HINT.to_string())]
        );
        assert_eq!(ctrl.pending_timers(), 0);
    }

    #[test]
    fn test_no_hint_after_hand_lifted() {
        let mut hit = striking();
        let mut ctrl = FeedbackController::new(1500, 500);
        ctrl.on_kill(1, hit.generation());
        hit.set_striking(false);
        run(&mut ctrl, &hit, 3.0);
        assert_eq!(ctrl.take_events().len(), 3); // sound, kill text, reset
    }

    #[test]
    fn test_no_hint_for_a_newer_strike() {
        let mut hit = striking();
        let mut ctrl = FeedbackController::new(1500, 500);
        ctrl.on_kill(1, hit.generation());
        ctrl.take_events();
        // Lift and strike again before the hint check fires
        hit.set_striking(false);
        hit.set_striking(true);
        run(&mut ctrl, &hit, 3.0);
        assert!(
            !ctrl
                .take_events()
                .contains(&FeedbackEvent::HintText(LIFT_HINT.to_string()))
        );
    }

    #[test]
    fn test_newer_kill_cancels_pending_timers() {
        let hit = striking();
        let mut ctrl = FeedbackController::new(1500, 500);
        ctrl.on_kill(1, hit.generation());
        run(&mut ctrl, &hit, 1.0);
        ctrl.on_kill(2, hit.generation());
        ctrl.take_events();

        // The first kill's reset would have fired at 1.5s; only the second one does, at 2.5s
        run(&mut ctrl, &hit, 1.0);
        assert!(ctrl.take_events().is_empty());
        run(&mut ctrl, &hit, 0.6);
        assert_eq!(ctrl.take_events(), vec![FeedbackEvent::StatusText(String::new())]);
    }

    #[derive(Default)]
    struct Recorder {
        sounds: u32,
        status: String,
        hint: String,
    }

    impl FeedbackSink for Recorder {
        fn play_kill_sound(&mut self) {
            self.sounds += 1;
        }
        fn set_status_text(&mut self, text: &str) {
            self.status = text.to_string();
        }
        fn set_hint_text(&mut self, text: &str) {
            self.hint = text.to_string();
        }
    }

    #[test]
    fn test_dispatch_drives_sink_in_order() {
        let mut sink = Recorder::default();
        dispatch(
            vec![
                FeedbackEvent::PlayKillSound,
                FeedbackEvent::StatusText("a".into()),
                FeedbackEvent::StatusText("b".into()),
                FeedbackEvent::HintText(LIFT_HINT.into()),
            ],
            &mut sink,
        );
        assert_eq!(sink.sounds, 1);
        assert_eq!(sink.status, "b");
        assert_eq!(sink.hint, LIFT_HINT);
    }
}
