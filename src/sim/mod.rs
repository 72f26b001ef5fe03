//! Deterministic session module
//!
//! All gameplay decisions live here. This module must stay free of I/O:
//! - Time only advances through `tick(dt)`
//! - Network traffic leaves as queued `Request`s and returns through `deliver`
//! - Host effects leave as queued `FeedbackEvent`s

pub mod feedback;
pub mod geometry;
pub mod hit;
pub mod minion;
pub mod poller;
pub mod reconciler;
pub mod registry;
pub mod slots;
pub mod state;
pub mod tick;

pub use feedback::{FeedbackController, FeedbackEvent, FeedbackSink, dispatch};
pub use geometry::{distance, flatten, spheres_overlap};
pub use hit::{HitPhase, HitStateMachine, HitTransition};
pub use minion::{Minion, MinionId, MinionSnapshot, ServerObject, ServerSnapshot, UnitScale};
pub use poller::{PollStatus, Poller};
pub use reconciler::{Reach, minions_in_reach};
pub use registry::{ApplyOutcome, MinionRegistry};
pub use slots::{Slot, SlotPool};
pub use state::{HandState, SessionState};
pub use tick::{TickInput, deliver, start, tick};
