//! In-process minion authority
//!
//! Holds canonical minion positions in server units and answers the same two
//! endpoints as the remote service, producing identical JSON bodies. Used by
//! the native harness and by session tests.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{NetError, Request, RequestKind, Response};
use crate::sim::minion::{MinionId, ServerObject, ServerSnapshot};

/// Minions wander inside this square (server units)
const ARENA_HALF_EXTENT: f32 = 10.0;
/// Wander speed (server units per second)
const WANDER_SPEED: f32 = 1.5;

#[derive(Debug, Clone)]
struct Wanderer {
    id: u64,
    pos: (f32, f32),
    /// Height above the arena floor; wanderers stay on the floor
    z: f32,
    heading: f32,
}

/// Local stand-in for the minion server
#[derive(Debug, Clone)]
pub struct LocalAuthority {
    rng: Pcg32,
    minions: Vec<Wanderer>,
    /// Keep this many minions alive (0 = never respawn)
    population: usize,
    killed: u64,
    /// Seconds since start
    time: f64,
    next_id: u64,
    /// Force the next N responses to fail with this status
    fail_next: Option<(u16, u32)>,
}

impl LocalAuthority {
    pub fn new(seed: u64, population: usize) -> Self {
        let mut authority = Self {
            rng: Pcg32::seed_from_u64(seed),
            minions: Vec::new(),
            population,
            killed: 0,
            time: 0.0,
            next_id: 1,
            fail_next: None,
        };
        authority.respawn();
        authority
    }

    /// Authority with fixed minions and no respawning
    pub fn with_minions(points: &[(f32, f32, f32)]) -> Self {
        let mut authority = Self::new(0, 0);
        for &(x, y, z) in points {
            let id = authority.next_id;
            authority.next_id += 1;
            authority.minions.push(Wanderer {
                id,
                pos: (x, y),
                z,
                heading: 0.0,
            });
        }
        authority
    }

    pub fn alive(&self) -> usize {
        self.minions.len()
    }

    pub fn killed(&self) -> u64 {
        self.killed
    }

    /// Make the next `count` requests fail with `status`
    pub fn fail_next(&mut self, status: u16, count: u32) {
        self.fail_next = Some((status, count));
    }

    /// Advance minion movement (wandering minions only)
    pub fn step(&mut self, dt: f32) {
        self.time += dt as f64;
        if self.population == 0 {
            return;
        }
        for m in &mut self.minions {
            m.heading += self.rng.random_range(-1.0f32..1.0) * dt;
            m.pos.0 += m.heading.cos() * WANDER_SPEED * dt;
            m.pos.1 += m.heading.sin() * WANDER_SPEED * dt;
            // Bounce off the arena edge
            if m.pos.0.abs() > ARENA_HALF_EXTENT || m.pos.1.abs() > ARENA_HALF_EXTENT {
                m.heading += std::f32::consts::PI;
                m.pos.0 = m.pos.0.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
                m.pos.1 = m.pos.1.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
            }
        }
    }

    /// Answer a request with raw HTTP status and body
    pub fn handle_raw(&mut self, request: &Request) -> (u16, String) {
        if let Some((status, remaining)) = self.fail_next {
            self.fail_next = (remaining > 1).then(|| (status, remaining - 1));
            return (status, String::new());
        }

        match &request.kind {
            RequestKind::List => (200, self.body()),
            RequestKind::Kill(id) => {
                let before = self.minions.len();
                self.minions.retain(|m| MinionId::from(m.id) != *id);
                if self.minions.len() == before {
                    return (404, String::new());
                }
                self.killed += 1;
                self.respawn();
                (200, self.body())
            }
        }
    }

    /// Answer a request as a session `Response`
    pub fn handle(&mut self, request: &Request) -> Response {
        let (status, body) = self.handle_raw(request);
        Response::from_http(request, status, &body)
    }

    /// Answer with a transport-level failure (connection refused, etc.)
    pub fn unreachable(request: &Request) -> Response {
        Response::failed(request, NetError::Transport("connection refused".to_string()))
    }

    fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            ts: (self.time * 1000.0).round(),
            killed: self.killed,
            objects: self
                .minions
                .iter()
                .map(|m| ServerObject {
                    id: MinionId::from(m.id),
                    x: m.pos.0,
                    y: m.pos.1,
                    z: m.z,
                })
                .collect(),
        }
    }

    fn body(&self) -> String {
        // ServerSnapshot only holds plain numbers and strings
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }

    fn respawn(&mut self) {
        while self.minions.len() < self.population {
            let id = self.next_id;
            self.next_id += 1;
            let pos = (
                self.rng.random_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
                self.rng.random_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
            );
            let heading = self.rng.random_range(0.0..std::f32::consts::TAU);
            self.minions.push(Wanderer {
                id,
                pos,
                z: 0.0,
                heading,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(seq: u64) -> Request {
        Request {
            seq,
            kind: RequestKind::List,
        }
    }

    #[test]
    fn test_list_body_is_protocol_shaped() {
        let mut auth = LocalAuthority::with_minions(&[(1.0, 2.0, 0.0)]);
        let (status, body) = auth.handle_raw(&list(1));
        assert_eq!(status, 200);
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(value["ts"].is_number());
        assert_eq!(value["killed"], 0);
        assert_eq!(value["objects"][0]["x"], 1.0);
    }

    #[test]
    fn test_fixed_minions_report_their_height() {
        let mut auth = LocalAuthority::with_minions(&[(1.0, 2.0, 3.5)]);
        let snap = auth.handle(&list(1)).result.unwrap();
        assert_eq!(snap.objects[0].z, 3.5);
    }

    #[test]
    fn test_kill_returns_post_kill_list() {
        let mut auth = LocalAuthority::with_minions(&[(0.0, 0.0, 0.0), (5.0, 5.0, 0.0)]);
        let resp = auth.handle(&Request {
            seq: 1,
            kind: RequestKind::Kill(MinionId::from(1u64)),
        });
        let snap = resp.result.unwrap();
        assert_eq!(snap.killed, 1);
        assert_eq!(snap.objects.len(), 1);
        assert_eq!(snap.objects[0].id, MinionId::from(2u64));
    }

    #[test]
    fn test_kill_unknown_is_404() {
        let mut auth = LocalAuthority::with_minions(&[]);
        let resp = auth.handle(&Request {
            seq: 1,
            kind: RequestKind::Kill(MinionId::from(9u64)),
        });
        assert_eq!(resp.result, Err(NetError::HttpStatus(404)));
    }

    #[test]
    fn test_population_respawns_after_kill() {
        let mut auth = LocalAuthority::new(7, 4);
        assert_eq!(auth.alive(), 4);
        auth.handle(&Request {
            seq: 1,
            kind: RequestKind::Kill(MinionId::from(1u64)),
        });
        assert_eq!(auth.alive(), 4);
        assert_eq!(auth.killed(), 1);
    }

    #[test]
    fn test_forced_failures_run_out() {
        let mut auth = LocalAuthority::with_minions(&[]);
        auth.fail_next(503, 2);
        assert_eq!(auth.handle_raw(&list(1)).0, 503);
        assert_eq!(auth.handle_raw(&list(2)).0, 503);
        assert_eq!(auth.handle_raw(&list(3)).0, 200);
    }

    #[test]
    fn test_wanderers_stay_in_arena() {
        let mut auth = LocalAuthority::new(3, 6);
        for _ in 0..2000 {
            auth.step(1.0 / 30.0);
        }
        let snap = auth.snapshot();
        assert!(snap
            .objects
            .iter()
            .all(|o| o.x.abs() <= ARENA_HALF_EXTENT && o.y.abs() <= ARENA_HALF_EXTENT));
    }
}
