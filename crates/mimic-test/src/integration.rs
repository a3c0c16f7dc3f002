//! End-to-end replication test suite
//!
//! Drives randomly animated entities across a simulated session and checks
//! that every observer ends up where the owner is once the animation rests.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mimic_core::{EntityId, MimicResult, NodeId, ParameterKind, StateHash, TransitionHash};
use mimic_runtime::{PeerConfig, ReplicationConfig};
use mimic_state::{AnimationBackend, MemoryBackend, SnapshotReader, StateInfo};

use crate::chaos::ChaosConfig;
use crate::simulator::SessionSimulator;

// ============================================================================
// FIXTURES
// ============================================================================

pub const IDLE: StateHash = StateHash(0x1D1E_0001);
pub const WALK: StateHash = StateHash(0x3A1C_0002);
pub const RUN: StateHash = StateHash(-0x5E1F_0003);

const STATES: [StateHash; 3] = [IDLE, WALK, RUN];

/// Parameter layout shared by every peer in the suite
pub fn humanoid() -> MemoryBackend {
    MemoryBackend::new()
        .with_float("speed", 0.0)
        .with_int("weapon", 0)
        .with_bool("grounded", true)
        .with_trigger("jump")
}

pub fn humanoid_in(state: StateHash) -> MemoryBackend {
    let mut backend = humanoid();
    backend.settle(state, 0.0);
    backend
}

fn transition_between(from: StateHash, to: StateHash) -> TransitionHash {
    TransitionHash::new(from.0.rotate_left(7) ^ to.0)
}

// ============================================================================
// ANIMATION DRIVER
// ============================================================================

/// Random-walk animation for an owner's backend, one call per frame
pub struct AnimationDriver {
    rng: StdRng,
    /// Chance per frame of leaving a settled state
    transition_prob: f64,
    /// Progress per frame while blending
    blend_step: f32,
}

impl AnimationDriver {
    pub fn new(seed: u64) -> Self {
        AnimationDriver {
            rng: StdRng::seed_from_u64(seed),
            transition_prob: 0.05,
            blend_step: 0.2,
        }
    }

    pub fn drive(&mut self, backend: &mut MemoryBackend) {
        let speed = backend.get_float("speed") + self.rng.gen_range(-0.5f32..0.5);
        backend.drive_float("speed", speed.clamp(0.0, 8.0));
        if self.rng.gen_bool(0.02) {
            backend.drive_int("weapon", self.rng.gen_range(0..4));
        }
        if self.rng.gen_bool(0.05) {
            backend.drive_bool("grounded", !backend.get_bool("grounded"));
        }

        if backend.is_in_transition() {
            let progress = backend.next_state().normalized_time + self.blend_step;
            if progress >= 1.0 {
                backend.complete_transition();
            } else {
                backend.set_progress(progress);
            }
            return;
        }

        if self.rng.gen_bool(self.transition_prob) {
            let from = backend.current_state().hash;
            let choices: Vec<StateHash> = STATES.into_iter().filter(|s| *s != from).collect();
            let to = choices[self.rng.gen_range(0..choices.len())];
            backend.begin_transition(transition_between(from, to), StateInfo::new(to, 0.0));
        }
    }
}

// ============================================================================
// CONVERGENCE HARNESS
// ============================================================================

#[derive(Clone, Debug)]
pub struct ConvergenceConfig {
    pub peers: u64,
    pub entities: u64,
    /// Time spent animating
    pub active: Duration,
    /// Time the animation rests before observers are checked
    pub quiet: Duration,
    pub frame: Duration,
    pub chaos: ChaosConfig,
    pub replication: ReplicationConfig,
    pub seed: u64,
}

impl ConvergenceConfig {
    /// Two peers, one entity, perfect links
    pub fn minimal() -> Self {
        ConvergenceConfig {
            peers: 2,
            entities: 1,
            active: Duration::from_secs(3),
            quiet: Duration::from_secs(1),
            frame: Duration::from_millis(16),
            chaos: ChaosConfig::perfect(),
            replication: ReplicationConfig::default(),
            seed: 1,
        }
    }

    /// Four peers, entities owned round-robin, lossy links with state refresh
    pub fn lossy() -> Self {
        ConvergenceConfig {
            peers: 4,
            entities: 6,
            active: Duration::from_secs(5),
            quiet: Duration::from_secs(3),
            frame: Duration::from_millis(16),
            chaos: ChaosConfig::lossy(0.1),
            replication: ReplicationConfig {
                state_refresh_secs: Some(0.5),
                ..Default::default()
            },
            seed: 7,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConvergenceResult {
    /// (entity, observer) pairs checked
    pub observations: usize,
    pub state_mismatches: usize,
    pub parameter_mismatches: usize,
    pub receive_errors: usize,
}

impl ConvergenceResult {
    pub fn passed(&self) -> bool {
        self.state_mismatches == 0 && self.parameter_mismatches == 0 && self.receive_errors == 0
    }
}

pub struct ConvergenceHarness {
    config: ConvergenceConfig,
    sim: SessionSimulator,
    /// (entity, owner, driver)
    drivers: Vec<(EntityId, NodeId, AnimationDriver)>,
}

impl ConvergenceHarness {
    pub fn new(config: ConvergenceConfig) -> MimicResult<Self> {
        let peer_config = PeerConfig {
            replication: config.replication.clone(),
            ..Default::default()
        };
        let mut sim =
            SessionSimulator::new(config.chaos.clone(), config.seed).with_peer_config(peer_config);
        for id in 1..=config.peers {
            sim.add_peer(NodeId::new(id))?;
        }

        let mut drivers = Vec::new();
        for i in 0..config.entities {
            let entity = EntityId::new(1000 + i);
            let owner = NodeId::new(1 + i % config.peers);
            sim.spawn(entity, owner, humanoid_in(STATES[i as usize % STATES.len()]), humanoid)?;
            drivers.push((entity, owner, AnimationDriver::new(config.seed.wrapping_add(i))));
        }

        Ok(ConvergenceHarness {
            config,
            sim,
            drivers,
        })
    }

    pub fn run(&mut self) -> MimicResult<ConvergenceResult> {
        let frame = self.config.frame;

        let end = self.sim.now() + self.config.active;
        while self.sim.now() < end {
            for (entity, owner, driver) in &mut self.drivers {
                if let Some(backend) = self.sim.backend_mut(*owner, *entity) {
                    driver.drive(backend);
                }
            }
            self.sim.step(frame)?;
        }

        // Rest: finish blends, stop driving
        for (entity, owner, _) in &self.drivers {
            if let Some(backend) = self.sim.backend_mut(*owner, *entity) {
                backend.complete_transition();
            }
        }
        self.sim.run(self.config.quiet, frame)?;

        Ok(self.check())
    }

    fn check(&self) -> ConvergenceResult {
        let mut result = ConvergenceResult {
            receive_errors: self.sim.errors().len(),
            ..Default::default()
        };

        for (entity, owner, _) in &self.drivers {
            let Some(source) = self.sim.backend(*owner, *entity) else {
                continue;
            };
            let target = SnapshotReader::read_motion(source).target().hash;

            for (node, peer) in self.sim.peers() {
                if node == *owner {
                    continue;
                }
                let Some(mirror) = peer.backend(*entity) else {
                    continue;
                };
                result.observations += 1;

                if mirror.current_state().hash != target {
                    result.state_mismatches += 1;
                }
                if !parameters_match(source, mirror) {
                    result.parameter_mismatches += 1;
                }
            }
        }

        result
    }

    pub fn simulator(&self) -> &SessionSimulator {
        &self.sim
    }
}

/// Float, int and bool parameters agree. Triggers are one-shot and skipped.
fn parameters_match(source: &MemoryBackend, mirror: &MemoryBackend) -> bool {
    source.parameters().iter().all(|info| {
        let name = info.name.as_str();
        match ParameterKind::from_code(info.kind_code) {
            Some(ParameterKind::Float) => source.get_float(name) == mirror.get_float(name),
            Some(ParameterKind::Int) => source.get_int(name) == mirror.get_int(name),
            Some(ParameterKind::Bool) => source.get_bool(name) == mirror.get_bool(name),
            Some(ParameterKind::Trigger) | None => true,
        }
    })
}
