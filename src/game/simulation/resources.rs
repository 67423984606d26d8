/// Resource definitions for the simulation.
///
/// Tick counter, runtime tuning, the injectable random source used by
/// collision jitter, and the end-of-tick removal list.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::pathfinding::PathfindingTuning;
use crate::game::structures::GridGeometry;
use crate::game::unit::UnitArchetype;
use super::collision::CollisionTuning;
use super::physics::ForceTuning;

// ============================================================================
// Tick Counter
// ============================================================================

/// Number of fixed simulation ticks executed so far.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Runtime simulation configuration.
///
/// Built from [`InitialConfig`](crate::game::config::InitialConfig) once at
/// startup and grouped by the subsystem that reads it, so pure helpers can
/// take just the slice they need.
#[derive(Resource, Clone, Debug)]
pub struct SimConfig {
    pub tick_rate: f64,
    pub grid: GridGeometry,
    /// Expected level dimensions in cells (columns, rows).
    pub level_size: UVec2,
    pub pathfinding: PathfindingTuning,
    pub collision: CollisionTuning,
    pub force: ForceTuning,
    pub soldier: UnitArchetype,
    pub worker: UnitArchetype,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            grid: GridGeometry::default(),
            level_size: UVec2::new(50, 32),
            pathfinding: PathfindingTuning::default(),
            collision: CollisionTuning::default(),
            force: ForceTuning::default(),
            soldier: UnitArchetype::SOLDIER,
            worker: UnitArchetype::WORKER,
        }
    }
}

// ============================================================================
// Randomness
// ============================================================================

/// Source of the random draws used to break collision symmetry.
///
/// Implemented by the seeded [`SeededJitter`] at runtime; tests supply
/// scripted sequences to assert exact force vectors.
pub trait JitterSource: Send + Sync {
    /// Uniform integer angle in `[-limit, limit]` degrees.
    fn jitter_degrees(&mut self, limit: i32) -> i32;

    /// Uniform integer percentage in `[min_percent, max_percent]`, as a factor (150 -> 1.5).
    fn impulse_scale(&mut self, min_percent: i32, max_percent: i32) -> f32;
}

/// Deterministic jitter backed by a seeded [`StdRng`].
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl JitterSource for SeededJitter {
    fn jitter_degrees(&mut self, limit: i32) -> i32 {
        let limit = limit.abs();
        self.rng.random_range(-limit..=limit)
    }

    fn impulse_scale(&mut self, min_percent: i32, max_percent: i32) -> f32 {
        let (lo, hi) = if min_percent <= max_percent {
            (min_percent, max_percent)
        } else {
            (max_percent, min_percent)
        };
        self.rng.random_range(lo..=hi) as f32 / 100.0
    }
}

/// The simulation's random source. Never read from ambient/global RNG state.
#[derive(Resource)]
pub struct SimRng(Box<dyn JitterSource>);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(Box::new(SeededJitter::new(seed)))
    }

    pub fn from_source(source: impl JitterSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn source_mut(&mut self) -> &mut dyn JitterSource {
        self.0.as_mut()
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Agents that died during the current tick, despawned once every per-agent
/// update for the tick has finished.
#[derive(Resource, Default, Debug)]
pub struct RemovalQueue {
    pub pending: Vec<Entity>,
}
