/// Agent-agent collision resolution.
///
/// Overlapping agents are not moved apart directly. Each tick every
/// overlapping pair gets an opposing push added to its [`SteeringForce`], and
/// the force integrator in [`super::physics`] works the push off over the
/// following ticks. Random jitter on direction and magnitude keeps crowds
/// converging on one target from locking into a symmetric standoff.

use bevy::prelude::*;
use crate::game::profiling::profile;

use crate::game::unit::{Health, Unit};
use super::components::{BoundingBox, SteeringForce};
use super::controller::Path;
use super::resources::{JitterSource, SimConfig, SimRng, SimTick};

// ============================================================================
// Events
// ============================================================================

/// Fired for every overlapping pair that received a push this tick.
#[derive(Message, Debug, Clone)]
pub struct CollisionEvent {
    pub entity1: Entity,
    pub entity2: Entity,
    pub overlap: f32,
}

// ============================================================================
// Tuning
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionTuning {
    /// Maximum rotation applied to a push direction, in whole degrees either way.
    pub jitter_degrees: i32,
    /// Push magnitude multiplier range, in percent.
    pub impulse_scale_min_percent: i32,
    pub impulse_scale_max_percent: i32,
    /// Factor applied to a standing agent's force when a moving agent bumps it hard.
    pub stationary_resistance: f32,
    /// Scale above which `stationary_resistance` kicks in.
    pub stationary_damping_threshold: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            jitter_degrees: 30,
            impulse_scale_min_percent: 50,
            impulse_scale_max_percent: 300,
            stationary_resistance: 0.8,
            stationary_damping_threshold: 2.0,
        }
    }
}

// ============================================================================
// Pair Resolution
// ============================================================================

/// The part of an agent the resolver looks at.
#[derive(Clone, Copy, Debug)]
pub struct CollisionBody {
    pub bounds: BoundingBox,
    pub is_moving: bool,
}

/// Add opposing pushes to `force_a` and `force_b` if the bodies overlap.
///
/// Returns the overlap that was resolved, or `None` when the boxes do not
/// intersect or their centers coincide (no direction to push in). Random
/// draws happen in a fixed order: both angles, then both scales, and only
/// for pairs that actually get pushed.
pub fn resolve_pair(
    a: &CollisionBody,
    b: &CollisionBody,
    force_a: &mut Vec2,
    force_b: &mut Vec2,
    rng: &mut dyn JitterSource,
    tuning: &CollisionTuning,
) -> Option<f32> {
    if !a.bounds.intersects(&b.bounds) {
        return None;
    }

    let delta = b.bounds.center() - a.bounds.center();
    let distance = delta.length();
    if distance == 0.0 {
        return None;
    }
    let direction = delta / distance;

    let overlap = (a.bounds.width as f32 / 2.0 + b.bounds.width as f32 / 2.0) - distance;

    let angle_a = rng.jitter_degrees(tuning.jitter_degrees);
    let angle_b = rng.jitter_degrees(tuning.jitter_degrees);
    let scale_a = rng.impulse_scale(tuning.impulse_scale_min_percent, tuning.impulse_scale_max_percent);
    let scale_b = rng.impulse_scale(tuning.impulse_scale_min_percent, tuning.impulse_scale_max_percent);

    let dir_a = rotate_degrees(direction, angle_a);
    let dir_b = rotate_degrees(direction, angle_b);

    *force_a -= overlap * scale_a * dir_a;
    *force_b += overlap * scale_b * dir_b;

    // A walking agent never gets knocked off its route by one that is standing still.
    if a.is_moving && !b.is_moving {
        *force_a = Vec2::ZERO;
        if scale_b > tuning.stationary_damping_threshold {
            *force_b *= tuning.stationary_resistance;
        }
    }
    if b.is_moving && !a.is_moving {
        *force_b = Vec2::ZERO;
        if scale_a > tuning.stationary_damping_threshold {
            *force_a *= tuning.stationary_resistance;
        }
    }

    Some(overlap)
}

fn rotate_degrees(direction: Vec2, degrees: i32) -> Vec2 {
    Vec2::from_angle((degrees as f32).to_radians()).rotate(direction)
}

// ============================================================================
// System
// ============================================================================

/// Push apart every overlapping pair of live units.
///
/// Bodies and forces are snapshotted before any pair is resolved, so the
/// outcome does not depend on how far the tick has progressed, and pairs are
/// visited in entity order so a seeded run replays exactly.
#[profile(2)]
pub fn resolve_unit_collisions(
    mut units: Query<(Entity, &BoundingBox, &Path, &Health, &mut SteeringForce), With<Unit>>,
    mut rng: ResMut<SimRng>,
    config: Res<SimConfig>,
    tick: Res<SimTick>,
    mut collisions: MessageWriter<CollisionEvent>,
) {
    let mut snapshot: Vec<(Entity, CollisionBody, Vec2)> = units
        .iter()
        .filter(|(_, _, _, health, _)| health.is_alive())
        .map(|(entity, bounds, path, _, force)| {
            let body = CollisionBody {
                bounds: *bounds,
                is_moving: path.is_moving(),
            };
            (entity, body, force.0)
        })
        .collect();
    snapshot.sort_unstable_by_key(|(entity, _, _)| *entity);

    let source = rng.source_mut();
    let mut pushed = 0usize;

    for i in 0..snapshot.len() {
        let (head, tail) = snapshot.split_at_mut(i + 1);
        let (entity_a, body_a, force_a) = &mut head[i];

        for (entity_b, body_b, force_b) in tail.iter_mut() {
            if let Some(overlap) = resolve_pair(body_a, body_b, force_a, force_b, source, &config.collision) {
                pushed += 1;
                collisions.write(CollisionEvent {
                    entity1: *entity_a,
                    entity2: *entity_b,
                    overlap,
                });
            }
        }
    }

    if pushed == 0 {
        return;
    }

    for (entity, _, force) in snapshot {
        if let Ok((_, _, _, _, mut steering)) = units.get_mut(entity) {
            if steering.0 != force {
                steering.0 = force;
            }
        }
    }

    crate::profile_log!(tick, "[COLLISION] {} pairs pushed apart at tick {}", pushed, tick.0);
}
