/// Motion integration.
///
/// An agent with a pending [`SteeringForce`] is carried by the force and
/// bounces off static obstacles; an agent without one walks its path. Both
/// happen in [`integrate_motion`], once per agent per tick, after collision
/// resolution has added this tick's pushes.

use bevy::prelude::*;
use crate::game::profiling::profile;

use crate::game::unit::{Health, Unit, UnitStats};
use super::components::{ActualPosition, BoundingBox, StaticObstacle, SteeringForce};
use super::controller::{advance, Path};
use super::resources::{SimConfig, SimTick};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceTuning {
    /// Share of the force applied (and then removed) each tick.
    pub step_fraction: f32,
    /// A force with both components below this is dropped.
    pub epsilon: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            step_fraction: 0.05,
            epsilon: 0.1,
        }
    }
}

/// Where an agent would end up after moving by `displacement`.
pub fn predict(
    position: &ActualPosition,
    bounds: &BoundingBox,
    displacement: Vec2,
) -> (ActualPosition, BoundingBox) {
    let next = ActualPosition(position.0 + displacement);
    let next_bounds = bounds.moved_to(next.truncated());
    (next, next_bounds)
}

pub fn collides_with_static(bounds: &BoundingBox, obstacles: &[BoundingBox]) -> bool {
    obstacles.iter().any(|obstacle| bounds.intersects(obstacle))
}

/// Result of one force integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceStep {
    pub position: ActualPosition,
    pub bounds: BoundingBox,
    pub force: Vec2,
    /// The straight move was blocked and the force was reversed.
    pub bounced: bool,
}

/// Move an agent by a fraction of its force and decay the force.
///
/// If the predicted box would hit a static obstacle the force is reversed
/// first and the agent moves the other way instead; that reversed move is not
/// checked again.
pub fn integrate_force(
    position: &ActualPosition,
    bounds: &BoundingBox,
    force: Vec2,
    obstacles: &[BoundingBox],
    tuning: &ForceTuning,
) -> ForceStep {
    let (candidate, candidate_bounds) = predict(position, bounds, force * tuning.step_fraction);

    let (position, bounds, mut force, bounced) = if collides_with_static(&candidate_bounds, obstacles) {
        let reversed = -force;
        let (position, bounds) = predict(position, bounds, reversed * tuning.step_fraction);
        (position, bounds, reversed, true)
    } else {
        (candidate, candidate_bounds, force, false)
    };

    force -= force * tuning.step_fraction;

    if force.x.abs() < tuning.epsilon && force.y.abs() < tuning.epsilon {
        force = Vec2::ZERO;
    }

    ForceStep {
        position,
        bounds,
        force,
        bounced,
    }
}

/// Advance every live unit by one tick: force first, path otherwise.
#[profile(2)]
pub fn integrate_motion(
    mut units: Query<
        (
            &mut ActualPosition,
            &mut BoundingBox,
            &mut SteeringForce,
            &mut Path,
            &UnitStats,
            &Health,
        ),
        (With<Unit>, Without<StaticObstacle>),
    >,
    obstacles: Query<&BoundingBox, (With<StaticObstacle>, Without<Unit>)>,
    config: Res<SimConfig>,
    tick: Res<SimTick>,
) {
    let obstacles: Vec<BoundingBox> = obstacles.iter().copied().collect();
    let mut pushed = 0usize;
    let mut walking = 0usize;

    for (mut position, mut bounds, mut force, mut path, stats, health) in units.iter_mut() {
        if !health.is_alive() {
            continue;
        }

        if force.is_active() {
            let step = integrate_force(&position, &bounds, force.0, &obstacles, &config.force);
            *position = step.position;
            *bounds = step.bounds;
            force.0 = step.force;
            pushed += 1;
        } else if path.is_moving() {
            advance(&mut path, &mut position, &mut bounds, &force, stats.speed, &config.grid);
            walking += 1;
        }
    }

    crate::profile_log!(
        tick,
        "[MOTION] {} walking, {} pushed, {} static obstacles",
        walking,
        pushed,
        obstacles.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_decays_monotonically_to_zero() {
        let tuning = ForceTuning::default();
        let mut position = ActualPosition(Vec2::new(100.0, 200.0));
        let mut bounds = BoundingBox::new(100, 200, 16, 16);
        let mut force = Vec2::new(10.0, 0.0);
        let mut ticks = 0;

        while force != Vec2::ZERO {
            let step = integrate_force(&position, &bounds, force, &[], &tuning);
            assert!(step.force.length() < force.length(), "Force must strictly decrease");
            assert!(!step.bounced);
            position = step.position;
            bounds = step.bounds;
            force = step.force;
            ticks += 1;
            assert!(ticks <= 100, "Force should vanish within a bounded number of ticks");
        }

        // 10 * 0.95^90 < 0.1 is the first time the force drops below epsilon.
        assert_eq!(ticks, 90);
        assert!(position.0.x > 109.8 && position.0.x < 110.0, "got {}", position.0.x);
        assert_eq!(bounds.position(), IVec2::new(109, 200));
    }

    #[test]
    fn test_blocked_move_reverses_force() {
        let tuning = ForceTuning::default();
        let position = ActualPosition(Vec2::new(0.0, 88.0));
        let bounds = BoundingBox::new(0, 88, 16, 16);
        let wall = BoundingBox::new(17, 88, 16, 16);

        let step = integrate_force(&position, &bounds, Vec2::new(40.0, 0.0), &[wall], &tuning);

        assert!(step.bounced);
        assert_eq!(step.position.0, Vec2::new(-2.0, 88.0));
        assert_eq!(step.bounds.position(), IVec2::new(-2, 88));
        assert_eq!(step.force, Vec2::new(-38.0, 0.0));
    }

    #[test]
    fn test_clear_move_commits_candidate() {
        let tuning = ForceTuning::default();
        let position = ActualPosition(Vec2::new(0.0, 88.0));
        let bounds = BoundingBox::new(0, 88, 16, 16);
        let wall = BoundingBox::new(19, 88, 16, 16);

        let step = integrate_force(&position, &bounds, Vec2::new(40.0, 20.0), &[wall], &tuning);

        assert!(!step.bounced);
        assert_eq!(step.position.0, Vec2::new(2.0, 89.0));
        assert_eq!(step.force, Vec2::new(38.0, 19.0));
    }

    #[test]
    fn test_small_force_snaps_to_zero() {
        let tuning = ForceTuning::default();
        let position = ActualPosition(Vec2::new(0.0, 88.0));
        let bounds = BoundingBox::new(0, 88, 16, 16);

        let step = integrate_force(&position, &bounds, Vec2::new(0.1, -0.05), &[], &tuning);
        assert_eq!(step.force, Vec2::ZERO);
    }

    #[test]
    fn test_predict_truncates_bounds() {
        let position = ActualPosition(Vec2::new(10.0, 90.0));
        let bounds = BoundingBox::new(10, 90, 16, 16);

        let (next, next_bounds) = predict(&position, &bounds, Vec2::new(0.75, -0.5));

        assert_eq!(next.0, Vec2::new(10.75, 89.5));
        assert_eq!(next_bounds, BoundingBox::new(10, 89, 16, 16));
    }
}
