/// Path planning and path following for a single agent.
///
/// A move request is turned into a grid search once, the resulting cells are
/// cached as pixel waypoints on the agent's [`Path`], and every tick the agent
/// walks a fixed distance towards the head waypoint. Nothing here touches the
/// `World`; the systems in [`super::systems`] and [`super::physics`] feed
/// component data through these functions.

use bevy::prelude::*;
use std::collections::VecDeque;

use crate::game::pathfinding::{Node, PathFinder, PathfindingTuning};
use crate::game::structures::{GridGeometry, OccupancyGrid};
use super::components::{ActualPosition, BoundingBox, SteeringForce};

/// Pixel waypoints (cell top-left corners) the agent still has to visit.
///
/// The first entry of a planned route (the cell the agent stands on) is never
/// stored, so an agent with a non-empty path is by definition on its way
/// somewhere.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Vec2>,
}

impl Path {
    pub fn from_waypoints(waypoints: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    pub fn is_moving(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn next_waypoint(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// Head waypoint, or `current` when there is nowhere left to go.
    pub fn next_target(&self, current: Vec2) -> Vec2 {
        self.next_waypoint().unwrap_or(current)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Vec2> {
        self.waypoints.iter()
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }
}

/// What a move request did to the agent's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target lies in the cell the agent already occupies; the path was left as it was.
    AlreadyThere,
    /// A route was found; holds the number of waypoints queued.
    Planned(usize),
    /// No route exists; the agent's previous path was dropped.
    Unreachable,
}

/// Plan a route from `position` to the pixel `target` and store it in `path`.
///
/// Any in-progress route is replaced, except when start and target fall in
/// the same cell: that request is a no-op.
pub fn move_to(
    path: &mut Path,
    grid: &OccupancyGrid,
    geometry: &GridGeometry,
    tuning: PathfindingTuning,
    position: Vec2,
    target: Vec2,
) -> MoveOutcome {
    let start = Node::from(geometry.pixel_to_cell(position));
    let goal = Node::from(geometry.pixel_to_cell(target));

    if start == goal {
        return MoveOutcome::AlreadyThere;
    }

    let cells = PathFinder::new(grid).with_tuning(tuning).get_path(start, goal);

    path.clear();
    path.waypoints.extend(
        cells
            .into_iter()
            .skip(1)
            .map(|cell| geometry.cell_to_pixel(IVec2::from(cell))),
    );

    if path.is_empty() {
        MoveOutcome::Unreachable
    } else {
        MoveOutcome::Planned(path.len())
    }
}

/// Walk one tick along `path`.
///
/// Does nothing while `force` is active or the path is empty. Returns `true`
/// when the agent moved or consumed a waypoint.
pub fn advance(
    path: &mut Path,
    position: &mut ActualPosition,
    bounds: &mut BoundingBox,
    force: &SteeringForce,
    speed: f32,
    geometry: &GridGeometry,
) -> bool {
    if force.is_active() {
        return false;
    }
    let Some(target) = path.next_waypoint() else {
        return false;
    };

    let offset = target - position.0;
    let distance = offset.length();

    // Already standing on the waypoint: there is no direction to move in.
    if distance == 0.0 {
        complete_waypoint(path, position, bounds, geometry);
        return true;
    }

    position.0 += offset / distance * speed;
    *bounds = bounds.moved_to(position.truncated());

    let remaining = (target - position.0).abs();
    if remaining.x < speed && remaining.y < speed {
        complete_waypoint(path, position, bounds, geometry);
    }

    true
}

/// Pop the head waypoint; on the last one, settle the agent onto the cell grid.
fn complete_waypoint(
    path: &mut Path,
    position: &mut ActualPosition,
    bounds: &mut BoundingBox,
    geometry: &GridGeometry,
) {
    path.waypoints.pop_front();

    if path.is_empty() {
        let snapped = geometry.snap_to_cell(bounds.position());
        *bounds = bounds.moved_to(snapped);
        position.0 = snapped.as_vec2();
    }
}
