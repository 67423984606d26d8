use bevy::prelude::*;

use crate::game::simulation::BoundingBox;

/// Whether `target` is within `radius_cells` of the unit's center.
///
/// Distance is measured to the closest point of the target's box, so large
/// structures are reachable from any side.
pub fn is_in_range(unit: &BoundingBox, radius_cells: f32, target: &BoundingBox, cell_size: i32) -> bool {
    let center = unit.center();
    let min = target.position().as_vec2();
    let max = (target.position() + target.size()).as_vec2();

    let closest = center.clamp(min, max);
    center.distance(closest) <= radius_cells * cell_size as f32
}
