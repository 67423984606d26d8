use bevy::prelude::*;

use crate::game::simulation::{ActualPosition, BoundingBox, Path, SimConfig, SteeringForce};
use super::components::{Health, Owner, Unit, UnitArchetype, UnitKind};

pub fn archetype(kind: UnitKind, config: &SimConfig) -> UnitArchetype {
    match kind {
        UnitKind::Soldier => config.soldier,
        UnitKind::Worker => config.worker,
    }
}

/// Every component a freshly spawned unit needs, standing still at the pixel `position`.
pub fn unit_bundle(kind: UnitKind, owner: Owner, position: IVec2, config: &SimConfig) -> impl Bundle {
    let archetype = archetype(kind, config);
    (
        Unit,
        kind,
        owner,
        Health::new(archetype.health),
        archetype.stats(),
        BoundingBox::new(position.x, position.y, archetype.width, archetype.height),
        ActualPosition(position.as_vec2()),
        SteeringForce::default(),
        Path::default(),
    )
}

pub fn spawn_unit(
    commands: &mut Commands,
    kind: UnitKind,
    owner: Owner,
    position: IVec2,
    config: &SimConfig,
) -> Entity {
    commands.spawn(unit_bundle(kind, owner, position, config)).id()
}
