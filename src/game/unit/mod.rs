mod components;
mod lifecycle;
mod range;
mod spawn;

use bevy::prelude::*;
use crate::game::simulation::SimSet;

// Re-export public types
pub use components::{Health, Owner, Unit, UnitArchetype, UnitKind, UnitStats};
pub use lifecycle::{apply_damage_commands, collect_dead_units, purge_dead_units};
pub use range::is_in_range;
pub use spawn::{archetype, spawn_unit, unit_bundle};

/// Plugin that manages unit health and removal
pub struct UnitPlugin;

impl Plugin for UnitPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_damage_commands, collect_dead_units)
                .chain()
                .in_set(SimSet::Input),
        )
        .add_systems(FixedUpdate, purge_dead_units.in_set(SimSet::Cleanup));
    }
}
