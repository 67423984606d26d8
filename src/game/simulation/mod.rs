/// Simulation layer - deterministic movement logic.
///
/// This module is organized into:
/// - **components**: Bounding boxes, continuous positions, forces, static obstacles
/// - **resources**: Tick counter, runtime config, random source, removal queue
/// - **events**: Commands for controlling units
/// - **controller**: Path planning and path following
/// - **collision**: Unit-unit push resolution
/// - **physics**: Force integration against static obstacles
/// - **systems**: Tick bookkeeping and command intake

use bevy::prelude::*;

use crate::game::structures::OccupancyGrid;

pub mod components;
pub mod resources;
pub mod events;
pub mod controller;
pub mod collision;
pub mod physics;
pub mod systems;

pub use components::*;
pub use resources::*;
pub use events::*;
pub use controller::{move_to, advance, MoveOutcome, Path};
pub use collision::{resolve_pair, CollisionBody, CollisionEvent, CollisionTuning};
pub use physics::{integrate_force, predict, ForceStep, ForceTuning};

/// Per-tick stages, run in this order every `FixedUpdate`.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum SimSet {
    Input,       // Commands, damage, death marking
    Collision,   // Unit-unit pushes from a pre-movement snapshot
    Integration, // Forces and path following
    Cleanup,     // Despawn units that died this tick
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = SimConfig::default();
        app.insert_resource(Time::<Fixed>::from_hz(config.tick_rate));

        app.insert_resource(config);
        app.init_resource::<SimTick>();
        app.init_resource::<SimRng>();
        app.init_resource::<RemovalQueue>();
        app.init_resource::<OccupancyGrid>();

        app.add_message::<UnitMoveCommand>();
        app.add_message::<UnitStopCommand>();
        app.add_message::<UnitDamageCommand>();
        app.add_message::<CollisionEvent>();

        app.configure_sets(
            FixedUpdate,
            (SimSet::Input, SimSet::Collision, SimSet::Integration, SimSet::Cleanup).chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::increment_sim_tick.before(SimSet::Input),
                systems::process_move_commands.in_set(SimSet::Input),
                collision::resolve_unit_collisions.in_set(SimSet::Collision),
                physics::integrate_motion.in_set(SimSet::Integration),
            ),
        );
    }
}
