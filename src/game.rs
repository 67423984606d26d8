use bevy::prelude::*;

pub mod config;
pub mod fixed_math;
pub mod level;
pub mod pathfinding;
pub mod profiling;
pub mod simulation;
pub mod structures;
pub mod unit;

use config::GameConfigPlugin;
use simulation::SimulationPlugin;
use unit::UnitPlugin;

/// Headless movement core: config, simulation pipeline and unit lifecycle.
///
/// Levels are not loaded by the plugin; call [`level::spawn_level`] once the
/// app is built.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((GameConfigPlugin, SimulationPlugin, UnitPlugin));
    }
}
