use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::pathfinding::PathfindingTuning;
use crate::game::simulation::{CollisionTuning, ForceTuning, SimConfig, SimRng};
use crate::game::structures::GridGeometry;
use crate::game::unit::UnitArchetype;

pub const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. These values define the
/// battlefield geometry and the movement constants; changing them mid-game
/// would break replay determinism.
///
/// Missing fields fall back to their defaults, so a config file only needs to
/// list what it overrides.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Simulation
    pub tick_rate: f64,
    pub rng_seed: u64,

    // Grid
    pub cell_size: i32,
    pub playfield_offset_y: i32,
    pub grid_width: u32,
    pub grid_height: u32,

    // Pathfinding
    pub max_search_iterations: usize,
    pub slow_search_warning: usize,

    // Collision
    pub jitter_degrees: i32,
    pub impulse_scale_min_percent: i32,
    pub impulse_scale_max_percent: i32,
    pub stationary_resistance: f32,
    pub stationary_damping_threshold: f32,

    // Forces
    pub force_step_fraction: f32,
    pub force_epsilon: f32,

    // Units
    pub soldier: UnitArchetype,
    pub worker: UnitArchetype,
}

impl Default for InitialConfig {
    fn default() -> Self {
        let pathfinding = PathfindingTuning::default();
        let collision = CollisionTuning::default();
        let force = ForceTuning::default();
        let grid = GridGeometry::default();

        Self {
            tick_rate: 60.0,
            rng_seed: 0,
            cell_size: grid.cell_size,
            playfield_offset_y: grid.playfield_offset_y,
            grid_width: 50,
            grid_height: 32,
            max_search_iterations: pathfinding.max_search_iterations,
            slow_search_warning: pathfinding.slow_search_warning,
            jitter_degrees: collision.jitter_degrees,
            impulse_scale_min_percent: collision.impulse_scale_min_percent,
            impulse_scale_max_percent: collision.impulse_scale_max_percent,
            stationary_resistance: collision.stationary_resistance,
            stationary_damping_threshold: collision.stationary_damping_threshold,
            force_step_fraction: force.step_fraction,
            force_epsilon: force.epsilon,
            soldier: UnitArchetype::SOLDIER,
            worker: UnitArchetype::WORKER,
        }
    }
}

impl From<&InitialConfig> for SimConfig {
    fn from(initial: &InitialConfig) -> Self {
        let cell_size = if initial.cell_size >= 1 {
            initial.cell_size
        } else {
            let fallback = GridGeometry::default().cell_size;
            error!("Invalid cell_size {}, using {}", initial.cell_size, fallback);
            fallback
        };

        Self {
            tick_rate: initial.tick_rate,
            grid: GridGeometry {
                cell_size,
                playfield_offset_y: initial.playfield_offset_y,
            },
            level_size: UVec2::new(initial.grid_width, initial.grid_height),
            pathfinding: PathfindingTuning {
                max_search_iterations: initial.max_search_iterations,
                slow_search_warning: initial.slow_search_warning,
            },
            collision: CollisionTuning {
                jitter_degrees: initial.jitter_degrees,
                impulse_scale_min_percent: initial.impulse_scale_min_percent,
                impulse_scale_max_percent: initial.impulse_scale_max_percent,
                stationary_resistance: initial.stationary_resistance,
                stationary_damping_threshold: initial.stationary_damping_threshold,
            },
            force: ForceTuning {
                step_fraction: initial.force_step_fraction,
                epsilon: initial.force_epsilon,
            },
            soldier: initial.soldier,
            worker: initial.worker,
        }
    }
}

/// Read an [`InitialConfig`] from a RON file.
///
/// A missing or malformed file is logged and replaced by the defaults; the
/// game always starts.
pub fn read_initial_config(path: &str) -> InitialConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match ron::from_str::<InitialConfig>(&contents) {
            Ok(config) => {
                info!("Loaded initial config from {}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse initial config: {}", e);
                error!("Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read {}: {}", path, e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_initial_config);
    }
}

/// Load static initial configuration synchronously at startup and derive the
/// runtime resources from it. Runs before the first fixed tick.
fn load_initial_config(mut commands: Commands) {
    let initial = read_initial_config(INITIAL_CONFIG_PATH);
    let sim_config = SimConfig::from(&initial);

    info!(
        "Simulation at {} Hz, {}x{} cells of {}px, seed {}",
        sim_config.tick_rate,
        sim_config.level_size.x,
        sim_config.level_size.y,
        sim_config.grid.cell_size,
        initial.rng_seed
    );

    commands.insert_resource(Time::<Fixed>::from_hz(sim_config.tick_rate));
    commands.insert_resource(SimRng::seeded(initial.rng_seed));
    commands.insert_resource(sim_config);
    commands.insert_resource(initial);
}
