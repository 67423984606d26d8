/// Tick bookkeeping and command intake.

use bevy::prelude::*;
use crate::game::profiling::profile;

use crate::game::structures::OccupancyGrid;
use crate::game::unit::Unit;
use super::components::ActualPosition;
use super::controller::{move_to, MoveOutcome, Path};
use super::events::{UnitMoveCommand, UnitStopCommand};
use super::resources::{SimConfig, SimTick};

pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

/// Apply queued stop and move commands.
///
/// Stops are handled before moves, so a unit that receives both in the same
/// tick ends up following the new route.
#[profile(4)]
pub fn process_move_commands(
    mut stop_events: MessageReader<UnitStopCommand>,
    mut move_events: MessageReader<UnitMoveCommand>,
    mut units: Query<(&ActualPosition, &mut Path), With<Unit>>,
    grid: Res<OccupancyGrid>,
    config: Res<SimConfig>,
    tick: Res<SimTick>,
) {
    for event in stop_events.read() {
        match units.get_mut(event.entity) {
            Ok((_, mut path)) => path.clear(),
            Err(_) => warn!("[COMMAND] Stop for unknown unit {:?}", event.entity),
        }
    }

    for event in move_events.read() {
        let Ok((position, mut path)) = units.get_mut(event.entity) else {
            warn!("[COMMAND] Move for unknown unit {:?}", event.entity);
            continue;
        };

        let outcome = move_to(
            &mut path,
            &grid,
            &config.grid,
            config.pathfinding,
            position.0,
            event.target,
        );

        match outcome {
            MoveOutcome::Planned(steps) => {
                debug!(
                    "[COMMAND] {:?} -> {:?}: {} waypoints (tick {})",
                    event.entity, event.target, steps, tick.0
                );
            }
            MoveOutcome::Unreachable => {
                debug!("[COMMAND] {:?} cannot reach {:?}", event.entity, event.target);
            }
            MoveOutcome::AlreadyThere => {}
        }
    }
}
