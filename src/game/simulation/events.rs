/// Messages for controlling simulation agents.
///
/// These are the entry points used by the player/AI layers: they never touch
/// agent components directly, they queue a command and the simulation applies
/// it at the start of the next tick.

use bevy::prelude::*;

// ============================================================================
// Unit Commands
// ============================================================================

/// Move a unit towards a target pixel.
///
/// Replaces any path the unit is currently following. An unreachable target
/// leaves the unit standing still.
#[derive(Message, Debug, Clone)]
pub struct UnitMoveCommand {
    pub entity: Entity,
    pub target: Vec2,
}

/// Drop a unit's current path.
#[derive(Message, Debug, Clone)]
pub struct UnitStopCommand {
    pub entity: Entity,
}

/// Subtract health from a unit. Used by the combat layer.
#[derive(Message, Debug, Clone)]
pub struct UnitDamageCommand {
    pub entity: Entity,
    pub amount: i32,
}
