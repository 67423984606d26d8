use bevy::prelude::*;

use crate::game::simulation::{RemovalQueue, UnitDamageCommand};
use super::components::{Health, Unit};

/// Apply queued damage. Death is only recorded here; the entity stays in the
/// world until [`purge_dead_units`] runs at the end of the tick.
pub fn apply_damage_commands(
    mut damage_events: MessageReader<UnitDamageCommand>,
    mut units: Query<&mut Health, With<Unit>>,
) {
    for event in damage_events.read() {
        let Ok(mut health) = units.get_mut(event.entity) else {
            warn!("[UNIT] Damage for unknown unit {:?}", event.entity);
            continue;
        };

        if health.take_damage(event.amount) {
            debug!("[UNIT] {:?} killed ({} damage)", event.entity, event.amount);
        }
    }
}

/// Queue every unit whose health dropped to zero for removal.
pub fn collect_dead_units(
    units: Query<(Entity, &Health), (With<Unit>, Changed<Health>)>,
    mut removals: ResMut<RemovalQueue>,
) {
    for (entity, health) in units.iter() {
        if !health.is_alive() && !removals.pending.contains(&entity) {
            removals.pending.push(entity);
        }
    }
}

/// Despawn the units queued this tick.
pub fn purge_dead_units(mut commands: Commands, mut removals: ResMut<RemovalQueue>) {
    if removals.pending.is_empty() {
        return;
    }

    info!("[UNIT] Removing {} dead units", removals.pending.len());

    for entity in removals.pending.drain(..) {
        if let Ok(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.despawn();
        }
    }
}
