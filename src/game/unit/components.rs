use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Marks an entity as a mobile agent on the battlefield
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Unit;

/// Player that controls a unit
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner(pub u8);

impl Owner {
    pub const PLAYER: Owner = Owner(0);
    pub const AI: Owner = Owner(1);
}

/// Hit points. A unit at zero or below is dead and waits for the end-of-tick purge.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtract `amount`. Returns true if this hit is the one that killed the unit.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.current -= amount;
        was_alive && !self.is_alive()
    }
}

/// Movement and interaction stats
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    /// Pixels travelled per tick along a path
    pub speed: f32,
    /// Interaction reach, in cells
    pub interaction_radius: f32,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Soldier,
    Worker,
}

/// Size and base stats shared by every unit of one kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitArchetype {
    pub width: i32,
    pub height: i32,
    pub health: i32,
    pub speed: f32,
    pub interaction_radius: f32,
}

impl UnitArchetype {
    pub const SOLDIER: UnitArchetype = UnitArchetype {
        width: 16,
        height: 16,
        health: 60,
        speed: 0.14,
        interaction_radius: 2.0,
    };

    pub const WORKER: UnitArchetype = UnitArchetype {
        width: 16,
        height: 16,
        health: 40,
        speed: 0.22,
        interaction_radius: 1.0,
    };

    pub fn stats(&self) -> UnitStats {
        UnitStats {
            speed: self.speed,
            interaction_radius: self.interaction_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_the_killing_blow_reports_death() {
        let mut health = Health::new(40);

        assert!(!health.take_damage(25));
        assert!(health.is_alive());
        assert!(health.take_damage(15));
        assert!(!health.is_alive());
        assert!(!health.take_damage(10), "Already dead units are not killed twice");
        assert_eq!(health.current, -10);
    }
}
