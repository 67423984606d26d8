/// Component definitions for the simulation layer.
///
/// Agents carry a discrete [`BoundingBox`] (what gets rendered and collided)
/// and a continuous [`ActualPosition`] that accumulates sub-pixel motion.
/// The box position is always the truncation of the continuous one, except
/// right after a path completes and both are snapped to the cell grid.

use bevy::prelude::*;

// ============================================================================
// Position & Bounds
// ============================================================================

/// Axis-aligned integer rectangle in screen pixels, anchored at its top-left corner.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Same size, moved so its top-left corner is at `position`.
    pub fn moved_to(&self, position: IVec2) -> Self {
        Self {
            x: position.x,
            y: position.y,
            ..*self
        }
    }

    /// True when the two rectangles share a region of positive area.
    /// Touching edges do not count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.width <= 0 || self.height <= 0 || other.width <= 0 || other.height <= 0 {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Continuous position of an agent's top-left corner, in pixels.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActualPosition(pub Vec2);

impl ActualPosition {
    /// The discrete pixel this position renders at.
    pub fn truncated(&self) -> IVec2 {
        IVec2::new(self.0.x as i32, self.0.y as i32)
    }
}

// ============================================================================
// Forces
// ============================================================================

/// Pending push-back from collisions.
///
/// While either component is nonzero the agent ignores its path and the force
/// integrator moves it instead.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SteeringForce(pub Vec2);

impl SteeringForce {
    pub fn is_active(&self) -> bool {
        self.0.x != 0.0 || self.0.y != 0.0
    }
}

// ============================================================================
// Static Obstacles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Wall,
    Castle,
    ResourceDeposit,
}

/// Level geometry that agents are pushed against but never move.
/// The extent is stored in the entity's [`BoundingBox`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticObstacle {
    pub kind: ObstacleKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_boxes_do_not_intersect() {
        let a = BoundingBox::new(0, 0, 16, 16);
        let b = BoundingBox::new(16, 0, 16, 16);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_overlapping_boxes_intersect() {
        let a = BoundingBox::new(0, 0, 16, 16);
        let b = BoundingBox::new(15, 15, 16, 16);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_empty_box_never_intersects() {
        let a = BoundingBox::new(0, 0, 0, 16);
        let b = BoundingBox::new(0, 0, 16, 16);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_truncation_rounds_toward_zero() {
        let pos = ActualPosition(Vec2::new(31.9, 104.2));
        assert_eq!(pos.truncated(), IVec2::new(31, 104));
    }
}
