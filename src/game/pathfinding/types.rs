use bevy::prelude::*;

/// A grid cell coordinate as seen by the pathfinder.
///
/// Signed so that neighbor offsets past the grid edge stay representable; the
/// occupancy grid rejects them as inaccessible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Node {
    pub x: i32,
    pub y: i32,
}

impl Node {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Whether `other` is one of the 8 cells surrounding this one.
    pub fn is_adjacent(self, other: Node) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}

impl From<IVec2> for Node {
    fn from(cell: IVec2) -> Self {
        Self::new(cell.x, cell.y)
    }
}

impl From<Node> for IVec2 {
    fn from(node: Node) -> Self {
        IVec2::new(node.x, node.y)
    }
}

/// Limits applied to a single search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathfindingTuning {
    /// Expansions after which a search gives up and reports no path.
    pub max_search_iterations: usize,
    /// Expansions after which a successful search is reported as slow.
    pub slow_search_warning: usize,
}

impl Default for PathfindingTuning {
    fn default() -> Self {
        Self {
            max_search_iterations: 100_000,
            slow_search_warning: 5_000,
        }
    }
}
