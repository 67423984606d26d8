//! Grid pathfinding.
//!
//! A single-level A* over the [`OccupancyGrid`](crate::game::structures::OccupancyGrid).
//! Searches are synchronous: a move request runs its search to completion
//! before returning, and a later request simply starts a fresh search.

mod astar;
mod types;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use astar::{path_cost, PathFinder};
pub use types::{Node, PathfindingTuning};
