/// Shared data structures used across multiple game modules.
///
/// The occupancy grid is read by the level loader, the pathfinder and the
/// movement systems, so it lives here rather than in any one of them.

mod occupancy_grid;

pub use occupancy_grid::{is_blocking_symbol, GridGeometry, OccupancyGrid, BLOCKING_SYMBOLS};
