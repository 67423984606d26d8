use bevy::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::game::fixed_math::{manhattan, step_cost, FixedNum};
use crate::game::structures::OccupancyGrid;
use super::types::{Node, PathfindingTuning};

/// Arena entry for one visited cell. Lives only for the duration of one search.
#[derive(Clone, Copy, Debug)]
struct SearchNode {
    node: Node,
    g: FixedNum,
    f: FixedNum,
    parent: Option<u32>,
}

/// Open-set entry. The heap pops the smallest `f`, then the smallest x, then the smallest y.
#[derive(Clone, Copy, PartialEq, Eq)]
struct State {
    f: FixedNum,
    node: Node,
    index: u32,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.cmp(&self.f)
            .then_with(|| other.node.x.cmp(&self.node.x))
            .then_with(|| other.node.y.cmp(&self.node.y))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search over an [`OccupancyGrid`] with 8-way movement.
///
/// Orthogonal steps cost 1 and diagonal steps √2. The heuristic is the
/// Manhattan distance to the goal. A diagonal step is only allowed when both
/// orthogonal cells it passes between are accessible, so paths never cut a
/// blocked corner.
///
/// Equal-`f` candidates are expanded in (x, y) order, which makes the output
/// reproducible for identical inputs.
pub struct PathFinder<'a> {
    grid: &'a OccupancyGrid,
    tuning: PathfindingTuning,
}

impl<'a> PathFinder<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self {
            grid,
            tuning: PathfindingTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: PathfindingTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Cells from `start` to `goal`, both inclusive.
    ///
    /// Empty when the goal is unreachable, and also when `start == goal`
    /// because there is nothing to search for.
    pub fn get_path(&self, start: Node, goal: Node) -> Vec<Node> {
        if start == goal {
            return Vec::new();
        }
        if !self.grid.is_accessible(goal.x, goal.y) {
            debug!("[PATHFINDING] Goal {:?} is not accessible", goal);
            return Vec::new();
        }

        let mut arena: Vec<SearchNode> = Vec::new();
        let mut lookup: FxHashMap<Node, u32> = FxHashMap::default();
        let mut open_set = BinaryHeap::new();

        let start_f = manhattan(start.x, start.y, goal.x, goal.y);
        arena.push(SearchNode {
            node: start,
            g: FixedNum::ZERO,
            f: start_f,
            parent: None,
        });
        lookup.insert(start, 0);
        open_set.push(State { f: start_f, node: start, index: 0 });

        let mut iterations = 0usize;

        while let Some(State { f, node: current, index }) = open_set.pop() {
            let current_idx = index as usize;

            // Superseded by a cheaper entry pushed after a relaxation.
            if f != arena[current_idx].f {
                continue;
            }

            iterations += 1;
            if iterations > self.tuning.max_search_iterations {
                error!(
                    "[PATHFINDING] A* exceeded max iterations ({}) - Start: {:?}, Goal: {:?}",
                    self.tuning.max_search_iterations, start, goal
                );
                return Vec::new();
            }

            if current == goal {
                if iterations > self.tuning.slow_search_warning {
                    warn!("[PATHFINDING] A* used {} iterations (high!)", iterations);
                }
                return reconstruct_path(&arena, index);
            }

            let current_g = arena[current_idx].g;

            for (neighbor, cost) in self.neighbors(current) {
                let tentative_g = current_g + cost;

                let neighbor_idx = match lookup.get(&neighbor) {
                    Some(&idx) => idx,
                    None => {
                        let idx = arena.len() as u32;
                        arena.push(SearchNode {
                            node: neighbor,
                            g: FixedNum::MAX,
                            f: FixedNum::MAX,
                            parent: None,
                        });
                        lookup.insert(neighbor, idx);
                        idx
                    }
                };

                let entry = &mut arena[neighbor_idx as usize];
                if tentative_g < entry.g {
                    entry.g = tentative_g;
                    entry.f = tentative_g + manhattan(neighbor.x, neighbor.y, goal.x, goal.y);
                    entry.parent = Some(index);
                    open_set.push(State {
                        f: entry.f,
                        node: neighbor,
                        index: neighbor_idx,
                    });
                }
            }
        }

        Vec::new()
    }

    /// Accessible neighbors of `current` with their step costs, honouring the diagonal-cut rule.
    fn neighbors(&self, current: Node) -> SmallVec<[(Node, FixedNum); 8]> {
        let mut result = SmallVec::new();

        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                if dx != 0 && dy != 0 {
                    let vertical = current.offset(0, dy);
                    let horizontal = current.offset(dx, 0);
                    if !self.grid.is_accessible(vertical.x, vertical.y)
                        || !self.grid.is_accessible(horizontal.x, horizontal.y)
                    {
                        continue;
                    }
                }

                let next = current.offset(dx, dy);
                if self.grid.is_accessible(next.x, next.y) {
                    result.push((next, step_cost(dx, dy)));
                }
            }
        }

        result
    }
}

fn reconstruct_path(arena: &[SearchNode], goal_index: u32) -> Vec<Node> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);

    while let Some(idx) = cursor {
        let node = &arena[idx as usize];
        path.push(node.node);
        cursor = node.parent;
    }

    path.reverse();
    path
}

/// Total movement cost of a path (1 per orthogonal step, √2 per diagonal step).
pub fn path_cost(path: &[Node]) -> FixedNum {
    path.windows(2)
        .map(|pair| step_cost(pair[1].x - pair[0].x, pair[1].y - pair[0].y))
        .fold(FixedNum::ZERO, |acc, cost| acc + cost)
}
