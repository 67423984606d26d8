//! Deterministic fixed-point scalars for path costs.
//!
//! Search costs are accumulated in fixed point so the open-set ordering (and
//! with it every tie-break) is identical on every platform. Continuous agent
//! motion stays in `f32`; only the grid search needs bit-exact comparisons.

use fixed::types::I48F16;

/// Fixed-point number type used for accumulated search costs.
///
/// I48F16: 48 integer bits, 16 fractional bits (precision ~0.000015).
pub type FixedNum = I48F16;

/// Cost of a single grid step with offset `(dx, dy)`.
///
/// Orthogonal steps cost 1, diagonal steps cost √2.
pub fn step_cost(dx: i32, dy: i32) -> FixedNum {
    if dx != 0 && dy != 0 {
        FixedNum::from_num(std::f64::consts::SQRT_2)
    } else {
        FixedNum::ONE
    }
}

/// Manhattan distance between two grid cells, as a fixed-point cost.
pub fn manhattan(x1: i32, y1: i32, x2: i32, y2: i32) -> FixedNum {
    FixedNum::from_num((x1 - x2).abs() + (y1 - y2).abs())
}
