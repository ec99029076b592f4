//! Grid fixtures for the acceptance scenarios.
//!
//! All grids are 8-connected with unit axis steps and √2 diagonals.

use dstar_harness::contract::{Cell, Rect};
use dstar_harness::worlds::grid::{GridError, GridWorld, ObstacleMode};

/// Four diagonal steps.
pub const OPEN_FIELD_COST: f64 = 4.0 * std::f64::consts::SQRT_2;

/// Three diagonals and two axis steps around the diagonal wall.
pub const DETOUR_COST: f64 = 3.0 * std::f64::consts::SQRT_2 + 2.0;

/// 5×5, no obstacles, goal (4, 4), agent (0, 0).
///
/// # Errors
///
/// Never in practice; the dimensions are fixed and valid.
pub fn open_field() -> Result<GridWorld, GridError> {
    GridWorld::new(5, 5, Cell::new(4, 4), Cell::new(0, 0))
}

/// [`open_field`] with obstacle cells on (1, 1), (2, 2) and (3, 3).
///
/// # Errors
///
/// Never in practice; the dimensions are fixed and valid.
pub fn diagonal_wall() -> Result<GridWorld, GridError> {
    Ok(open_field()?
        .with_obstacle(Rect::from_tlbr(1, 1, 1, 1))
        .with_obstacle(Rect::from_tlbr(2, 2, 2, 2))
        .with_obstacle(Rect::from_tlbr(3, 3, 3, 3)))
}

/// Agent at (2, 2) with every neighbor an obstacle cell.
///
/// # Errors
///
/// Never in practice; the dimensions are fixed and valid.
pub fn enclosed(mode: ObstacleMode) -> Result<GridWorld, GridError> {
    Ok(GridWorld::new(5, 5, Cell::new(4, 4), Cell::new(2, 2))?
        .with_obstacle(Rect::from_tlbr(3, 1, 3, 3))
        .with_obstacle(Rect::from_tlbr(1, 1, 1, 3))
        .with_obstacle(Rect::from_tlbr(2, 1, 2, 1))
        .with_obstacle(Rect::from_tlbr(2, 3, 2, 3))
        .with_mode(mode))
}

/// 40×40 open field with the agent 30 cells due west of the goal.
///
/// # Errors
///
/// Never in practice; the dimensions are fixed and valid.
pub fn long_corridor() -> Result<GridWorld, GridError> {
    GridWorld::new(40, 40, Cell::new(35, 20), Cell::new(5, 20))
}
