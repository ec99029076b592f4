//! Spatial world contract: what a replanning session needs from a world
//! beyond the planner's own callbacks.
//!
//! Worlds own geometry, the agent's position and the cost model. Sessions
//! own the graph, the continuation and the bound; worlds never see those
//! except through the planner callbacks.

use dstar_search::contract::PlanningWorldV1;
use dstar_search::error::PlannerError;
use dstar_search::node::{Graph, NodeId};

/// Integer grid coordinate, origin in the lower left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle, inclusive on every side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    pub top: i32,
}

impl Rect {
    /// Build from `(top, left, bottom, right)`, the order obstacle tables
    /// are usually written in.
    #[must_use]
    pub const fn from_tlbr(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            left,
            bottom,
            right,
            top,
        }
    }

    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.left && cell.x <= self.right && cell.y >= self.bottom && cell.y <= self.top
    }

    /// Cells on the outer ring, bottom row first, each row left to right.
    ///
    /// Empty for an inverted rectangle.
    #[must_use]
    pub fn perimeter(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for y in self.bottom..=self.top {
            for x in self.left..=self.right {
                if y == self.bottom || y == self.top || x == self.left || x == self.right {
                    cells.push(Cell::new(x, y));
                }
            }
        }
        cells
    }

    /// Every cell, bottom row first.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.bottom..=self.top)
            .flat_map(move |y| (self.left..=self.right).map(move |x| Cell::new(x, y)))
    }
}

/// A planning world laid out on cells.
///
/// # Contract
///
/// - `build_graph` allocates one node per cell; `node_at` maps a cell to
///   its node in that graph and returns `None` off the grid.
/// - `blocked_cost` is the cost at or above which a route must have crossed
///   an obstacle.
pub trait SpatialWorldV1: PlanningWorldV1<Payload = Cell> {
    /// Allocate the arena for this world.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::GraphTooLarge`] if the cell count does not fit
    /// a node id.
    fn build_graph(&self) -> Result<Graph<Cell>, PlannerError>;

    fn node_at(&self, cell: Cell) -> Option<NodeId>;

    /// Where the search roots. The agent plans a route to here.
    fn goal(&self) -> Cell;

    fn agent(&self) -> Cell;

    fn blocked_cost(&self) -> f64;
}
