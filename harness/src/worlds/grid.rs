//! `GridWorld`: 8-connected occupancy grid with rectangular obstacles.
//!
//! Cells are stored row-major from the bottom row. Moving between adjacent
//! cells costs the Euclidean step length (1 or √2); entering a cell that
//! lies inside an obstacle adds the penalty on top. The heuristic is the
//! straight-line distance to the agent, so it shifts whenever the agent
//! moves and the planner refreshes it for retained nodes on the next call.

use dstar_search::contract::PlanningWorldV1;
use dstar_search::error::PlannerError;
use dstar_search::node::{Graph, Node, NodeId};

use crate::contract::{Cell, Rect, SpatialWorldV1};

/// Cost added for entering an obstacle cell.
pub const DEFAULT_PENALTY: f64 = 1e7;

/// Neighbor offsets: E, NE, N, NW, W, SW, S, SE.
const STEPS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// How obstacles shape the neighbor relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleMode {
    /// Obstacle cells stay reachable but carry the penalty.
    Penalty,
    /// Obstacle cells are never offered as neighbors.
    Impassable,
}

/// Typed failure for grid construction and agent moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is zero or exceeds the coordinate range.
    InvalidDimensions { width: u32, height: u32 },
    /// A goal or agent position lies off the grid.
    OffGrid { cell: Cell },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {width}x{height}")
            }
            Self::OffGrid { cell } => write!(f, "cell {cell} is off the grid"),
        }
    }
}

impl std::error::Error for GridError {}

#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i32,
    height: i32,
    goal: Cell,
    agent: Cell,
    obstacles: Vec<Rect>,
    penalty: f64,
    mode: ObstacleMode,
    world_id: String,
}

impl GridWorld {
    /// An obstacle-free grid in [`ObstacleMode::Penalty`].
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidDimensions`] for an empty grid or one whose
    /// cell count overflows the coordinate range, and
    /// [`GridError::OffGrid`] when `goal` or `agent` is outside it.
    pub fn new(width: u32, height: u32, goal: Cell, agent: Cell) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidDimensions { width, height };
        let w = i32::try_from(width).map_err(|_| invalid())?;
        let h = i32::try_from(height).map_err(|_| invalid())?;
        if w == 0 || h == 0 || w.checked_mul(h).is_none() {
            return Err(invalid());
        }
        let world = Self {
            width: w,
            height: h,
            goal,
            agent,
            obstacles: Vec::new(),
            penalty: DEFAULT_PENALTY,
            mode: ObstacleMode::Penalty,
            world_id: format!("grid:{width}x{height}"),
        };
        for cell in [goal, agent] {
            if !world.in_bounds(cell) {
                return Err(GridError::OffGrid { cell });
            }
        }
        Ok(world)
    }

    /// The 60×20 field with goal (50, 15), agent (10, 5) and two walls.
    ///
    /// Pair with [`REFERENCE_REPLAN_OBSTACLE`] and [`REFERENCE_REPLAN_AGENT`]
    /// for the standard replanning scenario.
    #[must_use]
    pub fn reference_field() -> Self {
        Self {
            width: 60,
            height: 20,
            goal: Cell::new(50, 15),
            agent: Cell::new(10, 5),
            obstacles: vec![Rect::from_tlbr(17, 15, 0, 17), Rect::from_tlbr(12, 5, 10, 15)],
            penalty: DEFAULT_PENALTY,
            mode: ObstacleMode::Penalty,
            world_id: "grid:60x20".to_string(),
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ObstacleMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    #[must_use]
    pub fn with_obstacle(mut self, rect: Rect) -> Self {
        self.obstacles.push(rect);
        self
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    #[must_use]
    pub fn mode(&self) -> ObstacleMode {
        self.mode
    }

    #[must_use]
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    #[must_use]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    #[must_use]
    pub fn in_obstacle(&self, cell: Cell) -> bool {
        self.obstacles.iter().any(|r| r.contains(cell))
    }

    /// Costs change for every cell in `rect`. The caller replans with the
    /// same rectangle.
    pub fn add_obstacle(&mut self, rect: Rect) {
        self.obstacles.push(rect);
    }

    /// # Errors
    ///
    /// Returns [`GridError::OffGrid`] if `cell` is outside the grid.
    pub fn move_agent(&mut self, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(cell) {
            return Err(GridError::OffGrid { cell });
        }
        self.agent = cell;
        Ok(())
    }

    /// ASCII map, top row first: `#` obstacle, `x` route, `G` goal, `R` agent.
    #[must_use]
    pub fn render(&self, route: &[Cell]) -> String {
        let mut out = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = Cell::new(x, y);
                let glyph = if cell == self.goal {
                    'G'
                } else if cell == self.agent {
                    'R'
                } else if self.in_obstacle(cell) {
                    '#'
                } else if route.contains(&cell) {
                    'x'
                } else {
                    '.'
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }

    fn index_of(&self, cell: Cell) -> Option<u32> {
        if !self.in_bounds(cell) {
            return None;
        }
        u32::try_from(cell.y * self.width + cell.x).ok()
    }
}

/// Standard replanning obstacle for [`GridWorld::reference_field`].
pub const REFERENCE_REPLAN_OBSTACLE: Rect = Rect::from_tlbr(18, 30, 10, 35);

/// Where the agent stands when [`REFERENCE_REPLAN_OBSTACLE`] appears.
pub const REFERENCE_REPLAN_AGENT: Cell = Cell::new(12, 15);

impl PlanningWorldV1 for GridWorld {
    type Payload = Cell;

    fn world_id(&self) -> &str {
        &self.world_id
    }

    fn neighbors(&self, graph: &Graph<Cell>, node: NodeId, out: &mut Vec<NodeId>) {
        let from = *graph[node].payload();
        for (dx, dy) in STEPS {
            let cell = Cell::new(from.x + dx, from.y + dy);
            if self.mode == ObstacleMode::Impassable && self.in_obstacle(cell) {
                continue;
            }
            if let Some(id) = self.node_at(cell) {
                out.push(id);
            }
        }
    }

    fn edge_cost(&self, from: &Node<Cell>, to: &Node<Cell>) -> f64 {
        let step = from.payload().distance(*to.payload());
        if self.in_obstacle(*to.payload()) {
            self.penalty + step
        } else {
            step
        }
    }

    fn heuristic(&self, node: &Node<Cell>) -> f64 {
        node.payload().distance(self.agent)
    }

    fn is_agent(&self, node: &Node<Cell>) -> bool {
        *node.payload() == self.agent
    }

    fn is_goal(&self, node: &Node<Cell>) -> bool {
        *node.payload() == self.goal
    }

    fn describe(&self, node: &Node<Cell>) -> String {
        format!(
            "{} {} f {:.2} h {:.2} g {:.2} k {:.2}",
            node.payload(),
            node.state().as_str(),
            node.f(),
            node.h(),
            node.g(),
            node.k()
        )
    }
}

impl SpatialWorldV1 for GridWorld {
    fn build_graph(&self) -> Result<Graph<Cell>, PlannerError> {
        let (w, h) = (self.width, self.height);
        Graph::from_payloads((0..h).flat_map(|y| (0..w).map(move |x| Cell::new(x, y))))
    }

    fn node_at(&self, cell: Cell) -> Option<NodeId> {
        self.index_of(cell).map(NodeId::new)
    }

    fn goal(&self) -> Cell {
        self.goal
    }

    fn agent(&self) -> Cell {
        self.agent
    }

    fn blocked_cost(&self) -> f64 {
        self.penalty
    }
}
