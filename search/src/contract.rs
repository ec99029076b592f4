//! Planning world contract trait.

use crate::node::{Graph, Node, NodeId};

/// Collaborator callbacks the engine consults while searching.
///
/// The engine knows nothing about the space it searches; topology, costs,
/// the heuristic and the agent's whereabouts all come from here. Agent
/// position is part of the world value, so two worlds can plan side by side.
///
/// # Contract
///
/// - `neighbors` appends ids from the same graph, at most
///   `PlannerPolicyV1::max_neighbors` of them, in a deterministic order.
/// - `edge_cost(from, to)` is the cost of moving the agent from `from` into
///   `to`. It must be finite and non-negative. The engine prices the edge
///   from a popped node `current` toward a neighbor `n` as
///   `edge_cost(n, current)`, since back-pointers lead toward the root.
/// - `heuristic` estimates the distance from a node to the agent. It must be
///   finite and non-negative.
///
/// A breach is reported as [`ContractViolationV1`] in the termination reason;
/// the engine never stores an invalid value.
pub trait PlanningWorldV1 {
    /// Caller data carried by every node.
    type Payload;

    /// Stable world identifier, echoed into traces.
    fn world_id(&self) -> &str;

    /// Append the neighbors of `node` to `out` (cleared by the engine).
    fn neighbors(&self, graph: &Graph<Self::Payload>, node: NodeId, out: &mut Vec<NodeId>);

    fn edge_cost(&self, from: &Node<Self::Payload>, to: &Node<Self::Payload>) -> f64;

    fn heuristic(&self, node: &Node<Self::Payload>) -> f64;

    /// True when `node` is where the agent currently stands.
    fn is_agent(&self, node: &Node<Self::Payload>) -> bool;

    /// True for the search root(s). Used by callers and diagnostics only.
    fn is_goal(&self, node: &Node<Self::Payload>) -> bool;

    /// One-line description of a node for trace logging.
    fn describe(&self, node: &Node<Self::Payload>) -> String {
        format!(
            "{} {} g={} k={} f={}",
            node.id(),
            node.state().as_str(),
            node.g(),
            node.k(),
            node.f()
        )
    }
}

/// A world callback broke its contract.
///
/// Float values are carried as IEEE-754 bit patterns so the violation can be
/// compared and hashed like every other trace artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractViolationV1 {
    /// `neighbors` returned more ids than the policy allows.
    TooManyNeighbors { node: NodeId, count: usize, limit: usize },
    /// `neighbors` returned an id outside the graph.
    UnknownNeighbor { node: NodeId, neighbor: NodeId },
    /// `edge_cost` returned NaN, an infinity, or a negative number.
    InvalidCost { from: NodeId, to: NodeId, value_bits: u64 },
    /// `heuristic` returned NaN, an infinity, or a negative number.
    InvalidHeuristic { node: NodeId, value_bits: u64 },
}

impl ContractViolationV1 {
    /// Stable snake-case tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TooManyNeighbors { .. } => "too_many_neighbors",
            Self::UnknownNeighbor { .. } => "unknown_neighbor",
            Self::InvalidCost { .. } => "invalid_cost",
            Self::InvalidHeuristic { .. } => "invalid_heuristic",
        }
    }
}

impl std::fmt::Display for ContractViolationV1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyNeighbors { node, count, limit } => {
                write!(f, "node {node} has {count} neighbors, limit is {limit}")
            }
            Self::UnknownNeighbor { node, neighbor } => {
                write!(f, "node {node} lists neighbor {neighbor} outside the graph")
            }
            Self::InvalidCost {
                from,
                to,
                value_bits,
            } => write!(
                f,
                "edge cost {from} -> {to} is {}",
                f64::from_bits(*value_bits)
            ),
            Self::InvalidHeuristic { node, value_bits } => write!(
                f,
                "heuristic for {node} is {}",
                f64::from_bits(*value_bits)
            ),
        }
    }
}

impl std::error::Error for ContractViolationV1 {}

/// Validate a cost or heuristic value.
pub(crate) fn admissible_value(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
