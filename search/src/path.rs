//! Route reconstruction along back-pointers.

use crate::contract::{admissible_value, PlanningWorldV1};
use crate::node::{Graph, NodeId};

/// Failure while walking a back-pointer chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The start id lies outside the graph.
    UnknownNode { id: NodeId },
    /// The walk did not reach a root within `graph.len()` steps.
    CycleDetected { start: NodeId, steps: usize },
    /// `edge_cost` returned a value that cannot be summed.
    InvalidCost { from: NodeId, to: NodeId },
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode { id } => write!(f, "path start {id} is outside the graph"),
            Self::CycleDetected { start, steps } => write!(
                f,
                "back-pointers from {start} did not reach a root within {steps} steps"
            ),
            Self::InvalidCost { from, to } => {
                write!(f, "edge cost {from} -> {to} is not a finite non-negative number")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Ids from `start` to the root, following `parent`.
///
/// A chain longer than the graph must revisit a node, so the walk stops
/// after `graph.len()` steps.
///
/// # Errors
///
/// [`PathError::UnknownNode`] for a start outside the graph and
/// [`PathError::CycleDetected`] when the step limit is hit.
pub fn reconstruct_path<P>(graph: &Graph<P>, start: NodeId) -> Result<Vec<NodeId>, PathError> {
    if !graph.contains(start) {
        return Err(PathError::UnknownNode { id: start });
    }
    let limit = graph.len();
    let mut path = vec![start];
    let mut cursor = graph[start].parent();
    while let Some(id) = cursor {
        if path.len() >= limit {
            return Err(PathError::CycleDetected {
                start,
                steps: limit,
            });
        }
        path.push(id);
        cursor = graph[id].parent();
    }
    Ok(path)
}

/// Sum of `edge_cost(child, parent)` from `start` to the root.
///
/// For a path head returned by a successful search this equals the head's
/// `g`, up to floating-point rounding.
///
/// # Errors
///
/// Everything [`reconstruct_path`] reports, plus
/// [`PathError::InvalidCost`] for a cost that is NaN, infinite or negative.
pub fn path_cost<W>(graph: &Graph<W::Payload>, world: &W, start: NodeId) -> Result<f64, PathError>
where
    W: PlanningWorldV1 + ?Sized,
{
    let path = reconstruct_path(graph, start)?;
    let mut total = 0.0;
    for pair in path.windows(2) {
        let (child, parent) = (pair[0], pair[1]);
        let step = world.edge_cost(&graph[child], &graph[parent]);
        if !admissible_value(step) {
            return Err(PathError::InvalidCost {
                from: child,
                to: parent,
            });
        }
        total += step;
    }
    Ok(total)
}
