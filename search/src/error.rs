//! Typed planner errors.
//!
//! `PlannerError` represents pre-flight failures only. Runtime terminations
//! (bound exceeded, budget exhaustion, world contract violations) are
//! expressed via [`crate::trace::TerminationReasonV1`] and always come back
//! as an `Ok` outcome with a trace.

use crate::node::{NodeId, NodeState};

/// Typed failure for pre-flight validation and arena construction.
///
/// No node is mutated when one of these is returned from
/// [`crate::search::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    /// A policy limit is zero, or the bound sentinel is not a positive number.
    InvalidPolicy { detail: String },
    /// A seed or root id lies outside the arena.
    UnknownNode { id: NodeId, graph_len: usize },
    /// A retained node is outside the arena or no longer on the open list,
    /// so the continuation does not belong to this graph state.
    StaleContinuation { id: NodeId, state: Option<NodeState> },
    /// An open node is not held by the continuation. A previous frontier
    /// was dropped without [`crate::continuation::Continuation::discard`]
    /// or a graph reset.
    OrphanedOpenNode { id: NodeId },
    /// The payload count does not fit a node id.
    GraphTooLarge { len: usize },
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPolicy { detail } => write!(f, "invalid planner policy: {detail}"),
            Self::UnknownNode { id, graph_len } => {
                write!(f, "node {id} is outside the graph ({graph_len} nodes)")
            }
            Self::StaleContinuation { id, state: Some(state) } => write!(
                f,
                "continuation is stale: retained node {id} is {}, expected open",
                state.as_str()
            ),
            Self::StaleContinuation { id, state: None } => {
                write!(f, "continuation is stale: retained node {id} is outside the graph")
            }
            Self::OrphanedOpenNode { id } => write!(
                f,
                "node {id} is open but not held by the continuation; \
                 discard the previous continuation or reset the graph"
            ),
            Self::GraphTooLarge { len } => {
                write!(f, "graph of {len} nodes exceeds the node id range")
            }
        }
    }
}

impl std::error::Error for PlannerError {}
