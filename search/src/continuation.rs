//! Frontier carried from one planning call to the next.

use crate::error::PlannerError;
use crate::node::{Graph, NodeId, NodeState};

/// Open nodes left over when a call stops early, in list order.
///
/// Each call consumes the previous continuation and returns a new one. The
/// retained nodes stay `Open` in the graph until the next call merges them
/// into its fresh open list, or until [`Continuation::discard`] retires them.
///
/// Deliberately not `Clone`: a continuation is valid for exactly one
/// subsequent call. Dropping one that still holds nodes leaves them `Open`;
/// call [`Continuation::discard`] or [`Graph::reset`] before the next search
/// on the same graph, or that search is rejected with
/// [`PlannerError::OrphanedOpenNode`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Continuation {
    retained: Vec<NodeId>,
    lifetime_expansions: u64,
}

impl Continuation {
    /// No retained nodes and a zero expansion count. Used for a cold start.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(retained: Vec<NodeId>, lifetime_expansions: u64) -> Self {
        Self {
            retained,
            lifetime_expansions,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.retained.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Retained ids, lowest key first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.retained
    }

    /// Expansions performed by every call in this chain so far.
    #[must_use]
    pub fn lifetime_expansions(&self) -> u64 {
        self.lifetime_expansions
    }

    /// Close every retained node that is still open and drop the list.
    ///
    /// Use this when abandoning incremental replanning without resetting the
    /// whole graph. The lifetime counter is kept. Returns the number of
    /// nodes closed.
    pub fn discard<P>(&mut self, graph: &mut Graph<P>) -> usize {
        let mut closed = 0;
        for id in self.retained.drain(..) {
            if graph.contains(id) && graph[id].state == NodeState::Open {
                let node = graph.node_mut(id);
                node.state = NodeState::Closed;
                node.prev = None;
                node.next = None;
                closed += 1;
            }
        }
        closed
    }

    /// Every retained id must still be an open node of `graph`, and every
    /// open node of `graph` must be retained.
    pub(crate) fn validate<P>(&self, graph: &Graph<P>) -> Result<(), PlannerError> {
        for &id in &self.retained {
            match graph.get(id) {
                Some(node) if node.state == NodeState::Open => {}
                Some(node) => {
                    return Err(PlannerError::StaleContinuation {
                        id,
                        state: Some(node.state),
                    })
                }
                None => return Err(PlannerError::StaleContinuation { id, state: None }),
            }
        }
        let open = graph
            .nodes()
            .filter(|n| n.state == NodeState::Open)
            .count();
        if open != self.retained.len() {
            if let Some(node) = graph
                .nodes()
                .find(|n| n.state == NodeState::Open && !self.retained.contains(&n.id()))
            {
                return Err(PlannerError::OrphanedOpenNode { id: node.id() });
            }
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (Vec<NodeId>, u64) {
        (self.retained, self.lifetime_expansions)
    }
}
