//! The open list: an `(f, k)`-ordered frontier threaded through the arena.
//!
//! Links live in the nodes themselves (`prev`/`next` indices), so a node can
//! be found and unlinked in O(1) when it is reprioritized. Insertion is a
//! linear scan from the head; a new node goes in front of the first node it
//! strictly precedes, which places it after every node with an equal key.
//! That tie rule decides which of several equal-cost nodes is expanded
//! first, and with it the RAISE/LOWER classification downstream.

use crate::contract::{admissible_value, ContractViolationV1};
use crate::node::{Graph, Node, NodeId, NodeState};

/// Best-first open list.
///
/// Holds only the head index and counters; every link is stored in the
/// [`Graph`] the list was built over. A list must only ever be used with
/// that one graph.
#[derive(Debug, Default)]
pub struct OpenList {
    head: Option<NodeId>,
    len: usize,
    high_water: usize,
}

impl OpenList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The minimum node, if any.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Largest length the list has reached.
    #[must_use]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Insert or reprioritize `id` with proposed cost `new_g`.
    ///
    /// Key derivation by current state:
    /// - `New`: `k = new_g`
    /// - `Open`: `k = min(k, new_g)`, after unlinking from the current position
    /// - `Closed`: `k = min(g, new_g)`
    ///
    /// Then `g = new_g`, `h = heuristic(node)`, `f = k + h`, state `Open`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolationV1::InvalidHeuristic`] when the heuristic is
    /// NaN, infinite or negative. The node and the list are left untouched.
    pub fn insert<P, H>(
        &mut self,
        graph: &mut Graph<P>,
        id: NodeId,
        new_g: f64,
        heuristic: H,
    ) -> Result<(), ContractViolationV1>
    where
        H: FnOnce(&Node<P>) -> f64,
    {
        let h = heuristic(&graph[id]);
        if !admissible_value(h) {
            return Err(ContractViolationV1::InvalidHeuristic {
                node: id,
                value_bits: h.to_bits(),
            });
        }

        let k = match graph[id].state {
            NodeState::New => new_g,
            NodeState::Open => {
                self.unlink(graph, id);
                graph[id].k.min(new_g)
            }
            NodeState::Closed => graph[id].g.min(new_g),
        };

        let node = graph.node_mut(id);
        node.k = k;
        node.g = new_g;
        node.h = h;
        node.f = k + h;
        node.state = NodeState::Open;

        self.link_sorted(graph, id);
        self.len += 1;
        self.high_water = self.high_water.max(self.len);
        Ok(())
    }

    /// Remove the minimum node, clear its links and mark it `Closed`.
    pub fn pop_min<P>(&mut self, graph: &mut Graph<P>) -> Option<NodeId> {
        let id = self.head?;
        let next = graph[id].next;
        if let Some(next) = next {
            graph.node_mut(next).prev = None;
        }
        self.head = next;
        self.len -= 1;

        let node = graph.node_mut(id);
        node.prev = None;
        node.next = None;
        node.state = NodeState::Closed;
        Some(id)
    }

    /// Node ids from head to tail.
    pub fn iter<'g, P>(&self, graph: &'g Graph<P>) -> impl Iterator<Item = NodeId> + 'g {
        std::iter::successors(self.head, move |id| graph[*id].next).take(self.len)
    }

    /// Close every remaining node and empty the list.
    pub fn close_all<P>(&mut self, graph: &mut Graph<P>) -> usize {
        let mut closed = 0;
        while self.pop_min(graph).is_some() {
            closed += 1;
        }
        closed
    }

    /// Verify ordering and link consistency.
    ///
    /// Checks that keys ascend by `(f, k)`, that `prev`/`next` agree in both
    /// directions, that every member is `Open`, and that the walk length
    /// matches `len`.
    #[must_use]
    pub fn check_invariants<P>(&self, graph: &Graph<P>) -> bool {
        let mut prev: Option<NodeId> = None;
        let mut count = 0;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let Some(node) = graph.get(id) else {
                return false;
            };
            if node.state != NodeState::Open || node.prev != prev {
                return false;
            }
            if let Some(p) = prev {
                if node.open_key().less_than(graph[p].open_key()) {
                    return false;
                }
            }
            count += 1;
            if count > self.len {
                return false;
            }
            prev = Some(id);
            cursor = node.next;
        }
        count == self.len
    }

    fn unlink<P>(&mut self, graph: &mut Graph<P>, id: NodeId) {
        let (prev, next) = (graph[id].prev, graph[id].next);
        debug_assert!(
            prev.is_some() || self.head == Some(id),
            "open node {id} is not a member of this list"
        );
        if let Some(prev) = prev {
            graph.node_mut(prev).next = next;
        }
        if let Some(next) = next {
            graph.node_mut(next).prev = prev;
        }
        if self.head == Some(id) {
            self.head = next;
        }
        let node = graph.node_mut(id);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    fn link_sorted<P>(&mut self, graph: &mut Graph<P>, id: NodeId) {
        let key = graph[id].open_key();

        let Some(head) = self.head else {
            let node = graph.node_mut(id);
            node.prev = None;
            node.next = None;
            self.head = Some(id);
            return;
        };

        if key.less_than(graph[head].open_key()) {
            graph.node_mut(head).prev = Some(id);
            let node = graph.node_mut(id);
            node.prev = None;
            node.next = Some(head);
            self.head = Some(id);
            return;
        }

        let mut at = head;
        loop {
            match graph[at].next {
                Some(after) if key.less_than(graph[after].open_key()) => {
                    graph.node_mut(after).prev = Some(id);
                    graph.node_mut(at).next = Some(id);
                    let node = graph.node_mut(id);
                    node.prev = Some(at);
                    node.next = Some(after);
                    return;
                }
                Some(after) => at = after,
                None => {
                    graph.node_mut(at).next = Some(id);
                    let node = graph.node_mut(id);
                    node.prev = Some(at);
                    node.next = None;
                    return;
                }
            }
        }
    }
}
