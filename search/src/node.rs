//! Node model and the caller-owned node arena.

use dstar_kernel::order::Key;

use crate::error::PlannerError;

/// Stable index of a node inside its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Position in the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a node within the planner.
///
/// `New → Open → Closed`, and `Closed → Open` when a node is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Never touched by any search call since the last reset.
    New,
    /// Currently on the open list (list links are populated).
    Open,
    /// Expanded, or retired from a discarded frontier.
    Closed,
}

impl NodeState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// One vertex of the planning graph.
///
/// Search bookkeeping is owned by the engine and only readable from outside
/// the crate. The payload belongs to the caller.
///
/// Invariants maintained by the open list:
/// - `prev`/`next` are populated only while `state == Open`;
/// - `f == k + h` after every insertion.
#[derive(Debug, Clone)]
pub struct Node<P> {
    id: NodeId,
    pub(crate) state: NodeState,
    /// Cost-to-root along the current back-pointer chain.
    pub(crate) g: f64,
    /// Heuristic to the agent, as of the last insertion.
    pub(crate) h: f64,
    /// Open-list sort key, `k + h`.
    pub(crate) f: f64,
    /// Smallest `g` held since the node last entered the open list.
    pub(crate) k: f64,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    payload: P,
}

impl<P> Node<P> {
    fn fresh(id: NodeId, payload: P) -> Self {
        Self {
            id,
            state: NodeState::New,
            g: 0.0,
            h: 0.0,
            f: 0.0,
            k: 0.0,
            parent: None,
            prev: None,
            next: None,
            payload,
        }
    }

    fn clear_bookkeeping(&mut self) {
        self.state = NodeState::New;
        self.g = 0.0;
        self.h = 0.0;
        self.f = 0.0;
        self.k = 0.0;
        self.parent = None;
        self.prev = None;
        self.next = None;
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    #[must_use]
    pub fn g(&self) -> f64 {
        self.g
    }

    #[must_use]
    pub fn h(&self) -> f64 {
        self.h
    }

    #[must_use]
    pub fn f(&self) -> f64 {
        self.f
    }

    #[must_use]
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Back-pointer toward the root. Many nodes may share one parent.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Open-list priority `(f, k)`.
    #[must_use]
    pub fn open_key(&self) -> Key {
        Key::new(self.f, self.k)
    }

    /// `(f, g)`, the pair compared against a popped node's `(f, k)`.
    #[must_use]
    pub fn bound_key(&self) -> Key {
        Key::new(self.f, self.g)
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.prev.is_some() || self.next.is_some()
    }
}

/// Fixed arena of nodes, allocated once for the lifetime of the graph.
///
/// The engine mutates bookkeeping in place on every call; it never adds or
/// removes nodes.
#[derive(Debug, Clone)]
pub struct Graph<P> {
    nodes: Vec<Node<P>>,
}

impl<P> Graph<P> {
    /// Build an arena with one node per payload, in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::GraphTooLarge`] when the payload count does not
    /// fit a `u32` node id.
    pub fn from_payloads(payloads: impl IntoIterator<Item = P>) -> Result<Self, PlannerError> {
        let mut nodes = Vec::new();
        for (index, payload) in payloads.into_iter().enumerate() {
            let raw =
                u32::try_from(index).map_err(|_| PlannerError::GraphTooLarge { len: index + 1 })?;
            nodes.push(Node::fresh(NodeId(raw), payload));
        }
        Ok(Self { nodes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        self.nodes.get(id.index())
    }

    /// Mutable access to a caller payload. Bookkeeping stays engine-owned.
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut P> {
        self.nodes.get_mut(id.index()).map(|n| &mut n.payload)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(Node::id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<P>> + '_ {
        self.nodes.iter()
    }

    /// Prepare `id` as a search root: `g = 0` and no back-pointer.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::UnknownNode`] if `id` is outside the arena.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), PlannerError> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(PlannerError::UnknownNode { id, graph_len: len })?;
        node.g = 0.0;
        node.parent = None;
        Ok(())
    }

    /// Return every node to `New` with cleared bookkeeping.
    ///
    /// Any outstanding [`crate::continuation::Continuation`] for this graph
    /// becomes stale and must not be passed to the next call.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.clear_bookkeeping();
        }
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<P> {
        &mut self.nodes[id.index()]
    }
}

impl<P> std::ops::Index<NodeId> for Graph<P> {
    type Output = Node<P>;

    fn index(&self, id: NodeId) -> &Node<P> {
        &self.nodes[id.index()]
    }
}
