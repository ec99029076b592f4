//! Search entry point and expansion loop.

use dstar_kernel::order::Key;

use crate::continuation::Continuation;
use crate::contract::{admissible_value, ContractViolationV1, PlanningWorldV1};
use crate::error::PlannerError;
use crate::node::{Graph, Node, NodeId, NodeState};
use crate::open_list::OpenList;
use crate::policy::{BudgetExhaustionV1, PlannerPolicyV1};
use crate::trace::{
    ExpandEventV1, PlannerTraceV1, RegimeV1, TerminationReasonV1, TraceMetadataV1, UpdateV1,
};

/// Best known `(f, g)` of the agent's node.
///
/// The loop stops once the popped `(f, k)` passes this bound. Starts at the
/// policy sentinel when the agent has never been reached, and is tightened
/// in place whenever the agent's node is popped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotBound {
    pub f: f64,
    pub g: f64,
}

impl RobotBound {
    #[must_use]
    pub const fn new(f: f64, g: f64) -> Self {
        Self { f, g }
    }

    /// Bound for an agent the search has never reached.
    #[must_use]
    pub const fn unknown(sentinel: f64) -> Self {
        Self {
            f: sentinel,
            g: sentinel,
        }
    }

    /// The agent node's current `(f, g)`.
    #[must_use]
    pub fn from_node<P>(node: &Node<P>) -> Self {
        Self {
            f: node.f(),
            g: node.g(),
        }
    }

    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_sentinel(self, sentinel: f64) -> bool {
        self.f == sentinel && self.g == sentinel
    }

    #[must_use]
    pub fn key(self) -> Key {
        Key::new(self.f, self.g)
    }
}

/// Result of one planning call.
///
/// Always carries a complete [`PlannerTraceV1`] regardless of how the call
/// terminated.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Parent of the agent's node when the agent was reached. `None` both
    /// when the agent was not reached and when the agent stands on a root.
    pub path_head: Option<NodeId>,
    pub termination: TerminationReasonV1,
    /// Pass this to the next call on the same graph.
    pub continuation: Continuation,
    /// Pops performed by this call.
    pub expansions: u64,
    pub trace: PlannerTraceV1,
}

impl SearchOutcome {
    #[must_use]
    pub fn is_agent_reached(&self) -> bool {
        matches!(self.termination, TerminationReasonV1::AgentReached { .. })
    }
}

/// Run Focused D* from `seeds`, resuming the frontier held in `continuation`.
///
/// Nodes retained by the previous call are merged first, each re-keyed with
/// its own `k` so its heuristic is refreshed against the agent's current
/// position. Seeds are then queued with the `g` they already hold (set it
/// with [`Graph::set_root`] for a root). `robot_bound` is read for the early
/// stop and updated in place when the agent's node is popped.
///
/// All runtime terminations (agent reached, bound passed, open list empty,
/// budget exhausted, world contract violation) return `Ok` with the audit
/// trail preserved.
///
/// # Errors
///
/// Pre-flight only, before any node is touched:
/// - [`PlannerError::InvalidPolicy`] from [`PlannerPolicyV1::validate`];
/// - [`PlannerError::UnknownNode`] for a seed outside the graph;
/// - [`PlannerError::StaleContinuation`] for a retained node that is not
///   an open node of this graph;
/// - [`PlannerError::OrphanedOpenNode`] for an open node the continuation
///   does not hold, left by a dropped continuation that was never
///   discarded.
pub fn search<W>(
    graph: &mut Graph<W::Payload>,
    seeds: &[NodeId],
    world: &W,
    policy: &PlannerPolicyV1,
    continuation: Continuation,
    robot_bound: &mut RobotBound,
) -> Result<SearchOutcome, PlannerError>
where
    W: PlanningWorldV1 + ?Sized,
{
    policy.validate()?;
    if let Some(&id) = seeds.iter().find(|id| !graph.contains(**id)) {
        return Err(PlannerError::UnknownNode {
            id,
            graph_len: graph.len(),
        });
    }
    continuation.validate(graph)?;

    let (retained, lifetime_before) = continuation.into_parts();
    let bound_before = robot_bound.key();

    tracing::debug!(
        world = world.world_id(),
        seeds = seeds.len(),
        retained = retained.len(),
        bound_f = robot_bound.f,
        bound_g = robot_bound.g,
        "search started"
    );

    let mut run = Expander {
        graph,
        world,
        open: OpenList::new(),
        neighbors: Vec::with_capacity(policy.max_neighbors),
        events: Vec::new(),
        max_neighbors: policy.max_neighbors,
        expansions: 0,
    };

    let stop = run.drive(&retained, seeds, robot_bound, policy.max_expansions);

    let expansions = run.expansions;
    let lifetime = lifetime_before + expansions;
    let (termination, path_head, kept) = match stop {
        Ok(Stop::AgentReached(node)) => {
            let head = run.graph[node].parent;
            tracing::info!(node = %node, expansions, "agent reached");
            (TerminationReasonV1::AgentReached { node }, head, run.retain())
        }
        Ok(Stop::BoundExceeded(node)) => {
            tracing::debug!(node = %node, expansions, "agent bound passed, search stopped");
            (TerminationReasonV1::BoundExceeded { node }, None, run.retain())
        }
        Ok(Stop::Exhausted) => {
            tracing::debug!(expansions, "open list exhausted");
            (TerminationReasonV1::OpenExhausted, None, Vec::new())
        }
        Ok(Stop::BudgetExceeded) => {
            let frontier_retained =
                policy.on_budget_exhausted == BudgetExhaustionV1::RetainFrontier;
            tracing::warn!(
                expansions,
                limit = policy.max_expansions,
                frontier_retained,
                "expansion budget exceeded"
            );
            let kept = if frontier_retained {
                run.retain()
            } else {
                run.open.close_all(run.graph);
                Vec::new()
            };
            (
                TerminationReasonV1::ExpansionBudgetExceeded {
                    expansions,
                    frontier_retained,
                },
                None,
                kept,
            )
        }
        Err(violation) => {
            tracing::warn!(%violation, expansions, "world contract violation, frontier discarded");
            run.abandon(&retained);
            (
                TerminationReasonV1::WorldContractViolation(violation),
                None,
                Vec::new(),
            )
        }
    };

    let trace = PlannerTraceV1 {
        expansions: run.events,
        metadata: TraceMetadataV1 {
            world_id: world.world_id().to_string(),
            seed_count: seeds.len() as u64,
            retained_in: retained.len() as u64,
            retained_out: kept.len() as u64,
            total_expansions: expansions,
            frontier_high_water: run.open.high_water() as u64,
            bound_before,
            bound_after: robot_bound.key(),
            termination,
        },
    };

    Ok(SearchOutcome {
        path_head,
        termination,
        continuation: Continuation::new(kept, lifetime),
        expansions,
        trace,
    })
}

/// `k == g` at pop time means the node's cost did not rise.
#[allow(clippy::float_cmp)]
fn regime_of(kold: f64, g: f64) -> RegimeV1 {
    if kold == g {
        RegimeV1::Lower
    } else {
        RegimeV1::Raise
    }
}

enum Stop {
    AgentReached(NodeId),
    BoundExceeded(NodeId),
    Exhausted,
    BudgetExceeded,
}

/// Working state of one call.
struct Expander<'a, W: PlanningWorldV1 + ?Sized> {
    graph: &'a mut Graph<W::Payload>,
    world: &'a W,
    open: OpenList,
    /// Reused neighbor buffer.
    neighbors: Vec<NodeId>,
    events: Vec<ExpandEventV1>,
    max_neighbors: usize,
    expansions: u64,
}

impl<W: PlanningWorldV1 + ?Sized> Expander<'_, W> {
    fn drive(
        &mut self,
        retained: &[NodeId],
        seeds: &[NodeId],
        bound: &mut RobotBound,
        budget: u64,
    ) -> Result<Stop, ContractViolationV1> {
        self.merge(retained)?;
        self.seed(seeds)?;
        self.run(bound, budget)
    }

    /// Re-key the previous frontier: `g` becomes the retained `k`.
    fn merge(&mut self, retained: &[NodeId]) -> Result<(), ContractViolationV1> {
        for &id in retained {
            let node = self.graph.node_mut(id);
            node.state = NodeState::Closed;
            node.prev = None;
            node.next = None;
            let k = node.k;
            self.queue(id, k)?;
        }
        Ok(())
    }

    fn seed(&mut self, seeds: &[NodeId]) -> Result<(), ContractViolationV1> {
        for &id in seeds {
            let g = self.graph[id].g;
            self.queue(id, g)?;
        }
        Ok(())
    }

    #[allow(clippy::float_cmp)]
    fn run(&mut self, bound: &mut RobotBound, budget: u64) -> Result<Stop, ContractViolationV1> {
        while let Some(current) = self.open.pop_min(self.graph) {
            self.expansions += 1;
            let node = &self.graph[current];
            let pop_key = node.open_key();
            let kold = node.k;

            tracing::trace!(node = %self.world.describe(node), "expanding");

            if self.world.is_agent(node) {
                *bound = RobotBound::new(node.h + node.g, node.g);
                if kold == node.g {
                    self.record(current, pop_key, RegimeV1::Lower, Vec::new());
                    return Ok(Stop::AgentReached(current));
                }
            }

            if !pop_key.at_most(bound.key()) {
                let regime = regime_of(kold, self.graph[current].g);
                self.record(current, pop_key, regime, Vec::new());
                return Ok(Stop::BoundExceeded(current));
            }

            match self.expand(current, pop_key) {
                Ok((regime, updates)) => self.record(current, pop_key, regime, updates),
                Err(violation) => {
                    let regime = regime_of(kold, self.graph[current].g);
                    self.record(current, pop_key, regime, Vec::new());
                    return Err(violation);
                }
            }

            if self.expansions > budget {
                return Ok(Stop::BudgetExceeded);
            }
        }
        Ok(Stop::Exhausted)
    }

    /// Propagate cost changes from `current` to its neighbors.
    #[allow(clippy::float_cmp)]
    fn expand(
        &mut self,
        current: NodeId,
        pop_key: Key,
    ) -> Result<(RegimeV1, Vec<UpdateV1>), ContractViolationV1> {
        let neighbors = self.collect_neighbors(current)?;
        let kold = pop_key.secondary;
        let mut updates = Vec::new();

        // A raised node first looks for a settled neighbor that already
        // offers a cheaper route.
        if kold < self.graph[current].g {
            for &n in &neighbors {
                let neighbor = &self.graph[n];
                if neighbor.state == NodeState::Closed {
                    let h = self.world.heuristic(neighbor);
                    if !admissible_value(h) {
                        return Err(ContractViolationV1::InvalidHeuristic {
                            node: n,
                            value_bits: h.to_bits(),
                        });
                    }
                    if h != neighbor.h {
                        continue;
                    }
                }
                if neighbor.state != NodeState::New && neighbor.bound_key().at_most(pop_key) {
                    let via = neighbor.g + self.cost(current, n)?;
                    if self.graph[current].g > via {
                        let node = self.graph.node_mut(current);
                        node.parent = Some(n);
                        node.g = via;
                        updates.push(UpdateV1::ImprovedCurrent { via: n, g: via });
                    }
                }
            }
        }

        let regime = regime_of(kold, self.graph[current].g);

        for &n in &neighbors {
            let through = self.graph[current].g + self.cost(n, current)?;
            let neighbor = &self.graph[n];
            let is_child = neighbor.parent == Some(current);
            let stale_child = is_child && neighbor.g != through;
            let cheaper_through_current = !is_child && neighbor.g > through;

            if neighbor.state == NodeState::New
                || stale_child
                || (regime == RegimeV1::Lower && cheaper_through_current)
            {
                self.graph.node_mut(n).parent = Some(current);
                self.queue(n, through)?;
                updates.push(UpdateV1::Rewired {
                    neighbor: n,
                    g: through,
                });
            } else if regime == RegimeV1::Raise && cheaper_through_current {
                // Hold until the raise has settled around `current`.
                let g = self.graph[current].g;
                self.queue(current, g)?;
                updates.push(UpdateV1::HoldCurrent { neighbor: n });
            } else if regime == RegimeV1::Raise && !is_child {
                let g = neighbor.g;
                let reopen = neighbor.state == NodeState::Closed;
                let bound = neighbor.bound_key();
                if self.graph[current].g > g + self.cost(current, n)?
                    && reopen
                    && pop_key.less_than(bound)
                {
                    self.queue(n, g)?;
                    updates.push(UpdateV1::ReopenNeighbor { neighbor: n, g });
                }
            }
        }

        self.neighbors = neighbors;
        Ok((regime, updates))
    }

    /// Ask the world for neighbors and check them against the contract.
    fn collect_neighbors(&mut self, node: NodeId) -> Result<Vec<NodeId>, ContractViolationV1> {
        let mut out = std::mem::take(&mut self.neighbors);
        out.clear();
        self.world.neighbors(self.graph, node, &mut out);
        if out.len() > self.max_neighbors {
            return Err(ContractViolationV1::TooManyNeighbors {
                node,
                count: out.len(),
                limit: self.max_neighbors,
            });
        }
        if let Some(&neighbor) = out.iter().find(|id| !self.graph.contains(**id)) {
            return Err(ContractViolationV1::UnknownNeighbor { node, neighbor });
        }
        Ok(out)
    }

    /// Validated cost of moving the agent from `from` into `to`.
    fn cost(&self, from: NodeId, to: NodeId) -> Result<f64, ContractViolationV1> {
        let value = self.world.edge_cost(&self.graph[from], &self.graph[to]);
        if admissible_value(value) {
            Ok(value)
        } else {
            Err(ContractViolationV1::InvalidCost {
                from,
                to,
                value_bits: value.to_bits(),
            })
        }
    }

    fn queue(&mut self, id: NodeId, g: f64) -> Result<(), ContractViolationV1> {
        let world = self.world;
        self.open.insert(self.graph, id, g, |n| world.heuristic(n))
    }

    fn record(&mut self, node: NodeId, pop_key: Key, regime: RegimeV1, updates: Vec<UpdateV1>) {
        let n = &self.graph[node];
        self.events.push(ExpandEventV1 {
            expansion_order: self.expansions - 1,
            node,
            pop_key,
            regime,
            g_after: n.g,
            parent_after: n.parent,
            updates,
        });
    }

    /// Open ids in list order; the nodes stay open and linked.
    fn retain(&self) -> Vec<NodeId> {
        self.open.iter(self.graph).collect()
    }

    /// Close everything a failed call left open, including retained nodes
    /// the merge never reached.
    fn abandon(&mut self, retained: &[NodeId]) {
        self.open.close_all(self.graph);
        for &id in retained {
            if self.graph[id].state == NodeState::Open {
                let node = self.graph.node_mut(id);
                node.state = NodeState::Closed;
                node.prev = None;
                node.next = None;
            }
        }
    }
}
