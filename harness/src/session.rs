//! Replanning session: one graph planned against a spatial world, first from
//! scratch and then incrementally as obstacles appear and the agent moves.
//!
//! # Flow
//!
//! ```text
//! new(world, policy) ── cold_start(world) ── replan(world, rect) ── replan ...
//!                        root = goal          seeds = ring of rect
//!                        bound unknown        bound = agent (f, g)
//! ```
//!
//! The session owns the graph, the continuation handed between calls and the
//! agent bound. The world owns geometry and the agent position; the caller
//! mutates it between calls and passes the changed rectangle to `replan`.

use dstar_kernel::proof::hash::ContentHash;
use dstar_search::continuation::Continuation;
use dstar_search::error::PlannerError;
use dstar_search::node::{Graph, NodeId, NodeState};
use dstar_search::path::{path_cost, reconstruct_path, PathError};
use dstar_search::policy::PlannerPolicyV1;
use dstar_search::search::{search, RobotBound};
use dstar_search::trace::{PlannerTraceV1, TerminationReasonV1};

use crate::contract::{Cell, Rect, SpatialWorldV1};

/// Error during a session run. Runtime terminations are not errors; they
/// land in [`RunRecordV1::termination`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Pre-flight rejection from the planner.
    Planner(PlannerError),
    /// The agent's back-pointer chain could not be walked or priced.
    Path(PathError),
    /// Trace serialization failed.
    CanonFailed { detail: String },
    /// The world's goal or agent has no node in the session graph.
    OffGraph { cell: Cell },
    /// `replan` was called before `cold_start`.
    NotStarted,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planner(e) => write!(f, "planner rejected the call: {e}"),
            Self::Path(e) => write!(f, "route walk failed: {e}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::OffGraph { cell } => write!(f, "cell {cell} has no node in the session graph"),
            Self::NotStarted => f.write_str("replan requested before a cold start"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Which entry point produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKindV1 {
    ColdStart,
    Replan,
}

impl RunKindV1 {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ColdStart => "cold_start",
            Self::Replan => "replan",
        }
    }
}

/// The agent's route after a run, read off its back-pointer chain.
///
/// Cells run from the agent to the goal. `cost` is the sum of edge costs
/// along those cells under the world's current cost model.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteV1 {
    /// The search settled the agent and the route avoids obstacles.
    Reached { cells: Vec<Cell>, cost: f64 },
    /// The search stopped early but the chain left in the graph is a
    /// finite route.
    Retained { cells: Vec<Cell>, cost: f64 },
    /// Every route found crosses an obstacle.
    Blocked { cells: Vec<Cell>, cost: f64 },
    /// The agent has no back-pointer chain.
    Unreachable,
}

impl RouteV1 {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reached { .. } => "reached",
            Self::Retained { .. } => "retained",
            Self::Blocked { .. } => "blocked",
            Self::Unreachable => "unreachable",
        }
    }

    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        match self {
            Self::Reached { cells, .. }
            | Self::Retained { cells, .. }
            | Self::Blocked { cells, .. } => cells,
            Self::Unreachable => &[],
        }
    }

    #[must_use]
    pub fn cost(&self) -> Option<f64> {
        match self {
            Self::Reached { cost, .. }
            | Self::Retained { cost, .. }
            | Self::Blocked { cost, .. } => Some(*cost),
            Self::Unreachable => None,
        }
    }

    /// `Reached` or `Retained`.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Reached { .. } | Self::Retained { .. })
    }
}

/// Summary of one planning call within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecordV1 {
    pub kind: RunKindV1,
    pub termination: TerminationReasonV1,
    /// Pops performed by this call alone.
    pub expansions: u64,
    pub seeds: usize,
    pub route: RouteV1,
    pub trace_digest: ContentHash,
}

/// Graph, continuation and bound carried across planning calls.
#[derive(Debug)]
pub struct ReplanSession {
    world_id: String,
    graph: Graph<Cell>,
    continuation: Continuation,
    bound: RobotBound,
    policy: PlannerPolicyV1,
    runs: Vec<RunRecordV1>,
    last_trace: Option<PlannerTraceV1>,
}

impl ReplanSession {
    /// Allocate the graph for `world`. Nothing is searched yet.
    ///
    /// # Errors
    ///
    /// [`SessionError::Planner`] for an invalid policy or a world too large
    /// for the node id range.
    pub fn new<W: SpatialWorldV1>(
        world: &W,
        policy: PlannerPolicyV1,
    ) -> Result<Self, SessionError> {
        policy.validate().map_err(SessionError::Planner)?;
        let graph = world.build_graph().map_err(SessionError::Planner)?;
        Ok(Self {
            world_id: world.world_id().to_string(),
            graph,
            continuation: Continuation::empty(),
            bound: RobotBound::unknown(policy.bound_sentinel),
            policy,
            runs: Vec::new(),
            last_trace: None,
        })
    }

    /// Plan from nothing: every node back to `New`, the goal as sole root.
    ///
    /// Any frontier left by earlier runs is dropped.
    ///
    /// # Errors
    ///
    /// [`SessionError::OffGraph`] when the goal or agent has no node, and
    /// [`SessionError::Path`] when the agent's chain cannot be priced.
    pub fn cold_start<W: SpatialWorldV1>(
        &mut self,
        world: &W,
    ) -> Result<&RunRecordV1, SessionError> {
        let goal = self.node_for(world, world.goal())?;
        self.node_for(world, world.agent())?;

        self.graph.reset();
        self.continuation = Continuation::empty();
        self.graph.set_root(goal).map_err(SessionError::Planner)?;
        self.bound = RobotBound::unknown(self.policy.bound_sentinel);

        tracing::info!(
            world = %self.world_id,
            goal = %world.goal(),
            agent = %world.agent(),
            "cold start"
        );
        self.run(world, RunKindV1::ColdStart, &[goal])
    }

    /// Repair the plan after costs changed inside `changed`.
    ///
    /// Ring cells of `changed` that already hold a back-pointer are reopened
    /// as seeds; the frontier retained by the previous run is merged back.
    /// The agent bound is the agent node's current `(f, g)`, or unknown if
    /// no search has touched that node yet.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotStarted`] before the first cold start,
    /// [`SessionError::OffGraph`] for an agent outside the graph, and
    /// [`SessionError::Path`] when the agent's chain cannot be priced.
    pub fn replan<W: SpatialWorldV1>(
        &mut self,
        world: &W,
        changed: Rect,
    ) -> Result<&RunRecordV1, SessionError> {
        if self.runs.is_empty() {
            return Err(SessionError::NotStarted);
        }
        let agent = self.node_for(world, world.agent())?;

        let seeds: Vec<NodeId> = changed
            .perimeter()
            .into_iter()
            .filter_map(|cell| world.node_at(cell))
            .filter(|id| self.graph.get(*id).is_some_and(|n| n.parent().is_some()))
            .collect();

        let agent_node = &self.graph[agent];
        self.bound = if agent_node.state() == NodeState::New {
            RobotBound::unknown(self.policy.bound_sentinel)
        } else {
            RobotBound::from_node(agent_node)
        };

        tracing::info!(
            world = %self.world_id,
            agent = %world.agent(),
            seeds = seeds.len(),
            retained = self.continuation.len(),
            "replan"
        );
        self.run(world, RunKindV1::Replan, &seeds)
    }

    #[must_use]
    pub fn world_id(&self) -> &str {
        &self.world_id
    }

    #[must_use]
    pub fn graph(&self) -> &Graph<Cell> {
        &self.graph
    }

    #[must_use]
    pub fn continuation(&self) -> &Continuation {
        &self.continuation
    }

    #[must_use]
    pub fn bound(&self) -> RobotBound {
        self.bound
    }

    #[must_use]
    pub fn policy(&self) -> &PlannerPolicyV1 {
        &self.policy
    }

    /// Every run so far, oldest first.
    #[must_use]
    pub fn runs(&self) -> &[RunRecordV1] {
        &self.runs
    }

    /// Full trace of the most recent run.
    #[must_use]
    pub fn last_trace(&self) -> Option<&PlannerTraceV1> {
        self.last_trace.as_ref()
    }

    fn node_for<W: SpatialWorldV1>(&self, world: &W, cell: Cell) -> Result<NodeId, SessionError> {
        world
            .node_at(cell)
            .filter(|id| self.graph.contains(*id))
            .ok_or(SessionError::OffGraph { cell })
    }

    fn run<W: SpatialWorldV1>(
        &mut self,
        world: &W,
        kind: RunKindV1,
        seeds: &[NodeId],
    ) -> Result<&RunRecordV1, SessionError> {
        let continuation = std::mem::take(&mut self.continuation);
        let outcome = search(
            &mut self.graph,
            seeds,
            world,
            &self.policy,
            continuation,
            &mut self.bound,
        )
        .map_err(SessionError::Planner)?;
        self.continuation = outcome.continuation;

        let trace_digest = outcome
            .trace
            .digest()
            .map_err(|e| SessionError::CanonFailed {
                detail: e.to_string(),
            })?;
        let route = self.finish(world, outcome.termination)?;

        tracing::info!(
            kind = kind.as_str(),
            termination = outcome.termination.as_str(),
            expansions = outcome.expansions,
            route = route.as_str(),
            "run finished"
        );

        self.last_trace = Some(outcome.trace);
        let index = self.runs.len();
        self.runs.push(RunRecordV1 {
            kind,
            termination: outcome.termination,
            expansions: outcome.expansions,
            seeds: seeds.len(),
            route,
            trace_digest,
        });
        Ok(&self.runs[index])
    }

    /// Read the agent's route off the graph and classify it.
    ///
    /// A route costing at least the world's blocked cost must have entered
    /// an obstacle.
    ///
    /// # Errors
    ///
    /// [`SessionError::Path`] when an edge cost along the chain is invalid.
    fn finish<W: SpatialWorldV1>(
        &self,
        world: &W,
        termination: TerminationReasonV1,
    ) -> Result<RouteV1, SessionError> {
        let agent = self.node_for(world, world.agent())?;
        let node = &self.graph[agent];
        if node.parent().is_none() && !world.is_goal(node) {
            return Ok(RouteV1::Unreachable);
        }

        let ids = match reconstruct_path(&self.graph, agent) {
            Ok(ids) => ids,
            Err(PathError::CycleDetected { start, steps }) => {
                tracing::warn!(start = %start, steps, "agent chain cycles, treating as unreachable");
                return Ok(RouteV1::Unreachable);
            }
            Err(e) => return Err(SessionError::Path(e)),
        };
        let cost = path_cost(&self.graph, world, agent).map_err(SessionError::Path)?;
        let cells: Vec<Cell> = ids.iter().map(|id| *self.graph[*id].payload()).collect();

        let settled = matches!(termination, TerminationReasonV1::AgentReached { .. });
        Ok(if cost >= world.blocked_cost() {
            RouteV1::Blocked { cells, cost }
        } else if settled {
            RouteV1::Reached { cells, cost }
        } else {
            RouteV1::Retained { cells, cost }
        })
    }
}
