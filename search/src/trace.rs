//! `PlannerTraceV1`: expansion audit log of one planning call.
//!
//! The normative decision surface is the ordered list of [`ExpandEventV1`]
//! entries. Two calls with identical inputs produce byte-identical canonical
//! JSON, and therefore identical digests.

use dstar_kernel::order::Key;
use dstar_kernel::proof::canon::{canonical_json_bytes, CanonError};
use dstar_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};

use crate::contract::ContractViolationV1;
use crate::node::NodeId;

/// The complete audit trail of one call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerTraceV1 {
    /// Pops in the order they happened.
    pub expansions: Vec<ExpandEventV1>,
    pub metadata: TraceMetadataV1,
}

/// One pop from the open list and everything it changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandEventV1 {
    /// Zero-based position of this pop within the call.
    pub expansion_order: u64,
    pub node: NodeId,
    /// `(f, k)` at the moment of the pop.
    pub pop_key: Key,
    pub regime: RegimeV1,
    /// `g` once the expansion finished (the improvement pass may lower it).
    pub g_after: f64,
    pub parent_after: Option<NodeId>,
    pub updates: Vec<UpdateV1>,
}

/// Whether the popped node's cost was settled when it came off the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeV1 {
    /// `k == g`: the cost is final, improvements flow outward.
    Lower,
    /// `k < g`: a cost increase is propagating.
    Raise,
}

impl RegimeV1 {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lower => "lower",
            Self::Raise => "raise",
        }
    }
}

/// A single bookkeeping change made while expanding a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateV1 {
    /// `neighbor` now points at the expanded node and was queued with `g`.
    Rewired { neighbor: NodeId, g: f64 },
    /// The expanded node was queued again because `neighbor` could use it
    /// once its own cost settles.
    HoldCurrent { neighbor: NodeId },
    /// A closed `neighbor` was reopened at its current `g` so it can
    /// propagate a cheaper route back to the expanded node.
    ReopenNeighbor { neighbor: NodeId, g: f64 },
    /// The expanded node adopted `via` as its parent at cost `g` before
    /// propagating.
    ImprovedCurrent { via: NodeId, g: f64 },
}

/// Why a planning call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReasonV1 {
    /// The agent's node was popped with a settled cost. The route starts at
    /// `node`.
    AgentReached { node: NodeId },
    /// The popped key passed the agent bound: nothing left on the list can
    /// improve the agent's route.
    BoundExceeded { node: NodeId },
    /// The open list ran dry.
    OpenExhausted,
    /// The expansion budget ran out. `frontier_retained` records whether the
    /// open list was handed back in the continuation.
    ExpansionBudgetExceeded {
        expansions: u64,
        frontier_retained: bool,
    },
    /// A world callback broke its contract. The frontier was discarded.
    WorldContractViolation(ContractViolationV1),
}

impl TerminationReasonV1 {
    /// Stable snake-case tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AgentReached { .. } => "agent_reached",
            Self::BoundExceeded { .. } => "bound_exceeded",
            Self::OpenExhausted => "open_exhausted",
            Self::ExpansionBudgetExceeded { .. } => "expansion_budget_exceeded",
            Self::WorldContractViolation(_) => "world_contract_violation",
        }
    }
}

/// Aggregate metadata for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceMetadataV1 {
    pub world_id: String,
    pub seed_count: u64,
    /// Nodes merged from the incoming continuation.
    pub retained_in: u64,
    /// Nodes handed back in the outgoing continuation.
    pub retained_out: u64,
    pub total_expansions: u64,
    pub frontier_high_water: u64,
    pub bound_before: Key,
    pub bound_after: Key,
    pub termination: TerminationReasonV1,
}

// ---------------------------------------------------------------------------
// Canonical JSON serialization
// ---------------------------------------------------------------------------

impl PlannerTraceV1 {
    /// Serialize the trace to canonical JSON bytes.
    ///
    /// Float fields are written as their `f64::to_bits` pattern under a
    /// `*_bits` key.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Domain-separated SHA-256 of the canonical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        let bytes = self.to_canonical_json_bytes()?;
        Ok(canonical_hash(HashDomain::PlannerTrace, &bytes))
    }

    fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "expansions": self.expansions.iter().map(expand_event_to_json).collect::<Vec<_>>(),
            "metadata": metadata_to_json(&self.metadata),
        })
    }
}

fn key_to_json(key: Key) -> serde_json::Value {
    serde_json::json!({
        "primary_bits": key.primary.to_bits(),
        "secondary_bits": key.secondary.to_bits(),
    })
}

fn expand_event_to_json(e: &ExpandEventV1) -> serde_json::Value {
    serde_json::json!({
        "expansion_order": e.expansion_order,
        "g_after_bits": e.g_after.to_bits(),
        "node": e.node.raw(),
        "parent_after": e.parent_after.map(NodeId::raw),
        "pop_key": key_to_json(e.pop_key),
        "regime": e.regime.as_str(),
        "updates": e.updates.iter().map(update_to_json).collect::<Vec<_>>(),
    })
}

fn update_to_json(u: &UpdateV1) -> serde_json::Value {
    match u {
        UpdateV1::Rewired { neighbor, g } => {
            serde_json::json!({"g_bits": g.to_bits(), "neighbor": neighbor.raw(), "type": "rewired"})
        }
        UpdateV1::HoldCurrent { neighbor } => {
            serde_json::json!({"neighbor": neighbor.raw(), "type": "hold_current"})
        }
        UpdateV1::ReopenNeighbor { neighbor, g } => {
            serde_json::json!({"g_bits": g.to_bits(), "neighbor": neighbor.raw(), "type": "reopen_neighbor"})
        }
        UpdateV1::ImprovedCurrent { via, g } => {
            serde_json::json!({"g_bits": g.to_bits(), "type": "improved_current", "via": via.raw()})
        }
    }
}

fn metadata_to_json(m: &TraceMetadataV1) -> serde_json::Value {
    serde_json::json!({
        "bound_after": key_to_json(m.bound_after),
        "bound_before": key_to_json(m.bound_before),
        "frontier_high_water": m.frontier_high_water,
        "retained_in": m.retained_in,
        "retained_out": m.retained_out,
        "seed_count": m.seed_count,
        "termination": termination_to_json(&m.termination),
        "total_expansions": m.total_expansions,
        "world_id": m.world_id,
    })
}

/// JSON form of a termination reason, shared by traces and run reports.
#[must_use]
pub fn termination_to_json(r: &TerminationReasonV1) -> serde_json::Value {
    match r {
        TerminationReasonV1::AgentReached { node } | TerminationReasonV1::BoundExceeded { node } => {
            serde_json::json!({"node": node.raw(), "type": r.as_str()})
        }
        TerminationReasonV1::OpenExhausted => serde_json::json!({"type": r.as_str()}),
        TerminationReasonV1::ExpansionBudgetExceeded {
            expansions,
            frontier_retained,
        } => serde_json::json!({
            "expansions": expansions,
            "frontier_retained": frontier_retained,
            "type": r.as_str(),
        }),
        TerminationReasonV1::WorldContractViolation(v) => serde_json::json!({
            "type": r.as_str(),
            "violation": violation_to_json(v),
        }),
    }
}

fn violation_to_json(v: &ContractViolationV1) -> serde_json::Value {
    match v {
        ContractViolationV1::TooManyNeighbors { node, count, limit } => serde_json::json!({
            "count": count,
            "kind": v.kind(),
            "limit": limit,
            "node": node.raw(),
        }),
        ContractViolationV1::UnknownNeighbor { node, neighbor } => serde_json::json!({
            "kind": v.kind(),
            "neighbor": neighbor.raw(),
            "node": node.raw(),
        }),
        ContractViolationV1::InvalidCost {
            from,
            to,
            value_bits,
        } => serde_json::json!({
            "from": from.raw(),
            "kind": v.kind(),
            "to": to.raw(),
            "value_bits": value_bits,
        }),
        ContractViolationV1::InvalidHeuristic { node, value_bits } => serde_json::json!({
            "kind": v.kind(),
            "node": node.raw(),
            "value_bits": value_bits,
        }),
    }
}
