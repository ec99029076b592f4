//! Planner policy types.

use crate::error::PlannerError;

/// Budget and contract limits for one planning call.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerPolicyV1 {
    /// Hard cap on expansions per call. The call stops once the count
    /// exceeds this value at the end of an iteration.
    pub max_expansions: u64,
    /// Largest neighbor list a world may return for one node.
    pub max_neighbors: usize,
    /// Stand-in for an unknown agent bound; also the cost at which a route
    /// counts as blocked.
    pub bound_sentinel: f64,
    /// What happens to the open list when the budget runs out.
    pub on_budget_exhausted: BudgetExhaustionV1,
}

impl PlannerPolicyV1 {
    /// Check limits before any node is touched.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::InvalidPolicy`] when a limit is zero or the
    /// sentinel is not a positive finite number.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.max_expansions == 0 {
            return Err(PlannerError::InvalidPolicy {
                detail: "max_expansions must be at least 1".into(),
            });
        }
        if self.max_neighbors == 0 {
            return Err(PlannerError::InvalidPolicy {
                detail: "max_neighbors must be at least 1".into(),
            });
        }
        if !self.bound_sentinel.is_finite() || self.bound_sentinel <= 0.0 {
            return Err(PlannerError::InvalidPolicy {
                detail: format!(
                    "bound_sentinel must be positive and finite, got {}",
                    self.bound_sentinel
                ),
            });
        }
        Ok(())
    }
}

impl Default for PlannerPolicyV1 {
    fn default() -> Self {
        Self {
            max_expansions: 30_000,
            max_neighbors: 25,
            bound_sentinel: 1e7,
            on_budget_exhausted: BudgetExhaustionV1::DiscardFrontier,
        }
    }
}

/// Frontier handling after an expansion budget overrun.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetExhaustionV1 {
    /// Close every open node and hand back an empty continuation.
    /// The next call starts from its seeds alone. Default.
    DiscardFrontier,
    /// Hand the open list back so the next call resumes where this one
    /// stopped.
    RetainFrontier,
}

impl BudgetExhaustionV1 {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DiscardFrontier => "discard_frontier",
            Self::RetainFrontier => "retain_frontier",
        }
    }
}
