//! Shared helpers for the D* benchmark suites.
//!
//! A [`Regime`] is a grid plus one local change. Benches time a cold start
//! on the grid, and a replan after the change against a cold start on the
//! changed grid.

use dstar_harness::contract::{Cell, Rect};
use dstar_harness::session::{ReplanSession, RunRecordV1, SessionError};
use dstar_harness::worlds::grid::{
    GridError, GridWorld, REFERENCE_REPLAN_AGENT, REFERENCE_REPLAN_OBSTACLE,
};
use dstar_kernel::proof::canon::{canonical_json_bytes, CanonError};
use dstar_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use dstar_search::policy::PlannerPolicyV1;

/// A new obstacle, optionally with the agent moving at the same time.
#[derive(Debug, Clone, Copy)]
pub struct Change {
    pub rect: Rect,
    pub agent: Option<Cell>,
}

impl Change {
    /// # Errors
    ///
    /// [`GridError::OffGrid`] if the new agent cell is outside the grid.
    pub fn apply(&self, world: &mut GridWorld) -> Result<(), GridError> {
        world.add_obstacle(self.rect);
        if let Some(cell) = self.agent {
            world.move_agent(cell)?;
        }
        Ok(())
    }
}

pub struct Regime {
    pub name: &'static str,
    pub world: GridWorld,
    pub change: Change,
}

impl Regime {
    /// The world after [`Self::change`].
    ///
    /// # Errors
    ///
    /// As [`Change::apply`].
    pub fn changed_world(&self) -> Result<GridWorld, GridError> {
        let mut world = self.world.clone();
        self.change.apply(&mut world)?;
        Ok(world)
    }
}

/// 100×100 open field, wall dropped across the straight route.
///
/// # Errors
///
/// Never in practice; the layout is fixed.
pub fn regime_open_field() -> Result<Regime, GridError> {
    Ok(Regime {
        name: "open_field",
        world: GridWorld::new(100, 100, Cell::new(90, 50), Cell::new(10, 50))?,
        change: Change {
            rect: Rect::from_tlbr(60, 50, 40, 51),
            agent: None,
        },
    })
}

/// The 60×20 reference field and its standard replanning step.
#[must_use]
pub fn regime_reference() -> Regime {
    Regime {
        name: "reference",
        world: GridWorld::reference_field(),
        change: Change {
            rect: REFERENCE_REPLAN_OBSTACLE,
            agent: Some(REFERENCE_REPLAN_AGENT),
        },
    }
}

/// 80×30 with three staggered walls; a block lands between the first two.
///
/// # Errors
///
/// Never in practice; the layout is fixed.
pub fn regime_slalom() -> Result<Regime, GridError> {
    let world = GridWorld::new(80, 30, Cell::new(75, 15), Cell::new(5, 15))?
        .with_obstacle(Rect::from_tlbr(22, 15, 0, 15))
        .with_obstacle(Rect::from_tlbr(29, 35, 7, 35))
        .with_obstacle(Rect::from_tlbr(22, 55, 0, 55));
    Ok(Regime {
        name: "slalom",
        world,
        change: Change {
            rect: Rect::from_tlbr(18, 23, 12, 27),
            agent: None,
        },
    })
}

/// Every regime, in a fixed order.
///
/// # Errors
///
/// Never in practice; the layouts are fixed.
pub fn all_regimes() -> Result<Vec<Regime>, GridError> {
    Ok(vec![regime_open_field()?, regime_reference(), regime_slalom()?])
}

/// A session that has already planned from scratch on `world`.
///
/// # Errors
///
/// Whatever the session reports.
pub fn cold_session(
    world: &GridWorld,
    policy: &PlannerPolicyV1,
) -> Result<ReplanSession, SessionError> {
    let mut session = ReplanSession::new(world, policy.clone())?;
    session.cold_start(world)?;
    Ok(session)
}

/// Cold-planned session on the unchanged world, paired with the changed
/// world it should replan against.
pub struct ReplanFixture {
    pub session: ReplanSession,
    pub world: GridWorld,
    pub rect: Rect,
}

impl ReplanFixture {
    /// # Errors
    ///
    /// Whatever the session reports, or [`GridError`] wrapped as a boxed error.
    pub fn prepare(
        regime: &Regime,
        policy: &PlannerPolicyV1,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let session = cold_session(&regime.world, policy)?;
        let world = regime.changed_world()?;
        Ok(Self {
            session,
            world,
            rect: regime.change.rect,
        })
    }

    /// # Errors
    ///
    /// Whatever the session reports.
    pub fn replan(mut self) -> Result<RunRecordV1, SessionError> {
        self.session.replan(&self.world, self.rect).cloned()
    }
}

/// Digest over the work a bench measured: expansions, termination and
/// route per run. Two machines timing the same work produce the same guard.
///
/// # Errors
///
/// Returns [`CanonError`] if serialization fails.
pub fn guard_digest(runs: &[(&str, &RunRecordV1)]) -> Result<ContentHash, CanonError> {
    let entries: Vec<serde_json::Value> = runs
        .iter()
        .map(|(name, run)| {
            serde_json::json!({
                "cost_bits": run.route.cost().map(f64::to_bits),
                "expansions": run.expansions,
                "name": name,
                "route": run.route.as_str(),
                "termination": run.termination.as_str(),
            })
        })
        .collect();
    let bytes = canonical_json_bytes(&serde_json::Value::Array(entries))?;
    Ok(canonical_hash(HashDomain::BenchGuard, &bytes))
}
