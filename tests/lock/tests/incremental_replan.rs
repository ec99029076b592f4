//! Incremental replanning: work stays local to the change, and repaired
//! routes match a plan computed from scratch on the changed world.

use dstar_harness::contract::{Rect, SpatialWorldV1};
use dstar_harness::session::{ReplanSession, RunRecordV1};
use dstar_harness::worlds::grid::{GridWorld, REFERENCE_REPLAN_AGENT, REFERENCE_REPLAN_OBSTACLE};
use dstar_search::continuation::Continuation;
use dstar_search::path::path_cost;
use dstar_search::policy::{BudgetExhaustionV1, PlannerPolicyV1};
use dstar_search::search::{search, RobotBound};
use dstar_search::trace::TerminationReasonV1;
use lock_tests::logging::init_test_logging;
use lock_tests::scenarios::long_corridor;

fn fresh_plan(world: &GridWorld) -> RunRecordV1 {
    let mut session = ReplanSession::new(world, PlannerPolicyV1::default()).unwrap();
    session.cold_start(world).unwrap().clone()
}

#[test]
fn unchanged_costs_replan_stays_local() {
    init_test_logging();
    let world = long_corridor().unwrap();
    let mut session = ReplanSession::new(&world, PlannerPolicyV1::default()).unwrap();
    let cold = session.cold_start(&world).unwrap().clone();

    let ring = Rect::from_tlbr(23, 19, 21, 21);
    let warm = session.replan(&world, ring).unwrap().clone();

    assert!(warm.expansions <= ring.perimeter().len() as u64);
    assert!(warm.expansions < cold.expansions);
    assert!(warm.route.is_usable());
    assert_eq!(warm.route.cells(), cold.route.cells());
}

#[test]
fn wall_across_the_route_is_repaired_optimally() {
    init_test_logging();
    let mut world = long_corridor().unwrap();
    let mut session = ReplanSession::new(&world, PlannerPolicyV1::default()).unwrap();
    let cold = session.cold_start(&world).unwrap().clone();

    let wall = Rect::from_tlbr(26, 20, 14, 21);
    world.add_obstacle(wall);
    let warm = session.replan(&world, wall).unwrap().clone();
    let fresh = fresh_plan(&world);

    assert!(warm.seeds > 0);
    assert!(warm.route.is_usable(), "route was {}", warm.route.as_str());
    assert!(warm.route.cells().iter().all(|c| !wall.contains(*c)));
    let (a, b) = (warm.route.cost().unwrap(), fresh.route.cost().unwrap());
    assert!((a - b).abs() < 1e-6, "incremental {a} vs fresh {b}");
    assert!(a > cold.route.cost().unwrap());
}

#[test]
fn reference_replan_matches_a_fresh_plan() {
    init_test_logging();
    let mut world = GridWorld::reference_field();
    let mut session = ReplanSession::new(&world, PlannerPolicyV1::default()).unwrap();
    session.cold_start(&world).unwrap();

    world.add_obstacle(REFERENCE_REPLAN_OBSTACLE);
    world.move_agent(REFERENCE_REPLAN_AGENT).unwrap();
    let warm = session.replan(&world, REFERENCE_REPLAN_OBSTACLE).unwrap().clone();
    let fresh = fresh_plan(&world);

    assert!(warm.route.is_usable(), "route was {}", warm.route.as_str());
    assert!(warm.route.cells().iter().all(|c| !world.in_obstacle(*c)));
    let (a, b) = (warm.route.cost().unwrap(), fresh.route.cost().unwrap());
    assert!(a < world.penalty());
    assert!((a - b).abs() < 1e-6, "incremental {a} vs fresh {b}");
}

#[test]
fn retained_frontier_resumes_across_budget_overruns() {
    init_test_logging();
    let world = long_corridor().unwrap();
    let policy = PlannerPolicyV1 {
        max_expansions: 4,
        on_budget_exhausted: BudgetExhaustionV1::RetainFrontier,
        ..PlannerPolicyV1::default()
    };
    let mut graph = world.build_graph().unwrap();
    let goal = world.node_at(world.goal()).unwrap();
    let agent = world.node_at(world.agent()).unwrap();
    graph.set_root(goal).unwrap();
    let mut bound = RobotBound::unknown(policy.bound_sentinel);

    let mut continuation = Continuation::empty();
    let mut seeds = vec![goal];
    let mut calls = 0;
    let mut total = 0;
    let reached = loop {
        calls += 1;
        assert!(calls < 100, "planning never settled");
        let outcome = search(&mut graph, &seeds, &world, &policy, continuation, &mut bound).unwrap();
        total += outcome.expansions;
        continuation = outcome.continuation;
        seeds.clear();
        match outcome.termination {
            TerminationReasonV1::ExpansionBudgetExceeded {
                expansions,
                frontier_retained,
            } => {
                assert!(frontier_retained);
                assert_eq!(expansions, policy.max_expansions + 1);
                assert!(!continuation.is_empty());
            }
            other => break other,
        }
    };

    assert!(matches!(reached, TerminationReasonV1::AgentReached { .. }));
    assert!(calls > 1);
    assert_eq!(continuation.lifetime_expansions(), total);
    let cost = path_cost(&graph, &world, agent).unwrap();
    assert!((cost - 30.0).abs() < 1e-9, "cost {cost}");
}
