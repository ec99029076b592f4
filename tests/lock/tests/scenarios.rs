//! Acceptance scenarios on small grids: open field, forced detour and an
//! enclosed agent.

use dstar_harness::contract::{Cell, SpatialWorldV1};
use dstar_harness::worlds::grid::{GridWorld, ObstacleMode};
use dstar_search::continuation::Continuation;
use dstar_search::node::Graph;
use dstar_search::path::{path_cost, reconstruct_path};
use dstar_search::policy::PlannerPolicyV1;
use dstar_search::search::{search, RobotBound, SearchOutcome};
use dstar_search::trace::TerminationReasonV1;
use lock_tests::logging::init_test_logging;
use lock_tests::scenarios::{diagonal_wall, enclosed, open_field, DETOUR_COST, OPEN_FIELD_COST};

fn cold_start(world: &GridWorld) -> (Graph<Cell>, SearchOutcome, RobotBound) {
    init_test_logging();
    let policy = PlannerPolicyV1::default();
    let mut graph = world.build_graph().unwrap();
    let goal = world.node_at(world.goal()).unwrap();
    graph.set_root(goal).unwrap();
    let mut bound = RobotBound::unknown(policy.bound_sentinel);
    let outcome = search(
        &mut graph,
        &[goal],
        world,
        &policy,
        Continuation::empty(),
        &mut bound,
    )
    .unwrap();
    (graph, outcome, bound)
}

#[test]
fn open_field_takes_four_diagonals() {
    let world = open_field().unwrap();
    let (graph, outcome, bound) = cold_start(&world);

    assert!(outcome.is_agent_reached());
    let agent = world.node_at(world.agent()).unwrap();
    let head = outcome.path_head.unwrap();
    assert_eq!(graph[agent].parent(), Some(head));

    let cost = path_cost(&graph, &world, agent).unwrap();
    assert!((cost - OPEN_FIELD_COST).abs() < 1e-9, "cost {cost}");
    assert_eq!(reconstruct_path(&graph, agent).unwrap().len(), 5);

    assert!((bound.g - OPEN_FIELD_COST).abs() < 1e-9);
    assert!(!bound.is_sentinel(PlannerPolicyV1::default().bound_sentinel));
}

#[test]
fn diagonal_wall_forces_a_finite_detour() {
    let world = diagonal_wall().unwrap();
    let (graph, outcome, _) = cold_start(&world);

    assert!(outcome.is_agent_reached());
    let agent = world.node_at(world.agent()).unwrap();
    let cost = path_cost(&graph, &world, agent).unwrap();
    assert!(cost > OPEN_FIELD_COST);
    assert!(cost < world.penalty());
    assert!((cost - DETOUR_COST).abs() < 1e-9, "cost {cost}");

    for id in reconstruct_path(&graph, agent).unwrap() {
        assert!(!world.in_obstacle(*graph[id].payload()));
    }
}

#[test]
fn enclosed_agent_behind_penalty_ring_pays_the_penalty_once() {
    let world = enclosed(ObstacleMode::Penalty).unwrap();
    let (graph, outcome, bound) = cold_start(&world);

    // Only the agent's own step lands in the ring, so the agent is the first
    // node popped past the sentinel and it is settled there.
    assert!(outcome.is_agent_reached(), "got {:?}", outcome.termination);
    let agent = world.node_at(world.agent()).unwrap();
    let cost = path_cost(&graph, &world, agent).unwrap();
    assert!(cost >= world.penalty(), "cost {cost}");
    assert!(cost < 2.0 * world.penalty(), "cost {cost}");
    assert!((bound.g - graph[agent].g()).abs() < 1e-6);
    assert!(!bound.is_sentinel(PlannerPolicyV1::default().bound_sentinel));

    let path = reconstruct_path(&graph, agent).unwrap();
    let cells: Vec<Cell> = path.iter().map(|id| *graph[*id].payload()).collect();
    assert_eq!(cells.first(), Some(&world.agent()));
    assert_eq!(cells.last(), Some(&world.goal()));
    assert!(world.in_obstacle(cells[1]), "first step must enter the ring");
    assert!(
        cells[2..].iter().all(|c| !world.in_obstacle(*c)),
        "route re-enters an obstacle: {cells:?}"
    );
}

#[test]
fn enclosed_agent_behind_impassable_ring_exhausts_the_list() {
    let world = enclosed(ObstacleMode::Impassable).unwrap();
    let (_, outcome, bound) = cold_start(&world);

    assert_eq!(outcome.termination, TerminationReasonV1::OpenExhausted);
    assert_eq!(outcome.path_head, None);
    assert!(outcome.continuation.is_empty());
    assert!(bound.is_sentinel(PlannerPolicyV1::default().bound_sentinel));
}

#[test]
fn agent_on_the_goal_is_reached_with_no_head() {
    let world = GridWorld::new(3, 3, Cell::new(1, 1), Cell::new(1, 1)).unwrap();
    let (_, outcome, bound) = cold_start(&world);
    assert!(outcome.is_agent_reached());
    assert_eq!(outcome.path_head, None);
    assert!(bound.g.abs() < f64::EPSILON);
}
