//! A settled route's summed edge costs equal the `g` of its first node.

use dstar_harness::contract::{Cell, Rect, SpatialWorldV1};
use dstar_harness::session::ReplanSession;
use dstar_harness::worlds::grid::GridWorld;
use dstar_search::path::{path_cost, reconstruct_path};
use dstar_search::policy::PlannerPolicyV1;
use dstar_search::trace::TerminationReasonV1;
use lock_tests::logging::init_test_logging;
use lock_tests::scenarios::{diagonal_wall, long_corridor, open_field};

fn assert_consistent(world: &GridWorld, session: &ReplanSession) {
    let graph = session.graph();
    let agent = world.node_at(world.agent()).unwrap();
    let chain = reconstruct_path(graph, agent).unwrap();
    for &id in &chain {
        let cost = path_cost(graph, world, id).unwrap();
        let g = graph[id].g();
        assert!(
            (cost - g).abs() < 1e-9 * g.max(1.0),
            "node {} g {g} vs summed {cost}",
            graph[id].payload()
        );
    }
}

#[test]
fn cold_start_chains_are_consistent() {
    init_test_logging();
    let worlds = [
        open_field().unwrap(),
        diagonal_wall().unwrap(),
        long_corridor().unwrap(),
        GridWorld::reference_field(),
        GridWorld::new(30, 12, Cell::new(2, 2), Cell::new(27, 9))
            .unwrap()
            .with_obstacle(Rect::from_tlbr(11, 10, 3, 12))
            .with_obstacle(Rect::from_tlbr(8, 18, 0, 19)),
    ];
    for world in &worlds {
        let mut session = ReplanSession::new(world, PlannerPolicyV1::default()).unwrap();
        let run = session.cold_start(world).unwrap();
        assert!(
            matches!(run.termination, TerminationReasonV1::AgentReached { .. }),
            "{} did not settle the agent",
            session.world_id()
        );
        assert_consistent(world, &session);
    }
}

#[test]
fn settled_replans_are_consistent() {
    init_test_logging();
    let mut world = long_corridor().unwrap();
    let mut session = ReplanSession::new(&world, PlannerPolicyV1::default()).unwrap();
    session.cold_start(&world).unwrap();

    let wall = Rect::from_tlbr(26, 20, 14, 21);
    world.add_obstacle(wall);
    let run = session.replan(&world, wall).unwrap();
    if matches!(run.termination, TerminationReasonV1::AgentReached { .. }) {
        assert_consistent(&world, &session);
    }
}
