//! Runs the reference replanning scenario and prints deterministic
//! `key=value` lines for cross-process comparison.
//!
//! Usage: `reference_demo [--render]`
//!
//! Cold start on the 60×20 reference field, then a third obstacle appears
//! while the agent moves to (12, 15) and the plan is repaired
//! incrementally. With `--render` the map after each run follows the
//! summary lines.

use std::error::Error;

use dstar_harness::contract::SpatialWorldV1;
use dstar_harness::report::SessionReportV1;
use dstar_harness::session::{ReplanSession, RunRecordV1};
use dstar_harness::worlds::grid::{GridWorld, REFERENCE_REPLAN_AGENT, REFERENCE_REPLAN_OBSTACLE};
use dstar_search::policy::PlannerPolicyV1;
use lock_tests::logging::init_stderr_logging;

fn print_run(label: &str, run: &RunRecordV1) {
    println!("{label}.termination={}", run.termination.as_str());
    println!("{label}.expansions={}", run.expansions);
    println!("{label}.seeds={}", run.seeds);
    println!("{label}.route={}", run.route.as_str());
    println!("{label}.route_len={}", run.route.cells().len());
    match run.route.cost() {
        Some(cost) => println!("{label}.cost_bits={}", cost.to_bits()),
        None => println!("{label}.cost_bits=none"),
    }
    println!("{label}.trace_digest={}", run.trace_digest);
}

fn run() -> Result<(), Box<dyn Error>> {
    init_stderr_logging();
    let render = std::env::args().any(|a| a == "--render");

    let mut world = GridWorld::reference_field();
    let mut session = ReplanSession::new(&world, PlannerPolicyV1::default())?;
    let mut maps = Vec::new();

    println!("world_id={}", session.world_id());

    let cold = session.cold_start(&world)?;
    print_run("cold", cold);
    maps.push(world.render(cold.route.cells()));

    world.add_obstacle(REFERENCE_REPLAN_OBSTACLE);
    world.move_agent(REFERENCE_REPLAN_AGENT)?;
    let replan = session.replan(&world, REFERENCE_REPLAN_OBSTACLE)?;
    print_run("replan", replan);
    maps.push(world.render(replan.route.cells()));

    println!("agent={}", world.agent());
    println!(
        "lifetime_expansions={}",
        session.continuation().lifetime_expansions()
    );
    let report = SessionReportV1::from_session(&session);
    println!("report_digest={}", report.digest()?);

    if render {
        for map in maps {
            println!();
            print!("{map}");
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("reference_demo: {e}");
        std::process::exit(1);
    }
}
