//! D* harness: worlds and sessions that drive the planner.
//!
//! The harness supplies a concrete spatial world (an 8-connected grid),
//! runs it through cold-start and incremental planning calls, and writes
//! run reports to disk.
//!
//! The harness does NOT implement search logic; it delegates to
//! `dstar_search`. Worlds provide geometry and costs only; sessions own the
//! graph and the state carried between calls.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod report;
pub mod session;
pub mod worlds;
