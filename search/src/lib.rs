//! D* Search: Focused D* incremental planning over a caller-owned node arena.
//!
//! This crate provides the planning engine. It depends only on
//! `dstar_kernel`; it does NOT depend on `dstar_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! dstar_kernel  ←  dstar_search  ←  dstar_harness
//! (keys, proof)    (open list,       (grid world,
//!                   engine)           sessions, reports)
//! ```
//!
//! # Key types
//!
//! - [`Graph`] / [`Node`] -- fixed arena of nodes with search bookkeeping
//! - [`OpenList`] -- `(f, k)`-ordered frontier threaded through the arena
//! - [`PlanningWorldV1`] -- caller-supplied neighbors, costs, heuristic, predicates
//! - [`PlannerPolicyV1`] -- expansion budget and contract limits
//! - [`Continuation`] -- retained frontier handed from one call to the next
//! - [`PlannerTraceV1`] -- expansion audit log of one call
//!
//! [`Graph`]: node::Graph
//! [`Node`]: node::Node
//! [`OpenList`]: open_list::OpenList
//! [`PlanningWorldV1`]: contract::PlanningWorldV1
//! [`PlannerPolicyV1`]: policy::PlannerPolicyV1
//! [`Continuation`]: continuation::Continuation
//! [`PlannerTraceV1`]: trace::PlannerTraceV1

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod continuation;
pub mod contract;
pub mod error;
pub mod node;
pub mod open_list;
pub mod path;
pub mod policy;
pub mod search;
pub mod trace;
