//! D* kernel: the deterministic primitives shared by the planner crates.
//!
//! # API Surface
//!
//! - [`order::Key`] -- the lexicographic `(primary, secondary)` comparison used
//!   for open-list order, tie-breaking and the agent bound check
//! - [`proof::canon::canonical_json_bytes`] -- the single canonical JSON writer
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256 content hashes
//!
//! # Module Dependency Direction
//!
//! `order` and `proof` are independent. Neither imports the other.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod order;
pub mod proof;
