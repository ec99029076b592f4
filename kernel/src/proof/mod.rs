//! Proof module: canonical JSON and content hashing for audit artifacts.

pub mod canon;
pub mod hash;
pub mod hash_domain;
