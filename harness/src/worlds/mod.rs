//! World implementations for replanning sessions.

pub mod grid;
