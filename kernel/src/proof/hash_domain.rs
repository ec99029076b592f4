//! Typed domain separators for canonical hashing.
//!
//! Every digest selects a [`HashDomain`]. This module is the single authority
//! for domain-separator byte strings.

/// Typed domain separator for [`super::hash::canonical_hash`].
///
/// Each variant maps to a unique, null-terminated byte string used as a
/// SHA-256 prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashDomain {
    /// Canonical JSON of one `PlannerTraceV1`.
    PlannerTrace,
    /// Canonical JSON of a harness session report.
    SessionReport,
    /// Benchmark determinism guard.
    BenchGuard,
}

impl HashDomain {
    /// All domain variants in declaration order.
    pub const ALL: &'static [HashDomain] = &[
        HashDomain::PlannerTrace,
        HashDomain::SessionReport,
        HashDomain::BenchGuard,
    ];

    /// The raw domain-separator bytes (null-terminated).
    #[must_use]
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::PlannerTrace => b"DSTAR::PLANNER_TRACE::V1\0",
            Self::SessionReport => b"DSTAR::SESSION_REPORT::V1\0",
            Self::BenchGuard => b"DSTAR::BENCH_GUARD::V1\0",
        }
    }
}

impl std::fmt::Display for HashDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PlannerTrace => "PlannerTrace",
            Self::SessionReport => "SessionReport",
            Self::BenchGuard => "BenchGuard",
        };
        f.write_str(name)
    }
}
