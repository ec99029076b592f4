//! Lexicographic pair ordering.
//!
//! Every priority decision in the planner goes through [`Key`]: open-list
//! position `(f, k)`, the neighbor admission test `(f, g)` against the popped
//! `(f, k)`, and the agent bound check. Keeping one implementation means the
//! strict and inclusive variants cannot drift apart between call sites.

/// A `(primary, secondary)` pair compared lexicographically.
///
/// Comparisons use the raw IEEE-754 operators. A NaN component makes every
/// comparison false; callers validate costs before they reach a key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub primary: f64,
    pub secondary: f64,
}

impl Key {
    #[must_use]
    pub const fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }

    /// Strict lexicographic order (`LESS`).
    ///
    /// `a1 < b1`, or `a1 == b1` and `a2 < b2`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn less_than(self, other: Self) -> bool {
        self.primary < other.primary
            || (self.primary == other.primary && self.secondary < other.secondary)
    }

    /// Inclusive lexicographic order (`LESSEQ`).
    ///
    /// `a1 < b1`, or `a1 == b1` and `a2 <= b2`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn at_most(self, other: Self) -> bool {
        self.primary < other.primary
            || (self.primary == other.primary && self.secondary <= other.secondary)
    }
}

impl From<(f64, f64)> for Key {
    fn from((primary, secondary): (f64, f64)) -> Self {
        Self { primary, secondary }
    }
}
