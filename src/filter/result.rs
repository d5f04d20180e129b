//! Per-element filter verdicts and their combination algebra.
//!
//! A verdict is either explicit, decided by the filter for this element, or
//! inherited, carried over from an ancestor or a default. When verdicts of
//! several filters are combined:
//!
//! - an inherited `Undecided` match is the "no opinion" default and yields
//!   to any other operand;
//! - if both operands agree on the match, the result is explicit as soon
//!   as one of them is;
//! - otherwise the operand whose match value won decides the flag.
//!
//! Descend decisions always favor `True` over `Undecided` over `False`.

use super::ternary::Ternary;

/// Combine two (match, inherited) verdicts with the given ternary operator
fn combine_match(
    (a, a_inherited): (Ternary, bool),
    (b, b_inherited): (Ternary, bool),
    op: fn(Ternary, Ternary) -> Ternary,
) -> (Ternary, bool) {
    let a_neutral = a_inherited && a.is_undecided();
    let b_neutral = b_inherited && b.is_undecided();
    if a_neutral && !b_neutral {
        return (b, b_inherited);
    }
    if b_neutral && !a_neutral {
        return (a, a_inherited);
    }

    let matches = op(a, b);
    let inherited = if a == b {
        a_inherited && b_inherited
    } else if matches == a {
        a_inherited
    } else {
        b_inherited
    };
    (matches, inherited)
}

// ============================================================================
// Start result
// ============================================================================

/// Verdict of a filter when an element is entered, before its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterStartResult {
    /// Whether the element itself passes the filter
    pub matches: Ternary,
    /// Whether the children should be visited
    pub descend: Ternary,
    /// Whether the verdict was taken over from an ancestor or a default
    pub inherited: bool,
}

impl FilterStartResult {
    /// Explicit verdict
    #[must_use]
    pub const fn direct(matches: Ternary, descend: Ternary) -> Self {
        Self {
            matches,
            descend,
            inherited: false,
        }
    }

    /// Verdict taken over from a parent
    #[must_use]
    pub const fn inherit(parent: Self) -> Self {
        Self {
            inherited: true,
            ..parent
        }
    }

    /// No opinion: undecided match, undecided descend, inherited
    #[must_use]
    pub const fn default_result() -> Self {
        Self {
            matches: Ternary::Undecided,
            descend: Ternary::Undecided,
            inherited: true,
        }
    }

    #[must_use]
    pub const fn match_and_descend() -> Self {
        Self::direct(Ternary::True, Ternary::True)
    }

    #[must_use]
    pub const fn doesnt_match() -> Self {
        Self::direct(Ternary::False, Ternary::False)
    }

    #[must_use]
    pub const fn doesnt_match_and_descend() -> Self {
        Self::direct(Ternary::False, Ternary::True)
    }

    /// Start result carrying the match of a finish result
    #[must_use]
    pub const fn from_finish(finish: FilterFinishResult, descend: Ternary) -> Self {
        Self {
            matches: finish.matches,
            descend,
            inherited: finish.inherited,
        }
    }

    #[must_use]
    pub const fn with_match(self, matches: Ternary) -> Self {
        Self { matches, ..self }
    }

    #[must_use]
    pub const fn with_descend(self, descend: Ternary) -> Self {
        Self { descend, ..self }
    }

    #[must_use]
    pub const fn with_inherited(self, inherited: bool) -> Self {
        Self { inherited, ..self }
    }

    #[must_use]
    pub const fn negate_match(self) -> Self {
        self.with_match(self.matches.negate())
    }

    /// Conjunction of the matches; descend favors descending
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.combine(other, Ternary::and)
    }

    /// Disjunction of the matches; descend favors descending
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.combine(other, Ternary::or)
    }

    fn combine(self, other: Self, op: fn(Ternary, Ternary) -> Ternary) -> Self {
        let (matches, inherited) = combine_match(
            (self.matches, self.inherited),
            (other.matches, other.inherited),
            op,
        );
        Self {
            matches,
            descend: self.descend.favor_descend(other.descend),
            inherited,
        }
    }
}

impl Default for FilterStartResult {
    fn default() -> Self {
        Self::default_result()
    }
}

// ============================================================================
// Finish result
// ============================================================================

/// Verdict of a filter once an element's children have been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterFinishResult {
    pub matches: Ternary,
    pub inherited: bool,
}

impl FilterFinishResult {
    #[must_use]
    pub const fn direct(matches: Ternary) -> Self {
        Self {
            matches,
            inherited: false,
        }
    }

    #[must_use]
    pub const fn inherit(parent: Self) -> Self {
        Self {
            inherited: true,
            ..parent
        }
    }

    #[must_use]
    pub const fn default_result() -> Self {
        Self {
            matches: Ternary::Undecided,
            inherited: true,
        }
    }

    #[must_use]
    pub const fn matches() -> Self {
        Self::direct(Ternary::True)
    }

    #[must_use]
    pub const fn doesnt_match() -> Self {
        Self::direct(Ternary::False)
    }

    /// Finish result confirming a start result
    #[must_use]
    pub const fn from_start(start: FilterStartResult) -> Self {
        Self {
            matches: start.matches,
            inherited: start.inherited,
        }
    }

    #[must_use]
    pub const fn with_match(self, matches: Ternary) -> Self {
        Self { matches, ..self }
    }

    #[must_use]
    pub const fn with_inherited(self, inherited: bool) -> Self {
        Self { inherited, ..self }
    }

    #[must_use]
    pub const fn negate_match(self) -> Self {
        self.with_match(self.matches.negate())
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let (matches, inherited) = combine_match(
            (self.matches, self.inherited),
            (other.matches, other.inherited),
            Ternary::and,
        );
        Self { matches, inherited }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let (matches, inherited) = combine_match(
            (self.matches, self.inherited),
            (other.matches, other.inherited),
            Ternary::or,
        );
        Self { matches, inherited }
    }
}

impl Default for FilterFinishResult {
    fn default() -> Self {
        Self::default_result()
    }
}
