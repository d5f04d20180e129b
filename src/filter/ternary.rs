//! Three-valued logic with Kleene semantics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A truth value that may not be decided yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ternary {
    True,
    False,
    #[default]
    Undecided,
}

impl Ternary {
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }

    /// Collapse to a boolean, mapping `Undecided` to `undecided_value`
    #[must_use]
    pub const fn to_bool(self, undecided_value: bool) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Undecided => undecided_value,
        }
    }

    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[must_use]
    pub const fn is_false(self) -> bool {
        matches!(self, Self::False)
    }

    #[must_use]
    pub const fn is_undecided(self) -> bool {
        matches!(self, Self::Undecided)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Undecided => Self::Undecided,
        }
    }

    /// Kleene conjunction: `False` dominates, then `Undecided`
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, Self::True) => Self::True,
            _ => Self::Undecided,
        }
    }

    /// Kleene disjunction: `True` dominates, then `Undecided`
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, Self::False) => Self::False,
            _ => Self::Undecided,
        }
    }

    /// Kleene implication, equivalent to `!self | other`
    #[must_use]
    pub const fn implies(self, other: Self) -> Self {
        self.negate().or(other)
    }

    /// Conjunction evaluating `other` only when `self` is not `False`
    #[must_use]
    pub fn and_then(self, other: impl FnOnce() -> Self) -> Self {
        if self.is_false() {
            Self::False
        } else {
            self.and(other())
        }
    }

    /// Disjunction evaluating `other` only when `self` is not `True`
    #[must_use]
    pub fn or_else(self, other: impl FnOnce() -> Self) -> Self {
        if self.is_true() {
            Self::True
        } else {
            self.or(other())
        }
    }

    /// Implication evaluating `other` only when `self` is not `False`
    #[must_use]
    pub fn implies_then(self, other: impl FnOnce() -> Self) -> Self {
        if self.is_false() {
            Self::True
        } else {
            self.implies(other())
        }
    }

    /// Rank used when a decision to descend is merged: `True` > `Undecided` > `False`
    const fn descend_rank(self) -> u8 {
        match self {
            Self::False => 0,
            Self::Undecided => 1,
            Self::True => 2,
        }
    }

    /// The more permissive of two descend decisions
    #[must_use]
    pub const fn favor_descend(self, other: Self) -> Self {
        if other.descend_rank() > self.descend_rank() {
            other
        } else {
            self
        }
    }
}

impl Not for Ternary {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl From<bool> for Ternary {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Undecided => write!(f, "undecided"),
        }
    }
}
