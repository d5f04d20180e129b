//! Element payloads and the handles that address them inside a forest.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle of an element inside one [`ElementForest`](super::ElementForest).
///
/// Handles are only meaningful for the forest that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Arena index of the element
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two compared API versions an element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiSide {
    Old,
    New,
}

impl fmt::Display for ApiSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Analyzer-defined payload of a forest node.
///
/// The `Ord` implementation is the natural sibling order and must be a
/// strict total order among siblings produced by the same analyzer.
pub trait Element: Ord + fmt::Debug {
    /// Human-readable representation, matched by regex-based filters and recipes
    fn display_name(&self) -> String;
}

impl Element for String {
    fn display_name(&self) -> String {
        self.clone()
    }
}

/// Generic element made of a kind and a name.
///
/// Orders by kind first, then by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimpleElement {
    /// Element kind such as `class`, `method` or `field`; may be empty
    pub kind: String,
    /// Element name
    pub name: String,
}

impl SimpleElement {
    /// Element without a kind
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            kind: String::new(),
            name: name.into(),
        }
    }

    /// Element of the given kind
    pub fn of_kind(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl Element for SimpleElement {
    fn display_name(&self) -> String {
        if self.kind.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.kind, self.name)
        }
    }
}

impl fmt::Display for SimpleElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
