//! Outcome of applying one transform to one difference.

use crate::model::Difference;

/// What a transform wants done with a difference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransformationResult {
    /// Leave the difference as it is
    #[default]
    Keep,
    /// Drop the difference
    Discard,
    /// Replace the difference with these, in order
    Replace(Vec<Difference>),
    /// No decision; treated like `Keep`
    Undecided,
}

impl TransformationResult {
    /// Replace with a single difference
    #[must_use]
    pub fn replace(difference: Difference) -> Self {
        Self::Replace(vec![difference])
    }

    /// Replace with several differences, dropping duplicates but keeping order
    pub fn replace_with(differences: impl IntoIterator<Item = Difference>) -> Self {
        let mut unique: Vec<Difference> = Vec::new();
        for d in differences {
            if !unique.contains(&d) {
                unique.push(d);
            }
        }
        Self::Replace(unique)
    }

    /// Replace only if the new difference differs from the original
    #[must_use]
    pub fn replace_if_changed(original: &Difference, changed: Difference) -> Self {
        if *original == changed {
            Self::Keep
        } else {
            Self::replace(changed)
        }
    }
}
