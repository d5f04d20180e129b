//! Aligned pair of optional old/new items that is never empty.

/// One aligned pair produced by co-iteration or sequence alignment.
///
/// `Left` is present only on the old side, `Right` only on the new side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pairing<T> {
    Left(T),
    Right(T),
    Both(T, T),
}

impl<T> Pairing<T> {
    /// Build a pairing from two options; `None` when both are absent
    pub fn from_options(left: Option<T>, right: Option<T>) -> Option<Self> {
        match (left, right) {
            (Some(l), Some(r)) => Some(Self::Both(l, r)),
            (Some(l), None) => Some(Self::Left(l)),
            (None, Some(r)) => Some(Self::Right(r)),
            (None, None) => None,
        }
    }

    pub const fn left(&self) -> Option<&T> {
        match self {
            Self::Left(l) | Self::Both(l, _) => Some(l),
            Self::Right(_) => None,
        }
    }

    pub const fn right(&self) -> Option<&T> {
        match self {
            Self::Right(r) | Self::Both(_, r) => Some(r),
            Self::Left(_) => None,
        }
    }

    pub const fn is_both(&self) -> bool {
        matches!(self, Self::Both(..))
    }

    pub fn into_options(self) -> (Option<T>, Option<T>) {
        match self {
            Self::Left(l) => (Some(l), None),
            Self::Right(r) => (None, Some(r)),
            Self::Both(l, r) => (Some(l), Some(r)),
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Pairing<U> {
        match self {
            Self::Left(l) => Pairing::Left(f(l)),
            Self::Right(r) => Pairing::Right(f(r)),
            Self::Both(l, r) => Pairing::Both(f(l), f(r)),
        }
    }

    pub const fn as_ref(&self) -> Pairing<&T> {
        match self {
            Self::Left(l) => Pairing::Left(l),
            Self::Right(r) => Pairing::Right(r),
            Self::Both(l, r) => Pairing::Both(l, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_options_rejects_empty_pair() {
        assert_eq!(Pairing::<u8>::from_options(None, None), None);
        assert_eq!(
            Pairing::from_options(Some(1), None),
            Some(Pairing::Left(1))
        );
        assert_eq!(
            Pairing::from_options(Some(1), Some(2)),
            Some(Pairing::Both(1, 2))
        );
    }

    #[test]
    fn test_accessors() {
        let p = Pairing::Both("a", "b");
        assert_eq!(p.left(), Some(&"a"));
        assert_eq!(p.right(), Some(&"b"));
        assert!(p.is_both());
        assert_eq!(Pairing::Right(3).map(|v| v * 2).into_options(), (None, Some(6)));
    }
}
