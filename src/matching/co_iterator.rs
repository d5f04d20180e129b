//! Merge-style co-iteration over two sorted sequences.

use crate::model::Pairing;
use std::cmp::Ordering;
use std::iter::{FusedIterator, Peekable};

/// Lazily pairs up two sequences sorted by the same comparator.
///
/// Elements comparing equal are emitted together as [`Pairing::Both`];
/// everything else is emitted alone, in comparator order. Inputs are not
/// sorted here: unsorted input yields unspecified pairings, though every
/// element is still emitted exactly once.
pub struct CoIterator<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
{
    left: Peekable<L>,
    right: Peekable<R>,
    compare: F,
}

impl<L, R, F> CoIterator<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
    F: FnMut(&L::Item, &L::Item) -> Ordering,
{
    pub fn new(
        left: impl IntoIterator<IntoIter = L>,
        right: impl IntoIterator<IntoIter = R>,
        compare: F,
    ) -> Self {
        Self {
            left: left.into_iter().peekable(),
            right: right.into_iter().peekable(),
            compare,
        }
    }
}

impl<L, R, F> Iterator for CoIterator<L, R, F>
where
    L: Iterator,
    R: Iterator<Item = L::Item>,
    F: FnMut(&L::Item, &L::Item) -> Ordering,
{
    type Item = Pairing<L::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        // An exhausted side sorts after everything.
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(l), Some(r)) => (self.compare)(l, r),
        };
        match order {
            Ordering::Less => self.left.next().map(Pairing::Left),
            Ordering::Greater => self.right.next().map(Pairing::Right),
            Ordering::Equal => match (self.left.next(), self.right.next()) {
                (Some(l), Some(r)) => Some(Pairing::Both(l, r)),
                _ => None,
            },
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (l_low, l_high) = self.left.size_hint();
        let (r_low, r_high) = self.right.size_hint();
        let high = l_high.zip(r_high).map(|(l, r)| l + r);
        (l_low.max(r_low), high)
    }
}

impl<L, R, F> FusedIterator for CoIterator<L, R, F>
where
    L: FusedIterator,
    R: FusedIterator<Item = L::Item>,
    F: FnMut(&L::Item, &L::Item) -> Ordering,
{
}

/// Co-iterate using the items' natural order
pub fn co_iterate_ord<T: Ord>(
    left: impl IntoIterator<Item = T>,
    right: impl IntoIterator<Item = T>,
) -> Vec<Pairing<T>> {
    CoIterator::new(left, right, |a: &T, b: &T| a.cmp(b)).collect()
}
