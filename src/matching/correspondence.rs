//! Deducing the order in which sibling elements of both versions are paired.

use super::edit_distance;
use crate::model::{ApiSide, Element, ElementId, ElementRef};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordering imposed on the siblings of both versions before co-iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correspondence {
    /// The elements' own ordering
    Natural,
    /// Synthetic ranks; elements sharing a rank are paired
    Ranked(RankTable),
}

/// Per-side synthetic ranks of the elements of one sibling level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankTable {
    old: HashMap<ElementId, usize>,
    new: HashMap<ElementId, usize>,
}

impl RankTable {
    pub fn insert(&mut self, side: ApiSide, id: ElementId, rank: usize) {
        match side {
            ApiSide::Old => self.old.insert(id, rank),
            ApiSide::New => self.new.insert(id, rank),
        };
    }

    /// Rank of an element; unranked elements sort last
    #[must_use]
    pub fn rank<E>(&self, element: &ElementRef<'_, E>) -> usize {
        let ranks = match element.side() {
            ApiSide::Old => &self.old,
            ApiSide::New => &self.new,
        };
        ranks.get(&element.id()).copied().unwrap_or(usize::MAX)
    }
}

impl Correspondence {
    /// Compare two elements, from either side, under this correspondence
    #[must_use]
    pub fn compare<E: Element>(&self, a: &ElementRef<'_, E>, b: &ElementRef<'_, E>) -> Ordering {
        match self {
            Self::Natural => a.data().cmp(b.data()),
            Self::Ranked(table) => table.rank(a).cmp(&table.rank(b)),
        }
    }

    /// Sort one sibling list by this correspondence
    pub fn sort<E: Element>(&self, elements: &mut [ElementRef<'_, E>]) {
        elements.sort_by(|a, b| self.compare(a, b));
    }
}

/// Chooses the [`Correspondence`] for one level of siblings.
pub trait CorrespondenceDeducer<E: Element> {
    /// Inspect the old and new siblings and derive their pairing order
    fn deduce(&self, old: &[ElementRef<'_, E>], new: &[ElementRef<'_, E>]) -> Correspondence;
}

/// Pairs siblings by their natural order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<E: Element> CorrespondenceDeducer<E> for NaturalOrder {
    fn deduce(&self, _old: &[ElementRef<'_, E>], _new: &[ElementRef<'_, E>]) -> Correspondence {
        Correspondence::Natural
    }
}

type ElementPredicate<E> = Box<dyn Fn(&E) -> bool>;
type ElementEquality<E> = Box<dyn Fn(&E, &E) -> bool>;

/// Pairs positional siblings so the number of unmatched elements is minimal.
///
/// Suited to levels where order carries no identity, such as method
/// parameters. Falls back to natural order when either side is empty or
/// when a sibling is not accepted by the optional predicate.
pub struct MinimalEditOrder<E> {
    equality: ElementEquality<E>,
    applies_to: Option<ElementPredicate<E>>,
}

impl<E: Element> MinimalEditOrder<E> {
    /// Align using the given equality predicate
    pub fn new(equality: impl Fn(&E, &E) -> bool + 'static) -> Self {
        Self {
            equality: Box::new(equality),
            applies_to: None,
        }
    }

    /// Restrict minimal-edit alignment to levels where every sibling matches `predicate`
    #[must_use]
    pub fn when(mut self, predicate: impl Fn(&E) -> bool + 'static) -> Self {
        self.applies_to = Some(Box::new(predicate));
        self
    }

    fn applies(&self, old: &[ElementRef<'_, E>], new: &[ElementRef<'_, E>]) -> bool {
        self.applies_to
            .as_ref()
            .is_none_or(|pred| old.iter().chain(new).all(|e| pred(e.data())))
    }
}

impl<E: Element + PartialEq> MinimalEditOrder<E> {
    /// Align using payload equality
    #[must_use]
    pub fn by_equality() -> Self {
        Self::new(|a: &E, b: &E| a == b)
    }
}

impl<E: Element> CorrespondenceDeducer<E> for MinimalEditOrder<E> {
    fn deduce(&self, old: &[ElementRef<'_, E>], new: &[ElementRef<'_, E>]) -> Correspondence {
        if old.is_empty() || new.is_empty() || !self.applies(old, new) {
            return Correspondence::Natural;
        }

        let mut old_sorted = old.to_vec();
        let mut new_sorted = new.to_vec();
        Correspondence::Natural.sort(&mut old_sorted);
        Correspondence::Natural.sort(&mut new_sorted);

        let alignment = edit_distance::align(&old_sorted, &new_sorted, |a, b| {
            (self.equality)(a.data(), b.data())
        });

        let mut table = RankTable::default();
        for (rank, pair) in alignment.into_iter().enumerate() {
            if let Some(o) = pair.left() {
                table.insert(o.side(), o.id(), rank);
            }
            if let Some(n) = pair.right() {
                table.insert(n.side(), n.id(), rank);
            }
        }
        Correspondence::Ranked(table)
    }
}
