//! Pairing sibling elements of the old and new API.
//!
//! Pairing happens in two steps. A [`CorrespondenceDeducer`] first decides
//! how siblings of both versions are ordered; both sibling lists are then
//! sorted by that order and merged by the [`CoIterator`].
//!
//! The alignment primitives are usable on their own:
//!
//! ```
//! use api_compat::matching::edit_distance;
//! use api_compat::model::Pairing;
//!
//! let pairs = edit_distance::align(&['x', 'y', 'z'], &['y', 'z', 'w'], |a, b| a == b);
//! assert_eq!(pairs[0], Pairing::Left(&'x'));
//! assert_eq!(pairs[3], Pairing::Right(&'w'));
//! ```

mod co_iterator;
mod correspondence;
pub mod edit_distance;
pub mod lcs;

pub use co_iterator::{CoIterator, co_iterate_ord};
pub use correspondence::{
    Correspondence, CorrespondenceDeducer, MinimalEditOrder, NaturalOrder, RankTable,
};
pub use lcs::longest_common_subsequence;
