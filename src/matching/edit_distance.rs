//! Wagner–Fischer alignment of two sequences.
//!
//! Produces the alignment with the fewest insertions, deletions and
//! substitutions under a caller-supplied equality predicate. Substituted
//! items are emitted as [`Pairing::Both`] so they are compared as a
//! modification instead of a removal plus an addition.

use crate::model::Pairing;

/// Edit distance between two sequences (substitution cost 0 when equal, else 1)
pub fn distance<T>(left: &[T], right: &[T], eq: impl FnMut(&T, &T) -> bool) -> usize {
    Matrix::compute(left, right, eq).get(left.len(), right.len())
}

/// Minimal-edit alignment of `left` against `right`.
///
/// Backtracking starts at the bottom-right cell. A deletion is taken only
/// when strictly cheaper than both alternatives, an insertion only when
/// strictly cheaper than the substitution; all remaining ties resolve to a
/// substitution. When either side is empty the result lists the other side
/// unpaired, in order.
pub fn align<'a, T>(
    left: &'a [T],
    right: &'a [T],
    eq: impl FnMut(&T, &T) -> bool,
) -> Vec<Pairing<&'a T>> {
    if left.is_empty() || right.is_empty() {
        return left
            .iter()
            .map(Pairing::Left)
            .chain(right.iter().map(Pairing::Right))
            .collect();
    }

    let matrix = Matrix::compute(left, right, eq);
    let mut pairs = Vec::with_capacity(left.len().max(right.len()));
    let (mut i, mut j) = (left.len(), right.len());

    while i > 0 || j > 0 {
        let deletion = if i > 0 { matrix.get(i - 1, j) } else { usize::MAX };
        let insertion = if j > 0 { matrix.get(i, j - 1) } else { usize::MAX };
        let substitution = if i > 0 && j > 0 {
            matrix.get(i - 1, j - 1)
        } else {
            usize::MAX
        };

        if deletion < insertion && deletion < substitution {
            pairs.push(Pairing::Left(&left[i - 1]));
            i -= 1;
        } else if insertion < substitution {
            pairs.push(Pairing::Right(&right[j - 1]));
            j -= 1;
        } else {
            pairs.push(Pairing::Both(&left[i - 1], &right[j - 1]));
            i -= 1;
            j -= 1;
        }
    }

    pairs.reverse();
    pairs
}

/// Row-major (n+1) x (m+1) distance matrix
struct Matrix {
    cells: Vec<usize>,
    width: usize,
}

impl Matrix {
    fn compute<T>(left: &[T], right: &[T], mut eq: impl FnMut(&T, &T) -> bool) -> Self {
        let width = right.len() + 1;
        let mut cells = vec![0; (left.len() + 1) * width];
        for (j, cell) in cells.iter_mut().take(width).enumerate() {
            *cell = j;
        }
        for i in 1..=left.len() {
            cells[i * width] = i;
            for j in 1..=right.len() {
                let cost = usize::from(!eq(&left[i - 1], &right[j - 1]));
                let deletion = cells[(i - 1) * width + j] + 1;
                let insertion = cells[i * width + j - 1] + 1;
                let substitution = cells[(i - 1) * width + j - 1] + cost;
                cells[i * width + j] = deletion.min(insertion).min(substitution);
            }
        }
        Self { cells, width }
    }

    fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }
}
