//! Longest-common-subsequence diff of two sequences.

use crate::model::Pairing;

/// Diff `left` against `right` through their longest common subsequence.
///
/// Equal items are emitted as [`Pairing::Both`]. When backtracking from a
/// non-matching cell an insertion is preferred whenever it keeps a common
/// subsequence at least as long as the deletion would.
pub fn longest_common_subsequence<'a, T>(
    left: &'a [T],
    right: &'a [T],
    mut eq: impl FnMut(&T, &T) -> bool,
) -> Vec<Pairing<&'a T>> {
    let width = right.len() + 1;
    let mut lengths = vec![0usize; (left.len() + 1) * width];
    for i in 1..=left.len() {
        for j in 1..=right.len() {
            lengths[i * width + j] = if eq(&left[i - 1], &right[j - 1]) {
                lengths[(i - 1) * width + j - 1] + 1
            } else {
                lengths[(i - 1) * width + j].max(lengths[i * width + j - 1])
            };
        }
    }

    let mut pairs = Vec::with_capacity(left.len().max(right.len()));
    let (mut i, mut j) = (left.len(), right.len());
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && eq(&left[i - 1], &right[j - 1]) {
            pairs.push(Pairing::Both(&left[i - 1], &right[j - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lengths[i * width + j - 1] >= lengths[(i - 1) * width + j]) {
            pairs.push(Pairing::Right(&right[j - 1]));
            j -= 1;
        } else {
            pairs.push(Pairing::Left(&left[i - 1]));
            i -= 1;
        }
    }
    pairs.reverse();
    pairs
}

/// Length of the longest common subsequence
pub fn lcs_len<T>(left: &[T], right: &[T], eq: impl FnMut(&T, &T) -> bool) -> usize {
    longest_common_subsequence(left, right, eq)
        .iter()
        .filter(|p| p.is_both())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_middle_element() {
        let pairs = longest_common_subsequence(&["a", "b", "c"], &["a", "c"], |x, y| x == y);
        assert_eq!(
            pairs,
            vec![
                Pairing::Both(&"a", &"a"),
                Pairing::Left(&"b"),
                Pairing::Both(&"c", &"c"),
            ]
        );
    }

    #[test]
    fn test_disjoint_prefers_insertion_when_backtracking() {
        let pairs = longest_common_subsequence(&['a'], &['b'], |x, y| x == y);
        assert_eq!(pairs, vec![Pairing::Left(&'a'), Pairing::Right(&'b')]);
    }

    #[test]
    fn test_lcs_len() {
        let left: Vec<char> = "ABCBDAB".chars().collect();
        let right: Vec<char> = "BDCABA".chars().collect();
        assert_eq!(lcs_len(&left, &right, |a, b| a == b), 4);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(longest_common_subsequence::<u8>(&[], &[], |a, b| a == b).is_empty());
        assert_eq!(
            longest_common_subsequence(&[], &[1], |a: &i32, b| a == b),
            vec![Pairing::Right(&1)]
        );
    }
}
