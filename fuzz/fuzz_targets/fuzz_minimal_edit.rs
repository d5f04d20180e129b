#![no_main]
use api_compat::matching::edit_distance;
use libfuzzer_sys::fuzz_target;

/// Fuzz minimal-edit alignment.
///
/// The input is split in two sequences at the first zero byte. The
/// alignment must keep both sequences complete and in order, and its cost
/// must equal the edit distance.
fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|b| *b == 0).unwrap_or(data.len());
    let (old, new) = data.split_at(split);
    let new = new.get(1..).unwrap_or_default();

    let pairs = edit_distance::align(old, new, |a, b| a == b);
    let lefts: Vec<u8> = pairs.iter().filter_map(|p| p.left()).map(|v| **v).collect();
    let rights: Vec<u8> = pairs.iter().filter_map(|p| p.right()).map(|v| **v).collect();
    assert_eq!(lefts, old);
    assert_eq!(rights, new);

    let cost = pairs
        .iter()
        .filter(|p| p.left().zip(p.right()).is_none_or(|(a, b)| a != b))
        .count();
    assert_eq!(cost, edit_distance::distance(old, new, |a, b| a == b));
});
