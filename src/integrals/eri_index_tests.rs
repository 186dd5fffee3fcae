use std::collections::HashSet;

use itertools::iproduct;
use proptest::prelude::*;

use crate::integrals::eri_index::{canonicalise, EriIndex};

#[test]
fn test_eri_index_canonicalise() {
    assert_eq!(canonicalise(0, 0, 0, 0), EriIndex::new(0, 0, 0, 0));
    assert_eq!(canonicalise(1, 0, 0, 0), EriIndex::new(0, 0, 0, 1));
    assert_eq!(canonicalise(3, 2, 1, 0), EriIndex::new(0, 1, 2, 3));
    assert_eq!(canonicalise(2, 1, 2, 0), EriIndex::new(0, 2, 1, 2));
    assert_eq!(canonicalise(1, 3, 1, 2), EriIndex::new(1, 2, 1, 3));
    assert_eq!(canonicalise(0, 1, 0, 1), EriIndex::new(0, 1, 0, 1));
    assert_eq!(canonicalise(1, 0, 1, 0), EriIndex::new(0, 1, 0, 1));
}

#[test]
fn test_eri_index_is_canonical() {
    assert!(EriIndex::new(0, 1, 2, 3).is_canonical());
    assert!(EriIndex::new(0, 3, 1, 2).is_canonical());
    assert!(!EriIndex::new(1, 0, 2, 3).is_canonical());
    assert!(!EriIndex::new(2, 3, 0, 1).is_canonical());
    assert!(!EriIndex::new(1, 3, 1, 2).is_canonical());
}

#[test]
fn test_eri_index_permutations() {
    let perms = EriIndex::new(0, 1, 2, 3).permutations();
    assert_eq!(perms.iter().collect::<HashSet<_>>().len(), 8);
    assert!(perms.contains(&EriIndex::new(3, 2, 1, 0)));
    assert!(!perms.contains(&EriIndex::new(0, 2, 1, 3)));

    let perms = EriIndex::new(0, 0, 1, 1).permutations();
    assert_eq!(perms.iter().collect::<HashSet<_>>().len(), 2);
}

#[test]
fn test_eri_index_display() {
    assert_eq!(EriIndex::new(0, 1, 2, 3).to_string(), "(0 1|2 3)");
    assert_eq!(EriIndex::from([4, 0, 2, 2]).max_index(), 4);
}

#[test]
fn test_eri_index_no_collisions() {
    // Classes are counted independently of the canonicaliser: a class is the set of orderings
    // reachable through the eight permutations.
    let n = 10;
    let mut classes: HashSet<Vec<EriIndex>> = HashSet::new();
    let mut canonicals: HashSet<EriIndex> = HashSet::new();
    for (i, j, k, l) in iproduct!(0..n, 0..n, 0..n, 0..n) {
        let index = EriIndex::new(i, j, k, l);
        let mut class = index.permutations().to_vec();
        class.sort_unstable();
        class.dedup();
        classes.insert(class);
        canonicals.insert(canonicalise(i, j, k, l));
    }
    let n_pairs = n * (n + 1) / 2;
    assert_eq!(classes.len(), n_pairs * (n_pairs + 1) / 2);
    assert_eq!(canonicals.len(), classes.len());
    assert!(canonicals.iter().all(EriIndex::is_canonical));
}

proptest! {
    #[test]
    fn test_eri_index_permutation_invariance(
        i in 0usize..64,
        j in 0usize..64,
        k in 0usize..64,
        l in 0usize..64,
    ) {
        let canonical = canonicalise(i, j, k, l);
        for perm in EriIndex::new(i, j, k, l).permutations() {
            let [a, b, c, d] = perm.indices();
            prop_assert_eq!(canonicalise(a, b, c, d), canonical);
        }
        prop_assert!(canonical.permutations().contains(&EriIndex::new(i, j, k, l)));
    }
}
