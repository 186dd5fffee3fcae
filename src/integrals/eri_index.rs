//! Canonical indices of two-electron repulsion integrals.

use std::fmt;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "eri_index_tests.rs"]
mod eri_index_tests;

/// A four-index label $`(ij|kl)`$ of a two-electron repulsion integral in chemists' notation.
///
/// An [`EriIndex`] obtained from [`canonicalise`] is the unique representative of its class
/// under the eightfold permutational symmetry of real integrals: both pairs are sorted, and the
/// first pair does not exceed the second lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EriIndex(pub [usize; 4]);

impl EriIndex {
    /// Constructs an index exactly as given, without canonicalisation.
    #[must_use]
    pub fn new(i: usize, j: usize, k: usize, l: usize) -> Self {
        Self([i, j, k, l])
    }

    /// The four indices in order.
    #[must_use]
    pub fn indices(&self) -> [usize; 4] {
        self.0
    }

    /// The canonical representative of this index.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let [i, j, k, l] = self.0;
        canonicalise(i, j, k, l)
    }

    /// Checks if this index is its own canonical representative.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.canonical() == *self
    }

    /// Returns the eight orderings of this index that label the same real integral, with
    /// repetitions when indices coincide.
    #[must_use]
    pub fn permutations(&self) -> [Self; 8] {
        let [i, j, k, l] = self.0;
        [
            Self([i, j, k, l]),
            Self([j, i, k, l]),
            Self([i, j, l, k]),
            Self([j, i, l, k]),
            Self([k, l, i, j]),
            Self([l, k, i, j]),
            Self([k, l, j, i]),
            Self([l, k, j, i]),
        ]
    }

    /// The largest of the four indices.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.0.iter().copied().max().unwrap_or_default()
    }
}

impl From<[usize; 4]> for EriIndex {
    fn from(indices: [usize; 4]) -> Self {
        Self(indices)
    }
}

impl fmt::Display for EriIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [i, j, k, l] = self.0;
        write!(f, "({i} {j}|{k} {l})")
    }
}

/// Maps $`(ij|kl)`$ to the canonical representative of its permutation class.
///
/// Each index pair is sorted ascending, and the two pairs are swapped if the first exceeds the
/// second, comparing their leading indices and then, on a tie, their trailing indices.
#[must_use]
pub fn canonicalise(i: usize, j: usize, k: usize, l: usize) -> EriIndex {
    let bra = if i <= j { (i, j) } else { (j, i) };
    let ket = if k <= l { (k, l) } else { (l, k) };
    let ((a, b), (c, d)) = if bra <= ket { (bra, ket) } else { (ket, bra) };
    EriIndex([a, b, c, d])
}
