//! In-memory store of precomputed two-electron repulsion integrals.

use std::collections::HashMap;

use anyhow::{self, ensure, format_err};
use serde::{Deserialize, Serialize};

use crate::integrals::eri_index::{canonicalise, EriIndex};
use crate::integrals::TwoElectronIntegrals;

#[cfg(test)]
#[path = "repository_tests.rs"]
mod repository_tests;

/// The serialised form of an [`EriRepository`]: the basis dimension and a list of
/// `[i, j, k, l, value]` entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct EriRepositoryData {
    n_basis: usize,
    entries: Vec<(usize, usize, usize, usize, f64)>,
}

/// A store of two-electron repulsion integrals keyed by canonical [`EriIndex`].
///
/// The store is filled once before any G-matrix build and is read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "EriRepositoryData", into = "EriRepositoryData")]
pub struct EriRepository {
    /// The number of basis functions spanned by the integral indices.
    n_basis: usize,

    /// The integral values keyed by canonical index.
    values: HashMap<EriIndex, f64>,
}

impl EriRepository {
    /// Constructs an empty repository over `n_basis` basis functions.
    #[must_use]
    pub fn new(n_basis: usize) -> Self {
        Self {
            n_basis,
            values: HashMap::new(),
        }
    }

    /// Constructs a repository from a list of `(i, j, k, l, value)` entries.
    ///
    /// # Errors
    ///
    /// Errors if any entry carries an index outside the basis, or if two entries label the same
    /// integral with different values.
    pub fn from_entries(
        n_basis: usize,
        entries: &[(usize, usize, usize, usize, f64)],
    ) -> Result<Self, anyhow::Error> {
        let mut repo = Self::new(n_basis);
        for &(i, j, k, l, value) in entries {
            if let Some(previous) = repo.insert(i, j, k, l, value)? {
                ensure!(
                    approx::relative_eq!(previous, value),
                    "Conflicting values {previous} and {value} given for integral {}.",
                    canonicalise(i, j, k, l)
                );
            }
        }
        Ok(repo)
    }

    /// Inserts the integral $`(ij|kl)`$ under its canonical index.
    ///
    /// # Returns
    ///
    /// The value previously stored for the same integral, if any.
    ///
    /// # Errors
    ///
    /// Errors if any index lies outside the basis.
    pub fn insert(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        l: usize,
        value: f64,
    ) -> Result<Option<f64>, anyhow::Error> {
        let index = canonicalise(i, j, k, l);
        ensure!(
            index.max_index() < self.n_basis,
            "Integral index {} lies outside the basis of {} functions.",
            EriIndex::new(i, j, k, l),
            self.n_basis
        );
        Ok(self.values.insert(index, value))
    }

    /// The number of distinct integrals stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks if no integrals are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The number of distinct integrals over `n_basis` real basis functions.
    #[must_use]
    pub fn n_unique(n_basis: usize) -> usize {
        let n_pairs = n_basis * (n_basis + 1) / 2;
        n_pairs * (n_pairs + 1) / 2
    }

    /// Checks if every distinct integral over the basis is stored.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.len() == Self::n_unique(self.n_basis)
    }

    /// Iterates over the stored integrals in ascending canonical index order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (EriIndex, f64)> + '_ {
        let mut indices = self.values.keys().copied().collect::<Vec<_>>();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|index| self.values.get(&index).map(|value| (index, *value)))
    }
}

impl TwoElectronIntegrals for EriRepository {
    fn n_basis(&self) -> usize {
        self.n_basis
    }

    fn get(&self, i: usize, j: usize, k: usize, l: usize) -> Result<f64, anyhow::Error> {
        let index = canonicalise(i, j, k, l);
        self.values.get(&index).copied().ok_or_else(|| {
            format_err!(
                "Integral {} (canonical index {index}) is missing from the repository. The basis \
                set and the integral source do not match.",
                EriIndex::new(i, j, k, l)
            )
        })
    }
}

impl TryFrom<EriRepositoryData> for EriRepository {
    type Error = anyhow::Error;

    fn try_from(data: EriRepositoryData) -> Result<Self, Self::Error> {
        Self::from_entries(data.n_basis, &data.entries)
    }
}

impl From<EriRepository> for EriRepositoryData {
    fn from(repo: EriRepository) -> Self {
        let entries = repo
            .iter_sorted()
            .map(|(index, value)| {
                let [i, j, k, l] = index.indices();
                (i, j, k, l, value)
            })
            .collect();
        Self {
            n_basis: repo.n_basis,
            entries,
        }
    }
}
