//! Two-electron repulsion integrals over real basis functions.
//!
//! A real two-electron repulsion integral $`(ij|kl)`$ is unchanged under the eight index
//! permutations generated by $`i \leftrightarrow j`$, $`k \leftrightarrow l`$, and
//! $`(ij) \leftrightarrow (kl)`$. Every lookup into an integral store is routed through
//! [`eri_index::canonicalise`] so that each physically distinct integral is stored exactly once.

use anyhow;

pub mod eri_index;
pub mod repository;

pub use eri_index::{canonicalise, EriIndex};
pub use repository::EriRepository;

/// Trait for read-only stores of two-electron repulsion integrals in chemists' notation.
///
/// Implementors must be safe to read concurrently, as the G-matrix build queries them from many
/// threads at once.
pub trait TwoElectronIntegrals: Sync {
    /// The number of basis functions spanned by the integral indices.
    fn n_basis(&self) -> usize;

    /// Retrieves the integral $`(ij|kl)`$.
    ///
    /// # Errors
    ///
    /// Errors if the store holds no value for the canonical form of the requested index. This
    /// indicates a mismatch between the basis set and the integral source, and is never treated
    /// as a zero integral.
    fn get(&self, i: usize, j: usize, k: usize, l: usize) -> Result<f64, anyhow::Error>;
}
