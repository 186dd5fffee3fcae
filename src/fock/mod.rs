//! Two-electron contribution to the closed-shell Fock matrix.

use anyhow::{self, ensure, format_err};
use log;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::integrals::TwoElectronIntegrals;

#[cfg(test)]
#[path = "fock_tests.rs"]
mod fock_tests;

/// A builder of the two-electron mean-field matrix $`\mathbf{G}`$ of the restricted closed-shell
/// formalism,
///
/// ```math
/// G_{ij} = \sum_{ab} P_{ba} \left[ (ij|ab) - \tfrac{1}{2} (ib|aj) \right],
/// ```
///
/// where $`\mathbf{P}`$ is the density matrix and $`(ij|ab)`$ are two-electron repulsion
/// integrals in chemists' notation. The first term is the Coulomb contribution and the second the
/// exchange contribution.
///
/// Both the density matrix and the integrals are borrowed immutably for the lifetime of the
/// builder, so matrix entries may be evaluated from many threads at once.
pub struct GMatrixElement<'a, I>
where
    I: TwoElectronIntegrals,
{
    density: ArrayView2<'a, f64>,
    integrals: &'a I,
}

impl<'a, I> GMatrixElement<'a, I>
where
    I: TwoElectronIntegrals,
{
    /// Constructs a G-matrix builder.
    ///
    /// # Arguments
    ///
    /// * `density` - The density matrix, with one row and one column per basis function.
    /// * `integrals` - The two-electron repulsion integrals over the same basis.
    ///
    /// # Errors
    ///
    /// Errors if the density matrix is not square or its dimension differs from that of the
    /// integral basis.
    pub fn new(density: ArrayView2<'a, f64>, integrals: &'a I) -> Result<Self, anyhow::Error> {
        let (nrows, ncols) = density.dim();
        ensure!(
            nrows == ncols,
            "The density matrix has dimensions {nrows} × {ncols} and is not square."
        );
        ensure!(
            nrows == integrals.n_basis(),
            "The density matrix dimension {nrows} does not match the {} basis functions of the \
            integrals.",
            integrals.n_basis()
        );
        Ok(Self { density, integrals })
    }

    /// The number of basis functions.
    pub fn n_basis(&self) -> usize {
        self.density.nrows()
    }

    /// Evaluates the entry $`G_{ij}`$.
    ///
    /// # Errors
    ///
    /// Errors if a required integral is missing from the integral store.
    pub fn calculate(&self, i: usize, j: usize) -> Result<f64, anyhow::Error> {
        let n = self.n_basis();
        let mut g_ij = 0.0;
        for a in 0..n {
            for b in 0..n {
                let coulomb = self.integrals.get(i, j, a, b)?;
                let exchange = self.integrals.get(i, b, a, j)?;
                g_ij += self.density[(b, a)] * (coulomb - 0.5 * exchange);
            }
        }
        Ok(g_ij)
    }

    /// Evaluates every entry of $`\mathbf{G}`$, in parallel over entries.
    ///
    /// # Errors
    ///
    /// Errors if a required integral is missing from the integral store.
    pub fn build(&self) -> Result<Array2<f64>, anyhow::Error> {
        let n = self.n_basis();
        log::debug!("Building the {n} × {n} G matrix.");
        let entries = (0..n * n)
            .into_par_iter()
            .map(|ij| self.calculate(ij / n, ij % n))
            .collect::<Result<Vec<_>, _>>()?;
        Array2::from_shape_vec((n, n), entries).map_err(|err| format_err!(err))
    }
}
