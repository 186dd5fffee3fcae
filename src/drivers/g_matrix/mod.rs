//! Driver for building the two-electron G matrix from a density matrix and a set of integrals.

use std::fmt;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::drivers::QFockDriver;
use crate::fock::GMatrixElement;
use crate::integrals::{EriRepository, TwoElectronIntegrals};
use crate::io::format::{
    log_subtitle, log_title, nice_bool, qfock_output, qfock_warn, QFockOutput,
};
use crate::io::{write_qfock_binary, QFockFileType};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing the inputs and control parameters for a G-matrix build.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct GMatrixParams {
    /// The density matrix, given row by row.
    pub density: Vec<Vec<f64>>,

    /// The two-electron repulsion integrals over the basis of the density matrix.
    pub integrals: EriRepository,

    /// Optional name for saving the result as a binary file of type [`QFockFileType::Gmat`]. If
    /// `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<String>,
}

impl GMatrixParams {
    /// Returns a builder to construct a [`GMatrixParams`] structure.
    #[must_use]
    pub fn builder() -> GMatrixParamsBuilder {
        GMatrixParamsBuilder::default()
    }

    /// Assembles the density matrix.
    ///
    /// # Errors
    ///
    /// Errors if the rows have different lengths.
    pub fn density_matrix(&self) -> Result<Array2<f64>, anyhow::Error> {
        let nrows = self.density.len();
        let ncols = self.density.first().map_or(0, Vec::len);
        ensure!(
            self.density.iter().all(|row| row.len() == ncols),
            "The density matrix rows have inconsistent lengths."
        );
        Array2::from_shape_vec(
            (nrows, ncols),
            self.density.iter().flatten().copied().collect_vec(),
        )
        .map_err(|err| format_err!(err))
    }
}

impl fmt::Display for GMatrixParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_basis = self.integrals.n_basis();
        writeln!(f, "Basis functions: {n_basis}")?;
        writeln!(
            f,
            "Distinct integrals supplied: {} of {}",
            self.integrals.len(),
            EriRepository::n_unique(n_basis)
        )?;
        writeln!(
            f,
            "Save G matrix to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{name}.{}", QFockFileType::Gmat.ext())
            } else {
                nice_bool(false)
            }
        )?;
        Ok(())
    }
}

// ------
// Result
// ------

/// A structure to contain a G-matrix build result.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GMatrixResult {
    /// The G matrix.
    pub g_matrix: Array2<f64>,
}

impl fmt::Display for GMatrixResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.g_matrix.rows() {
            writeln!(f, "{}", row.iter().map(|x| format!("{:>+14.8}", x + 0.0)).join(" "))?;
        }
        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for G-matrix builds.
#[derive(Clone, Builder)]
pub struct GMatrixDriver<'a> {
    /// The inputs and control parameters.
    parameters: &'a GMatrixParams,

    /// The result of the build.
    #[builder(setter(skip), default = "None")]
    result: Option<GMatrixResult>,
}

impl<'a> GMatrixDriver<'a> {
    /// Returns a builder to construct a [`GMatrixDriver`] structure.
    #[must_use]
    pub fn builder() -> GMatrixDriverBuilder<'a> {
        GMatrixDriverBuilder::default()
    }

    fn build_g_matrix(&mut self) -> Result<(), anyhow::Error> {
        log_title("G Matrix");
        qfock_output!("");
        let params = self.parameters;
        params.log_output_display();
        qfock_output!("");

        if !params.integrals.is_complete() {
            qfock_warn!(
                "Only {} of the {} distinct integrals are present; any missing integral the build \
                needs is an error.",
                params.integrals.len(),
                EriRepository::n_unique(params.integrals.n_basis())
            );
        }
        let density = params.density_matrix()?;
        let g_matrix = GMatrixElement::new(density.view(), &params.integrals)?.build()?;
        let result = GMatrixResult { g_matrix };

        log_subtitle("Two-electron matrix G");
        qfock_output!("");
        result.log_output_display();
        qfock_output!("");

        if let Some(name) = params.result_save_name.as_ref() {
            write_qfock_binary(name, QFockFileType::Gmat, &result)?;
            qfock_output!("G matrix saved as {name}.{}.", QFockFileType::Gmat.ext());
            qfock_output!("");
        }

        self.result = Some(result);
        Ok(())
    }
}

impl QFockDriver for GMatrixDriver<'_> {
    type Params = GMatrixParams;

    type Outcome = GMatrixResult;

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.build_g_matrix()
    }

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No G-matrix results found."))
    }
}
