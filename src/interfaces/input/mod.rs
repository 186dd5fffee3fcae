//! YAML input handling for the `qfock` binary.

use std::path::PathBuf;

use anyhow::{self, format_err};
use log;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::{Atom, ELEMENT_MAP};
use crate::auxiliary::molecule::Molecule;
use crate::drivers::g_matrix::{GMatrixDriver, GMatrixParams};
use crate::drivers::symmetry_group_detection::{
    SymmetryGroupDetectionDriver, SymmetryGroupDetectionParams, SymmetryGroupDetectionResult,
};
use crate::drivers::QFockDriver;
use crate::energy::nuclear_repulsion;
use crate::interfaces::InputHandle;
use crate::io::format::{log_subtitle, log_title, qfock_output, QFockOutput};
use crate::io::{read_qfock_binary, QFockFileType};

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;

/// The distance threshold used when reading in the input molecule.
const INPUT_GEOMETRY_THRESHOLD: f64 = 1e-7;

/// An enumerated type for the ways a molecule can be specified in a YAML input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMolecule {
    /// Variant for a path to an `.xyz` file.
    Xyz(PathBuf),

    /// Variant for inline atom lines, each in the `xyz` format `Symbol x y z`.
    Atoms(Vec<String>),
}

impl InputMolecule {
    /// Constructs the specified molecule.
    ///
    /// # Errors
    ///
    /// Errors if the file cannot be read or any atom line cannot be parsed.
    pub fn to_molecule(&self, thresh: f64) -> Result<Molecule, anyhow::Error> {
        match self {
            Self::Xyz(path) => Molecule::from_xyz(path, thresh),
            Self::Atoms(lines) => {
                let atoms = lines
                    .iter()
                    .map(|line| {
                        Atom::from_xyz(line, &ELEMENT_MAP, thresh)
                            .ok_or_else(|| format_err!("Unable to parse atom line `{line}`."))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Molecule::from_atoms(&atoms, thresh)
            }
        }
    }
}

/// An enumerated type representing possible input kinds for symmetry-group detection from a YAML
/// input file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SymmetryGroupDetectionInputKind {
    /// Variant indicating that the parameters for the symmetry-group detection driver will be
    /// specified.
    Parameters(SymmetryGroupDetectionParams),

    /// Variant indicating that the symmetry-group detection results will be read in from a `QFock`
    /// [`QFockFileType::Sym`] binary file. The associated string gives the name of the file without
    /// its `.qfock.sym` extension.
    FromFile(PathBuf),
}

impl Default for SymmetryGroupDetectionInputKind {
    fn default() -> Self {
        SymmetryGroupDetectionInputKind::Parameters(SymmetryGroupDetectionParams::default())
    }
}

/// A structure containing `QFock` input parameters which can be serialised into and deserialised
/// from a YAML input file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Input {
    /// The molecule. Required by symmetry-group detection from parameters and by the
    /// nuclear-repulsion report.
    #[serde(default)]
    pub molecule: Option<InputMolecule>,

    /// Specification for symmetry-group detection. If `None`, no symmetry-group detection will be
    /// performed.
    #[serde(default)]
    pub symmetry_group_detection: Option<SymmetryGroupDetectionInputKind>,

    /// Specification for a G-matrix build. If `None`, no G matrix will be built.
    #[serde(default)]
    pub g_matrix: Option<GMatrixParams>,

    /// Boolean indicating if the nuclear repulsion energy of the molecule is to be reported.
    #[serde(default)]
    pub nuclear_repulsion: bool,
}

impl Input {
    fn molecule(&self) -> Result<Molecule, anyhow::Error> {
        self.molecule
            .as_ref()
            .ok_or_else(|| format_err!("No molecule specified in the input."))?
            .to_molecule(INPUT_GEOMETRY_THRESHOLD)
    }

    fn handle_symmetry_group_detection(
        &self,
        sgd: &SymmetryGroupDetectionInputKind,
    ) -> Result<SymmetryGroupDetectionResult, anyhow::Error> {
        match sgd {
            SymmetryGroupDetectionInputKind::Parameters(params) => {
                let mol = self.molecule()?;
                let mut sgd_driver = SymmetryGroupDetectionDriver::builder()
                    .parameters(params)
                    .molecule(Some(&mol))
                    .build()?;
                sgd_driver.run()?;
                sgd_driver.result().cloned()
            }
            SymmetryGroupDetectionInputKind::FromFile(name) => {
                log_title("Symmetry-Group Detection");
                qfock_output!("");
                qfock_output!(
                    "Reading symmetry-group detection results from {}.{}",
                    name.display(),
                    QFockFileType::Sym.ext()
                );
                let res: SymmetryGroupDetectionResult =
                    read_qfock_binary(name, QFockFileType::Sym)?;
                res.log_output_display();
                qfock_output!("");
                Ok(res)
            }
        }
    }
}

impl InputHandle for Input {
    fn handle(&self) -> Result<(), anyhow::Error> {
        if let Some(sgd) = self.symmetry_group_detection.as_ref() {
            let res = self.handle_symmetry_group_detection(sgd)?;
            log::debug!("Input symmetry-group detection gave {}.", res.molecular_symmetry.group_name());
        }

        if self.nuclear_repulsion {
            let mol = self.molecule()?;
            log_subtitle("Nuclear repulsion");
            qfock_output!("");
            qfock_output!("Nuclear repulsion energy: {:>20.12} a.u.", nuclear_repulsion(&mol));
            qfock_output!("");
        }

        if let Some(gm_params) = self.g_matrix.as_ref() {
            let mut gm_driver = GMatrixDriver::builder().parameters(gm_params).build()?;
            gm_driver.run()?;
        }

        Ok(())
    }
}
