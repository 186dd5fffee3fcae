//! Total-energy calculations dispatched over electronic-structure methods.
//!
//! The individual solvers live outside this crate and are reached through the [`EnergySolver`]
//! trait. This module resolves the requested [`Method`] once, builds the symmetry object that every
//! solver receives explicitly, and assembles the total energy from the electronic,
//! nuclear-repulsion, and correlation contributions.

use std::fmt;
use std::str::FromStr;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use log;
use rayon;
use serde::{Deserialize, Serialize};

use crate::auxiliary::molecule::{CentreKind, Molecule};
use crate::drivers::QFockDriver;
use crate::io::format::{log_subtitle, log_title, nice_bool, qfock_output, QFockOutput};
use crate::symmetry::symmetry_core::MolecularSymmetry;

#[cfg(test)]
#[path = "energy_tests.rs"]
mod energy_tests;

// ==================
// Method definitions
// ==================

/// An enumerated type for exchange functionals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeFunctional {
    /// Slater exchange, tagged `S`.
    Slater,
}

impl FromStr for ExchangeFunctional {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_uppercase().as_str() {
            "S" => Ok(Self::Slater),
            _ => Err(format_err!("Unknown exchange functional `{tag}`.")),
        }
    }
}

impl fmt::Display for ExchangeFunctional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slater => write!(f, "S"),
        }
    }
}

/// An enumerated type for correlation functionals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorrelationFunctional {
    /// No correlation functional, tagged by an empty string.
    #[default]
    None,

    /// The Vosko–Wilk–Nusair functional III, tagged `VWN3`.
    Vwn3,
}

impl FromStr for CorrelationFunctional {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_uppercase().as_str() {
            "" => Ok(Self::None),
            "VWN3" => Ok(Self::Vwn3),
            _ => Err(format_err!("Unknown correlation functional `{tag}`.")),
        }
    }
}

impl fmt::Display for CorrelationFunctional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, ""),
            Self::Vwn3 => write!(f, "VWN3"),
        }
    }
}

/// An enumerated type for the supported electronic-structure methods.
///
/// A method is written as a tag such as `RHF`, `CCSD(T)`, or `DFT:S:VWN3`, where a density
/// functional is specified by its exchange and correlation tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Restricted Hartree–Fock.
    Rhf,

    /// Unrestricted Hartree–Fock.
    Uhf,

    /// Generalised unrestricted Hartree–Fock.
    Guhf,

    /// Second-order Møller–Plesset perturbation theory on a restricted reference.
    Mp2,

    /// Coupled-cluster singles and doubles on a restricted reference.
    Ccsd,

    /// Coupled-cluster singles and doubles with perturbative triples on a restricted reference.
    CcsdT,

    /// Time-dependent Hartree–Fock on a restricted reference.
    Tdhf,

    /// Configuration interaction singles (the Tamm–Dancoff approximation) on a restricted
    /// reference.
    Cis,

    /// Restricted Kohn–Sham density-functional theory.
    Dft {
        exchange: ExchangeFunctional,
        correlation: CorrelationFunctional,
    },
}

impl Method {
    /// Checks if the method requires a closed-shell restricted reference.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Self::Uhf | Self::Guhf)
    }

    /// The self-consistent-field method on top of which this method is built, if any.
    #[must_use]
    pub fn reference(&self) -> Option<Method> {
        match self {
            Self::Mp2 | Self::Ccsd | Self::CcsdT | Self::Tdhf | Self::Cis => Some(Self::Rhf),
            _ => None,
        }
    }
}

impl FromStr for Method {
    type Err = anyhow::Error;

    /// Parses a method tag, ignoring case and surrounding whitespace.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let upper = tag.trim().to_uppercase();
        let mut parts = upper.split(':');
        let head = parts.next().unwrap_or_default();
        let method = match head {
            "RHF" => Self::Rhf,
            "UHF" => Self::Uhf,
            "GUHF" => Self::Guhf,
            "MP2" => Self::Mp2,
            "CCSD" => Self::Ccsd,
            "CCSD(T)" => Self::CcsdT,
            "TDHF" => Self::Tdhf,
            "CIS" => Self::Cis,
            "DFT" => {
                let exchange = parts
                    .next()
                    .ok_or_else(|| format_err!("No exchange functional given in `{tag}`."))?
                    .parse()?;
                let correlation = parts.next().unwrap_or_default().parse()?;
                Self::Dft {
                    exchange,
                    correlation,
                }
            }
            _ => return Err(format_err!("Unknown method `{tag}`.")),
        };
        ensure!(
            parts.next().is_none(),
            "Unexpected trailing options in method `{tag}`."
        );
        Ok(method)
    }
}

impl TryFrom<String> for Method {
    type Error = anyhow::Error;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rhf => write!(f, "RHF"),
            Self::Uhf => write!(f, "UHF"),
            Self::Guhf => write!(f, "GUHF"),
            Self::Mp2 => write!(f, "MP2"),
            Self::Ccsd => write!(f, "CCSD"),
            Self::CcsdT => write!(f, "CCSD(T)"),
            Self::Tdhf => write!(f, "TDHF"),
            Self::Cis => write!(f, "CIS"),
            Self::Dft {
                exchange,
                correlation: CorrelationFunctional::None,
            } => write!(f, "DFT:{exchange}"),
            Self::Dft {
                exchange,
                correlation,
            } => write!(f, "DFT:{exchange}:{correlation}"),
        }
    }
}

/// Computes the nuclear repulsion energy $`\sum_{i<j} Z_i Z_j / r_{ij}`$.
#[must_use]
pub fn nuclear_repulsion(molecule: &Molecule) -> f64 {
    molecule.coulomb_matrix().sum() / 2.0
}

// ============
// Solver seam
// ============

/// Trait for electronic-structure solvers that compute energies for a resolved method.
pub trait EnergySolver: Sync {
    /// Computes the electronic energy and the correlation energy.
    ///
    /// # Arguments
    ///
    /// * `method` - The resolved method.
    /// * `molecule` - The molecule in the frame of `symmetry`.
    /// * `symmetry` - The symmetry object of the calculation.
    /// * `electrons` - The number of electrons.
    /// * `multiplicity` - The spin multiplicity.
    ///
    /// # Returns
    ///
    /// The pair `(electronic energy, correlation energy)`. Self-consistent-field methods return a
    /// zero correlation energy.
    ///
    /// # Errors
    ///
    /// Errors if the solver fails.
    fn energies(
        &self,
        method: &Method,
        molecule: &Molecule,
        symmetry: &MolecularSymmetry,
        electrons: usize,
        multiplicity: usize,
    ) -> Result<(f64, f64), anyhow::Error>;
}

// ==========
// Parameters
// ==========

/// A structure containing control parameters for energy calculations.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct EnergyParams {
    /// The number of electrons.
    pub electrons: usize,

    /// The spin multiplicity $`2S + 1`$.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    pub multiplicity: usize,

    /// The number of threads available to the solver.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    pub processors: usize,

    /// The electronic-structure method.
    pub method: Method,

    /// Boolean indicating if point-group symmetry is to be detected and passed to the solver. If
    /// `false`, the solver receives the trivial group.
    #[builder(default = "false")]
    #[serde(default)]
    pub use_symmetry: bool,

    /// Threshold for moment-of-inertia comparisons in symmetry detection.
    #[builder(default = "1e-6")]
    #[serde(default = "default_moi_threshold")]
    pub moi_threshold: f64,

    /// The reference point placed at the origin in symmetry detection.
    #[builder(default)]
    #[serde(default)]
    pub centre_kind: CentreKind,
}

fn default_one() -> usize {
    1
}

fn default_moi_threshold() -> f64 {
    1e-6
}

impl EnergyParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        let electrons = self.electrons.ok_or("No electron count found.".to_string())?;
        let method = self.method.ok_or("No method found.".to_string())?;
        check_electronic_state(
            electrons,
            self.multiplicity.unwrap_or(1),
            self.processors.unwrap_or(1),
            &method,
        )
    }
}

impl EnergyParams {
    /// Returns a builder to construct an [`EnergyParams`] structure.
    #[must_use]
    pub fn builder() -> EnergyParamsBuilder {
        EnergyParamsBuilder::default()
    }

    /// Checks that the parameters describe a valid electronic state.
    ///
    /// # Errors
    ///
    /// Errors if the multiplicity or the processor count is zero, if the multiplicity is
    /// inconsistent with the electron count, or if a restricted method is requested for an
    /// open-shell state.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        check_electronic_state(
            self.electrons,
            self.multiplicity,
            self.processors,
            &self.method,
        )
        .map_err(|err| format_err!(err))
    }
}

fn check_electronic_state(
    electrons: usize,
    multiplicity: usize,
    processors: usize,
    method: &Method,
) -> Result<(), String> {
    if multiplicity == 0 {
        return Err("The multiplicity must be at least 1.".to_string());
    }
    if processors == 0 {
        return Err("At least one processor is required.".to_string());
    }
    let unpaired = multiplicity - 1;
    if unpaired > electrons || (electrons - unpaired) % 2 != 0 {
        return Err(format!(
            "A multiplicity of {multiplicity} is impossible with {electrons} electrons."
        ));
    }
    if method.is_restricted() && multiplicity != 1 {
        return Err(format!(
            "The restricted method {method} requires a singlet, but a multiplicity of \
            {multiplicity} was given."
        ));
    }
    Ok(())
}

impl fmt::Display for EnergyParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Method: {}", self.method)?;
        writeln!(f, "Electrons: {}", self.electrons)?;
        writeln!(f, "Multiplicity: {}", self.multiplicity)?;
        writeln!(f, "Processors: {}", self.processors)?;
        writeln!(f, "Use point-group symmetry: {}", nice_bool(self.use_symmetry))?;
        if self.use_symmetry {
            writeln!(f, "  MoI threshold: {:.3e}", self.moi_threshold)?;
            writeln!(f, "  Centre: {}", self.centre_kind)?;
        }
        Ok(())
    }
}

// ======
// Result
// ======

/// A structure containing the energy contributions of a calculation, in hartree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnergyResult {
    /// The method used.
    pub method: Method,

    /// The label of the point group used by the solver.
    pub point_group: String,

    /// The nuclear repulsion energy.
    pub nuclear_repulsion: f64,

    /// The self-consistent-field electronic energy.
    pub scf: f64,

    /// The correlation energy.
    pub correlation: f64,

    /// The total energy, the sum of the three contributions above.
    pub total: f64,
}

impl fmt::Display for EnergyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Method: {} in {}", self.method, self.point_group)?;
        writeln!(f, "Nuclear repulsion energy: {:>20.12} a.u.", self.nuclear_repulsion)?;
        writeln!(f, "SCF energy:               {:>20.12} a.u.", self.scf)?;
        writeln!(f, "Correlation energy:       {:>20.12} a.u.", self.correlation)?;
        writeln!(f, "Total energy:             {:>20.12} a.u.", self.total)?;
        Ok(())
    }
}

// ======
// Driver
// ======

/// A driver for total-energy calculations.
#[derive(Builder)]
pub struct EnergyDriver<'a> {
    /// The control parameters.
    parameters: &'a EnergyParams,

    /// The molecule in its input frame.
    molecule: &'a Molecule,

    /// The solver computing the electronic and correlation energies.
    solver: &'a dyn EnergySolver,

    /// The symmetry object constructed for the calculation.
    #[builder(setter(skip), default = "None")]
    symmetry: Option<MolecularSymmetry>,

    #[builder(setter(skip), default = "None")]
    result: Option<EnergyResult>,
}

impl<'a> EnergyDriver<'a> {
    /// Returns a builder to construct an [`EnergyDriver`].
    #[must_use]
    pub fn builder() -> EnergyDriverBuilder<'a> {
        EnergyDriverBuilder::default()
    }

    /// The symmetry object passed to the solver, once the driver has run.
    #[must_use]
    pub fn symmetry(&self) -> Option<&MolecularSymmetry> {
        self.symmetry.as_ref()
    }

    fn calculate_energy(&mut self) -> Result<(), anyhow::Error> {
        log_title("Energy Calculation");
        qfock_output!("");
        let params = self.parameters;
        params.validate()?;
        params.log_output_display();
        qfock_output!("");

        let molsym = if params.use_symmetry {
            MolecularSymmetry::detect(self.molecule, params.centre_kind, params.moi_threshold)?
        } else {
            MolecularSymmetry::trivial(self.molecule)?
        };
        log::debug!("Symmetry object constructed in {}.", molsym.group_name());

        let nuclear_repulsion = nuclear_repulsion(self.molecule);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.processors)
            .build()?;
        let solver = self.solver;
        let (scf, correlation) = pool.install(|| {
            solver.energies(
                &params.method,
                &molsym.molecule,
                &molsym,
                params.electrons,
                params.multiplicity,
            )
        })?;

        let result = EnergyResult {
            method: params.method,
            point_group: molsym.group_name(),
            nuclear_repulsion,
            scf,
            correlation,
            total: scf + nuclear_repulsion + correlation,
        };
        log_subtitle("Energies");
        result.log_output_display();
        qfock_output!("");

        self.symmetry = Some(molsym);
        self.result = Some(result);
        Ok(())
    }
}

impl<'a> QFockDriver for EnergyDriver<'a> {
    type Params = EnergyParams;

    type Outcome = EnergyResult;

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.calculate_energy()
    }

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No energy calculation results found."))
    }
}
