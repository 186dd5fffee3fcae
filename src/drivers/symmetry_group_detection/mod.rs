//! Driver for symmetry-group detection.

use std::cmp::Ordering;
use std::fmt;

use anyhow::{self, bail, ensure, format_err};
use derive_builder::Builder;
use itertools::Itertools;
use log;
use serde::{Deserialize, Serialize};

use crate::auxiliary::molecule::{CentreKind, Molecule};
use crate::drivers::QFockDriver;
use crate::io::format::{
    log_subtitle, log_title, nice_bool, qfock_error, qfock_output, write_subtitle, QFockOutput,
};
use crate::io::{write_qfock_binary, QFockFileType};
use crate::symmetry::symmetry_core::{MolecularSymmetry, Symmetry};
use crate::symmetry::symmetry_element::SymmetryElementKind;


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// A structure containing control parameters for symmetry-group detection.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SymmetryGroupDetectionParams {
    /// Thresholds for moment-of-inertia comparisons. A single value gives fixed-threshold
    /// detection; several values opt into a scan over every threshold pair.
    #[builder(setter(custom), default = "default_thresholds()")]
    #[serde(default = "default_thresholds")]
    pub moi_thresholds: Vec<f64>,

    /// Thresholds for distance and geometry comparisons.
    #[builder(setter(custom), default = "default_thresholds()")]
    #[serde(default = "default_thresholds")]
    pub distance_thresholds: Vec<f64>,

    /// The reference point to be brought to the origin.
    #[builder(default)]
    #[serde(default)]
    pub centre_kind: CentreKind,

    /// Boolean indicating if a summary of the located symmetry elements is to be written to the
    /// output.
    #[builder(default = "false")]
    #[serde(default)]
    pub write_symmetry_elements: bool,

    /// Optional name for saving the result as a binary file of type [`QFockFileType::Sym`]. If
    /// `None`, the result will not be saved.
    #[builder(default = "None")]
    #[serde(default)]
    pub result_save_name: Option<String>,
}

fn default_thresholds() -> Vec<f64> {
    vec![1.0e-6]
}

impl SymmetryGroupDetectionParams {
    /// Returns a builder to construct a [`SymmetryGroupDetectionParams`] structure.
    #[must_use]
    pub fn builder() -> SymmetryGroupDetectionParamsBuilder {
        SymmetryGroupDetectionParamsBuilder::default()
    }
}

impl Default for SymmetryGroupDetectionParams {
    fn default() -> Self {
        Self {
            moi_thresholds: default_thresholds(),
            distance_thresholds: default_thresholds(),
            centre_kind: CentreKind::default(),
            write_symmetry_elements: false,
            result_save_name: None,
        }
    }
}

impl SymmetryGroupDetectionParamsBuilder {
    pub fn moi_thresholds(&mut self, threshs: &[f64]) -> &mut Self {
        self.moi_thresholds = Some(threshs.to_vec());
        self
    }

    pub fn distance_thresholds(&mut self, threshs: &[f64]) -> &mut Self {
        self.distance_thresholds = Some(threshs.to_vec());
        self
    }

    fn validate(&self) -> Result<(), String> {
        let positive = |threshs: &Option<Vec<f64>>| {
            threshs
                .as_ref()
                .map_or(true, |ts| !ts.is_empty() && ts.iter().all(|t| *t > 0.0))
        };
        if !positive(&self.moi_thresholds) {
            return Err("MoI thresholds must be non-empty and strictly positive.".to_string());
        }
        if !positive(&self.distance_thresholds) {
            return Err("Distance thresholds must be non-empty and strictly positive.".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for SymmetryGroupDetectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nthreshs = self.moi_thresholds.len() * self.distance_thresholds.len();
        if nthreshs == 1 {
            writeln!(f, "Fixed thresholds:")?;
            writeln!(f, "  MoI threshold: {:.3e}", self.moi_thresholds[0])?;
            writeln!(f, "  Geo threshold: {:.3e}", self.distance_thresholds[0])?;
        } else {
            writeln!(f, "Variable thresholds:")?;
            writeln!(
                f,
                "  MoI thresholds: {}",
                self.moi_thresholds
                    .iter()
                    .map(|v| format!("{v:.3e}"))
                    .join(", ")
            )?;
            writeln!(
                f,
                "  Geo thresholds: {}",
                self.distance_thresholds
                    .iter()
                    .map(|v| format!("{v:.3e}"))
                    .join(", ")
            )?;
        }
        writeln!(f, "Origin: {}", self.centre_kind)?;
        writeln!(
            f,
            "Report symmetry elements/generators: {}",
            nice_bool(self.write_symmetry_elements)
        )?;
        writeln!(
            f,
            "Save symmetry-group detection results to file: {}",
            if let Some(name) = self.result_save_name.as_ref() {
                format!("{name}.{}", QFockFileType::Sym.ext())
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

/// A structure to contain symmetry-group detection results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymmetryGroupDetectionResult {
    /// The control parameters used to obtain this set of results.
    pub parameters: SymmetryGroupDetectionParams,

    /// The MoI threshold at which the reported group was found.
    pub moi_threshold: f64,

    /// The distance threshold at which the reported group was found.
    pub distance_threshold: f64,

    /// The symmetry object of the highest group found.
    pub molecular_symmetry: MolecularSymmetry,
}

impl SymmetryGroupDetectionResult {
    /// Writes the symmetry elements and generators found in a nicely formatted table.
    fn write_symmetry_elements(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = &self.molecular_symmetry.symmetry;
        write_subtitle(
            f,
            &format!("Symmetry element report for group {}", sym.point_group),
        )?;
        writeln!(f)?;
        write_element_table(f, sym)?;
        writeln!(f)?;
        writeln!(
            f,
            "Generators: {}",
            sym.iter_generators().map(|g| g.get_standard_symbol()).join(", ")
        )?;
        for (generator, perm) in sym
            .iter_generators()
            .zip(self.molecular_symmetry.generator_permutations.iter())
        {
            writeln!(f, "  {generator}: [{}]", perm.iter().join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for SymmetryGroupDetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = &self.molecular_symmetry.symmetry;
        let n_elements = sym.n_elements();
        writeln!(
            f,
            "Highest group found: {} ({} {}){}",
            sym.point_group,
            n_elements,
            if n_elements != 1 {
                "symmetry elements"
            } else {
                "symmetry element"
            },
            if sym.linear { ", linear approximant" } else { "" }
        )?;
        writeln!(f, "  Associated MoI threshold: {:.3e}", self.moi_threshold)?;
        writeln!(f, "  Associated geo threshold: {:.3e}", self.distance_threshold)?;
        writeln!(
            f,
            "Symmetry-equivalent nuclei: {}",
            self.molecular_symmetry
                .sea_sets
                .iter()
                .map(|set| format!("{{{}}}", set.iter().join(", ")))
                .join(" ")
        )?;

        if self.parameters.write_symmetry_elements {
            writeln!(f)?;
            self.write_symmetry_elements(f)?;
        }

        Ok(())
    }
}

// ------
// Driver
// ------

/// A driver for symmetry-group detection.
#[derive(Clone, Builder)]
pub struct SymmetryGroupDetectionDriver<'a> {
    /// The control parameters for symmetry group detection.
    parameters: &'a SymmetryGroupDetectionParams,

    /// A path to a `.xyz` file specifying the geometry of the molecule for symmetry analysis.
    /// Only one of this or [`Self::molecule`] should be specified.
    #[builder(default = "None")]
    xyz: Option<String>,

    /// A molecule for symmetry analysis. Only one of this or [`Self::xyz`] should be specified.
    #[builder(default = "None")]
    molecule: Option<&'a Molecule>,

    /// The result of the symmetry-group detection.
    #[builder(setter(skip), default = "None")]
    result: Option<SymmetryGroupDetectionResult>,
}

impl<'a> SymmetryGroupDetectionDriver<'a> {
    /// Returns a builder to construct a [`SymmetryGroupDetectionDriver`] structure.
    #[must_use]
    pub fn builder() -> SymmetryGroupDetectionDriverBuilder<'a> {
        SymmetryGroupDetectionDriverBuilder::default()
    }

    /// Constructs the target molecule with a given distance threshold.
    fn target_molecule(&self, dist_thresh: f64) -> Result<Molecule, anyhow::Error> {
        match (self.molecule, self.xyz.as_ref()) {
            (Some(molecule), None) => Molecule::from_atoms(&molecule.atoms, dist_thresh),
            (None, Some(xyz)) => Molecule::from_xyz(xyz, dist_thresh),
            _ => bail!("Neither or both `molecule` and `xyz` are specified."),
        }
    }

    /// Executes symmetry-group detection.
    fn detect_symmetry_group(&mut self) -> Result<(), anyhow::Error> {
        log_title("Symmetry-Group Detection");
        qfock_output!("");
        let params = self.parameters;
        params.log_output_display();
        qfock_output!("");
        ensure!(
            !params.moi_thresholds.is_empty() && !params.distance_thresholds.is_empty(),
            "No thresholds specified for symmetry-group detection."
        );

        let smallest_dist_thresh = params
            .distance_thresholds
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let target_mol = self.target_molecule(smallest_dist_thresh)?;
        qfock_output!("Molecule for symmetry-group detection:");
        target_mol.log_output_display();
        qfock_output!("");

        let threshs = params
            .moi_thresholds
            .iter()
            .cartesian_product(params.distance_thresholds.iter())
            .collect_vec();
        let count_length = threshs.len().to_string().len() + 1;

        log_subtitle("Threshold-scanning symmetry-group detection");
        qfock_output!("");
        qfock_output!("{}", "┈".repeat(count_length + 48));
        qfock_output!(
            "{:>width$} {:>12} {:>12} {:>12} {:>9}",
            "#",
            "MoI thresh",
            "Geo thresh",
            "Group",
            "Elements",
            width = count_length
        );
        qfock_output!("{}", "┈".repeat(count_length + 48));
        let syms = threshs
            .iter()
            .enumerate()
            .filter_map(|(i, (moi_thresh, dist_thresh))| {
                let detected = self.target_molecule(**dist_thresh).and_then(|mol| {
                    MolecularSymmetry::detect(&mol, params.centre_kind, **moi_thresh)
                });
                match detected {
                    Ok(molsym) => {
                        qfock_output!(
                            "{:>width$} {:>12.3e} {:>12.3e} {:>12} {:>9}",
                            i + 1,
                            moi_thresh,
                            dist_thresh,
                            molsym.point_group(),
                            molsym.symmetry.n_elements(),
                            width = count_length
                        );
                        Some((**moi_thresh, **dist_thresh, molsym))
                    }
                    Err(err) => {
                        log::debug!(
                            "Group detection with MoI threshold {moi_thresh:.3e} and distance \
                            threshold {dist_thresh:.3e} has failed: {err}"
                        );
                        qfock_output!(
                            "{:>width$} {:>12.3e} {:>12.3e} {:>12} {:>9}",
                            i + 1,
                            moi_thresh,
                            dist_thresh,
                            "--",
                            "--",
                            width = count_length
                        );
                        None
                    }
                }
            })
            .collect_vec();
        qfock_output!("{}", "┈".repeat(count_length + 48));
        qfock_output!("");

        let Some((moi_threshold, distance_threshold, molecular_symmetry)) = syms
            .into_iter()
            .max_by(|(moi_a, dist_a, sym_a), (moi_b, dist_b, sym_b)| {
                compare_detections((*moi_a, *dist_a, sym_a), (*moi_b, *dist_b, sym_b))
            })
        else {
            qfock_error!("Symmetry-group detection failed at every threshold.");
            bail!("Unable to identify the highest-symmetry group.");
        };

        let result = SymmetryGroupDetectionResult {
            parameters: params.clone(),
            moi_threshold,
            distance_threshold,
            molecular_symmetry,
        };
        result.log_output_display();
        qfock_output!("");

        // Save symmetry-group detection result, if requested
        if let Some(name) = params.result_save_name.as_ref() {
            write_qfock_binary(name, QFockFileType::Sym, &result)?;
            qfock_output!(
                "Symmetry-group detection results saved as {name}.{}.",
                QFockFileType::Sym.ext()
            );
            qfock_output!("");
        }

        self.result = Some(result);
        Ok(())
    }
}

impl QFockDriver for SymmetryGroupDetectionDriver<'_> {
    type Params = SymmetryGroupDetectionParams;

    type Outcome = SymmetryGroupDetectionResult;

    fn run(&mut self) -> Result<(), anyhow::Error> {
        self.detect_symmetry_group()
    }

    fn result(&self) -> Result<&Self::Outcome, anyhow::Error> {
        self.result
            .as_ref()
            .ok_or_else(|| format_err!("No symmetry-group detection results found."))
    }
}

// =========
// Functions
// =========

/// Orders two detection outcomes: more symmetry elements first, then tighter MoI thresholds, then
/// tighter distance thresholds.
fn compare_detections(
    (moi_a, dist_a, sym_a): (f64, f64, &MolecularSymmetry),
    (moi_b, dist_b, sym_b): (f64, f64, &MolecularSymmetry),
) -> Ordering {
    sym_a
        .symmetry
        .n_elements()
        .cmp(&sym_b.symmetry.n_elements())
        .then_with(|| moi_b.total_cmp(&moi_a))
        .then_with(|| dist_b.total_cmp(&dist_a))
}

/// Writes symmetry elements in a [`Symmetry`] structure in a nicely formatted table.
fn write_element_table(f: &mut fmt::Formatter<'_>, sym: &Symmetry) -> fmt::Result {
    sym.elements
        .iter()
        .sorted_by_key(|(kind, _)| !matches!(kind, SymmetryElementKind::Proper))
        .try_for_each(|(kind, kind_elements)| {
            writeln!(f, "> {kind} elements")?;
            writeln!(f, "{}", "┈".repeat(46))?;
            writeln!(f, "{:>7} {:>11}  {:>11}  {:>11}", "Symbol", "x", "y", "z")?;
            writeln!(f, "{}", "┈".repeat(46))?;
            kind_elements
                .iter()
                .sorted_by_key(|(order, _)| **order)
                .try_for_each(|(order, order_elements)| {
                    writeln!(f, " Order: {order}")?;
                    order_elements.iter().try_for_each(|element| {
                        writeln!(
                            f,
                            "{:>7} {:>+11.7}  {:>+11.7}  {:>+11.7}",
                            element.get_standard_symbol(),
                            element.axis[0] + 0.0,
                            element.axis[1] + 0.0,
                            element.axis[2] + 0.0,
                        )
                    })
                })?;
            writeln!(f, "{}", "┈".repeat(46))
        })
}
