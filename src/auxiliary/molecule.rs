//! Molecules as ordered arrays of nuclei.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{self, bail, format_err};
use itertools::Itertools;
use log;
use nalgebra::{Matrix3, Point3, Vector3};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::auxiliary::atom::{Atom, ELEMENT_MAP};
use crate::auxiliary::geometry::Transform;

#[cfg(test)]
#[path = "molecule_tests.rs"]
mod molecule_tests;

/// An enumerated type for the reference point that is brought to the origin when a molecule is
/// centred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentreKind {
    /// The centre of mass.
    #[default]
    CentreOfMass,

    /// The centre of nuclear charge.
    CentreOfCharge,
}

impl fmt::Display for CentreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentreKind::CentreOfMass => write!(f, "centre of mass"),
            CentreKind::CentreOfCharge => write!(f, "centre of nuclear charge"),
        }
    }
}

/// A struct containing the nuclei constituting a molecule.
///
/// The order of the nuclei is significant as basis-function indices elsewhere are aligned with it,
/// and is preserved by every transformation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Molecule {
    /// The atoms constituting this molecule.
    pub atoms: Vec<Atom>,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Molecule {
    /// Constructs a molecule from a list of atoms.
    ///
    /// # Arguments
    ///
    /// * `all_atoms` - The list of atoms.
    /// * `thresh` - A threshold for approximate equality comparisons. This overrides the
    /// thresholds of the individual atoms.
    ///
    /// # Errors
    ///
    /// Errors if the list is empty or if two nuclei occupy the same position.
    pub fn from_atoms(all_atoms: &[Atom], thresh: f64) -> Result<Self, anyhow::Error> {
        if all_atoms.is_empty() {
            bail!("A molecule must contain at least one nucleus.");
        }
        let atoms = all_atoms
            .iter()
            .cloned()
            .map(|mut atom| {
                atom.threshold = thresh;
                atom
            })
            .collect_vec();
        if let Some((i, j)) = atoms
            .iter()
            .enumerate()
            .tuple_combinations()
            .find(|((_, atom_i), (_, atom_j))| {
                (atom_i.coordinates - atom_j.coordinates).norm() < thresh
            })
            .map(|((i, _), (j, _))| (i, j))
        {
            bail!("Nuclei {i} and {j} occupy the same position.");
        }
        Ok(Molecule {
            atoms,
            threshold: thresh,
        })
    }

    /// Parses an `xyz` file to construct a molecule.
    ///
    /// The coordinates are read in as given and are taken to be in the same length unit as the
    /// two-electron integrals.
    ///
    /// # Arguments
    ///
    /// * `filename` - The `xyz` file to be parsed.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The parsed [`Molecule`] struct.
    pub fn from_xyz<P: AsRef<Path>>(filename: P, thresh: f64) -> Result<Self, anyhow::Error> {
        let filename = filename.as_ref();
        let contents = fs::read_to_string(filename).map_err(|err| {
            format_err!("Unable to read file {}: {err}", filename.display())
        })?;

        let mut lines = contents.lines();
        let n_atoms = lines
            .next()
            .ok_or_else(|| format_err!("Empty xyz file {}.", filename.display()))?
            .trim()
            .parse::<usize>()
            .map_err(|err| format_err!("Unable to parse the number of atoms: {err}"))?;
        let atoms = lines
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                Atom::from_xyz(line, &ELEMENT_MAP, thresh)
                    .ok_or_else(|| format_err!("Unable to parse atom line `{line}`."))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if atoms.len() != n_atoms {
            bail!("Expected {} atoms, got {} instead.", n_atoms, atoms.len());
        }
        Self::from_atoms(&atoms, thresh)
    }

    /// Calculates the centre of mass of the molecule.
    #[must_use]
    pub fn calc_com(&self) -> Point3<f64> {
        self.calc_weighted_centre(|atom| atom.atomic_mass)
    }

    /// Calculates the centre of nuclear charge of the molecule.
    #[must_use]
    pub fn calc_coc(&self) -> Point3<f64> {
        self.calc_weighted_centre(|atom| f64::from(atom.atomic_number))
    }

    /// Calculates the required reference point of the molecule.
    #[must_use]
    pub fn calc_centre(&self, kind: CentreKind) -> Point3<f64> {
        match kind {
            CentreKind::CentreOfMass => self.calc_com(),
            CentreKind::CentreOfCharge => self.calc_coc(),
        }
    }

    fn calc_weighted_centre<F: Fn(&Atom) -> f64>(&self, weight: F) -> Point3<f64> {
        let tot_w: f64 = self.atoms.iter().map(&weight).sum();
        let weighted = self.atoms.iter().fold(Vector3::zeros(), |acc, atom| {
            acc + weight(atom) * atom.coordinates.coords
        });
        Point3::from(weighted / tot_w)
    }

    /// Translates in-place the molecule so that the required reference point is at the origin.
    ///
    /// The translation is always applied. A reference point that is off the origin by less than
    /// [`Self::threshold`] is still moved, since symmetry operations act about the origin and
    /// would double any residual offset.
    pub fn centre_mut(&mut self, kind: CentreKind) {
        let centre = self.calc_centre(kind);
        log::debug!(
            "Translating {kind} ({:+.7e}, {:+.7e}, {:+.7e}) to the origin.",
            centre[0],
            centre[1],
            centre[2]
        );
        self.translate_mut(&-centre.coords);
    }

    /// Clones and centres the molecule on the required reference point.
    #[must_use]
    pub fn centre(&self, kind: CentreKind) -> Self {
        let mut centred_mol = self.clone();
        centred_mol.centre_mut(kind);
        centred_mol
    }

    /// Calculates the inertia tensor of the molecule.
    ///
    /// # Arguments
    ///
    /// * `origin` - An origin about which the inertia tensor is evaluated.
    ///
    /// # Returns
    ///
    /// The inertia tensor as a $`3 \times 3`$ matrix.
    #[must_use]
    pub fn calc_inertia_tensor(&self, origin: &Point3<f64>) -> Matrix3<f64> {
        let mut inertia_tensor = Matrix3::zeros();
        for atom in &self.atoms {
            let rel_coordinates: Vector3<f64> = atom.coordinates - origin;
            for i in 0..3 {
                for j in 0..=i {
                    if i == j {
                        inertia_tensor[(i, j)] += atom.atomic_mass
                            * (rel_coordinates.norm_squared()
                                - rel_coordinates[i] * rel_coordinates[j]);
                    } else {
                        inertia_tensor[(i, j)] -=
                            atom.atomic_mass * rel_coordinates[i] * rel_coordinates[j];
                        inertia_tensor[(j, i)] -=
                            atom.atomic_mass * rel_coordinates[j] * rel_coordinates[i];
                    }
                }
            }
        }
        log::debug!("Inertia tensor:\n{}", inertia_tensor);
        inertia_tensor
    }

    /// Calculates the principal moments of inertia and the corresponding principal axes about the
    /// centre of mass.
    ///
    /// # Returns
    ///
    /// The principal moments in ascending order and the associated normalised axes.
    #[must_use]
    pub fn calc_moi(&self) -> ([f64; 3], [Vector3<f64>; 3]) {
        let inertia = self.calc_inertia_tensor(&self.calc_com());
        let eigen = inertia.symmetric_eigen();
        let order = (0..3)
            .sorted_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]))
            .collect_vec();
        let mois = [
            eigen.eigenvalues[order[0]],
            eigen.eigenvalues[order[1]],
            eigen.eigenvalues[order[2]],
        ];
        let axes = [
            eigen.eigenvectors.column(order[0]).normalize(),
            eigen.eigenvectors.column(order[1]).normalize(),
            eigen.eigenvectors.column(order[2]).normalize(),
        ];
        (mois, axes)
    }

    /// Calculates the moment of inertia of the molecule about an axis through the origin.
    #[must_use]
    pub fn calc_moi_about(&self, axis: &Vector3<f64>) -> f64 {
        let axis = axis.normalize();
        self.atoms
            .iter()
            .map(|atom| {
                let r = atom.coordinates.coords;
                atom.atomic_mass * (r.norm_squared() - r.dot(&axis).powi(2))
            })
            .sum()
    }

    /// Counts the nuclei lying on an axis through the origin.
    #[must_use]
    pub fn count_atoms_on_axis(&self, axis: &Vector3<f64>) -> usize {
        let axis = axis.normalize();
        self.atoms
            .iter()
            .filter(|atom| atom.coordinates.coords.cross(&axis).norm() < self.threshold)
            .count()
    }

    /// Counts the nuclei lying in a plane through the origin.
    ///
    /// # Arguments
    ///
    /// * `normal` - The normal of the plane.
    #[must_use]
    pub fn count_atoms_in_plane(&self, normal: &Vector3<f64>) -> usize {
        let normal = normal.normalize();
        self.atoms
            .iter()
            .filter(|atom| atom.coordinates.coords.dot(&normal).abs() < self.threshold)
            .count()
    }

    /// Checks if all nuclei lie on a single line.
    ///
    /// The line is taken through the two most distant nuclei; every other nucleus must lie
    /// within [`Self::threshold`] of it. Molecules of one or two nuclei are linear.
    #[must_use]
    pub fn check_linear(&self) -> bool {
        if self.atoms.len() < 3 {
            return true;
        }
        let Some((atom_a, atom_b)) = self
            .atoms
            .iter()
            .tuple_combinations()
            .max_by(|(a1, b1), (a2, b2)| {
                (a1.coordinates - b1.coordinates)
                    .norm()
                    .total_cmp(&(a2.coordinates - b2.coordinates).norm())
            })
        else {
            return true;
        };
        let direction = (atom_b.coordinates - atom_a.coordinates).normalize();
        self.atoms.iter().all(|atom| {
            (atom.coordinates - atom_a.coordinates)
                .cross(&direction)
                .norm()
                < self.threshold
        })
    }

    /// Finds the permutation relating another arrangement of the same nuclei to this molecule.
    ///
    /// # Returns
    ///
    /// A vector `p` such that `other.atoms[i]` is equivalent to `self.atoms[p[i]]`, or `None` if
    /// `other` is not a permutation of `self`.
    #[must_use]
    pub fn match_permutation(&self, other: &Molecule) -> Option<Vec<usize>> {
        if self.atoms.len() != other.atoms.len() {
            return None;
        }
        let mut used = vec![false; self.atoms.len()];
        other
            .atoms
            .iter()
            .map(|other_atom| {
                let index = self
                    .atoms
                    .iter()
                    .enumerate()
                    .position(|(j, atom)| !used[j] && atom.is_equivalent_to(other_atom))?;
                used[index] = true;
                Some(index)
            })
            .collect()
    }

    /// Computes the Coulomb matrix of the nuclei, $`Z_i Z_j / r_{ij}`$ off the diagonal and zero
    /// on it.
    #[must_use]
    pub fn coulomb_matrix(&self) -> Array2<f64> {
        let n = self.atoms.len();
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                0.0
            } else {
                let atom_i = &self.atoms[i];
                let atom_j = &self.atoms[j];
                f64::from(atom_i.atomic_number) * f64::from(atom_j.atomic_number)
                    / (atom_i.coordinates - atom_j.coordinates).norm()
            }
        })
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Molecule ({} nuclei):", self.atoms.len())?;
        for atom in &self.atoms {
            writeln!(f, "{atom}")?;
        }
        Ok(())
    }
}

impl Transform for Molecule {
    fn transform_mut(&mut self, mat: &Matrix3<f64>) {
        for atom in &mut self.atoms {
            atom.transform_mut(mat);
        }
    }

    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.rotate_mut(angle, axis);
        }
    }

    fn translate_mut(&mut self, tvec: &Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.translate_mut(tvec);
        }
    }

    fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let mut transformed_mol = self.clone();
        transformed_mol.transform_mut(mat);
        transformed_mol
    }

    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self {
        let mut rotated_mol = self.clone();
        rotated_mol.rotate_mut(angle, axis);
        rotated_mol
    }

    fn translate(&self, tvec: &Vector3<f64>) -> Self {
        let mut translated_mol = self.clone();
        translated_mol.translate_mut(tvec);
        translated_mol
    }
}

impl PartialEq for Molecule {
    /// Two molecules are equal if one is a permutation of the other within the threshold.
    fn eq(&self, other: &Self) -> bool {
        self.match_permutation(other).is_some()
    }
}
