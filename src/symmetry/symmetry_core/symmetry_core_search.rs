//! Brute-force search for symmetry elements.

use std::f64::consts::PI;

use divisors;
use itertools::Itertools;
use log;
use nalgebra::{Matrix3, Vector3};
use num::integer::gcd;
use rayon::prelude::*;

use crate::auxiliary::geometry;
use crate::rotsym::RotationalSymmetry;
use crate::symmetry::symmetry_core::{
    describe_axis, PreSymmetry, SymmetrySearch, LINEAR_APPROXIMANT_ORDER,
};
use crate::symmetry::symmetry_element::{SymmetryElement, SymmetryElementKind, ROT, SIG};

/// A set of like nuclei sharing the same height along, and the same distance from, an axis.
struct Ring {
    representative: usize,
    height: f64,
    radius: f64,
    size: usize,
}

impl PreSymmetry {
    /// Searches for all symmetry elements of the molecule by testing every candidate operation.
    ///
    /// Candidate axes are the principal axes of inertia, the nuclear position vectors, the
    /// midpoints and difference vectors of pairs of like nuclei, and the cross products of pairs
    /// of position vectors. For spherical tops, the normals of planes through triples of like
    /// nuclei equidistant from the origin are also included. Each candidate is tested as a
    /// rotation axis and as a plane normal; improper rotations are tested along the confirmed
    /// rotation axes. Candidates are tested in parallel but results keep the candidate order.
    ///
    /// # Returns
    ///
    /// The confirmed rotations, reflections, inversion status, and improper rotations.
    #[must_use]
    pub fn brute_force_symmetry(&self) -> SymmetrySearch {
        let axes = self.candidate_axes();
        log::debug!("{} distinct candidate axes generated.", axes.len());

        let rotations = axes
            .par_iter()
            .filter_map(|axis| {
                self.candidate_rotation_orders(axis)
                    .into_iter()
                    .find(|&order| {
                        let angle = 2.0 * PI / f64::from(order);
                        self.check_operation(&geometry::proper_rotation_matrix(angle, axis, 1))
                    })
                    .and_then(|order| self.make_element(ROT, order, axis))
            })
            .collect::<Vec<_>>();

        let reflections = axes
            .par_iter()
            .filter(|axis| self.check_operation(&geometry::reflection_matrix(axis)))
            .filter_map(|axis| self.make_element(SIG, 1, axis))
            .collect::<Vec<_>>();

        let inversion = self.check_operation(&(-Matrix3::identity()));

        let improper_rotations = rotations
            .par_iter()
            .filter_map(|rotation| {
                let n = rotation.order;
                [2 * n, n]
                    .into_iter()
                    .filter(|&k| k >= 3)
                    .find(|&k| {
                        let angle = 2.0 * PI / f64::from(k);
                        self.check_operation(&geometry::improper_rotation_matrix(
                            angle,
                            &rotation.axis,
                            1,
                        ))
                    })
                    .and_then(|k| self.make_element(SIG, k, &rotation.axis))
            })
            .collect::<Vec<_>>();

        let thresh = self.dist_threshold;
        for element in rotations
            .iter()
            .chain(reflections.iter())
            .chain(improper_rotations.iter())
        {
            log::debug!(
                "Found {} along {}.",
                element.get_standard_symbol(),
                describe_axis(&element.axis, thresh)
            );
        }
        if inversion {
            log::debug!("Found the inversion centre.");
        }

        SymmetrySearch {
            rotations,
            reflections,
            inversion,
            improper_rotations,
        }
    }

    /// Generates the distinct candidate axes, each as a normalised standard positive pole.
    pub(super) fn candidate_axes(&self) -> Vec<Vector3<f64>> {
        let thresh = self.dist_threshold;
        let atoms = &self.molecule.atoms;
        let positions = atoms
            .iter()
            .map(|atom| atom.coordinates.coords)
            .collect_vec();

        let (_, principal_axes) = self.molecule.calc_moi();
        let mut candidates = principal_axes.to_vec();
        candidates.extend(positions.iter().copied());
        for (i, j) in (0..atoms.len()).tuple_combinations() {
            candidates.push(positions[i].cross(&positions[j]));
            if atoms[i].is_same_nucleus(&atoms[j]) {
                candidates.push((positions[i] + positions[j]) / 2.0);
                candidates.push(positions[i] - positions[j]);
            }
        }
        if self.rotational_symmetry == RotationalSymmetry::Spherical {
            let equidistant = |a: usize, b: usize| {
                atoms[a].is_same_nucleus(&atoms[b])
                    && (positions[a].norm() - positions[b].norm()).abs() < thresh
            };
            for (i, j, k) in (0..atoms.len()).tuple_combinations() {
                if positions[i].norm() > thresh && equidistant(i, j) && equidistant(i, k) {
                    let (rij, rik) = (positions[j] - positions[i], positions[k] - positions[i]);
                    candidates.push(rij.cross(&rik));
                }
            }
        }

        candidates
            .into_iter()
            .filter(|axis| axis.norm() > thresh)
            .map(|axis| geometry::get_standard_positive_pole(&axis, thresh))
            .fold(vec![], |mut unique: Vec<Vector3<f64>>, axis| {
                if !unique
                    .iter()
                    .any(|existing| geometry::check_parallel(existing, &axis, thresh))
                {
                    unique.push(axis);
                }
                unique
            })
    }

    /// Determines the rotation orders worth testing along an axis.
    ///
    /// The off-axis nuclei are grouped into rings of like nuclei with a common height along and a
    /// common distance from the axis. Any rotation about the axis permutes each ring, so its order
    /// divides the size of every ring.
    ///
    /// # Returns
    ///
    /// The divisors greater than 1 of the greatest common divisor of the ring sizes, in
    /// descending order. An axis carrying every nucleus yields [`LINEAR_APPROXIMANT_ORDER`].
    pub(super) fn candidate_rotation_orders(&self, axis: &Vector3<f64>) -> Vec<u32> {
        let thresh = self.dist_threshold;
        let atoms = &self.molecule.atoms;
        let axis = axis.normalize();
        let mut rings: Vec<Ring> = vec![];
        for (i, atom) in atoms.iter().enumerate() {
            let r = atom.coordinates.coords;
            let height = r.dot(&axis);
            let radius = (r - height * axis).norm();
            if radius < thresh {
                continue;
            }
            if let Some(ring) = rings.iter_mut().find(|ring| {
                atoms[ring.representative].is_same_nucleus(atom)
                    && (ring.height - height).abs() < thresh
                    && (ring.radius - radius).abs() < thresh
            }) {
                ring.size += 1;
            } else {
                rings.push(Ring {
                    representative: i,
                    height,
                    radius,
                    size: 1,
                });
            }
        }

        if rings.is_empty() {
            return vec![LINEAR_APPROXIMANT_ORDER];
        }
        let k = rings.iter().fold(0, |acc, ring| gcd(acc, ring.size));
        if k < 2 {
            return vec![];
        }
        let mut orders = divisors::get_divisors(k);
        orders.push(k);
        orders
            .into_iter()
            .filter(|&order| order > 1)
            .sorted_unstable_by(|a, b| b.cmp(a))
            .dedup()
            .filter_map(|order| u32::try_from(order).ok())
            .collect()
    }

    /// Constructs a symmetry element along an axis with the distance threshold of the molecule.
    fn make_element(
        &self,
        kind: SymmetryElementKind,
        order: u32,
        axis: &Vector3<f64>,
    ) -> Option<SymmetryElement> {
        SymmetryElement::builder()
            .threshold(self.dist_threshold)
            .kind(kind)
            .order(order)
            .axis(*axis)
            .build()
            .ok()
    }
}
