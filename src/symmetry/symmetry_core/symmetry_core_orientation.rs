//! Standard orientation of a molecule with respect to its symmetry elements.

use std::cmp::Ordering;

use itertools::Itertools;
use log;
use nalgebra::{Matrix3, Vector3};

use crate::auxiliary::geometry::{self, Transform};
use crate::symmetry::symmetry_core::{describe_axis, PreSymmetry, SymmetrySearch};
use crate::symmetry::symmetry_element::SymmetryElement;

impl PreSymmetry {
    /// Rigidly rotates the molecule into the standard orientation defined by its symmetry
    /// elements.
    ///
    /// The principal axis is brought onto $`+z`$. For non-linear molecules, the best-ranked
    /// $`C_2`$ axis perpendicular to it is then brought onto $`+x`$, or failing that, the normal of
    /// the best-ranked vertical mirror plane is brought onto $`+y`$. Without any rotation axis, the
    /// normal of the best-ranked mirror plane is brought onto $`+z`$. Axes are ranked by:
    ///
    /// 1. rotational order, highest first (rotation axes only),
    /// 2. number of nuclei on the axis or in the plane, most first,
    /// 3. moment of inertia about the axis, largest first (rotation axes only),
    /// 4. alignment with the target Cartesian axis, closest first,
    /// 5. the components of the standard positive pole compared in the order $`(z, x, y)`$,
    ///    largest first.
    ///
    /// Rotations within the distance threshold of the identity are skipped, so that orienting an
    /// already oriented molecule leaves its coordinates bit-identical.
    ///
    /// # Arguments
    ///
    /// * `search` - The elements found by [`Self::brute_force_symmetry`] on the current
    /// coordinates.
    ///
    /// # Returns
    ///
    /// The rotation applied to the molecule by this call.
    pub fn standard_orientation(&mut self, search: &SymmetrySearch) -> Matrix3<f64> {
        let thresh = self.dist_threshold;
        let mut applied = Matrix3::identity();
        let z = Vector3::z();

        if let Some(principal) = self.rank_rotation_axes(&search.rotations, &z).first() {
            log::debug!(
                "Principal axis: {} along {}.",
                principal.get_standard_symbol(),
                describe_axis(&principal.axis, thresh)
            );
            let rotmat = geometry::rotation_between(&principal.axis, &z, thresh);
            self.apply_rotation(&rotmat, &mut applied);
            if self.check_linear() {
                return applied;
            }

            let perpendicular_c2s = search
                .rotations
                .iter()
                .filter(|element| element.order == 2)
                .map(|element| element.transform(&applied))
                .filter(|element| geometry::check_perpendicular(&element.axis, &z, thresh))
                .collect_vec();
            if let Some(c2) = self
                .rank_rotation_axes(&perpendicular_c2s, &Vector3::x())
                .first()
            {
                let rotmat = geometry::rotation_between(&c2.axis, &Vector3::x(), thresh);
                self.apply_rotation(&rotmat, &mut applied);
            } else {
                let vertical_planes = search
                    .reflections
                    .iter()
                    .map(|element| element.transform(&applied))
                    .filter(|element| geometry::check_perpendicular(&element.axis, &z, thresh))
                    .collect_vec();
                if let Some(sigma) = self.rank_planes(&vertical_planes, &Vector3::y()).first() {
                    let rotmat = geometry::rotation_between(&sigma.axis, &Vector3::y(), thresh);
                    self.apply_rotation(&rotmat, &mut applied);
                }
            }
        } else if let Some(sigma) = self.rank_planes(&search.reflections, &z).first() {
            let rotmat = geometry::rotation_between(&sigma.axis, &z, thresh);
            self.apply_rotation(&rotmat, &mut applied);
        } else {
            log::debug!("No symmetry elements to orient by. The frame is left unchanged.");
        }
        applied
    }

    /// Rotates the molecule unless the rotation is within threshold of the identity.
    fn apply_rotation(&mut self, rotmat: &Matrix3<f64>, applied: &mut Matrix3<f64>) {
        if (rotmat - Matrix3::identity()).norm() < self.dist_threshold {
            log::debug!("Rotation within threshold of the identity skipped.");
            return;
        }
        log::debug!("Rotating molecule by:\n{rotmat}");
        self.molecule.transform_mut(rotmat);
        *applied = rotmat * *applied;
        self.orientation = rotmat * self.orientation;
    }

    /// Ranks rotation axes for standard orientation, best first.
    fn rank_rotation_axes(
        &self,
        elements: &[SymmetryElement],
        target: &Vector3<f64>,
    ) -> Vec<SymmetryElement> {
        let moi_thresh = self.moi_threshold;
        elements
            .iter()
            .map(|element| {
                (
                    element.order,
                    self.molecule.count_atoms_on_axis(&element.axis),
                    self.molecule.calc_moi_about(&element.axis),
                    element,
                )
            })
            .sorted_by(|(order_a, n_a, moi_a, a), (order_b, n_b, moi_b, b)| {
                order_b
                    .cmp(order_a)
                    .then(n_b.cmp(n_a))
                    .then_with(|| compare_descending(*moi_a, *moi_b, moi_thresh))
                    .then_with(|| self.compare_alignment(a, b, target))
            })
            .map(|(_, _, _, element)| element.clone())
            .collect()
    }

    /// Ranks mirror planes for standard orientation, best first.
    fn rank_planes(
        &self,
        elements: &[SymmetryElement],
        target: &Vector3<f64>,
    ) -> Vec<SymmetryElement> {
        elements
            .iter()
            .map(|element| (self.molecule.count_atoms_in_plane(&element.axis), element))
            .sorted_by(|(n_a, a), (n_b, b)| {
                n_b.cmp(n_a)
                    .then_with(|| self.compare_alignment(a, b, target))
            })
            .map(|(_, element)| element.clone())
            .collect()
    }

    /// Compares two axes by their alignment with a target direction, then by the components of
    /// their standard positive poles in the order $`(z, x, y)`$, larger first.
    fn compare_alignment(
        &self,
        a: &SymmetryElement,
        b: &SymmetryElement,
        target: &Vector3<f64>,
    ) -> Ordering {
        let thresh = self.dist_threshold;
        compare_descending(a.axis.dot(target).abs(), b.axis.dot(target).abs(), thresh)
            .then_with(|| compare_descending(a.axis[2], b.axis[2], thresh))
            .then_with(|| compare_descending(a.axis[0], b.axis[0], thresh))
            .then_with(|| compare_descending(a.axis[1], b.axis[1], thresh))
    }
}

/// Orders two values descending after snapping both onto a grid of spacing `thresh`.
///
/// Values in the same grid cell compare equal. Snapping keeps the ordering a total order, so it
/// is safe to hand to sorting routines.
pub(super) fn compare_descending(a: f64, b: f64, thresh: f64) -> Ordering {
    let snap = |x: f64| (x / thresh).round() + 0.0;
    snap(b).total_cmp(&snap(a))
}
