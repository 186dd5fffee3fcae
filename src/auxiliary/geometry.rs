//! Geometrical objects and manipulations.

use approx;
use nalgebra::{ClosedMul, Matrix3, Rotation3, Scalar, UnitVector3, Vector3};

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod geometry_tests;

// =================
// Utility functions
// =================

/// Computes the outer product between two three-dimensional vectors.
///
/// # Arguments
///
/// * `vec1` - The first vector, $`\mathbf{v}_1`$.
/// * `vec2` - The second vector, $`\mathbf{v}_2`$.
///
/// # Returns
///
/// The outer product $`\mathbf{v}_1 \otimes \mathbf{v}_2`$.
fn outer<T: Scalar + ClosedMul + Copy>(vec1: &Vector3<T>, vec2: &Vector3<T>) -> Matrix3<T> {
    let outer_product_iter: Vec<T> = vec2
        .iter()
        .flat_map(|&item_x| vec1.iter().map(move |&item_y| item_x * item_y))
        .collect();
    Matrix3::from_iterator(outer_product_iter)
}

/// Returns a $`3 \times 3`$ rotation matrix in $`\mathbb{R}^3`$ corresponding to a rotation
/// through `angle` about `axis` raised to the power `power`.
///
/// # Arguments
///
/// * `angle` - The angle of rotation.
/// * `axis` - The axis of rotation.
/// * `power` - The power of rotation.
///
/// # Returns
///
/// The rotation matrix.
#[must_use]
pub fn proper_rotation_matrix(angle: f64, axis: &Vector3<f64>, power: i8) -> Matrix3<f64> {
    let normalised_axis = UnitVector3::new_normalize(*axis);
    Rotation3::from_axis_angle(&normalised_axis, (f64::from(power)) * angle).into_inner()
}

/// Returns a $`3 \times 3`$ transformation matrix in $`\mathbb{R}^3`$ corresponding to an improper
/// rotation through `angle` about `axis` raised to the power `power`.
///
/// The improper rotation is defined in the mirror-plane convention: a proper rotation through
/// `angle` about `axis` followed by a reflection in the plane perpendicular to `axis`.
///
/// # Arguments
///
/// * `angle` - The angle of rotation.
/// * `axis` - The axis of rotation.
/// * `power` - The power of transformation.
///
/// # Returns
///
/// The transformation matrix.
#[must_use]
pub fn improper_rotation_matrix(angle: f64, axis: &Vector3<f64>, power: i8) -> Matrix3<f64> {
    let rotmat = proper_rotation_matrix(angle, axis, power);
    let normalised_axis = UnitVector3::new_normalize(*axis);
    let refmat = Matrix3::identity()
        - 2.0 * (f64::from(power.rem_euclid(2))) * outer(&normalised_axis, &normalised_axis);
    refmat * rotmat
}

/// Returns the matrix of the reflection through the plane perpendicular to `normal`.
#[must_use]
pub fn reflection_matrix(normal: &Vector3<f64>) -> Matrix3<f64> {
    let normalised_normal = UnitVector3::new_normalize(*normal);
    Matrix3::identity() - 2.0 * outer(&normalised_normal, &normalised_normal)
}

/// Returns the standard positive pole of a rotation axis.
///
/// An axis lies in the standard positive hemisphere if $`z > 0`$, or $`z = 0`$ and $`x > 0`$,
/// or $`z = x = 0`$ and $`y > 0`$.
///
/// # Arguments
///
/// * `axis` - An axis of rotation (proper or improper), or a plane normal.
/// * `thresh` - Threshold for comparisons.
///
/// # Returns
///
/// The normalised positive pole of `axis`.
#[must_use]
pub fn get_standard_positive_pole(axis: &Vector3<f64>, thresh: f64) -> Vector3<f64> {
    let normalised_axis = axis.normalize();
    if check_standard_positive_pole(&normalised_axis, thresh) {
        normalised_axis
    } else {
        -normalised_axis
    }
}

/// Checks if an axis is in the standard positive hemisphere.
///
/// # Arguments
///
/// * `axis` - An axis of rotation.
/// * `thresh` - Threshold for comparisons.
///
/// # Returns
///
/// Returns `true` if `axis` is in the positive hemisphere.
#[must_use]
pub fn check_standard_positive_pole(axis: &Vector3<f64>, thresh: f64) -> bool {
    let axis = axis.normalize();
    let zero = |x: f64| approx::relative_eq!(x, 0.0, epsilon = thresh, max_relative = thresh);
    axis[2] > thresh
        || (zero(axis[2]) && axis[0] > thresh)
        || (zero(axis[2]) && zero(axis[0]) && axis[1] > thresh)
}

/// Checks if two axes are parallel or antiparallel within a threshold.
#[must_use]
pub fn check_parallel(axis1: &Vector3<f64>, axis2: &Vector3<f64>, thresh: f64) -> bool {
    axis1.normalize().cross(&axis2.normalize()).norm() < thresh
}

/// Checks if two axes are perpendicular within a threshold.
#[must_use]
pub fn check_perpendicular(axis1: &Vector3<f64>, axis2: &Vector3<f64>, thresh: f64) -> bool {
    axis1.normalize().dot(&axis2.normalize()).abs() < thresh
}

/// Returns the proper rotation taking `from` onto `to`.
///
/// Antiparallel vectors are handled by a half-turn about an axis perpendicular to `from`, chosen
/// as the Cartesian axis least aligned with `from` so that the result is deterministic.
#[must_use]
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>, thresh: f64) -> Matrix3<f64> {
    let from = from.normalize();
    let to = to.normalize();
    match Rotation3::rotation_between(&from, &to) {
        Some(rot) if from.dot(&to) > -1.0 + thresh => rot.into_inner(),
        _ => {
            let helper = [Vector3::x(), Vector3::y(), Vector3::z()]
                .into_iter()
                .min_by(|a, b| from.dot(a).abs().total_cmp(&from.dot(b).abs()))
                .unwrap_or_else(Vector3::x);
            let perp = from.cross(&helper);
            proper_rotation_matrix(std::f64::consts::PI, &perp, 1)
        }
    }
}

/// Geometrical transformability in three dimensions.
pub trait Transform {
    /// Transforms in-place the coordinates about the origin by a given
    /// transformation.
    ///
    /// # Arguments
    ///
    /// * `mat` - A three-dimensional transformation matrix.
    fn transform_mut(&mut self, mat: &Matrix3<f64>);

    /// Rotates in-place the coordinates through `angle` about `axis`.
    ///
    /// # Arguments
    ///
    /// * `angle` - The angle of rotation.
    /// * `axis` - The axis of rotation.
    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>);

    /// Translates in-place the coordinates by a specified translation vector in
    /// three dimensions.
    ///
    /// # Arguments
    ///
    /// * `tvec` - The translation vector.
    fn translate_mut(&mut self, tvec: &Vector3<f64>);

    /// Clones and transforms the coordinates about the origin by a given
    /// transformation.
    ///
    /// # Arguments
    ///
    /// * `mat` - A three-dimensional transformation matrix.
    ///
    /// # Returns
    ///
    /// A transformed copy.
    #[must_use]
    fn transform(&self, mat: &Matrix3<f64>) -> Self;

    /// Clones and rotates the coordinates through `angle` about `axis`.
    ///
    /// # Arguments
    ///
    /// * `angle` - The angle of rotation.
    /// * `axis` - The axis of rotation.
    ///
    /// # Returns
    ///
    /// A rotated copy.
    #[must_use]
    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self;

    /// Clones and translates the coordinates by a specified translation in three dimensions.
    ///
    /// # Arguments
    ///
    /// * `tvec` - The translation vector.
    ///
    /// # Returns
    ///
    /// A translated copy.
    #[must_use]
    fn translate(&self, tvec: &Vector3<f64>) -> Self;
}
