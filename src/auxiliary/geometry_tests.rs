use std::f64::consts::PI;

use approx;
use nalgebra::{Matrix3, Vector3};

use crate::auxiliary::geometry::{
    self, check_parallel, check_perpendicular, get_standard_positive_pole,
    improper_rotation_matrix, proper_rotation_matrix, reflection_matrix, rotation_between,
};

#[test]
fn test_geometry_proper_rotation_matrix() {
    let c4 = proper_rotation_matrix(PI / 2.0, &Vector3::z(), 1);
    let rotated = c4 * Vector3::x();
    approx::assert_relative_eq!(rotated, Vector3::y(), epsilon = 1e-14);

    let c4_4 = proper_rotation_matrix(PI / 2.0, &Vector3::z(), 4);
    approx::assert_relative_eq!(c4_4, Matrix3::identity(), epsilon = 1e-14);
}

#[test]
fn test_geometry_improper_rotation_matrix() {
    // S2 is the inversion and S1 is the horizontal reflection.
    let s2 = improper_rotation_matrix(PI, &Vector3::new(1.0, 2.0, 3.0), 1);
    approx::assert_relative_eq!(s2, -Matrix3::identity(), epsilon = 1e-14);

    let s1 = improper_rotation_matrix(2.0 * PI, &Vector3::y(), 1);
    approx::assert_relative_eq!(s1, reflection_matrix(&Vector3::y()), epsilon = 1e-14);

    let s4_2 = improper_rotation_matrix(PI / 2.0, &Vector3::z(), 2);
    approx::assert_relative_eq!(
        s4_2,
        proper_rotation_matrix(PI, &Vector3::z(), 1),
        epsilon = 1e-14
    );
}

#[test]
fn test_geometry_reflection_matrix() {
    let sigma = reflection_matrix(&Vector3::new(0.0, 0.0, 2.0));
    approx::assert_relative_eq!(
        sigma * Vector3::new(1.0, -2.0, 3.0),
        Vector3::new(1.0, -2.0, -3.0),
        epsilon = 1e-14
    );
    approx::assert_relative_eq!(sigma * sigma, Matrix3::identity(), epsilon = 1e-14);
}

#[test]
fn test_geometry_standard_positive_pole() {
    let thresh = 1e-10;
    approx::assert_relative_eq!(
        get_standard_positive_pole(&Vector3::new(0.0, 0.0, -3.0), thresh),
        Vector3::z()
    );
    approx::assert_relative_eq!(
        get_standard_positive_pole(&Vector3::new(-1.0, 5.0, 0.0), thresh),
        Vector3::new(1.0, -5.0, 0.0).normalize()
    );
    approx::assert_relative_eq!(
        get_standard_positive_pole(&Vector3::new(0.0, -1.0, 0.0), thresh),
        Vector3::y()
    );
    assert!(geometry::check_standard_positive_pole(
        &Vector3::new(-1.0, -1.0, 1e-3),
        thresh
    ));
    assert!(!geometry::check_standard_positive_pole(
        &Vector3::new(-1.0, 1.0, 0.0),
        thresh
    ));
}

#[test]
fn test_geometry_parallel_perpendicular() {
    let thresh = 1e-10;
    assert!(check_parallel(
        &Vector3::new(1.0, 1.0, 0.0),
        &Vector3::new(-2.0, -2.0, 0.0),
        thresh
    ));
    assert!(!check_parallel(&Vector3::x(), &Vector3::y(), thresh));
    assert!(check_perpendicular(
        &Vector3::new(1.0, 1.0, 0.0),
        &Vector3::new(1.0, -1.0, 3.0),
        thresh
    ));
    assert!(!check_perpendicular(&Vector3::x(), &Vector3::new(1.0, 1.0, 0.0), thresh));
}

#[test]
fn test_geometry_rotation_between() {
    let thresh = 1e-10;
    let from = Vector3::new(1.0, 2.0, -0.5);
    let rot = rotation_between(&from, &Vector3::z(), thresh);
    approx::assert_relative_eq!(rot * from.normalize(), Vector3::z(), epsilon = 1e-12);
    approx::assert_relative_eq!(rot.determinant(), 1.0, epsilon = 1e-12);

    let antiparallel = rotation_between(&-Vector3::z(), &Vector3::z(), thresh);
    approx::assert_relative_eq!(antiparallel * -Vector3::z(), Vector3::z(), epsilon = 1e-12);
    approx::assert_relative_eq!(antiparallel.determinant(), 1.0, epsilon = 1e-12);
}
