use std::f64::consts::PI;

use approx;
use nalgebra::{Matrix3, Vector3};

use crate::auxiliary::geometry;
use crate::symmetry::symmetry_element::{SymmetryElement, SymmetryElementKind, ROT, SIG};

fn element(kind: SymmetryElementKind, order: u32, axis: Vector3<f64>) -> SymmetryElement {
    SymmetryElement::builder()
        .threshold(1e-12)
        .kind(kind)
        .order(order)
        .axis(axis)
        .build()
        .unwrap()
}

#[test]
fn test_symmetry_element_constructor() {
    let c3 = element(ROT, 3, Vector3::new(0.0, 0.0, -2.0));
    approx::assert_relative_eq!(c3.axis, Vector3::z());
    assert!(c3.is_proper());
    assert!(!c3.is_identity());

    let sigma = element(SIG, 1, Vector3::new(-1.0, 1.0, 0.0));
    approx::assert_relative_eq!(sigma.axis, Vector3::new(1.0, -1.0, 0.0) / 2.0_f64.sqrt());
    assert!(sigma.is_mirror_plane());
    assert!(!sigma.is_inversion_centre());

    let inv = element(SIG, 2, Vector3::z());
    assert!(inv.is_inversion_centre());
    assert!(!inv.is_proper());
}

#[test]
fn test_symmetry_element_constructor_rejects_null_axis() {
    assert!(SymmetryElement::builder()
        .threshold(1e-12)
        .order(2)
        .axis(Vector3::zeros())
        .build()
        .is_err());
    assert!(SymmetryElement::builder()
        .order(2)
        .axis(Vector3::z())
        .threshold(1e-12)
        .build()
        .is_err());
}

#[test]
fn test_symmetry_element_symbols() {
    assert_eq!(element(ROT, 1, Vector3::z()).get_standard_symbol(), "E");
    assert_eq!(element(ROT, 6, Vector3::z()).get_standard_symbol(), "C6");
    assert_eq!(element(SIG, 2, Vector3::z()).get_standard_symbol(), "i");
    assert_eq!(element(SIG, 4, Vector3::z()).get_standard_symbol(), "S4");

    let mut sigma_v = element(SIG, 1, Vector3::y());
    assert_eq!(sigma_v.get_standard_symbol(), "σ");
    sigma_v.additional_subscript = "v".to_string();
    assert_eq!(sigma_v.get_standard_symbol(), "σv");
    assert_eq!(format!("{sigma_v}"), "σv(+0.000, +1.000, +0.000)");
    assert_eq!(format!("{}", element(SIG, 2, Vector3::x())), "i");
}

#[test]
fn test_symmetry_element_transformation_matrices() {
    let c4 = element(ROT, 4, Vector3::z());
    approx::assert_relative_eq!(
        c4.get_transformation_matrix() * Vector3::x(),
        Vector3::y(),
        epsilon = 1e-14
    );

    let inv = element(SIG, 2, Vector3::new(1.0, 1.0, 1.0));
    approx::assert_relative_eq!(
        inv.get_transformation_matrix(),
        -Matrix3::identity(),
        epsilon = 1e-14
    );

    let sigma = element(SIG, 1, Vector3::x());
    approx::assert_relative_eq!(
        sigma.get_transformation_matrix(),
        geometry::reflection_matrix(&Vector3::x()),
        epsilon = 1e-14
    );

    let s6 = element(SIG, 6, Vector3::z());
    let s6_mat = s6.get_transformation_matrix();
    let s6_cubed = s6_mat * s6_mat * s6_mat;
    approx::assert_relative_eq!(s6_cubed, -Matrix3::identity(), epsilon = 1e-13);
}

#[test]
fn test_symmetry_element_equivalence() {
    let c2_a = element(ROT, 2, Vector3::new(1.0, 1.0, 0.0));
    let c2_b = element(ROT, 2, Vector3::new(-2.0, -2.0, 0.0));
    let c2_c = element(ROT, 2, Vector3::new(1.0, -1.0, 0.0));
    let sigma_a = element(SIG, 1, Vector3::new(1.0, 1.0, 0.0));
    assert!(c2_a.is_equivalent_to(&c2_b));
    assert!(!c2_a.is_equivalent_to(&c2_c));
    assert!(!c2_a.is_equivalent_to(&sigma_a));

    let inv_a = element(SIG, 2, Vector3::x());
    let inv_b = element(SIG, 2, Vector3::z());
    assert!(inv_a.is_equivalent_to(&inv_b));
}

#[test]
fn test_symmetry_element_transform() {
    let c3 = element(ROT, 3, Vector3::x());
    let rotation = geometry::proper_rotation_matrix(PI / 2.0, &Vector3::y(), 1);
    let rotated = c3.transform(&rotation);
    // x is taken to -z, whose positive pole is +z.
    approx::assert_relative_eq!(rotated.axis, Vector3::z(), epsilon = 1e-14);
    assert_eq!(rotated.order, 3);
}
