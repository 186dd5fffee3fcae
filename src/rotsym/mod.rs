//! Rotational symmetry based on moments of inertia.

use std::fmt;

use approx;
use log;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};


/// Enumerated type to classify the types of rotational symmetry of a molecular system based on its
/// principal moments of inertia.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationalSymmetry {
    /// All three principal moments of inertia are identical.
    Spherical,
    /// The unique principal moment of inertia is the largest, the other two
    /// are equal and sum to the unique one.
    OblatePlanar,
    /// The unique principal moment of inertia is the largest, the other two
    /// are equal but do not sum to the unique one.
    OblateNonPlanar,
    /// The unique principal moment of inertia is zero, the other two are equal.
    ProlateLinear,
    /// The unique principal moment of inertia is the smallest but non-zero,
    /// the other two are equal.
    ProlateNonLinear,
    /// The largest principal moment of inertia is the sum of the other two,
    /// but they are all distinct.
    AsymmetricPlanar,
    /// All principal moments of inertia are distinct and do not have any
    /// special relations between them.
    AsymmetricNonPlanar,
}

impl RotationalSymmetry {
    /// Returns `true` if the system is a symmetric top, *i.e.* exactly two principal moments of
    /// inertia coincide.
    #[must_use]
    pub fn is_symmetric_top(&self) -> bool {
        matches!(
            self,
            Self::OblatePlanar | Self::OblateNonPlanar | Self::ProlateLinear | Self::ProlateNonLinear
        )
    }
}

impl fmt::Display for RotationalSymmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationalSymmetry::Spherical => write!(f, "Spherical"),
            RotationalSymmetry::OblatePlanar => write!(f, "Oblate, planar"),
            RotationalSymmetry::OblateNonPlanar => write!(f, "Oblate, non-planar"),
            RotationalSymmetry::ProlateLinear => write!(f, "Prolate, linear"),
            RotationalSymmetry::ProlateNonLinear => write!(f, "Prolate, non-linear"),
            RotationalSymmetry::AsymmetricPlanar => write!(f, "Asymmetric, planar"),
            RotationalSymmetry::AsymmetricNonPlanar => write!(f, "Asymmetric, non-planar"),
        }
    }
}

/// Determines the rotational symmetry given an inertia tensor.
///
/// # Arguments
///
/// * `inertia_tensor` - An inertia tensor which is a $`3 \times 3`$ matrix.
/// * `thresh` - A threshold for comparing moments of inertia.
///
/// # Returns
///
/// The rotational symmetry as one of the [`RotationalSymmetry`] variants.
#[must_use]
pub fn calc_rotational_symmetry(inertia_tensor: &Matrix3<f64>, thresh: f64) -> RotationalSymmetry {
    let mut moi = inertia_tensor.symmetric_eigenvalues().iter().copied().collect::<Vec<_>>();
    moi.sort_by(f64::total_cmp);
    log::debug!("Moments of inertia:");
    for component in &moi {
        log::debug!("  {component:+.14}");
    }
    let eq = |a: f64, b: f64| approx::relative_eq!(a, b, epsilon = thresh, max_relative = thresh);
    let planar = eq(moi[2], moi[0] + moi[1]);
    if eq(moi[0], moi[1]) {
        if eq(moi[1], moi[2]) {
            RotationalSymmetry::Spherical
        } else if planar {
            RotationalSymmetry::OblatePlanar
        } else {
            RotationalSymmetry::OblateNonPlanar
        }
    } else if eq(moi[1], moi[2]) {
        if moi[0].abs() < thresh {
            RotationalSymmetry::ProlateLinear
        } else {
            RotationalSymmetry::ProlateNonLinear
        }
    } else if planar {
        RotationalSymmetry::AsymmetricPlanar
    } else {
        RotationalSymmetry::AsymmetricNonPlanar
    }
}
