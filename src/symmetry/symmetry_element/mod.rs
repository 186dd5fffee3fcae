//! Geometrical symmetry elements.

use std::fmt;

use derive_builder::Builder;
use log;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry;

#[cfg(test)]
#[path = "symmetry_element_tests.rs"]
mod symmetry_element_tests;

// ====================================
// Enum definitions and implementations
// ====================================

/// An enum to classify the types of symmetry element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymmetryElementKind {
    /// Proper symmetry element which consists of just a proper rotation axis.
    Proper,

    /// Improper symmetry element in the mirror-plane convention, which consists of a proper
    /// rotation axis and an orthogonal mirror plane. A mirror plane is $`S_1`$ and the inversion
    /// centre is $`S_2`$.
    ImproperMirrorPlane,
}

impl fmt::Display for SymmetryElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proper => write!(f, "Proper"),
            Self::ImproperMirrorPlane => write!(f, "Improper (mirror-plane convention)"),
        }
    }
}

/// Proper kind.
pub const ROT: SymmetryElementKind = SymmetryElementKind::Proper;

/// Improper kind in the mirror-plane convention.
pub const SIG: SymmetryElementKind = SymmetryElementKind::ImproperMirrorPlane;

// ======================================
// Struct definitions and implementations
// ======================================

/// A struct for storing and managing symmetry elements.
///
/// A symmetry element $`\hat{g}`$ is the generating operation $`\hat{C}_n`$ or
/// $`\hat{\sigma}_h \hat{C}_n`$ about an axis, so the element is fully specified by its kind, its
/// order $`n`$, and its axis. Reflections are improper elements of order 1 whose axis is the plane
/// normal, and the inversion centre is the improper element of order 2.
#[derive(Builder, Clone, Serialize, Deserialize)]
pub struct SymmetryElement {
    /// The spatial kind of the symmetry element.
    #[builder(default = "SymmetryElementKind::Proper")]
    pub kind: SymmetryElementKind,

    /// The rotational order $`n`$ of the symmetry element.
    pub order: u32,

    /// A threshold for approximate equality comparisons.
    #[builder(setter(custom))]
    pub threshold: f64,

    /// The normalised axis of the symmetry element, in the standard positive hemisphere.
    #[builder(setter(custom))]
    pub axis: Vector3<f64>,

    /// An additional subscript for distinguishing mirror planes (`h`, `v`, or `d`).
    #[builder(default = "String::new()")]
    pub additional_subscript: String,
}

impl SymmetryElementBuilder {
    /// Sets the threshold, which must be set before the axis.
    pub fn threshold(&mut self, thresh: f64) -> &mut Self {
        if thresh >= 0.0 {
            self.threshold = Some(thresh);
        } else {
            log::error!("Threshold value {thresh} is invalid. Threshold must be non-negative.");
            self.threshold = None;
        }
        self
    }

    /// Sets the axis, normalised and brought into the standard positive hemisphere.
    pub fn axis(&mut self, axs: Vector3<f64>) -> &mut Self {
        match self.threshold {
            Some(thresh) if axs.norm() > thresh => {
                self.axis = Some(geometry::get_standard_positive_pole(&axs, thresh));
            }
            Some(_) => {
                log::error!("A symmetry element axis must not be a null vector.");
                self.axis = None;
            }
            None => {
                log::error!("The threshold must be set before the axis.");
                self.axis = None;
            }
        }
        self
    }
}

impl SymmetryElement {
    /// Returns a builder to construct a new symmetry element.
    #[must_use]
    pub fn builder() -> SymmetryElementBuilder {
        SymmetryElementBuilder::default()
    }

    /// Checks if the symmetry element is proper.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        self.kind == ROT
    }

    /// Checks if the symmetry element is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.kind == ROT && self.order == 1
    }

    /// Checks if the symmetry element is a mirror plane.
    #[must_use]
    pub fn is_mirror_plane(&self) -> bool {
        self.kind == SIG && self.order == 1
    }

    /// Checks if the symmetry element is the inversion centre.
    #[must_use]
    pub fn is_inversion_centre(&self) -> bool {
        self.kind == SIG && self.order == 2
    }

    /// Returns the $`3 \times 3`$ matrix of the generating operation of this element.
    #[must_use]
    pub fn get_transformation_matrix(&self) -> Matrix3<f64> {
        let angle = 2.0 * std::f64::consts::PI / f64::from(self.order.max(1));
        match self.kind {
            SymmetryElementKind::Proper => geometry::proper_rotation_matrix(angle, &self.axis, 1),
            SymmetryElementKind::ImproperMirrorPlane => {
                geometry::improper_rotation_matrix(angle, &self.axis, 1)
            }
        }
    }

    /// Returns the standard symbol for this symmetry element, *e.g.* `E`, `C3`, `σv`, `i`, or
    /// `S4`.
    #[must_use]
    pub fn get_standard_symbol(&self) -> String {
        if self.is_identity() {
            "E".to_string()
        } else if self.is_inversion_centre() {
            "i".to_string()
        } else if self.is_mirror_plane() {
            format!("σ{}", self.additional_subscript)
        } else {
            match self.kind {
                SymmetryElementKind::Proper => format!("C{}", self.order),
                SymmetryElementKind::ImproperMirrorPlane => format!("S{}", self.order),
            }
        }
    }

    /// Clones the element and expresses it in a rotated coordinate frame.
    ///
    /// # Arguments
    ///
    /// * `mat` - The proper rotation taking old coordinates to new coordinates.
    #[must_use]
    pub fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let mut transformed = self.clone();
        transformed.axis = geometry::get_standard_positive_pole(&(mat * self.axis), self.threshold);
        transformed
    }

    /// Checks if two symmetry elements are the same geometrical element within the threshold.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        if self.kind != other.kind || self.order != other.order {
            return false;
        }
        if self.is_identity() || self.is_inversion_centre() {
            return true;
        }
        let thresh = self.threshold.max(other.threshold);
        geometry::check_parallel(&self.axis, &other.axis, thresh)
    }
}

impl fmt::Display for SymmetryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() || self.is_inversion_centre() {
            write!(f, "{}", self.get_standard_symbol())
        } else {
            write!(
                f,
                "{}({:+.3}, {:+.3}, {:+.3})",
                self.get_standard_symbol(),
                self.axis[0] + 0.0,
                self.axis[1] + 0.0,
                self.axis[2] + 0.0,
            )
        }
    }
}

impl fmt::Debug for SymmetryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({:+.3}, {:+.3}, {:+.3})",
            self.get_standard_symbol(),
            self.axis[0] + 0.0,
            self.axis[1] + 0.0,
            self.axis[2] + 0.0,
        )
    }
}
