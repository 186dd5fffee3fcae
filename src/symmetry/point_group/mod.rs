//! Finite molecular point groups.

use std::fmt;

use serde::{Deserialize, Serialize};


/// An enumerated type for the finite point groups a molecule can be classified into.
///
/// Infinite-order groups are never produced: linear molecules are assigned the finite approximants
/// [`PointGroup::Dnh`]`(4)` and [`PointGroup::Cnv`]`(4)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointGroup {
    /// The trivial group containing only the identity.
    #[default]
    C1,

    /// A single mirror plane.
    Cs,

    /// A single inversion centre.
    Ci,

    /// A single $`C_n`$ axis.
    Cn(u32),

    /// A $`C_n`$ axis with $`n`$ vertical mirror planes.
    Cnv(u32),

    /// A $`C_n`$ axis with a horizontal mirror plane.
    Cnh(u32),

    /// A single $`S_{2n}`$ axis. The associated value is the order $`2n`$ of the improper axis.
    S2n(u32),

    /// A $`C_n`$ axis with $`n`$ perpendicular $`C_2`$ axes.
    Dn(u32),

    /// The group [`PointGroup::Dn`] with a horizontal mirror plane.
    Dnh(u32),

    /// The group [`PointGroup::Dn`] with $`n`$ dihedral mirror planes.
    Dnd(u32),

    /// The chiral tetrahedral group.
    T,

    /// The full tetrahedral group.
    Td,

    /// The pyritohedral group.
    Th,

    /// The chiral octahedral group.
    O,

    /// The full octahedral group.
    Oh,

    /// The chiral icosahedral group.
    I,

    /// The full icosahedral group.
    Ih,
}

impl PointGroup {
    /// Returns the algebraic label of the group, *e.g.* `C_{2v}`, `D_{4h}`, or `T_{d}`.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::C1 => "C_{1}".to_string(),
            Self::Cs => "C_{s}".to_string(),
            Self::Ci => "C_{i}".to_string(),
            Self::Cn(n) => format!("C_{{{n}}}"),
            Self::Cnv(n) => format!("C_{{{n}v}}"),
            Self::Cnh(n) => format!("C_{{{n}h}}"),
            Self::S2n(m) => format!("S_{{{m}}}"),
            Self::Dn(n) => format!("D_{{{n}}}"),
            Self::Dnh(n) => format!("D_{{{n}h}}"),
            Self::Dnd(n) => format!("D_{{{n}d}}"),
            Self::T => "T".to_string(),
            Self::Td => "T_{d}".to_string(),
            Self::Th => "T_{h}".to_string(),
            Self::O => "O".to_string(),
            Self::Oh => "O_{h}".to_string(),
            Self::I => "I".to_string(),
            Self::Ih => "I_{h}".to_string(),
        }
    }

    /// Returns the number of symmetry operations in the group.
    #[must_use]
    pub fn order(&self) -> usize {
        let n = |k: &u32| *k as usize;
        match self {
            Self::C1 => 1,
            Self::Cs | Self::Ci => 2,
            Self::Cn(k) | Self::S2n(k) => n(k),
            Self::Cnv(k) | Self::Cnh(k) | Self::Dn(k) => 2 * n(k),
            Self::Dnh(k) | Self::Dnd(k) => 4 * n(k),
            Self::T => 12,
            Self::Td | Self::Th | Self::O => 24,
            Self::Oh => 48,
            Self::I => 60,
            Self::Ih => 120,
        }
    }

    /// Returns the order of the principal rotation axis of the group.
    #[must_use]
    pub fn principal_order(&self) -> u32 {
        match self {
            Self::C1 | Self::Cs | Self::Ci => 1,
            Self::Cn(k) | Self::Cnv(k) | Self::Cnh(k) | Self::Dn(k) | Self::Dnh(k) | Self::Dnd(k) => {
                *k
            }
            Self::S2n(m) => m / 2,
            Self::T | Self::Td | Self::Th => 3,
            Self::O | Self::Oh => 4,
            Self::I | Self::Ih => 5,
        }
    }

    /// Checks if the group contains the inversion centre.
    #[must_use]
    pub fn is_centrosymmetric(&self) -> bool {
        match self {
            Self::Ci | Self::Th | Self::Oh | Self::Ih => true,
            Self::Cnh(k) | Self::Dnh(k) => k % 2 == 0,
            Self::Dnd(k) => k % 2 == 1,
            Self::S2n(m) => (m / 2) % 2 == 1,
            _ => false,
        }
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = self.label().replace(['_', '{', '}'], "");
        write!(f, "{plain}")
    }
}
