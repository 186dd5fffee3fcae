//! # QFock: two-electron Fock matrices and molecular point groups
//!
//! QFock is a library and program for the symmetry-aware building blocks of closed-shell
//! self-consistent-field calculations, written in Rust with the following capabilities:
//! - canonicalisation of two-electron repulsion integral indices under their eight-fold
//!   permutational symmetry, and in-memory integral repositories keyed by canonical index,
//! - parallel construction of the two-electron mean-field matrix $`\mathbf{G}`$ from a density
//!   matrix and a set of integrals,
//! - detection of the point group of a molecule from its nuclear geometry, with linear molecules
//!   assigned the finite approximants $`\mathcal{D}_{4h}`$ and $`\mathcal{C}_{4v}`$, together with
//!   a standard orientation, a set of generators, and the permutations of the nuclei they induce,
//!   and
//! - dispatching of total-energy calculations over electronic-structure methods to external
//!   solvers, with the nuclear repulsion energy computed here.
//!
//! ## Examples and usage
//!
//! For most items (structs, enums, functions, and traits), their usages are illustrated in test
//! functions. The `qfock` binary reads a YAML input file selected with `-c/--config` and writes
//! its main output to the file given with `-o/--output`, or to the console otherwise.
//!
//! ## License
//!
//! GNU Lesser General Public License v3.0.

pub mod auxiliary;
pub mod drivers;
pub mod energy;
pub mod fock;
pub mod integrals;
pub mod interfaces;
pub mod io;
pub mod rotsym;
pub mod symmetry;
