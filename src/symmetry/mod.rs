//! Molecular point-group detection.

pub mod point_group;
pub mod symmetry_core;
pub mod symmetry_element;
