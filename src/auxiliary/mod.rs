//! Helper items to assist the working of QFock.

pub mod atom;
pub mod geometry;
pub mod molecule;
