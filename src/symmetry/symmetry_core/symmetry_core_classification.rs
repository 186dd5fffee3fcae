//! Point-group classification of the symmetry elements found by the brute-force search.

use std::f64::consts::PI;

use anyhow::{self, format_err};
use itertools::Itertools;
use log;
use nalgebra::Vector3;

use crate::auxiliary::geometry;
use crate::symmetry::point_group::PointGroup;
use crate::symmetry::symmetry_core::symmetry_core_orientation::compare_descending;
use crate::symmetry::symmetry_core::{Symmetry, SymmetrySearch};
use crate::symmetry::symmetry_element::{SymmetryElement, ROT, SIG};

/// Assigns a point group to a set of symmetry elements.
///
/// Molecules with at least two rotation axes of order three or higher belong to a cubic group.
/// Otherwise the principal axis $`C_n`$ is a rotation axis of the highest order $`n`$ (the one
/// closest to $`z`$ if there are several), and the group follows from the presence of
/// perpendicular $`C_2`$ axes, a horizontal mirror plane, other mirror planes, and an $`S_{2n}`$
/// axis along the principal axis.
///
/// # Arguments
///
/// * `search` - The symmetry elements, expressed in the standard orientation.
/// * `thresh` - The threshold for geometric comparisons.
pub(super) fn classify(search: &SymmetrySearch, thresh: f64) -> PointGroup {
    let high_order_axes = search
        .rotations
        .iter()
        .filter(|element| element.order >= 3)
        .collect_vec();
    if high_order_axes.len() >= 2 {
        let has_order = |order: u32| high_order_axes.iter().any(|element| element.order == order);
        return if has_order(5) {
            if search.inversion {
                PointGroup::Ih
            } else {
                PointGroup::I
            }
        } else if has_order(4) {
            if search.inversion {
                PointGroup::Oh
            } else {
                PointGroup::O
            }
        } else if search.inversion {
            PointGroup::Th
        } else if !search.reflections.is_empty() {
            PointGroup::Td
        } else {
            PointGroup::T
        };
    }

    let n = search.max_rotation_order();
    let Some(principal) = principal_axis(&search.rotations, n) else {
        return if !search.reflections.is_empty() {
            PointGroup::Cs
        } else if search.inversion {
            PointGroup::Ci
        } else {
            PointGroup::C1
        };
    };

    let has_perpendicular_c2 = search.rotations.iter().any(|element| {
        element.order == 2 && geometry::check_perpendicular(&element.axis, &principal, thresh)
    });
    let has_sigma_h = search
        .reflections
        .iter()
        .any(|element| geometry::check_parallel(&element.axis, &principal, thresh));
    let has_reflections = !search.reflections.is_empty();

    if has_perpendicular_c2 {
        if has_sigma_h {
            PointGroup::Dnh(n)
        } else if has_reflections {
            PointGroup::Dnd(n)
        } else {
            PointGroup::Dn(n)
        }
    } else if has_sigma_h {
        PointGroup::Cnh(n)
    } else if has_reflections {
        PointGroup::Cnv(n)
    } else if search.improper_rotations.iter().any(|element| {
        element.order == 2 * n && geometry::check_parallel(&element.axis, &principal, thresh)
    }) {
        PointGroup::S2n(2 * n)
    } else {
        PointGroup::Cn(n)
    }
}

/// Locates the principal axis among rotation axes of the highest order `n`, preferring the one
/// closest to $`z`$.
fn principal_axis(rotations: &[SymmetryElement], n: u32) -> Option<Vector3<f64>> {
    if n < 2 {
        return None;
    }
    rotations
        .iter()
        .filter(|element| element.order == n)
        .max_by(|a, b| a.axis[2].abs().total_cmp(&b.axis[2].abs()))
        .map(|element| element.axis)
}

impl Symmetry {
    /// Adds the elements found by a search to this structure, annotating each mirror plane with
    /// its subscript in [`Self::point_group`].
    ///
    /// Rotation axes are added by decreasing order and, within an order, by decreasing alignment
    /// with $`z`$, $`x`$, then $`y`$. Mirror planes are added with normals closest to $`z`$ first,
    /// then $`y`$, then $`x`$.
    ///
    /// # Errors
    ///
    /// Errors if the inversion centre cannot be constructed.
    pub(super) fn add_search_elements(
        &mut self,
        search: &SymmetrySearch,
        thresh: f64,
    ) -> Result<(), anyhow::Error> {
        let by_alignment = |a: &&SymmetryElement, b: &&SymmetryElement, order: [usize; 3]| {
            order.iter().fold(std::cmp::Ordering::Equal, |acc, &i| {
                acc.then_with(|| compare_descending(a.axis[i].abs(), b.axis[i].abs(), thresh))
            })
        };

        for rotation in search
            .rotations
            .iter()
            .sorted_by(|a, b| b.order.cmp(&a.order).then(by_alignment(a, b, [2, 0, 1])))
        {
            self.add_element(rotation.clone(), false);
        }

        let principal = principal_axis(&search.rotations, search.max_rotation_order());
        for reflection in search
            .reflections
            .iter()
            .sorted_by(|a, b| by_alignment(a, b, [2, 1, 0]))
        {
            let mut sigma = reflection.clone();
            sigma.additional_subscript =
                self.mirror_subscript(&sigma.axis, principal.as_ref(), &search.rotations, thresh);
            self.add_element(sigma, false);
        }

        if search.inversion {
            let inversion = SymmetryElement::builder()
                .threshold(thresh)
                .kind(SIG)
                .order(2)
                .axis(Vector3::z())
                .build()
                .map_err(|err| format_err!("Unable to construct the inversion centre: {err}"))?;
            self.add_element(inversion, false);
        }

        for improper in search
            .improper_rotations
            .iter()
            .sorted_by(|a, b| b.order.cmp(&a.order).then(by_alignment(a, b, [2, 0, 1])))
        {
            self.add_element(improper.clone(), false);
        }
        Ok(())
    }

    /// Determines the subscript of a mirror plane with a given normal.
    fn mirror_subscript(
        &self,
        normal: &Vector3<f64>,
        principal: Option<&Vector3<f64>>,
        rotations: &[SymmetryElement],
        thresh: f64,
    ) -> String {
        let subscript = match self.point_group {
            PointGroup::Cs => "h",
            PointGroup::Th => "h",
            PointGroup::Td => "d",
            PointGroup::I | PointGroup::Ih => "",
            PointGroup::O | PointGroup::Oh => {
                if rotations.iter().any(|element| {
                    element.order == 4 && geometry::check_parallel(&element.axis, normal, thresh)
                }) {
                    "h"
                } else {
                    "d"
                }
            }
            PointGroup::Dnd(_) => {
                if principal.is_some_and(|axis| geometry::check_parallel(axis, normal, thresh)) {
                    "h"
                } else {
                    "d"
                }
            }
            group => {
                if principal.is_some_and(|axis| geometry::check_parallel(axis, normal, thresh)) {
                    "h"
                } else {
                    let n = group.principal_order();
                    if n == 2 || is_vertical_plane(normal, n, thresh) {
                        "v"
                    } else {
                        "d"
                    }
                }
            }
        };
        subscript.to_string()
    }

    /// Selects the generators of [`Self::point_group`] among the stored elements.
    ///
    /// # Errors
    ///
    /// Errors if a required generator is missing from the stored elements.
    pub(super) fn select_generators(&mut self) -> Result<(), anyhow::Error> {
        let thresh = self
            .iter_elements()
            .map(|element| element.threshold)
            .fold(0.0, f64::max);
        let group = self.point_group;
        let n = group.principal_order();
        let missing = |what: &str| format_err!("No {what} generator found for {group}.");

        let first_of = |kind, order| -> Option<SymmetryElement> {
            self.get_elements(kind, order).first().cloned()
        };
        let principal = first_of(ROT, n);
        let perpendicular_c2 = principal.as_ref().and_then(|cn| {
            self.get_elements(ROT, 2)
                .iter()
                .find(|element| geometry::check_perpendicular(&element.axis, &cn.axis, thresh))
                .cloned()
        });
        let sigma_h = principal.as_ref().and_then(|cn| {
            self.get_elements(SIG, 1)
                .iter()
                .find(|element| geometry::check_parallel(&element.axis, &cn.axis, thresh))
                .cloned()
        });
        let first_mirror = first_of(SIG, 1);
        let vertical_mirror = self
            .get_elements(SIG, 1)
            .iter()
            .find(|element| element.additional_subscript != "h")
            .cloned();
        let inversion = first_of(SIG, 2);

        let generators = match group {
            PointGroup::C1 => vec![],
            PointGroup::Cs => vec![first_mirror.ok_or_else(|| missing("mirror plane"))?],
            PointGroup::Ci => vec![inversion.ok_or_else(|| missing("inversion centre"))?],
            PointGroup::Cn(_) => vec![principal.ok_or_else(|| missing("principal axis"))?],
            PointGroup::Cnv(_) => vec![
                principal.ok_or_else(|| missing("principal axis"))?,
                vertical_mirror.ok_or_else(|| missing("vertical mirror plane"))?,
            ],
            PointGroup::Cnh(_) => vec![
                principal.ok_or_else(|| missing("principal axis"))?,
                sigma_h.ok_or_else(|| missing("horizontal mirror plane"))?,
            ],
            PointGroup::S2n(m) => {
                vec![first_of(SIG, m).ok_or_else(|| missing("improper rotation axis"))?]
            }
            PointGroup::Dn(_) | PointGroup::Dnh(_) | PointGroup::Dnd(_) => {
                let mut gens = vec![
                    principal.ok_or_else(|| missing("principal axis"))?,
                    perpendicular_c2.ok_or_else(|| missing("perpendicular C2 axis"))?,
                ];
                if let PointGroup::Dnh(_) = group {
                    gens.push(sigma_h.ok_or_else(|| missing("horizontal mirror plane"))?);
                } else if let PointGroup::Dnd(_) = group {
                    gens.push(vertical_mirror.ok_or_else(|| missing("dihedral mirror plane"))?);
                }
                gens
            }
            PointGroup::T | PointGroup::Td | PointGroup::Th => {
                let mut gens = vec![
                    principal.ok_or_else(|| missing("C3 axis"))?,
                    first_of(ROT, 2).ok_or_else(|| missing("C2 axis"))?,
                ];
                if group == PointGroup::Td {
                    gens.push(first_mirror.ok_or_else(|| missing("mirror plane"))?);
                } else if group == PointGroup::Th {
                    gens.push(inversion.ok_or_else(|| missing("inversion centre"))?);
                }
                gens
            }
            PointGroup::O | PointGroup::Oh => {
                let mut gens = vec![
                    principal.ok_or_else(|| missing("C4 axis"))?,
                    first_of(ROT, 3).ok_or_else(|| missing("C3 axis"))?,
                ];
                if group == PointGroup::Oh {
                    gens.push(inversion.ok_or_else(|| missing("inversion centre"))?);
                }
                gens
            }
            PointGroup::I | PointGroup::Ih => {
                let mut gens = vec![
                    principal.ok_or_else(|| missing("C5 axis"))?,
                    first_of(ROT, 3).ok_or_else(|| missing("C3 axis"))?,
                ];
                if group == PointGroup::Ih {
                    gens.push(inversion.ok_or_else(|| missing("inversion centre"))?);
                }
                gens
            }
        };

        for generator in generators {
            self.add_element(generator, true);
        }
        log::debug!(
            "Generators of {}: {}",
            group,
            self.iter_generators().map(ToString::to_string).join(", ")
        );
        Ok(())
    }
}

/// Checks if a vertical mirror plane of a group with principal order `n` is a $`\sigma_v`$ plane
/// in the standard orientation, rather than a $`\sigma_d`$ plane.
///
/// The $`\sigma_v`$ planes contain the $`x`$ axis and its images under the principal rotation, so
/// their normals lie at angles $`\pi/2 + kp`$ from $`x`$, where $`p = 2\pi/n`$ for even $`n`$ and
/// $`p = \pi/n`$ for odd $`n`$.
fn is_vertical_plane(normal: &Vector3<f64>, n: u32, thresh: f64) -> bool {
    let period = if n % 2 == 0 {
        2.0 * PI / f64::from(n)
    } else {
        PI / f64::from(n)
    };
    let steps = (normal[1].atan2(normal[0]) - PI / 2.0) / period;
    (steps - steps.round()).abs() < thresh.max(1e-6)
}
