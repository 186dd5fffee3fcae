//! Molecular point-group detection.
//!
//! The detection is a sequential pipeline over a [`PreSymmetry`]: the molecule is centred when the
//! pre-symmetry structure is built, [`PreSymmetry::brute_force_symmetry`] searches for symmetry
//! elements, [`PreSymmetry::standard_orientation`] rotates the molecule into the standard frame,
//! and [`PreSymmetry::check_linear`] decides on the linear path. [`Symmetry::analyse`] runs every
//! step and classifies the result.

use anyhow::{self, format_err};
use derive_builder::Builder;
use indexmap::IndexMap;
use itertools::Itertools;
use log;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry::{self, Transform};
use crate::auxiliary::molecule::{CentreKind, Molecule};
use crate::rotsym::{self, RotationalSymmetry};
use crate::symmetry::point_group::PointGroup;
use crate::symmetry::symmetry_element::{SymmetryElement, SymmetryElementKind, ROT, SIG};

mod symmetry_core_classification;
mod symmetry_core_orientation;
mod symmetry_core_search;



/// The finite rotational order given to an axis on which every nucleus lies.
pub const LINEAR_APPROXIMANT_ORDER: u32 = 4;

// =================
// Pre-symmetry data
// =================

/// A struct for storing and managing information required for symmetry analysis.
#[derive(Builder, Clone, Debug)]
pub struct PreSymmetry {
    /// The molecule to be symmetry-analysed. This molecule will have been translated to put the
    /// reference point given by [`Self::centre_kind`] at the origin.
    #[builder(setter(custom))]
    molecule: Molecule,

    /// The reference point of the molecule placed at the origin.
    #[builder(setter(custom))]
    centre_kind: CentreKind,

    /// Threshold for relative comparisons of moments of inertia.
    #[builder(setter(custom))]
    moi_threshold: f64,

    /// The rotational symmetry of [`Self::molecule`] based on its moments of inertia.
    #[builder(setter(skip), default = "self.calc_rotational_symmetry()")]
    rotational_symmetry: RotationalSymmetry,

    /// Threshold for distance comparisons.
    #[builder(setter(skip), default = "self.get_dist_threshold()")]
    dist_threshold: f64,

    /// The accumulated rotation applied to [`Self::molecule`] by standard orientation.
    #[builder(setter(skip), default = "Matrix3::identity()")]
    orientation: Matrix3<f64>,
}

impl PreSymmetryBuilder {
    /// Initialises the molecule to be symmetry-analysed.
    ///
    /// The pre-symmetry structure owns a copy of `molecule` centred on the reference point
    /// `centre_kind`. Centring is skipped if the reference point is already at the origin within
    /// the molecule threshold, so repeated analyses leave the coordinates untouched.
    ///
    /// # Arguments
    ///
    /// * `molecule` - The molecule to be symmetry-analysed.
    /// * `centre_kind` - The reference point to be brought to the origin.
    pub fn molecule(&mut self, molecule: &Molecule, centre_kind: CentreKind) -> &mut Self {
        self.molecule = Some(molecule.centre(centre_kind));
        self.centre_kind = Some(centre_kind);
        self
    }

    /// Initialises the threshold for moment-of-inertia comparisons.
    pub fn moi_threshold(&mut self, thresh: f64) -> &mut Self {
        if thresh >= f64::EPSILON {
            self.moi_threshold = Some(thresh);
        } else {
            log::error!(
                "Threshold value {} is invalid. Threshold must be at least the machine epsilon.",
                thresh
            );
            self.moi_threshold = None;
        }
        self
    }

    fn calc_rotational_symmetry(&self) -> RotationalSymmetry {
        match (self.molecule.as_ref(), self.moi_threshold) {
            (Some(mol), Some(thresh)) => {
                let inertia = mol.calc_inertia_tensor(&mol.calc_com());
                rotsym::calc_rotational_symmetry(&inertia, thresh)
            }
            _ => RotationalSymmetry::AsymmetricNonPlanar,
        }
    }

    fn get_dist_threshold(&self) -> f64 {
        self.molecule
            .as_ref()
            .map_or(f64::EPSILON, |mol| mol.threshold)
    }
}

impl PreSymmetry {
    /// Returns a builder to construct a new pre-symmetry struct.
    #[must_use]
    pub fn builder() -> PreSymmetryBuilder {
        PreSymmetryBuilder::default()
    }

    /// The centred (and, once oriented, reoriented) molecule.
    #[must_use]
    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    /// The reference point placed at the origin.
    #[must_use]
    pub fn centre_kind(&self) -> CentreKind {
        self.centre_kind
    }

    /// The rotational symmetry of the molecule.
    #[must_use]
    pub fn rotational_symmetry(&self) -> RotationalSymmetry {
        self.rotational_symmetry
    }

    /// The threshold for moment-of-inertia comparisons.
    #[must_use]
    pub fn moi_threshold(&self) -> f64 {
        self.moi_threshold
    }

    /// The threshold for distance comparisons.
    #[must_use]
    pub fn dist_threshold(&self) -> f64 {
        self.dist_threshold
    }

    /// The accumulated rotation applied to the molecule by standard orientation.
    #[must_use]
    pub fn orientation(&self) -> &Matrix3<f64> {
        &self.orientation
    }

    /// Checks if all nuclei of the molecule lie on a single line within the distance threshold.
    #[must_use]
    pub fn check_linear(&self) -> bool {
        self.molecule.check_linear()
    }

    /// Finds how a transformation permutes the nuclei of the molecule.
    ///
    /// # Returns
    ///
    /// The permutation if the transformed molecule coincides with the original one within the
    /// distance threshold, otherwise [`None`].
    #[must_use]
    pub fn find_permutation(&self, mat: &Matrix3<f64>) -> Option<Vec<usize>> {
        let transformed_mol = self.molecule.transform(mat);
        self.molecule.match_permutation(&transformed_mol)
    }

    /// Checks if a transformation maps the molecule onto itself.
    #[must_use]
    pub fn check_operation(&self, mat: &Matrix3<f64>) -> bool {
        self.find_permutation(mat).is_some()
    }
}

// ======================
// Symmetry search result
// ======================

/// A struct holding the symmetry elements confirmed by the brute-force search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymmetrySearch {
    /// The confirmed proper rotation axes, each with its highest order.
    pub rotations: Vec<SymmetryElement>,

    /// The confirmed mirror planes, stored as improper elements of order 1 along their normals.
    pub reflections: Vec<SymmetryElement>,

    /// Whether the inversion centre is present.
    pub inversion: bool,

    /// The confirmed improper rotation axes $`S_n`$ with $`n \ge 3`$.
    pub improper_rotations: Vec<SymmetryElement>,
}

impl SymmetrySearch {
    /// The highest order among the confirmed rotation axes, or 1 if there are none.
    #[must_use]
    pub fn max_rotation_order(&self) -> u32 {
        self.rotations
            .iter()
            .map(|element| element.order)
            .max()
            .unwrap_or(1)
    }

    /// Expresses every confirmed element in a rotated coordinate frame.
    #[must_use]
    pub fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let transform_all = |elements: &[SymmetryElement]| {
            elements
                .iter()
                .map(|element| element.transform(mat))
                .collect_vec()
        };
        Self {
            rotations: transform_all(&self.rotations),
            reflections: transform_all(&self.reflections),
            inversion: self.inversion,
            improper_rotations: transform_all(&self.improper_rotations),
        }
    }

    /// Returns the complete finite element set of the approximant group assigned to a linear
    /// molecule lying along $`z`$: $`\mathcal{D}_{4h}`$ with an inversion centre,
    /// $`\mathcal{C}_{4v}`$ without.
    ///
    /// # Errors
    ///
    /// Errors if the elements cannot be constructed.
    pub fn linear_approximant(inversion: bool, thresh: f64) -> Result<Self, anyhow::Error> {
        let n = LINEAR_APPROXIMANT_ORDER;
        let make = |kind: SymmetryElementKind, order: u32, axis: Vector3<f64>| {
            SymmetryElement::builder()
                .threshold(thresh)
                .kind(kind)
                .order(order)
                .axis(axis)
                .build()
                .map_err(|err| format_err!(err))
        };
        let perpendicular_axes = [
            Vector3::x(),
            Vector3::y(),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
        ];
        let mut rotations = vec![make(ROT, n, Vector3::z())?];
        let mut reflections = perpendicular_axes
            .iter()
            .map(|axis| make(SIG, 1, *axis))
            .collect::<Result<Vec<_>, _>>()?;
        let mut improper_rotations = vec![];
        if inversion {
            for axis in &perpendicular_axes {
                rotations.push(make(ROT, 2, *axis)?);
            }
            reflections.insert(0, make(SIG, 1, Vector3::z())?);
            improper_rotations.push(make(SIG, n, Vector3::z())?);
        }
        Ok(Self {
            rotations,
            reflections,
            inversion,
            improper_rotations,
        })
    }
}

// ==============================
// Point-group descriptor (Symmetry)
// ==============================

/// A map from element kinds to maps from element orders to elements.
pub type ElementMap = IndexMap<SymmetryElementKind, IndexMap<u32, Vec<SymmetryElement>>>;

/// A struct for storing and managing symmetry analysis results.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Symmetry {
    /// The determined point group.
    pub point_group: PointGroup,

    /// Whether the molecule has been found to be linear, in which case [`Self::point_group`] is
    /// the finite approximant of the true infinite group.
    pub linear: bool,

    /// The symmetry elements found.
    ///
    /// Each entry in the map is for one kind of symmetry elements: the key gives the kind, and the
    /// value is a map where each key gives the order and the corresponding value gives the
    /// elements with that order. Improper elements are in the mirror-plane convention.
    pub elements: ElementMap,

    /// The symmetry generators found, organised in the same way as [`Self::elements`].
    pub generators: ElementMap,
}

impl Symmetry {
    /// Constructs an empty symmetry structure for the trivial group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the symmetry structure of the trivial group $`\mathcal{C}_1`$ containing only
    /// the identity.
    ///
    /// # Errors
    ///
    /// Errors if the identity element cannot be constructed.
    pub fn trivial(thresh: f64) -> Result<Self, anyhow::Error> {
        let mut sym = Self::new();
        sym.add_element(identity_element(thresh)?, false);
        Ok(sym)
    }

    /// Performs point-group detection analysis.
    ///
    /// The brute-force search, the standard orientation, and the linearity check are run on
    /// `presym`, whose molecule is left in the standard orientation. The found elements are
    /// expressed in the standard frame and classified.
    ///
    /// # Arguments
    ///
    /// * `presym` - A pre-symmetry-analysis struct containing the centred molecule and its
    /// rotational symmetry.
    ///
    /// # Errors
    ///
    /// Errors if the generators required by the classified group cannot be located among the
    /// found elements.
    pub fn analyse(&mut self, presym: &mut PreSymmetry) -> Result<(), anyhow::Error> {
        log::debug!("Rotational symmetry found: {}", presym.rotational_symmetry());
        let thresh = presym.dist_threshold();

        let search = presym.brute_force_symmetry();
        let rotmat = presym.standard_orientation(&search);
        self.linear = presym.check_linear();
        let oriented_search = if self.linear {
            log::debug!("Linear molecule: using the finite approximant element set.");
            SymmetrySearch::linear_approximant(search.inversion, thresh)?
        } else {
            search.transform(&rotmat)
        };

        self.point_group = symmetry_core_classification::classify(&oriented_search, thresh);
        log::debug!(
            "Point group determined: {} (order {}).",
            self.point_group,
            self.point_group.order()
        );

        self.elements.clear();
        self.generators.clear();
        self.add_element(identity_element(thresh)?, false);
        self.add_search_elements(&oriented_search, thresh)?;
        self.select_generators()?;
        Ok(())
    }

    /// Returns the algebraic label of the point group, *e.g.* `D_{4h}`.
    #[must_use]
    pub fn group_name(&self) -> String {
        self.point_group.label()
    }

    /// Adds a symmetry element to this struct, unless an equivalent one is already present.
    ///
    /// # Arguments
    ///
    /// * `element` - The element to be added.
    /// * `generator` - A flag indicating if this element should be added as a generator.
    ///
    /// # Returns
    ///
    /// `true` if the specified element is not present and has just been added, `false`
    /// otherwise.
    pub fn add_element(&mut self, element: SymmetryElement, generator: bool) -> bool {
        let dest = if generator {
            &mut self.generators
        } else {
            &mut self.elements
        };
        let same_order = dest
            .entry(element.kind)
            .or_default()
            .entry(element.order)
            .or_default();
        if same_order
            .iter()
            .any(|existing| existing.is_equivalent_to(&element))
        {
            return false;
        }
        log::debug!(
            "{} {} {} added.",
            element.kind,
            if generator { "generator" } else { "element" },
            element
        );
        same_order.push(element);
        true
    }

    /// Returns the elements of a given kind and order.
    #[must_use]
    pub fn get_elements(&self, kind: SymmetryElementKind, order: u32) -> &[SymmetryElement] {
        self.elements
            .get(&kind)
            .and_then(|by_order| by_order.get(&order))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterates over every stored element, kind by kind and order by order.
    pub fn iter_elements(&self) -> impl Iterator<Item = &SymmetryElement> {
        self.elements.values().flat_map(|by_order| by_order.values().flatten())
    }

    /// Iterates over every stored generator, kind by kind and order by order.
    pub fn iter_generators(&self) -> impl Iterator<Item = &SymmetryElement> {
        self.generators
            .values()
            .flat_map(|by_order| by_order.values().flatten())
    }

    /// The number of stored elements, including the identity.
    #[must_use]
    pub fn n_elements(&self) -> usize {
        self.iter_elements().count()
    }
}

/// Constructs the identity element.
fn identity_element(thresh: f64) -> Result<SymmetryElement, anyhow::Error> {
    SymmetryElement::builder()
        .threshold(thresh)
        .kind(ROT)
        .order(1)
        .axis(Vector3::z())
        .build()
        .map_err(|err| format_err!("Unable to construct the identity element: {err}"))
}

// ==================================
// Symmetry object (MolecularSymmetry)
// ==================================

/// A struct pairing the point-group descriptor of a molecule with the molecule in its standard
/// orientation and the permutations of its nuclei under the group generators.
///
/// This object is built once at the start of a calculation and is read-only afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MolecularSymmetry {
    /// The point-group descriptor.
    pub symmetry: Symmetry,

    /// The molecule, centred and in the standard orientation.
    pub molecule: Molecule,

    /// The rotation taking the centred input coordinates to the standard orientation.
    pub orientation: Matrix3<f64>,

    /// For each generator in [`Symmetry::iter_generators`] order, the permutation `p` of the
    /// nuclei such that the generator takes nucleus `i` onto the position of nucleus `p[i]`.
    pub generator_permutations: Vec<Vec<usize>>,

    /// The sets of symmetry-equivalent nuclei, each sorted and listed by its first index.
    pub sea_sets: Vec<Vec<usize>>,
}

impl MolecularSymmetry {
    /// Constructs the symmetry object of the trivial group for a molecule, without any centring
    /// or reorientation.
    ///
    /// # Errors
    ///
    /// Errors if the identity element cannot be constructed.
    pub fn trivial(molecule: &Molecule) -> Result<Self, anyhow::Error> {
        Ok(Self {
            symmetry: Symmetry::trivial(molecule.threshold)?,
            molecule: molecule.clone(),
            orientation: Matrix3::identity(),
            generator_permutations: vec![],
            sea_sets: (0..molecule.atoms.len()).map(|i| vec![i]).collect(),
        })
    }

    /// Runs the full detection pipeline on a molecule.
    ///
    /// # Arguments
    ///
    /// * `molecule` - The molecule to be analysed. It is not modified.
    /// * `centre_kind` - The reference point to be brought to the origin.
    /// * `moi_threshold` - The threshold for moment-of-inertia comparisons.
    ///
    /// # Errors
    ///
    /// Errors if the pre-symmetry structure cannot be built or the analysis fails.
    pub fn detect(
        molecule: &Molecule,
        centre_kind: CentreKind,
        moi_threshold: f64,
    ) -> Result<Self, anyhow::Error> {
        let mut presym = PreSymmetry::builder()
            .molecule(molecule, centre_kind)
            .moi_threshold(moi_threshold)
            .build()?;
        let mut symmetry = Symmetry::new();
        symmetry.analyse(&mut presym)?;
        Self::from_analysis(symmetry, &presym)
    }

    /// Assembles the symmetry object from an analysed pre-symmetry structure.
    ///
    /// # Errors
    ///
    /// Errors if a generator does not map the molecule onto itself.
    pub fn from_analysis(symmetry: Symmetry, presym: &PreSymmetry) -> Result<Self, anyhow::Error> {
        let generator_permutations = symmetry
            .iter_generators()
            .map(|generator| {
                presym
                    .find_permutation(&generator.get_transformation_matrix())
                    .ok_or_else(|| {
                        format_err!("Generator {generator} does not map the molecule onto itself.")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let sea_sets = calc_sea_sets(presym.molecule().atoms.len(), &generator_permutations);
        Ok(Self {
            symmetry,
            molecule: presym.molecule().clone(),
            orientation: *presym.orientation(),
            generator_permutations,
            sea_sets,
        })
    }

    /// The point group of the molecule.
    #[must_use]
    pub fn point_group(&self) -> PointGroup {
        self.symmetry.point_group
    }

    /// The algebraic label of the point group, *e.g.* `D_{4h}`.
    #[must_use]
    pub fn group_name(&self) -> String {
        self.symmetry.group_name()
    }

    /// Expresses a vector given in the input frame in the standard orientation.
    #[must_use]
    pub fn to_standard_frame(&self, vec: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * vec
    }
}

/// Collects the orbits of the nuclei under a set of generator permutations.
fn calc_sea_sets(n_atoms: usize, permutations: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; n_atoms];
    let mut sea_sets = vec![];
    for start in 0..n_atoms {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        let mut orbit = vec![start];
        let mut frontier = vec![start];
        while let Some(i) = frontier.pop() {
            for perm in permutations {
                let j = perm[i];
                if !assigned[j] {
                    assigned[j] = true;
                    orbit.push(j);
                    frontier.push(j);
                }
            }
        }
        orbit.sort_unstable();
        sea_sets.push(orbit);
    }
    sea_sets
}

/// Formats the standard positive pole of an axis for logging.
fn describe_axis(axis: &Vector3<f64>, thresh: f64) -> String {
    let pole = geometry::get_standard_positive_pole(axis, thresh);
    format!("({:+.3}, {:+.3}, {:+.3})", pole[0] + 0.0, pole[1] + 0.0, pole[2] + 0.0)
}
