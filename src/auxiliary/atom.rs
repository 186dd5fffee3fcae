//! Atoms and nuclei.

use std::collections::HashMap;
use std::fmt;

use approx;
use lazy_static::lazy_static;
use nalgebra::{Matrix3, Point3, Rotation3, Translation3, UnitVector3, Vector3};
use num_traits::ToPrimitive;
use periodic_table;
use serde::{Deserialize, Serialize};

use crate::auxiliary::geometry::Transform;

lazy_static! {
    /// The element look-up for the whole periodic table, built once.
    pub static ref ELEMENT_MAP: ElementMap<'static> = ElementMap::new();
}

/// Element data stored in an [`ElementMap`].
#[derive(Clone, Debug)]
pub struct ElementData<'a> {
    /// The atomic number of the element.
    pub atomic_number: u32,

    /// The weighted-average atomic mass for all naturally occuring isotopes.
    pub atomic_mass: f64,

    /// The element name.
    pub name: &'a str,
}

/// A struct storing a look-up of element symbols to give atomic numbers, atomic masses, and
/// element names.
pub struct ElementMap<'a> {
    /// A [`HashMap`] from a symbol string to the element data.
    pub map: HashMap<&'a str, ElementData<'a>>,
}

impl Default for ElementMap<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementMap<'static> {
    /// Creates a new [`ElementMap`] for all elements in the periodic table.
    #[must_use]
    pub fn new() -> ElementMap<'static> {
        let mut map = HashMap::new();
        let elements = periodic_table::periodic_table();
        for element in elements {
            let mass = parse_atomic_mass(element.atomic_mass);
            map.insert(
                element.symbol,
                ElementData {
                    atomic_number: element.atomic_number,
                    atomic_mass: mass,
                    name: element.name,
                },
            );
        }
        ElementMap { map }
    }
}

impl<'a> ElementMap<'a> {
    /// Finds the symbol of the element with a given atomic number.
    pub fn symbol_of(&self, atomic_number: u32) -> Option<&'a str> {
        self.map
            .iter()
            .find(|(_, data)| data.atomic_number == atomic_number)
            .map(|(symbol, _)| *symbol)
    }
}

/// An auxiliary function that parses the atomic mass string in the format of
/// [`periodic_table`] to a single float value.
///
/// # Arguments
///
/// * `mass_str` - A string of mass value that is either `x.y(z)` where the
///     uncertain digit `z` is enclosed in parentheses, or `[x]` where `x`
///     is the mass number in place of precise experimental values.
///
/// # Returns
///
/// The numeric mass value.
fn parse_atomic_mass(mass_str: &str) -> f64 {
    let mass = mass_str.replace(&['(', ')', '[', ']'][..], "");
    mass.parse::<f64>()
        .unwrap_or_else(|_| panic!("Unable to parse atomic mass string {mass}."))
}

/// A struct representing a nucleus in a molecule.
#[derive(Clone, Serialize, Deserialize)]
pub struct Atom {
    /// The element identity, *e.g.* `NITROGEN`.
    pub element: String,

    /// The atomic symbol of the atom.
    pub atomic_symbol: String,

    /// The atomic number of the atom, which is also its nuclear charge.
    pub atomic_number: u32,

    /// The mass of the nucleus.
    pub atomic_mass: f64,

    /// The position of the atom.
    pub coordinates: Point3<f64>,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Atom {
    /// Constructs an [`Atom`] from an explicit nucleus record.
    ///
    /// # Arguments
    ///
    /// * `element` - The element identity.
    /// * `charge` - The nuclear charge (atomic number).
    /// * `mass` - The nuclear mass.
    /// * `coordinates` - The position of the nucleus.
    /// * `thresh` - A threshold for approximate equality comparisons.
    #[must_use]
    pub fn new(
        element: &str,
        charge: u32,
        mass: f64,
        coordinates: Point3<f64>,
        thresh: f64,
    ) -> Atom {
        let atomic_symbol = ELEMENT_MAP
            .symbol_of(charge)
            .map_or_else(|| element.to_string(), str::to_string);
        Atom {
            element: element.to_string(),
            atomic_symbol,
            atomic_number: charge,
            atomic_mass: mass,
            coordinates,
            threshold: thresh,
        }
    }

    /// Parses an atom line in an `xyz` file to construct an [`Atom`].
    ///
    /// # Arguments
    ///
    /// * `line` - A line in an `xyz` file containing an atomic symbol and
    ///     three Cartesian coordinates.
    /// * `emap` - A hash map between atomic symbols and element data.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The parsed [`Atom`] struct if the line has the correct format,
    /// otherwise [`None`].
    #[must_use]
    pub fn from_xyz(line: &str, emap: &ElementMap, thresh: f64) -> Option<Atom> {
        let split: Vec<&str> = line.split_whitespace().collect();
        if split.len() != 4 {
            return None;
        };
        let atomic_symbol = split.first()?;
        let data = emap.map.get(atomic_symbol)?;
        let coords = split[1..]
            .iter()
            .map(|x| x.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Atom {
            element: data.name.to_uppercase(),
            atomic_symbol: (*atomic_symbol).to_string(),
            atomic_number: data.atomic_number,
            atomic_mass: data.atomic_mass,
            coordinates: Point3::new(coords[0], coords[1], coords[2]),
            threshold: thresh,
        })
    }

    /// Checks if another atom is the same kind of nucleus as this one, *i.e.* is the same element
    /// with the same charge and the same mass within the comparison threshold.
    #[must_use]
    pub fn is_same_nucleus(&self, other: &Atom) -> bool {
        let thresh = self.threshold.max(other.threshold);
        self.element == other.element
            && self.atomic_number == other.atomic_number
            && approx::relative_eq!(
                self.atomic_mass,
                other.atomic_mass,
                epsilon = thresh,
                max_relative = thresh
            )
    }

    /// Checks if another atom is the same kind of nucleus as this one and sits at the same
    /// position within the comparison threshold.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Atom) -> bool {
        let thresh = self.threshold.max(other.threshold);
        self.is_same_nucleus(other) && (self.coordinates - other.coordinates).norm() < thresh
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self
            .threshold
            .log10()
            .abs()
            .round()
            .to_usize()
            .ok_or(fmt::Error)?
            + 1;
        let length = (precision + precision.div_euclid(2)).max(6);
        write!(
            f,
            "{:>9} {:>3} {:+length$.precision$} {:+length$.precision$} {:+length$.precision$}",
            "Atom",
            self.atomic_symbol,
            self.coordinates[0],
            self.coordinates[1],
            self.coordinates[2],
        )
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Transform for Atom {
    fn transform_mut(&mut self, mat: &Matrix3<f64>) {
        self.coordinates = mat * self.coordinates;
    }

    fn rotate_mut(&mut self, angle: f64, axis: &Vector3<f64>) {
        let normalised_axis = UnitVector3::new_normalize(*axis);
        let rotation = Rotation3::from_axis_angle(&normalised_axis, angle);
        self.coordinates = rotation.transform_point(&self.coordinates);
    }

    fn translate_mut(&mut self, tvec: &Vector3<f64>) {
        let translation = Translation3::from(*tvec);
        self.coordinates = translation.transform_point(&self.coordinates);
    }

    fn transform(&self, mat: &Matrix3<f64>) -> Self {
        let mut transformed_atom = self.clone();
        transformed_atom.transform_mut(mat);
        transformed_atom
    }

    fn rotate(&self, angle: f64, axis: &Vector3<f64>) -> Self {
        let mut rotated_atom = self.clone();
        rotated_atom.rotate_mut(angle, axis);
        rotated_atom
    }

    fn translate(&self, tvec: &Vector3<f64>) -> Self {
        let mut translated_atom = self.clone();
        translated_atom.translate_mut(tvec);
        translated_atom
    }
}
