use approx::assert_relative_eq;
use ndarray::array;

use qfock::auxiliary::molecule::{CentreKind, Molecule};
use qfock::energy::nuclear_repulsion;
use qfock::fock::GMatrixElement;
use qfock::integrals::{canonicalise, EriIndex, EriRepository, TwoElectronIntegrals};
use qfock::interfaces::input::Input;
use qfock::interfaces::InputHandle;
use qfock::io::read_qfock_yaml;
use qfock::symmetry::point_group::PointGroup;
use qfock::symmetry::symmetry_core::MolecularSymmetry;
use qfock::symmetry::symmetry_element::{ROT, SIG};

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_n2_symmetry_and_nuclear_repulsion() {
    let mol = Molecule::from_xyz(format!("{ROOT}/tests/xyz/n2.xyz"), 1e-6).unwrap();
    let molsym = MolecularSymmetry::detect(&mol, CentreKind::CentreOfMass, 1e-6).unwrap();
    assert_eq!(molsym.point_group(), PointGroup::Dnh(4));
    assert_eq!(molsym.group_name(), "D_{4h}");
    assert!(molsym.symmetry.linear);
    assert_eq!(molsym.symmetry.get_elements(ROT, 4).len(), 1);
    assert_eq!(molsym.symmetry.get_elements(ROT, 2).len(), 4);
    assert_eq!(molsym.symmetry.get_elements(SIG, 1).len(), 5);
    assert_eq!(molsym.sea_sets, vec![vec![0, 1]]);

    // The molecular axis is the principal axis in the standard orientation.
    let axis = molsym.symmetry.get_elements(ROT, 4)[0].axis;
    assert_relative_eq!(axis.z.abs(), 1.0, epsilon = 1e-10);

    assert_relative_eq!(
        nuclear_repulsion(&mol),
        49.0 / (2.0 * 1.0399092291),
        epsilon = 1e-10
    );
}

#[test]
fn test_h2_g_matrix() {
    let repo = EriRepository::from_entries(
        2,
        &[
            (0, 0, 0, 0, 0.7746),
            (0, 0, 0, 1, 0.4441),
            (0, 0, 1, 1, 0.5697),
            (0, 1, 0, 1, 0.2970),
            (0, 1, 1, 1, 0.4441),
            (1, 1, 1, 1, 0.7746),
        ],
    )
    .unwrap();
    assert!(repo.is_complete());
    assert_eq!(canonicalise(1, 0, 1, 1), EriIndex([0, 1, 1, 1]));
    assert_relative_eq!(repo.get(1, 1, 1, 0).unwrap(), 0.4441);

    let density = array![[0.6, 0.6], [0.6, 0.6]];
    let g = GMatrixElement::new(density.view(), &repo)
        .unwrap()
        .build()
        .unwrap();
    assert_relative_eq!(g[(0, 0)], 0.75156, epsilon = 1e-10);
    assert_relative_eq!(g[(0, 1)], 0.36285, epsilon = 1e-10);
    assert_relative_eq!(g[(1, 0)], g[(0, 1)], epsilon = 1e-12);
    assert_relative_eq!(g[(1, 1)], 0.75156, epsilon = 1e-10);
}

#[test]
fn test_yaml_inputs() {
    for name in ["n2_symmetry", "h2_g_matrix"] {
        let inp = read_qfock_yaml::<Input, _>(format!("{ROOT}/tests/input/{name}.yml")).unwrap();
        assert!(inp.handle().is_ok());
    }
}
