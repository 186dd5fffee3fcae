use approx::assert_relative_eq;

use crate::drivers::symmetry_group_detection::SymmetryGroupDetectionParams;
use crate::energy::nuclear_repulsion;
use crate::interfaces::input::{Input, InputMolecule, SymmetryGroupDetectionInputKind};
use crate::interfaces::InputHandle;
use crate::io::{read_qfock_yaml, write_qfock_binary, QFockFileType};
use crate::symmetry::point_group::PointGroup;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_interfaces_input_symmetry_group_detection_parameters() {
    let name = format!("{ROOT}/tests/input/n2_symmetry.yml");
    let inp = read_qfock_yaml::<Input, _>(&name).unwrap();
    assert!(matches!(inp.molecule, Some(InputMolecule::Xyz(_))));
    assert!(inp.nuclear_repulsion);
    assert!(inp.g_matrix.is_none());
    if let Some(SymmetryGroupDetectionInputKind::Parameters(params)) =
        inp.symmetry_group_detection.as_ref()
    {
        assert_eq!(params.moi_thresholds, vec![1e-6]);
        assert_eq!(params.distance_thresholds, vec![1e-6]);
        assert!(params.write_symmetry_elements);
        assert!(params.result_save_name.is_none());
    } else {
        panic!("Symmetry-group detection parameters expected.");
    }
}

#[test]
fn test_interfaces_input_inline_atoms() {
    let yaml = "\
molecule: !atoms
  - N 0.0 0.0 1.0399092291
  - N 0.0 0.0 -1.0399092291
nuclear_repulsion: true
";
    let inp: Input = serde_yaml::from_str(yaml).unwrap();
    let mol = inp.molecule().unwrap();
    assert_eq!(mol.atoms.len(), 2);
    assert_relative_eq!(
        nuclear_repulsion(&mol),
        49.0 / (2.0 * 1.0399092291),
        epsilon = 1e-10
    );
    assert!(inp.handle().is_ok());

    let bad: Input = serde_yaml::from_str("molecule: !atoms\n  - Xx 0.0 0.0 0.0\n").unwrap();
    assert!(bad.molecule().is_err());
}

#[test]
fn test_interfaces_input_handle_g_matrix() {
    let name = format!("{ROOT}/tests/input/h2_g_matrix.yml");
    let inp = read_qfock_yaml::<Input, _>(&name).unwrap();
    assert!(inp.molecule.is_none());
    assert!(inp.symmetry_group_detection.is_none());
    assert!(inp.handle().is_ok());
}

#[test]
fn test_interfaces_input_missing_molecule() {
    let inp = Input {
        symmetry_group_detection: Some(SymmetryGroupDetectionInputKind::default()),
        ..Input::default()
    };
    assert!(inp.handle().is_err());

    let inp = Input {
        nuclear_repulsion: true,
        ..Input::default()
    };
    assert!(inp.handle().is_err());
    assert!(Input::default().handle().is_ok());
}

#[test]
fn test_interfaces_input_symmetry_group_detection_fromfile() {
    let mol_inp = InputMolecule::Xyz(format!("{ROOT}/tests/xyz/bf3.xyz").into());
    let params = SymmetryGroupDetectionParams::builder()
        .moi_thresholds(&[1e-6])
        .distance_thresholds(&[1e-6])
        .build()
        .unwrap();
    let inp = Input {
        molecule: Some(mol_inp),
        symmetry_group_detection: Some(SymmetryGroupDetectionInputKind::Parameters(params)),
        ..Input::default()
    };
    let sgd = inp.symmetry_group_detection.as_ref().unwrap();
    let res = inp.handle_symmetry_group_detection(sgd).unwrap();
    assert_eq!(res.molecular_symmetry.point_group(), PointGroup::Dnh(3));

    let name = std::env::temp_dir().join(format!("qfock-input-{}-bf3", std::process::id()));
    write_qfock_binary(&name, QFockFileType::Sym, &res).unwrap();
    let from_file = Input {
        symmetry_group_detection: Some(SymmetryGroupDetectionInputKind::FromFile(name.clone())),
        ..Input::default()
    };
    let sgd = from_file.symmetry_group_detection.as_ref().unwrap();
    let reread = from_file.handle_symmetry_group_detection(sgd).unwrap();
    assert_eq!(reread.molecular_symmetry.point_group(), PointGroup::Dnh(3));
    assert!(from_file.handle().is_ok());
    std::fs::remove_file(name.with_extension(QFockFileType::Sym.ext())).unwrap();
}
