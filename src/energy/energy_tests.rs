use std::sync::Mutex;

use anyhow::format_err;
use approx::assert_relative_eq;

use crate::auxiliary::molecule::Molecule;
use crate::drivers::QFockDriver;
use crate::energy::{
    nuclear_repulsion, CorrelationFunctional, EnergyDriver, EnergyParams, EnergySolver,
    ExchangeFunctional, Method,
};
use crate::symmetry::point_group::PointGroup;
use crate::symmetry::symmetry_core::MolecularSymmetry;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

/// A solver returning fixed energies and recording what it was handed.
struct FixedSolver {
    scf: f64,
    correlation: f64,
    seen: Mutex<Vec<(String, usize)>>,
}

impl FixedSolver {
    fn new(scf: f64, correlation: f64) -> Self {
        Self {
            scf,
            correlation,
            seen: Mutex::new(vec![]),
        }
    }
}

impl EnergySolver for FixedSolver {
    fn energies(
        &self,
        method: &Method,
        _molecule: &Molecule,
        symmetry: &MolecularSymmetry,
        _electrons: usize,
        _multiplicity: usize,
    ) -> Result<(f64, f64), anyhow::Error> {
        self.seen
            .lock()
            .map_err(|_| format_err!("Poisoned lock."))?
            .push((symmetry.group_name(), rayon::current_num_threads()));
        let correlation = if method.reference().is_some() {
            self.correlation
        } else {
            0.0
        };
        Ok((self.scf, correlation))
    }
}

struct FailingSolver;

impl EnergySolver for FailingSolver {
    fn energies(
        &self,
        _method: &Method,
        _molecule: &Molecule,
        _symmetry: &MolecularSymmetry,
        _electrons: usize,
        _multiplicity: usize,
    ) -> Result<(f64, f64), anyhow::Error> {
        Err(format_err!("SCF did not converge."))
    }
}

fn n2() -> Molecule {
    Molecule::from_xyz(format!("{ROOT}/tests/xyz/n2.xyz"), 1e-6).unwrap()
}

#[test]
fn test_energy_method_parsing() {
    assert_eq!("rhf".parse::<Method>().unwrap(), Method::Rhf);
    assert_eq!(" UHF ".parse::<Method>().unwrap(), Method::Uhf);
    assert_eq!("GUHF".parse::<Method>().unwrap(), Method::Guhf);
    assert_eq!("mp2".parse::<Method>().unwrap(), Method::Mp2);
    assert_eq!("CCSD".parse::<Method>().unwrap(), Method::Ccsd);
    assert_eq!("ccsd(t)".parse::<Method>().unwrap(), Method::CcsdT);
    assert_eq!("TDHF".parse::<Method>().unwrap(), Method::Tdhf);
    assert_eq!("cis".parse::<Method>().unwrap(), Method::Cis);
    assert_eq!(
        "DFT:S:VWN3".parse::<Method>().unwrap(),
        Method::Dft {
            exchange: ExchangeFunctional::Slater,
            correlation: CorrelationFunctional::Vwn3
        }
    );
    assert_eq!(
        "dft:s".parse::<Method>().unwrap(),
        Method::Dft {
            exchange: ExchangeFunctional::Slater,
            correlation: CorrelationFunctional::None
        }
    );

    assert!("CASSCF".parse::<Method>().is_err());
    assert!("DFT".parse::<Method>().is_err());
    assert!("DFT:B88".parse::<Method>().is_err());
    assert!("DFT:S:VWN3:X".parse::<Method>().is_err());
    assert!("RHF:S".parse::<Method>().is_err());
}

#[test]
fn test_energy_method_display() {
    for tag in ["RHF", "UHF", "GUHF", "MP2", "CCSD", "CCSD(T)", "TDHF", "CIS", "DFT:S", "DFT:S:VWN3"]
    {
        let method = tag.parse::<Method>().unwrap();
        assert_eq!(method.to_string(), tag);
    }
    assert!(Method::Rhf.is_restricted());
    assert!(!Method::Uhf.is_restricted());
    assert!(!Method::Guhf.is_restricted());
    assert_eq!(Method::CcsdT.reference(), Some(Method::Rhf));
    assert_eq!(Method::Rhf.reference(), None);
}

#[test]
fn test_energy_method_serde() {
    let method: Method = serde_yaml::from_str("dft:s:vwn3").unwrap();
    assert_eq!(method.to_string(), "DFT:S:VWN3");
    assert_eq!(serde_yaml::to_string(&Method::CcsdT).unwrap().trim(), "CCSD(T)");
    assert!(serde_yaml::from_str::<Method>("HF").is_err());
}

#[test]
fn test_energy_params_validation() {
    let params = EnergyParams::builder()
        .electrons(14)
        .method(Method::Rhf)
        .build()
        .unwrap();
    assert_eq!(params.multiplicity, 1);
    assert_eq!(params.processors, 1);
    assert!(!params.use_symmetry);
    assert!(params.validate().is_ok());

    // Parity mismatch between electrons and multiplicity.
    assert!(EnergyParams::builder()
        .electrons(14)
        .multiplicity(2)
        .method(Method::Uhf)
        .build()
        .is_err());

    // Restricted methods need a singlet.
    assert!(EnergyParams::builder()
        .electrons(16)
        .multiplicity(3)
        .method(Method::Ccsd)
        .build()
        .is_err());
    assert!(EnergyParams::builder()
        .electrons(16)
        .multiplicity(3)
        .method(Method::Uhf)
        .build()
        .is_ok());

    // More unpaired electrons than electrons.
    assert!(EnergyParams::builder()
        .electrons(1)
        .multiplicity(4)
        .method(Method::Guhf)
        .build()
        .is_err());

    assert!(EnergyParams::builder()
        .electrons(2)
        .processors(0)
        .method(Method::Rhf)
        .build()
        .is_err());
    assert!(EnergyParams::builder().electrons(2).build().is_err());
}

#[test]
fn test_energy_params_yaml_defaults() {
    let params: EnergyParams = serde_yaml::from_str("electrons: 14\nmethod: mp2\n").unwrap();
    assert_eq!(params.method, Method::Mp2);
    assert_eq!(params.multiplicity, 1);
    assert_eq!(params.processors, 1);
    assert_relative_eq!(params.moi_threshold, 1e-6);
}

#[test]
fn test_energy_nuclear_repulsion_n2() {
    let mol = n2();
    assert_relative_eq!(
        nuclear_repulsion(&mol),
        49.0 / (2.0 * 1.039909229100),
        epsilon = 1e-10
    );
}

#[test]
fn test_energy_driver_trivial_symmetry() {
    let mol = n2();
    let params = EnergyParams::builder()
        .electrons(14)
        .processors(2)
        .method(Method::Mp2)
        .build()
        .unwrap();
    let solver = FixedSolver::new(-108.9, -0.3);
    let mut driver = EnergyDriver::builder()
        .parameters(&params)
        .molecule(&mol)
        .solver(&solver)
        .build()
        .unwrap();
    assert!(driver.result().is_err());
    assert!(driver.run().is_ok());

    let result = driver.result().unwrap();
    let nuc = nuclear_repulsion(&mol);
    assert_relative_eq!(result.nuclear_repulsion, nuc);
    assert_relative_eq!(result.scf, -108.9);
    assert_relative_eq!(result.correlation, -0.3);
    assert_relative_eq!(result.total, -108.9 + nuc - 0.3, epsilon = 1e-12);
    assert_eq!(result.point_group, "C_{1}");
    assert_eq!(driver.symmetry().unwrap().point_group(), PointGroup::C1);

    let seen = solver.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[("C_{1}".to_string(), 2)]);
}

#[test]
fn test_energy_driver_detected_symmetry() {
    let mol = n2();
    let params = EnergyParams::builder()
        .electrons(14)
        .method("RHF".parse().unwrap())
        .use_symmetry(true)
        .build()
        .unwrap();
    let solver = FixedSolver::new(-108.9, -0.3);
    let mut driver = EnergyDriver::builder()
        .parameters(&params)
        .molecule(&mol)
        .solver(&solver)
        .build()
        .unwrap();
    driver.run().unwrap();

    let result = driver.result().unwrap();
    assert_eq!(result.point_group, "D_{4h}");
    assert_relative_eq!(result.correlation, 0.0);
    assert_relative_eq!(result.total, result.scf + result.nuclear_repulsion);
    assert!(result.to_string().contains("Total energy"));

    let seen = solver.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[("D_{4h}".to_string(), 1)]);
}

#[test]
fn test_energy_driver_solver_error() {
    let mol = n2();
    let params = EnergyParams::builder()
        .electrons(14)
        .method(Method::Rhf)
        .build()
        .unwrap();
    let mut driver = EnergyDriver::builder()
        .parameters(&params)
        .molecule(&mol)
        .solver(&FailingSolver)
        .build()
        .unwrap();
    let err = driver.run().unwrap_err();
    assert!(err.to_string().contains("converge"));
    assert!(driver.result().is_err());
}
