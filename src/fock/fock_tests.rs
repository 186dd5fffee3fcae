use approx::assert_relative_eq;
use itertools::iproduct;
use ndarray::{array, Array2};

use crate::fock::GMatrixElement;
use crate::integrals::{EriRepository, TwoElectronIntegrals};

/// Fills every distinct integral over `n_basis` functions with zero.
fn zero_repository(n_basis: usize) -> EriRepository {
    let mut repo = EriRepository::new(n_basis);
    for (i, j, k, l) in iproduct!(0..n_basis, 0..n_basis, 0..n_basis, 0..n_basis) {
        repo.insert(i, j, k, l, 0.0).unwrap();
    }
    assert!(repo.is_complete());
    repo
}

fn assert_matrix_eq(actual: &Array2<f64>, expected: &Array2<f64>, epsilon: f64) {
    assert_eq!(actual.dim(), expected.dim());
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}

fn h2_repository() -> EriRepository {
    EriRepository::from_entries(
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
    .unwrap()
}

#[test]
fn test_g_matrix_zero_integrals() {
    let repo = zero_repository(3);
    let density = array![[1.0, 0.2, -0.1], [0.2, 0.7, 0.4], [-0.1, 0.4, 0.3]];
    let gmat = GMatrixElement::new(density.view(), &repo)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(gmat, Array2::<f64>::zeros((3, 3)));
}

#[test]
fn test_g_matrix_single_exchange_integral() {
    let mut repo = zero_repository(2);
    repo.insert(0, 1, 0, 1, 1.0).unwrap();
    let density = array![[1.0, 0.5], [0.5, 1.0]];
    let builder = GMatrixElement::new(density.view(), &repo).unwrap();

    // Diagonal entries only see (01|01) through the exchange term.
    assert_relative_eq!(builder.calculate(0, 0).unwrap(), -0.5, epsilon = 1e-12);
    assert_relative_eq!(builder.calculate(1, 1).unwrap(), -0.5, epsilon = 1e-12);

    // Off-diagonal entries see it as Coulomb twice and as exchange once.
    assert_relative_eq!(builder.calculate(0, 1).unwrap(), 0.75, epsilon = 1e-12);
    assert_relative_eq!(builder.calculate(1, 0).unwrap(), 0.75, epsilon = 1e-12);
}

#[test]
fn test_g_matrix_single_coulomb_integral() {
    let mut repo = zero_repository(2);
    repo.insert(0, 0, 1, 1, 1.0).unwrap();
    let density = array![[0.3, 0.0], [0.0, 0.9]];
    let gmat = GMatrixElement::new(density.view(), &repo)
        .unwrap()
        .build()
        .unwrap();
    assert_matrix_eq(&gmat, &array![[0.9, 0.0], [0.0, 0.3]], 1e-12);
}

#[test]
fn test_g_matrix_h2() {
    let repo = h2_repository();
    let density = array![[0.6, 0.6], [0.6, 0.6]];
    let gmat = GMatrixElement::new(density.view(), &repo)
        .unwrap()
        .build()
        .unwrap();
    assert_matrix_eq(&gmat, &array![[0.75156, 0.36285], [0.36285, 0.75156]], 1e-10);

    let density = array![[1.2, -0.3], [-0.3, 0.8]];
    let builder = GMatrixElement::new(density.view(), &repo).unwrap();
    let gmat = builder.build().unwrap();
    assert_matrix_eq(&gmat, &array![[0.66849, 0.395905], [0.395905, 0.68205]], 1e-10);
    for (i, j) in iproduct!(0..2, 0..2) {
        assert_relative_eq!(gmat[(i, j)], builder.calculate(i, j).unwrap());
    }
}

#[test]
fn test_g_matrix_missing_integral() {
    let repo = EriRepository::from_entries(2, &[(0, 0, 0, 0, 1.0)]).unwrap();
    let density = array![[1.0, 0.0], [0.0, 1.0]];
    let builder = GMatrixElement::new(density.view(), &repo).unwrap();
    assert!(builder.calculate(0, 0).is_err());
    let err = builder.build().unwrap_err();
    assert!(err.to_string().contains("missing"));
}

#[test]
fn test_g_matrix_dimension_mismatch() {
    let repo = h2_repository();
    assert_eq!(repo.n_basis(), 2);
    let rectangular = Array2::<f64>::zeros((2, 3));
    assert!(GMatrixElement::new(rectangular.view(), &repo).is_err());
    let too_large = Array2::<f64>::eye(3);
    assert!(GMatrixElement::new(too_large.view(), &repo).is_err());
}
