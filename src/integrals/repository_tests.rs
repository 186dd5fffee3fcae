use approx::assert_relative_eq;

use crate::integrals::eri_index::EriIndex;
use crate::integrals::repository::EriRepository;
use crate::integrals::TwoElectronIntegrals;

#[test]
fn test_repository_lookup_through_permutations() {
    let mut repo = EriRepository::new(3);
    assert!(repo.is_empty());
    assert_eq!(repo.insert(2, 1, 0, 2, 0.25).unwrap(), None);
    assert_eq!(repo.len(), 1);
    for perm in EriIndex::new(2, 1, 0, 2).permutations() {
        let [i, j, k, l] = perm.indices();
        assert_relative_eq!(repo.get(i, j, k, l).unwrap(), 0.25);
    }
    assert_eq!(repo.insert(0, 2, 1, 2, 0.5).unwrap(), Some(0.25));
    assert_eq!(repo.len(), 1);
    assert_relative_eq!(repo.get(1, 2, 2, 0).unwrap(), 0.5);
}

#[test]
fn test_repository_missing_integral() {
    let repo = EriRepository::from_entries(2, &[(0, 0, 0, 0, 1.0)]).unwrap();
    let err = repo.get(1, 0, 0, 0).unwrap_err().to_string();
    assert!(err.contains("(1 0|0 0)"));
    assert!(err.contains("(0 0|0 1)"));
}

#[test]
fn test_repository_invalid_entries() {
    let mut repo = EriRepository::new(2);
    assert!(repo.insert(0, 0, 2, 0, 1.0).is_err());
    assert!(repo.is_empty());

    assert!(EriRepository::from_entries(2, &[(0, 1, 0, 0, 1.0), (1, 0, 0, 0, 1.0)]).is_ok());
    assert!(EriRepository::from_entries(2, &[(0, 1, 0, 0, 1.0), (0, 0, 1, 0, 2.0)]).is_err());
}

#[test]
fn test_repository_completeness() {
    assert_eq!(EriRepository::n_unique(1), 1);
    assert_eq!(EriRepository::n_unique(2), 6);
    assert_eq!(EriRepository::n_unique(4), 55);

    let entries = [
        (0, 0, 0, 0, 0.77),
        (0, 0, 0, 1, 0.44),
        (0, 0, 1, 1, 0.57),
        (0, 1, 0, 1, 0.30),
        (0, 1, 1, 1, 0.44),
        (1, 1, 1, 1, 0.77),
    ];
    let repo = EriRepository::from_entries(2, &entries[..5]).unwrap();
    assert!(!repo.is_complete());
    let repo = EriRepository::from_entries(2, &entries).unwrap();
    assert!(repo.is_complete());
    assert_eq!(repo.n_basis(), 2);
}

#[test]
fn test_repository_serde_yaml() {
    let yaml = "n_basis: 2\nentries:\n- [1, 0, 0, 0, 0.44]\n- [1, 1, 0, 0, 0.57]\n";
    let repo: EriRepository = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(repo.len(), 2);
    assert_relative_eq!(repo.get(0, 0, 0, 1).unwrap(), 0.44);
    assert_relative_eq!(repo.get(0, 0, 1, 1).unwrap(), 0.57);

    let written = serde_yaml::to_string(&repo).unwrap();
    assert!(written.contains("- 0.44"));
    let reread: EriRepository = serde_yaml::from_str(&written).unwrap();
    assert_eq!(
        reread.iter_sorted().collect::<Vec<_>>(),
        repo.iter_sorted().collect::<Vec<_>>()
    );

    let bad = "n_basis: 1\nentries:\n- [1, 0, 0, 0, 0.44]\n";
    assert!(serde_yaml::from_str::<EriRepository>(bad).is_err());
}
