use clinic_core::{
    password_digest, ClinicConfig, ClinicError, ClinicService, CredentialTable, PatientPatch,
};
use tempfile::TempDir;

fn credentials() -> CredentialTable {
    CredentialTable::parse(&format!("ops,{}\n", password_digest("secret"))).unwrap()
}

fn service_in(dir: &TempDir, autosave: bool) -> ClinicService {
    let config = ClinicConfig::new(autosave, dir.path());
    let mut clinic = ClinicService::new(&config, credentials()).unwrap();
    clinic.login("ops", "secret").unwrap();
    clinic
}

fn open_session(autosave: bool) -> (ClinicService, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let clinic = service_in(&dir, autosave);
    (clinic, dir)
}

#[test]
fn create_and_search_roundtrip() {
    let (mut clinic, _dir) = open_session(false);
    let created = clinic
        .create_patient(
            9_790_012_000,
            "John Doe",
            "1990-01-01",
            "250-555-1234",
            "johndoe@example.com",
            "123 Main St, Anytown",
        )
        .unwrap();

    let found = clinic.search_patient(9_790_012_000).unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.birth_date, "1990-01-01");

    // Absence is a normal outcome, not an error.
    assert!(clinic.search_patient(404).unwrap().is_none());
}

#[test]
fn duplicate_phn_is_invalid_operation() {
    let (mut clinic, _dir) = open_session(false);
    clinic
        .create_patient(1, "A", "1990-01-01", "", "", "")
        .unwrap();
    assert!(matches!(
        clinic
            .create_patient(1, "B", "1991-02-02", "", "", "")
            .unwrap_err(),
        ClinicError::InvalidOperation
    ));
}

#[test]
fn retrieve_patients_matches_name_case_insensitively() {
    let (mut clinic, _dir) = open_session(false);
    clinic
        .create_patient(1, "John Doe", "1990-01-01", "", "", "")
        .unwrap();
    clinic
        .create_patient(2, "Jane Doe", "1991-02-02", "", "", "")
        .unwrap();
    clinic
        .create_patient(3, "Alex Roe", "1992-03-03", "", "", "")
        .unwrap();

    let does = clinic.retrieve_patients("dOe").unwrap();
    assert_eq!(does.len(), 2);
    assert!(clinic.retrieve_patients("missing").unwrap().is_empty());
}

#[test]
fn store_holds_exactly_the_non_deleted_patients() {
    let (mut clinic, _dir) = open_session(false);
    for phn in [1, 2, 3, 4] {
        clinic
            .create_patient(phn, "P", "1990-01-01", "", "", "")
            .unwrap();
    }
    clinic.delete_patient(2).unwrap();
    clinic.delete_patient(4).unwrap();
    clinic
        .create_patient(5, "P", "1990-01-01", "", "", "")
        .unwrap();

    let phns: Vec<u64> = clinic
        .list_patients()
        .unwrap()
        .iter()
        .map(|patient| patient.phn)
        .collect();
    assert_eq!(phns, vec![1, 3, 5]);
    assert!(clinic.search_patient(2).unwrap().is_none());
}

#[test]
fn update_overwrites_only_supplied_fields() {
    let (mut clinic, _dir) = open_session(false);
    clinic
        .create_patient(1, "John Doe", "1990-01-01", "250-555-1234", "j@x.com", "Main St")
        .unwrap();

    let changed = clinic
        .update_patient(
            1,
            PatientPatch {
                phone: Some("250-555-9999".to_string()),
                address: Some("Side St".to_string()),
                ..PatientPatch::default()
            },
        )
        .unwrap();
    assert!(changed);

    let patient = clinic.search_patient(1).unwrap().unwrap();
    assert_eq!(patient.phone, "250-555-9999");
    assert_eq!(patient.address, "Side St");
    assert_eq!(patient.name, "John Doe");
    assert_eq!(patient.email, "j@x.com");
}

#[test]
fn rekey_moves_the_entry_to_the_new_key() {
    let (mut clinic, _dir) = open_session(false);
    clinic
        .create_patient(1, "John Doe", "1990-01-01", "", "", "")
        .unwrap();

    clinic
        .update_patient(
            1,
            PatientPatch {
                new_phn: Some(99),
                name: Some("John D. Doe".to_string()),
                ..PatientPatch::default()
            },
        )
        .unwrap();

    assert!(clinic.search_patient(1).unwrap().is_none());
    let moved = clinic.search_patient(99).unwrap().unwrap();
    assert_eq!(moved.phn, 99);
    assert_eq!(moved.name, "John D. Doe");
}

#[test]
fn rekey_to_an_occupied_phn_is_invalid_operation() {
    let (mut clinic, _dir) = open_session(false);
    clinic
        .create_patient(1, "A", "1990-01-01", "", "", "")
        .unwrap();
    clinic
        .create_patient(2, "B", "1991-02-02", "", "", "")
        .unwrap();

    assert!(matches!(
        clinic
            .update_patient(
                1,
                PatientPatch {
                    new_phn: Some(2),
                    ..PatientPatch::default()
                },
            )
            .unwrap_err(),
        ClinicError::InvalidOperation
    ));
    // Both entries are untouched on failure.
    assert_eq!(clinic.search_patient(1).unwrap().unwrap().name, "A");
    assert_eq!(clinic.search_patient(2).unwrap().unwrap().name, "B");
}

#[test]
fn update_and_delete_of_unknown_phn_are_invalid_operation() {
    let (mut clinic, _dir) = open_session(false);
    assert!(matches!(
        clinic
            .update_patient(404, PatientPatch::default())
            .unwrap_err(),
        ClinicError::InvalidOperation
    ));
    assert!(matches!(
        clinic.delete_patient(404).unwrap_err(),
        ClinicError::InvalidOperation
    ));
}

#[test]
fn autosave_persists_patients_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut clinic = service_in(&dir, true);
        clinic
            .create_patient(1, "John Doe", "1990-01-01", "", "", "")
            .unwrap();
        clinic
            .create_patient(2, "Jane Doe", "1991-02-02", "", "", "")
            .unwrap();
        clinic.delete_patient(1).unwrap();
    }

    let clinic = service_in(&dir, true);
    let survivors = clinic.list_patients().unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].phn, 2);
    assert_eq!(survivors[0].name, "Jane Doe");
}

#[test]
fn autosave_off_never_touches_the_backing_file() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut clinic = service_in(&dir, false);
        clinic
            .create_patient(1, "Memory Only", "1990-01-01", "", "", "")
            .unwrap();
    }
    assert!(!dir.path().join("patients.json").exists());

    let clinic = service_in(&dir, false);
    assert!(clinic.list_patients().unwrap().is_empty());
}
