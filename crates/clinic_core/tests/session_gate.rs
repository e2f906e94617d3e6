use clinic_core::{
    password_digest, ClinicConfig, ClinicError, ClinicService, CredentialTable, PatientPatch,
    SessionState,
};
use tempfile::TempDir;

fn service(autosave: bool) -> (ClinicService, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ClinicConfig::new(autosave, dir.path());
    let credentials =
        CredentialTable::parse(&format!("ops,{}\n", password_digest("secret"))).unwrap();
    let service = ClinicService::new(&config, credentials).unwrap();
    (service, dir)
}

#[test]
fn login_with_valid_credentials_authenticates() {
    let (mut clinic, _dir) = service(false);
    assert!(clinic.login("ops", "secret").unwrap());
    assert_eq!(
        clinic.session(),
        &SessionState::Authenticated("ops".to_string())
    );
}

#[test]
fn second_login_without_logout_is_rejected() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    let err = clinic.login("ops", "secret").unwrap_err();
    assert!(matches!(err, ClinicError::AlreadyAuthenticated));
}

#[test]
fn unknown_user_and_wrong_password_are_invalid_credentials() {
    let (mut clinic, _dir) = service(false);
    assert!(matches!(
        clinic.login("nobody", "secret").unwrap_err(),
        ClinicError::InvalidCredentials
    ));
    assert!(matches!(
        clinic.login("ops", "wrong").unwrap_err(),
        ClinicError::InvalidCredentials
    ));
    assert_eq!(clinic.session(), &SessionState::Anonymous);
}

#[test]
fn logout_without_login_is_rejected() {
    let (mut clinic, _dir) = service(false);
    assert!(matches!(
        clinic.logout().unwrap_err(),
        ClinicError::NotAuthenticated
    ));
}

#[test]
fn every_gated_operation_is_denied_while_anonymous() {
    let (mut clinic, _dir) = service(false);
    assert!(matches!(
        clinic
            .create_patient(1, "A", "1990-01-01", "", "", "")
            .unwrap_err(),
        ClinicError::AccessDenied
    ));
    assert!(matches!(
        clinic.list_patients().unwrap_err(),
        ClinicError::AccessDenied
    ));
    assert!(matches!(
        clinic.select_patient(1).unwrap_err(),
        ClinicError::AccessDenied
    ));
    assert!(matches!(
        clinic.current_patient().unwrap_err(),
        ClinicError::AccessDenied
    ));
}

#[test]
fn access_check_precedes_selection_check_for_note_operations() {
    let (mut clinic, _dir) = service(false);

    // Anonymous and unselected: the access failure wins.
    assert!(matches!(
        clinic.add_note("x").unwrap_err(),
        ClinicError::AccessDenied
    ));
    assert!(matches!(
        clinic.list_notes().unwrap_err(),
        ClinicError::AccessDenied
    ));

    clinic.login("ops", "secret").unwrap();
    assert!(matches!(
        clinic.add_note("x").unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(matches!(
        clinic.search_note(1).unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(matches!(
        clinic.retrieve_notes("x").unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(matches!(
        clinic.update_note(1, "x").unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(matches!(
        clinic.delete_note(1).unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(matches!(
        clinic.list_notes().unwrap_err(),
        ClinicError::NoPatientSelected
    ));
}

#[test]
fn select_unknown_patient_is_invalid_operation() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    assert!(matches!(
        clinic.select_patient(404).unwrap_err(),
        ClinicError::InvalidOperation
    ));
}

#[test]
fn deselect_without_selection_is_invalid_operation() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    assert!(matches!(
        clinic.deselect_patient().unwrap_err(),
        ClinicError::InvalidOperation
    ));
}

#[test]
fn selected_patient_rejects_update_rekey_and_delete() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    clinic
        .create_patient(1, "A", "1990-01-01", "", "", "")
        .unwrap();
    clinic.select_patient(1).unwrap();

    let field_patch = PatientPatch {
        name: Some("B".to_string()),
        ..PatientPatch::default()
    };
    assert!(matches!(
        clinic.update_patient(1, field_patch.clone()).unwrap_err(),
        ClinicError::InvalidOperation
    ));

    let rekey_patch = PatientPatch {
        new_phn: Some(2),
        ..PatientPatch::default()
    };
    assert!(matches!(
        clinic.update_patient(1, rekey_patch).unwrap_err(),
        ClinicError::InvalidOperation
    ));

    assert!(matches!(
        clinic.delete_patient(1).unwrap_err(),
        ClinicError::InvalidOperation
    ));

    // Deselecting lifts the guard.
    clinic.deselect_patient().unwrap();
    assert!(clinic.update_patient(1, field_patch).unwrap());
    assert!(clinic.delete_patient(1).unwrap());
}

#[test]
fn logout_clears_the_selected_patient() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    clinic
        .create_patient(1, "A", "1990-01-01", "", "", "")
        .unwrap();
    clinic.select_patient(1).unwrap();
    clinic.logout().unwrap();

    clinic.login("ops", "secret").unwrap();
    assert!(matches!(
        clinic.list_notes().unwrap_err(),
        ClinicError::NoPatientSelected
    ));
    assert!(clinic.current_patient().unwrap().is_none());
}

#[test]
fn current_patient_follows_selection() {
    let (mut clinic, _dir) = service(false);
    clinic.login("ops", "secret").unwrap();
    clinic
        .create_patient(7, "Selected Person", "1990-01-01", "", "", "")
        .unwrap();

    assert!(clinic.current_patient().unwrap().is_none());
    clinic.select_patient(7).unwrap();
    let current = clinic.current_patient().unwrap().unwrap();
    assert_eq!(current.phn, 7);
    assert_eq!(current.name, "Selected Person");
    clinic.deselect_patient().unwrap();
    assert!(clinic.current_patient().unwrap().is_none());
}
