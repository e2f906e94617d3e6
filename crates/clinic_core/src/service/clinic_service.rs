//! Clinic session gate and use-case facade.
//!
//! # Responsibility
//! - Own the login state machine and the selected-patient key.
//! - Check access before selection, selection before delegation; a failed
//!   check has no side effect.
//!
//! # Invariants
//! - The selected patient is held as a key (`Option<Phn>`), never as a
//!   shared object reference, so selection cannot alias a mutated patient.
//! - A selected patient cannot be updated, rekeyed, or deleted until it is
//!   deselected.
//! - The credential table is read-only for the process lifetime.

use crate::auth::CredentialTable;
use crate::codec::json::JsonTableCodec;
use crate::codec::PatientTableCodec;
use crate::config::ClinicConfig;
use crate::model::note::Note;
use crate::model::patient::{Patient, PatientPatch, Phn};
use crate::repo::patient_repo::PatientStore;
use crate::repo::StoreError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ClinicResult<T> = Result<T, ClinicError>;

/// Caller-visible error kinds for every gate operation.
///
/// All variants signal a precondition violation and are non-retryable;
/// `Storage` alone wraps transport faults from the backing files. The core
/// never formats user-facing messages from these — `Display` output is
/// diagnostic only.
#[derive(Debug)]
pub enum ClinicError {
    /// `login` while a session is already authenticated.
    AlreadyAuthenticated,
    /// Unknown username or digest mismatch.
    InvalidCredentials,
    /// `logout` without an authenticated session.
    NotAuthenticated,
    /// Any gated operation without an authenticated session.
    AccessDenied,
    /// Duplicate key, unknown key, or acting on the selected patient.
    InvalidOperation,
    /// Note operation without a selected patient.
    NoPatientSelected,
    /// Backing file I/O or codec failure.
    Storage(StoreError),
}

impl Display for ClinicError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAuthenticated => write!(f, "a user is already logged in"),
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::NotAuthenticated => write!(f, "no user is logged in"),
            Self::AccessDenied => write!(f, "operation requires an authenticated session"),
            Self::InvalidOperation => write!(f, "operation violates a patient-store rule"),
            Self::NoPatientSelected => write!(f, "operation requires a selected patient"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ClinicError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ClinicError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateKey(_) | StoreError::UnknownKey(_) => Self::InvalidOperation,
            other => Self::Storage(other),
        }
    }
}

/// Login state of the single operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(String),
}

/// The session & access gate: single entry point for the presentation
/// layer.
pub struct ClinicService<C: PatientTableCodec = JsonTableCodec> {
    session: SessionState,
    selected: Option<Phn>,
    credentials: CredentialTable,
    patients: PatientStore<C>,
}

impl ClinicService<JsonTableCodec> {
    /// Opens the service with the JSON table codec.
    pub fn new(config: &ClinicConfig, credentials: CredentialTable) -> ClinicResult<Self> {
        Self::with_codec(config, credentials, JsonTableCodec)
    }
}

impl<C: PatientTableCodec> ClinicService<C> {
    /// Opens the service with a caller-provided table codec.
    ///
    /// With autosave on, the patient table is loaded here; storage faults
    /// surface as `ClinicError::Storage`.
    pub fn with_codec(
        config: &ClinicConfig,
        credentials: CredentialTable,
        codec: C,
    ) -> ClinicResult<Self> {
        let patients = PatientStore::open(codec, config)?;
        Ok(Self {
            session: SessionState::Anonymous,
            selected: None,
            credentials,
            patients,
        })
    }

    /// Current login state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Authenticates the operator session.
    pub fn login(&mut self, username: &str, password: &str) -> ClinicResult<bool> {
        if let SessionState::Authenticated(_) = self.session {
            return Err(ClinicError::AlreadyAuthenticated);
        }
        if !self.credentials.verify(username, password) {
            warn!("event=login module=gate status=denied user={username}");
            return Err(ClinicError::InvalidCredentials);
        }
        self.session = SessionState::Authenticated(username.to_string());
        info!("event=login module=gate status=ok user={username}");
        Ok(true)
    }

    /// Ends the session and clears any selected patient.
    pub fn logout(&mut self) -> ClinicResult<bool> {
        let SessionState::Authenticated(username) = &self.session else {
            return Err(ClinicError::NotAuthenticated);
        };
        info!("event=logout module=gate status=ok user={username}");
        self.session = SessionState::Anonymous;
        self.selected = None;
        Ok(true)
    }

    /// Creates a patient; duplicate health numbers are rejected.
    pub fn create_patient(
        &mut self,
        phn: Phn,
        name: &str,
        birth_date: &str,
        phone: &str,
        email: &str,
        address: &str,
    ) -> ClinicResult<Patient> {
        self.require_auth()?;
        Ok(self
            .patients
            .create(phn, name, birth_date, phone, email, address)?)
    }

    /// Looks up one patient; absence is a normal outcome.
    pub fn search_patient(&self, phn: Phn) -> ClinicResult<Option<Patient>> {
        self.require_auth()?;
        Ok(self.patients.find(phn).cloned())
    }

    /// All patients whose name contains `text`, case-insensitively.
    pub fn retrieve_patients(&self, text: &str) -> ClinicResult<Vec<Patient>> {
        self.require_auth()?;
        Ok(self.patients.find_by_name(text))
    }

    /// All patients, in store-defined order.
    pub fn list_patients(&self) -> ClinicResult<Vec<Patient>> {
        self.require_auth()?;
        Ok(self.patients.list_all())
    }

    /// Applies an optional-field patch; rejected for the selected patient.
    pub fn update_patient(&mut self, phn: Phn, patch: PatientPatch) -> ClinicResult<bool> {
        self.require_auth()?;
        if self.selected == Some(phn) {
            return Err(ClinicError::InvalidOperation);
        }
        self.patients.update(phn, &patch)?;
        Ok(true)
    }

    /// Deletes a patient; rejected for the selected patient.
    ///
    /// The per-patient note file is retained on purpose.
    pub fn delete_patient(&mut self, phn: Phn) -> ClinicResult<bool> {
        self.require_auth()?;
        if self.selected == Some(phn) {
            return Err(ClinicError::InvalidOperation);
        }
        self.patients.delete(phn)?;
        Ok(true)
    }

    /// Puts a patient in focus for note operations.
    pub fn select_patient(&mut self, phn: Phn) -> ClinicResult<()> {
        self.require_auth()?;
        if !self.patients.contains(phn) {
            return Err(ClinicError::InvalidOperation);
        }
        self.selected = Some(phn);
        Ok(())
    }

    /// Clears the patient focus.
    pub fn deselect_patient(&mut self) -> ClinicResult<bool> {
        self.require_auth()?;
        if self.selected.is_none() {
            return Err(ClinicError::InvalidOperation);
        }
        self.selected = None;
        Ok(true)
    }

    /// The patient currently in focus, if any.
    pub fn current_patient(&self) -> ClinicResult<Option<Patient>> {
        self.require_auth()?;
        Ok(self
            .selected
            .and_then(|phn| self.patients.find(phn))
            .cloned())
    }

    /// Adds a note to the selected patient's record.
    pub fn add_note(&mut self, text: &str) -> ClinicResult<Note> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find_mut(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record_mut().create_note(text)?)
    }

    /// Finds a note by code in the selected patient's record.
    pub fn search_note(&self, code: u64) -> ClinicResult<Option<Note>> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record().search_note(code))
    }

    /// Notes in the selected record containing `text` (case-sensitive).
    pub fn retrieve_notes(&self, text: &str) -> ClinicResult<Vec<Note>> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record().retrieve_notes(text))
    }

    /// Replaces a note's text; `false` when the code is unknown.
    pub fn update_note(&mut self, code: u64, new_text: &str) -> ClinicResult<bool> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find_mut(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record_mut().update_note(code, new_text)?)
    }

    /// Deletes a note; `false` when the code is unknown.
    pub fn delete_note(&mut self, code: u64) -> ClinicResult<bool> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find_mut(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record_mut().delete_note(code)?)
    }

    /// All notes of the selected patient, newest first.
    pub fn list_notes(&self) -> ClinicResult<Vec<Note>> {
        let phn = self.selected_phn()?;
        let Some(patient) = self.patients.find(phn) else {
            return Err(ClinicError::InvalidOperation);
        };
        Ok(patient.record().list_notes())
    }

    fn require_auth(&self) -> ClinicResult<()> {
        match self.session {
            SessionState::Authenticated(_) => Ok(()),
            SessionState::Anonymous => Err(ClinicError::AccessDenied),
        }
    }

    /// Access check first, selection check second.
    fn selected_phn(&self) -> ClinicResult<Phn> {
        self.require_auth()?;
        self.selected.ok_or(ClinicError::NoPatientSelected)
    }
}
