//! Patient domain model.
//!
//! # Responsibility
//! - Define the patient entity and the record that owns its notes.
//! - Provide the optional-field patch shape used by patient updates.
//!
//! # Invariants
//! - `phn` changes only through the store's rekey path, never in place by
//!   callers.
//! - A record's note store is bound to exactly one health number at a time;
//!   rekeying re-points the binding without renumbering notes.
//! - Patient equality covers the identity and attribute fields only, not
//!   the owned record.

use crate::model::note::Note;
use crate::repo::note_repo::NoteStore;
use crate::repo::StoreResult;
use std::path::Path;

/// Personal health number, the patient's unique identity key.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type Phn = u64;

/// A patient known to the clinic.
#[derive(Debug, Clone)]
pub struct Patient {
    /// Unique health number, mutable only via an explicit rekey.
    pub phn: Phn,
    pub name: String,
    pub birth_date: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    record: PatientRecord,
}

impl Patient {
    /// Creates a patient with a fresh, memory-only record.
    pub fn new(
        phn: Phn,
        name: impl Into<String>,
        birth_date: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            phn,
            name: name.into(),
            birth_date: birth_date.into(),
            phone: phone.into(),
            email: email.into(),
            address: address.into(),
            record: PatientRecord::new(phn),
        }
    }

    /// Rebuilds a patient around an already-populated record.
    ///
    /// Used by the codec when decoding a persisted table.
    pub(crate) fn from_parts(
        phn: Phn,
        name: String,
        birth_date: String,
        phone: String,
        email: String,
        address: String,
        record: PatientRecord,
    ) -> Self {
        Self {
            phn,
            name,
            birth_date,
            phone,
            email,
            address,
            record,
        }
    }

    /// The medical record owning this patient's notes.
    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    pub(crate) fn record_mut(&mut self) -> &mut PatientRecord {
        &mut self.record
    }

    /// Moves the patient, record binding included, to a new health number.
    pub(crate) fn rekey(&mut self, new_phn: Phn) {
        self.phn = new_phn;
        self.record.rebind(new_phn);
    }
}

impl PartialEq for Patient {
    fn eq(&self, other: &Self) -> bool {
        self.phn == other.phn
            && self.name == other.name
            && self.birth_date == other.birth_date
            && self.phone == other.phone
            && self.email == other.email
            && self.address == other.address
    }
}

impl Eq for Patient {}

/// Optional-field update for a patient.
///
/// `Some` overwrites the corresponding attribute, `None` leaves it
/// unchanged. `new_phn` requests a rekey when it differs from the current
/// health number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub new_phn: Option<Phn>,
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// A patient's medical record: delegation over the PHN-bound note store.
///
/// The store is created lazily for memory-only sessions; durable records
/// load their per-patient file when the patient store attaches them.
#[derive(Debug, Clone)]
pub struct PatientRecord {
    phn: Phn,
    store: Option<NoteStore>,
}

impl PatientRecord {
    pub(crate) fn new(phn: Phn) -> Self {
        Self { phn, store: None }
    }

    /// Rebuilds a record around notes decoded from the persisted table.
    pub(crate) fn preloaded(phn: Phn, notes: Vec<Note>) -> Self {
        Self {
            phn,
            store: Some(NoteStore::preloaded(phn, notes)),
        }
    }

    /// Binds the record to its per-patient file under `records_dir`.
    ///
    /// The file is authoritative: its contents replace whatever notes the
    /// record currently holds, and the autocounter is recomputed from them.
    pub(crate) fn attach(&mut self, records_dir: &Path) -> StoreResult<()> {
        self.store = Some(NoteStore::attached(self.phn, records_dir)?);
        Ok(())
    }

    /// Re-points the record at a new health number after a rekey.
    ///
    /// Notes held in memory survive; subsequent persistence targets the
    /// file named by the new key.
    pub(crate) fn rebind(&mut self, new_phn: Phn) {
        self.phn = new_phn;
        if let Some(store) = &mut self.store {
            store.rebind(new_phn);
        }
    }

    pub(crate) fn create_note(&mut self, text: &str) -> StoreResult<Note> {
        let phn = self.phn;
        self.store
            .get_or_insert_with(|| NoteStore::detached(phn))
            .create(text)
    }

    pub(crate) fn search_note(&self, code: u64) -> Option<Note> {
        self.store.as_ref().and_then(|store| store.search(code))
    }

    pub(crate) fn retrieve_notes(&self, text: &str) -> Vec<Note> {
        self.store
            .as_ref()
            .map(|store| store.search_by_text(text))
            .unwrap_or_default()
    }

    pub(crate) fn update_note(&mut self, code: u64, new_text: &str) -> StoreResult<bool> {
        match &mut self.store {
            Some(store) => store.update(code, new_text),
            None => Ok(false),
        }
    }

    pub(crate) fn delete_note(&mut self, code: u64) -> StoreResult<bool> {
        match &mut self.store {
            Some(store) => store.delete(code),
            None => Ok(false),
        }
    }

    pub(crate) fn list_notes(&self) -> Vec<Note> {
        self.store
            .as_ref()
            .map(|store| store.list_all())
            .unwrap_or_default()
    }

    /// Notes currently held in memory, in insertion order.
    pub fn notes_snapshot(&self) -> &[Note] {
        self.store
            .as_ref()
            .map(|store| store.notes())
            .unwrap_or_default()
    }
}
