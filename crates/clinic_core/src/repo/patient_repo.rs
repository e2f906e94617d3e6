//! Patient table store.
//!
//! # Responsibility
//! - Own the single in-memory patient table, keyed by health number.
//! - Load the whole table at construction and rewrite the whole backing
//!   file after every mutation when autosave is on.
//! - Keep codec details behind the `PatientTableCodec` seam.
//!
//! # Invariants
//! - Health numbers are unique across the table at all times.
//! - Rekeying moves the entry and its note-store binding to the new key;
//!   note codes are untouched.
//! - Deleting a patient never erases its per-patient note file.

use crate::codec::PatientTableCodec;
use crate::config::ClinicConfig;
use crate::model::patient::{Patient, PatientPatch, Phn};
use crate::repo::{StoreError, StoreResult};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Single-file collection of patients with a pluggable table codec.
pub struct PatientStore<C> {
    codec: C,
    patients: BTreeMap<Phn, Patient>,
    autosave: bool,
    table_path: PathBuf,
    records_dir: PathBuf,
}

impl<C: PatientTableCodec> PatientStore<C> {
    /// Opens the store under `config`.
    ///
    /// With autosave on, the whole table is decoded from the backing file
    /// and every record is re-attached to its per-patient note file, which
    /// is authoritative for notes. With autosave off, the store starts
    /// empty and never touches the filesystem.
    pub fn open(codec: C, config: &ClinicConfig) -> StoreResult<Self> {
        let table_path = config.patients_file();
        let records_dir = config.records_dir();

        let patients = if config.autosave {
            let mut table = load_table(&codec, &table_path)?;
            for patient in table.values_mut() {
                patient.record_mut().attach(&records_dir)?;
            }
            info!(
                "event=table_load module=patient_store status=ok count={}",
                table.len()
            );
            table
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            codec,
            patients,
            autosave: config.autosave,
            table_path,
            records_dir,
        })
    }

    /// Inserts a new patient and returns a copy of it.
    ///
    /// Fails with `DuplicateKey` when the health number is occupied. With
    /// autosave on, the new record binds to its per-patient file (a file
    /// retained from an earlier patient under the same number is picked up
    /// as-is) and the whole table is persisted before returning.
    pub fn create(
        &mut self,
        phn: Phn,
        name: &str,
        birth_date: &str,
        phone: &str,
        email: &str,
        address: &str,
    ) -> StoreResult<Patient> {
        if self.patients.contains_key(&phn) {
            return Err(StoreError::DuplicateKey(phn));
        }

        let mut patient = Patient::new(phn, name, birth_date, phone, email, address);
        if self.autosave {
            patient.record_mut().attach(&self.records_dir)?;
        }
        let created = patient.clone();
        self.patients.insert(phn, patient);
        self.save()?;
        info!("event=patient_create module=patient_store status=ok phn={phn}");
        Ok(created)
    }

    /// Looks a patient up by health number; absence is a normal outcome.
    pub fn find(&self, phn: Phn) -> Option<&Patient> {
        self.patients.get(&phn)
    }

    pub(crate) fn find_mut(&mut self, phn: Phn) -> Option<&mut Patient> {
        self.patients.get_mut(&phn)
    }

    pub fn contains(&self, phn: Phn) -> bool {
        self.patients.contains_key(&phn)
    }

    /// All patients whose name contains `text`, case-insensitively.
    pub fn find_by_name(&self, text: &str) -> Vec<Patient> {
        let needle = text.to_lowercase();
        self.patients
            .values()
            .filter(|patient| patient.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// All patients in store order (ascending health number).
    ///
    /// The order is store-defined; callers must not rely on it.
    pub fn list_all(&self) -> Vec<Patient> {
        self.patients.values().cloned().collect()
    }

    /// Applies an optional-field patch, rekeying when `new_phn` differs.
    ///
    /// Fails with `UnknownKey` for an unknown patient and `DuplicateKey`
    /// when the requested new health number is already occupied.
    pub fn update(&mut self, phn: Phn, patch: &PatientPatch) -> StoreResult<()> {
        if !self.patients.contains_key(&phn) {
            return Err(StoreError::UnknownKey(phn));
        }

        match patch.new_phn {
            Some(new_phn) if new_phn != phn => {
                if self.patients.contains_key(&new_phn) {
                    return Err(StoreError::DuplicateKey(new_phn));
                }
                let Some(mut patient) = self.patients.remove(&phn) else {
                    return Err(StoreError::UnknownKey(phn));
                };
                patient.rekey(new_phn);
                apply_fields(&mut patient, patch);
                self.patients.insert(new_phn, patient);
                info!(
                    "event=patient_rekey module=patient_store status=ok phn={phn} new_phn={new_phn}"
                );
            }
            _ => {
                let Some(patient) = self.patients.get_mut(&phn) else {
                    return Err(StoreError::UnknownKey(phn));
                };
                apply_fields(patient, patch);
            }
        }

        self.save()
    }

    /// Removes a patient; fails with `UnknownKey` when absent.
    ///
    /// The per-patient note file is intentionally left in place.
    pub fn delete(&mut self, phn: Phn) -> StoreResult<()> {
        if self.patients.remove(&phn).is_none() {
            return Err(StoreError::UnknownKey(phn));
        }
        self.save()?;
        info!("event=patient_delete module=patient_store status=ok phn={phn}");
        Ok(())
    }

    fn save(&self) -> StoreResult<()> {
        if !self.autosave {
            return Ok(());
        }
        if let Some(parent) = self.table_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let encoded = self.codec.encode_table(&self.patients)?;
        std::fs::write(&self.table_path, encoded)?;
        Ok(())
    }
}

/// Decodes the persisted table; missing or empty files yield an empty
/// table. Pure with respect to the store: the caller assigns the result.
fn load_table<C: PatientTableCodec>(
    codec: &C,
    table_path: &Path,
) -> StoreResult<BTreeMap<Phn, Patient>> {
    let contents = match std::fs::read_to_string(table_path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(err.into()),
    };
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(codec.decode_table(&contents)?)
}

fn apply_fields(patient: &mut Patient, patch: &PatientPatch) {
    if let Some(name) = &patch.name {
        patient.name = name.clone();
    }
    if let Some(birth_date) = &patch.birth_date {
        patient.birth_date = birth_date.clone();
    }
    if let Some(phone) = &patch.phone {
        patient.phone = phone.clone();
    }
    if let Some(email) = &patch.email {
        patient.email = email.clone();
    }
    if let Some(address) = &patch.address {
        patient.address = address.clone();
    }
}
