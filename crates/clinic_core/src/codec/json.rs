//! JSON codec implementation.
//!
//! # Responsibility
//! - Map domain entities to/from explicit serde documents.
//! - Parse table keys back into health numbers and cross-check them against
//!   the embedded `phn` field.
//!
//! # Invariants
//! - The table document is a JSON object keyed by the decimal health
//!   number; only those keys are ever parsed as numbers.
//! - Note codes must be positive; a zero code is rejected as invalid data.

use crate::codec::{CodecError, CodecResult, PatientTableCodec};
use crate::model::note::Note;
use crate::model::patient::{Patient, PatientRecord, Phn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON implementation of the patient table codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTableCodec;

#[derive(Debug, Serialize, Deserialize)]
struct PatientDoc {
    phn: Phn,
    name: String,
    birth_date: String,
    phone_number: String,
    email: String,
    address: String,
    record: RecordDoc,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordDoc {
    notes: Vec<NoteDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NoteDoc {
    code: u64,
    text: String,
    timestamp: i64,
}

impl PatientTableCodec for JsonTableCodec {
    fn encode_table(&self, table: &BTreeMap<Phn, Patient>) -> CodecResult<String> {
        let docs: BTreeMap<String, PatientDoc> = table
            .iter()
            .map(|(phn, patient)| (phn.to_string(), patient_to_doc(patient)))
            .collect();
        Ok(serde_json::to_string_pretty(&docs)?)
    }

    fn decode_table(&self, input: &str) -> CodecResult<BTreeMap<Phn, Patient>> {
        let docs: BTreeMap<String, PatientDoc> = serde_json::from_str(input)?;
        let mut table = BTreeMap::new();
        for (key, doc) in docs {
            let phn: Phn = key.parse().map_err(|_| {
                CodecError::InvalidData(format!("non-numeric patient table key `{key}`"))
            })?;
            if phn != doc.phn {
                return Err(CodecError::InvalidData(format!(
                    "table key {phn} does not match embedded phn {}",
                    doc.phn
                )));
            }
            table.insert(phn, doc_to_patient(doc)?);
        }
        Ok(table)
    }
}

/// Encodes one patient's note list for its per-patient file.
pub fn encode_notes(notes: &[Note]) -> CodecResult<String> {
    let doc = RecordDoc {
        notes: notes.iter().map(note_to_doc).collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Decodes a per-patient note file payload.
pub fn decode_notes(input: &str) -> CodecResult<Vec<Note>> {
    let doc: RecordDoc = serde_json::from_str(input)?;
    doc.notes.into_iter().map(doc_to_note).collect()
}

fn patient_to_doc(patient: &Patient) -> PatientDoc {
    PatientDoc {
        phn: patient.phn,
        name: patient.name.clone(),
        birth_date: patient.birth_date.clone(),
        phone_number: patient.phone.clone(),
        email: patient.email.clone(),
        address: patient.address.clone(),
        record: RecordDoc {
            notes: patient
                .record()
                .notes_snapshot()
                .iter()
                .map(note_to_doc)
                .collect(),
        },
    }
}

fn doc_to_patient(doc: PatientDoc) -> CodecResult<Patient> {
    let notes = doc
        .record
        .notes
        .into_iter()
        .map(doc_to_note)
        .collect::<CodecResult<Vec<Note>>>()?;
    Ok(Patient::from_parts(
        doc.phn,
        doc.name,
        doc.birth_date,
        doc.phone_number,
        doc.email,
        doc.address,
        PatientRecord::preloaded(doc.phn, notes),
    ))
}

fn note_to_doc(note: &Note) -> NoteDoc {
    NoteDoc {
        code: note.code,
        text: note.text.clone(),
        timestamp: note.timestamp,
    }
}

fn doc_to_note(doc: NoteDoc) -> CodecResult<Note> {
    if doc.code == 0 {
        return Err(CodecError::InvalidData(
            "note code must be positive".to_string(),
        ));
    }
    Ok(Note::from_parts(doc.code, doc.text, doc.timestamp))
}
