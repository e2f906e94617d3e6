//! Persistence codec for the patient table and per-patient note files.
//!
//! # Responsibility
//! - Translate the patient/record/note graph to and from the persisted
//!   textual representation.
//! - Reject invalid persisted state instead of masking it.
//!
//! # Invariants
//! - Key coercion is scoped to the table's health-number keys; note codes
//!   and note text are never coerced or inspected.

use crate::model::patient::{Patient, Phn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json;

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors from encoding or decoding persisted state.
#[derive(Debug)]
pub enum CodecError {
    /// The payload is not well-formed for the representation.
    Malformed(serde_json::Error),
    /// The payload parsed but violates an entity rule.
    InvalidData(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed persisted payload: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// Pluggable codec for the whole patient table.
///
/// Implementations must round-trip every patient's health number, attribute
/// fields, and nested note collection.
pub trait PatientTableCodec {
    /// Encodes the whole table into the persisted representation.
    fn encode_table(&self, table: &BTreeMap<Phn, Patient>) -> CodecResult<String>;
    /// Decodes the whole table, reconstructing each patient with a
    /// populated record (autocounter recomputed from the note codes).
    fn decode_table(&self, input: &str) -> CodecResult<BTreeMap<Phn, Patient>>;
}
