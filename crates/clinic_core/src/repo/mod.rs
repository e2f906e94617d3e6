//! Store layer: file-backed patient table and per-patient note stores.
//!
//! # Responsibility
//! - Own all persisted state and the whole-file load/save policy.
//! - Return semantic errors (`DuplicateKey`, `UnknownKey`) in addition to
//!   transport errors, so the gate can map them to its taxonomy.
//!
//! # Invariants
//! - With autosave on, every mutating call rewrites the whole backing file
//!   before returning; there are no partial or incremental writes.
//! - With autosave off, the backing files are never read or written.

use crate::codec::CodecError;
use crate::model::patient::Phn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;
pub mod patient_repo;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from patient/note store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing file could not be read or written.
    Io(std::io::Error),
    /// Persisted contents could not be encoded or decoded.
    Codec(CodecError),
    /// The key is already occupied by another entry.
    DuplicateKey(Phn),
    /// No entry exists under the key.
    UnknownKey(Phn),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "store file access failed: {err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::DuplicateKey(phn) => write!(f, "health number already in use: {phn}"),
            Self::UnknownKey(phn) => write!(f, "no patient with health number: {phn}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::DuplicateKey(_) => None,
            Self::UnknownKey(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}
