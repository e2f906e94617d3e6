//! Core domain logic for the clinic record keeper.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::{password_digest, CredentialError, CredentialTable};
pub use codec::json::JsonTableCodec;
pub use codec::{CodecError, CodecResult, PatientTableCodec};
pub use config::ClinicConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::Note;
pub use model::patient::{Patient, PatientPatch, PatientRecord, Phn};
pub use repo::note_repo::NoteStore;
pub use repo::patient_repo::PatientStore;
pub use repo::{StoreError, StoreResult};
pub use service::clinic_service::{ClinicError, ClinicResult, ClinicService, SessionState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
