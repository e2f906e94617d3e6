//! Session & access gate.
//!
//! # Responsibility
//! - Provide the single synchronous entry point used by the presentation
//!   layer.
//! - Enforce session and selection preconditions before delegating to the
//!   stores.
//!
//! # See also
//! - `crate::repo` for the persistence contracts the gate delegates to.

pub mod clinic_service;
