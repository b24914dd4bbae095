//! # Records Core
//!
//! File-backed record store for the clinical records service.
//!
//! This crate contains pure data operations over five independently persisted collections:
//! - users, patients, diagnoses, codes (reference data) and sessions
//! - one JSON document per collection under the configured data directory
//! - per-collection reader-writer locks shared by every store handle
//!
//! **No API concerns**: Authentication, HTTP servers, or FHIR translation belong in `api-rest`,
//! `api-shared`, or `fhir`.

pub mod config;
pub mod constants;
pub mod error;
pub mod locks;
pub mod models;
pub mod repositories;
pub mod store;

pub use config::CoreConfig;
pub use constants::{DEFAULT_DATA_DIR, DEFAULT_REFERENCE_DATA_DIR};
pub use error::{StoreError, StoreResult};
pub use locks::{Collection, CollectionLocks};
pub use models::{
    CodeEntry, Codes, CombinedEntry, Diagnosis, NewDiagnosis, NewPatient, Patient, RecordKind,
    Role, Session, User,
};
pub use store::RecordStore;
