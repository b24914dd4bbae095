//! FHIR-like translation of stored clinical records.
//!
//! This crate provides **wire models** and **translation helpers** that turn records held by the
//! record store into FHIR-shaped JSON resources:
//! - `Patient` resources from patients
//! - `Condition` resources from diagnoses
//! - `Bundle`s wrapping either
//!
//! Translation is pure and stateless. This crate never reads or writes the store; callers hand
//! it records they already loaded.

pub mod bundle;
pub mod condition;
pub mod patient;

pub use bundle::{diagnosis_document, record_to_bundle, Bundle, BundleEntry, BundleType, Resource};
pub use condition::{diagnosis_to_condition, ConditionResource};
pub use patient::{patient_to_fhir, PatientResource};

/// Coding system for NAMASTE codes.
pub const NAMASTE_SYSTEM: &str = "urn:namaste";

/// Coding system for ICD-11 MMS codes.
pub const ICD11_SYSTEM: &str = "http://id.who.int/icd/release/11";

/// Short NAMASTE system label used in single-diagnosis document bundles.
pub const NAMASTE_LABEL: &str = "NAMASTE";

/// Short ICD-11 system label used in single-diagnosis document bundles.
pub const ICD11_LABEL: &str = "ICD-11";

/// Errors returned by the `fhir` crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Render any resource or bundle as pretty-printed JSON text.
pub fn render_json<T: serde::Serialize>(value: &T) -> FhirResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
