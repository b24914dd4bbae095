//! Record types persisted by the store.
//!
//! Patients and diagnoses are created by merging a caller payload: fields the store does not know
//! about are kept in `extra` and written back verbatim. Record ids are integers, but payloads
//! coming from HTML forms carry them as strings, so id fields accept either form.

use crate::constants::RECORD_KIND_FIELD;
use crate::{StoreError, StoreResult};
use chrono::{SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// USERS AND SESSIONS
// ============================================================================

/// Authorisation role of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Clinician,
    Patient,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Clinician => "clinician",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account, looked up by `username`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: Role,
    /// External identifier. For patients this is the id of their patient record.
    #[serde(default)]
    pub id: String,
    /// Opaque hash, produced and verified outside the store.
    #[serde(default)]
    pub password_hash: String,
}

impl User {
    /// Identifier used to match a patient user against patient and diagnosis records.
    ///
    /// Falls back to the username when the account carries no id.
    pub fn patient_ref(&self) -> &str {
        if self.id.trim().is_empty() {
            &self.username
        } else {
            &self.id
        }
    }
}

/// An authenticated session: a caller-issued token bound to a user snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

// ============================================================================
// CLINICAL RECORDS
// ============================================================================

/// A stored patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(deserialize_with = "record_id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a patient. `id` is assigned by the store when absent or zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    #[serde(
        default,
        deserialize_with = "optional_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewPatient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn requested_id(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }

    pub(crate) fn validate(&self) -> StoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("name is required".into()));
        }
        Ok(())
    }

    pub(crate) fn into_patient(mut self, id: u64) -> Patient {
        self.extra.remove(RECORD_KIND_FIELD);
        Patient {
            id,
            name: self.name,
            dob: self.dob,
            gender: self.gender,
            contact: self.contact,
            extra: self.extra,
        }
    }
}

/// A stored diagnosis. `patient_id` is not checked against the patient collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    #[serde(deserialize_with = "record_id")]
    pub id: u64,
    #[serde(deserialize_with = "record_id")]
    pub patient_id: u64,
    #[serde(default)]
    pub namaste_code: String,
    #[serde(default)]
    pub icd11_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a diagnosis. `timestamp` defaults to the creation time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDiagnosis {
    #[serde(
        default,
        deserialize_with = "optional_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(
        default,
        deserialize_with = "optional_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub patient_id: Option<u64>,
    #[serde(default)]
    pub namaste_code: String,
    #[serde(default)]
    pub icd11_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewDiagnosis {
    pub fn new(
        patient_id: u64,
        namaste_code: impl Into<String>,
        icd11_code: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: Some(patient_id),
            namaste_code: namaste_code.into(),
            icd11_code: icd11_code.into(),
            ..Self::default()
        }
    }

    pub(crate) fn requested_id(&self) -> Option<u64> {
        self.id.filter(|id| *id != 0)
    }

    pub(crate) fn validate(&self) -> StoreResult<()> {
        match self.patient_id {
            Some(id) if id != 0 => Ok(()),
            _ => Err(StoreError::InvalidInput("patient_id required".into())),
        }
    }

    pub(crate) fn into_diagnosis(mut self, id: u64) -> Diagnosis {
        self.extra.remove(RECORD_KIND_FIELD);
        let timestamp = self
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));

        Diagnosis {
            id,
            patient_id: self.patient_id.unwrap_or_default(),
            namaste_code: self.namaste_code,
            icd11_code: self.icd11_code,
            note: self.note,
            timestamp,
            extra: self.extra,
        }
    }
}

/// Kind tag attached to entries of a combined view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Patient,
    Diagnosis,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Patient => "patient",
            RecordKind::Diagnosis => "diagnosis",
        }
    }
}

/// One entry of a combined view, serialised as the record's fields plus `"type"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CombinedEntry {
    Patient(Patient),
    Diagnosis(Diagnosis),
}

impl CombinedEntry {
    pub fn kind(&self) -> RecordKind {
        match self {
            CombinedEntry::Patient(_) => RecordKind::Patient,
            CombinedEntry::Diagnosis(_) => RecordKind::Diagnosis,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            CombinedEntry::Patient(p) => p.id,
            CombinedEntry::Diagnosis(d) => d.id,
        }
    }
}

// ============================================================================
// REFERENCE DATA
// ============================================================================

/// A single code with its display text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    pub code: String,
    #[serde(default)]
    pub display: String,
}

impl CodeEntry {
    pub fn new(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: display.into(),
        }
    }
}

/// Both code families. Missing families read as empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codes {
    #[serde(default)]
    pub namaste: Vec<CodeEntry>,
    #[serde(default)]
    pub icd11: Vec<CodeEntry>,
}

impl Codes {
    pub fn is_empty(&self) -> bool {
        self.namaste.is_empty() && self.icd11.is_empty()
    }
}

// ============================================================================
// ID DESERIALISATION
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn parse_raw_id<E: de::Error>(raw: RawId) -> Result<Option<u64>, E> {
    match raw {
        RawId::Number(n) => Ok(Some(n)),
        RawId::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<u64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid record id: {text:?}")))
        }
    }
}

fn record_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawId::deserialize(deserializer)?;
    parse_raw_id(raw)?.ok_or_else(|| de::Error::custom("record id cannot be empty"))
}

fn optional_record_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        Some(raw) => parse_raw_id(raw),
        None => Ok(None),
    }
}
