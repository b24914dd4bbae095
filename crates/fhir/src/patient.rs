//! FHIR-aligned patient resource.
//!
//! Responsibilities:
//! - Define the wire model for a `Patient` resource
//! - Translate a stored patient into it
//!
//! Notes:
//! - Names are stored as a single free-text string, so the resource carries `name[].text` only
//! - A patient with no contact gets no `telecom` entry

use records_core::Patient;
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire types
// ============================================================================

/// Wire representation of a patient resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatientResource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanNameWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(rename = "birthDate", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telecom: Vec<ContactPointWire>,
}

/// Wire representation of a human name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HumanNameWire {
    pub text: String,
}

/// Wire representation of a contact point.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContactPointWire {
    pub system: String,
    pub value: String,
}

// ============================================================================
// Translation
// ============================================================================

/// Translate a stored patient into a `Patient` resource.
pub fn patient_to_fhir(patient: &Patient) -> PatientResource {
    let name = if patient.name.trim().is_empty() {
        vec![]
    } else {
        vec![HumanNameWire {
            text: patient.name.clone(),
        }]
    };

    let telecom = non_blank(patient.contact.as_deref())
        .map(|value| ContactPointWire {
            system: "phone".to_string(),
            value: value.to_string(),
        })
        .into_iter()
        .collect();

    PatientResource {
        resource_type: "Patient".to_string(),
        id: patient.id.to_string(),
        name,
        gender: non_blank(patient.gender.as_deref()).map(str::to_string),
        birth_date: non_blank(patient.dob.as_deref()).map(str::to_string),
        telecom,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
