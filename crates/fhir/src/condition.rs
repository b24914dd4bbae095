//! FHIR-aligned condition resource built from a diagnosis.
//!
//! Each diagnosis carries two codes for the same finding, one NAMASTE and one ICD-11. Both are
//! emitted as codings of the same `CodeableConcept`, NAMASTE first.

use crate::{ICD11_SYSTEM, NAMASTE_SYSTEM};
use records_core::Diagnosis;
use serde::{Deserialize, Serialize};

/// Wire representation of a condition resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConditionResource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    pub subject: ReferenceWire,

    pub code: CodeableConceptWire,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<AnnotationWire>,

    #[serde(rename = "recordedDate", skip_serializing_if = "Option::is_none")]
    pub recorded_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReferenceWire {
    pub reference: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CodeableConceptWire {
    pub coding: Vec<CodingWire>,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CodingWire {
    pub system: String,
    pub code: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AnnotationWire {
    pub text: String,
}

/// Translate a stored diagnosis into a `Condition` resource.
///
/// The note becomes the concept text; `recordedDate` is the diagnosis timestamp when one was
/// recorded.
pub fn diagnosis_to_condition(diagnosis: &Diagnosis) -> ConditionResource {
    let note = diagnosis.note.clone().unwrap_or_default();
    let recorded_date = Some(diagnosis.timestamp.clone()).filter(|t| !t.trim().is_empty());

    ConditionResource {
        resource_type: "Condition".to_string(),
        id: diagnosis.id.to_string(),
        subject: ReferenceWire {
            reference: format!("Patient/{}", diagnosis.patient_id),
        },
        code: CodeableConceptWire {
            coding: vec![
                CodingWire {
                    system: NAMASTE_SYSTEM.to_string(),
                    code: diagnosis.namaste_code.clone(),
                },
                CodingWire {
                    system: ICD11_SYSTEM.to_string(),
                    code: diagnosis.icd11_code.clone(),
                },
            ],
            text: note,
        },
        note: vec![],
        recorded_date,
    }
}
