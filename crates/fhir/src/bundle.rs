//! Bundles of translated records.
//!
//! Two shapes are produced:
//! - a `collection` bundle wrapping one entry of a combined view, and
//! - a `document` bundle for a single diagnosis, where the note is also carried as an
//!   annotation on the condition. Its codings use the short `NAMASTE` / `ICD-11` labels and it
//!   carries no `recordedDate`.

use crate::condition::{diagnosis_to_condition, AnnotationWire, CodingWire, ConditionResource};
use crate::{ICD11_LABEL, NAMASTE_LABEL};
use crate::patient::{patient_to_fhir, PatientResource};
use records_core::{CombinedEntry, Diagnosis};
use serde::{Deserialize, Serialize};

/// Bundle type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    Collection,
    Document,
}

/// Any resource that can appear in a bundle entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Patient(PatientResource),
    Condition(ConditionResource),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BundleEntry {
    pub resource: Resource,
}

/// Wire representation of a bundle.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(rename = "type")]
    pub bundle_type: BundleType,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    fn new(bundle_type: BundleType, entry: Vec<BundleEntry>) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            bundle_type,
            entry,
        }
    }
}

/// Wrap one combined-view entry in a `collection` bundle.
pub fn record_to_bundle(record: &CombinedEntry) -> Bundle {
    let resource = match record {
        CombinedEntry::Patient(patient) => Resource::Patient(patient_to_fhir(patient)),
        CombinedEntry::Diagnosis(diagnosis) => {
            Resource::Condition(diagnosis_to_condition(diagnosis))
        }
    };

    Bundle::new(BundleType::Collection, vec![BundleEntry { resource }])
}

/// A `document` bundle holding the condition for one diagnosis.
pub fn diagnosis_document(diagnosis: &Diagnosis) -> Bundle {
    let mut condition = diagnosis_to_condition(diagnosis);
    condition.code.coding = vec![
        CodingWire {
            system: NAMASTE_LABEL.to_string(),
            code: diagnosis.namaste_code.clone(),
        },
        CodingWire {
            system: ICD11_LABEL.to_string(),
            code: diagnosis.icd11_code.clone(),
        },
    ];
    condition.note = vec![AnnotationWire {
        text: diagnosis.note.clone().unwrap_or_default(),
    }];
    condition.recorded_date = None;

    Bundle::new(
        BundleType::Document,
        vec![BundleEntry {
            resource: Resource::Condition(condition),
        }],
    )
}
