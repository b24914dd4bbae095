//! Patients, diagnoses and the views combining them.
//!
//! The combined view is a display concatenation: patients first, then diagnoses, each in the
//! order they are stored. No sort is applied and the two reads are not taken atomically, so a
//! diagnosis written between them may appear without its patient (or vice versa).

use crate::error::StoreResult;
use crate::models::{CombinedEntry, Diagnosis, NewDiagnosis, NewPatient, Patient};
use crate::store::RecordStore;
use serde_json::Value;

impl RecordStore {
    pub fn load_patients(&self) -> Vec<Patient> {
        self.load()
    }

    pub fn load_diagnoses(&self) -> Vec<Diagnosis> {
        self.load()
    }

    pub fn create_patient(&self, payload: NewPatient) -> StoreResult<Patient> {
        self.create(payload)
    }

    /// Creates a diagnosis. The referenced patient is not required to exist.
    pub fn create_diagnosis(&self, payload: NewDiagnosis) -> StoreResult<Diagnosis> {
        self.create(payload)
    }

    pub fn get_patient(&self, id: u64) -> Option<Patient> {
        self.find_by_key::<Patient>(&id)
    }

    pub fn get_diagnosis(&self, id: u64) -> Option<Diagnosis> {
        self.find_by_key::<Diagnosis>(&id)
    }

    /// Every patient tagged `patient`, followed by every diagnosis tagged `diagnosis`.
    pub fn combined_view(&self) -> Vec<CombinedEntry> {
        let patients = self.load_patients();
        let diagnoses = self.load_diagnoses();

        patients
            .into_iter()
            .map(CombinedEntry::Patient)
            .chain(diagnoses.into_iter().map(CombinedEntry::Diagnosis))
            .collect()
    }

    /// The combined view restricted to one patient.
    ///
    /// `patient_ref` matches a patient by id or by a stored `username` field, and a diagnosis
    /// by its `patient_id`. A blank reference matches nothing.
    pub fn records_for_patient(&self, patient_ref: &str) -> Vec<CombinedEntry> {
        let patient_ref = patient_ref.trim();
        if patient_ref.is_empty() {
            return Vec::new();
        }

        let patients = self.load_patients().into_iter().filter(|p| {
            p.id.to_string() == patient_ref
                || p.extra.get("username").and_then(Value::as_str) == Some(patient_ref)
        });
        let diagnoses = self
            .load_diagnoses()
            .into_iter()
            .filter(|d| d.patient_id.to_string() == patient_ref);

        patients
            .map(CombinedEntry::Patient)
            .chain(diagnoses.map(CombinedEntry::Diagnosis))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{CombinedEntry, NewDiagnosis, NewPatient, RecordKind};
    use crate::store::tests::test_store;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn combined_view_of_empty_store_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert!(store.combined_view().is_empty());
    }

    #[test]
    fn combined_view_lists_created_patients_in_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let ravi = store.create_patient(NewPatient::new("Ravi")).expect("create");
        let asha = store.create_patient(NewPatient::new("Asha")).expect("create");

        let view = store.combined_view();
        assert_eq!(
            view,
            vec![CombinedEntry::Patient(ravi), CombinedEntry::Patient(asha)]
        );
    }

    #[test]
    fn combined_view_puts_patients_before_diagnoses() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        // Diagnoses written first must still follow every patient.
        store
            .create_diagnosis(NewDiagnosis::new(1, "NAM-001", "CA22"))
            .expect("create");
        store
            .create_diagnosis(NewDiagnosis::new(2, "NAM-003", "CA40"))
            .expect("create");
        store.create_patient(NewPatient::new("Ravi")).expect("create");

        let kinds: Vec<_> = store.combined_view().iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RecordKind::Patient,
                RecordKind::Diagnosis,
                RecordKind::Diagnosis
            ]
        );
        assert_eq!(
            store.combined_view().len(),
            store.load_patients().len() + store.load_diagnoses().len()
        );
    }

    #[test]
    fn diagnosis_may_reference_unknown_patient() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let diagnosis = store
            .create_diagnosis(NewDiagnosis::new(999, "NAM-002", "CA22"))
            .expect("no referential check");

        assert_eq!(diagnosis.id, 1);
        assert!(store.get_patient(999).is_none());
        assert_eq!(store.get_diagnosis(1), Some(diagnosis));
    }

    #[test]
    fn records_for_patient_filters_by_reference() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let mut ravi = NewPatient::new("Ravi Kumar");
        ravi.id = Some(101);
        store.create_patient(ravi).expect("create");
        store.create_patient(NewPatient::new("Asha")).expect("create");
        store
            .create_diagnosis(NewDiagnosis::new(101, "NAM-001", "CA22"))
            .expect("create");
        store
            .create_diagnosis(NewDiagnosis::new(102, "NAM-002", "CA23"))
            .expect("create");

        let mine = store.records_for_patient("101");
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].kind(), RecordKind::Patient);
        assert_eq!(mine[0].id(), 101);
        assert_eq!(mine[1].kind(), RecordKind::Diagnosis);

        assert!(store.records_for_patient("  ").is_empty());
    }

    #[test]
    fn records_for_patient_matches_stored_username() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let mut payload = NewPatient::new("Ravi");
        payload.extra.insert("username".into(), json!("ravi"));
        store.create_patient(payload).expect("create");

        assert_eq!(store.records_for_patient("ravi").len(), 1);
    }
}
