//! The record store.
//!
//! [`RecordStore`] owns the five collections under the configured data directory and is the
//! only component allowed to write them. It is cheap to clone: clones share the configuration
//! and the lock registry.
//!
//! List-shaped collections (users, patients, diagnoses) go through the generic operations in
//! this module, driven by the [`Entry`] trait. Sessions and codes have their own document shapes
//! and live in [`crate::repositories`].
//!
//! ## Consistency
//!
//! - `load`/`find_by_key` hold the collection's shared lock while reading.
//! - `save`/`create` hold its exclusive lock; `create` holds it across the whole
//!   read-compute-write so concurrent creates never hand out the same id.
//! - Nothing spans two collections. A diagnosis may reference a patient id that does not exist.

use crate::config::CoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::locks::{Collection, CollectionLocks};
use crate::models::{Diagnosis, NewDiagnosis, NewPatient, Patient, User};
use crate::repositories::shared::{load_document, write_document};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// A record kept in a list-shaped collection and identified by a key field.
pub trait Entry: Serialize + DeserializeOwned + Clone {
    /// Collection the entry is persisted in.
    const COLLECTION: Collection;

    /// Type of the lookup key.
    type Key: PartialEq + ?Sized;

    fn key(&self) -> &Self::Key;
}

impl Entry for User {
    const COLLECTION: Collection = Collection::Users;
    type Key = str;

    fn key(&self) -> &str {
        &self.username
    }
}

impl Entry for Patient {
    const COLLECTION: Collection = Collection::Patients;
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }
}

impl Entry for Diagnosis {
    const COLLECTION: Collection = Collection::Diagnoses;
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }
}

/// A creation payload for a collection with integer ids.
pub trait NewEntry {
    type Output: Entry<Key = u64>;

    /// Explicit id supplied by the caller, if any.
    fn requested_id(&self) -> Option<u64>;

    fn validate(&self) -> StoreResult<()>;

    /// Complete the payload into a stored entry with the given id.
    fn into_entry(self, id: u64) -> Self::Output;
}

impl NewEntry for NewPatient {
    type Output = Patient;

    fn requested_id(&self) -> Option<u64> {
        NewPatient::requested_id(self)
    }

    fn validate(&self) -> StoreResult<()> {
        NewPatient::validate(self)
    }

    fn into_entry(self, id: u64) -> Patient {
        self.into_patient(id)
    }
}

impl NewEntry for NewDiagnosis {
    type Output = Diagnosis;

    fn requested_id(&self) -> Option<u64> {
        NewDiagnosis::requested_id(self)
    }

    fn validate(&self) -> StoreResult<()> {
        NewDiagnosis::validate(self)
    }

    fn into_entry(self, id: u64) -> Diagnosis {
        self.into_diagnosis(id)
    }
}

/// Next free id: one past the largest existing id, or 1 for an empty collection.
///
/// Fails once the largest id is `u64::MAX`; no id is ever handed out twice.
pub(crate) fn next_id<E: Entry<Key = u64>>(entries: &[E]) -> StoreResult<u64> {
    match entries.iter().map(|e| *e.key()).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdSpaceExhausted {
            collection: E::COLLECTION,
        }),
    }
}

/// File-backed store of the users, patients, diagnoses, codes and sessions collections.
#[derive(Clone, Debug)]
pub struct RecordStore {
    pub(crate) cfg: Arc<CoreConfig>,
    pub(crate) locks: Arc<CollectionLocks>,
}

impl RecordStore {
    /// Creates a store over `cfg.data_dir()`.
    ///
    /// Nothing is touched on disk until the first write. All stores over the same data directory
    /// must be given the same `locks`.
    pub fn new(cfg: Arc<CoreConfig>, locks: Arc<CollectionLocks>) -> Self {
        Self { cfg, locks }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub(crate) fn path(&self, collection: Collection) -> PathBuf {
        self.cfg.collection_path(collection)
    }

    /// Loads every entry of `E`'s collection in stored order.
    ///
    /// Never fails: a missing, unreadable or malformed file yields an empty collection.
    pub fn load<E: Entry>(&self) -> Vec<E> {
        let _guard = self.locks.read(E::COLLECTION);
        self.load_unlocked()
    }

    /// Replaces `E`'s collection with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the data directory cannot be created or the file cannot be
    /// written. The persisted collection is then unchanged.
    pub fn save<E: Entry>(&self, entries: &[E]) -> StoreResult<()> {
        let _guard = self.locks.write(E::COLLECTION);
        self.save_unlocked(entries)
    }

    /// First entry whose key equals `key`, or `None`.
    pub fn find_by_key<E: Entry>(&self, key: &E::Key) -> Option<E> {
        self.load::<E>().into_iter().find(|e| e.key() == key)
    }

    /// Appends a new entry built from `payload` and persists the collection.
    ///
    /// When the payload carries no id (or id `0`) the store assigns the next free id.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidInput`] if the payload fails validation,
    /// - [`StoreError::DuplicateKey`] if an explicit id is already taken,
    /// - any write error from [`RecordStore::save`].
    pub fn create<N: NewEntry>(&self, payload: N) -> StoreResult<N::Output> {
        payload.validate()?;

        let collection = N::Output::COLLECTION;
        let _guard = self.locks.write(collection);

        let mut entries: Vec<N::Output> = self.load_unlocked();
        let id = match payload.requested_id() {
            Some(id) if entries.iter().any(|e| *e.key() == id) => {
                return Err(StoreError::DuplicateKey { collection, id });
            }
            Some(id) => id,
            None => next_id(&entries)?,
        };

        let entry = payload.into_entry(id);
        entries.push(entry.clone());
        self.save_unlocked(&entries)?;

        tracing::info!("created {collection} entry {id}");
        Ok(entry)
    }

    pub(crate) fn load_unlocked<E: Entry>(&self) -> Vec<E> {
        load_document(E::COLLECTION, &self.path(E::COLLECTION))
    }

    pub(crate) fn save_unlocked<E: Entry>(&self, entries: &[E]) -> StoreResult<()> {
        write_document(E::COLLECTION, &self.path(E::COLLECTION), entries)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Role;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    pub(crate) fn test_store(data_dir: &Path) -> RecordStore {
        let cfg = CoreConfig::new(data_dir.to_path_buf(), None).expect("CoreConfig::new");
        RecordStore::new(Arc::new(cfg), Arc::new(CollectionLocks::new()))
    }

    pub(crate) fn test_user(username: &str, role: Role, id: &str) -> User {
        User {
            username: username.into(),
            role,
            id: id.into(),
            password_hash: "$argon2id$opaque".into(),
        }
    }

    #[test]
    fn load_on_fresh_directory_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(&temp_dir.path().join("not-created-yet"));

        assert!(store.load::<User>().is_empty());
        assert!(store.load::<Patient>().is_empty());
        assert!(store.load::<Diagnosis>().is_empty());
    }

    #[test]
    fn load_treats_corrupt_file_as_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        fs::write(temp_dir.path().join("patients.json"), "{not json").expect("write");

        assert!(store.load::<Patient>().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let users = vec![
            test_user("zed", Role::Clinician, "C9"),
            test_user("amy", Role::Patient, "4"),
        ];

        store.save(&users).expect("save should succeed");

        assert_eq!(store.load::<User>(), users);
    }

    #[test]
    fn save_failure_propagates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        fs::create_dir(temp_dir.path().join("users.json.tmp")).expect("block temp file");

        let err = store
            .save(&[test_user("amy", Role::Patient, "4")])
            .expect_err("save should fail");

        assert!(matches!(
            err,
            StoreError::Write {
                collection: Collection::Users,
                ..
            }
        ));
    }

    #[test]
    fn find_by_key_returns_none_for_missing_key() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        store
            .save(&[test_user("clinician1", Role::Clinician, "C1")])
            .expect("save");

        assert!(store.find_by_key::<User>("nonexistent").is_none());
        assert_eq!(
            store
                .find_by_key::<User>("clinician1")
                .map(|u| u.id)
                .as_deref(),
            Some("C1")
        );
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let ravi = store.create(NewPatient::new("Ravi")).expect("create Ravi");
        let asha = store.create(NewPatient::new("Asha")).expect("create Asha");

        assert_eq!(ravi.id, 1);
        assert_eq!(ravi.name, "Ravi");
        assert_eq!(asha.id, 2);
        assert_eq!(asha.name, "Asha");
    }

    #[test]
    fn create_continues_after_highest_id() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let mut seeded = NewPatient::new("Ravi Kumar");
        seeded.id = Some(101);
        let seeded = store.create(seeded).expect("explicit id");
        let next = store.create(NewPatient::new("Asha")).expect("assigned id");

        assert_eq!(seeded.id, 101);
        assert_eq!(next.id, 102);
    }

    #[test]
    fn create_rejects_colliding_explicit_id() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        store.create(NewPatient::new("Ravi")).expect("create");

        let mut duplicate = NewPatient::new("Impostor");
        duplicate.id = Some(1);
        let err = store.create(duplicate).expect_err("collision should fail");

        assert!(matches!(
            err,
            StoreError::DuplicateKey {
                collection: Collection::Patients,
                id: 1
            }
        ));
        assert_eq!(store.load::<Patient>().len(), 1, "nothing should be written");
    }

    #[test]
    fn create_rejects_invalid_payload_without_writing() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let err = store
            .create(NewPatient::new("   "))
            .expect_err("blank name should fail");

        assert!(matches!(err, StoreError::InvalidInput(_)));
        assert!(!temp_dir.path().join("patients.json").exists());
    }

    #[test]
    fn concurrent_creates_hand_out_distinct_ids() {
        const WRITERS: u64 = 16;

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        let mut ids: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..WRITERS)
                .map(|n| {
                    let store = store.clone();
                    scope.spawn(move || {
                        store
                            .create(NewDiagnosis::new(n + 1, "NAM-001", "CA22"))
                            .expect("concurrent create should succeed")
                            .id
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("writer thread panicked"))
                .collect()
        });
        ids.sort_unstable();

        assert_eq!(ids, (1..=WRITERS).collect::<Vec<_>>());

        let stored: BTreeSet<u64> = store.load::<Diagnosis>().iter().map(|d| d.id).collect();
        assert_eq!(stored.len() as u64, WRITERS, "every create should persist");
    }

    #[test]
    fn next_id_uses_maximum_not_length() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        for id in [5u64, 2, 9] {
            let mut payload = NewPatient::new(format!("p{id}"));
            payload.id = Some(id);
            store.create(payload).expect("create");
        }

        assert_eq!(next_id(&store.load::<Patient>()).expect("next id"), 10);
        assert_eq!(next_id::<Patient>(&[]).expect("next id"), 1);
    }

    #[test]
    fn clones_share_locks_but_fresh_stores_do_not() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());

        assert!(Arc::ptr_eq(&store.locks, &store.clone().locks));
        assert!(!Arc::ptr_eq(&store.locks, &test_store(temp_dir.path()).locks));
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_duplicate() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = test_store(temp_dir.path());
        let mut top = NewPatient::new("Top");
        top.id = Some(u64::MAX);
        store.create(top).expect("explicit max id");

        let err = store
            .create(NewPatient::new("Next"))
            .expect_err("no id left to assign");

        assert!(matches!(
            err,
            StoreError::IdSpaceExhausted {
                collection: Collection::Patients
            }
        ));
        let ids: Vec<u64> = store.load::<Patient>().iter().map(|p| p.id).collect();
        assert_eq!(ids, [u64::MAX]);
    }
}
