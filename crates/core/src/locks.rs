//! Collection identities and their locks.
//!
//! Every collection has its own reader-writer lock. Mutations hold the write side for their whole
//! read-modify-write sequence; loads hold the read side. Writes to different collections never
//! contend with each other.
//!
//! The registry is created once and handed to the store at construction. Every store handle that
//! touches the same data directory must share the same registry (clone the `Arc`), otherwise the
//! serialisation guarantee does not hold.

use crate::constants::{
    CODES_FILENAME, DIAGNOSES_FILENAME, PATIENTS_FILENAME, SESSIONS_FILENAME, USERS_FILENAME,
};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The five independently persisted collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Patients,
    Diagnoses,
    Codes,
    Sessions,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Patients,
        Collection::Diagnoses,
        Collection::Codes,
        Collection::Sessions,
    ];

    /// Collection name as used in logs and the persisted layout.
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Patients => "patients",
            Collection::Diagnoses => "diagnoses",
            Collection::Codes => "codes",
            Collection::Sessions => "sessions",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Users => USERS_FILENAME,
            Collection::Patients => PATIENTS_FILENAME,
            Collection::Diagnoses => DIAGNOSES_FILENAME,
            Collection::Codes => CODES_FILENAME,
            Collection::Sessions => SESSIONS_FILENAME,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reader-writer lock per collection.
#[derive(Debug, Default)]
pub struct CollectionLocks {
    users: RwLock<()>,
    patients: RwLock<()>,
    diagnoses: RwLock<()>,
    codes: RwLock<()>,
    sessions: RwLock<()>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, collection: Collection) -> &RwLock<()> {
        match collection {
            Collection::Users => &self.users,
            Collection::Patients => &self.patients,
            Collection::Diagnoses => &self.diagnoses,
            Collection::Codes => &self.codes,
            Collection::Sessions => &self.sessions,
        }
    }

    /// Shared access for loads.
    ///
    /// A poisoned lock is recovered: files are only ever replaced whole, so a panic inside a
    /// region cannot leave a half-written document behind.
    pub fn read(&self, collection: Collection) -> RwLockReadGuard<'_, ()> {
        self.lock_for(collection)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for read-modify-write sequences.
    pub fn write(&self, collection: Collection) -> RwLockWriteGuard<'_, ()> {
        self.lock_for(collection)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
