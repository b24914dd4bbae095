//! Collection-specific store operations.
//!
//! Each module extends [`crate::RecordStore`] with the operations of one collection family:
//! user accounts, clinical records (patients and diagnoses), code reference data and sessions.
//! `shared` holds the document I/O they are built on.

pub mod clinical;
pub mod codes;
pub mod sessions;
pub(crate) mod shared;
pub mod users;
