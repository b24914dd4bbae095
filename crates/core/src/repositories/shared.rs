//! Collection document I/O.
//!
//! Every collection is one JSON document that is read whole and replaced whole. Reads are
//! tolerant: a missing, unreadable or malformed document is reported as [`ReadOutcome::Empty`]
//! and callers substitute the default collection. Writes are not: any failure is returned as a
//! [`StoreError`].
//!
//! A replacement is first written to `<file>.tmp` and then renamed over the original, so readers
//! that do not hold the collection lock still only ever see a complete document.
//!
//! None of these functions take locks. Callers in the store hold the right collection lock.

use crate::constants::TEMP_FILE_SUFFIX;
use crate::error::{StoreError, StoreResult};
use crate::locks::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Why a read produced no data.
#[derive(Debug)]
pub(crate) enum EmptyReason {
    /// The document has never been written.
    Missing,
    /// The document exists but could not be read.
    Unreadable(io::Error),
    /// The document was read but does not match the collection shape.
    Malformed(String),
}

/// Result of reading a collection document.
#[derive(Debug)]
pub(crate) enum ReadOutcome<T> {
    Present(T),
    Empty(EmptyReason),
}

impl<T: Default> ReadOutcome<T> {
    /// Collapse to the document, or the default collection when nothing usable was read.
    pub(crate) fn into_inner_or_default(self, collection: Collection, path: &Path) -> T {
        match self {
            ReadOutcome::Present(value) => value,
            ReadOutcome::Empty(EmptyReason::Missing) => {
                tracing::debug!("{collection} not yet persisted at {}", path.display());
                T::default()
            }
            ReadOutcome::Empty(EmptyReason::Unreadable(e)) => {
                tracing::warn!(
                    "failed to read {collection} from {}: {e}; using empty collection",
                    path.display()
                );
                T::default()
            }
            ReadOutcome::Empty(EmptyReason::Malformed(detail)) => {
                tracing::warn!(
                    "malformed {collection} document {}: {detail}; using empty collection",
                    path.display()
                );
                T::default()
            }
        }
    }
}

/// Read and parse the document at `path`.
///
/// Parse failures carry the path to the failing field (e.g. `[2].id`) to make hand-edited data
/// files easier to repair.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> ReadOutcome<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return ReadOutcome::Empty(EmptyReason::Missing)
        }
        Err(e) => return ReadOutcome::Empty(EmptyReason::Unreadable(e)),
    };

    let mut deserializer = serde_json::Deserializer::from_str(&contents);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(value) => ReadOutcome::Present(value),
        Err(err) => {
            let field = err.path().to_string();
            let source = err.into_inner();
            let field = if field.is_empty() || field == "." {
                "<root>".to_string()
            } else {
                field
            };
            ReadOutcome::Empty(EmptyReason::Malformed(format!("at {field}: {source}")))
        }
    }
}

/// Read the document for `collection`, falling back to its default.
pub(crate) fn load_document<T: DeserializeOwned + Default>(
    collection: Collection,
    path: &Path,
) -> T {
    read_document(path).into_inner_or_default(collection, path)
}

/// Serialise `value` and replace the document at `path`.
///
/// # Errors
///
/// - [`StoreError::DataDirCreation`] if the parent directory cannot be created,
/// - [`StoreError::Serialization`] if the value cannot be encoded,
/// - [`StoreError::Write`] if the temporary file cannot be written or renamed into place.
pub(crate) fn write_document<T: Serialize + ?Sized>(
    collection: Collection,
    path: &Path,
    value: &T,
) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(StoreError::DataDirCreation)?;
    }

    let mut body = serde_json::to_string_pretty(value).map_err(StoreError::Serialization)?;
    body.push('\n');

    let temp_path = temp_path_for(path);
    fs::write(&temp_path, body).map_err(|source| StoreError::Write { collection, source })?;
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(StoreError::Write { collection, source });
    }

    tracing::debug!("wrote {collection} to {}", path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(TEMP_FILE_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_document_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let outcome: ReadOutcome<Vec<u64>> = read_document(&temp_dir.path().join("nope.json"));
        assert!(matches!(outcome, ReadOutcome::Empty(EmptyReason::Missing)));
    }

    #[test]
    fn malformed_document_reports_failing_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("numbers.json");
        fs::write(&path, r#"[1, 2, "three"]"#).expect("write fixture");

        let outcome: ReadOutcome<Vec<u64>> = read_document(&path);
        match outcome {
            ReadOutcome::Empty(EmptyReason::Malformed(detail)) => {
                assert!(detail.contains("[2]"), "detail was {detail}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_document_is_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A directory where a file is expected cannot be read as text.
        let path = temp_dir.path().join("users.json");
        fs::create_dir(&path).expect("create dir");

        let outcome: ReadOutcome<Vec<u64>> = read_document(&path);
        assert!(matches!(
            outcome,
            ReadOutcome::Empty(EmptyReason::Unreadable(_))
        ));
        assert!(load_document::<Vec<u64>>(Collection::Users, &path).is_empty());
    }

    #[test]
    fn write_replaces_whole_document_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("numbers.json");

        write_document(Collection::Patients, &path, &vec![1u64, 2, 3]).expect("first write");
        write_document(Collection::Patients, &path, &vec![4u64]).expect("second write");

        let numbers: Vec<u64> = load_document(Collection::Patients, &path);
        assert_eq!(numbers, vec![4]);
        assert!(!temp_path_for(&path).exists(), "temp file should be renamed");
    }

    #[test]
    fn write_failure_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("diagnoses.json");
        // Occupy the temp file name with a directory so the write cannot proceed.
        fs::create_dir(temp_path_for(&path)).expect("create blocking dir");

        let err = write_document(Collection::Diagnoses, &path, &vec![1u64])
            .expect_err("write should fail");
        assert!(matches!(
            err,
            StoreError::Write {
                collection: Collection::Diagnoses,
                ..
            }
        ));
    }
}
