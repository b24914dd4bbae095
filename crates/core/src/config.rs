//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the record store. Request handling never reads process-wide environment variables.

use crate::constants::{CODES_FILENAME, DEFAULT_DATA_DIR, DEFAULT_REFERENCE_DATA_DIR};
use crate::locks::Collection;
use crate::{StoreError, StoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    reference_data_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `reference_data_dir` is the optional read-only location for curated code lists. When it
    /// holds a `codes.json`, that file wins over the one in `data_dir`.
    pub fn new(data_dir: PathBuf, reference_data_dir: Option<PathBuf>) -> StoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(StoreError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            reference_data_dir,
        })
    }

    /// Build a configuration from optional raw values, as read from the environment.
    ///
    /// Blank values fall back to [`DEFAULT_DATA_DIR`] and [`DEFAULT_REFERENCE_DATA_DIR`].
    pub fn from_values(
        data_dir: Option<String>,
        reference_data_dir: Option<String>,
    ) -> StoreResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let data_dir = non_blank(data_dir).unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let reference_data_dir =
            non_blank(reference_data_dir).unwrap_or_else(|| DEFAULT_REFERENCE_DATA_DIR.into());

        Self::new(
            PathBuf::from(data_dir),
            Some(PathBuf::from(reference_data_dir)),
        )
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn reference_data_dir(&self) -> Option<&Path> {
        self.reference_data_dir.as_deref()
    }

    /// Path of the file backing `collection` inside the data directory.
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    /// Path of the override codes file, if an override location is configured.
    pub fn reference_codes_path(&self) -> Option<PathBuf> {
        self.reference_data_dir
            .as_ref()
            .map(|dir| dir.join(CODES_FILENAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = CoreConfig::from_values(Some("  ".into()), None).expect("config should build");

        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        assert_eq!(
            cfg.reference_data_dir(),
            Some(Path::new(DEFAULT_REFERENCE_DATA_DIR))
        );
    }

    #[test]
    fn collection_paths_live_under_data_dir() {
        let cfg = CoreConfig::new(PathBuf::from("/srv/records"), None).expect("config");

        assert_eq!(
            cfg.collection_path(Collection::Sessions),
            PathBuf::from("/srv/records/sessions.json")
        );
        assert!(cfg.reference_codes_path().is_none());
    }

    #[test]
    fn rejects_empty_data_dir() {
        let err = CoreConfig::new(PathBuf::new(), None).expect_err("empty dir should fail");
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }
}
