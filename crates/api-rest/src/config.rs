//! Server configuration resolved from the environment.

use records_core::{CollectionLocks, CoreConfig, RecordStore};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Everything needed to start the REST server.
#[derive(Clone, Debug)]
pub struct RestConfig {
    pub addr: String,
    pub static_dir: PathBuf,
    pub core: CoreConfig,
}

impl RestConfig {
    /// Reads `RECORDS_DATA_DIR`, `RECORDS_REFERENCE_DIR`, `RECORDS_STATIC_DIR` and
    /// `RECORDS_REST_ADDR`. Unset or blank values use the defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let core = CoreConfig::from_values(
            env_value("RECORDS_DATA_DIR"),
            env_value("RECORDS_REFERENCE_DIR"),
        )?;

        Ok(Self {
            addr: env_value("RECORDS_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            static_dir: env_value("RECORDS_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.into())
                .into(),
            core,
        })
    }

    /// A store over the configured data directory with a fresh lock registry.
    ///
    /// Call once per process and clone the result.
    pub fn open_store(&self) -> RecordStore {
        RecordStore::new(
            Arc::new(self.core.clone()),
            Arc::new(CollectionLocks::new()),
        )
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
