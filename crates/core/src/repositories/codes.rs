//! Code reference data (NAMASTE and ICD-11).
//!
//! Curated code lists may be deployed to a separate, read-only reference directory. When that
//! directory holds a `codes.json` it is used as-is and the data directory copy is ignored.

use crate::error::StoreResult;
use crate::locks::Collection;
use crate::models::Codes;
use crate::repositories::shared::{load_document, write_document};
use crate::store::RecordStore;

impl RecordStore {
    /// Both code families, from the reference directory if present, else the data directory.
    ///
    /// Never fails; returns empty families when neither location has data.
    pub fn codes(&self) -> Codes {
        let _guard = self.locks.read(Collection::Codes);

        if let Some(reference_path) = self.cfg.reference_codes_path() {
            if reference_path.is_file() {
                tracing::debug!("using reference codes from {}", reference_path.display());
                return load_document(Collection::Codes, &reference_path);
            }
        }

        load_document(Collection::Codes, &self.path(Collection::Codes))
    }

    /// Replaces the codes document in the data directory.
    ///
    /// The reference directory is never written.
    pub fn save_codes(&self, codes: &Codes) -> StoreResult<()> {
        let _guard = self.locks.write(Collection::Codes);
        write_document(Collection::Codes, &self.path(Collection::Codes), codes)
    }
}
