//! Constants used throughout the records core crate.
//!
//! Path and filename constants live here so the persisted layout is defined in one place.

/// Default directory for collection files when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default location checked for curated reference data before the data directory.
pub const DEFAULT_REFERENCE_DATA_DIR: &str = "static/data";

/// Filename for the user collection.
pub const USERS_FILENAME: &str = "users.json";

/// Filename for the patient collection.
pub const PATIENTS_FILENAME: &str = "patients.json";

/// Filename for the diagnosis collection.
pub const DIAGNOSES_FILENAME: &str = "diagnoses.json";

/// Filename for code reference data, in both the data and reference directories.
pub const CODES_FILENAME: &str = "codes.json";

/// Filename for the session token map.
pub const SESSIONS_FILENAME: &str = "sessions.json";

/// Suffix appended to a collection file while its replacement is being written.
pub const TEMP_FILE_SUFFIX: &str = "tmp";

/// Field name carrying the record kind in combined views.
pub const RECORD_KIND_FIELD: &str = "type";
