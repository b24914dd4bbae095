use records_core::RecordStore;

/// Application state shared across REST API handlers.
///
/// The store is cheap to clone; every clone shares the same collection locks.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}
