use crate::domain::{Record, StorageError, StorageResult};
use crate::infrastructure::KeyValueStore;
use tracing::{debug, error};

/// Key under which the whole record list is stored.
pub const USERS_KEY: &str = "@users";

/// Persists the ordered record list as one JSON array under [`USERS_KEY`].
///
/// Every write replaces the whole collection. There is no locking, so two
/// writers doing read-append-write can lose each other's records.
pub struct RecordRepository {
    store: Box<dyn KeyValueStore>,
}

impl RecordRepository {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns the stored records, or an empty list when nothing is stored.
    ///
    /// A payload that exists but does not decode is a read error, not an
    /// empty list.
    pub fn read_all(&self) -> StorageResult<Vec<Record>> {
        let raw = self.store.get_item(USERS_KEY).map_err(|e| {
            error!(error = %e, "failed to read records");
            StorageError::Read(e.to_string())
        })?;

        match raw {
            None => {
                debug!("no stored records");
                Ok(Vec::new())
            }
            Some(json) => serde_json::from_str::<Vec<Record>>(&json).map_err(|e| {
                error!(error = %e, "stored records could not be decoded");
                StorageError::Read(format!("Invalid record data - {}", e))
            }),
        }
    }

    pub fn write_all(&self, records: &[Record]) -> StorageResult<()> {
        let json = serde_json::to_string(records)
            .map_err(|e| StorageError::Write(format!("Serialization failed: {}", e)))?;
        self.store.set_item(USERS_KEY, &json).map_err(|e| {
            error!(error = %e, count = records.len(), "failed to write records");
            StorageError::Write(e.to_string())
        })
    }

    /// Drops the stored list. Clearing an empty store succeeds.
    pub fn clear_all(&self) -> StorageResult<()> {
        self.store.remove_item(USERS_KEY).map_err(|e| {
            error!(error = %e, "failed to clear records");
            StorageError::Write(e.to_string())
        })
    }
}
