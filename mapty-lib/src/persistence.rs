//src/persistence.rs
use crate::store::{KeyValueStore, StoreError};
use crate::workout::Workout;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_STORAGE_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to serialize workouts: {0}")]
    Serialize(serde_json::Error),
    #[error("Stored workouts are malformed: {0}")]
    Malformed(serde_json::Error),
}

/// Saves and restores the whole workout list under a single key.
///
/// The list is always written in full; there is no incremental update.
/// `save`, `load` and `clear` never fail from the caller's point of view:
/// problems are logged and the application carries on. The `try_*`
/// variants expose the underlying error.
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// # Errors
    /// Returns `PersistenceError` if serialization or the store write fails.
    pub fn try_save(&mut self, workouts: &[Workout]) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(workouts).map_err(PersistenceError::Serialize)?;
        self.store.set(&self.key, &payload)?;
        debug!(key = %self.key, count = workouts.len(), bytes = payload.len(), "saved workouts");
        Ok(())
    }

    pub fn save(&mut self, workouts: &[Workout]) {
        if let Err(e) = self.try_save(workouts) {
            warn!(key = %self.key, error = %e, "could not persist workouts");
        }
    }

    /// An absent key (or a stored `null`) yields an empty list.
    /// # Errors
    /// Returns `PersistenceError` if the store cannot be read or any element is invalid.
    pub fn try_load(&self) -> Result<Vec<Workout>, PersistenceError> {
        let Some(payload) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        let workouts: Option<Vec<Workout>> =
            serde_json::from_str(&payload).map_err(PersistenceError::Malformed)?;
        Ok(workouts.unwrap_or_default())
    }

    pub fn load(&self) -> Vec<Workout> {
        match self.try_load() {
            Ok(workouts) => {
                debug!(key = %self.key, count = workouts.len(), "loaded workouts");
                workouts
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "ignoring stored workouts");
                Vec::new()
            }
        }
    }

    /// # Errors
    /// Returns `PersistenceError::Store` if the key cannot be removed.
    pub fn try_clear(&mut self) -> Result<(), PersistenceError> {
        self.store.remove(&self.key)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.try_clear() {
            warn!(key = %self.key, error = %e, "could not clear stored workouts");
        }
    }

    /// The stored payload exactly as written, if any.
    pub fn raw_payload(&self) -> Option<String> {
        self.store.get(&self.key).ok().flatten()
    }
}
