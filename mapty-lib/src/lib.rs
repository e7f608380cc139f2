// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

// --- Declare modules ---
mod config;
pub mod controller;
pub mod events;
pub mod geolocation;
pub mod map;
pub mod persistence;
pub mod store;
pub mod view;
pub mod workout;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util,
    save as save_config_util, Config, Error as ConfigError, GeolocationConfig,
};
pub use controller::{
    parse_field, AppController, AppState, Mode, SortOrder, SubmitError, INVALID_INPUT_ALERT,
    POSITION_ALERT,
};
pub use events::AppEvent;
pub use geolocation::{
    request_position, ConfiguredLocation, GeolocationError, GeolocationProvider, Position,
};
pub use map::{HeadlessMap, MapAdapter, MapHandle, MapWidget, Marker, Popup, DEFAULT_ZOOM};
pub use persistence::{Persistence, PersistenceError, DEFAULT_STORAGE_KEY};
pub use store::{get_db_path as get_db_path_util, KeyValueStore, MemoryStore, SqliteStore, StoreError};
pub use view::{BufferedView, DetailRow, FormInput, ListEntry, View};
pub use workout::{describe, Coords, ValidationError, Workout, WorkoutKind, WorkoutType};

/// Resolved configuration and storage location shared by the front-ends.
pub struct AppService {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl AppService {
    /// Loads the config and resolves the database path.
    /// `db_override` replaces the default path under the data directory.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination or loading fails.
    pub fn initialize(db_override: Option<PathBuf>) -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = match db_override {
            Some(path) => path,
            None => store::get_db_path().context("Failed to determine database path")?,
        };

        Ok(Self {
            config,
            config_path,
            db_path,
        })
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    /// Opens the SQLite store with the configured key and quota.
    /// # Errors
    /// Returns `anyhow::Error` if the database cannot be opened.
    pub fn open_persistence(&self) -> Result<Persistence> {
        let store = SqliteStore::open(&self.db_path)
            .with_context(|| format!("Failed to open database at {:?}", self.db_path))?
            .with_quota(self.config.storage_quota_bytes);
        Ok(Persistence::with_key(
            Box::new(store),
            self.config.storage_key.clone(),
        ))
    }

    /// Builds the controller for a front-end's view and map widget.
    /// # Errors
    /// Returns `anyhow::Error` if the store cannot be opened.
    pub fn build_controller<V: View, W: MapWidget>(
        &self,
        view: V,
        widget: W,
    ) -> Result<AppController<V, W>> {
        let persistence = self.open_persistence()?;
        Ok(AppController::new(
            self.config.clone(),
            persistence,
            view,
            widget,
        ))
    }

    pub fn geolocation(&self) -> ConfiguredLocation {
        ConfiguredLocation::new(self.config.geolocation.clone())
    }
}
