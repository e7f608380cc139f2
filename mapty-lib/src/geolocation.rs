//src/geolocation.rs
use crate::config::GeolocationConfig;
use crate::events::AppEvent;
use crate::workout::Coords;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Geolocation permission denied.")]
    PermissionDenied,
    #[error("Position unavailable: {0}")]
    PositionUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coords: Coords,
    /// Radius of the uncertainty circle, in meters.
    pub accuracy_m: f64,
}

/// Source of the user's current position. May block.
pub trait GeolocationProvider: Send + 'static {
    /// # Errors
    /// Returns `GeolocationError` if the position cannot be determined.
    fn current_position(&self) -> Result<Position, GeolocationError>;
}

impl<F> GeolocationProvider for F
where
    F: Fn() -> Result<Position, GeolocationError> + Send + 'static,
{
    fn current_position(&self) -> Result<Position, GeolocationError> {
        self()
    }
}

/// Position taken from the `[geolocation]` table of the config file.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    settings: GeolocationConfig,
}

impl ConfiguredLocation {
    pub const fn new(settings: GeolocationConfig) -> Self {
        Self { settings }
    }
}

impl GeolocationProvider for ConfiguredLocation {
    fn current_position(&self) -> Result<Position, GeolocationError> {
        if !self.settings.enabled {
            return Err(GeolocationError::PermissionDenied);
        }
        match (self.settings.latitude, self.settings.longitude) {
            (Some(lat), Some(lng)) => {
                let coords = Coords::new(lat, lng);
                if !coords.is_finite() || lat.abs() > 90.0 || lng.abs() > 180.0 {
                    return Err(GeolocationError::PositionUnavailable(format!(
                        "configured position ({lat}, {lng}) is out of range"
                    )));
                }
                Ok(Position {
                    coords,
                    accuracy_m: self.settings.accuracy_m,
                })
            }
            _ => Err(GeolocationError::PositionUnavailable(
                "no latitude/longitude configured".to_string(),
            )),
        }
    }
}

/// Asks `provider` for the position on a background thread and reports the
/// outcome on `events`. The request cannot be cancelled.
pub fn request_position<P: GeolocationProvider>(
    provider: P,
    events: Sender<AppEvent>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let event = match provider.current_position() {
            Ok(position) => {
                info!(
                    lat = position.coords.lat,
                    lng = position.coords.lng,
                    accuracy_m = position.accuracy_m,
                    "position acquired"
                );
                AppEvent::PositionAcquired(position)
            }
            Err(e) => {
                info!(error = %e, "position request failed");
                AppEvent::PositionFailed(e)
            }
        };
        if events.send(event).is_err() {
            debug!("event loop gone before the position arrived");
        }
    })
}
