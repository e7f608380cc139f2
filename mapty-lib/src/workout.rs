//src/workout.rs
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Number of trailing digits of the millisecond timestamp used as the id.
const ID_LENGTH: usize = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Distance must be a positive number (got {0}).")]
    InvalidDistance(f64),
    #[error("Duration must be a positive number (got {0}).")]
    InvalidDuration(f64),
    #[error("Cadence must be a positive number (got {0}).")]
    InvalidCadence(f64),
    #[error("Elevation gain must be a finite number (got {0}).")]
    InvalidElevation(f64),
    #[error("Coordinates must be finite (got {0}, {1}).")]
    InvalidCoords(f64, f64),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Capitalized name used in descriptions ("Running", "Cycling").
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

/// A (latitude, longitude) pair. Stored as a two element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(value: Coords) -> Self {
        [value.lat, value.lng]
    }
}

/// Variant payload. Derived metrics are computed once, when the workout is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutKind {
    #[serde(rename_all = "camelCase")]
    Running {
        cadence_spm: f64,
        pace_min_per_km: f64,
    },
    #[serde(rename_all = "camelCase")]
    Cycling {
        elevation_gain_m: f64,
        speed_km_per_h: f64,
    },
}

impl WorkoutKind {
    pub const fn workout_type(&self) -> WorkoutType {
        match self {
            Self::Running { .. } => WorkoutType::Running,
            Self::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredWorkout")]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    #[serde(flatten)]
    kind: WorkoutKind,
    // Session-only click counter, never persisted.
    #[serde(skip)]
    views: u32,
}

// The view counter is session state and takes no part in equality.
impl PartialEq for Workout {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.created_at == other.created_at
            && self.coords == other.coords
            && self.distance_km == other.distance_km
            && self.duration_min == other.duration_min
            && self.description == other.description
            && self.kind == other.kind
    }
}

impl Workout {
    /// Builds a running workout stamped with the current time.
    /// # Errors
    /// Returns `ValidationError` if any value is non-finite or non-positive.
    pub fn running(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        Self::running_at(Utc::now(), coords, distance_km, duration_min, cadence_spm)
    }

    /// Builds a cycling workout stamped with the current time.
    /// # Errors
    /// Returns `ValidationError` if distance/duration are not positive or elevation is not finite.
    pub fn cycling(
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        Self::cycling_at(Utc::now(), coords, distance_km, duration_min, elevation_gain_m)
    }

    /// # Errors
    /// See [`Workout::running`].
    pub fn running_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        cadence_spm: f64,
    ) -> Result<Self, ValidationError> {
        validate_base(coords, distance_km, duration_min)?;
        if !is_positive(cadence_spm) {
            return Err(ValidationError::InvalidCadence(cadence_spm));
        }
        let kind = WorkoutKind::Running {
            cadence_spm,
            pace_min_per_km: duration_min / distance_km,
        };
        Ok(Self::assemble(created_at, coords, distance_km, duration_min, kind))
    }

    /// # Errors
    /// See [`Workout::cycling`].
    pub fn cycling_at(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        elevation_gain_m: f64,
    ) -> Result<Self, ValidationError> {
        validate_base(coords, distance_km, duration_min)?;
        if !elevation_gain_m.is_finite() {
            return Err(ValidationError::InvalidElevation(elevation_gain_m));
        }
        let kind = WorkoutKind::Cycling {
            elevation_gain_m,
            speed_km_per_h: distance_km / (duration_min / 60.0),
        };
        Ok(Self::assemble(created_at, coords, distance_km, duration_min, kind))
    }

    /// Dispatches on `workout_type`; `metric` is cadence for running, elevation gain for cycling.
    /// # Errors
    /// Returns `ValidationError` from the variant constructor.
    pub fn create_at(
        workout_type: WorkoutType,
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        metric: f64,
    ) -> Result<Self, ValidationError> {
        match workout_type {
            WorkoutType::Running => {
                Self::running_at(created_at, coords, distance_km, duration_min, metric)
            }
            WorkoutType::Cycling => {
                Self::cycling_at(created_at, coords, distance_km, duration_min, metric)
            }
        }
    }

    fn assemble(
        created_at: DateTime<Utc>,
        coords: Coords,
        distance_km: f64,
        duration_min: f64,
        kind: WorkoutKind,
    ) -> Self {
        Self {
            id: id_from_timestamp(created_at),
            description: describe(kind.workout_type(), created_at, &Local),
            created_at,
            coords,
            distance_km,
            duration_min,
            kind,
            views: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    pub const fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub const fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub const fn workout_type(&self) -> WorkoutType {
        self.kind.workout_type()
    }

    /// Minutes per km, running only.
    pub const fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running {
                pace_min_per_km, ..
            } => Some(pace_min_per_km),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    /// Km per hour, cycling only.
    pub const fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed_km_per_h, .. } => Some(speed_km_per_h),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// Cadence for running, elevation gain for cycling.
    pub const fn metric(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { cadence_spm, .. } => cadence_spm,
            WorkoutKind::Cycling {
                elevation_gain_m, ..
            } => elevation_gain_m,
        }
    }

    pub fn icon(&self) -> &'static str {
        self.workout_type().icon()
    }

    pub fn popup_text(&self) -> String {
        format!("{} {}", self.icon(), self.description)
    }

    pub fn popup_class(&self) -> String {
        format!("{}-popup", self.workout_type())
    }

    pub fn register_view(&mut self) {
        self.views += 1;
    }

    pub const fn views(&self) -> u32 {
        self.views
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn validate_base(coords: Coords, distance_km: f64, duration_min: f64) -> Result<(), ValidationError> {
    if !coords.is_finite() {
        return Err(ValidationError::InvalidCoords(coords.lat, coords.lng));
    }
    if !is_positive(distance_km) {
        return Err(ValidationError::InvalidDistance(distance_km));
    }
    if !is_positive(duration_min) {
        return Err(ValidationError::InvalidDuration(duration_min));
    }
    Ok(())
}

fn id_from_timestamp(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis().to_string();
    let start = millis.len().saturating_sub(ID_LENGTH);
    millis[start..].to_string()
}

/// "Running on April 14", dated on the calendar of `tz`. New workouts use
/// the local timezone.
pub fn describe<Tz: TimeZone>(
    workout_type: WorkoutType,
    created_at: DateTime<Utc>,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{} on {}",
        workout_type.label(),
        created_at.with_timezone(tz).format("%B %-d")
    )
}

/// Shape of a persisted workout. Derived fields in the payload are ignored and
/// recomputed, so a reloaded workout is indistinguishable from a fresh one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    id: String,
    created_at: DateTime<Utc>,
    coords: Coords,
    distance_km: f64,
    duration_min: f64,
    description: String,
    #[serde(flatten)]
    kind: StoredKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StoredKind {
    #[serde(rename_all = "camelCase")]
    Running { cadence_spm: f64 },
    #[serde(rename_all = "camelCase")]
    Cycling { elevation_gain_m: f64 },
}

impl TryFrom<StoredWorkout> for Workout {
    type Error = ValidationError;

    fn try_from(stored: StoredWorkout) -> Result<Self, Self::Error> {
        let (workout_type, metric) = match stored.kind {
            StoredKind::Running { cadence_spm } => (WorkoutType::Running, cadence_spm),
            StoredKind::Cycling { elevation_gain_m } => (WorkoutType::Cycling, elevation_gain_m),
        };
        let mut workout = Self::create_at(
            workout_type,
            stored.created_at,
            stored.coords,
            stored.distance_km,
            stored.duration_min,
            metric,
        )?;
        // Identity and label are kept as stored, not regenerated.
        workout.id = stored.id;
        workout.description = stored.description;
        Ok(workout)
    }
}
