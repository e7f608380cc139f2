//src/controller.rs
use crate::config::Config;
use crate::events::AppEvent;
use crate::geolocation::{request_position, GeolocationError, GeolocationProvider, Position};
use crate::map::{MapAdapter, MapWidget};
use crate::persistence::Persistence;
use crate::view::{FormInput, ListEntry, View};
use crate::workout::{Coords, ValidationError, Workout, WorkoutType};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const INVALID_INPUT_ALERT: &str = "Inputs have to be positive numbers!";
pub const POSITION_ALERT: &str = "Could not get your position";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),
    #[error("No map location selected for this workout.")]
    NoLocation,
}

/// Form visibility and edit targeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Form open for a new workout at `pending_coords`.
    AwaitingEntry,
    /// Form reopened for a workout removed by a double click.
    EditingEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Insertion,
    Distance,
}

impl SortOrder {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Insertion => Self::Distance,
            Self::Distance => Self::Insertion,
        }
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    /// Insertion order is the order things were created (and are stored).
    pub workouts: Vec<Workout>,
    pub pending_coords: Option<Coords>,
    pub edit_target: Option<String>,
    pub mode: Mode,
    pub sort_order: SortOrder,
}

type Clock = Box<dyn FnMut() -> DateTime<Utc>>;

/// Wires the workout list, the store, the map and the view together.
///
/// Constructed once per process and driven through [`AppController::handle_event`].
pub struct AppController<V, W> {
    config: Config,
    state: AppState,
    persistence: Persistence,
    map: MapAdapter<W>,
    view: V,
    events_tx: Sender<AppEvent>,
    events_rx: Receiver<AppEvent>,
    clock: Clock,
}

impl<V: View, W: MapWidget> AppController<V, W> {
    pub fn new(config: Config, persistence: Persistence, view: V, widget: W) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            config,
            state: AppState::default(),
            persistence,
            map: MapAdapter::new(widget),
            view,
            events_tx,
            events_rx,
            clock: Box::new(Utc::now),
        }
    }

    /// Replaces the time source used to stamp new workouts.
    #[must_use]
    pub fn with_clock(mut self, clock: impl FnMut() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.state.workouts
    }

    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.state.workouts.iter().find(|w| w.id() == id)
    }

    pub const fn mode(&self) -> Mode {
        self.state.mode
    }

    pub const fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub const fn map(&self) -> &MapAdapter<W> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapAdapter<W> {
        &mut self.map
    }

    pub const fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn event_sender(&self) -> Sender<AppEvent> {
        self.events_tx.clone()
    }

    /// Workouts in the order the list shows them.
    pub fn display_order(&self) -> Vec<&Workout> {
        let mut ordered: Vec<&Workout> = self.state.workouts.iter().collect();
        if self.state.sort_order == SortOrder::Distance {
            ordered.sort_by(|a, b| a.distance_km().total_cmp(&b.distance_km()));
        }
        ordered
    }

    // --- Startup ---

    /// Restores persisted workouts into the list and starts the position request.
    pub fn start<P: GeolocationProvider>(&mut self, provider: P) -> JoinHandle<()> {
        self.load_persisted();
        request_position(provider, self.event_sender())
    }

    /// Replaces the in-memory list with whatever the store holds and renders it.
    pub fn load_persisted(&mut self) {
        self.state.workouts = self.persistence.load();
        info!(count = self.state.workouts.len(), "restored workouts");
        self.render_list();
    }

    // --- Event dispatch ---

    /// Handles every event already queued. Returns how many were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Blocks up to `timeout` for one queued event and handles it.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        debug!(?event, mode = ?self.state.mode, "handling event");
        match event {
            AppEvent::PositionAcquired(position) => self.on_position_acquired(position),
            AppEvent::PositionFailed(error) => self.on_position_failed(&error),
            AppEvent::MapClicked(coords) => self.show_form(coords),
            AppEvent::FormTypeChanged(workout_type) => self.change_form_type(workout_type),
            AppEvent::FormSubmitted(input) => {
                // Failures are already surfaced to the user as alerts.
                let _ = self.submit_form(&input);
            }
            AppEvent::FormCancelled => self.cancel_form(),
            AppEvent::WorkoutClicked(id) => {
                self.focus_workout(&id);
            }
            AppEvent::WorkoutDoubleClicked(id) => {
                self.edit_workout(&id);
            }
            AppEvent::SortToggled => self.toggle_sort(),
            AppEvent::Reset => self.reset(),
        }
    }

    // --- Geolocation ---

    pub fn on_position_acquired(&mut self, position: Position) {
        if self.map.is_initialized() {
            debug!("map already initialized, ignoring position update");
            return;
        }
        self.map.initialize(position.coords, self.config.zoom_level);
        self.map
            .draw_accuracy_circle(position.coords, position.accuracy_m);

        let events = self.event_sender();
        self.map.on_click(move |coords| {
            if events.send(AppEvent::MapClicked(coords)).is_err() {
                debug!("map click dropped, event loop gone");
            }
        });

        for workout in &self.state.workouts {
            self.map.place_marker(
                workout.id(),
                workout.coords(),
                &workout.popup_text(),
                &workout.popup_class(),
            );
        }
    }

    pub fn on_position_failed(&mut self, error: &GeolocationError) {
        warn!(error = %error, "continuing without a map");
        self.view.alert(POSITION_ALERT);
    }

    // --- Form ---

    /// Map click: remember where, open the form.
    pub fn show_form(&mut self, coords: Coords) {
        self.state.pending_coords = Some(coords);
        if self.state.mode == Mode::Idle {
            self.state.mode = Mode::AwaitingEntry;
        }
        self.view.show_form(None);
    }

    pub fn change_form_type(&mut self, workout_type: WorkoutType) {
        self.view.set_form_type(workout_type);
    }

    /// Validates the form and records the workout.
    ///
    /// On failure the user is alerted and nothing changes, the form stays open.
    /// # Errors
    /// Returns `SubmitError::Invalid` for bad input, `SubmitError::NoLocation`
    /// when the form was not opened from the map or a list entry.
    pub fn submit_form(&mut self, input: &FormInput) -> Result<Workout, SubmitError> {
        let Some(coords) = self.state.pending_coords else {
            warn!("form submitted without a pending location");
            return Err(SubmitError::NoLocation);
        };

        let workout = match self.build_workout(input, coords) {
            Ok(workout) => workout,
            Err(e) => {
                debug!(error = %e, "rejected form input");
                self.view.alert(INVALID_INPUT_ALERT);
                return Err(e.into());
            }
        };

        if self.workout(workout.id()).is_some() {
            warn!(id = workout.id(), "workout id collides with an existing one");
        }
        info!(id = workout.id(), kind = %workout.workout_type(), "workout created");

        self.state.workouts.push(workout.clone());
        self.map.place_marker(
            workout.id(),
            workout.coords(),
            &workout.popup_text(),
            &workout.popup_class(),
        );
        match self.state.sort_order {
            SortOrder::Insertion => self.view.render_workout(ListEntry::from(&workout)),
            SortOrder::Distance => self.render_list(),
        }
        self.view.hide_form();
        self.persist();

        self.state.pending_coords = None;
        self.state.edit_target = None;
        self.state.mode = Mode::Idle;
        Ok(workout)
    }

    fn build_workout(&mut self, input: &FormInput, coords: Coords) -> Result<Workout, ValidationError> {
        let distance = parse_field(&input.distance);
        let duration = parse_field(&input.duration);
        let metric = parse_field(input.metric());

        // Checked here and again by the constructor.
        if !distance.is_finite() || distance <= 0.0 {
            return Err(ValidationError::InvalidDistance(distance));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::InvalidDuration(duration));
        }
        match input.workout_type {
            WorkoutType::Running if !metric.is_finite() || metric <= 0.0 => {
                return Err(ValidationError::InvalidCadence(metric));
            }
            WorkoutType::Cycling if !metric.is_finite() => {
                return Err(ValidationError::InvalidElevation(metric));
            }
            _ => {}
        }

        let created_at = (self.clock)();
        Workout::create_at(input.workout_type, created_at, coords, distance, duration, metric)
    }

    /// Closes the form without recording anything.
    pub fn cancel_form(&mut self) {
        self.view.hide_form();
        self.state.pending_coords = None;
        self.state.edit_target = None;
        self.state.mode = Mode::Idle;
    }

    // --- List interactions ---

    /// List click: pan the map to the workout. Returns `false` if nothing happened.
    pub fn focus_workout(&mut self, id: &str) -> bool {
        if !self.map.is_initialized() {
            return false;
        }
        let Some(workout) = self.state.workouts.iter_mut().find(|w| w.id() == id) else {
            debug!(id, "clicked workout not found");
            return false;
        };
        workout.register_view();
        let coords = workout.coords();
        self.map.recenter(coords, self.config.zoom_level, true);
        true
    }

    /// List double click: removes the workout and reopens the form with its
    /// values, anchored at its location. Submitting re-creates it; cancelling
    /// leaves it deleted.
    pub fn edit_workout(&mut self, id: &str) -> Option<Workout> {
        let index = self.state.workouts.iter().position(|w| w.id() == id)?;
        let workout = self.state.workouts.remove(index);
        info!(id, "workout removed for editing");

        self.view.remove_workout(id);
        self.map.remove_marker(id);
        // Views and widgets drop every row and marker carrying the id, so
        // workouts that share it are put back.
        let survivors: Vec<Workout> = self
            .state
            .workouts
            .iter()
            .filter(|w| w.id() == id)
            .cloned()
            .collect();
        if !survivors.is_empty() {
            warn!(id, count = survivors.len(), "other workouts share the edited id");
            self.render_list();
            for survivor in &survivors {
                self.map.place_marker(
                    survivor.id(),
                    survivor.coords(),
                    &survivor.popup_text(),
                    &survivor.popup_class(),
                );
            }
        }
        self.persist();

        self.state.pending_coords = Some(workout.coords());
        self.state.edit_target = Some(workout.id().to_string());
        self.state.mode = Mode::EditingEntry;
        self.view.show_form(Some(&FormInput::from(&workout)));
        Some(workout)
    }

    pub fn toggle_sort(&mut self) {
        self.state.sort_order = self.state.sort_order.toggled();
        debug!(order = ?self.state.sort_order, "list order changed");
        self.render_list();
    }

    /// Drops everything stored and starts over from an empty list.
    pub fn reset(&mut self) {
        info!("resetting all workouts");
        self.persistence.clear();
        self.map.clear_markers();
        self.view.hide_form();
        self.state = AppState::default();
        self.load_persisted();
    }

    // --- Helpers ---

    fn render_list(&mut self) {
        let entries: Vec<ListEntry> = self
            .display_order()
            .into_iter()
            .map(ListEntry::from)
            .collect();
        self.view.clear_workouts();
        for entry in entries {
            self.view.render_workout(entry);
        }
    }

    fn persist(&mut self) {
        self.persistence.save(&self.state.workouts);
    }
}

/// Reads a numeric form field. Blank counts as zero; anything unparsable
/// becomes NaN so that it fails the finiteness check.
pub fn parse_field(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}
