//src/view.rs
use crate::workout::{Workout, WorkoutKind, WorkoutType};

/// Raw values of the entry form, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInput {
    pub workout_type: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormInput {
    pub fn running(distance: &str, duration: &str, cadence: &str) -> Self {
        Self {
            workout_type: WorkoutType::Running,
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: cadence.to_string(),
            elevation: String::new(),
        }
    }

    pub fn cycling(distance: &str, duration: &str, elevation: &str) -> Self {
        Self {
            workout_type: WorkoutType::Cycling,
            distance: distance.to_string(),
            duration: duration.to_string(),
            cadence: String::new(),
            elevation: elevation.to_string(),
        }
    }

    /// The field shown for the current type: cadence or elevation.
    pub fn metric(&self) -> &str {
        match self.workout_type {
            WorkoutType::Running => &self.cadence,
            WorkoutType::Cycling => &self.elevation,
        }
    }
}

impl From<&Workout> for FormInput {
    fn from(workout: &Workout) -> Self {
        let distance = workout.distance_km().to_string();
        let duration = workout.duration_min().to_string();
        let metric = workout.metric().to_string();
        match workout.workout_type() {
            WorkoutType::Running => Self::running(&distance, &duration, &metric),
            WorkoutType::Cycling => Self::cycling(&distance, &duration, &metric),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl DetailRow {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

/// One rendered item of the workout list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub workout_type: WorkoutType,
    pub title: String,
    pub details: Vec<DetailRow>,
}

impl From<&Workout> for ListEntry {
    fn from(workout: &Workout) -> Self {
        let mut details = vec![
            DetailRow::new(workout.icon(), workout.distance_km().to_string(), "km"),
            DetailRow::new("⏱", workout.duration_min().to_string(), "min"),
        ];
        match *workout.kind() {
            WorkoutKind::Running {
                cadence_spm,
                pace_min_per_km,
            } => {
                details.push(DetailRow::new("⚡️", format!("{pace_min_per_km:.1}"), "min/km"));
                details.push(DetailRow::new("🦶🏼", cadence_spm.to_string(), "spm"));
            }
            WorkoutKind::Cycling {
                elevation_gain_m,
                speed_km_per_h,
            } => {
                details.push(DetailRow::new("⚡️", format!("{speed_km_per_h:.1}"), "km/h"));
                details.push(DetailRow::new("⛰", elevation_gain_m.to_string(), "m"));
            }
        }
        Self {
            id: workout.id().to_string(),
            workout_type: workout.workout_type(),
            title: workout.description().to_string(),
            details,
        }
    }
}

/// The form, list and alert surface the controller drives.
pub trait View {
    /// Shows the entry form, optionally pre-filled.
    fn show_form(&mut self, prefill: Option<&FormInput>);
    /// Hides the form and clears its inputs.
    fn hide_form(&mut self);
    /// Switches between the cadence and the elevation field.
    fn set_form_type(&mut self, workout_type: WorkoutType);
    fn render_workout(&mut self, entry: ListEntry);
    fn remove_workout(&mut self, id: &str);
    fn clear_workouts(&mut self);
    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
}

/// View that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferedView {
    pub entries: Vec<ListEntry>,
    pub form_visible: bool,
    pub form: FormInput,
    pub alerts: Vec<String>,
}

impl BufferedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }
}

impl View for BufferedView {
    fn show_form(&mut self, prefill: Option<&FormInput>) {
        if let Some(values) = prefill {
            self.form = values.clone();
        }
        self.form_visible = true;
    }

    fn hide_form(&mut self) {
        // The selected type survives, like a <select> that is not reset.
        self.form = FormInput {
            workout_type: self.form.workout_type,
            ..FormInput::default()
        };
        self.form_visible = false;
    }

    fn set_form_type(&mut self, workout_type: WorkoutType) {
        self.form.workout_type = workout_type;
    }

    fn render_workout(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }

    fn remove_workout(&mut self, id: &str) {
        self.entries.retain(|e| e.id != id);
    }

    fn clear_workouts(&mut self) {
        self.entries.clear();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
