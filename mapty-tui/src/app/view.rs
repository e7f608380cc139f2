// mapty-tui/src/app/view.rs
use mapty_lib::{FormInput, ListEntry, View, WorkoutType};
use std::collections::VecDeque;

// Fields within the workout form, in tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormField {
    Type,
    #[default]
    Distance,
    Duration,
    /// Cadence or elevation gain, depending on the type
    Metric,
}

impl FormField {
    pub const fn next(self) -> Self {
        match self {
            Self::Type => Self::Distance,
            Self::Distance => Self::Duration,
            Self::Duration => Self::Metric,
            Self::Metric => Self::Type,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::Type => Self::Metric,
            Self::Distance => Self::Type,
            Self::Duration => Self::Distance,
            Self::Metric => Self::Duration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    pub input: FormInput,
    pub focused: FormField,
}

impl FormState {
    /// The text buffer behind the focused field, `None` for the type selector.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focused {
            FormField::Type => None,
            FormField::Distance => Some(&mut self.input.distance),
            FormField::Duration => Some(&mut self.input.duration),
            FormField::Metric => Some(match self.input.workout_type {
                WorkoutType::Running => &mut self.input.cadence,
                WorkoutType::Cycling => &mut self.input.elevation,
            }),
        }
    }
}

/// Sidebar contents as last rendered by the controller.
#[derive(Debug, Default)]
pub struct TuiView {
    pub entries: Vec<ListEntry>,
    pub form: Option<FormState>,
    // Survives hiding the form, like the type selector on a web page.
    form_type: WorkoutType,
    alerts: VecDeque<String>,
}

impl TuiView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_alert(&mut self) -> Option<String> {
        self.alerts.pop_front()
    }
}

impl View for TuiView {
    fn show_form(&mut self, prefill: Option<&FormInput>) {
        let input = match prefill {
            Some(values) => {
                self.form_type = values.workout_type;
                values.clone()
            }
            None => match self.form.take() {
                // A second map click moves the anchor but keeps what was typed.
                Some(open) => open.input,
                None => FormInput {
                    workout_type: self.form_type,
                    ..FormInput::default()
                },
            },
        };
        self.form = Some(FormState {
            input,
            focused: FormField::Distance,
        });
    }

    fn hide_form(&mut self) {
        self.form = None;
    }

    fn set_form_type(&mut self, workout_type: WorkoutType) {
        self.form_type = workout_type;
        if let Some(form) = self.form.as_mut() {
            form.input.workout_type = workout_type;
        }
    }

    fn render_workout(&mut self, entry: ListEntry) {
        self.entries.push(entry);
    }

    fn remove_workout(&mut self, id: &str) {
        self.entries.retain(|entry| entry.id != id);
    }

    fn clear_workouts(&mut self) {
        self.entries.clear();
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push_back(message.to_string());
    }
}
