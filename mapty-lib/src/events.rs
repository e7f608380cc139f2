//src/events.rs
use crate::geolocation::{GeolocationError, Position};
use crate::view::FormInput;
use crate::workout::{Coords, WorkoutType};

/// Everything the controller reacts to. Front-ends translate their raw input
/// into these; the geolocation thread and the map click handler send them
/// through the controller's channel.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    PositionAcquired(Position),
    PositionFailed(GeolocationError),
    MapClicked(Coords),
    FormTypeChanged(WorkoutType),
    FormSubmitted(FormInput),
    FormCancelled,
    /// Single click on a list entry, by workout id.
    WorkoutClicked(String),
    /// Double click on a list entry, by workout id.
    WorkoutDoubleClicked(String),
    SortToggled,
    Reset,
}
