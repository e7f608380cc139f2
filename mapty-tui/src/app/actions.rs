// mapty-tui/src/app/actions.rs
use super::map_widget::cell_size;
use super::state::{App, Focus};
use mapty_lib::{AppEvent, Coords};
use std::time::{Duration, Instant};
use tracing::debug;

/// Terminal rows taken by one workout in the list.
pub const LIST_ENTRY_HEIGHT: u16 = 2;
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const NO_MAP: &str = "Map not available";

impl App {
    pub(crate) fn dispatch(&mut self, event: AppEvent) {
        self.controller.handle_event(event);
        self.clamp_selection();
    }

    pub(crate) fn list_next(&mut self) {
        let len = self.controller.view().entries.len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
        self.list_state.select(Some(i));
    }

    pub(crate) fn list_previous(&mut self) {
        let len = self.controller.view().entries.len();
        if len == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.list_state.select(Some(i));
    }

    /// Pans the map to the selected workout.
    pub(crate) fn open_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if !self.controller.map().is_initialized() {
            self.set_status(NO_MAP);
            return;
        }
        self.dispatch(AppEvent::WorkoutClicked(id));
        self.map_cursor = self.controller.map().handle().map(|h| h.center);
    }

    /// Removes the selected workout and reopens the form with its values.
    pub(crate) fn edit_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(AppEvent::WorkoutDoubleClicked(id));
        }
    }

    /// Single or double click on list row `index`.
    pub(crate) fn click_list_entry(&mut self, index: usize) {
        if index >= self.controller.view().entries.len() {
            return;
        }
        self.focus = Focus::List;
        self.list_state.select(Some(index));

        let now = Instant::now();
        let is_double = matches!(
            self.last_list_click,
            Some((last, at)) if last == index && now.duration_since(at) <= DOUBLE_CLICK_WINDOW
        );
        if is_double {
            self.last_list_click = None;
            self.edit_selected();
        } else {
            self.last_list_click = Some((index, now));
            self.open_selected();
        }
    }

    /// Clicks the map at `coords`; the controller sees it on the next tick.
    pub(crate) fn click_map(&mut self, coords: Coords) {
        self.map_cursor = Some(coords);
        if !self.controller.map_mut().emit_click(coords) {
            self.set_status(NO_MAP);
        }
    }

    pub(crate) fn click_map_at_cursor(&mut self) {
        match self.map_cursor {
            Some(coords) => self.click_map(coords),
            None => self.set_status(NO_MAP),
        }
    }

    /// Moves the keyboard cursor by whole cells.
    pub(crate) fn move_map_cursor(&mut self, columns: i32, rows: i32) {
        let Some(handle) = self.controller.map().handle() else {
            self.set_status(NO_MAP);
            return;
        };
        let (lng_step, lat_step) = cell_size(handle.zoom);
        let cursor = self.map_cursor.unwrap_or(handle.center);
        self.map_cursor = Some(Coords::new(
            (cursor.lat - f64::from(rows) * lat_step).clamp(-90.0, 90.0),
            (cursor.lng + f64::from(columns) * lng_step).clamp(-180.0, 180.0),
        ));
    }

    pub(crate) fn zoom_by(&mut self, delta: i8) {
        let Some(handle) = self.controller.map().handle() else {
            self.set_status(NO_MAP);
            return;
        };
        let zoom = handle.zoom.saturating_add_signed(delta);
        // Zoom around the cursor when there is one.
        let center = self.map_cursor.unwrap_or(handle.center);
        self.controller.map_mut().recenter(center, zoom, false);
        debug!(zoom, "map zoom changed");
    }
}
