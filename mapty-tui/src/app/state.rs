// mapty-tui/src/app/state.rs
use super::map_widget::CanvasMap;
use super::view::TuiView;
use mapty_lib::{AppController, Coords};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

pub type TuiController = AppController<TuiView, CanvasMap>;

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);

// Which pane receives navigation keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    List,
    Map,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    Help,
    ConfirmReset,
    /// Message from the controller; blocks input until dismissed.
    Alert(String),
}

/// Screen areas from the last frame, used to hit-test mouse clicks.
#[derive(Clone, Copy, Debug, Default)]
pub struct HitAreas {
    pub list_inner: Rect,
    pub map_inner: Rect,
}

pub struct App {
    pub controller: TuiController,
    pub should_quit: bool,
    pub focus: Focus,
    pub active_modal: ActiveModal,
    pub list_state: ListState,
    /// Cell targeted by keyboard map clicks.
    pub map_cursor: Option<Coords>,
    pub areas: HitAreas,
    /// Previous list click, for double click detection.
    pub last_list_click: Option<(usize, Instant)>,
    pub status_message: Option<String>,
    status_clear_time: Option<Instant>,
}

impl App {
    pub fn new(controller: TuiController) -> Self {
        let mut app = Self {
            controller,
            should_quit: false,
            focus: Focus::List,
            active_modal: ActiveModal::None,
            list_state: ListState::default(),
            map_cursor: None,
            areas: HitAreas::default(),
            last_list_click: None,
            status_message: None,
            status_clear_time: None,
        };
        app.clamp_selection();
        app
    }

    /// Runs once per loop turn: handles queued controller events, surfaces
    /// alerts and keeps the list selection in range.
    pub fn tick(&mut self) {
        if self.controller.pump_events() > 0 {
            self.clamp_selection();
        }
        if self.map_cursor.is_none() {
            self.map_cursor = self.controller.map().handle().map(|h| h.center);
        }
        if self.active_modal == ActiveModal::None {
            if let Some(message) = self.controller.view_mut().next_alert() {
                self.active_modal = ActiveModal::Alert(message);
            }
        }
        self.clear_expired_status();
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_clear_time = Some(Instant::now() + STATUS_MESSAGE_TTL);
    }

    fn clear_expired_status(&mut self) {
        if let Some(clear_time) = self.status_clear_time {
            if Instant::now() >= clear_time {
                self.status_message = None;
                self.status_clear_time = None;
            }
        }
    }

    pub fn form_open(&self) -> bool {
        self.controller.view().form.is_some()
    }

    /// Id of the workout under the list selection.
    pub fn selected_id(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        self.controller
            .view()
            .entries
            .get(index)
            .map(|entry| entry.id.clone())
    }

    pub fn clamp_selection(&mut self) {
        let len = self.controller.view().entries.len();
        let selected = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.list_state.select(selected);
    }
}
