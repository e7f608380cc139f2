// mapty-tui/src/app/input.rs
use super::actions::LIST_ENTRY_HEIGHT;
use super::state::{ActiveModal, App, Focus};
use super::view::FormField;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use mapty_lib::AppEvent;
use ratatui::layout::Rect;

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
}

impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return;
        }
        if self.form_open() {
            self.handle_form_input(key);
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Char('s') => self.dispatch(AppEvent::SortToggled),
            KeyCode::Char('R') => self.active_modal = ActiveModal::ConfirmReset,
            KeyCode::Char('+' | '=') => self.zoom_by(1),
            KeyCode::Char('-') => self.zoom_by(-1),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::List => Focus::Map,
                    Focus::Map => Focus::List,
                };
            }
            _ => match self.focus {
                Focus::List => self.handle_list_input(key),
                Focus::Map => self.handle_map_input(key),
            },
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.list_next(),
            KeyCode::Char('k') | KeyCode::Up => self.list_previous(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('e') => self.edit_selected(),
            _ => {}
        }
    }

    fn handle_map_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.move_map_cursor(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => self.move_map_cursor(1, 0),
            KeyCode::Char('k') | KeyCode::Up => self.move_map_cursor(0, -1),
            KeyCode::Char('j') | KeyCode::Down => self.move_map_cursor(0, 1),
            KeyCode::Char('H') => self.move_map_cursor(-10, 0),
            KeyCode::Char('L') => self.move_map_cursor(10, 0),
            KeyCode::Char('K') => self.move_map_cursor(0, -5),
            KeyCode::Char('J') => self.move_map_cursor(0, 5),
            KeyCode::Enter | KeyCode::Char(' ') => self.click_map_at_cursor(),
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) {
        let Some(form) = self.controller.view_mut().form.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.dispatch(AppEvent::FormCancelled),
            KeyCode::Enter => {
                let input = form.input.clone();
                self.dispatch(AppEvent::FormSubmitted(input));
            }
            KeyCode::Tab | KeyCode::Down => form.focused = form.focused.next(),
            KeyCode::BackTab | KeyCode::Up => form.focused = form.focused.previous(),
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if form.focused == FormField::Type =>
            {
                let toggled = form.input.workout_type.toggled();
                self.dispatch(AppEvent::FormTypeChanged(toggled));
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                if let Some(text) = form.focused_text_mut() {
                    text.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(text) = form.focused_text_mut() {
                    text.pop();
                }
            }
            _ => {}
        }
    }

    fn handle_modal_input(&mut self, key: KeyEvent) {
        match self.active_modal {
            ActiveModal::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
                    self.active_modal = ActiveModal::None;
                }
            }
            ActiveModal::ConfirmReset => match key.code {
                KeyCode::Char('y' | 'Y') => {
                    self.active_modal = ActiveModal::None;
                    self.dispatch(AppEvent::Reset);
                    self.map_cursor = self.controller.map().handle().map(|h| h.center);
                    self.set_status("All workouts deleted");
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.active_modal = ActiveModal::None,
                _ => {}
            },
            ActiveModal::Alert(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
                    self.active_modal = ActiveModal::None;
                }
            }
            ActiveModal::None => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.active_modal != ActiveModal::None {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if contains(self.areas.map_inner, column, row) {
                    self.focus = Focus::Map;
                    let coords = self
                        .controller
                        .map()
                        .widget()
                        .coords_at(self.areas.map_inner, column, row);
                    if let Some(coords) = coords {
                        self.click_map(coords);
                    }
                } else if contains(self.areas.list_inner, column, row) && !self.form_open() {
                    // The open form may hold a workout removed for editing.
                    let offset = self.list_state.offset();
                    let index = offset + usize::from((row - self.areas.list_inner.y) / LIST_ENTRY_HEIGHT);
                    self.click_list_entry(index);
                }
            }
            MouseEventKind::ScrollUp if contains(self.areas.map_inner, column, row) => {
                self.zoom_by(1);
            }
            MouseEventKind::ScrollDown if contains(self.areas.map_inner, column, row) => {
                self.zoom_by(-1);
            }
            _ => {}
        }
    }
}
