// mapty-tui/src/ui/layout.rs
use crate::{
    app::{ActiveModal, App},
    ui::{
        form::{render_form, FORM_HEIGHT},
        list_pane::render_list_pane,
        map_pane::render_map_pane,
        modals::render_modal,
        status_bar::render_status_bar,
    },
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // Sidebar and map on top, status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(main_chunks[0]);

    render_sidebar(f, app, content_chunks[0]);
    render_map_pane(f, app, content_chunks[1]);
    render_status_bar(f, app, main_chunks[1]);

    if app.active_modal != ActiveModal::None {
        render_modal(f, app);
    }
}

// The form sits on top of the list while it is open
fn render_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    if app.form_open() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FORM_HEIGHT), Constraint::Min(0)])
            .split(area);
        render_form(f, app, chunks[0]);
        render_list_pane(f, app, chunks[1]);
    } else {
        render_list_pane(f, app, area);
    }
}

/// Helper function to create a centered rectangle for modals
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
