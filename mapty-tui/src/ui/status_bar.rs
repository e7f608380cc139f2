// mapty-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, App, Focus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None if app.form_open() => {
            " [Enter] Save | [Esc] Cancel | [Tab/↑↓] Field | [Space] Type "
        }
        ActiveModal::None => match app.focus {
            Focus::List => {
                " [Tab] Map | [↑↓/jk] Nav | [Enter] Show | [e]dit | [s]ort | [R]eset | [?] Help | [q]uit "
            }
            Focus::Map => {
                " [Tab] List | [hjkl] Move | [Enter] Log here | [+/-] Zoom | [?] Help | [q]uit "
            }
        },
        ActiveModal::Help => " [Esc/Enter/?] Close Help ",
        ActiveModal::ConfirmReset => " [y] Delete everything | [n/Esc] Keep ",
        ActiveModal::Alert(_) => " [Enter/Esc] Dismiss ",
    };

    let message = app.status_message.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let message_paragraph = Paragraph::new(message)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(Alignment::Right);
    f.render_widget(message_paragraph, status_chunks[1]);
}
