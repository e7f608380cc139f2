// mapty-tui/src/ui/modals.rs
use crate::{
    app::{ActiveModal, App},
    ui::layout::centered_rect,
};
use ratatui::{
    layout::{Alignment, Margin},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_modal(f: &mut Frame, app: &App) {
    match &app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::ConfirmReset => render_confirm_reset_modal(f, app),
        ActiveModal::Alert(message) => render_alert_modal(f, message),
        ActiveModal::None => {}
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Global ---").style(Style::new().bold().underlined()),
        Line::from(" q: Quit"),
        Line::from(" ?: Show/Hide This Help"),
        Line::from(" Tab: Switch Focus (Workouts <=> Map)"),
        Line::from(" s: Toggle Sort (Created / Distance)"),
        Line::from(" + / -: Zoom Map In / Out"),
        Line::from(" R: Delete All Workouts"),
        Line::from(""),
        Line::from("--- Workouts ---").style(Style::new().bold().underlined()),
        Line::from(" k/j / ↑/↓: Navigate"),
        Line::from(" Enter / Click: Show Workout On Map"),
        Line::from(" e / Double Click: Edit Workout (removes it until saved)"),
        Line::from(""),
        Line::from("--- Map ---").style(Style::new().bold().underlined()),
        Line::from(" h/j/k/l / Arrows: Move Cursor (Shift: faster)"),
        Line::from(" Enter / Space / Click: Log Workout Here"),
        Line::from(" Mouse Wheel: Zoom"),
        Line::from(""),
        Line::from("--- Form ---").style(Style::new().bold().underlined()),
        Line::from(" Tab/↑↓: Next/Previous Field"),
        Line::from(" Space / ←→ (on Type): Running <=> Cycling"),
        Line::from(" Enter: Save | Esc: Cancel"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_confirm_reset_modal(f: &mut Frame, app: &App) {
    let count = app.controller.workouts().len();
    let block = Block::default()
        .title("Confirm Reset")
        .borders(Borders::ALL)
        .border_style(Style::new().red());
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(format!("Delete all {count} workout(s)?")),
        Line::from("This cannot be undone."),
        Line::from(""),
        Line::from(Span::styled(" [y] Yes   [n/Esc] No ", Style::new().bold())),
    ];
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_alert_modal(f: &mut Frame, message: &str) {
    let block = Block::default()
        .title("Alert")
        .borders(Borders::ALL)
        .border_style(Style::new().yellow());
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(" [Enter] OK ", Style::new().italic())),
    ];
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}
