// mapty-tui/src/ui/form.rs
use crate::app::{App, FormField};
use mapty_lib::{Mode, WorkoutType};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub const FORM_HEIGHT: u16 = 7;
const LABEL_WIDTH: u16 = 12;

pub fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.controller.view().form.as_ref() else {
        return;
    };
    let title = match app.controller.mode() {
        Mode::EditingEntry => " Edit workout ",
        _ => " New workout ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::new().yellow());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let input = &form.input;
    let (metric_label, metric_value) = match input.workout_type {
        WorkoutType::Running => ("Cadence", input.cadence.as_str()),
        WorkoutType::Cycling => ("Elev Gain", input.elevation.as_str()),
    };
    let type_value = format!("< {} {} >", input.workout_type.icon(), input.workout_type.label());

    let fields = [
        (FormField::Type, "Type", type_value.as_str(), ""),
        (FormField::Distance, "Distance", input.distance.as_str(), "km"),
        (FormField::Duration, "Duration", input.duration.as_str(), "min"),
        (
            FormField::Metric,
            metric_label,
            metric_value,
            match input.workout_type {
                WorkoutType::Running => "step/min",
                WorkoutType::Cycling => "meters",
            },
        ),
    ];

    for (row, (field, label, value, unit)) in rows.iter().zip(fields) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(0)])
            .split(*row);

        f.render_widget(Paragraph::new(format!("{label}:")), cols[0]);

        let style = if form.focused == field {
            Style::default().reversed()
        } else {
            Style::default()
        };
        let line = Line::from(vec![
            Span::styled(value.to_string(), style),
            Span::raw(" "),
            Span::styled(unit, Style::new().fg(Color::DarkGray)),
        ]);
        f.render_widget(Paragraph::new(line), cols[1]);

        if form.focused == field && field != FormField::Type {
            let x = cols[1].x + u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
            f.set_cursor(x.min(cols[1].right().saturating_sub(1)), cols[1].y);
        }
    }

    f.render_widget(
        Paragraph::new("[Enter] Save  [Esc] Cancel  [Tab] Next  [Space] Type")
            .style(Style::new().fg(Color::DarkGray)),
        rows[4],
    );
}
