// mapty-tui/src/ui/list_pane.rs
use crate::app::{App, Focus};
use mapty_lib::{ListEntry, SortOrder, WorkoutType};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub const RUNNING_COLOR: Color = Color::Rgb(0, 196, 106);
pub const CYCLING_COLOR: Color = Color::Rgb(255, 181, 69);

pub const fn type_color(workout_type: WorkoutType) -> Color {
    match workout_type {
        WorkoutType::Running => RUNNING_COLOR,
        WorkoutType::Cycling => CYCLING_COLOR,
    }
}

fn entry_item(entry: &ListEntry) -> ListItem<'static> {
    let color = type_color(entry.workout_type);
    let title = Line::from(vec![
        Span::styled("▌", Style::new().fg(color)),
        Span::styled(entry.title.clone(), Style::new().bold()),
    ]);
    let mut details = vec![Span::styled("▌", Style::new().fg(color))];
    for row in &entry.details {
        details.push(Span::raw(format!("{} ", row.icon)));
        details.push(Span::styled(row.value.clone(), Style::new().bold()));
        details.push(Span::styled(
            format!(" {}  ", row.unit),
            Style::new().fg(Color::DarkGray),
        ));
    }
    ListItem::new(vec![title, Line::from(details)])
}

pub fn render_list_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.controller.state().sort_order {
        SortOrder::Insertion => " Workouts ",
        SortOrder::Distance => " Workouts (by distance) ",
    };
    let border_style = if app.focus == Focus::List && !app.form_open() {
        Style::new().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    app.areas.list_inner = block.inner(area);

    let entries = &app.controller.view().entries;
    if entries.is_empty() {
        let hint = Paragraph::new("No workouts yet.\nClick the map (or Tab, move, Enter) to log one.")
            .alignment(Alignment::Center)
            .style(Style::new().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(hint, area);
        return;
    }

    let items: Vec<ListItem> = entries.iter().map(entry_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}
