// mapty-tui/src/ui/map_pane.rs
use crate::app::{map_widget::meters_to_degrees, App, Focus};
use crate::ui::list_pane::{CYCLING_COLOR, RUNNING_COLOR};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Map, MapResolution, Points},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

fn popup_color(class_name: &str) -> Color {
    if class_name.starts_with("cycling") {
        CYCLING_COLOR
    } else {
        RUNNING_COLOR
    }
}

pub fn render_map_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Map {
        Style::new().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    app.areas.map_inner = inner;

    let map = app.controller.map().widget();
    let Some(viewport) = map.viewport(inner.width, inner.height) else {
        let text = Paragraph::new(
            "Map not available.\n\nSet latitude and longitude under [geolocation] in the config file.",
        )
        .alignment(Alignment::Center)
        .style(Style::new().fg(Color::DarkGray))
        .wrap(Wrap { trim: true })
        .block(block.title(" Map "));
        f.render_widget(text, area);
        return;
    };

    if let Some(center) = map.center {
        block = block.title(format!(
            " Map  {:.4}, {:.4}  zoom {} ",
            center.lat, center.lng, map.zoom
        ));
    }

    let markers = &map.markers;
    let circle = map.accuracy_circle;
    let cursor = if app.focus == Focus::Map {
        app.map_cursor
    } else {
        None
    };

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.x_bounds)
        .y_bounds(viewport.y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            if let Some((center, radius_m)) = circle {
                ctx.draw(&Circle {
                    x: center.lng,
                    y: center.lat,
                    radius: meters_to_degrees(radius_m),
                    color: Color::Blue,
                });
            }

            for marker in markers {
                let color = popup_color(&marker.popup.class_name);
                let point = [(marker.coords.lng, marker.coords.lat)];
                ctx.draw(&Points {
                    coords: &point,
                    color,
                });
                ctx.print(
                    marker.coords.lng,
                    marker.coords.lat,
                    Line::from(Span::styled(
                        format!("📍{}", marker.popup.content),
                        Style::new().fg(color).bold(),
                    )),
                );
            }

            if let Some(cursor) = cursor {
                ctx.print(cursor.lng, cursor.lat, Line::from("✛".yellow().bold()));
            }
        });
    f.render_widget(canvas, area);
}
