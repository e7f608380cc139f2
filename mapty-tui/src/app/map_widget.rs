// mapty-tui/src/app/map_widget.rs
use mapty_lib::{Coords, MapWidget, Marker};
use ratatui::layout::Rect;

// A 256px map tile spans 32 terminal columns of roughly 8px.
const COLUMNS_PER_TILE: f64 = 32.0;
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Visible lng/lat range of the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

/// Degrees covered by one terminal cell at `zoom`, as (lng per column, lat per row).
/// Cells are about twice as tall as they are wide.
pub fn cell_size(zoom: u8) -> (f64, f64) {
    let lng = 360.0 / (2f64.powi(i32::from(zoom)) * COLUMNS_PER_TILE);
    (lng, lng * 2.0)
}

pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Map drawn on a ratatui canvas. Keeps what the controller asked for;
/// the UI reads it back every frame.
#[derive(Debug, Default)]
pub struct CanvasMap {
    pub center: Option<Coords>,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub accuracy_circle: Option<(Coords, f64)>,
}

impl CanvasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the map has a view.
    pub fn viewport(&self, width: u16, height: u16) -> Option<Viewport> {
        let center = self.center?;
        let (lng_per_col, lat_per_row) = cell_size(self.zoom);
        let half_w = f64::from(width) * lng_per_col / 2.0;
        let half_h = f64::from(height) * lat_per_row / 2.0;
        Some(Viewport {
            x_bounds: [center.lng - half_w, center.lng + half_w],
            y_bounds: [center.lat - half_h, center.lat + half_h],
        })
    }

    /// Geographic position under a terminal cell of the canvas drawn in `inner`.
    pub fn coords_at(&self, inner: Rect, column: u16, row: u16) -> Option<Coords> {
        if inner.width == 0
            || inner.height == 0
            || column < inner.x
            || row < inner.y
            || column >= inner.x + inner.width
            || row >= inner.y + inner.height
        {
            return None;
        }
        let viewport = self.viewport(inner.width, inner.height)?;
        let fx = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width);
        let fy = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
        let [west, east] = viewport.x_bounds;
        let [south, north] = viewport.y_bounds;
        let lng = west + fx * (east - west);
        let lat = north - fy * (north - south);
        Some(Coords::new(lat.clamp(-90.0, 90.0), lng.clamp(-180.0, 180.0)))
    }
}

impl MapWidget for CanvasMap {
    fn set_view(&mut self, center: Coords, zoom: u8, _animate: bool) {
        // No animation in a terminal; panning is instant.
        self.center = Some(center);
        self.zoom = zoom;
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker);
    }

    fn remove_marker(&mut self, id: &str) {
        self.markers.retain(|m| m.id != id);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn add_circle(&mut self, center: Coords, radius_m: f64) {
        self.accuracy_circle = Some((center, radius_m));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_map() -> CanvasMap {
        let mut map = CanvasMap::new();
        map.set_view(Coords::new(51.5, -0.1), 13, false);
        map
    }

    #[test]
    fn viewport_is_centered() {
        let map = centered_map();
        let viewport = map.viewport(80, 20).unwrap();
        let mid_x = (viewport.x_bounds[0] + viewport.x_bounds[1]) / 2.0;
        let mid_y = (viewport.y_bounds[0] + viewport.y_bounds[1]) / 2.0;
        assert!((mid_x - -0.1).abs() < 1e-9);
        assert!((mid_y - 51.5).abs() < 1e-9);
        assert!(CanvasMap::new().viewport(80, 20).is_none());
    }

    #[test]
    fn click_position_maps_to_coords() {
        let map = centered_map();
        let inner = Rect::new(10, 5, 81, 21);

        let middle = map.coords_at(inner, 50, 15).unwrap();
        assert!((middle.lat - 51.5).abs() < 1e-9);
        assert!((middle.lng - -0.1).abs() < 1e-9);

        let top_left = map.coords_at(inner, 10, 5).unwrap();
        assert!(top_left.lat > middle.lat);
        assert!(top_left.lng < middle.lng);

        assert!(map.coords_at(inner, 9, 5).is_none());
        assert!(map.coords_at(inner, 91, 5).is_none());
    }

    #[test]
    fn zooming_in_halves_cell_size() {
        let (lng13, lat13) = cell_size(13);
        let (lng14, lat14) = cell_size(14);
        assert!((lng13 / lng14 - 2.0).abs() < 1e-9);
        assert!((lat13 / lat14 - 2.0).abs() < 1e-9);
    }
}
