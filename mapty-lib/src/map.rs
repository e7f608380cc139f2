//src/map.rs
use crate::workout::Coords;
use tracing::debug;

pub const DEFAULT_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 19;

/// Popup bound to a marker. Workout popups stay open until the marker goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub content: String,
    pub class_name: String,
}

impl Popup {
    pub fn new(content: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            class_name: class_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: String,
    pub coords: Coords,
    pub popup: Popup,
}

/// The map rendering widget. Implemented by each front-end.
pub trait MapWidget {
    fn set_view(&mut self, center: Coords, zoom: u8, animate: bool);
    fn add_marker(&mut self, marker: Marker);
    fn remove_marker(&mut self, id: &str);
    fn clear_markers(&mut self);
    fn add_circle(&mut self, center: Coords, radius_m: f64);
}

/// Returned by [`MapAdapter::initialize`]; tracks the current view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapHandle {
    pub center: Coords,
    pub zoom: u8,
}

pub type ClickHandler = Box<dyn FnMut(Coords)>;

/// Thin facade over a [`MapWidget`].
///
/// Everything except `initialize` and `on_click` is a no-op until the map
/// has been initialized.
pub struct MapAdapter<W> {
    widget: W,
    handle: Option<MapHandle>,
    click_handler: Option<ClickHandler>,
}

impl<W: MapWidget> MapAdapter<W> {
    pub const fn new(widget: W) -> Self {
        Self {
            widget,
            handle: None,
            click_handler: None,
        }
    }

    pub fn initialize(&mut self, center: Coords, zoom: u8) -> MapHandle {
        let handle = MapHandle {
            center,
            zoom: zoom.min(MAX_ZOOM),
        };
        self.widget.set_view(handle.center, handle.zoom, false);
        self.handle = Some(handle);
        debug!(lat = center.lat, lng = center.lng, zoom = handle.zoom, "map initialized");
        handle
    }

    pub const fn handle(&self) -> Option<MapHandle> {
        self.handle
    }

    pub const fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Replaces any previously registered handler.
    pub fn on_click(&mut self, handler: impl FnMut(Coords) + 'static) {
        self.click_handler = Some(Box::new(handler));
    }

    /// Called by the front-end when the widget reports a click.
    /// Returns `false` when nothing is listening.
    pub fn emit_click(&mut self, coords: Coords) -> bool {
        if !self.is_initialized() {
            return false;
        }
        match self.click_handler.as_mut() {
            Some(handler) => {
                handler(coords);
                true
            }
            None => false,
        }
    }

    pub fn place_marker(&mut self, id: &str, coords: Coords, popup_text: &str, style_class: &str) {
        if !self.is_initialized() {
            return;
        }
        self.widget.add_marker(Marker {
            id: id.to_string(),
            coords,
            popup: Popup::new(popup_text, style_class),
        });
    }

    pub fn remove_marker(&mut self, id: &str) {
        if self.is_initialized() {
            self.widget.remove_marker(id);
        }
    }

    pub fn clear_markers(&mut self) {
        if self.is_initialized() {
            self.widget.clear_markers();
        }
    }

    pub fn draw_accuracy_circle(&mut self, center: Coords, radius_m: f64) {
        if self.is_initialized() && radius_m.is_finite() && radius_m > 0.0 {
            self.widget.add_circle(center, radius_m);
        }
    }

    pub fn recenter(&mut self, coords: Coords, zoom: u8, animate: bool) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        handle.center = coords;
        handle.zoom = zoom.min(MAX_ZOOM);
        self.widget.set_view(coords, handle.zoom, animate);
    }

    pub const fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }
}

/// Widget that only remembers what it was asked to draw.
/// Used where there is no screen (the CLI) and in tests.
#[derive(Debug, Default, Clone)]
pub struct HeadlessMap {
    pub view: Option<(Coords, u8)>,
    pub markers: Vec<Marker>,
    pub circles: Vec<(Coords, f64)>,
    /// Every `set_view` call, including the animate flag.
    pub view_changes: Vec<(Coords, u8, bool)>,
}

impl MapWidget for HeadlessMap {
    fn set_view(&mut self, center: Coords, zoom: u8, animate: bool) {
        self.view = Some((center, zoom));
        self.view_changes.push((center, zoom, animate));
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn remove_marker(&mut self, id: &str) {
        self.markers.retain(|m| m.id != id);
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn add_circle(&mut self, center: Coords, radius_m: f64) {
        self.circles.push((center, radius_m));
    }
}
