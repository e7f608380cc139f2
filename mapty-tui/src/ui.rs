// mapty-tui/src/ui.rs
mod form;
mod layout;
mod list_pane;
mod map_pane;
mod modals;
mod status_bar;

pub use layout::render_ui;
