// mapty-tui/src/app.rs
mod actions;
mod input;
pub mod map_widget;
pub mod state;
pub mod view;

pub use map_widget::CanvasMap;
pub use state::{ActiveModal, App, Focus};
pub use view::{FormField, TuiView};
