mod handler;
mod ui;
mod widgets;

pub use handler::{handle_key_event, AppAction, InputMode};
pub use ui::draw;
