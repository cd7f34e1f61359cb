mod editor;
mod element;
mod palette;
mod row;
mod state;
mod theme;

pub use editor::*;
pub use state::*;
pub use theme::BlockEditorTheme;

use gpui::App;

pub fn init(cx: &mut App) {
    state::init(cx);
}
