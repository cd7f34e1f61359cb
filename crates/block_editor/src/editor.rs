use gpui::{App, Entity, IntoElement, RenderOnce, Window};

use crate::BlockEditorState;

/// A block editor element bound to a [`BlockEditorState`].
#[derive(IntoElement)]
pub struct BlockEditor {
    state: Entity<BlockEditorState>,
}

impl BlockEditor {
    pub fn new(state: &Entity<BlockEditorState>) -> Self {
        Self {
            state: state.clone(),
        }
    }
}

impl RenderOnce for BlockEditor {
    fn render(self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        self.state
    }
}
