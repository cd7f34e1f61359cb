use gpui::{Hsla, Pixels, hsla, px};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockEditorTheme {
    pub background: Hsla,
    pub border: Hsla,
    pub radius: Pixels,
    pub foreground: Hsla,
    pub muted_foreground: Hsla,
    pub caret: Hsla,
    pub focus_ring: Hsla,
    pub code_background: Hsla,
    pub quote_border: Hsla,
    pub highlight: Hsla,
}

impl Default for BlockEditorTheme {
    fn default() -> Self {
        Self {
            background: hsla(0., 0., 1., 1.),
            border: hsla(0., 0., 0.88, 1.),
            radius: px(8.),
            foreground: hsla(0., 0., 0.12, 1.),
            muted_foreground: hsla(0., 0., 0.42, 1.),
            caret: hsla(0., 0., 0.12, 1.),
            focus_ring: hsla(0.58, 1.0, 0.5, 0.6),
            code_background: hsla(0., 0., 0.94, 1.),
            quote_border: hsla(0., 0., 0.75, 1.),
            highlight: hsla(0.58, 1.0, 0.5, 0.12),
        }
    }
}
