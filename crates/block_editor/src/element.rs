use gpui::{
    App, Bounds, CursorStyle, Element, ElementId, Entity, GlobalElementId, Hitbox, HitboxBehavior,
    InspectorElementId, IntoElement, LayoutId, MouseButton, MouseDownEvent, Pixels, SharedString,
    StyledText, UnderlineStyle, Window, point, px,
};
use gpui_block_core::BlockId;

use crate::state::{BlockEditorState, LineLayoutCache};

/// The editable text surface of one block.
///
/// Lays out the block's content, records the layout for caret placement and IME queries,
/// and paints the caret when the block holds focus.
pub(crate) struct BlockTextElement {
    state: Entity<BlockEditorState>,
    id: BlockId,
    styled_text: StyledText,
    text: SharedString,
}

impl BlockTextElement {
    pub(crate) fn new(state: Entity<BlockEditorState>, id: BlockId) -> Self {
        Self {
            state,
            id,
            styled_text: StyledText::new(SharedString::default()),
            text: SharedString::default(),
        }
    }
}

impl IntoElement for BlockTextElement {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for BlockTextElement {
    type RequestLayoutState = ();
    type PrepaintState = Hitbox;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static std::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        global_element_id: Option<&GlobalElementId>,
        inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let (text, placeholder, marked_range, muted) = {
            let state = self.state.read(cx);
            let Some(block) = state.document.get(&self.id) else {
                return (window.request_layout(gpui::Style::default(), [], cx), ());
            };
            let focused = state.session.is_focused(&self.id);
            let placeholder = (focused && block.content.is_empty())
                .then(|| state.config.placeholder.clone())
                .filter(|placeholder| !placeholder.is_empty());
            let marked = focused.then(|| state.ime_marked_range.clone()).flatten();
            (
                SharedString::from(block.content.clone()),
                placeholder,
                marked,
                state.theme.muted_foreground,
            )
        };

        self.text = text.clone();
        let style = window.text_style();

        let (render_text, runs): (SharedString, _) = if let Some(placeholder) = placeholder {
            let mut placeholder_style = style.clone();
            placeholder_style.color = muted;
            let len = placeholder.len();
            (placeholder.into(), vec![placeholder_style.to_run(len)])
        } else if text.is_empty() {
            (" ".into(), vec![style.to_run(1)])
        } else {
            let len = text.len();
            let marked_range = marked_range
                .map(|r| r.start.min(len)..r.end.min(len))
                .filter(|r| r.start < r.end);

            let mut runs = Vec::new();
            match marked_range {
                Some(marked) => {
                    if marked.start > 0 {
                        runs.push(style.clone().to_run(marked.start));
                    }
                    let mut marked_style = style.clone();
                    marked_style.underline = Some(UnderlineStyle {
                        thickness: px(1.),
                        color: Some(style.color),
                        wavy: false,
                    });
                    runs.push(marked_style.to_run(marked.len()));
                    if marked.end < len {
                        runs.push(style.to_run(len - marked.end));
                    }
                }
                None => runs.push(style.to_run(len)),
            }
            (text, runs)
        };

        self.styled_text = StyledText::new(render_text).with_runs(runs);
        let (layout_id, _) =
            self.styled_text
                .request_layout(global_element_id, inspector_id, window, cx);
        (layout_id, ())
    }

    fn prepaint(
        &mut self,
        id: Option<&GlobalElementId>,
        inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        self.styled_text
            .prepaint(id, inspector_id, bounds, &mut (), window, cx);

        let text_layout = self.styled_text.layout().clone();
        let block_id = self.id.clone();
        let text = self.text.clone();
        self.state.update(cx, |state, _| {
            state.layout_cache.insert(
                block_id,
                LineLayoutCache {
                    bounds,
                    text_layout,
                    text,
                },
            );
        });

        window.insert_hitbox(bounds, HitboxBehavior::Normal)
    }

    fn paint(
        &mut self,
        global_id: Option<&GlobalElementId>,
        _: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let hitbox = prepaint.clone();
        window.set_cursor_style(CursorStyle::IBeam, &hitbox);

        self.styled_text
            .paint(global_id, None, bounds, &mut (), &mut (), window, cx);

        let (cursor, caret_color) = {
            let state = self.state.read(cx);
            let visible =
                state.focus_handle.is_focused(window) && !state.session.palette.is_open();
            (
                state
                    .session
                    .focused()
                    .filter(|focused| visible && focused.id == self.id)
                    .map(|focused| focused.cursor),
                state.theme.caret,
            )
        };

        let layout = self.styled_text.layout().clone();
        if let Some(cursor) = cursor {
            let line_height = layout.line_height();
            if let Some(pos) = layout
                .position_for_index(cursor)
                .or_else(|| layout.position_for_index(layout.len()))
            {
                window.paint_quad(gpui::quad(
                    Bounds::from_corners(pos, point(pos.x + px(1.5), pos.y + line_height)),
                    px(0.),
                    caret_color,
                    gpui::Edges::default(),
                    gpui::transparent_black(),
                    gpui::BorderStyle::default(),
                ));
            }
        }

        // Mouse down focuses the block and places the caret at the clicked character.
        let showing_content = !self.text.is_empty();
        window.on_mouse_event({
            let state = self.state.clone();
            let id = self.id.clone();
            move |event: &MouseDownEvent, phase, window, cx| {
                if !phase.bubble() || event.button != MouseButton::Left {
                    return;
                }
                if !hitbox.is_hovered(window) {
                    return;
                }
                if state.read(cx).session.palette.is_dragging() {
                    return;
                }

                let offset = if showing_content {
                    match layout.index_for_position(event.position) {
                        Ok(ix) | Err(ix) => ix,
                    }
                } else {
                    0
                };
                state.update(cx, |this, cx| this.focus_block(&id, offset, window, cx));
            }
        });
    }
}
