use gpui::{
    AnyElement, App, Entity, FontWeight, InteractiveElement as _, IntoElement, MouseButton,
    MouseDownEvent, ObjectFit, ParentElement as _, SharedString, Styled as _, StyledImage as _,
    Window, div, img, prelude::FluentBuilder as _, px,
};
use gpui_block_core::{Block, BlockId, ListMarker, RenderStrategy, TextSize, TextStyle};
use gpui_component::{
    Sizable as _,
    button::{Button, ButtonVariants as _},
};
use gpui_dnd_list::DndListRowState;

use crate::BlockEditorTheme;
use crate::element::BlockTextElement;
use crate::state::{BlockEditorState, HANDLE_WIDTH};

/// Render one block row: drag handle, add button, the block surface and a remove button.
pub(crate) fn render_row(
    state: &Entity<BlockEditorState>,
    ix: usize,
    id: &BlockId,
    row_state: DndListRowState,
    _window: &mut Window,
    cx: &mut App,
) -> AnyElement {
    let (block, strategy, ordinal, focused, removable, theme) = {
        let this = state.read(cx);
        let Some(block) = this.document.get(id) else {
            return div().into_any_element();
        };
        (
            block.clone(),
            this.registry.render_strategy(block.kind),
            this.document.ordered_list_number(ix),
            this.session.is_focused(id),
            this.document.len() > 1,
            this.theme,
        )
    };

    let group: SharedString = format!("block-row-{ix}").into();
    let content = match strategy {
        RenderStrategy::Text(style) => {
            render_text_block(state, &block, style, ordinal, theme).into_any_element()
        }
        RenderStrategy::Image => render_image_block(state, &block, focused, theme, cx),
    };

    div()
        .id(("block-row", ix))
        .group(group.clone())
        .w_full()
        .flex()
        .flex_row()
        .items_start()
        .gap(px(2.))
        .py(px(2.))
        .child(
            // The list overlays its grab area on top of this icon.
            div()
                .w(px(HANDLE_WIDTH))
                .h(px(26.))
                .flex_none()
                .flex()
                .items_center()
                .justify_center()
                .text_color(theme.muted_foreground)
                .opacity(0.)
                .group_hover(group.clone(), |style| style.opacity(1.))
                .when(row_state.dragging, |this| this.opacity(1.))
                .text_sm()
                .child("⠿"),
        )
        .child(
            div()
                .id(("block-add", ix))
                .w(px(22.))
                .h(px(26.))
                .flex_none()
                .flex()
                .items_center()
                .justify_center()
                .rounded(px(4.))
                .cursor_pointer()
                .text_color(theme.muted_foreground)
                .opacity(0.)
                .group_hover(group.clone(), |style| style.opacity(1.))
                .hover(|style| style.bg(theme.highlight))
                .on_mouse_down(MouseButton::Left, {
                    let state = state.clone();
                    let id = id.clone();
                    move |event: &MouseDownEvent, window, cx| {
                        cx.stop_propagation();
                        state.update(cx, |this, cx| {
                            this.open_palette_for_insert(&id, event.position, window, cx);
                        });
                    }
                })
                .text_base()
                .child("+"),
        )
        .child(div().flex_1().min_w_0().child(content))
        .child(
            div()
                .w(px(26.))
                .flex_none()
                .opacity(0.)
                .group_hover(group, |style| style.opacity(1.))
                .when(removable, |this| {
                    let state = state.clone();
                    let id = id.clone();
                    this.child(
                        Button::new(("block-remove", ix))
                            .label("×")
                            .ghost()
                            .xsmall()
                            .on_click(move |_, _, cx| {
                                state.update(cx, |this, cx| this.remove_block(&id, cx));
                            }),
                    )
                }),
        )
        .into_any_element()
}

fn render_text_block(
    state: &Entity<BlockEditorState>,
    block: &Block,
    style: TextStyle,
    ordinal: Option<usize>,
    theme: BlockEditorTheme,
) -> impl IntoElement {
    let marker = style.marker.map(|marker| match marker {
        ListMarker::Bullet => "•".to_string(),
        ListMarker::Number => format!("{}.", ordinal.unwrap_or(1)),
    });

    let surface = div()
        .flex_1()
        .min_w_0()
        .py(px(2.))
        .map(|this| match style.size {
            TextSize::Body => this.text_base(),
            TextSize::Large => this.text_xl(),
            TextSize::XLarge => this.text_2xl(),
            TextSize::XXLarge => this.text_3xl(),
        })
        .when(style.bold, |this| this.font_weight(FontWeight::BOLD))
        .when(style.italic, |this| this.italic())
        .when(style.monospace, |this| this.font_family("monospace"))
        .when(style.leading_border, |this| {
            this.border_l_2().border_color(theme.quote_border).pl(px(10.))
        })
        .when(style.background, |this| {
            this.bg(theme.code_background).rounded(px(6.)).px(px(10.)).py(px(8.))
        })
        .child(BlockTextElement::new(state.clone(), block.id.clone()));

    div()
        .w_full()
        .flex()
        .flex_row()
        .items_start()
        .gap(px(6.))
        .pl(px(f32::from(style.indent) * 12.))
        .when_some(marker, |this, marker| {
            this.child(
                div()
                    .min_w(px(18.))
                    .py(px(2.))
                    .text_color(theme.muted_foreground)
                    .child(marker),
            )
        })
        .child(surface)
}

fn render_image_block(
    state: &Entity<BlockEditorState>,
    block: &Block,
    focused: bool,
    theme: BlockEditorTheme,
    cx: &mut App,
) -> AnyElement {
    let decoded = block
        .image_url
        .as_deref()
        .and_then(|url| state.read(cx).image_for(url));

    let picture = match (decoded, block.image_url.clone()) {
        (Some(image), _) => Some(
            img(image)
                .size_full()
                .object_fit(ObjectFit::Contain)
                .into_any_element(),
        ),
        (None, Some(url)) if !url.starts_with("data:") => Some(
            img(SharedString::from(url))
                .size_full()
                .object_fit(ObjectFit::Contain)
                .into_any_element(),
        ),
        _ => None,
    };

    let frame = div()
        .id(SharedString::from(format!("block-image-{}", block.id)))
        .w_full()
        .max_w(px(640.))
        .map(|mut this| {
            this.style().aspect_ratio = Some(16. / 9.);
            this
        })
        .flex()
        .items_center()
        .justify_center()
        .overflow_hidden()
        .rounded(px(6.))
        .bg(theme.code_background)
        .border_2()
        .border_color(if focused {
            theme.focus_ring
        } else {
            gpui::transparent_black()
        })
        .on_mouse_down(MouseButton::Left, {
            let state = state.clone();
            let id = block.id.clone();
            move |_, window, cx| {
                state.update(cx, |this, cx| this.focus_block(&id, 0, window, cx));
            }
        });

    match picture {
        Some(picture) => frame.child(picture).into_any_element(),
        None => {
            let state = state.clone();
            let id = block.id.clone();
            frame
                .child(
                    Button::new(SharedString::from(format!("block-choose-image-{}", block.id)))
                        .label("Choose image")
                        .small()
                        .on_click(move |_, window, cx| {
                            let id = id.clone();
                            state.update(cx, |this, cx| this.choose_image_for(id, window, cx));
                        }),
                )
                .into_any_element()
        }
    }
}
