use gpui::{
    AnyElement, Context, CursorStyle, Entity, InteractiveElement as _, IntoElement, MouseButton,
    MouseDownEvent, MouseMoveEvent, MouseUpEvent, ParentElement as _, SharedString,
    StatefulInteractiveElement as _, Styled as _, Window, anchored, canvas, deferred, div,
    prelude::FluentBuilder as _, px,
};
use gpui_block_core::{PaletteIcon, PaletteMode};
use gpui_component::ActiveTheme as _;

use crate::state::{BlockEditorState, from_palette_point, to_palette_point};

fn icon_glyph(icon: PaletteIcon) -> &'static str {
    match icon {
        PaletteIcon::Text => "T",
        PaletteIcon::Heading => "H",
        PaletteIcon::BulletedList => "•",
        PaletteIcon::NumberedList => "1.",
        PaletteIcon::Quote => "❝",
        PaletteIcon::Code => "</>",
        PaletteIcon::Image => "▣",
    }
}

impl BlockEditorState {
    pub(crate) fn render_palette(
        &self,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Option<AnyElement> {
        let open = self.session.palette.as_open()?;
        let entries = self.session.palette.entries(&self.registry);
        let title = match open.mode {
            PaletteMode::Transform(_) => "Turn into",
            PaletteMode::Insert(_) => "Insert block",
        };
        let query: SharedString = if open.query.is_empty() {
            "Type to filter".into()
        } else {
            open.query.clone().into()
        };
        let highlighted = open.highlighted;
        let theme = cx.theme();

        let header = div()
            .id("block-palette-header")
            .px(px(10.))
            .py(px(6.))
            .flex()
            .flex_row()
            .justify_between()
            .items_center()
            .border_b_1()
            .border_color(theme.border)
            .cursor(if self.session.palette.is_dragging() {
                CursorStyle::ClosedHand
            } else {
                CursorStyle::OpenHand
            })
            .text_xs()
            .text_color(theme.muted_foreground)
            .child(title)
            .child(div().italic().child(query))
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, event: &MouseDownEvent, _, cx| {
                    cx.stop_propagation();
                    if this.session.palette.begin_drag(to_palette_point(event.position)) {
                        cx.notify();
                    }
                }),
            );

        let items = entries.iter().enumerate().map(|(ix, spec)| {
            let kind = spec.kind;
            div()
                .id(("block-palette-entry", ix))
                .px(px(10.))
                .py(px(6.))
                .flex()
                .flex_row()
                .items_center()
                .gap(px(10.))
                .cursor_pointer()
                .when(ix == highlighted, |this| this.bg(theme.accent))
                .child(
                    div()
                        .w(px(28.))
                        .h(px(28.))
                        .flex_none()
                        .flex()
                        .items_center()
                        .justify_center()
                        .rounded(px(4.))
                        .border_1()
                        .border_color(theme.border)
                        .text_xs()
                        .text_color(theme.muted_foreground)
                        .child(icon_glyph(spec.icon)),
                )
                .child(
                    div()
                        .flex()
                        .flex_col()
                        .child(div().text_sm().child(spec.label.clone()))
                        .when_some(spec.description.clone(), |this, description| {
                            this.child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(description),
                            )
                        }),
                )
                .on_mouse_move(cx.listener(move |this, _: &MouseMoveEvent, _, cx| {
                    if this.session.palette.highlighted() != Some(ix) {
                        this.session.palette.set_highlighted(ix);
                        cx.notify();
                    }
                }))
                .on_click(cx.listener(move |this, _, window, cx| {
                    this.select_kind(kind, window, cx);
                }))
        });

        let panel = div()
            .id("block-palette")
            .occlude()
            .w(px(self.config.palette_width))
            .max_h(px(360.))
            .overflow_y_scroll()
            .flex()
            .flex_col()
            .bg(theme.popover)
            .text_color(theme.popover_foreground)
            .border_1()
            .border_color(theme.border)
            .rounded(px(8.))
            .shadow_lg()
            .on_mouse_down_out(cx.listener(|this, _: &MouseDownEvent, _, cx| {
                if this.session.palette.dismiss_outside() {
                    cx.notify();
                }
            }))
            .child(header)
            .children(items)
            .when(entries.is_empty(), |this| {
                this.child(
                    div()
                        .px(px(10.))
                        .py(px(8.))
                        .text_sm()
                        .text_color(theme.muted_foreground)
                        .child("No matching blocks"),
                )
            });

        Some(
            deferred(
                anchored()
                    .position(from_palette_point(open.position))
                    .child(panel),
            )
            .with_priority(1)
            .into_any_element(),
        )
    }
}

/// Window-level pointer listeners for moving the palette. Only mounted while it is grabbed.
pub(crate) fn palette_drag_listeners(state: Entity<BlockEditorState>) -> impl IntoElement {
    canvas(
        |_, _, _| {},
        move |_, _, window, _| {
            window.on_mouse_event({
                let state = state.clone();
                move |event: &MouseMoveEvent, phase, _, cx| {
                    if !phase.bubble() {
                        return;
                    }
                    state.update(cx, |this, cx| {
                        if this.session.palette.drag_to(to_palette_point(event.position)) {
                            cx.notify();
                        }
                    });
                }
            });
            window.on_mouse_event({
                let state = state.clone();
                move |event: &MouseUpEvent, phase, _, cx| {
                    if !phase.bubble() || event.button != MouseButton::Left {
                        return;
                    }
                    state.update(cx, |this, cx| {
                        if this.session.palette.end_drag() {
                            cx.notify();
                        }
                    });
                }
            });
        },
    )
    .absolute()
    .size_0()
}
