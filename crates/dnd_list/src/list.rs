use std::{cell::RefCell, rc::Rc, time::Instant};

use gpui::{
    AnyElement, App, Bounds, Context, CursorStyle, ElementId, Entity, EventEmitter,
    InteractiveElement as _, IntoElement, MouseButton, MouseDownEvent, MouseMoveEvent,
    MouseUpEvent, ParentElement as _, Pixels, Point, Render, RenderOnce, SharedString,
    StyleRefinement, Styled, Task, Window, anchored, canvas, deferred, div,
    prelude::FluentBuilder as _, px,
};
use gpui_component::{ActiveTheme as _, StyledExt as _};

use crate::reorder::{drop_destination, row_at_position};
use crate::sensor::{DragActivation, DragSensor, SensorEvent};

/// Create a [`DndList`].
pub fn dnd_list<T, R>(state: &Entity<DndListState<T>>, render_item: R) -> DndList<T>
where
    T: 'static,
    R: Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> AnyElement + 'static,
{
    DndList::new(state, render_item)
}

/// A single item in a [`DndListState`].
#[derive(Clone)]
pub struct DndListItem<T> {
    pub id: SharedString,
    pub label: SharedString,
    pub data: T,
    disabled: bool,
}

impl<T> DndListItem<T> {
    pub fn new(id: impl Into<SharedString>, label: impl Into<SharedString>, data: T) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            disabled: false,
        }
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DndListDropTarget {
    Before,
    After,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DndListRowState {
    pub dragging: bool,
    pub drop_target: Option<DndListDropTarget>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DndListReorder {
    pub item_id: SharedString,
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DndListEvent {
    DragStarted(SharedString),
    /// Emitted after the list has applied the move to its own items.
    Reorder(DndListReorder),
    DragEnded,
}

struct ActiveDrag {
    item_id: SharedString,
    label: SharedString,
    pointer: Point<Pixels>,
    grab_offset: Point<Pixels>,
    /// Row under the pointer.
    hovered: Option<usize>,
}

struct PressedHandle {
    item_id: SharedString,
    origin: Point<Pixels>,
    grab_offset: Point<Pixels>,
}

type RenderItem<T> =
    Rc<dyn Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> AnyElement>;

/// State for a draggable, reorderable list.
///
/// Drags start from a handle on the left of each row and are driven by a [`DragSensor`], so
/// a plain click on the handle never moves anything.
pub struct DndListState<T> {
    items: Vec<DndListItem<T>>,
    sensor: DragSensor,
    pressed: Option<PressedHandle>,
    drag: Option<ActiveDrag>,
    hold_timer: Option<Task<()>>,
    row_bounds: Rc<RefCell<Vec<Bounds<Pixels>>>>,
    drag_handle_width: Option<Pixels>,
    render_item: RenderItem<T>,
}

impl<T: 'static> EventEmitter<DndListEvent> for DndListState<T> {}

impl<T: 'static> DndListState<T> {
    pub fn new(_cx: &mut App) -> Self {
        Self {
            items: Vec::new(),
            sensor: DragSensor::default(),
            pressed: None,
            drag: None,
            hold_timer: None,
            row_bounds: Rc::new(RefCell::new(Vec::new())),
            drag_handle_width: Some(px(32.)),
            render_item: Rc::new(|_, _, _, _, _| div().into_any_element()),
        }
    }

    pub fn items(mut self, items: impl Into<Vec<DndListItem<T>>>) -> Self {
        self.items = items.into();
        self
    }

    pub fn activation(mut self, activation: DragActivation) -> Self {
        self.sensor.set_activation(activation);
        self
    }

    /// Restrict drag start to a left-side handle area with the given width.
    pub fn drag_handle_width(mut self, width: Pixels) -> Self {
        self.drag_handle_width = Some(width);
        self
    }

    /// Allow dragging from anywhere on the row.
    pub fn drag_on_row(mut self) -> Self {
        self.drag_handle_width = None;
        self
    }

    pub fn set_activation(&mut self, activation: DragActivation) {
        self.sensor.set_activation(activation);
    }

    pub fn items_ref(&self) -> &[DndListItem<T>] {
        &self.items
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn dragged_id(&self) -> Option<&SharedString> {
        self.drag.as_ref().map(|drag| &drag.item_id)
    }

    /// Replace all items and drop any gesture in progress.
    pub fn set_items(&mut self, items: impl Into<Vec<DndListItem<T>>>, cx: &mut Context<Self>) {
        self.items = items.into();
        self.cancel_gesture();
        cx.notify();
    }

    /// Replace the items, keeping a gesture alive when the item it started on is still there.
    pub fn sync_items(&mut self, items: impl Into<Vec<DndListItem<T>>>, cx: &mut Context<Self>) {
        self.items = items.into();
        let gesture_item = self
            .drag
            .as_ref()
            .map(|drag| &drag.item_id)
            .or(self.pressed.as_ref().map(|pressed| &pressed.item_id));
        if let Some(item_id) = gesture_item {
            if !self.items.iter().any(|item| &item.id == item_id) {
                tracing::debug!(%item_id, "dragged item went away, cancelling drag");
                self.cancel_gesture();
            }
        }
        cx.notify();
    }

    fn cancel_gesture(&mut self) {
        self.sensor.cancel();
        self.pressed = None;
        self.drag = None;
        self.hold_timer = None;
    }

    fn on_press(&mut self, ix: usize, position: Point<Pixels>, cx: &mut Context<Self>) {
        let Some(item) = self.items.get(ix) else {
            return;
        };
        if item.is_disabled() {
            return;
        }
        let origin = self
            .row_bounds
            .borrow()
            .get(ix)
            .map(|bounds| bounds.origin)
            .unwrap_or(position);
        self.pressed = Some(PressedHandle {
            item_id: item.id.clone(),
            origin: position,
            grab_offset: position - origin,
        });
        self.sensor.press(ix, position, Instant::now());
        self.hold_timer = self.sensor.activation().hold_delay.map(|delay| {
            cx.spawn(async move |this, cx| {
                cx.background_executor().timer(delay).await;
                this.update(cx, |this, cx| this.on_hold_elapsed(cx)).ok();
            })
        });
        cx.notify();
    }

    fn on_hold_elapsed(&mut self, cx: &mut Context<Self>) {
        if let SensorEvent::Activated { ix } = self.sensor.tick(Instant::now()) {
            let Some(origin) = self.pressed.as_ref().map(|pressed| pressed.origin) else {
                self.sensor.cancel();
                return;
            };
            self.start_drag(ix, origin, cx);
            cx.notify();
        }
    }

    fn start_drag(&mut self, ix: usize, position: Point<Pixels>, cx: &mut Context<Self>) {
        let Some(pressed) = self.pressed.take() else {
            self.sensor.cancel();
            return;
        };
        let label = self
            .items
            .get(ix)
            .map(|item| item.label.clone())
            .unwrap_or_default();
        self.drag = Some(ActiveDrag {
            item_id: pressed.item_id.clone(),
            label,
            pointer: position,
            grab_offset: pressed.grab_offset,
            hovered: row_at_position(&self.row_bounds.borrow(), position),
        });
        cx.emit(DndListEvent::DragStarted(pressed.item_id));
    }

    fn on_pointer_move(&mut self, position: Point<Pixels>, cx: &mut Context<Self>) {
        match self.sensor.move_to(position, Instant::now()) {
            SensorEvent::Ignored | SensorEvent::Pending => return,
            SensorEvent::Activated { ix } => {
                self.hold_timer = None;
                self.start_drag(ix, position, cx);
            }
            SensorEvent::Moved => {}
        }

        if let Some(drag) = self.drag.as_mut() {
            drag.pointer = position;
            drag.hovered = row_at_position(&self.row_bounds.borrow(), position);
        }
        cx.notify();
    }

    fn from_index(&self, drag: &ActiveDrag) -> Option<usize> {
        self.items.iter().position(|item| item.id == drag.item_id)
    }

    fn destination(&self, drag: &ActiveDrag) -> Option<usize> {
        let from = self.from_index(drag)?;
        let rows = self.row_bounds.borrow();
        let rows = &rows[..rows.len().min(self.items.len())];
        drop_destination(rows, from, drag.pointer)
    }

    fn on_pointer_up(&mut self, cx: &mut Context<Self>) {
        self.sensor.release();
        self.pressed = None;
        self.hold_timer = None;
        let drag = self.drag.take();
        cx.notify();

        let Some(drag) = drag else {
            return;
        };
        cx.emit(DndListEvent::DragEnded);

        let (Some(from), Some(to)) = (self.from_index(&drag), self.destination(&drag)) else {
            return;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        cx.emit(DndListEvent::Reorder(DndListReorder {
            item_id: drag.item_id,
            from,
            to,
        }));
    }

    fn drop_target_for(&self, ix: usize) -> Option<DndListDropTarget> {
        let drag = self.drag.as_ref()?;
        if drag.hovered != Some(ix) {
            return None;
        }
        let from = self.from_index(drag)?;
        drop_target_side(from, ix)
    }
}

impl<T: 'static> Render for DndListState<T> {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let render_item = Rc::clone(&self.render_item);
        let state = cx.entity();
        let drag_handle_width = self.drag_handle_width;
        let drag_border = cx.theme().drag_border;
        let gesture_active = !self.sensor.is_idle();
        self.row_bounds.borrow_mut().truncate(self.items.len());

        let mut rows = Vec::with_capacity(self.items.len());
        for (ix, item) in self.items.iter().enumerate() {
            let dragging = self.dragged_id().is_some_and(|id| *id == item.id);
            let row_state = DndListRowState {
                dragging,
                drop_target: self.drop_target_for(ix),
            };
            let element = (render_item)(ix, item, row_state, window, cx);
            let row_bounds = self.row_bounds.clone();
            let is_disabled = item.is_disabled();

            let row = div()
                .id(("dnd-list-row", ix))
                .relative()
                .child(
                    canvas(
                        move |bounds, _, _| {
                            let mut rows = row_bounds.borrow_mut();
                            if rows.len() <= ix {
                                rows.resize(ix + 1, Bounds::default());
                            }
                            rows[ix] = bounds;
                        },
                        |_, _, _, _| {},
                    )
                    .absolute()
                    .size_full(),
                )
                .child(element)
                .when(dragging, |this| this.opacity(0.4))
                .when(
                    row_state.drop_target == Some(DndListDropTarget::Before),
                    |this| this.border_t_2().border_color(drag_border),
                )
                .when(
                    row_state.drop_target == Some(DndListDropTarget::After),
                    |this| this.border_b_2().border_color(drag_border),
                )
                .when(!is_disabled, |this| {
                    let on_press = cx.listener(move |this, event: &MouseDownEvent, _, cx| {
                        cx.stop_propagation();
                        this.on_press(ix, event.position, cx);
                    });
                    match drag_handle_width {
                        Some(handle_width) => this.child(
                            div()
                                .id(("dnd-list-handle", ix))
                                .absolute()
                                .top_0()
                                .left_0()
                                .bottom_0()
                                .w(handle_width)
                                .cursor(CursorStyle::OpenHand)
                                .on_mouse_down(MouseButton::Left, on_press),
                        ),
                        None => this.on_mouse_down(MouseButton::Left, on_press),
                    }
                });

            rows.push(row);
        }

        let ghost = self.drag.as_ref().map(|drag| {
            let theme = cx.theme();
            deferred(
                anchored().position(drag.pointer - drag.grab_offset).child(
                    div()
                        .px(px(10.))
                        .py(px(6.))
                        .rounded(px(8.))
                        .bg(theme.popover)
                        .border_1()
                        .border_color(theme.border)
                        .shadow_md()
                        .text_color(theme.popover_foreground)
                        .text_sm()
                        .max_w(px(360.))
                        .overflow_hidden()
                        .child(drag.label.clone()),
                ),
            )
            .with_priority(2)
        });

        div()
            .id("dnd-list-state")
            .w_full()
            .flex()
            .flex_col()
            .children(rows)
            .children(ghost)
            .when(gesture_active, |this| {
                // Pointer listeners live only while a handle is pressed.
                this.child(
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
                                        this.on_pointer_move(event.position, cx);
                                    });
                                }
                            });
                            window.on_mouse_event({
                                let state = state.clone();
                                move |event: &MouseUpEvent, phase, _, cx| {
                                    if !phase.bubble() || event.button != MouseButton::Left {
                                        return;
                                    }
                                    state.update(cx, |this, cx| this.on_pointer_up(cx));
                                }
                            });
                        },
                    )
                    .absolute()
                    .size_0(),
                )
            })
            .when(self.drag.is_some(), |this| this.cursor(CursorStyle::ClosedHand))
    }
}

/// A draggable list element that supports drag-and-drop reordering.
#[derive(IntoElement)]
pub struct DndList<T: 'static> {
    id: ElementId,
    state: Entity<DndListState<T>>,
    style: StyleRefinement,
    render_item: RenderItem<T>,
}

impl<T: 'static> DndList<T> {
    pub fn new<R>(state: &Entity<DndListState<T>>, render_item: R) -> Self
    where
        R: Fn(usize, &DndListItem<T>, DndListRowState, &mut Window, &mut App) -> AnyElement
            + 'static,
    {
        Self {
            id: ElementId::Name(format!("dnd-list-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl<T: 'static> Styled for DndList<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: 'static> RenderOnce for DndList<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .w_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}

/// Which edge of the hovered row gets the insertion line.
fn drop_target_side(from: usize, hovered: usize) -> Option<DndListDropTarget> {
    match hovered.cmp(&from) {
        std::cmp::Ordering::Less => Some(DndListDropTarget::Before),
        std::cmp::Ordering::Greater => Some(DndListDropTarget::After),
        std::cmp::Ordering::Equal => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_line_sits_on_the_side_the_row_moves_to() {
        assert_eq!(drop_target_side(2, 0), Some(DndListDropTarget::Before));
        assert_eq!(drop_target_side(0, 2), Some(DndListDropTarget::After));
        assert_eq!(drop_target_side(1, 1), None);
    }

    fn ids(items: &[DndListItem<&'static str>]) -> Vec<String> {
        items.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn disabled_items_keep_their_data() {
        let item = DndListItem::new("A", "Alpha", "payload").disabled(true);
        assert!(item.is_disabled());
        assert_eq!(item.data, "payload");
        assert_eq!(ids(&[item]), vec!["A".to_string()]);
    }
}
