use std::{collections::HashMap, ops::Range, path::Path, path::PathBuf, sync::Arc};

use gpui::{
    Action, App, AppContext as _, Bounds, Context, ElementInputHandler, Entity,
    EntityInputHandler, EventEmitter, FocusHandle, Image, ImageFormat, InteractiveElement as _,
    IntoElement, KeyBinding, ParentElement as _, PathPromptOptions, Pixels, Point, Render,
    SharedString, Styled as _, Subscription, UTF16Selection,
    Window, actions, canvas, div, point, prelude::FluentBuilder as _, px,
};
use gpui_block_core::{
    Block, BlockId, BlockKind, BlockRegistry, Change, ChangeKind, Controller, Document,
    DocumentError, EditorConfig, FocusedBlock, ImageError, ImageInsertion, KeyInput, KeyOutcome,
    PaletteMode, PalettePoint, SelectionOutcome, Session, clamp_to_char_boundary,
    decode_data_url, read_image_data_url,
};
use gpui_component::{
    Sizable as _,
    button::{Button, ButtonVariants as _},
};
use gpui_dnd_list::{DndListEvent, DndListItem, DndListState, DragActivation, dnd_list};
use serde::Deserialize;

use crate::BlockEditorTheme;
use crate::palette::palette_drag_listeners;
use crate::row::render_row;

pub(crate) const CONTEXT: &str = "BlockEditor";

/// Width of the grab area on the left of every row.
pub(crate) const HANDLE_WIDTH: f32 = 22.;

#[derive(Action, Clone, PartialEq, Eq, Deserialize)]
#[action(namespace = block_editor, no_json)]
pub struct Enter {
    pub shift: bool,
}

actions!(
    block_editor,
    [
        Backspace, Delete, Tab, Escape, MoveLeft, MoveRight, MoveUp, MoveDown, MoveHome, MoveEnd,
        Undo, Redo,
    ]
);

pub(crate) fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("backspace", Backspace, Some(CONTEXT)),
        KeyBinding::new("delete", Delete, Some(CONTEXT)),
        KeyBinding::new("enter", Enter { shift: false }, Some(CONTEXT)),
        KeyBinding::new("shift-enter", Enter { shift: true }, Some(CONTEXT)),
        KeyBinding::new("tab", Tab, Some(CONTEXT)),
        KeyBinding::new("escape", Escape, Some(CONTEXT)),
        KeyBinding::new("left", MoveLeft, Some(CONTEXT)),
        KeyBinding::new("right", MoveRight, Some(CONTEXT)),
        KeyBinding::new("up", MoveUp, Some(CONTEXT)),
        KeyBinding::new("down", MoveDown, Some(CONTEXT)),
        KeyBinding::new("home", MoveHome, Some(CONTEXT)),
        KeyBinding::new("end", MoveEnd, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-left", MoveHome, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-right", MoveEnd, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-z", Undo, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-z", Undo, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-shift-z", Redo, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-shift-z", Redo, Some(CONTEXT)),
    ]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockEditorEvent {
    /// The editor produced a new block list. The owner keeps it and records history.
    Change(Change),
    UndoRequested,
    RedoRequested,
}

#[derive(Clone)]
pub(crate) struct LineLayoutCache {
    pub(crate) bounds: Bounds<Pixels>,
    pub(crate) text_layout: gpui::TextLayout,
    pub(crate) text: SharedString,
}

/// A controlled block editor.
///
/// The owner hands in a snapshot with [`BlockEditorState::set_blocks`] and receives every
/// edit as a [`BlockEditorEvent::Change`] carrying the complete new list. The state only
/// keeps focus, caret, palette and layout data of its own.
pub struct BlockEditorState {
    pub(crate) focus_handle: FocusHandle,
    pub(crate) theme: BlockEditorTheme,
    pub(crate) config: EditorConfig,
    pub(crate) registry: BlockRegistry,

    pub(crate) document: Document,
    pub(crate) session: Session,
    /// Composition range of the input method, in UTF-8 bytes of the focused block.
    pub(crate) ime_marked_range: Option<Range<usize>>,

    list: Entity<DndListState<BlockId>>,
    list_dirty: bool,
    pub(crate) layout_cache: HashMap<BlockId, LineLayoutCache>,
    images: HashMap<String, Arc<Image>>,
    _subscriptions: Vec<Subscription>,
}

impl EventEmitter<BlockEditorEvent> for BlockEditorState {}

impl BlockEditorState {
    pub fn new(_window: &mut Window, cx: &mut Context<Self>) -> Self {
        let focus_handle = cx.focus_handle().tab_stop(true);
        let list = cx.new(|cx| DndListState::new(cx).drag_handle_width(px(HANDLE_WIDTH)));
        let subscriptions = vec![cx.subscribe(&list, |this, _, event: &DndListEvent, cx| {
            this.on_list_event(event, cx)
        })];

        Self {
            focus_handle,
            theme: BlockEditorTheme::default(),
            config: EditorConfig::default(),
            registry: BlockRegistry::standard(),
            document: Document::default(),
            session: Session::default(),
            ime_marked_range: None,
            list,
            list_dirty: true,
            layout_cache: HashMap::new(),
            images: HashMap::new(),
            _subscriptions: subscriptions,
        }
    }

    pub fn registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self.list_dirty = true;
        self
    }

    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config.with_defaults();
        self.list_dirty = true;
        self
    }

    pub fn theme(mut self, theme: BlockEditorTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Initial blocks. An invalid list (duplicate ids) is replaced by one empty paragraph.
    pub fn default_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.document = Document::new(blocks).unwrap_or_else(|err| {
            tracing::warn!("ignoring default blocks: {err}");
            Document::default()
        });
        self.list_dirty = true;
        self
    }

    pub fn focus_handle(&self) -> FocusHandle {
        self.focus_handle.clone()
    }

    pub fn blocks(&self) -> &[Block] {
        self.document.blocks()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn focused_block(&self) -> Option<&FocusedBlock> {
        self.session.focused()
    }

    pub fn is_palette_open(&self) -> bool {
        self.session.palette.is_open()
    }

    /// Replace the snapshot. Equal lists are ignored so an owner can echo every change back.
    pub fn set_blocks(
        &mut self,
        blocks: Vec<Block>,
        cx: &mut Context<Self>,
    ) -> Result<(), DocumentError> {
        if self.document.blocks() == blocks.as_slice() {
            return Ok(());
        }
        self.document = Document::new(blocks)?;
        self.session.reconcile(&self.document);
        self.ime_marked_range = None;
        self.sync_list(cx);
        cx.notify();
        Ok(())
    }

    /// Focus a block and put the caret at `caret` (clamped to its text).
    pub fn focus_block(
        &mut self,
        id: &BlockId,
        caret: usize,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(block) = self.document.get(id) else {
            return;
        };
        let caret = clamp_to_char_boundary(&block.content, caret);
        self.session.focus(id.clone(), caret);
        self.ime_marked_range = None;
        window.focus(&self.focus_handle);
        cx.notify();
    }

    /// Open the palette to insert a new block after `id`, anchored at `position`.
    pub fn open_palette_for_insert(
        &mut self,
        id: &BlockId,
        position: Point<Pixels>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.session.palette.close();
        let opened = self
            .session
            .palette
            .open(PaletteMode::Insert(id.clone()), to_palette_point(position));
        window.focus(&self.focus_handle);
        cx.notify();
        opened
    }

    /// Read an image file and insert it as a new block after `after`.
    pub fn insert_image_from_path(
        &mut self,
        path: &Path,
        after: &BlockId,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Result<BlockId, ImageError> {
        let insertion = ImageInsertion::capture(&self.document, after);
        let url = read_image_data_url(path)?;
        Ok(self.complete_image_insertion(&insertion, url, window, cx))
    }

    fn on_list_event(&mut self, event: &DndListEvent, cx: &mut Context<Self>) {
        match event {
            DndListEvent::DragStarted(_) => {
                if self.session.palette.close() {
                    cx.notify();
                }
            }
            DndListEvent::Reorder(reorder) => {
                let from = self
                    .document
                    .index_of(&BlockId::from(reorder.item_id.as_str()))
                    .unwrap_or(reorder.from);
                let change = Controller::new(&self.registry).reorder(&self.document, from, reorder.to);
                if let Some(change) = change {
                    self.apply_change(change, cx);
                }
            }
            DndListEvent::DragEnded => {}
        }
    }

    /// Take a new list as the local snapshot and hand it to the owner.
    fn apply_change(&mut self, change: Change, cx: &mut Context<Self>) {
        match Document::new(change.blocks.clone()) {
            Ok(document) => self.document = document,
            Err(err) => {
                tracing::warn!("dropping invalid change: {err}");
                return;
            }
        }
        self.session.reconcile(&self.document);
        self.sync_list(cx);
        cx.emit(BlockEditorEvent::Change(change));
        cx.notify();
    }

    fn sync_list(&mut self, cx: &mut Context<Self>) {
        let items = self.list_items();
        self.list.update(cx, |list, cx| list.sync_items(items, cx));
    }

    fn list_items(&self) -> Vec<DndListItem<BlockId>> {
        self.document
            .blocks()
            .iter()
            .map(|block| {
                DndListItem::new(
                    block.id.to_string(),
                    row_label(block, &self.registry),
                    block.id.clone(),
                )
            })
            .collect()
    }

    fn activation(&self) -> DragActivation {
        let activation = DragActivation::distance(px(self.config.activation_distance));
        match self.config.hold_delay() {
            Some(delay) => activation.hold_delay(delay, px(self.config.hold_tolerance)),
            None => activation,
        }
    }

    fn dispatch_key(&mut self, key: KeyInput, window: &mut Window, cx: &mut Context<Self>) {
        let anchor = self.caret_anchor();
        let outcome =
            Controller::new(&self.registry).handle_key(&self.document, &mut self.session, key, anchor);
        let handled = outcome.handled;
        self.finish(outcome, window, cx);
        if !handled {
            cx.propagate();
        }
    }

    fn finish(&mut self, outcome: KeyOutcome, window: &mut Window, cx: &mut Context<Self>) {
        if let Some(selection) = outcome.selection {
            if let PaletteMode::Insert(after) = selection.mode {
                self.pick_image(after, window, cx);
            }
        }
        match outcome.change {
            Some(change) => self.apply_change(change, cx),
            None if outcome.handled => cx.notify(),
            None => {}
        }
    }

    /// Where the palette opens for the focused block: just below the caret.
    fn caret_anchor(&self) -> PalettePoint {
        let Some(focused) = self.session.focused() else {
            return PalettePoint::default();
        };
        let Some(cache) = self.layout_cache.get(&focused.id) else {
            return PalettePoint::default();
        };
        let line_height = cache.text_layout.line_height();
        let caret = cache
            .text_layout
            .position_for_index(focused.cursor)
            .unwrap_or(cache.bounds.origin);
        to_palette_point(point(caret.x, caret.y + line_height))
    }

    pub(crate) fn select_kind(
        &mut self,
        kind: BlockKind,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(selection) = self.session.palette.select(kind) else {
            return;
        };
        let outcome = Controller::new(&self.registry).apply_selection(
            &self.document,
            &mut self.session,
            selection,
        );
        match outcome {
            SelectionOutcome::Changed(change) => self.apply_change(change, cx),
            SelectionOutcome::Unchanged => cx.notify(),
            SelectionOutcome::PickImage { after } => self.pick_image(after, window, cx),
        }
        window.focus(&self.focus_handle);
    }

    pub(crate) fn remove_block(&mut self, id: &BlockId, cx: &mut Context<Self>) {
        let change =
            Controller::new(&self.registry).remove_block(&self.document, &mut self.session, id);
        match change {
            Some(change) => self.apply_change(change, cx),
            None => tracing::debug!(block = %id, "kept the only block"),
        }
    }

    fn append_paragraph(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let change =
            Controller::new(&self.registry).append_paragraph(&self.document, &mut self.session);
        self.apply_change(change, cx);
        window.focus(&self.focus_handle);
    }

    fn pick_image(&mut self, after: BlockId, window: &mut Window, cx: &mut Context<Self>) {
        let insertion = ImageInsertion::capture(&self.document, &after);
        cx.notify();
        self.prompt_for_image(window, cx, move |this, url, window, cx| {
            this.complete_image_insertion(&insertion, url, window, cx);
        });
    }

    /// Fill an existing image block that has no picture yet.
    pub(crate) fn choose_image_for(
        &mut self,
        id: BlockId,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.prompt_for_image(window, cx, move |this, url, _, cx| {
            let mut next = this.document.clone();
            match next.set_image_url(&id, Some(url)) {
                Ok(()) => this.apply_change(
                    Change {
                        blocks: next.into_blocks(),
                        kind: ChangeKind::Structure,
                    },
                    cx,
                ),
                Err(err) => tracing::warn!("image not applied: {err}"),
            }
        });
    }

    fn prompt_for_image(
        &mut self,
        window: &mut Window,
        cx: &mut Context<Self>,
        on_loaded: impl FnOnce(&mut Self, String, &mut Window, &mut Context<Self>) + 'static,
    ) {
        let picked = cx.prompt_for_paths(PathPromptOptions {
            files: true,
            directories: false,
            multiple: false,
            prompt: Some("Choose image".into()),
        });

        cx.spawn_in(window, async move |this, window| {
            let path: PathBuf = picked.await.ok()?.ok()??.into_iter().next()?;
            // The document may have changed while the picker was up; the callback works
            // against whatever snapshot is current when it runs.
            let loaded = read_image_data_url(&path);
            this.update_in(window, |this, window, cx| match loaded {
                Ok(url) => on_loaded(this, url, window, cx),
                Err(err) => tracing::warn!(path = %path.display(), "image not inserted: {err}"),
            })
            .ok();
            Some(())
        })
        .detach();
    }

    fn complete_image_insertion(
        &mut self,
        insertion: &ImageInsertion,
        url: String,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> BlockId {
        let (change, id) = insertion.apply(&self.document, url);
        self.session.focus(id.clone(), 0);
        self.apply_change(change, cx);
        window.focus(&self.focus_handle);
        id
    }

    fn refresh_images(&mut self) {
        let document = &self.document;
        self.images.retain(|url, _| {
            document
                .blocks()
                .iter()
                .any(|block| block.image_url.as_deref() == Some(url.as_str()))
        });
        for block in self.document.blocks() {
            let Some(url) = block.image_url.as_deref() else {
                continue;
            };
            if self.images.contains_key(url) {
                continue;
            }
            if let Some(image) = decode_image(url) {
                self.images.insert(url.to_string(), image);
            }
        }
    }

    pub(crate) fn image_for(&self, url: &str) -> Option<Arc<Image>> {
        self.images.get(url).cloned()
    }

    /// Text of the focused block, when it has a text surface.
    fn active_text(&self) -> Option<String> {
        let focused = self.session.focused()?;
        let block = self.document.get(&focused.id)?;
        self.registry
            .is_text(block.kind)
            .then(|| block.content.clone())
    }

    fn input_range(&mut self, text: &str, range_utf16: Option<Range<usize>>) -> Range<usize> {
        let cursor = self.session.cursor().unwrap_or(0);
        let marked = self.ime_marked_range.take();
        range_utf16
            .map(|r| utf16_to_byte(text, r.start)..utf16_to_byte(text, r.end))
            .or(marked)
            .unwrap_or(cursor..cursor)
    }

    fn enter(&mut self, action: &Enter, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Enter { shift: action.shift }, window, cx);
    }

    fn backspace(&mut self, _: &Backspace, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Backspace, window, cx);
    }

    fn delete(&mut self, _: &Delete, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Delete, window, cx);
    }

    fn tab(&mut self, _: &Tab, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Tab, window, cx);
    }

    fn escape(&mut self, _: &Escape, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Escape, window, cx);
    }

    fn left(&mut self, _: &MoveLeft, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Left, window, cx);
    }

    fn right(&mut self, _: &MoveRight, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Right, window, cx);
    }

    fn up(&mut self, _: &MoveUp, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Up, window, cx);
    }

    fn down(&mut self, _: &MoveDown, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Down, window, cx);
    }

    fn home(&mut self, _: &MoveHome, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::Home, window, cx);
    }

    fn end(&mut self, _: &MoveEnd, window: &mut Window, cx: &mut Context<Self>) {
        self.dispatch_key(KeyInput::End, window, cx);
    }

    fn undo(&mut self, _: &Undo, _window: &mut Window, cx: &mut Context<Self>) {
        cx.emit(BlockEditorEvent::UndoRequested);
    }

    fn redo(&mut self, _: &Redo, _window: &mut Window, cx: &mut Context<Self>) {
        cx.emit(BlockEditorEvent::RedoRequested);
    }
}

impl EntityInputHandler for BlockEditorState {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        adjusted_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let text = self.active_text()?;
        let start = utf16_to_byte(&text, range_utf16.start);
        let end = utf16_to_byte(&text, range_utf16.end);
        adjusted_range.replace(byte_to_utf16_range(&text, start..end));
        Some(text.get(start..end).unwrap_or("").to_string())
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        let text = self.active_text()?;
        let caret = byte_to_utf16(&text, self.session.cursor()?);
        Some(UTF16Selection {
            range: caret..caret,
            reversed: false,
        })
    }

    fn marked_text_range(
        &self,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Range<usize>> {
        let text = self.active_text()?;
        self.ime_marked_range
            .as_ref()
            .map(|range| byte_to_utf16_range(&text, range.clone()))
    }

    fn unmark_text(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {
        self.ime_marked_range = None;
    }

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let inserted = new_text.replace("\r\n", "\n").replace('\r', "\n");
        let anchor = self.caret_anchor();

        // Palette queries are typed even when no block holds focus.
        if self.session.palette.is_open() {
            self.ime_marked_range = None;
            let outcome = Controller::new(&self.registry).handle_key(
                &self.document,
                &mut self.session,
                KeyInput::Text(inserted),
                anchor,
            );
            self.finish(outcome, window, cx);
            return;
        }

        let Some(text) = self.active_text() else {
            return;
        };
        let range = self.input_range(&text, range_utf16);
        let outcome = Controller::new(&self.registry).replace_text(
            &self.document,
            &mut self.session,
            range,
            &inserted,
            anchor,
        );
        self.finish(outcome, window, cx);
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        new_selected_range_utf16: Option<Range<usize>>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let Some(text) = self.active_text().filter(|_| !self.session.palette.is_open()) else {
            self.replace_text_in_range(range_utf16, new_text, window, cx);
            return;
        };

        let inserted = new_text.replace("\r\n", "\n").replace('\r', "\n");
        let range = self.input_range(&text, range_utf16);
        let start = clamp_to_char_boundary(&text, range.start);
        let anchor = self.caret_anchor();
        let outcome = Controller::new(&self.registry).replace_text(
            &self.document,
            &mut self.session,
            range,
            &inserted,
            anchor,
        );
        let content_edit = matches!(
            outcome.change.as_ref().map(|change| &change.kind),
            Some(ChangeKind::Content(_))
        );
        self.finish(outcome, window, cx);

        if !content_edit || inserted.is_empty() {
            return;
        }
        let marked = start..start + inserted.len();
        if let (Some(selected), Some(id)) = (
            new_selected_range_utf16,
            self.session.focused_id().cloned(),
        ) {
            let caret = marked.start + utf16_to_byte(&inserted, selected.end);
            self.session.focus(id, caret);
        }
        self.ime_marked_range = Some(marked);
    }

    fn bounds_for_range(
        &mut self,
        range_utf16: Range<usize>,
        _bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        let focused = self.session.focused()?;
        let cache = self.layout_cache.get(&focused.id)?;
        let start = utf16_to_byte(cache.text.as_str(), range_utf16.start);
        let pos = cache.text_layout.position_for_index(start)?;
        let line_height = cache.text_layout.line_height();
        Some(Bounds::from_corners(
            pos,
            point(pos.x + px(1.0), pos.y + line_height),
        ))
    }

    fn character_index_for_point(
        &mut self,
        point: Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        let focused = self.session.focused()?;
        let cache = self.layout_cache.get(&focused.id)?;
        let byte_ix = match cache.text_layout.index_for_position(point) {
            Ok(ix) | Err(ix) => ix,
        };
        Some(byte_to_utf16(cache.text.as_str(), byte_ix))
    }
}

impl gpui::Focusable for BlockEditorState {
    fn focus_handle(&self, _cx: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for BlockEditorState {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let state = cx.entity();

        if self.list_dirty {
            self.list_dirty = false;
            let items = self.list_items();
            let activation = self.activation();
            self.list.update(cx, |list, cx| {
                list.set_activation(activation);
                list.sync_items(items, cx);
            });
        }
        self.refresh_images();
        let document = &self.document;
        self.layout_cache.retain(|id, _| document.contains(id));

        let theme = self.theme;
        let palette = self.render_palette(window, cx);
        let focus_handle = self.focus_handle.clone();
        let input_state = state.clone();
        let weak = state.downgrade();

        div()
            .id(("block-editor", cx.entity_id()))
            .key_context(CONTEXT)
            .track_focus(&self.focus_handle)
            .tab_index(0)
            .w_full()
            .relative()
            .flex()
            .flex_col()
            .gap(px(4.))
            .p(px(12.))
            .bg(theme.background)
            .border_1()
            .border_color(theme.border)
            .rounded(theme.radius)
            .text_color(theme.foreground)
            .when(!window.is_inspector_picking(cx), |this| {
                this.on_action(window.listener_for(&state, Self::enter))
                    .on_action(window.listener_for(&state, Self::backspace))
                    .on_action(window.listener_for(&state, Self::delete))
                    .on_action(window.listener_for(&state, Self::tab))
                    .on_action(window.listener_for(&state, Self::escape))
                    .on_action(window.listener_for(&state, Self::left))
                    .on_action(window.listener_for(&state, Self::right))
                    .on_action(window.listener_for(&state, Self::up))
                    .on_action(window.listener_for(&state, Self::down))
                    .on_action(window.listener_for(&state, Self::home))
                    .on_action(window.listener_for(&state, Self::end))
                    .on_action(window.listener_for(&state, Self::undo))
                    .on_action(window.listener_for(&state, Self::redo))
            })
            .child(dnd_list(&self.list, move |ix, item, row_state, window, cx| {
                match weak.upgrade() {
                    Some(state) => render_row(&state, ix, &item.data, row_state, window, cx),
                    None => div().into_any_element(),
                }
            }))
            .child(
                div().pl(px(HANDLE_WIDTH)).child(
                    Button::new("block-editor-append")
                        .label("+ Add block")
                        .ghost()
                        .small()
                        .on_click(cx.listener(|this, _, window, cx| {
                            this.append_paragraph(window, cx);
                        })),
                ),
            )
            // Registers the IME handler without taking part in hit testing.
            .child(
                canvas(
                    |_, _, _| {},
                    move |bounds, _, window, cx| {
                        window.handle_input(
                            &focus_handle,
                            ElementInputHandler::new(bounds, input_state.clone()),
                            cx,
                        );
                    },
                )
                .absolute()
                .size_full(),
            )
            .children(palette)
            .when(self.session.palette.is_dragging(), |this| {
                this.child(palette_drag_listeners(state.clone()))
            })
    }
}

/// Short text used by the drag preview.
fn row_label(block: &Block, registry: &BlockRegistry) -> String {
    let first_line = block.content.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return registry.label(block.kind).to_string();
    }
    let mut label: String = first_line.chars().take(60).collect();
    if first_line.chars().count() > 60 {
        label.push('…');
    }
    label
}

fn decode_image(url: &str) -> Option<Arc<Image>> {
    let decoded = decode_data_url(url)?;
    let format = match decoded.mime.as_str() {
        "image/png" => ImageFormat::Png,
        "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        "image/gif" => ImageFormat::Gif,
        "image/webp" => ImageFormat::Webp,
        "image/svg+xml" => ImageFormat::Svg,
        "image/bmp" => ImageFormat::Bmp,
        other => {
            tracing::debug!(mime = other, "no decoder for embedded image");
            return None;
        }
    };
    Some(Arc::new(Image::from_bytes(format, decoded.bytes)))
}

pub(crate) fn to_palette_point(position: Point<Pixels>) -> PalettePoint {
    PalettePoint::new(f32::from(position.x), f32::from(position.y))
}

pub(crate) fn from_palette_point(position: PalettePoint) -> Point<Pixels> {
    point(px(position.x), px(position.y))
}

fn utf16_to_byte(s: &str, utf16_ix: usize) -> usize {
    if utf16_ix == 0 {
        return 0;
    }
    let mut utf16_count = 0usize;
    for (byte_ix, ch) in s.char_indices() {
        if utf16_count >= utf16_ix {
            return byte_ix;
        }
        utf16_count += ch.len_utf16();
    }
    s.len()
}

fn byte_to_utf16(s: &str, byte_ix: usize) -> usize {
    let byte_ix = byte_ix.min(s.len());
    let mut utf16_count = 0usize;
    for (ix, ch) in s.char_indices() {
        if ix >= byte_ix {
            break;
        }
        utf16_count += ch.len_utf16();
    }
    utf16_count
}

fn byte_to_utf16_range(s: &str, range: Range<usize>) -> Range<usize> {
    byte_to_utf16(s, range.start)..byte_to_utf16(s, range.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_offsets_round_trip_through_bytes() {
        let text = "a😀b";
        assert_eq!(utf16_to_byte(text, 1), 1);
        assert_eq!(utf16_to_byte(text, 3), 5);
        assert_eq!(byte_to_utf16(text, 5), 3);
        assert_eq!(byte_to_utf16_range(text, 1..6), 1..4);
        assert_eq!(utf16_to_byte(text, 99), text.len());
    }

    #[test]
    fn row_label_falls_back_to_type_label() {
        let registry = BlockRegistry::standard();
        assert_eq!(row_label(&Block::paragraph("  "), &registry), "Text");
        assert_eq!(row_label(&Block::paragraph("one\ntwo"), &registry), "one");
        let long = "x".repeat(80);
        assert_eq!(row_label(&Block::paragraph(long), &registry).chars().count(), 61);
    }

    #[test]
    fn only_known_formats_decode() {
        assert!(decode_image("data:image/png;base64,AQID").is_some());
        assert!(decode_image("data:image/x-unknown;base64,AQID").is_none());
        assert!(decode_image("https://example.com/a.png").is_none());
    }
}
