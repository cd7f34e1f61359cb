use std::ops::Range;

use crate::block::{Block, BlockId, BlockKind};
use crate::document::Document;
use crate::palette::{PaletteMode, PalettePoint, PaletteSelection, PaletteState};
use crate::registry::{BlockRegistry, PALETTE_TRIGGER, ShortcutMatch};
use crate::text::{TextBuffer, clamp_to_char_boundary};

/// A key press delivered to the focused block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Text(String),
    Enter { shift: bool },
    Backspace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl KeyInput {
    pub fn text(text: impl Into<String>) -> Self {
        KeyInput::Text(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedBlock {
    pub id: BlockId,
    pub cursor: usize,
}

/// Ephemeral editor state. Never holds block content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    focused: Option<FocusedBlock>,
    pub palette: PaletteState,
}

impl Session {
    pub fn focused(&self) -> Option<&FocusedBlock> {
        self.focused.as_ref()
    }

    pub fn focused_id(&self) -> Option<&BlockId> {
        self.focused.as_ref().map(|focused| &focused.id)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.focused.as_ref().map(|focused| focused.cursor)
    }

    pub fn is_focused(&self, id: &BlockId) -> bool {
        self.focused_id() == Some(id)
    }

    pub fn focus(&mut self, id: BlockId, cursor: usize) {
        self.focused = Some(FocusedBlock { id, cursor });
    }

    /// Focus a block with the caret after its last char.
    pub fn focus_end(&mut self, block: &Block) {
        self.focus(block.id.clone(), block.content.len());
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Drop focus and palette targets that no longer exist in `doc`, and clamp the caret.
    pub fn reconcile(&mut self, doc: &Document) {
        if let Some(focused) = self.focused.as_mut() {
            match doc.get(&focused.id) {
                Some(block) => {
                    focused.cursor = clamp_to_char_boundary(&block.content, focused.cursor)
                }
                None => self.focused = None,
            }
        }
        if let Some(mode) = self.palette.mode() {
            if !doc.contains(mode.target()) {
                self.palette.close();
            }
        }
    }
}

/// How a change should be grouped by the owner's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// Only the text of this block changed.
    Content(BlockId),
    /// Blocks were added, removed, moved or retyped.
    Structure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub blocks: Vec<Block>,
    pub kind: ChangeKind,
}

impl Change {
    fn structure(doc: Document) -> Self {
        Self {
            blocks: doc.into_blocks(),
            kind: ChangeKind::Structure,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyOutcome {
    /// The key was consumed and should not fall through.
    pub handled: bool,
    pub change: Option<Change>,
    /// The palette resolved to a selection that needs the host's help (an image upload).
    pub selection: Option<PaletteSelection>,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    fn changed(change: Change) -> Self {
        Self {
            handled: true,
            change: Some(change),
            selection: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Changed(Change),
    Unchanged,
    /// Insert mode picked an image: the host must ask for a file, then insert after `after`.
    PickImage { after: BlockId },
}

/// Turns key presses and palette picks into whole-list replacements.
///
/// The controller never mutates the document it is given; every result is a fresh list.
pub struct Controller<'a> {
    registry: &'a BlockRegistry,
}

impl<'a> Controller<'a> {
    pub fn new(registry: &'a BlockRegistry) -> Self {
        Self { registry }
    }

    pub fn handle_key(
        &self,
        doc: &Document,
        session: &mut Session,
        key: KeyInput,
        caret_anchor: PalettePoint,
    ) -> KeyOutcome {
        if session.palette.is_open() {
            return self.handle_palette_key(doc, session, key);
        }

        let Some(FocusedBlock { id, cursor }) = session.focused().cloned() else {
            return KeyOutcome::ignored();
        };
        let Some(block) = doc.get(&id) else {
            session.blur();
            return KeyOutcome::ignored();
        };

        if !self.registry.is_text(block.kind) {
            return self.handle_image_key(doc, session, block, key);
        }

        let mut buffer = TextBuffer::with_cursor(block.content.clone(), cursor);
        match key {
            KeyInput::Text(text) if text == PALETTE_TRIGGER => {
                session
                    .palette
                    .open(PaletteMode::Transform(id), caret_anchor);
                KeyOutcome::handled()
            }
            KeyInput::Text(text) => {
                if text.is_empty() {
                    return KeyOutcome::ignored();
                }
                buffer.insert(&text);
                self.commit_text(doc, session, block, buffer)
            }
            KeyInput::Enter { shift: true } => {
                buffer.insert("\n");
                self.commit_text(doc, session, block, buffer)
            }
            KeyInput::Enter { shift: false } => self.split(doc, session, &id),
            KeyInput::Backspace => {
                if buffer.is_at_start() {
                    return self.demote(doc, session, block);
                }
                buffer.backspace();
                self.commit_text(doc, session, block, buffer)
            }
            KeyInput::Delete => {
                if !buffer.delete_forward() {
                    return KeyOutcome::handled();
                }
                self.commit_text(doc, session, block, buffer)
            }
            // Reserved for list nesting.
            KeyInput::Tab => KeyOutcome::handled(),
            KeyInput::Escape => {
                session.blur();
                KeyOutcome::handled()
            }
            KeyInput::Left => {
                buffer.move_left();
                session.focus(id, buffer.cursor());
                KeyOutcome::handled()
            }
            KeyInput::Right => {
                buffer.move_right();
                session.focus(id, buffer.cursor());
                KeyOutcome::handled()
            }
            KeyInput::Home => {
                session.focus(id, 0);
                KeyOutcome::handled()
            }
            KeyInput::End => {
                session.focus_end(block);
                KeyOutcome::handled()
            }
            KeyInput::Up => self.focus_neighbor(doc, session, &id, -1),
            KeyInput::Down => self.focus_neighbor(doc, session, &id, 1),
        }
    }

    fn handle_palette_key(
        &self,
        doc: &Document,
        session: &mut Session,
        key: KeyInput,
    ) -> KeyOutcome {
        match key {
            KeyInput::Text(text) => {
                session.palette.push_query(&text);
                KeyOutcome::handled()
            }
            KeyInput::Backspace => {
                if !session.palette.pop_query() {
                    session.palette.close();
                }
                KeyOutcome::handled()
            }
            KeyInput::Up => {
                session.palette.move_highlight(-1, self.registry);
                KeyOutcome::handled()
            }
            KeyInput::Down | KeyInput::Tab => {
                session.palette.move_highlight(1, self.registry);
                KeyOutcome::handled()
            }
            KeyInput::Escape => {
                session.palette.close();
                KeyOutcome::handled()
            }
            KeyInput::Enter { .. } => {
                let Some(selection) = session.palette.select_highlighted(self.registry) else {
                    return KeyOutcome::handled();
                };
                match self.apply_selection(doc, session, selection.clone()) {
                    SelectionOutcome::Changed(change) => KeyOutcome::changed(change),
                    SelectionOutcome::Unchanged => KeyOutcome::handled(),
                    SelectionOutcome::PickImage { .. } => KeyOutcome {
                        handled: true,
                        change: None,
                        selection: Some(selection),
                    },
                }
            }
            KeyInput::Delete
            | KeyInput::Left
            | KeyInput::Right
            | KeyInput::Home
            | KeyInput::End => KeyOutcome::handled(),
        }
    }

    /// Image blocks have no text surface: Enter adds a paragraph below, Backspace and
    /// Delete remove the image.
    fn handle_image_key(
        &self,
        doc: &Document,
        session: &mut Session,
        block: &Block,
        key: KeyInput,
    ) -> KeyOutcome {
        match key {
            KeyInput::Enter { .. } => self.split(doc, session, &block.id),
            KeyInput::Backspace | KeyInput::Delete => {
                match self.remove_block(doc, session, &block.id) {
                    Some(change) => KeyOutcome::changed(change),
                    None => KeyOutcome::handled(),
                }
            }
            KeyInput::Up => self.focus_neighbor(doc, session, &block.id, -1),
            KeyInput::Down => self.focus_neighbor(doc, session, &block.id, 1),
            KeyInput::Escape => {
                session.blur();
                KeyOutcome::handled()
            }
            _ => KeyOutcome::ignored(),
        }
    }

    /// Write the edited buffer back and run shortcut detection on the result.
    fn commit_text(
        &self,
        doc: &Document,
        session: &mut Session,
        block: &Block,
        mut buffer: TextBuffer,
    ) -> KeyOutcome {
        let mut next = doc.clone();
        let mut kind = ChangeKind::Content(block.id.clone());

        if let Some(m) = self.shortcut_for(block.kind, buffer.text()) {
            tracing::debug!(block = %block.id, to = %m.kind, "shortcut transition");
            buffer.strip_prefix(m.prefix_len);
            if next.set_kind(&block.id, m.kind).is_err() {
                return KeyOutcome::ignored();
            }
            kind = ChangeKind::Structure;
        }

        let cursor = buffer.cursor();
        if next.set_content(&block.id, buffer.into_text()).is_err() {
            return KeyOutcome::ignored();
        }
        session.focus(block.id.clone(), cursor);
        KeyOutcome::changed(Change {
            blocks: next.into_blocks(),
            kind,
        })
    }

    fn split(&self, doc: &Document, session: &mut Session, id: &BlockId) -> KeyOutcome {
        let mut next = doc.clone();
        let Ok(new_id) = next.split_after(id) else {
            return KeyOutcome::ignored();
        };
        session.focus(new_id, 0);
        KeyOutcome::changed(Change::structure(next))
    }

    fn demote(&self, doc: &Document, session: &mut Session, block: &Block) -> KeyOutcome {
        if block.kind == BlockKind::Paragraph {
            return KeyOutcome::handled();
        }
        let mut next = doc.clone();
        if next.set_kind(&block.id, BlockKind::Paragraph).is_err() {
            return KeyOutcome::ignored();
        }
        session.focus(block.id.clone(), 0);
        KeyOutcome::changed(Change::structure(next))
    }

    fn focus_neighbor(
        &self,
        doc: &Document,
        session: &mut Session,
        id: &BlockId,
        delta: isize,
    ) -> KeyOutcome {
        let Some(ix) = doc.index_of(id) else {
            return KeyOutcome::ignored();
        };
        let Some(target) = ix
            .checked_add_signed(delta)
            .and_then(|target| doc.block_at(target))
        else {
            return KeyOutcome::handled();
        };
        if delta < 0 {
            session.focus_end(target);
        } else {
            session.focus(target.id.clone(), 0);
        }
        KeyOutcome::handled()
    }

    /// Replace `range` of the focused block's text with `text`, as an input method does.
    ///
    /// A collapsed range is plain typing at that offset, so `/` and shortcuts behave as usual.
    pub fn replace_text(
        &self,
        doc: &Document,
        session: &mut Session,
        range: Range<usize>,
        text: &str,
        caret_anchor: PalettePoint,
    ) -> KeyOutcome {
        let Some(id) = session.focused_id().cloned() else {
            return KeyOutcome::ignored();
        };
        let Some(block) = doc.get(&id) else {
            return KeyOutcome::ignored();
        };
        if session.palette.is_open() || range.is_empty() {
            if !session.palette.is_open() {
                session.focus(id, clamp_to_char_boundary(&block.content, range.start));
            }
            return self.handle_key(doc, session, KeyInput::text(text), caret_anchor);
        }
        if !self.registry.is_text(block.kind) {
            return KeyOutcome::ignored();
        }

        let start = clamp_to_char_boundary(&block.content, range.start);
        let end = clamp_to_char_boundary(&block.content, range.end).max(start);
        let mut content = block.content.clone();
        content.replace_range(start..end, "");
        let mut buffer = TextBuffer::with_cursor(content, start);
        buffer.insert(text);
        self.commit_text(doc, session, block, buffer)
    }

    /// Apply the shortcut table to a block as if its content had just been typed.
    pub fn detect_shortcut(&self, block: &Block) -> Option<Block> {
        let m = self.shortcut_for(block.kind, &block.content)?;
        let mut buffer = TextBuffer::new(block.content.clone());
        buffer.strip_prefix(m.prefix_len);
        Some(Block {
            kind: m.kind,
            content: buffer.into_text(),
            ..block.clone()
        })
    }

    /// A prefix match on a text block that would change its type.
    fn shortcut_for(&self, kind: BlockKind, content: &str) -> Option<ShortcutMatch> {
        if !self.registry.is_text(kind) {
            return None;
        }
        self.registry
            .match_shortcut(content)
            .filter(|m| m.kind != kind)
    }

    /// Change a block's type, focusing it with the caret at the end of its text.
    pub fn set_kind(
        &self,
        doc: &Document,
        session: &mut Session,
        id: &BlockId,
        kind: BlockKind,
    ) -> Option<Change> {
        let mut next = doc.clone();
        let changed = next.set_kind(id, kind).ok()?;
        if let Some(block) = next.get(id) {
            session.focus_end(block);
        }
        changed.then(|| Change::structure(next))
    }

    pub fn apply_selection(
        &self,
        doc: &Document,
        session: &mut Session,
        selection: PaletteSelection,
    ) -> SelectionOutcome {
        match selection.mode {
            PaletteMode::Transform(id) => {
                match self.set_kind(doc, session, &id, selection.kind) {
                    Some(change) => SelectionOutcome::Changed(change),
                    None => SelectionOutcome::Unchanged,
                }
            }
            PaletteMode::Insert(after) if selection.kind == BlockKind::Image => {
                SelectionOutcome::PickImage { after }
            }
            PaletteMode::Insert(after) => {
                let mut next = doc.clone();
                let block = Block::new(selection.kind, "");
                let new_id = block.id.clone();
                if next.insert_after(&after, block).is_err() {
                    return SelectionOutcome::Unchanged;
                }
                session.focus(new_id, 0);
                SelectionOutcome::Changed(Change::structure(next))
            }
        }
    }

    /// Remove a block, moving focus to its neighbour. `None` when it was the last block.
    pub fn remove_block(
        &self,
        doc: &Document,
        session: &mut Session,
        id: &BlockId,
    ) -> Option<Change> {
        let ix = doc.index_of(id)?;
        let mut next = doc.clone();
        next.remove(id).ok()??;
        session.palette.close_if_targets(id);
        if session.is_focused(id) {
            let neighbor = next.block_at(ix.saturating_sub(1)).cloned();
            match neighbor {
                Some(block) => session.focus_end(&block),
                None => session.blur(),
            }
        }
        Some(Change::structure(next))
    }

    /// Append an empty paragraph and focus it.
    pub fn append_paragraph(&self, doc: &Document, session: &mut Session) -> Change {
        let mut next = doc.clone();
        let block = Block::paragraph("");
        let id = block.id.clone();
        match next.append(block) {
            Ok(_) => session.focus(id, 0),
            Err(err) => tracing::warn!("paragraph not appended: {err}"),
        }
        Change::structure(next)
    }

    pub fn reorder(&self, doc: &Document, from: usize, to: usize) -> Option<Change> {
        let mut next = doc.clone();
        match next.reorder(from, to) {
            Ok(true) => {
                tracing::debug!(from, to, "reordered block");
                Some(Change::structure(next))
            }
            Ok(false) => None,
            Err(err) => {
                tracing::warn!("ignoring reorder: {err}");
                None
            }
        }
    }
}
