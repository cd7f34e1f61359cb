use crate::block::{BlockId, BlockKind};
use crate::registry::{BlockRegistry, BlockSpec};

/// A position in window coordinates, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PalettePoint {
    pub x: f32,
    pub y: f32,
}

impl PalettePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for PalettePoint {
    type Output = PalettePoint;

    fn sub(self, rhs: Self) -> Self::Output {
        PalettePoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// What picking an entry does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteMode {
    /// Change the type of the target block (opened with `/`).
    Transform(BlockId),
    /// Insert a new block of the picked type after the target (opened with "add block").
    Insert(BlockId),
}

impl PaletteMode {
    pub fn target(&self) -> &BlockId {
        match self {
            PaletteMode::Transform(id) | PaletteMode::Insert(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPalette {
    pub mode: PaletteMode,
    pub position: PalettePoint,
    pub query: String,
    pub highlighted: usize,
    /// Offset between the pointer and the palette origin while the chrome is grabbed.
    grab_offset: Option<PalettePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSelection {
    pub mode: PaletteMode,
    pub kind: BlockKind,
}

/// `Closed -> Open (idle) <-> Open (dragging) -> Closed`. One palette per editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaletteState {
    #[default]
    Closed,
    Open(OpenPalette),
}

impl PaletteState {
    pub fn is_open(&self) -> bool {
        matches!(self, PaletteState::Open(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, PaletteState::Open(open) if open.grab_offset.is_some())
    }

    pub fn as_open(&self) -> Option<&OpenPalette> {
        match self {
            PaletteState::Open(open) => Some(open),
            PaletteState::Closed => None,
        }
    }

    fn as_open_mut(&mut self) -> Option<&mut OpenPalette> {
        match self {
            PaletteState::Open(open) => Some(open),
            PaletteState::Closed => None,
        }
    }

    pub fn mode(&self) -> Option<&PaletteMode> {
        self.as_open().map(|open| &open.mode)
    }

    pub fn position(&self) -> Option<PalettePoint> {
        self.as_open().map(|open| open.position)
    }

    pub fn query(&self) -> &str {
        self.as_open().map(|open| open.query.as_str()).unwrap_or("")
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.as_open().map(|open| open.highlighted)
    }

    /// Open the palette. Does nothing and returns `false` when it is already open.
    pub fn open(&mut self, mode: PaletteMode, position: PalettePoint) -> bool {
        if self.is_open() {
            return false;
        }
        tracing::debug!(?mode, "opening block palette");
        *self = PaletteState::Open(OpenPalette {
            mode,
            position,
            query: String::new(),
            highlighted: 0,
            grab_offset: None,
        });
        true
    }

    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        *self = PaletteState::Closed;
        true
    }

    /// Entries matching the current query, in registry order.
    pub fn entries<'a>(&self, registry: &'a BlockRegistry) -> Vec<&'a BlockSpec> {
        registry.filter(self.query())
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        if let Some(open) = self.as_open_mut() {
            open.query = query.into();
            open.highlighted = 0;
        }
    }

    pub fn push_query(&mut self, text: &str) {
        if let Some(open) = self.as_open_mut() {
            open.query.push_str(text);
            open.highlighted = 0;
        }
    }

    /// Remove the last char of the query. Returns `false` when the query was already empty.
    pub fn pop_query(&mut self) -> bool {
        let Some(open) = self.as_open_mut() else {
            return false;
        };
        if open.query.pop().is_none() {
            return false;
        }
        open.highlighted = 0;
        true
    }

    /// Move the highlight, wrapping around the filtered entries.
    pub fn move_highlight(&mut self, delta: isize, registry: &BlockRegistry) {
        let count = self.entries(registry).len();
        let Some(open) = self.as_open_mut() else {
            return;
        };
        if count == 0 {
            open.highlighted = 0;
            return;
        }
        let current = open.highlighted.min(count - 1) as isize;
        open.highlighted = (current + delta).rem_euclid(count as isize) as usize;
    }

    pub fn set_highlighted(&mut self, index: usize) {
        if let Some(open) = self.as_open_mut() {
            open.highlighted = index;
        }
    }

    pub fn highlighted_kind(&self, registry: &BlockRegistry) -> Option<BlockKind> {
        let open = self.as_open()?;
        let entries = self.entries(registry);
        let ix = open.highlighted.min(entries.len().checked_sub(1)?);
        entries.get(ix).map(|spec| spec.kind)
    }

    /// Pick `kind` and close the palette.
    pub fn select(&mut self, kind: BlockKind) -> Option<PaletteSelection> {
        let mode = self.mode()?.clone();
        self.close();
        Some(PaletteSelection { mode, kind })
    }

    pub fn select_highlighted(&mut self, registry: &BlockRegistry) -> Option<PaletteSelection> {
        let kind = self.highlighted_kind(registry)?;
        self.select(kind)
    }

    /// Pointer went down on the palette chrome.
    pub fn begin_drag(&mut self, pointer: PalettePoint) -> bool {
        let Some(open) = self.as_open_mut() else {
            return false;
        };
        open.grab_offset = Some(pointer - open.position);
        true
    }

    pub fn drag_to(&mut self, pointer: PalettePoint) -> bool {
        let Some(open) = self.as_open_mut() else {
            return false;
        };
        let Some(grab) = open.grab_offset else {
            return false;
        };
        open.position = pointer - grab;
        true
    }

    pub fn end_drag(&mut self) -> bool {
        self.as_open_mut()
            .and_then(|open| open.grab_offset.take())
            .is_some()
    }

    /// A pointer-down landed outside the palette.
    pub fn dismiss_outside(&mut self) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.close()
    }

    /// The target block went away.
    pub fn close_if_targets(&mut self, id: &BlockId) -> bool {
        if self.mode().is_some_and(|mode| mode.target() == id) {
            return self.close();
        }
        false
    }
}
