use std::collections::VecDeque;

use crate::block::{Block, BlockId};
use crate::controller::ChangeKind;

pub const DEFAULT_MAX_UNDO: usize = 200;

#[derive(Debug, Clone)]
struct Snapshot {
    blocks: Vec<Block>,
    /// Consecutive content edits to the same block collapse into one undo step.
    coalesce: Option<BlockId>,
}

/// Bounded undo/redo over whole-list snapshots.
///
/// The owner of the block list keeps the history; the editor only asks for undo and redo.
#[derive(Debug, Clone)]
pub struct History {
    max_undo: usize,
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl History {
    pub fn new(max_undo: usize) -> Self {
        Self {
            max_undo: if max_undo == 0 {
                DEFAULT_MAX_UNDO
            } else {
                max_undo
            },
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Remember `before` as the state to return to. Clears redo.
    pub fn record(&mut self, before: &[Block]) {
        self.push(Snapshot {
            blocks: before.to_vec(),
            coalesce: None,
        });
    }

    /// Like [`History::record`], but folds into the previous step when it was also a
    /// content edit of `id`.
    pub fn record_coalesced(&mut self, id: &BlockId, before: &[Block]) {
        let extends_last = self
            .undo_stack
            .back()
            .is_some_and(|last| last.coalesce.as_ref() == Some(id));
        if extends_last && self.redo_stack.is_empty() {
            return;
        }
        self.push(Snapshot {
            blocks: before.to_vec(),
            coalesce: Some(id.clone()),
        });
    }

    /// Record a change reported by the editor.
    pub fn record_change(&mut self, kind: &ChangeKind, before: &[Block]) {
        match kind {
            ChangeKind::Content(id) => self.record_coalesced(id, before),
            ChangeKind::Structure => self.record(before),
        }
    }

    /// Step back. `current` goes onto the redo stack.
    pub fn undo(&mut self, current: &[Block]) -> Option<Vec<Block>> {
        let snapshot = self.undo_stack.pop_back()?;
        self.redo_stack.push(Snapshot {
            blocks: current.to_vec(),
            coalesce: None,
        });
        Some(snapshot.blocks)
    }

    pub fn redo(&mut self, current: &[Block]) -> Option<Vec<Block>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push_back(Snapshot {
            blocks: current.to_vec(),
            coalesce: None,
        });
        Some(snapshot.blocks)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        self.redo_stack.clear();
        while self.undo_stack.len() > self.max_undo {
            self.undo_stack.pop_front();
        }
    }
}
