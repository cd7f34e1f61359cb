use std::collections::HashSet;

use crate::block::{Block, BlockId, BlockKind};
use crate::error::DocumentError;

/// An ordered, never-empty sequence of blocks with unique ids.
///
/// The document is a value: the editor clones the snapshot it was handed, applies an
/// operation to the clone and hands the whole list back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            blocks: vec![Block::paragraph("")],
        }
    }
}

impl Document {
    /// Build a document from externally supplied blocks.
    ///
    /// An empty list becomes a single empty paragraph. Duplicate ids are rejected.
    pub fn new(blocks: Vec<Block>) -> Result<Self, DocumentError> {
        {
            let mut seen: HashSet<&BlockId> = HashSet::with_capacity(blocks.len());
            for block in &blocks {
                if !seen.insert(&block.id) {
                    return Err(DocumentError::DuplicateId(block.id.clone()));
                }
            }
        }

        let mut doc = Self { blocks };
        if doc.blocks.is_empty() {
            doc.blocks.push(Block::paragraph(""));
        }
        Ok(doc)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; kept so `len` has its usual companion.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| &block.id == id)
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }

    pub fn block_at(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    fn require(&self, id: &BlockId) -> Result<usize, DocumentError> {
        self.index_of(id)
            .ok_or_else(|| DocumentError::BlockNotFound(id.clone()))
    }

    fn block_mut(&mut self, id: &BlockId) -> Result<&mut Block, DocumentError> {
        let ix = self.require(id)?;
        Ok(&mut self.blocks[ix])
    }

    pub fn set_content(
        &mut self,
        id: &BlockId,
        content: impl Into<String>,
    ) -> Result<(), DocumentError> {
        self.block_mut(id)?.content = content.into();
        Ok(())
    }

    /// Change a block's type. Identity and content are kept.
    ///
    /// Returns `false` when the block already had `kind`.
    pub fn set_kind(&mut self, id: &BlockId, kind: BlockKind) -> Result<bool, DocumentError> {
        let block = self.block_mut(id)?;
        if block.kind == kind {
            return Ok(false);
        }
        block.kind = kind;
        Ok(true)
    }

    pub fn set_image_url(
        &mut self,
        id: &BlockId,
        image_url: Option<String>,
    ) -> Result<(), DocumentError> {
        self.block_mut(id)?.image_url = image_url;
        Ok(())
    }

    pub fn insert_at(&mut self, index: usize, block: Block) -> Result<(), DocumentError> {
        if index > self.blocks.len() {
            return Err(DocumentError::IndexOutOfBounds {
                index,
                len: self.blocks.len(),
            });
        }
        if self.contains(&block.id) {
            return Err(DocumentError::DuplicateId(block.id));
        }
        self.blocks.insert(index, block);
        Ok(())
    }

    /// Insert `block` right after `anchor`, returning the new block's index.
    pub fn insert_after(&mut self, anchor: &BlockId, block: Block) -> Result<usize, DocumentError> {
        let ix = self.require(anchor)? + 1;
        self.insert_at(ix, block)?;
        Ok(ix)
    }

    pub fn append(&mut self, block: Block) -> Result<usize, DocumentError> {
        let ix = self.blocks.len();
        self.insert_at(ix, block)?;
        Ok(ix)
    }

    /// Remove a block. Removing the last remaining block is a no-op and returns `None`.
    pub fn remove(&mut self, id: &BlockId) -> Result<Option<Block>, DocumentError> {
        let ix = self.require(id)?;
        if self.blocks.len() == 1 {
            tracing::debug!("refusing to remove the last block {id}");
            return Ok(None);
        }
        Ok(Some(self.blocks.remove(ix)))
    }

    /// Insert an empty paragraph after `id` and return the new block's id.
    pub fn split_after(&mut self, id: &BlockId) -> Result<BlockId, DocumentError> {
        let block = Block::paragraph("");
        let new_id = block.id.clone();
        self.insert_after(id, block)?;
        Ok(new_id)
    }

    /// Move the block at `from` so that it ends up at `to`.
    ///
    /// Returns `false` when nothing moved.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<bool, DocumentError> {
        let len = self.blocks.len();
        for index in [from, to] {
            if index >= len {
                return Err(DocumentError::IndexOutOfBounds { index, len });
            }
        }
        if from == to {
            return Ok(false);
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        Ok(true)
    }

    pub fn move_block(&mut self, id: &BlockId, to: usize) -> Result<bool, DocumentError> {
        let from = self.require(id)?;
        self.reorder(from, to)
    }

    /// 1-based position of an ordered-list block within its run of consecutive
    /// ordered-list blocks.
    pub fn ordered_list_number(&self, index: usize) -> Option<usize> {
        if self.blocks.get(index)?.kind != BlockKind::OrderedList {
            return None;
        }
        let run = self.blocks[..index]
            .iter()
            .rev()
            .take_while(|block| block.kind == BlockKind::OrderedList)
            .count();
        Some(run + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(doc: &Document) -> Vec<&str> {
        doc.blocks().iter().map(|b| b.id.as_str()).collect()
    }

    fn abc() -> Document {
        Document::new(vec![
            Block::paragraph("a").with_id("A"),
            Block::paragraph("b").with_id("B"),
            Block::paragraph("c").with_id("C"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_input_becomes_single_paragraph() {
        let doc = Document::new(Vec::new()).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
        assert_eq!(doc.blocks()[0].content, "");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Document::new(vec![
            Block::paragraph("x").with_id("same"),
            Block::paragraph("y").with_id("same"),
        ])
        .unwrap_err();
        assert_eq!(err, DocumentError::DuplicateId(BlockId::from("same")));
    }

    #[test]
    fn reorder_moves_down_and_up() {
        let mut doc = abc();
        assert!(doc.reorder(0, 2).unwrap());
        assert_eq!(ids(&doc), vec!["B", "C", "A"]);
        assert!(doc.reorder(2, 0).unwrap());
        assert_eq!(ids(&doc), vec!["A", "B", "C"]);
    }

    #[test]
    fn reorder_rejects_out_of_bounds() {
        let mut doc = abc();
        assert_eq!(
            doc.reorder(0, 3).unwrap_err(),
            DocumentError::IndexOutOfBounds { index: 3, len: 3 }
        );
    }

    #[test]
    fn insert_rejects_existing_id() {
        let mut doc = abc();
        let err = doc
            .insert_after(&BlockId::from("A"), Block::paragraph("dup").with_id("C"))
            .unwrap_err();
        assert_eq!(err, DocumentError::DuplicateId(BlockId::from("C")));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn ordered_list_numbers_restart_after_other_blocks() {
        let doc = Document::new(vec![
            Block::new(BlockKind::OrderedList, "one"),
            Block::new(BlockKind::OrderedList, "two"),
            Block::paragraph("break"),
            Block::new(BlockKind::OrderedList, "again"),
        ])
        .unwrap();
        assert_eq!(doc.ordered_list_number(0), Some(1));
        assert_eq!(doc.ordered_list_number(1), Some(2));
        assert_eq!(doc.ordered_list_number(2), None);
        assert_eq!(doc.ordered_list_number(3), Some(1));
    }
}
