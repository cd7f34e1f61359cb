use std::collections::HashSet;

use gpui_block_core::{Block, BlockId, BlockKind, Controller, Document, BlockRegistry, DocumentError};

fn abc() -> Document {
    Document::new(vec![
        Block::paragraph("a").with_id("A"),
        Block::paragraph("b").with_id("B"),
        Block::paragraph("c").with_id("C"),
    ])
    .unwrap()
}

fn ids(doc: &Document) -> Vec<&str> {
    doc.blocks().iter().map(|b| b.id.as_str()).collect()
}

#[test]
fn removing_the_last_block_is_a_no_op() {
    let mut doc = Document::default();
    let id = doc.blocks()[0].id.clone();
    assert_eq!(doc.remove(&id).unwrap(), None);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.blocks()[0].id, id);
}

#[test]
fn removing_until_one_block_remains() {
    let mut doc = abc();
    assert!(doc.remove(&BlockId::from("B")).unwrap().is_some());
    assert!(doc.remove(&BlockId::from("A")).unwrap().is_some());
    assert_eq!(doc.remove(&BlockId::from("C")).unwrap(), None);
    assert_eq!(ids(&doc), vec!["C"]);
}

#[test]
fn ids_stay_unique_through_edits() {
    let mut doc = abc();
    for _ in 0..5 {
        doc.split_after(&BlockId::from("B")).unwrap();
    }
    doc.append(Block::new(BlockKind::Quote, "q")).unwrap();
    doc.reorder(0, doc.len() - 1).unwrap();
    doc.remove(&BlockId::from("C")).unwrap();

    let unique: HashSet<&BlockId> = doc.blocks().iter().map(|b| &b.id).collect();
    assert_eq!(unique.len(), doc.len());
}

#[test]
fn set_kind_is_idempotent_and_keeps_identity() {
    let mut doc = abc();
    let id = BlockId::from("B");
    assert!(doc.set_kind(&id, BlockKind::Code).unwrap());
    let once = doc.clone();
    assert!(!doc.set_kind(&id, BlockKind::Code).unwrap());
    assert_eq!(doc, once);

    let block = doc.get(&id).unwrap();
    assert_eq!(block.content, "b");
    assert_eq!(doc.index_of(&id), Some(1));
}

#[test]
fn split_then_remove_restores_document() {
    let original = abc();
    let mut doc = original.clone();
    let new_id = doc.split_after(&BlockId::from("A")).unwrap();
    assert_eq!(doc.len(), 4);
    assert_eq!(doc.index_of(&new_id), Some(1));
    doc.remove(&new_id).unwrap();
    assert_eq!(doc, original);
}

#[test]
fn reorder_scenarios() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let doc = abc();

    let change = controller.reorder(&doc, 2, 0).unwrap();
    let moved: Vec<&str> = change.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(moved, vec!["C", "A", "B"]);

    assert!(controller.reorder(&doc, 0, 0).is_none());
    assert!(controller.reorder(&doc, 0, 7).is_none());
    assert_eq!(ids(&doc), vec!["A", "B", "C"]);
}

#[test]
fn operations_on_missing_blocks_fail() {
    let mut doc = abc();
    let missing = BlockId::from("nope");
    assert_eq!(
        doc.set_content(&missing, "x").unwrap_err(),
        DocumentError::BlockNotFound(missing.clone())
    );
    assert!(doc.split_after(&missing).is_err());
    assert!(doc.remove(&missing).is_err());
    assert_eq!(ids(&doc), vec!["A", "B", "C"]);
}
