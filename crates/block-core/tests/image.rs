use std::io::Write as _;

use gpui_block_core::{
    Block, BlockId, BlockKind, Document, ImageError, ImageInsertion, data_url, read_image_data_url,
};

fn doc_abc() -> Document {
    Document::new(vec![
        Block::paragraph("a").with_id("A"),
        Block::paragraph("b").with_id("B"),
        Block::paragraph("c").with_id("C"),
    ])
    .unwrap()
}

#[test]
fn picked_file_becomes_image_after_anchor() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
    let url = read_image_data_url(file.path()).unwrap();
    assert_eq!(url, data_url("image/png", &[0x89, b'P', b'N', b'G']));

    let doc = doc_abc();
    let insertion = ImageInsertion::capture(&doc, &BlockId::from("A"));
    let (change, id) = insertion.apply(&doc, url.clone());

    assert_eq!(change.blocks.len(), 4);
    let image = &change.blocks[1];
    assert_eq!(image.id, id);
    assert_eq!(image.kind, BlockKind::Image);
    assert_eq!(image.image_url.as_deref(), Some(url.as_str()));
    assert_eq!(change.blocks[2].id, BlockId::from("B"));
}

#[test]
fn insertion_uses_current_blocks_not_the_snapshot() {
    let doc = doc_abc();
    let insertion = ImageInsertion::capture(&doc, &BlockId::from("B"));

    let mut later = doc.clone();
    later.move_block(&BlockId::from("B"), 0).unwrap();
    later.append(Block::paragraph("d").with_id("D")).unwrap();

    let (change, _) = insertion.apply(&later, "data:image/gif;base64,AA==".into());
    let ids: Vec<&str> = change.blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids[0], "B");
    assert_eq!(change.blocks[1].kind, BlockKind::Image);
    assert_eq!(ids.len(), 5);
}

#[test]
fn removed_anchor_falls_back_to_clamped_index() {
    let doc = doc_abc();
    let insertion = ImageInsertion::capture(&doc, &BlockId::from("C"));

    let mut later = doc.clone();
    later.remove(&BlockId::from("C")).unwrap();
    later.remove(&BlockId::from("B")).unwrap();

    let (change, _) = insertion.apply(&later, "data:image/png;base64,AA==".into());
    assert_eq!(change.blocks.len(), 2);
    assert_eq!(change.blocks[1].kind, BlockKind::Image);
}

#[test]
fn non_image_files_are_refused() {
    let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    let err = read_image_data_url(file.path()).unwrap_err();
    assert!(matches!(err, ImageError::NotAnImage { .. }));

    let dir = tempfile::tempdir().unwrap();
    let err = read_image_data_url(&dir.path().join("missing.png")).unwrap_err();
    assert!(matches!(err, ImageError::Io { .. }));
}
