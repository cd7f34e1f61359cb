use gpui_block_core::{
    Block, BlockId, BlockRegistry, ChangeKind, Controller, Document, History, KeyInput,
    PalettePoint, Session,
};

#[test]
fn undo_and_redo_walk_snapshots() {
    let mut history = History::default();
    let v0 = vec![Block::paragraph("").with_id("a")];
    let v1 = vec![Block::paragraph("x").with_id("a")];
    let v2 = vec![
        Block::paragraph("x").with_id("a"),
        Block::paragraph("").with_id("b"),
    ];

    history.record(&v0);
    history.record(&v1);
    assert_eq!(history.undo(&v2).unwrap(), v1);
    assert_eq!(history.undo(&v1).unwrap(), v0);
    assert!(history.undo(&v0).is_none());

    assert_eq!(history.redo(&v0).unwrap(), v1);
    assert_eq!(history.redo(&v1).unwrap(), v2);
    assert!(!history.can_redo());
}

#[test]
fn recording_clears_redo() {
    let mut history = History::default();
    let v0 = vec![Block::paragraph("").with_id("a")];
    let v1 = vec![Block::paragraph("1").with_id("a")];
    history.record(&v0);
    history.undo(&v1);
    assert!(history.can_redo());
    history.record(&v0);
    assert!(!history.can_redo());
}

#[test]
fn history_is_bounded() {
    let mut history = History::new(3);
    for i in 0..10 {
        history.record(&[Block::paragraph(i.to_string()).with_id("a")]);
    }
    assert_eq!(history.undo_len(), 3);
    let current = [Block::paragraph("now").with_id("a")];
    assert_eq!(history.undo(&current).unwrap()[0].content, "9");
}

#[test]
fn typing_in_one_block_is_one_undo_step() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let mut history = History::default();
    let mut doc = Document::new(vec![Block::paragraph("").with_id("a")]).unwrap();
    let original = doc.blocks().to_vec();
    let mut session = Session::default();
    session.focus(BlockId::from("a"), 0);

    for ch in ["h", "e", "y"] {
        let change = controller
            .handle_key(&doc, &mut session, KeyInput::text(ch), PalettePoint::default())
            .change
            .unwrap();
        assert_eq!(change.kind, ChangeKind::Content(BlockId::from("a")));
        history.record_change(&change.kind, doc.blocks());
        doc = Document::new(change.blocks).unwrap();
    }
    assert_eq!(history.undo_len(), 1);

    let change = controller
        .handle_key(
            &doc,
            &mut session,
            KeyInput::Enter { shift: false },
            PalettePoint::default(),
        )
        .change
        .unwrap();
    history.record_change(&change.kind, doc.blocks());
    doc = Document::new(change.blocks).unwrap();
    assert_eq!(history.undo_len(), 2);

    let back = history.undo(doc.blocks()).unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].content, "hey");
    let back = history.undo(&back).unwrap();
    assert_eq!(back, original);
}
