use gpui_block_core::{
    Block, BlockId, BlockKind, BlockRegistry, ChangeKind, Controller, Document, KeyInput,
    PaletteMode, PalettePoint, Session,
};

fn type_keys(
    controller: &Controller,
    doc: &mut Document,
    session: &mut Session,
    keys: impl IntoIterator<Item = KeyInput>,
) {
    for key in keys {
        let outcome = controller.handle_key(doc, session, key, PalettePoint::default());
        if let Some(change) = outcome.change {
            *doc = Document::new(change.blocks).unwrap();
        }
    }
}

fn chars(text: &str) -> Vec<KeyInput> {
    text.chars().map(|ch| KeyInput::text(ch.to_string())).collect()
}

fn single(block: Block) -> (Document, Session) {
    let mut session = Session::default();
    session.focus_end(&block);
    (Document::new(vec![block]).unwrap(), session)
}

#[test]
fn detect_shortcut_strips_prefix() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let block = Block::paragraph("# Hello").with_id("a");

    let next = controller.detect_shortcut(&block).unwrap();
    assert_eq!(next.id, block.id);
    assert_eq!(next.kind, BlockKind::Heading1);
    assert_eq!(next.content, "Hello");

    let quote = Block::new(BlockKind::Quote, "# Hello");
    assert_eq!(controller.detect_shortcut(&quote).unwrap().kind, BlockKind::Heading1);
    let already_quote = Block::new(BlockKind::Quote, "> Hello");
    assert!(controller.detect_shortcut(&already_quote).is_none());
    assert!(controller.detect_shortcut(&Block::image("data:,")).is_none());
    assert!(controller.detect_shortcut(&Block::paragraph("#Hello")).is_none());
}

#[test]
fn shortcut_fires_once_space_lands() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (mut doc, mut session) = single(Block::paragraph("").with_id("a"));

    type_keys(&controller, &mut doc, &mut session, chars("#"));
    assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
    assert_eq!(doc.blocks()[0].content, "#");

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::text(" "), PalettePoint::default());
    let change = outcome.change.unwrap();
    assert_eq!(change.kind, ChangeKind::Structure);
    doc = Document::new(change.blocks).unwrap();
    assert_eq!(doc.blocks()[0].kind, BlockKind::Heading1);
    assert_eq!(doc.blocks()[0].content, "");
    assert_eq!(session.cursor(), Some(0));

    type_keys(&controller, &mut doc, &mut session, chars("Title"));
    assert_eq!(doc.blocks()[0].kind, BlockKind::Heading1);
    assert_eq!(doc.blocks()[0].content, "Title");
}

#[test]
fn longer_prefixes_are_typed_through() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);

    for (typed, kind) in [
        ("## ", BlockKind::Heading2),
        ("### ", BlockKind::Heading3),
        ("- ", BlockKind::List),
        ("1. ", BlockKind::OrderedList),
        ("> ", BlockKind::Quote),
        ("```", BlockKind::Code),
    ] {
        let (mut doc, mut session) = single(Block::paragraph(""));
        type_keys(&controller, &mut doc, &mut session, chars(typed));
        assert_eq!(doc.blocks()[0].kind, kind, "typing {typed:?}");
        assert_eq!(doc.blocks()[0].content, "");
    }
}

#[test]
fn shortcuts_apply_to_every_text_kind() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (mut doc, mut session) = single(Block::new(BlockKind::List, "#").with_id("a"));

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::text(" "), PalettePoint::default());
    doc = Document::new(outcome.change.unwrap().blocks).unwrap();
    assert_eq!(doc.blocks()[0].id, BlockId::from("a"));
    assert_eq!(doc.blocks()[0].kind, BlockKind::Heading1);
    assert_eq!(doc.blocks()[0].content, "");
    assert_eq!(session.cursor(), Some(0));
}

#[test]
fn prefix_of_the_current_kind_stays_literal() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (mut doc, mut session) = single(Block::new(BlockKind::Quote, ""));
    type_keys(&controller, &mut doc, &mut session, chars("> x"));
    assert_eq!(doc.blocks()[0].kind, BlockKind::Quote);
    assert_eq!(doc.blocks()[0].content, "> x");
}

#[test]
fn slash_opens_transform_palette_without_inserting() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (doc, mut session) = single(Block::paragraph("ab").with_id("a"));
    let anchor = PalettePoint::new(40., 20.);

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::text("/"), anchor);
    assert!(outcome.handled);
    assert!(outcome.change.is_none());
    assert_eq!(
        session.palette.mode(),
        Some(&PaletteMode::Transform(BlockId::from("a")))
    );
    assert_eq!(session.palette.position(), Some(anchor));
}

#[test]
fn enter_splits_and_focuses_new_block() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (doc, mut session) = single(Block::paragraph("Hi").with_id("a"));

    let outcome = controller.handle_key(
        &doc,
        &mut session,
        KeyInput::Enter { shift: false },
        PalettePoint::default(),
    );
    let blocks = outcome.change.unwrap().blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0], Block::paragraph("Hi").with_id("a"));
    assert_eq!(blocks[1].kind, BlockKind::Paragraph);
    assert_eq!(blocks[1].content, "");
    assert_eq!(session.focused_id(), Some(&blocks[1].id));
    assert_eq!(session.cursor(), Some(0));
}

#[test]
fn shift_enter_inserts_newline() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (doc, mut session) = single(Block::new(BlockKind::Code, "fn").with_id("a"));

    let outcome = controller.handle_key(
        &doc,
        &mut session,
        KeyInput::Enter { shift: true },
        PalettePoint::default(),
    );
    let change = outcome.change.unwrap();
    assert_eq!(change.blocks.len(), 1);
    assert_eq!(change.blocks[0].content, "fn\n");
    assert_eq!(change.kind, ChangeKind::Content(BlockId::from("a")));
}

#[test]
fn backspace_at_start_demotes_to_paragraph() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let doc = Document::new(vec![Block::new(BlockKind::Quote, "wise words").with_id("q")]).unwrap();
    let mut session = Session::default();
    session.focus(BlockId::from("q"), 0);

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::Backspace, PalettePoint::default());
    let blocks = outcome.change.unwrap().blocks;
    assert_eq!(blocks[0].kind, BlockKind::Paragraph);
    assert_eq!(blocks[0].content, "wise words");
    assert_eq!(blocks[0].id, BlockId::from("q"));

    let doc = Document::new(blocks).unwrap();
    let outcome = controller.handle_key(&doc, &mut session, KeyInput::Backspace, PalettePoint::default());
    assert!(outcome.handled);
    assert!(outcome.change.is_none());
}

#[test]
fn backspace_mid_text_deletes_a_char() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (doc, mut session) = single(Block::new(BlockKind::Heading1, "Title").with_id("h"));

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::Backspace, PalettePoint::default());
    let blocks = outcome.change.unwrap().blocks;
    assert_eq!(blocks[0].kind, BlockKind::Heading1);
    assert_eq!(blocks[0].content, "Titl");
}

#[test]
fn tab_is_swallowed() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let (doc, mut session) = single(Block::new(BlockKind::List, "item"));
    let before = session.clone();

    let outcome = controller.handle_key(&doc, &mut session, KeyInput::Tab, PalettePoint::default());
    assert!(outcome.handled);
    assert!(outcome.change.is_none());
    assert_eq!(session, before);
}

#[test]
fn arrows_move_focus_between_blocks() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let doc = Document::new(vec![
        Block::paragraph("first").with_id("a"),
        Block::paragraph("second").with_id("b"),
    ])
    .unwrap();
    let mut session = Session::default();
    session.focus(BlockId::from("b"), 3);

    controller.handle_key(&doc, &mut session, KeyInput::Up, PalettePoint::default());
    assert_eq!(session.focused_id(), Some(&BlockId::from("a")));
    assert_eq!(session.cursor(), Some(5));

    controller.handle_key(&doc, &mut session, KeyInput::Up, PalettePoint::default());
    assert_eq!(session.focused_id(), Some(&BlockId::from("a")));

    controller.handle_key(&doc, &mut session, KeyInput::Down, PalettePoint::default());
    assert_eq!(session.focused_id(), Some(&BlockId::from("b")));
    assert_eq!(session.cursor(), Some(0));

    controller.handle_key(&doc, &mut session, KeyInput::Escape, PalettePoint::default());
    assert_eq!(session.focused(), None);
}

#[test]
fn keys_without_focus_are_ignored() {
    let registry = BlockRegistry::standard();
    let controller = Controller::new(&registry);
    let doc = Document::default();
    let mut session = Session::default();
    let outcome = controller.handle_key(&doc, &mut session, KeyInput::text("x"), PalettePoint::default());
    assert!(!outcome.handled);
    assert!(outcome.change.is_none());
}
