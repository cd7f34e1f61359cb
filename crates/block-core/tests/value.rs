use gpui_block_core::{BlockKind, BlockValue, DocumentError, ValueError};

#[test]
fn envelope_round_trips_through_json() {
    let value = BlockValue::from_json_str(
        &serde_json::json!({
            "schema": "gpui-block-editor",
            "version": 1,
            "blocks": [
                { "id": "a", "type": "heading1", "content": "Title" },
                { "id": "b", "type": "image", "content": "", "imageUrl": "data:image/png;base64,AA==" },
                { "id": "c", "type": "orderedList", "content": "step" }
            ]
        })
        .to_string(),
    )
    .unwrap();

    let doc = value.clone().into_document().unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.blocks()[1].kind, BlockKind::Image);
    assert_eq!(
        doc.blocks()[1].image_url.as_deref(),
        Some("data:image/png;base64,AA==")
    );

    let json: serde_json::Value =
        serde_json::from_str(&BlockValue::from_document(&doc).to_json_pretty().unwrap()).unwrap();
    assert_eq!(json["blocks"][0]["type"], "heading1");
    assert_eq!(json["blocks"][2]["type"], "orderedList");
    assert!(json["blocks"][0].get("imageUrl").is_none());
}

#[test]
fn bare_arrays_and_missing_fields_are_accepted() {
    let value = BlockValue::from_json_str(r#"[{ "id": "a", "type": "quote" }]"#).unwrap();
    assert_eq!(value.schema, "gpui-block-editor");
    assert_eq!(value.version, 1);
    assert_eq!(value.blocks[0].content, "");

    let doc = BlockValue::from_json_str("[]").unwrap().into_document().unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.blocks()[0].kind, BlockKind::Paragraph);
}

#[test]
fn unknown_types_are_rejected() {
    let err = BlockValue::from_json_str(r#"[{ "id": "a", "type": "table" }]"#).unwrap_err();
    assert!(matches!(err, ValueError::Json(_)));
}

#[test]
fn duplicate_ids_fail_validation() {
    let value = BlockValue::from_json_str(
        r#"{ "blocks": [{ "id": "a", "type": "paragraph" }, { "id": "a", "type": "code" }] }"#,
    )
    .unwrap();
    let err = value.into_document().unwrap_err();
    assert!(matches!(
        err,
        ValueError::Document(DocumentError::DuplicateId(_))
    ));
}
