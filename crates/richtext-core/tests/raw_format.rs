use pretty_assertions::assert_eq;
use richtext_core::{
    BOLD, BlockType, Document, ITALIC, Mutability, RawDocument, RawEntityRef, RawError,
    SelectionState, StyleSet,
};
use serde_json::json;

/// "Hi [image] there" with "Hi" bold, "there" italic and centered block data.
fn styled_document_with_image() -> Document {
    let document = Document::from_text("Hi there");
    let key = document.first_block().key().clone();
    let document = document
        .apply_inline_style(&SelectionState::range(key.clone(), 0, key.clone(), 2), BOLD)
        .unwrap();
    let document = document
        .apply_inline_style(&SelectionState::range(key.clone(), 3, key.clone(), 8), ITALIC)
        .unwrap();
    let document = document
        .set_block_data(&SelectionState::collapsed(key.clone(), 0), "alignment", json!("center"))
        .unwrap();
    let mut data = serde_json::Map::new();
    data.insert("src".into(), json!("data:image/png;base64,AAAA"));
    let (document, _, _) = document
        .insert_entity(&SelectionState::collapsed(key, 2), "INLINE_IMAGE", data)
        .unwrap();
    document
}

#[test]
fn test_roundtrip_preserves_styles_entities_and_data() {
    let document = styled_document_with_image();
    let json = document.to_json().unwrap();
    let restored = Document::from_json(&json).unwrap();

    assert_eq!(restored.plain_text(), document.plain_text());
    let before = document.first_block();
    let after = restored.first_block();
    assert_eq!(after.key(), before.key());
    assert_eq!(after.data(), before.data());
    for offset in 0..before.len() {
        assert_eq!(after.style_at(offset), before.style_at(offset));
    }

    let entity = after.entity_at(2).expect("image entity survives");
    let image = restored.entity(entity).unwrap();
    assert_eq!(image.entity_type(), "INLINE_IMAGE");
    assert_eq!(image.mutability(), Mutability::Immutable);
    assert_eq!(image.data().get("src"), Some(&json!("data:image/png;base64,AAAA")));
    // a second roundtrip is stable
    assert_eq!(restored.to_raw(), document.to_raw());
}

#[test]
fn test_raw_shape_uses_camel_case_and_numeric_entity_keys() {
    let raw = styled_document_with_image().to_raw();
    let value = serde_json::to_value(&raw).unwrap();
    let block = &value["blocks"][0];
    assert_eq!(block["type"], json!("unstyled"));
    assert_eq!(
        block["inlineStyleRanges"],
        json!([
            {"offset": 0, "length": 2, "style": "BOLD"},
            {"offset": 4, "length": 5, "style": "ITALIC"},
        ])
    );
    assert_eq!(block["entityRanges"], json!([{"offset": 2, "length": 1, "key": 0}]));
    assert_eq!(value["entityMap"]["0"]["mutability"], json!("IMMUTABLE"));
}

#[test]
fn test_unreferenced_entities_are_not_written() {
    let document = Document::from_text("plain");
    let (document, _) = document.create_entity("LINK", Mutability::Mutable, Default::default());
    assert_eq!(document.entities().len(), 1);
    assert!(document.to_raw().entity_map.is_empty());
}

#[test]
fn test_missing_fields_take_defaults() {
    let document = Document::from_json(
        r#"{"blocks": [{"text": "one"}, {"key": "x", "text": "two", "type": "header-two"}]}"#,
    )
    .unwrap();
    assert_eq!(document.block_count(), 2);
    assert_eq!(document.blocks()[0].block_type(), &BlockType::Unstyled);
    assert_eq!(document.blocks()[1].block_type(), &BlockType::HeaderTwo);
    assert_eq!(document.blocks()[1].key().as_str(), "x");
    assert!(!document.blocks()[0].key().as_str().is_empty());
}

#[test]
fn test_string_entity_keys_are_accepted() {
    let raw = RawDocument::from_json(
        r#"{
            "blocks": [{"key": "a", "text": "go", "entityRanges": [{"offset": 0, "length": 2, "key": "link"}]}],
            "entityMap": {"link": {"type": "LINK", "data": {"url": "https://example.com"}}}
        }"#,
    )
    .unwrap();
    assert_eq!(raw.blocks[0].entity_ranges[0].key, RawEntityRef::Key("link".into()));

    let document = Document::from_raw(&raw).unwrap();
    let entity = document.first_block().entity_at(1).unwrap();
    assert_eq!(document.entity(entity).unwrap().mutability(), Mutability::Mutable);
    // written back with a renumbered key
    let rewritten = document.to_raw();
    assert_eq!(rewritten.blocks[0].entity_ranges[0].key, RawEntityRef::Index(0));
}

#[test]
fn test_invalid_documents_are_rejected() {
    let duplicate = r#"{"blocks": [{"key": "a", "text": ""}, {"key": "a", "text": ""}]}"#;
    assert!(matches!(
        Document::from_json(duplicate),
        Err(RawError::DuplicateBlockKey(key)) if key == "a"
    ));

    let out_of_bounds =
        r#"{"blocks": [{"key": "a", "text": "ab", "inlineStyleRanges": [{"offset": 1, "length": 5, "style": "BOLD"}]}]}"#;
    assert!(matches!(
        Document::from_json(out_of_bounds),
        Err(RawError::RangeOutOfBounds { offset: 1, length: 5, len: 2, .. })
    ));

    let dangling =
        r#"{"blocks": [{"key": "a", "text": "ab", "entityRanges": [{"offset": 0, "length": 1, "key": 3}]}]}"#;
    assert!(matches!(
        Document::from_json(dangling),
        Err(RawError::DanglingEntity { .. })
    ));

    assert!(matches!(Document::from_json("{not json"), Err(RawError::Json(_))));
}

#[test]
fn test_styles_survive_in_plain_style_sets() {
    let document = Document::from_json(
        r#"{"blocks": [{"key": "a", "text": "abc", "inlineStyleRanges": [
            {"offset": 0, "length": 3, "style": "BOLD"},
            {"offset": 1, "length": 1, "style": "color-red"}
        ]}]}"#,
    )
    .unwrap();
    let expected: StyleSet = [BOLD, "color-red"].into_iter().collect();
    assert_eq!(document.first_block().style_at(1), &expected);
}
