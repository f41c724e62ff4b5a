use pretty_assertions::assert_eq;
use richtext_core::{BlockType, Document, Editor, EditorConfig, EditorState, SelectionState};
use richtext_core_formatting::toolbar::{ToolbarCommand, ToolbarState, apply, apply_to_editor};
use richtext_core_formatting::{Alignment, CommandError, default_pipeline};

fn select_first_block(state: &EditorState) -> EditorState {
    let block = state.document().first_block();
    let key = block.key().clone();
    state
        .accept_selection(SelectionState::range(key.clone(), 0, key, block.len()))
        .unwrap()
}

#[test]
fn test_toolbar_state_of_fresh_document() {
    let state = EditorState::create_empty(&EditorConfig::default());
    assert_eq!(
        ToolbarState::from_state(&state),
        ToolbarState {
            bold: false,
            italic: false,
            underline: false,
            alignment: None,
            color: None,
            font_size: None,
            block_type: BlockType::Unstyled,
            can_undo: false,
            can_redo: false,
        }
    );
}

#[test]
fn test_toggle_bold_twice_restores_plain_text() {
    let state = EditorState::create_with_document(
        Document::from_text("hello"),
        &EditorConfig::default(),
    );
    let state = select_first_block(&state);
    let bold = apply(&state, &ToolbarCommand::ToggleBold).unwrap();
    assert!(ToolbarState::from_state(&bold).bold);
    let plain = apply(&bold, &ToolbarCommand::ToggleBold).unwrap();
    assert!(!ToolbarState::from_state(&plain).bold);
    assert_eq!(plain.document(), state.document());
}

#[test]
fn test_font_size_and_clear_formatting() {
    let state = EditorState::create_with_document(
        Document::from_text("hello"),
        &EditorConfig::default(),
    );
    let state = select_first_block(&state);
    let state = apply(&state, &ToolbarCommand::SetFontSize("24".into())).unwrap();
    let state = apply(&state, &ToolbarCommand::ToggleItalic).unwrap();
    let toolbar = ToolbarState::from_state(&state);
    assert_eq!(toolbar.font_size.as_deref(), Some("24"));
    assert!(toolbar.italic);

    let state = apply(&state, &ToolbarCommand::ClearFormatting).unwrap();
    let toolbar = ToolbarState::from_state(&state);
    assert_eq!(toolbar.font_size, None);
    assert!(!toolbar.italic);
}

#[test]
fn test_block_type_toggles_back_to_unstyled() {
    let state = EditorState::create_with_document(
        Document::from_text("title"),
        &EditorConfig::default(),
    );
    let heading = apply(&state, &ToolbarCommand::SetBlockType(BlockType::HeaderOne)).unwrap();
    assert_eq!(ToolbarState::from_state(&heading).block_type, BlockType::HeaderOne);
    let plain = apply(&heading, &ToolbarCommand::SetBlockType(BlockType::HeaderOne)).unwrap();
    assert_eq!(ToolbarState::from_state(&plain).block_type, BlockType::Unstyled);
}

#[test]
fn test_undo_redo_through_toolbar() {
    let state = EditorState::create_with_document(
        Document::from_text("text"),
        &EditorConfig::default(),
    );
    let aligned = apply(&state, &ToolbarCommand::SetAlignment(Alignment::Right)).unwrap();
    let undone = apply(&aligned, &ToolbarCommand::Undo).unwrap();
    assert_eq!(ToolbarState::from_state(&undone).alignment, None);
    assert!(ToolbarState::from_state(&undone).can_redo);

    let redone = apply(&undone, &ToolbarCommand::Redo).unwrap();
    assert_eq!(
        ToolbarState::from_state(&redone).alignment,
        Some(Alignment::Right)
    );
    assert!(matches!(
        apply(&redone, &ToolbarCommand::Redo),
        Err(CommandError::NothingToRedo)
    ));
}

#[test]
fn test_read_only_editor_refuses_toolbar_commands() {
    let mut editor = Editor::with_document(
        default_pipeline(),
        Document::from_text("text"),
        EditorConfig::default().read_only(true),
    );
    let committed =
        apply_to_editor(&mut editor, &ToolbarCommand::SetAlignment(Alignment::Center)).unwrap();
    assert!(!committed);
    assert_eq!(editor.version(), 0);

    editor.set_read_only(false);
    assert!(apply_to_editor(&mut editor, &ToolbarCommand::SetAlignment(Alignment::Center)).unwrap());
    assert_eq!(
        ToolbarState::from_state(editor.state()).alignment,
        Some(Alignment::Center)
    );
}

#[test]
fn test_partially_bold_selection_is_not_active() {
    let state = EditorState::create_with_document(
        Document::from_text("abcd"),
        &EditorConfig::default(),
    );
    let key = state.document().first_block().key().clone();
    let half = state
        .accept_selection(SelectionState::range(key.clone(), 0, key, 2))
        .unwrap();
    let half = apply(&half, &ToolbarCommand::ToggleBold).unwrap();

    let whole = select_first_block(&half);
    assert!(!ToolbarState::from_state(&whole).bold);

    // the toggle agrees with the flag: it completes bold instead of removing it
    let whole = apply(&whole, &ToolbarCommand::ToggleBold).unwrap();
    assert!(ToolbarState::from_state(&whole).bold);
    let block = whole.document().first_block();
    assert!((0..block.len()).all(|offset| block.style_at(offset).contains(richtext_core::BOLD)));
}
