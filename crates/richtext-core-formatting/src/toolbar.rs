//! Toolbar command surface.
//!
//! [`ToolbarCommand`] names every action a formatting toolbar offers; [`apply`] runs one
//! against a state and [`ToolbarState`] reports what the toolbar should show as active.

use crate::CommandError;
use crate::alignment::{Alignment, get_alignment, set_alignment};
use crate::color::{get_color, set_color};
use crate::font_size::{get_font_size, set_font_size};
use richtext_core::commands::{
    has_inline_style, remove_all_inline_styles, toggle_block_type, toggle_inline_style,
};
use richtext_core::{BOLD, BlockType, Editor, EditorState, ITALIC, UNDERLINE};
use smol_str::SmolStr;

/// A toolbar action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarCommand {
    /// Toggle bold.
    ToggleBold,
    /// Toggle italic.
    ToggleItalic,
    /// Toggle underline.
    ToggleUnderline,
    /// Align the selected blocks.
    SetAlignment(Alignment),
    /// Color the selection.
    SetColor(SmolStr),
    /// Resize the selection.
    SetFontSize(SmolStr),
    /// Toggle a block type on the selected blocks.
    SetBlockType(BlockType),
    /// Strip every inline style.
    ClearFormatting,
    /// Undo.
    Undo,
    /// Redo.
    Redo,
}

/// Apply `command` to `state`.
pub fn apply(state: &EditorState, command: &ToolbarCommand) -> Result<EditorState, CommandError> {
    let next = match command {
        ToolbarCommand::ToggleBold => toggle_inline_style(state, BOLD)?,
        ToolbarCommand::ToggleItalic => toggle_inline_style(state, ITALIC)?,
        ToolbarCommand::ToggleUnderline => toggle_inline_style(state, UNDERLINE)?,
        ToolbarCommand::SetAlignment(alignment) => set_alignment(state, *alignment)?,
        ToolbarCommand::SetColor(color) => set_color(state, color)?,
        ToolbarCommand::SetFontSize(size) => set_font_size(state, size)?,
        ToolbarCommand::SetBlockType(block_type) => toggle_block_type(state, block_type)?,
        ToolbarCommand::ClearFormatting => remove_all_inline_styles(state)?,
        ToolbarCommand::Undo => state.undo().ok_or(CommandError::NothingToUndo)?,
        ToolbarCommand::Redo => state.redo().ok_or(CommandError::NothingToRedo)?,
    };
    Ok(next)
}

/// Apply `command` to the editor's current state and commit it.
///
/// Returns whether the commit was accepted (read-only editors refuse it).
pub fn apply_to_editor(editor: &mut Editor, command: &ToolbarCommand) -> Result<bool, CommandError> {
    let next = apply(editor.state(), command)?;
    Ok(editor.commit(next))
}

/// What the toolbar shows for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarState {
    /// Bold is active.
    pub bold: bool,
    /// Italic is active.
    pub italic: bool,
    /// Underline is active.
    pub underline: bool,
    /// Shared alignment of the selected blocks.
    pub alignment: Option<Alignment>,
    /// Shared color of the selection.
    pub color: Option<SmolStr>,
    /// Shared font size of the selection.
    pub font_size: Option<SmolStr>,
    /// Type of the block holding the selection start.
    pub block_type: BlockType,
    /// Undo is available.
    pub can_undo: bool,
    /// Redo is available.
    pub can_redo: bool,
}

impl ToolbarState {
    /// Read the toolbar state from `state`. A style shows as active exactly when its toggle
    /// would remove it.
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            bold: has_inline_style(state, BOLD),
            italic: has_inline_style(state, ITALIC),
            underline: has_inline_style(state, UNDERLINE),
            alignment: get_alignment(state),
            color: get_color(state),
            font_size: get_font_size(state),
            block_type: state.current_block_type(),
            can_undo: state.can_undo(),
            can_redo: state.can_redo(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::{Document, EditorConfig, SelectionState};

    fn selected_all(text: &str) -> EditorState {
        let state =
            EditorState::create_with_document(Document::from_text(text), &EditorConfig::default());
        let key = state.document().first_block().key().clone();
        let len = state.document().first_block().len();
        state
            .accept_selection(SelectionState::range(key.clone(), 0, key, len))
            .unwrap()
    }

    #[test]
    fn test_undo_with_empty_history_fails() {
        let state = selected_all("abc");
        assert!(matches!(
            apply(&state, &ToolbarCommand::Undo),
            Err(CommandError::NothingToUndo)
        ));
        assert!(matches!(
            apply(&state, &ToolbarCommand::Redo),
            Err(CommandError::NothingToRedo)
        ));
    }

    #[test]
    fn test_toolbar_state_reflects_commands() {
        let state = selected_all("abc");
        let state = apply(&state, &ToolbarCommand::ToggleBold).unwrap();
        let state = apply(&state, &ToolbarCommand::SetColor("red".into())).unwrap();
        let state = apply(&state, &ToolbarCommand::SetAlignment(Alignment::Justify)).unwrap();

        let toolbar = ToolbarState::from_state(&state);
        assert!(toolbar.bold);
        assert!(!toolbar.italic);
        assert_eq!(toolbar.color.as_deref(), Some("red"));
        assert_eq!(toolbar.alignment, Some(Alignment::Justify));
        assert_eq!(toolbar.font_size, None);
        assert!(toolbar.can_undo);
        assert!(!toolbar.can_redo);
    }
}
