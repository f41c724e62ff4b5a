//! Editing commands: state-to-state functions behind key bindings and toolbars.
//!
//! # Overview
//!
//! Commands take an [`EditorState`] and return the next one. They are the built-in behaviour
//! the [`Pipeline`](crate::Pipeline) falls back to once every extension declined an event:
//!
//! - **Key bindings**: [`default_key_binding`] maps a [`KeyEvent`] to a command name
//! - **Key commands**: [`handle_key_command`] runs a named command
//! - **Style commands**: inline style toggles and single-value style families
//! - **Text input**: typing, pasting, splitting and grapheme-aware deletion
//!
//! # Example
//!
//! ```rust
//! use richtext_core::commands::{handle_key_command, insert_characters};
//! use richtext_core::{EditorState, BOLD};
//!
//! let state = EditorState::default();
//! let state = handle_key_command(&state, "bold").unwrap().unwrap();
//! let state = insert_characters(&state, "loud").unwrap();
//! assert!(state.document().first_block().style_at(0).contains(BOLD));
//! ```

use crate::document::{BlockType, DocumentError, byte_index};
use crate::selection::SelectionState;
use crate::state::{ChangeType, EditorState};
use crate::style::{BOLD, CODE, ITALIC, STRIKETHROUGH, StyleFamily, StyleSet, UNDERLINE};
use serde_json::Value;
use smol_str::SmolStr;
use unicode_segmentation::UnicodeSegmentation;

/// Toggle bold.
pub const CMD_BOLD: &str = "bold";
/// Toggle italic.
pub const CMD_ITALIC: &str = "italic";
/// Toggle underline.
pub const CMD_UNDERLINE: &str = "underline";
/// Toggle inline code.
pub const CMD_CODE: &str = "code";
/// Toggle strikethrough.
pub const CMD_STRIKETHROUGH: &str = "strikethrough";
/// Delete backwards.
pub const CMD_BACKSPACE: &str = "backspace";
/// Delete forwards.
pub const CMD_DELETE: &str = "delete";
/// Undo.
pub const CMD_UNDO: &str = "undo";
/// Redo.
pub const CMD_REDO: &str = "redo";
/// Split the current block.
pub const CMD_SPLIT_BLOCK: &str = "split-block";

/// A keyboard event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Key name (`"b"`, `"Enter"`, `"Backspace"`, ...).
    pub key: SmolStr,
    /// Control held.
    pub ctrl: bool,
    /// Meta / command held.
    pub meta: bool,
    /// Shift held.
    pub shift: bool,
    /// Alt / option held.
    pub alt: bool,
}

impl KeyEvent {
    /// An event for `key` without modifiers.
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Copy with control held.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Copy with meta held.
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Copy with shift held.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Whether the platform command modifier (ctrl or meta) is held.
    pub fn has_command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Built-in key bindings.
pub fn default_key_binding(event: &KeyEvent) -> Option<SmolStr> {
    match event.key.as_str() {
        "Backspace" => return Some(SmolStr::new_static(CMD_BACKSPACE)),
        "Delete" => return Some(SmolStr::new_static(CMD_DELETE)),
        _ => {}
    }
    if !event.has_command_modifier() || event.alt {
        return None;
    }
    let command = match event.key.to_ascii_lowercase().as_str() {
        "b" => CMD_BOLD,
        "i" => CMD_ITALIC,
        "u" => CMD_UNDERLINE,
        "z" if event.shift => CMD_REDO,
        "z" => CMD_UNDO,
        "y" => CMD_REDO,
        _ => return None,
    };
    Some(SmolStr::new_static(command))
}

/// Run a built-in key command. `Ok(None)` when the command is unknown or has no effect.
pub fn handle_key_command(
    state: &EditorState,
    command: &str,
) -> Result<Option<EditorState>, DocumentError> {
    let tag = match command {
        CMD_BOLD => BOLD,
        CMD_ITALIC => ITALIC,
        CMD_UNDERLINE => UNDERLINE,
        CMD_CODE => CODE,
        CMD_STRIKETHROUGH => STRIKETHROUGH,
        CMD_BACKSPACE => return backspace(state),
        CMD_DELETE => return delete_forward(state),
        CMD_UNDO => return Ok(state.undo()),
        CMD_REDO => return Ok(state.redo()),
        CMD_SPLIT_BLOCK => return split_block(state).map(Some),
        _ => return Ok(None),
    };
    toggle_inline_style(state, tag).map(Some)
}

/// Toggle an inline style tag.
///
/// On a collapsed cursor the pending override is toggled. On a range the tag is removed when
/// every selected character carries it, and applied otherwise.
pub fn toggle_inline_style(state: &EditorState, tag: &str) -> Result<EditorState, DocumentError> {
    let selection = state.selection();
    let active = has_inline_style(state, tag);
    if selection.is_collapsed() {
        let current = state.current_inline_style();
        let next = if active {
            current.without(tag)
        } else {
            current.with(tag)
        };
        return Ok(state.set_inline_style_override(next));
    }

    let document = state.document();
    let next = if active {
        document.remove_inline_style(selection, tag)?
    } else {
        document.apply_inline_style(selection, tag)?
    };
    Ok(state.push(next, selection.clone(), ChangeType::ChangeInlineStyle))
}

/// Whether a toggle of `tag` would remove it: the cursor style carries it, or every selected
/// character does.
pub fn has_inline_style(state: &EditorState, tag: &str) -> bool {
    let selection = state.selection();
    if selection.is_collapsed() {
        return state.current_inline_style().contains(tag);
    }
    let mut characters = state
        .document()
        .selected_ranges(selection)
        .into_iter()
        .flat_map(|(block, range)| block.characters()[range].iter())
        .peekable();
    characters.peek().is_some() && characters.all(|meta| meta.style.contains(tag))
}

/// Replace every tag of `family` in the selection with `value` (or just strip them on `None`).
pub fn set_single_value_style(
    state: &EditorState,
    family: StyleFamily,
    value: Option<&str>,
) -> Result<EditorState, DocumentError> {
    let tag = value.map(|value| family.tag(value));
    let selection = state.selection();
    if selection.is_collapsed() {
        let mut styles = state.current_inline_style();
        styles.retain_outside(family);
        if let Some(tag) = &tag {
            styles.insert(tag.clone());
        }
        return Ok(state.set_inline_style_override(styles));
    }

    let next = state.document().map_character_styles(selection, |style| {
        let before = style.clone();
        style.retain_outside(family);
        if let Some(tag) = &tag {
            style.insert(tag.clone());
        }
        *style != before
    })?;
    Ok(state.push(next, selection.clone(), ChangeType::ChangeInlineStyle))
}

/// The value of `family` shared by the whole selection.
///
/// Every selected character is a candidate (a character without the family counts as "no
/// value"); `None` unless all candidates agree on one value. A collapsed cursor reads the
/// current inline style.
pub fn single_value_style(state: &EditorState, family: StyleFamily) -> Option<SmolStr> {
    let selection = state.selection();
    if !selection.is_collapsed() {
        let ranges = state.document().selected_ranges(selection);
        let candidates = ranges
            .iter()
            .flat_map(|(block, range)| block.characters()[range.clone()].iter())
            .map(|meta| family.find(&meta.style));
        if let Some(uniform) = uniform_value(candidates) {
            return uniform.map(SmolStr::new);
        }
        if ranges.iter().any(|(_, range)| !range.is_empty()) {
            return None;
        }
    }
    family.find(&state.current_inline_style()).map(SmolStr::new)
}

/// `Some(v)` when every candidate equals `v`; `None` for mixed or no candidates.
pub fn uniform_value<T: PartialEq>(candidates: impl IntoIterator<Item = T>) -> Option<T> {
    let mut candidates = candidates.into_iter();
    let first = candidates.next()?;
    for candidate in candidates {
        if candidate != first {
            return None;
        }
    }
    Some(first)
}

/// Strip every inline style from the selection (or clear the pending override).
pub fn remove_all_inline_styles(state: &EditorState) -> Result<EditorState, DocumentError> {
    let selection = state.selection();
    if selection.is_collapsed() {
        return Ok(state.set_inline_style_override(StyleSet::new()));
    }
    let next = state.document().map_character_styles(selection, |style| {
        let changed = !style.is_empty();
        *style = StyleSet::new();
        changed
    })?;
    Ok(state.push(next, selection.clone(), ChangeType::ChangeInlineStyle))
}

/// Set `block_type` on the selected blocks, or reset them to unstyled if they already have it.
pub fn toggle_block_type(
    state: &EditorState,
    block_type: &BlockType,
) -> Result<EditorState, DocumentError> {
    let target = if &state.current_block_type() == block_type {
        BlockType::Unstyled
    } else {
        block_type.clone()
    };
    let next = state.document().set_block_type(state.selection(), &target)?;
    Ok(state.push(next, state.selection().clone(), ChangeType::ChangeBlockType))
}

/// Set one block data entry on every selected block.
pub fn set_block_data(
    state: &EditorState,
    key: &str,
    value: Value,
) -> Result<EditorState, DocumentError> {
    let next = state.document().set_block_data(state.selection(), key, value)?;
    Ok(state.push(next, state.selection().clone(), ChangeType::ChangeBlockData))
}

/// Type `text` at the selection with the current inline style.
pub fn insert_characters(state: &EditorState, text: &str) -> Result<EditorState, DocumentError> {
    let style = state.current_inline_style();
    let (next, cursor) = state
        .document()
        .insert_text(state.selection(), text, &style, None)?;
    Ok(state.push(next, cursor, ChangeType::InsertCharacters))
}

/// Paste plain text; each line after the first becomes a new block.
pub fn paste_text(state: &EditorState, text: &str) -> Result<EditorState, DocumentError> {
    let style = state.current_inline_style();
    let (next, cursor) = state
        .document()
        .insert_text(state.selection(), text, &style, None)?;
    Ok(state.push(next, cursor, ChangeType::InsertFragment))
}

/// Split the block at the selection.
pub fn split_block(state: &EditorState) -> Result<EditorState, DocumentError> {
    let (next, cursor) = state.document().split_block(state.selection())?;
    Ok(state.push(next, cursor, ChangeType::SplitBlock))
}

/// Delete the selection, or the grapheme before the cursor.
///
/// At the start of a styled block the block is reset to unstyled first; at the start of an
/// unstyled block it is joined onto the previous one.
pub fn backspace(state: &EditorState) -> Result<Option<EditorState>, DocumentError> {
    let selection = state.selection();
    let document = state.document();
    if !selection.is_collapsed() {
        let (next, cursor) = document.remove_range(selection)?;
        return Ok(Some(state.push(next, cursor, ChangeType::RemoveRange)));
    }

    let range = document.normalize(selection)?;
    let block = &document.blocks()[range.start.block_index];
    let offset = range.start.offset;
    let removal = if offset > 0 {
        let start = previous_grapheme_start(block.text(), offset);
        SelectionState::range(block.key().clone(), start, block.key().clone(), offset)
    } else if block.block_type() != &BlockType::Unstyled {
        let next = document.set_block_type(selection, &BlockType::Unstyled)?;
        return Ok(Some(state.push(
            next,
            selection.clone(),
            ChangeType::ChangeBlockType,
        )));
    } else if let Some(previous) = document.block_before(block.key()) {
        SelectionState::range(previous.key().clone(), previous.len(), block.key().clone(), 0)
    } else {
        return Ok(None);
    };

    let (next, cursor) = document.remove_range(&removal.with_focus(selection.has_focus))?;
    Ok(Some(state.push(next, cursor, ChangeType::BackspaceCharacter)))
}

/// Delete the selection, or the grapheme after the cursor (joining the next block at the end).
pub fn delete_forward(state: &EditorState) -> Result<Option<EditorState>, DocumentError> {
    let selection = state.selection();
    let document = state.document();
    if !selection.is_collapsed() {
        let (next, cursor) = document.remove_range(selection)?;
        return Ok(Some(state.push(next, cursor, ChangeType::RemoveRange)));
    }

    let range = document.normalize(selection)?;
    let block = &document.blocks()[range.start.block_index];
    let offset = range.start.offset;
    let removal = if offset < block.len() {
        let end = next_grapheme_end(block.text(), offset);
        SelectionState::range(block.key().clone(), offset, block.key().clone(), end)
    } else if let Some(following) = document.block_after(block.key()) {
        SelectionState::range(block.key().clone(), offset, following.key().clone(), 0)
    } else {
        return Ok(None);
    };

    let (next, cursor) = document.remove_range(&removal.with_focus(selection.has_focus))?;
    Ok(Some(state.push(next, cursor, ChangeType::DeleteCharacter)))
}

fn previous_grapheme_start(text: &str, offset: usize) -> usize {
    let byte = byte_index(text, offset);
    let start = text[..byte]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(index, _)| index);
    text[..start].chars().count()
}

fn next_grapheme_end(text: &str, offset: usize) -> usize {
    let byte = byte_index(text, offset);
    let width = text[byte..]
        .graphemes(true)
        .next()
        .map_or(0, |grapheme| grapheme.chars().count());
    offset + width
}
