//! Block alignment.
//!
//! Alignment lives in block data under [`ALIGNMENT_KEY`]. The extension exposes it to the
//! renderer as an `align-<value>` class name.

use richtext_core::commands::{set_block_data, uniform_value};
use richtext_core::{Block, DocumentError, EditorState, Extension};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::{SmolStr, format_smolstr};

/// Block data key holding the alignment.
pub const ALIGNMENT_KEY: &str = "alignment";

/// Horizontal alignment of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left aligned.
    Left,
    /// Centered.
    Center,
    /// Right aligned.
    Right,
    /// Justified.
    Justify,
}

impl Alignment {
    /// Stored name.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    /// Parse a stored name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// Alignment stored on `block`.
pub fn block_alignment(block: &Block) -> Option<Alignment> {
    block
        .data()
        .get(ALIGNMENT_KEY)
        .and_then(Value::as_str)
        .and_then(Alignment::parse)
}

/// Alignment shared by every selected block.
///
/// A block without alignment counts as "no value", so mixing aligned and unaligned blocks is
/// indeterminate.
pub fn get_alignment(state: &EditorState) -> Option<Alignment> {
    let blocks = state.document().selected_blocks(state.selection());
    uniform_value(blocks.iter().map(|block| block_alignment(block))).flatten()
}

/// Align every selected block.
pub fn set_alignment(state: &EditorState, alignment: Alignment) -> Result<EditorState, DocumentError> {
    set_block_data(state, ALIGNMENT_KEY, Value::from(alignment.as_str()))
}

/// Adds `align-<value>` class names.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignmentExtension;

impl Extension for AlignmentExtension {
    fn name(&self) -> &str {
        "alignment"
    }

    fn block_style(&self, block: &Block) -> Option<SmolStr> {
        block_alignment(block).map(|alignment| format_smolstr!("align-{}", alignment.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::{Document, EditorConfig, SelectionState};

    fn state(text: &str) -> EditorState {
        EditorState::create_with_document(Document::from_text(text), &EditorConfig::default())
    }

    #[test]
    fn test_set_then_get_alignment() {
        let state = set_alignment(&state("one"), Alignment::Center).unwrap();
        assert_eq!(get_alignment(&state), Some(Alignment::Center));
        let block = state.document().first_block();
        assert_eq!(
            AlignmentExtension.block_style(block).as_deref(),
            Some("align-center")
        );
    }

    #[test]
    fn test_mixed_alignment_is_indeterminate() {
        let state = state("one\ntwo");
        let first = state.document().blocks()[0].key().clone();
        let second = state.document().blocks()[1].key().clone();
        let state = set_alignment(&state, Alignment::Right).unwrap();
        let both = state
            .accept_selection(SelectionState::range(first, 0, second, 3))
            .unwrap();
        assert_eq!(get_alignment(&both), None);
    }

    #[test]
    fn test_spanning_selection_unifies_alignment() {
        let mut state = state("one\ntwo\nthree");
        let keys: Vec<_> = state
            .document()
            .blocks()
            .iter()
            .map(|block| block.key().clone())
            .collect();
        let alignments = [Alignment::Left, Alignment::Center, Alignment::Right];
        for (key, alignment) in keys.iter().zip(alignments) {
            state = state
                .accept_selection(SelectionState::collapsed(key.clone(), 0))
                .unwrap();
            state = set_alignment(&state, alignment).unwrap();
        }

        let spanning = state
            .accept_selection(SelectionState::range(keys[0].clone(), 1, keys[2].clone(), 2))
            .unwrap();
        assert_eq!(get_alignment(&spanning), None);

        let justified = set_alignment(&spanning, Alignment::Justify).unwrap();
        assert_eq!(get_alignment(&justified), Some(Alignment::Justify));
        for block in justified.document().blocks() {
            assert_eq!(block_alignment(block), Some(Alignment::Justify));
        }
    }
}
