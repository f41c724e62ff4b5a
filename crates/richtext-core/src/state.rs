//! Immutable, versioned editor state.
//!
//! # Overview
//!
//! An [`EditorState`] bundles everything needed to render and edit a document at one point in
//! time:
//!
//! - **Content**: the current [`Document`] snapshot
//! - **Selection**: a [`SelectionState`] that is always valid for that document
//! - **History**: bounded undo/redo stacks of earlier snapshots
//! - **Pending style**: an inline style override applied to the next typed characters
//!
//! States are never mutated. Every transition (`push`, `accept_selection`, `undo`, ...)
//! returns a new state with a bumped version, sharing unchanged parts with its predecessor.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{ChangeType, EditorConfig, EditorState, StyleSet};
//!
//! let state = EditorState::create_empty(&EditorConfig::default());
//! let (doc, cursor) = state
//!     .document()
//!     .insert_text(state.selection(), "Hello", &StyleSet::new(), None)
//!     .unwrap();
//! let typed = state.push(doc, cursor, ChangeType::InsertCharacters);
//! assert_eq!(typed.document().plain_text(), "Hello");
//!
//! let undone = typed.undo().unwrap();
//! assert_eq!(undone.document().plain_text(), "");
//! ```

use crate::config::EditorConfig;
use crate::document::{BlockType, Document, DocumentError};
use crate::history::{History, HistoryEntry};
use crate::selection::SelectionState;
use crate::style::StyleSet;
use std::sync::Arc;

/// Kind of content change recorded by [`EditorState::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    /// Characters typed at the cursor.
    InsertCharacters,
    /// Character removed before the cursor.
    BackspaceCharacter,
    /// Character removed after the cursor.
    DeleteCharacter,
    /// Pasted or dropped content.
    InsertFragment,
    /// A range was deleted.
    RemoveRange,
    /// A block was split in two.
    SplitBlock,
    /// Block data changed (e.g. alignment).
    ChangeBlockData,
    /// Block type changed.
    ChangeBlockType,
    /// Inline styles changed.
    ChangeInlineStyle,
    /// An entity was attached to text.
    ApplyEntity,
    /// An entity was moved.
    MoveEntity,
    /// Result of an undo.
    Undo,
    /// Result of a redo.
    Redo,
}

impl ChangeType {
    /// Whether consecutive changes of this type share one undo entry.
    pub fn coalesces(self) -> bool {
        matches!(
            self,
            ChangeType::InsertCharacters
                | ChangeType::BackspaceCharacter
                | ChangeType::DeleteCharacter
        )
    }
}

/// Immutable editor state snapshot.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Arc<Document>,
    selection: SelectionState,
    history: Arc<History>,
    inline_style_override: Option<StyleSet>,
    last_change: Option<ChangeType>,
    /// Whether the next coalescing push may join the newest undo entry.
    group_open: bool,
    version: u64,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::create_empty(&EditorConfig::default())
    }
}

impl EditorState {
    /// A state holding one empty unstyled block, cursor at offset 0.
    pub fn create_empty(config: &EditorConfig) -> Self {
        Self::create_with_document(Document::new(), config)
    }

    /// A state over `document`, cursor at the start of its first block.
    pub fn create_with_document(document: Document, config: &EditorConfig) -> Self {
        let selection = document.selection_at_start();
        Self {
            document: Arc::new(document),
            selection,
            history: Arc::new(History::new(config.max_undo_depth)),
            inline_style_override: None,
            last_change: None,
            group_open: false,
            version: 0,
        }
    }

    /// Current document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Shared handle to the current document.
    pub fn document_arc(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Undo/redo stacks.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Whether [`undo`](Self::undo) would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Monotonic state version (bumped by every transition).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Type of the last content change.
    pub fn last_change_type(&self) -> Option<ChangeType> {
        self.last_change
    }

    /// Pending style applied to the next typed characters, if any.
    pub fn inline_style_override(&self) -> Option<&StyleSet> {
        self.inline_style_override.as_ref()
    }

    fn successor(&self) -> Self {
        let mut next = self.clone();
        next.version = self.version.wrapping_add(1);
        next
    }

    /// Record a content change.
    ///
    /// The previous document and selection go onto the undo stack (unless the change
    /// coalesces with the previous one), redo is cleared and the inline override is dropped.
    /// Pushing a document equal to the current one records nothing and only moves the
    /// selection.
    pub fn push(
        &self,
        document: Document,
        selection: SelectionState,
        change_type: ChangeType,
    ) -> EditorState {
        if document == *self.document {
            if selection == self.selection {
                return self.clone();
            }
            return self.accept_selection(selection).unwrap_or_else(|err| {
                tracing::warn!(%err, "pushed selection is invalid; keeping the cursor");
                self.clone()
            });
        }
        let selection = match document.normalize(&selection) {
            Ok(_) => selection,
            Err(err) => {
                tracing::warn!(%err, "pushed selection is invalid; moving cursor to document end");
                document.selection_at_end().with_focus(selection.has_focus)
            }
        };

        let joins_group = self.group_open
            && change_type.coalesces()
            && self.last_change == Some(change_type)
            && self.history.can_undo();

        let mut next = self.successor();
        let history = Arc::make_mut(&mut next.history);
        if joins_group {
            history.clear_redo();
        } else {
            history.record(HistoryEntry {
                document: Arc::clone(&self.document),
                selection: self.selection.clone(),
            });
        }
        next.document = Arc::new(document);
        next.selection = selection;
        next.inline_style_override = None;
        next.last_change = Some(change_type);
        next.group_open = change_type.coalesces();
        next
    }

    /// Move the selection without recording history.
    ///
    /// Clears the inline override and closes the current undo group.
    pub fn accept_selection(&self, selection: SelectionState) -> Result<EditorState, DocumentError> {
        self.document.normalize(&selection)?;
        let mut next = self.successor();
        next.selection = selection;
        next.inline_style_override = None;
        next.group_open = false;
        Ok(next)
    }

    /// Like [`accept_selection`](Self::accept_selection), also giving the surface focus.
    pub fn force_selection(&self, selection: SelectionState) -> Result<EditorState, DocumentError> {
        self.accept_selection(selection.with_focus(true))
    }

    /// Set the styles applied to the next typed characters.
    pub fn set_inline_style_override(&self, styles: StyleSet) -> EditorState {
        let mut next = self.successor();
        next.inline_style_override = Some(styles);
        next
    }

    /// Force an undo boundary: the next coalescing push starts a new entry.
    pub fn end_undo_group(&self) -> EditorState {
        let mut next = self.clone();
        next.group_open = false;
        next
    }

    /// Restore the previous snapshot. `None` when there is nothing to undo.
    pub fn undo(&self) -> Option<EditorState> {
        let mut next = self.successor();
        let entry = Arc::make_mut(&mut next.history).step_back(self.current_entry())?;
        Some(next.restored(entry, ChangeType::Undo))
    }

    /// Re-apply the last undone snapshot. `None` when there is nothing to redo.
    pub fn redo(&self) -> Option<EditorState> {
        let mut next = self.successor();
        let entry = Arc::make_mut(&mut next.history).step_forward(self.current_entry())?;
        Some(next.restored(entry, ChangeType::Redo))
    }

    fn current_entry(&self) -> HistoryEntry {
        HistoryEntry {
            document: Arc::clone(&self.document),
            selection: self.selection.clone(),
        }
    }

    fn restored(mut self, entry: HistoryEntry, change_type: ChangeType) -> EditorState {
        let mut document = entry.document;
        // keys handed out on the abandoned branch are never reused
        if document.counters_behind(&self.document) {
            Arc::make_mut(&mut document).advance_counters(&self.document);
        }
        self.document = document;
        self.selection = entry.selection;
        self.inline_style_override = None;
        self.last_change = Some(change_type);
        self.group_open = false;
        self
    }

    /// Styles the next typed character would carry: the override if set, otherwise the
    /// style span of the selection.
    pub fn current_inline_style(&self) -> StyleSet {
        match &self.inline_style_override {
            Some(styles) => styles.clone(),
            None => self.document.style_span(&self.selection),
        }
    }

    /// Type of the block holding the selection start.
    pub fn current_block_type(&self) -> BlockType {
        self.document
            .normalize(&self.selection)
            .ok()
            .and_then(|range| self.document.blocks().get(range.start.block_index))
            .map(|block| block.block_type().clone())
            .unwrap_or(BlockType::Unstyled)
    }

    /// Check that the selection belongs to the document.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.document.normalize(&self.selection).map(|_| ())
    }
}
