//! Selection model: an anchor/focus pair addressed by block key and character offset.

use crate::document::BlockKey;

/// Anchor/focus selection over a [`Document`](crate::Document).
///
/// `anchor` is where the selection started, `focus` where it currently ends. The
/// `is_backward` flag records directionality (focus before anchor in document order); it is
/// recomputed from real block positions by [`Document::normalize`](crate::Document::normalize).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionState {
    /// Block holding the anchor.
    pub anchor_key: BlockKey,
    /// Anchor offset (characters) within its block.
    pub anchor_offset: usize,
    /// Block holding the focus.
    pub focus_key: BlockKey,
    /// Focus offset (characters) within its block.
    pub focus_offset: usize,
    /// Whether the focus precedes the anchor.
    pub is_backward: bool,
    /// Whether the editor surface holds input focus.
    pub has_focus: bool,
}

impl SelectionState {
    /// A collapsed selection (cursor) at `offset` in `key`.
    pub fn collapsed(key: BlockKey, offset: usize) -> Self {
        Self {
            anchor_key: key.clone(),
            anchor_offset: offset,
            focus_key: key,
            focus_offset: offset,
            is_backward: false,
            has_focus: false,
        }
    }

    /// A ranged selection from `anchor` to `focus`.
    ///
    /// Directionality is unknown until the selection is normalized against a document.
    pub fn range(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        let is_backward = anchor_key == focus_key && focus_offset < anchor_offset;
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
            is_backward,
            has_focus: false,
        }
    }

    /// Whether anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Start block key (honours `is_backward`).
    pub fn start_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    /// Start offset (honours `is_backward`).
    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    /// End block key (honours `is_backward`).
    pub fn end_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    /// End offset (honours `is_backward`).
    pub fn end_offset(&self) -> usize {
        if self.is_backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    /// Copy with the focus flag set.
    pub fn with_focus(mut self, has_focus: bool) -> Self {
        self.has_focus = has_focus;
        self
    }

    /// Collapse onto the start point.
    pub fn collapse_to_start(&self) -> Self {
        Self::collapsed(self.start_key().clone(), self.start_offset()).with_focus(self.has_focus)
    }

    /// Collapse onto the end point.
    pub fn collapse_to_end(&self) -> Self {
        Self::collapsed(self.end_key().clone(), self.end_offset()).with_focus(self.has_focus)
    }
}

/// One end of a normalized selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPoint {
    /// Block key.
    pub key: BlockKey,
    /// Position of the block in document order.
    pub block_index: usize,
    /// Character offset within the block.
    pub offset: usize,
}

/// A selection resolved against a document: `start` never follows `end` in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRange {
    /// Earlier point.
    pub start: SelectionPoint,
    /// Later point.
    pub end: SelectionPoint,
    /// Whether the original focus preceded the anchor.
    pub is_backward: bool,
}

impl SelectionRange {
    /// Whether start and end coincide.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Whether the range covers exactly one block.
    pub fn is_single_block(&self) -> bool {
        self.start.block_index == self.end.block_index
    }

    /// Convert back into a forward selection state.
    pub fn to_selection(&self) -> SelectionState {
        SelectionState {
            anchor_key: self.start.key.clone(),
            anchor_offset: self.start.offset,
            focus_key: self.end.key.clone(),
            focus_offset: self.end.offset,
            is_backward: false,
            has_focus: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_selection_swaps_start_and_end() {
        let sel = SelectionState::range(BlockKey::new("a"), 4, BlockKey::new("a"), 1);
        assert!(sel.is_backward);
        assert_eq!(sel.start_offset(), 1);
        assert_eq!(sel.end_offset(), 4);
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_collapse_keeps_focus_flag() {
        let sel = SelectionState::range(BlockKey::new("a"), 0, BlockKey::new("b"), 2).with_focus(true);
        let end = sel.collapse_to_end();
        assert!(end.is_collapsed());
        assert!(end.has_focus);
        assert_eq!(end.focus_key, BlockKey::new("b"));
    }
}
