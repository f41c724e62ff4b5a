//! Document model: an immutable sequence of styled text blocks plus an entity registry.
//!
//! A [`Document`] is never mutated once it is shared. Every transform (see the
//! [`modifier`](crate::modifier) methods) returns a new `Document` that shares the blocks it did
//! not touch through `Arc`, so snapshots kept by the undo history stay cheap.
//!
//! Offsets are character offsets (Unicode scalar values) within a block.

use crate::selection::{SelectionPoint, SelectionRange, SelectionState};
use crate::style::{EMPTY_STYLE, StyleSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::{SmolStr, format_smolstr};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

/// Arbitrary block-level data (e.g. `{"alignment": "center"}`).
pub type BlockData = serde_json::Map<String, Value>;

/// Opaque entity payload (e.g. `{"src": "x.png"}`).
pub type EntityData = serde_json::Map<String, Value>;

/// Registry of every entity owned by a document.
pub type EntityMap = BTreeMap<EntityKey, Arc<Entity>>;

/// Errors raised when a transform is given a selection or key the document does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The block key does not exist in the document.
    #[error("unknown block key: {0}")]
    UnknownBlock(BlockKey),
    /// The offset is past the end of the block.
    #[error("offset {offset} is out of range for block {key} (length {len})")]
    OffsetOutOfRange {
        /// Block key.
        key: BlockKey,
        /// Requested offset.
        offset: usize,
        /// Block length in characters.
        len: usize,
    },
    /// The entity key does not exist in the registry.
    #[error("unknown entity key: {0}")]
    UnknownEntity(EntityKey),
    /// The entity exists but no character references it.
    #[error("entity {0} is not referenced by any character")]
    EntityNotReferenced(EntityKey),
    /// Two blocks share one key.
    #[error("duplicate block key: {0}")]
    DuplicateBlockKey(BlockKey),
    /// A block's character metadata does not line up with its text.
    #[error("block {key} has {characters} character entries for {len} characters")]
    CharacterCountMismatch {
        /// Block key.
        key: BlockKey,
        /// Number of metadata entries.
        characters: usize,
        /// Text length in characters.
        len: usize,
    },
}

/// Stable block identifier, used for selection addressing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(SmolStr);

impl BlockKey {
    /// Wrap a key string.
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity registry key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(SmolStr);

impl EntityKey {
    /// Wrap a key string.
    pub fn new(key: impl Into<SmolStr>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block type, serialized with the conventional kebab-case names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "SmolStr", into = "SmolStr")]
pub enum BlockType {
    /// Plain paragraph (`unstyled`).
    Unstyled,
    /// `<p>` paragraph.
    Paragraph,
    /// Level 1 heading.
    HeaderOne,
    /// Level 2 heading.
    HeaderTwo,
    /// Level 3 heading.
    HeaderThree,
    /// Level 4 heading.
    HeaderFour,
    /// Level 5 heading.
    HeaderFive,
    /// Level 6 heading.
    HeaderSix,
    /// Block quote.
    Blockquote,
    /// Code block.
    CodeBlock,
    /// Bulleted list item.
    UnorderedListItem,
    /// Numbered list item.
    OrderedListItem,
    /// Atomic (media) block.
    Atomic,
    /// Any other, host-defined type.
    Custom(SmolStr),
}

impl BlockType {
    /// Serialized name.
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Paragraph => "paragraph",
            BlockType::HeaderOne => "header-one",
            BlockType::HeaderTwo => "header-two",
            BlockType::HeaderThree => "header-three",
            BlockType::HeaderFour => "header-four",
            BlockType::HeaderFive => "header-five",
            BlockType::HeaderSix => "header-six",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::Atomic => "atomic",
            BlockType::Custom(name) => name,
        }
    }

    /// Whether this is one of the list item types.
    pub fn is_list_item(&self) -> bool {
        matches!(
            self,
            BlockType::UnorderedListItem | BlockType::OrderedListItem
        )
    }
}

impl From<&str> for BlockType {
    fn from(name: &str) -> Self {
        match name {
            "unstyled" => BlockType::Unstyled,
            "paragraph" => BlockType::Paragraph,
            "header-one" => BlockType::HeaderOne,
            "header-two" => BlockType::HeaderTwo,
            "header-three" => BlockType::HeaderThree,
            "header-four" => BlockType::HeaderFour,
            "header-five" => BlockType::HeaderFive,
            "header-six" => BlockType::HeaderSix,
            "blockquote" => BlockType::Blockquote,
            "code-block" => BlockType::CodeBlock,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            "atomic" => BlockType::Atomic,
            other => BlockType::Custom(SmolStr::new(other)),
        }
    }
}

impl From<SmolStr> for BlockType {
    fn from(name: SmolStr) -> Self {
        BlockType::from(name.as_str())
    }
}

impl From<BlockType> for SmolStr {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Custom(name) => name,
            other => SmolStr::new(other.as_str()),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-character annotations: style tags and an optional entity reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMetadata {
    /// Inline style tags.
    pub style: StyleSet,
    /// Entity carried by this character.
    pub entity: Option<EntityKey>,
}

impl CharacterMetadata {
    /// Metadata with the given styles and entity.
    pub fn new(style: StyleSet, entity: Option<EntityKey>) -> Self {
        Self { style, entity }
    }
}

/// How an entity reacts to edits touching its characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    /// Text may be edited freely; the entity stays attached.
    Mutable,
    /// The entity's characters are removed as a whole.
    Immutable,
    /// Removal works by whitespace-delimited segments.
    Segmented,
}

/// An out-of-line object (e.g. an image) referenced from character positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    entity_type: SmolStr,
    mutability: Mutability,
    data: EntityData,
}

impl Entity {
    /// Create an entity.
    pub fn new(entity_type: impl Into<SmolStr>, mutability: Mutability, data: EntityData) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }

    /// Type tag (e.g. `INLINE_IMAGE`).
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Mutability class.
    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Payload.
    pub fn data(&self) -> &EntityData {
        &self.data
    }
}

/// One paragraph / list item: text, per-character metadata, type and block data.
///
/// Invariant: `characters.len()` equals the number of characters in `text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub(crate) key: BlockKey,
    pub(crate) block_type: BlockType,
    pub(crate) text: String,
    pub(crate) characters: Vec<CharacterMetadata>,
    pub(crate) depth: u8,
    pub(crate) data: BlockData,
}

impl Block {
    /// Create a block whose characters carry no style or entity.
    pub fn new(key: BlockKey, block_type: BlockType, text: impl Into<String>) -> Self {
        let text = text.into();
        let characters = vec![CharacterMetadata::default(); text.chars().count()];
        Self {
            key,
            block_type,
            text,
            characters,
            depth: 0,
            data: BlockData::new(),
        }
    }

    /// Create a block with explicit character metadata.
    pub fn with_characters(
        key: BlockKey,
        block_type: BlockType,
        text: impl Into<String>,
        characters: Vec<CharacterMetadata>,
    ) -> Result<Self, DocumentError> {
        let text = text.into();
        let len = text.chars().count();
        if characters.len() != len {
            return Err(DocumentError::CharacterCountMismatch {
                key,
                characters: characters.len(),
                len,
            });
        }
        Ok(Self {
            key,
            block_type,
            text,
            characters,
            depth: 0,
            data: BlockData::new(),
        })
    }

    /// Copy with the given nesting depth.
    pub fn with_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    /// Copy with the given block data.
    pub fn with_data(mut self, data: BlockData) -> Self {
        self.data = data;
        self
    }

    /// Block key.
    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    /// Block type.
    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    /// Text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Per-character metadata.
    pub fn characters(&self) -> &[CharacterMetadata] {
        &self.characters
    }

    /// Nesting depth (list indentation).
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Block-level data.
    pub fn data(&self) -> &BlockData {
        &self.data
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Whether the block holds no text.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Style tags at `offset` (empty past the end).
    pub fn style_at(&self, offset: usize) -> &StyleSet {
        self.characters
            .get(offset)
            .map(|meta| &meta.style)
            .unwrap_or(&EMPTY_STYLE)
    }

    /// Entity at `offset`, if any.
    pub fn entity_at(&self, offset: usize) -> Option<&EntityKey> {
        self.characters.get(offset).and_then(|meta| meta.entity.as_ref())
    }

    /// Maximal runs of characters carrying the same entity, for entities accepted by `filter`.
    pub fn find_entity_ranges(
        &self,
        mut filter: impl FnMut(&EntityKey) -> bool,
    ) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut run: Option<(usize, &EntityKey)> = None;
        for (offset, meta) in self.characters.iter().enumerate() {
            let current = meta.entity.as_ref();
            if let Some((start, key)) = run
                && current != Some(key)
            {
                ranges.push(start..offset);
                run = None;
            }
            if run.is_none()
                && let Some(key) = current
                && filter(key)
            {
                run = Some((offset, key));
            }
        }
        if let Some((start, _)) = run {
            ranges.push(start..self.characters.len());
        }
        ranges
    }

    /// Maximal runs of characters carrying `tag`.
    pub fn find_style_ranges(&self, tag: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start: Option<usize> = None;
        for (offset, meta) in self.characters.iter().enumerate() {
            match (start, meta.style.contains(tag)) {
                (None, true) => start = Some(offset),
                (Some(s), false) => {
                    ranges.push(s..offset);
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            ranges.push(s..self.characters.len());
        }
        ranges
    }

    /// The run of characters sharing the entity found at `offset`.
    pub(crate) fn entity_run_at(&self, offset: usize) -> Option<Range<usize>> {
        let key = self.entity_at(offset)?;
        let mut start = offset;
        while start > 0 && self.entity_at(start - 1) == Some(key) {
            start -= 1;
        }
        let mut end = offset + 1;
        while end < self.len() && self.entity_at(end) == Some(key) {
            end += 1;
        }
        Some(start..end)
    }

    /// Text and metadata of a character range.
    pub(crate) fn slice(&self, range: Range<usize>) -> (String, Vec<CharacterMetadata>) {
        let start = byte_index(&self.text, range.start);
        let end = byte_index(&self.text, range.end);
        (
            self.text[start..end].to_string(),
            self.characters[range].to_vec(),
        )
    }

    /// Same key, type, depth and data with new content.
    pub(crate) fn rebuilt(&self, text: String, characters: Vec<CharacterMetadata>) -> Block {
        Block {
            key: self.key.clone(),
            block_type: self.block_type.clone(),
            text,
            characters,
            depth: self.depth,
            data: self.data.clone(),
        }
    }
}

/// Byte index of the character at `offset` (or the text length past the end).
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// An ordered sequence of blocks plus the entity registry they reference.
///
/// Invariants:
/// - there is always at least one block;
/// - block keys are unique;
/// - every entity key referenced by a character exists in the registry.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) blocks: Vec<Arc<Block>>,
    pub(crate) entities: Arc<EntityMap>,
    next_block_key: u64,
    next_entity_key: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
            && (Arc::ptr_eq(&self.entities, &other.entities) || self.entities == other.entities)
    }
}

impl Document {
    /// An empty document: a single empty unstyled block.
    pub fn new() -> Self {
        let mut document = Self {
            blocks: Vec::with_capacity(1),
            entities: Arc::default(),
            next_block_key: 0,
            next_entity_key: 0,
        };
        let key = document.generate_block_key();
        document
            .blocks
            .push(Arc::new(Block::new(key, BlockType::Unstyled, "")));
        document
    }

    /// One unstyled block per line of `text`.
    pub fn from_text(text: &str) -> Self {
        let mut document = Self {
            blocks: Vec::new(),
            entities: Arc::default(),
            next_block_key: 0,
            next_entity_key: 0,
        };
        for line in text.split('\n') {
            let key = document.generate_block_key();
            let line = line.strip_suffix('\r').unwrap_or(line);
            document
                .blocks
                .push(Arc::new(Block::new(key, BlockType::Unstyled, line)));
        }
        document
    }

    /// Assemble a document from blocks and an entity registry, checking every invariant.
    ///
    /// An empty block list yields a single empty block.
    pub fn from_blocks(blocks: Vec<Block>, entities: EntityMap) -> Result<Self, DocumentError> {
        let mut seen = std::collections::HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.key.clone()) {
                return Err(DocumentError::DuplicateBlockKey(block.key.clone()));
            }
            let len = block.text.chars().count();
            if block.characters.len() != len {
                return Err(DocumentError::CharacterCountMismatch {
                    key: block.key.clone(),
                    characters: block.characters.len(),
                    len,
                });
            }
            if let Some(missing) = block
                .characters
                .iter()
                .filter_map(|meta| meta.entity.as_ref())
                .find(|key| !entities.contains_key(*key))
            {
                return Err(DocumentError::UnknownEntity(missing.clone()));
            }
        }

        let next_block_key = blocks
            .iter()
            .filter_map(|block| numeric_suffix(block.key.as_str(), "b"))
            .max()
            .map_or(0, |n| n + 1);
        let next_entity_key = entities
            .keys()
            .filter_map(|key| numeric_suffix(key.as_str(), ""))
            .max()
            .map_or(0, |n| n + 1);

        let mut document = Self {
            blocks: blocks.into_iter().map(Arc::new).collect(),
            entities: Arc::new(entities),
            next_block_key,
            next_entity_key,
        };
        if document.blocks.is_empty() {
            let key = document.generate_block_key();
            document
                .blocks
                .push(Arc::new(Block::new(key, BlockType::Unstyled, "")));
        }
        Ok(document)
    }

    /// Blocks in document order.
    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// First block.
    pub fn first_block(&self) -> &Arc<Block> {
        &self.blocks[0]
    }

    /// Last block.
    pub fn last_block(&self) -> &Arc<Block> {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Block with `key`.
    pub fn block_for_key(&self, key: &BlockKey) -> Option<&Arc<Block>> {
        self.blocks.iter().find(|block| &block.key == key)
    }

    /// Position of the block with `key` in document order.
    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| &block.key == key)
    }

    /// Block preceding `key`.
    pub fn block_before(&self, key: &BlockKey) -> Option<&Arc<Block>> {
        let index = self.block_index(key)?;
        index.checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    /// Block following `key`.
    pub fn block_after(&self, key: &BlockKey) -> Option<&Arc<Block>> {
        let index = self.block_index(key)?;
        self.blocks.get(index + 1)
    }

    /// Entity registered under `key`.
    pub fn entity(&self, key: &EntityKey) -> Option<&Arc<Entity>> {
        self.entities.get(key)
    }

    /// The whole entity registry.
    pub fn entities(&self) -> &EntityMap {
        &self.entities
    }

    /// Blocks joined with `\n`.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Cursor at the start of the document.
    pub fn selection_at_start(&self) -> SelectionState {
        SelectionState::collapsed(self.first_block().key.clone(), 0)
    }

    /// Cursor at the end of the document.
    pub fn selection_at_end(&self) -> SelectionState {
        let last = self.last_block();
        SelectionState::collapsed(last.key.clone(), last.len())
    }

    /// Resolve a selection into start/end points ordered by block position.
    pub fn normalize(&self, selection: &SelectionState) -> Result<SelectionRange, DocumentError> {
        let anchor = self.point(&selection.anchor_key, selection.anchor_offset)?;
        let focus = self.point(&selection.focus_key, selection.focus_offset)?;
        let is_backward = (focus.block_index, focus.offset) < (anchor.block_index, anchor.offset);
        Ok(if is_backward {
            SelectionRange {
                start: focus,
                end: anchor,
                is_backward,
            }
        } else {
            SelectionRange {
                start: anchor,
                end: focus,
                is_backward,
            }
        })
    }

    fn point(&self, key: &BlockKey, offset: usize) -> Result<SelectionPoint, DocumentError> {
        let block_index = self
            .block_index(key)
            .ok_or_else(|| DocumentError::UnknownBlock(key.clone()))?;
        let len = self.blocks[block_index].len();
        if offset > len {
            return Err(DocumentError::OffsetOutOfRange {
                key: key.clone(),
                offset,
                len,
            });
        }
        Ok(SelectionPoint {
            key: key.clone(),
            block_index,
            offset,
        })
    }

    /// Every block from the selection start through its end, in document order.
    ///
    /// Empty when the selection does not belong to this document.
    pub fn selected_blocks(&self, selection: &SelectionState) -> &[Arc<Block>] {
        match self.normalize(selection) {
            Ok(range) => &self.blocks[range.start.block_index..=range.end.block_index],
            Err(_) => &[],
        }
    }

    /// Each selected block with the character range the selection covers in it.
    pub fn selected_ranges(&self, selection: &SelectionState) -> Vec<(&Arc<Block>, Range<usize>)> {
        let Ok(range) = self.normalize(selection) else {
            return Vec::new();
        };
        self.ranges_of(&range)
    }

    pub(crate) fn ranges_of(&self, range: &SelectionRange) -> Vec<(&Arc<Block>, Range<usize>)> {
        (range.start.block_index..=range.end.block_index)
            .map(|index| {
                let block = &self.blocks[index];
                let start = if index == range.start.block_index {
                    range.start.offset
                } else {
                    0
                };
                let end = if index == range.end.block_index {
                    range.end.offset
                } else {
                    block.len()
                };
                (block, start..end)
            })
            .collect()
    }

    /// Union of every style tag touched by the selection.
    ///
    /// For a collapsed selection this is the style the cursor carries (see
    /// [`style_at_cursor`](Self::style_at_cursor)).
    pub fn style_span(&self, selection: &SelectionState) -> StyleSet {
        let Ok(range) = self.normalize(selection) else {
            return StyleSet::new();
        };
        if range.is_collapsed() {
            return self.style_at_index(range.start.block_index, range.start.offset);
        }
        let mut styles = StyleSet::new();
        for (block, chars) in self.ranges_of(&range) {
            for meta in &block.characters[chars] {
                styles.extend_from(&meta.style);
            }
        }
        styles
    }

    /// Style carried by a cursor: the character before it, else the first character of the
    /// block, else the last character of the nearest earlier non-empty block.
    pub fn style_at_cursor(&self, key: &BlockKey, offset: usize) -> StyleSet {
        match self.block_index(key) {
            Some(index) => self.style_at_index(index, offset),
            None => StyleSet::new(),
        }
    }

    fn style_at_index(&self, index: usize, offset: usize) -> StyleSet {
        let block = &self.blocks[index];
        if offset > 0 {
            return block.style_at(offset - 1).clone();
        }
        if !block.is_empty() {
            return block.style_at(0).clone();
        }
        self.blocks[..index]
            .iter()
            .rev()
            .find(|block| !block.is_empty())
            .map(|block| block.style_at(block.len() - 1).clone())
            .unwrap_or_default()
    }

    /// Block key and character range of the first run carrying `entity`.
    pub fn entity_range(&self, entity: &EntityKey) -> Option<(BlockKey, Range<usize>)> {
        self.blocks.iter().find_map(|block| {
            block
                .find_entity_ranges(|key| key == entity)
                .into_iter()
                .next()
                .map(|range| (block.key.clone(), range))
        })
    }

    /// Number of characters referencing `entity`.
    pub fn entity_reference_count(&self, entity: &EntityKey) -> usize {
        self.blocks
            .iter()
            .flat_map(|block| block.characters.iter())
            .filter(|meta| meta.entity.as_ref() == Some(entity))
            .count()
    }

    /// Whether key generation here could hand out a key already generated by `other`.
    pub(crate) fn counters_behind(&self, other: &Document) -> bool {
        self.next_block_key < other.next_block_key || self.next_entity_key < other.next_entity_key
    }

    /// Move the key counters past `other`'s.
    pub(crate) fn advance_counters(&mut self, other: &Document) {
        self.next_block_key = self.next_block_key.max(other.next_block_key);
        self.next_entity_key = self.next_entity_key.max(other.next_entity_key);
    }

    pub(crate) fn generate_block_key(&mut self) -> BlockKey {
        loop {
            let key = BlockKey::new(format_smolstr!("b{}", self.next_block_key));
            self.next_block_key += 1;
            if self.block_index(&key).is_none() {
                return key;
            }
        }
    }

    pub(crate) fn generate_entity_key(&mut self) -> EntityKey {
        loop {
            let key = EntityKey::new(format_smolstr!("{}", self.next_entity_key));
            self.next_entity_key += 1;
            if !self.entities.contains_key(&key) {
                return key;
            }
        }
    }

    pub(crate) fn entities_mut(&mut self) -> &mut EntityMap {
        Arc::make_mut(&mut self.entities)
    }
}

fn numeric_suffix(key: &str, prefix: &str) -> Option<u64> {
    key.strip_prefix(prefix)?.parse().ok()
}
