//! Pure document transforms.
//!
//! Every method takes `&self` and returns a new [`Document`]; untouched blocks are shared with
//! the input. Transforms that move the cursor also return the resulting selection.

use crate::document::{
    Block, BlockType, CharacterMetadata, Document, DocumentError, Entity, EntityData, EntityKey,
    Mutability,
};
use crate::selection::{SelectionRange, SelectionState};
use crate::style::StyleSet;
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;

/// Character inserted to carry an inline entity.
pub const ENTITY_PLACEHOLDER: &str = " ";

impl Document {
    /// Delete the selected range and merge the end block's tail into the start block.
    ///
    /// Immutable entities touched by either edge are removed as a whole. Returns the collapsed
    /// selection at the deletion point.
    pub fn remove_range(
        &self,
        selection: &SelectionState,
    ) -> Result<(Document, SelectionState), DocumentError> {
        let range = self.normalize(selection)?;
        if range.is_collapsed() {
            return Ok((self.clone(), selection.collapse_to_start()));
        }
        let range = self.expand_immutable_edges(range);
        let cursor = SelectionState::collapsed(range.start.key.clone(), range.start.offset)
            .with_focus(selection.has_focus);

        let start_block = &self.blocks[range.start.block_index];
        let end_block = &self.blocks[range.end.block_index];
        let (mut text, mut characters) = start_block.slice(0..range.start.offset);
        let (tail_text, tail_characters) = end_block.slice(range.end.offset..end_block.len());
        text.push_str(&tail_text);
        characters.extend(tail_characters);
        let merged = Arc::new(start_block.rebuilt(text, characters));

        let mut next = self.clone();
        next.blocks
            .splice(range.start.block_index..=range.end.block_index, [merged]);
        Ok((next, cursor))
    }

    fn expand_immutable_edges(&self, mut range: SelectionRange) -> SelectionRange {
        let start_block = &self.blocks[range.start.block_index];
        if let Some(run) = self.immutable_run(start_block, range.start.offset) {
            range.start.offset = run.start;
        }
        let end_block = &self.blocks[range.end.block_index];
        if range.end.offset > 0
            && let Some(run) = self.immutable_run(end_block, range.end.offset - 1)
        {
            range.end.offset = run.end;
        }
        range
    }

    fn immutable_run(&self, block: &Block, offset: usize) -> Option<std::ops::Range<usize>> {
        let key = block.entity_at(offset)?;
        let entity = self.entities.get(key)?;
        if entity.mutability() == Mutability::Immutable {
            block.entity_run_at(offset)
        } else {
            None
        }
    }

    /// Insert `text` at the selection, replacing a non-collapsed range.
    ///
    /// Each `\n` splits the block. Inserted characters carry `style` and `entity`.
    pub fn insert_text(
        &self,
        selection: &SelectionState,
        text: &str,
        style: &StyleSet,
        entity: Option<&EntityKey>,
    ) -> Result<(Document, SelectionState), DocumentError> {
        if let Some(key) = entity
            && !self.entities.contains_key(key)
        {
            return Err(DocumentError::UnknownEntity(key.clone()));
        }
        let (mut document, mut cursor) = self.remove_range(selection)?;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                (document, cursor) = document.split_block(&cursor)?;
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.is_empty() {
                (document, cursor) = document.insert_line(&cursor, line, style, entity)?;
            }
        }
        Ok((document, cursor))
    }

    fn insert_line(
        &self,
        cursor: &SelectionState,
        line: &str,
        style: &StyleSet,
        entity: Option<&EntityKey>,
    ) -> Result<(Document, SelectionState), DocumentError> {
        let range = self.normalize(cursor)?;
        let index = range.start.block_index;
        let offset = range.start.offset;
        let block = &self.blocks[index];

        let inserted = line.chars().count();
        let meta = CharacterMetadata::new(style.clone(), entity.cloned());
        let (mut text, mut characters) = block.slice(0..offset);
        let (tail_text, tail_characters) = block.slice(offset..block.len());
        text.push_str(line);
        text.push_str(&tail_text);
        characters.extend(std::iter::repeat_n(meta, inserted));
        characters.extend(tail_characters);

        let mut next = self.clone();
        next.blocks[index] = Arc::new(block.rebuilt(text, characters));
        let cursor = SelectionState::collapsed(block.key.clone(), offset + inserted)
            .with_focus(cursor.has_focus);
        Ok((next, cursor))
    }

    /// Split the block at the selection (removing a non-collapsed range first).
    ///
    /// The lower half gets a fresh key and keeps the block type, depth and data. The cursor
    /// lands at the start of the new block.
    pub fn split_block(
        &self,
        selection: &SelectionState,
    ) -> Result<(Document, SelectionState), DocumentError> {
        let (mut next, cursor) = self.remove_range(selection)?;
        let range = next.normalize(&cursor)?;
        let index = range.start.block_index;
        let offset = range.start.offset;
        let block = Arc::clone(&next.blocks[index]);

        let (head_text, head_characters) = block.slice(0..offset);
        let (tail_text, tail_characters) = block.slice(offset..block.len());
        let key = next.generate_block_key();
        let upper = block.rebuilt(head_text, head_characters);
        let mut lower = block.rebuilt(tail_text, tail_characters);
        lower.key = key.clone();

        next.blocks
            .splice(index..=index, [Arc::new(upper), Arc::new(lower)]);
        Ok((
            next,
            SelectionState::collapsed(key, 0).with_focus(selection.has_focus),
        ))
    }

    /// Add `tag` to every character in the selection.
    pub fn apply_inline_style(
        &self,
        selection: &SelectionState,
        tag: &str,
    ) -> Result<Document, DocumentError> {
        self.map_character_styles(selection, |style| style.insert(tag))
    }

    /// Remove `tag` from every character in the selection.
    pub fn remove_inline_style(
        &self,
        selection: &SelectionState,
        tag: &str,
    ) -> Result<Document, DocumentError> {
        self.map_character_styles(selection, |style| style.remove(tag))
    }

    /// Rewrite the style set of every selected character; `f` reports whether it changed.
    pub fn map_character_styles(
        &self,
        selection: &SelectionState,
        mut f: impl FnMut(&mut StyleSet) -> bool,
    ) -> Result<Document, DocumentError> {
        let range = self.normalize(selection)?;
        let mut next = self.clone();
        for index in range.start.block_index..=range.end.block_index {
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
            if start >= end {
                continue;
            }
            let mut updated = Block::clone(block);
            let mut changed = false;
            for meta in &mut updated.characters[start..end] {
                changed |= f(&mut meta.style);
            }
            if changed {
                next.blocks[index] = Arc::new(updated);
            }
        }
        Ok(next)
    }

    /// Set `key` to `value` in the data of every selected block.
    pub fn set_block_data(
        &self,
        selection: &SelectionState,
        key: &str,
        value: Value,
    ) -> Result<Document, DocumentError> {
        self.map_selected_blocks(selection, |block| {
            block.data.insert(key.to_string(), value.clone());
        })
    }

    /// Set the type of every selected block.
    pub fn set_block_type(
        &self,
        selection: &SelectionState,
        block_type: &BlockType,
    ) -> Result<Document, DocumentError> {
        self.map_selected_blocks(selection, |block| {
            block.block_type = block_type.clone();
        })
    }

    fn map_selected_blocks(
        &self,
        selection: &SelectionState,
        mut f: impl FnMut(&mut Block),
    ) -> Result<Document, DocumentError> {
        let range = self.normalize(selection)?;
        let mut next = self.clone();
        for slot in &mut next.blocks[range.start.block_index..=range.end.block_index] {
            let mut updated = Block::clone(slot);
            f(&mut updated);
            if updated != **slot {
                *slot = Arc::new(updated);
            }
        }
        Ok(next)
    }

    /// Register a new entity.
    pub fn create_entity(
        &self,
        entity_type: impl Into<SmolStr>,
        mutability: Mutability,
        data: EntityData,
    ) -> (Document, EntityKey) {
        let mut next = self.clone();
        let key = next.generate_entity_key();
        next.entities_mut()
            .insert(key.clone(), Arc::new(Entity::new(entity_type, mutability, data)));
        (next, key)
    }

    /// Shallow-merge `data` into an existing entity's payload.
    pub fn merge_entity_data(
        &self,
        key: &EntityKey,
        data: EntityData,
    ) -> Result<Document, DocumentError> {
        let entity = self
            .entities
            .get(key)
            .ok_or_else(|| DocumentError::UnknownEntity(key.clone()))?;
        let mut merged = entity.data().clone();
        merged.extend(data);
        let replacement = Entity::new(entity.entity_type(), entity.mutability(), merged);
        let mut next = self.clone();
        next.entities_mut().insert(key.clone(), Arc::new(replacement));
        Ok(next)
    }

    /// Replace the selection with a placeholder character carrying a new immutable entity.
    pub fn insert_entity(
        &self,
        selection: &SelectionState,
        entity_type: impl Into<SmolStr>,
        data: EntityData,
    ) -> Result<(Document, EntityKey, SelectionState), DocumentError> {
        let (document, cursor) = self.remove_range(selection)?;
        let (document, key) = document.create_entity(entity_type, Mutability::Immutable, data);
        let (document, cursor) =
            document.insert_text(&cursor, ENTITY_PLACEHOLDER, &StyleSet::new(), Some(&key))?;
        Ok((document, key, cursor))
    }

    /// Move the characters carrying `entity` to the start of `to`, in one transform.
    ///
    /// The source run is looked up in the blocks covered by `from` first, then anywhere in the
    /// document. The re-inserted placeholder keeps the style of the first moved character.
    pub fn move_entity(
        &self,
        from: &SelectionState,
        to: &SelectionState,
        entity: &EntityKey,
    ) -> Result<(Document, SelectionState), DocumentError> {
        if !self.entities.contains_key(entity) {
            return Err(DocumentError::UnknownEntity(entity.clone()));
        }
        let target = self.normalize(to)?;
        let (source_index, run) = self
            .locate_entity(from, entity)
            .ok_or_else(|| DocumentError::EntityNotReferenced(entity.clone()))?;
        let source = &self.blocks[source_index];
        let style = source.style_at(run.start).clone();

        let mut destination = target.start;
        if destination.block_index == source_index {
            if destination.offset >= run.end {
                destination.offset -= run.len();
            } else if destination.offset > run.start {
                destination.offset = run.start;
            }
        }

        let removal = SelectionState::range(source.key.clone(), run.start, source.key.clone(), run.end);
        let (document, _) = self.remove_range(&removal)?;
        let insertion = SelectionState::collapsed(destination.key, destination.offset);
        let (document, cursor) =
            document.insert_text(&insertion, ENTITY_PLACEHOLDER, &style, Some(entity))?;
        Ok((document, cursor.with_focus(to.has_focus)))
    }

    fn locate_entity(
        &self,
        from: &SelectionState,
        entity: &EntityKey,
    ) -> Option<(usize, std::ops::Range<usize>)> {
        let first_run = |index: usize| {
            self.blocks[index]
                .find_entity_ranges(|key| key == entity)
                .into_iter()
                .next()
                .map(|run| (index, run))
        };
        if let Ok(range) = self.normalize(from)
            && let Some(found) =
                (range.start.block_index..=range.end.block_index).find_map(first_run)
        {
            return Some(found);
        }
        (0..self.blocks.len()).find_map(first_run)
    }
}
