//! Portable raw document format.
//!
//! The raw format is the JSON shape used for persistence and interchange:
//!
//! ```json
//! {
//!   "blocks": [{
//!     "key": "b0", "text": "Hi ", "type": "unstyled", "depth": 0,
//!     "inlineStyleRanges": [{"offset": 0, "length": 2, "style": "BOLD"}],
//!     "entityRanges": [{"offset": 2, "length": 1, "key": 0}],
//!     "data": {}
//!   }],
//!   "entityMap": {"0": {"type": "INLINE_IMAGE", "mutability": "IMMUTABLE", "data": {"src": "a.png"}}}
//! }
//! ```
//!
//! Offsets and lengths count characters. Only entities referenced by some character are
//! written; their keys are renumbered from `0` in order of first appearance.

use crate::document::{
    Block, BlockData, BlockKey, BlockType, CharacterMetadata, Document, DocumentError, Entity,
    EntityData, EntityKey, EntityMap, Mutability,
};
use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while loading a raw document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RawError {
    /// The JSON could not be parsed into the raw shape.
    #[error("malformed raw document: {0}")]
    Json(#[from] serde_json::Error),

    /// Two blocks share a key.
    #[error("duplicate block key: {0}")]
    DuplicateBlockKey(SmolStr),

    /// A style or entity range reaches past the end of its block.
    #[error("range {offset}+{length} exceeds block {key} (length {len})")]
    RangeOutOfBounds {
        /// Block key.
        key: SmolStr,
        /// Range offset.
        offset: usize,
        /// Range length.
        length: usize,
        /// Block length in characters.
        len: usize,
    },

    /// An entity range names an entity missing from the entity map.
    #[error("block {block} references unknown entity {entity}")]
    DanglingEntity {
        /// Block key.
        block: SmolStr,
        /// Entity reference as written.
        entity: SmolStr,
    },

    /// The assembled document violated an invariant.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Serialized document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Blocks in order.
    pub blocks: Vec<RawBlock>,
    /// Entities keyed by their raw key.
    #[serde(default)]
    pub entity_map: BTreeMap<SmolStr, RawEntity>,
}

/// Serialized block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    /// Block key; a fresh one is generated when empty.
    #[serde(default)]
    pub key: SmolStr,
    /// Text.
    #[serde(default)]
    pub text: String,
    /// Block type.
    #[serde(rename = "type", default = "default_block_type")]
    pub block_type: BlockType,
    /// Nesting depth.
    #[serde(default)]
    pub depth: u8,
    /// Style runs.
    #[serde(default)]
    pub inline_style_ranges: Vec<RawStyleRange>,
    /// Entity runs.
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
    /// Block data.
    #[serde(default)]
    pub data: BlockData,
}

fn default_block_type() -> BlockType {
    BlockType::Unstyled
}

/// One style run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyleRange {
    /// Start offset.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// Style tag.
    pub style: SmolStr,
}

/// One entity run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    /// Start offset.
    pub offset: usize,
    /// Length in characters.
    pub length: usize,
    /// Entity map key.
    pub key: RawEntityRef,
}

/// Entity reference: written as a number, accepted as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEntityRef {
    /// Numeric index.
    Index(u64),
    /// String key.
    Key(SmolStr),
}

impl RawEntityRef {
    fn to_key(&self) -> SmolStr {
        match self {
            RawEntityRef::Index(index) => format_smolstr!("{index}"),
            RawEntityRef::Key(key) => key.clone(),
        }
    }
}

/// Serialized entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Entity type.
    #[serde(rename = "type")]
    pub entity_type: SmolStr,
    /// Mutability.
    #[serde(default = "default_mutability")]
    pub mutability: Mutability,
    /// Payload.
    #[serde(default)]
    pub data: EntityData,
}

fn default_mutability() -> Mutability {
    Mutability::Mutable
}

impl RawDocument {
    /// Parse raw JSON.
    pub fn from_json(json: &str) -> Result<Self, RawError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, RawError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Document {
    /// Convert into the raw format.
    pub fn to_raw(&self) -> RawDocument {
        let mut renumbered: HashMap<&EntityKey, u64> = HashMap::new();
        let mut entity_map = BTreeMap::new();
        let blocks = self
            .blocks()
            .iter()
            .map(|block| {
                let tags: BTreeSet<&SmolStr> = block
                    .characters()
                    .iter()
                    .flat_map(|meta| meta.style.iter())
                    .collect();
                let mut inline_style_ranges: Vec<RawStyleRange> = tags
                    .into_iter()
                    .flat_map(|tag| {
                        block
                            .find_style_ranges(tag)
                            .into_iter()
                            .map(move |range| RawStyleRange {
                                offset: range.start,
                                length: range.len(),
                                style: tag.clone(),
                            })
                    })
                    .collect();
                inline_style_ranges.sort_by(|a, b| {
                    (a.offset, &a.style).cmp(&(b.offset, &b.style))
                });

                let entity_ranges = block
                    .find_entity_ranges(|_| true)
                    .into_iter()
                    .filter_map(|range| {
                        let key = block.entity_at(range.start)?;
                        let entity = self.entity(key)?;
                        let next_index = renumbered.len() as u64;
                        let index = *renumbered.entry(key).or_insert_with(|| {
                            entity_map.insert(format_smolstr!("{next_index}"), RawEntity::from(&**entity));
                            next_index
                        });
                        Some(RawEntityRange {
                            offset: range.start,
                            length: range.len(),
                            key: RawEntityRef::Index(index),
                        })
                    })
                    .collect();

                RawBlock {
                    key: SmolStr::new(block.key().as_str()),
                    text: block.text().to_string(),
                    block_type: block.block_type().clone(),
                    depth: block.depth(),
                    inline_style_ranges,
                    entity_ranges,
                    data: block.data().clone(),
                }
            })
            .collect();
        RawDocument { blocks, entity_map }
    }

    /// Build a document from the raw format, validating every range and reference.
    pub fn from_raw(raw: &RawDocument) -> Result<Document, RawError> {
        let mut entities = EntityMap::new();
        for (key, entity) in &raw.entity_map {
            entities.insert(
                EntityKey::new(key.clone()),
                Arc::new(Entity::new(
                    entity.entity_type.clone(),
                    entity.mutability,
                    entity.data.clone(),
                )),
            );
        }

        let mut used_keys: HashSet<&str> = HashSet::new();
        for block in &raw.blocks {
            if !block.key.is_empty() && !used_keys.insert(block.key.as_str()) {
                return Err(RawError::DuplicateBlockKey(block.key.clone()));
            }
        }

        let mut fresh = 0usize;
        let mut blocks = Vec::with_capacity(raw.blocks.len());
        for raw_block in &raw.blocks {
            let key = if raw_block.key.is_empty() {
                loop {
                    let candidate = format_smolstr!("b{fresh}");
                    fresh += 1;
                    if !used_keys.contains(candidate.as_str()) {
                        break candidate;
                    }
                }
            } else {
                raw_block.key.clone()
            };
            blocks.push(raw_block_to_block(raw_block, key, &entities)?);
        }
        Ok(Document::from_blocks(blocks, entities)?)
    }

    /// Serialize to raw JSON.
    pub fn to_json(&self) -> Result<String, RawError> {
        self.to_raw().to_json()
    }

    /// Parse raw JSON into a document.
    pub fn from_json(json: &str) -> Result<Document, RawError> {
        Document::from_raw(&RawDocument::from_json(json)?)
    }
}

fn raw_block_to_block(raw: &RawBlock, key: SmolStr, entities: &EntityMap) -> Result<Block, RawError> {
    let len = raw.text.chars().count();
    let check = |offset: usize, length: usize| {
        if offset.checked_add(length).is_none_or(|end| end > len) {
            Err(RawError::RangeOutOfBounds {
                key: key.clone(),
                offset,
                length,
                len,
            })
        } else {
            Ok(offset..offset + length)
        }
    };

    let mut characters = vec![CharacterMetadata::default(); len];
    for style_range in &raw.inline_style_ranges {
        for meta in &mut characters[check(style_range.offset, style_range.length)?] {
            meta.style.insert(style_range.style.clone());
        }
    }
    for entity_range in &raw.entity_ranges {
        let range = check(entity_range.offset, entity_range.length)?;
        let entity = EntityKey::new(entity_range.key.to_key());
        if !entities.contains_key(&entity) {
            return Err(RawError::DanglingEntity {
                block: key.clone(),
                entity: SmolStr::new(entity.as_str()),
            });
        }
        for meta in &mut characters[range] {
            meta.entity = Some(entity.clone());
        }
    }

    Ok(Block::with_characters(
        BlockKey::new(key.clone()),
        raw.block_type.clone(),
        raw.text.clone(),
        characters,
    )?
    .with_depth(raw.depth)
    .with_data(raw.data.clone()))
}

impl From<&Entity> for RawEntity {
    fn from(entity: &Entity) -> Self {
        Self {
            entity_type: SmolStr::new(entity.entity_type()),
            mutability: entity.mutability(),
            data: entity.data().clone(),
        }
    }
}
