//! Headless render snapshot.
//!
//! [`Pipeline::render`](crate::Pipeline::render) turns an [`EditorState`](crate::EditorState)
//! into plain data a UI layer can draw: one [`BlockSnapshot`] per block with its element,
//! wrapper, class name and custom renderer, split into [`SpanSnapshot`]s of uniform style,
//! entity and decoration.

use crate::decorations::DecoratedRange;
use crate::document::{Block, BlockKey, BlockType, Document, EntityKey};
use crate::pipeline::Pipeline;
use crate::selection::SelectionState;
use crate::style::{StyleProps, StyleSet};
use serde_json::Value;
use smol_str::SmolStr;
use std::collections::BTreeMap;
use std::ops::Range;

/// Wrapper element grouping adjacent blocks of one type (e.g. `ul` around list items).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    /// Element name.
    pub element: SmolStr,
    /// Class name of the wrapper.
    pub class_name: Option<SmolStr>,
}

/// Element and optional wrapper used to render one block type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRenderConfig {
    /// Element name.
    pub element: SmolStr,
    /// Wrapper, if blocks of this type are grouped.
    pub wrapper: Option<WrapperConfig>,
}

impl BlockRenderConfig {
    /// A config without wrapper.
    pub fn element(element: impl Into<SmolStr>) -> Self {
        Self {
            element: element.into(),
            wrapper: None,
        }
    }

    /// Copy with a wrapper element.
    pub fn wrapped(mut self, element: impl Into<SmolStr>, class_name: Option<&str>) -> Self {
        self.wrapper = Some(WrapperConfig {
            element: element.into(),
            class_name: class_name.map(SmolStr::new),
        });
        self
    }
}

/// Block type to render config.
pub type BlockRenderMap = BTreeMap<BlockType, BlockRenderConfig>;

/// The built-in render map.
pub fn default_render_map() -> BlockRenderMap {
    [
        (BlockType::Unstyled, BlockRenderConfig::element("div")),
        (BlockType::Paragraph, BlockRenderConfig::element("p")),
        (BlockType::HeaderOne, BlockRenderConfig::element("h1")),
        (BlockType::HeaderTwo, BlockRenderConfig::element("h2")),
        (BlockType::HeaderThree, BlockRenderConfig::element("h3")),
        (BlockType::HeaderFour, BlockRenderConfig::element("h4")),
        (BlockType::HeaderFive, BlockRenderConfig::element("h5")),
        (BlockType::HeaderSix, BlockRenderConfig::element("h6")),
        (BlockType::Blockquote, BlockRenderConfig::element("blockquote")),
        (
            BlockType::CodeBlock,
            BlockRenderConfig::element("pre").wrapped("pre", None),
        ),
        (BlockType::Atomic, BlockRenderConfig::element("figure")),
        (
            BlockType::UnorderedListItem,
            BlockRenderConfig::element("li").wrapped("ul", None),
        ),
        (
            BlockType::OrderedListItem,
            BlockRenderConfig::element("li").wrapped("ol", None),
        ),
    ]
    .into_iter()
    .collect()
}

/// A custom block renderer chosen by an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRenderer {
    /// Component name.
    pub component: SmolStr,
    /// Whether the block content stays editable.
    pub editable: bool,
    /// Props handed to the component.
    pub props: serde_json::Map<String, Value>,
}

impl BlockRenderer {
    /// An editable renderer without props.
    pub fn new(component: impl Into<SmolStr>) -> Self {
        Self {
            component: component.into(),
            editable: true,
            props: serde_json::Map::new(),
        }
    }

    /// Copy with one prop set.
    pub fn with_prop(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.props.insert(key.to_string(), value.into());
        self
    }
}

/// What a render selector may consult.
pub struct RenderContext<'a> {
    document: &'a Document,
    pipeline: &'a Pipeline,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(document: &'a Document, pipeline: &'a Pipeline) -> Self {
        Self { document, pipeline }
    }

    /// The document being rendered.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Merged visual properties of `styles` inside `block`.
    pub fn style_props(&self, styles: &StyleSet, block: &Block) -> StyleProps {
        self.pipeline.custom_style(styles, block)
    }
}

/// A run of characters with identical styles, entity and decoration.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanSnapshot {
    /// Character range in the block.
    pub range: Range<usize>,
    /// Text of the run.
    pub text: String,
    /// Style tags.
    pub styles: StyleSet,
    /// Merged visual properties.
    pub style: StyleProps,
    /// Entity carried by the run.
    pub entity: Option<EntityKey>,
    /// Decorator component covering the run.
    pub decorator: Option<SmolStr>,
}

/// Render data of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSnapshot {
    /// Block key.
    pub key: BlockKey,
    /// Block type.
    pub block_type: BlockType,
    /// Nesting depth.
    pub depth: u8,
    /// Element name.
    pub element: SmolStr,
    /// Wrapper grouping adjacent blocks.
    pub wrapper: Option<WrapperConfig>,
    /// Space-joined class names from the class selectors.
    pub class_name: Option<SmolStr>,
    /// Custom renderer, if an extension chose one.
    pub renderer: Option<BlockRenderer>,
    /// Styled runs.
    pub spans: Vec<SpanSnapshot>,
}

/// Render data of a whole editor state.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Blocks in document order.
    pub blocks: Vec<BlockSnapshot>,
    /// Selection at render time.
    pub selection: SelectionState,
    /// State version rendered.
    pub version: u64,
}

impl DocumentSnapshot {
    /// Snapshot of the block with `key`.
    pub fn block(&self, key: &BlockKey) -> Option<&BlockSnapshot> {
        self.blocks.iter().find(|block| &block.key == key)
    }
}

/// Split a block into maximal uniform runs.
pub(crate) fn build_spans(
    block: &Block,
    decorations: &[DecoratedRange],
    mut style_of: impl FnMut(&StyleSet) -> StyleProps,
) -> Vec<SpanSnapshot> {
    let mut decorator_at: Vec<Option<&SmolStr>> = vec![None; block.len()];
    for decorated in decorations {
        decorator_at[decorated.range.clone()].fill(Some(&decorated.component));
    }

    let characters = block.characters();
    let text: Vec<char> = block.text().chars().collect();
    let mut spans = Vec::new();
    let mut start = 0;
    while start < characters.len() {
        let meta = &characters[start];
        let decorator = decorator_at[start];
        let mut end = start + 1;
        while end < characters.len()
            && characters[end] == *meta
            && decorator_at[end] == decorator
        {
            end += 1;
        }
        spans.push(SpanSnapshot {
            range: start..end,
            text: text[start..end].iter().collect(),
            styles: meta.style.clone(),
            style: style_of(&meta.style),
            entity: meta.entity.clone(),
            decorator: decorator.cloned(),
        });
        start = end;
    }
    spans
}
