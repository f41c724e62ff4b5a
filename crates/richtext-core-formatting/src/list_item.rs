//! Ordered and unordered list items.
//!
//! List blocks render as `li` inside a `ul`/`ol` wrapper. The bullet or number is drawn by the
//! `list-item` renderer, whose marker takes the style of the block's first character.

use richtext_core::commands::toggle_block_type;
use richtext_core::{
    Block, BlockRenderConfig, BlockRenderer, BlockType, DocumentError, EditorState, Extension,
    RenderContext,
};
use serde_json::{Map, Value};

/// Class name of the list wrapper element.
pub const LIST_WRAPPER_CLASS: &str = "rich-editor-list";

/// Component name of the list item renderer.
pub const LIST_ITEM_COMPONENT: &str = "list-item";

/// Turn the selected blocks into list items, or back into paragraphs if they already are.
pub fn toggle_list(state: &EditorState, ordered: bool) -> Result<EditorState, DocumentError> {
    let block_type = if ordered {
        BlockType::OrderedListItem
    } else {
        BlockType::UnorderedListItem
    };
    toggle_block_type(state, &block_type)
}

/// Renders list items with a styled marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListItemExtension;

impl Extension for ListItemExtension {
    fn name(&self) -> &str {
        "list-item"
    }

    fn block_render_map(&self) -> Vec<(BlockType, BlockRenderConfig)> {
        vec![
            (
                BlockType::UnorderedListItem,
                BlockRenderConfig::element("li").wrapped("ul", Some(LIST_WRAPPER_CLASS)),
            ),
            (
                BlockType::OrderedListItem,
                BlockRenderConfig::element("li").wrapped("ol", Some(LIST_WRAPPER_CLASS)),
            ),
        ]
    }

    fn block_renderer(&self, block: &Block, ctx: &RenderContext<'_>) -> Option<BlockRenderer> {
        if !block.block_type().is_list_item() {
            return None;
        }
        let marker: Map<String, Value> = ctx
            .style_props(block.style_at(0), block)
            .into_iter()
            .map(|(property, value)| (property.to_string(), Value::from(value.as_str())))
            .collect();
        Some(
            BlockRenderer::new(LIST_ITEM_COMPONENT)
                .with_prop("ordered", block.block_type() == &BlockType::OrderedListItem)
                .with_prop("markerStyle", Value::Object(marker)),
        )
    }
}
