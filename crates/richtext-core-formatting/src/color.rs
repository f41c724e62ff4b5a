//! Text color, stored as `color-<css color>` inline style tags.

use richtext_core::commands::{set_single_value_style, single_value_style};
use richtext_core::{Block, DocumentError, EditorState, Extension, StyleFamily, StyleProps, StyleSet};
use smol_str::SmolStr;

/// Color shared by the whole selection (or carried by the cursor).
pub fn get_color(state: &EditorState) -> Option<SmolStr> {
    single_value_style(state, StyleFamily::COLOR)
}

/// Replace the color of the selection. On a collapsed cursor the color applies to the next
/// typed characters.
pub fn set_color(state: &EditorState, color: &str) -> Result<EditorState, DocumentError> {
    set_single_value_style(state, StyleFamily::COLOR, Some(color))
}

/// Remove every color from the selection.
pub fn clear_color(state: &EditorState) -> Result<EditorState, DocumentError> {
    set_single_value_style(state, StyleFamily::COLOR, None)
}

/// Maps color tags to the `color` property.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorExtension;

impl Extension for ColorExtension {
    fn name(&self) -> &str {
        "color"
    }

    fn custom_style(&self, styles: &StyleSet, _block: &Block) -> StyleProps {
        let mut props = StyleProps::new();
        if let Some(color) = StyleFamily::COLOR.find(styles) {
            props.insert("color".into(), color.into());
        }
        props
    }
}
