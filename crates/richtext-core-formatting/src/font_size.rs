//! Font size, stored as `font-size-<size>` inline style tags.

use richtext_core::commands::{set_single_value_style, single_value_style};
use richtext_core::{Block, DocumentError, EditorState, Extension, StyleFamily, StyleProps, StyleSet};
use smol_str::{SmolStr, format_smolstr};

/// Font size used when no size tag is present.
pub const DEFAULT_FONT_SIZE: &str = "16px";

/// Font size shared by the whole selection (or carried by the cursor).
pub fn get_font_size(state: &EditorState) -> Option<SmolStr> {
    single_value_style(state, StyleFamily::FONT_SIZE)
}

/// Replace the font size of the selection.
pub fn set_font_size(state: &EditorState, size: &str) -> Result<EditorState, DocumentError> {
    set_single_value_style(state, StyleFamily::FONT_SIZE, Some(size))
}

/// CSS value of a stored size: bare numbers are pixels.
pub fn css_font_size(size: &str) -> SmolStr {
    if size.parse::<f64>().is_ok() {
        format_smolstr!("{size}px")
    } else {
        SmolStr::new(size)
    }
}

/// Maps size tags to the `fontSize` property.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontSizeExtension;

impl Extension for FontSizeExtension {
    fn name(&self) -> &str {
        "font-size"
    }

    fn custom_style(&self, styles: &StyleSet, _block: &Block) -> StyleProps {
        let size = StyleFamily::FONT_SIZE
            .find(styles)
            .map(css_font_size)
            .unwrap_or_else(|| SmolStr::new_static(DEFAULT_FONT_SIZE));
        let mut props = StyleProps::new();
        props.insert("fontSize".into(), size);
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use richtext_core::Document;

    #[test]
    fn test_css_font_size() {
        assert_eq!(css_font_size("18"), "18px");
        assert_eq!(css_font_size("1.5em"), "1.5em");
    }

    #[test]
    fn test_classifier_defaults_to_16px() {
        let doc = Document::new();
        let block = doc.first_block();
        let props = FontSizeExtension.custom_style(&StyleSet::new(), block);
        assert_eq!(props.get("fontSize").map(SmolStr::as_str), Some("16px"));

        let styles: StyleSet = ["font-size-24"].into_iter().collect();
        let props = FontSizeExtension.custom_style(&styles, block);
        assert_eq!(props.get("fontSize").map(SmolStr::as_str), Some("24px"));
    }
}
