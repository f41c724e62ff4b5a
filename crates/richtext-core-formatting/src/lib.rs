#![warn(missing_docs)]
//! `richtext-core-formatting` - formatting extensions for `richtext-core`.
//!
//! This crate contributes the everyday formatting features as [`Extension`]s, plus the toolbar
//! command surface that drives them:
//!
//! - [`alignment`] - block alignment stored as block data
//! - [`color`] / [`font_size`] - single-value inline style families
//! - [`list_item`] - list rendering and toggling
//! - [`inline_image`] - image entities, pasted/dropped image files and drag relocation
//! - [`toolbar`] - toolbar commands and toolbar state
//!
//! Every query follows the same reduction rule: each selected character (or block) is a
//! candidate, and a value is reported only when all candidates agree.
//!
//! ```rust
//! use richtext_core::{Editor, EditorConfig};
//! use richtext_core_formatting::default_pipeline;
//!
//! let editor = Editor::new(default_pipeline(), EditorConfig::default());
//! assert_eq!(
//!     editor.pipeline().extension_names(),
//!     ["alignment", "inline-image", "color", "font-size", "list-item"]
//! );
//! ```

pub mod alignment;
pub mod color;
mod error;
pub mod font_size;
pub mod inline_image;
pub mod list_item;
pub mod toolbar;

pub use alignment::{Alignment, AlignmentExtension};
pub use color::ColorExtension;
pub use error::CommandError;
pub use font_size::FontSizeExtension;
pub use inline_image::{ImageData, InlineImageExtension};
pub use list_item::ListItemExtension;
pub use toolbar::{ToolbarCommand, ToolbarState};

use richtext_core::{Extension, Pipeline};

/// The canonical extension list, in priority order.
pub fn default_extensions() -> Vec<Box<dyn Extension>> {
    vec![
        Box::new(AlignmentExtension),
        Box::new(InlineImageExtension),
        Box::new(ColorExtension),
        Box::new(FontSizeExtension),
        Box::new(ListItemExtension),
    ]
}

/// A pipeline composed of [`default_extensions`].
pub fn default_pipeline() -> Pipeline {
    Pipeline::new(default_extensions())
}
