//! Extension capability contract.
//!
//! An [`Extension`] contributes to styling, rendering, key handling, clipboard/drop handling,
//! decoration and post-change transforms. Every hook has a neutral default, so an extension
//! only implements what it needs. Extensions are composed by the
//! [`Pipeline`](crate::Pipeline).

use crate::commands::KeyEvent;
use crate::decorations::Decorator;
use crate::document::{Block, BlockType, DocumentError, EntityKey};
use crate::selection::SelectionState;
use crate::snapshot::{BlockRenderConfig, BlockRenderer, RenderContext};
use crate::state::EditorState;
use crate::style::{StyleProps, StyleSet};
use smol_str::SmolStr;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;

/// A file offered by a paste or drop, as described by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileBlob {
    /// File name.
    pub name: SmolStr,
    /// MIME type reported by the host (e.g. `image/png`).
    pub mime_type: SmolStr,
}

impl FileBlob {
    /// Describe a file.
    pub fn new(name: impl Into<SmolStr>, mime_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Payload of a drop event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTransfer {
    /// Plain text payload.
    pub text: Option<String>,
    /// HTML payload.
    pub html: Option<String>,
    /// Entity being dragged from inside the editor.
    pub entity: Option<EntityKey>,
    /// Selection the dragged entity was taken from, captured when the drag started.
    pub origin: Option<SelectionState>,
    /// Dropped files.
    pub files: Vec<FileBlob>,
}

impl DataTransfer {
    /// A payload carrying a dragged entity.
    pub fn entity(key: EntityKey) -> Self {
        Self {
            entity: Some(key),
            ..Self::default()
        }
    }

    /// Attach the selection the drag started from.
    pub fn with_origin(mut self, origin: SelectionState) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// Where a drop came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// Dragged from inside this editor.
    Internal,
    /// Dragged from outside.
    External,
}

/// An edit that needs file contents before it can be applied.
///
/// The session reads every file in [`files`](DeferredEdit::files) in order and calls
/// [`apply`](DeferredEdit::apply) against the latest committed state after each read.
pub trait DeferredEdit {
    /// Files to read, in application order.
    fn files(&self) -> &[FileBlob];

    /// Apply one file's contents. `Ok(None)` leaves the state unchanged.
    fn apply(
        &self,
        state: &EditorState,
        file: &FileBlob,
        contents: &[u8],
    ) -> Result<Option<EditorState>, DocumentError>;
}

/// Outcome of an event handler.
pub enum HandleResult {
    /// Declined; the next handler runs.
    NotHandled,
    /// Claimed; this is the new state.
    Handled(EditorState),
    /// Claimed; the edit completes once its files are read.
    Deferred(Box<dyn DeferredEdit>),
}

impl HandleResult {
    /// Whether the event was claimed.
    pub fn is_handled(&self) -> bool {
        !matches!(self, HandleResult::NotHandled)
    }
}

impl fmt::Debug for HandleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleResult::NotHandled => f.write_str("NotHandled"),
            HandleResult::Handled(state) => f
                .debug_tuple("Handled")
                .field(&state.version())
                .finish(),
            HandleResult::Deferred(edit) => f
                .debug_tuple("Deferred")
                .field(&edit.files())
                .finish(),
        }
    }
}

/// Capability contract implemented by every editor extension.
#[allow(unused_variables)]
pub trait Extension: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Visual properties for a set of style tags.
    fn custom_style(&self, styles: &StyleSet, block: &Block) -> StyleProps {
        StyleProps::new()
    }

    /// Custom renderer for a block.
    fn block_renderer(&self, block: &Block, ctx: &RenderContext<'_>) -> Option<BlockRenderer> {
        None
    }

    /// Extra class name for a block.
    fn block_style(&self, block: &Block) -> Option<SmolStr> {
        None
    }

    /// Element/wrapper overrides per block type.
    fn block_render_map(&self) -> Vec<(BlockType, BlockRenderConfig)> {
        Vec::new()
    }

    /// Map a key event to a command name.
    fn key_binding(&self, event: &KeyEvent) -> Option<SmolStr> {
        None
    }

    /// Handle a named command.
    fn handle_key_command(&self, command: &str, state: &EditorState) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle the return key.
    fn handle_return(&self, event: &KeyEvent, state: &EditorState) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle typed characters before they are inserted.
    fn handle_before_input(&self, chars: &str, state: &EditorState) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle pasted text.
    fn handle_pasted_text(&self, text: &str, html: Option<&str>, state: &EditorState) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle pasted files.
    fn handle_pasted_files(&self, files: &[FileBlob], state: &EditorState) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle files dropped at `selection`.
    fn handle_dropped_files(
        &self,
        selection: &SelectionState,
        files: &[FileBlob],
        state: &EditorState,
    ) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Handle a non-file drop at `selection`.
    fn handle_drop(
        &self,
        selection: &SelectionState,
        data: &DataTransfer,
        source: DragSource,
        state: &EditorState,
    ) -> HandleResult {
        HandleResult::NotHandled
    }

    /// Decorators contributed to the composite decorator.
    fn decorators(&self) -> Vec<Decorator> {
        Vec::new()
    }

    /// Transform every committed state.
    fn on_change(&self, state: EditorState) -> EditorState {
        state
    }
}

/// Run an extension hook, turning a panic into a logged `None`.
pub(crate) fn guarded<T>(owner: &str, hook: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(
                extension = owner,
                hook,
                message = panic_message(payload.as_ref()),
                "extension hook panicked; contribution skipped"
            );
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
