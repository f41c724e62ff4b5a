//! Plugin composition engine.
//!
//! A [`Pipeline`] merges an ordered list of [`Extension`]s into one editor behaviour:
//!
//! ```text
//!   event ──► ext[0] ──► ext[1] ──► ... ──► core default ──► no-op
//!               │          │                    │
//!               └──────────┴── first Handled / Deferred stops the chain
//!
//!   styles ──► default map ◄── ext[0] ◄── ext[1] ...   (shallow merge, later wins)
//!   class  ──► ext[0] + " " + ext[1] + ...             (space-joined)
//!   render ──► first Some(renderer)                     (else default)
//! ```
//!
//! Every hook call is isolated: a panic or an invalid result is logged and only that
//! extension's contribution is skipped.

use crate::commands::{self, KeyEvent};
use crate::decorations::{CompositeDecorator, Decorator};
use crate::document::{Block, BlockType, DocumentError};
use crate::plugin::{DataTransfer, DragSource, Extension, FileBlob, HandleResult, guarded};
use crate::selection::SelectionState;
use crate::snapshot::{
    BlockRenderConfig, BlockRenderMap, BlockRenderer, BlockSnapshot, DocumentSnapshot,
    RenderContext, build_spans, default_render_map,
};
use crate::state::EditorState;
use crate::style::{StyleProps, StyleSet, default_style_props};
use smol_str::SmolStr;

/// An ordered, composed set of extensions.
pub struct Pipeline {
    extensions: Vec<Box<dyn Extension>>,
    decorator: CompositeDecorator,
    render_map: BlockRenderMap,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("extensions", &self.extension_names())
            .field("decorators", &self.decorator.len())
            .finish()
    }
}

impl Pipeline {
    /// Compose `extensions` in priority order.
    ///
    /// Decorators and render map entries are collected once here.
    pub fn new(extensions: Vec<Box<dyn Extension>>) -> Self {
        let mut decorators: Vec<Decorator> = Vec::new();
        let mut render_map = default_render_map();
        for extension in &extensions {
            let name = extension.name();
            if let Some(contributed) = guarded(name, "decorators", || extension.decorators()) {
                decorators.extend(contributed.into_iter().map(|d| d.with_owner(name)));
            }
            if let Some(entries) = guarded(name, "block_render_map", || extension.block_render_map()) {
                render_map.extend(entries);
            }
        }
        tracing::debug!(
            extensions = extensions.len(),
            decorators = decorators.len(),
            "pipeline composed"
        );
        Self {
            extensions,
            decorator: CompositeDecorator::new(decorators),
            render_map,
        }
    }

    /// Names of the composed extensions, in order.
    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|extension| extension.name()).collect()
    }

    /// The composite of every contributed decorator.
    pub fn decorator(&self) -> &CompositeDecorator {
        &self.decorator
    }

    /// Merged render map.
    pub fn render_map(&self) -> &BlockRenderMap {
        &self.render_map
    }

    /// Render config of a block type (unknown types render like unstyled blocks).
    pub fn render_config(&self, block_type: &BlockType) -> BlockRenderConfig {
        self.render_map
            .get(block_type)
            .or_else(|| self.render_map.get(&BlockType::Unstyled))
            .cloned()
            .unwrap_or_else(|| BlockRenderConfig::element("div"))
    }

    /// Style classifier: built-in props, then each extension's, later keys win.
    pub fn custom_style(&self, styles: &StyleSet, block: &Block) -> StyleProps {
        let mut props = default_style_props(styles);
        for extension in &self.extensions {
            if let Some(extra) = guarded(extension.name(), "custom_style", || {
                extension.custom_style(styles, block)
            }) {
                props.extend(extra);
            }
        }
        props
    }

    /// Class selector: every contribution, space-joined in order.
    pub fn block_style(&self, block: &Block) -> Option<SmolStr> {
        let classes: Vec<SmolStr> = self
            .extensions
            .iter()
            .filter_map(|extension| {
                guarded(extension.name(), "block_style", || extension.block_style(block)).flatten()
            })
            .filter(|class| !class.is_empty())
            .collect();
        if classes.is_empty() {
            None
        } else {
            Some(SmolStr::new(classes.join(" ")))
        }
    }

    /// Render selector: the first extension returning a renderer wins.
    pub fn block_renderer(&self, block: &Block, ctx: &RenderContext<'_>) -> Option<BlockRenderer> {
        self.extensions.iter().find_map(|extension| {
            guarded(extension.name(), "block_renderer", || {
                extension.block_renderer(block, ctx)
            })
            .flatten()
        })
    }

    /// Key binding: the first extension binding, then the built-in bindings.
    pub fn key_binding(&self, event: &KeyEvent) -> Option<SmolStr> {
        self.extensions
            .iter()
            .find_map(|extension| {
                guarded(extension.name(), "key_binding", || extension.key_binding(event)).flatten()
            })
            .or_else(|| commands::default_key_binding(event))
    }

    fn dispatch(
        &self,
        hook: &'static str,
        state: &EditorState,
        mut handler: impl FnMut(&dyn Extension) -> HandleResult,
    ) -> HandleResult {
        for extension in &self.extensions {
            let extension = extension.as_ref();
            let name = extension.name();
            match guarded(name, hook, || handler(extension)) {
                None | Some(HandleResult::NotHandled) => {}
                Some(HandleResult::Handled(next)) => {
                    if let Err(err) = next.validate() {
                        tracing::error!(
                            extension = name,
                            hook,
                            %err,
                            "handler returned an invalid state; skipped"
                        );
                        continue;
                    }
                    tracing::debug!(extension = name, hook, version = state.version(), "event handled");
                    return HandleResult::Handled(next);
                }
                Some(deferred) => {
                    tracing::debug!(extension = name, hook, "event deferred");
                    return deferred;
                }
            }
        }
        HandleResult::NotHandled
    }

    fn core(hook: &'static str, result: Result<Option<EditorState>, DocumentError>) -> HandleResult {
        match result {
            Ok(Some(next)) => {
                tracing::debug!(hook, "event handled by core");
                HandleResult::Handled(next)
            }
            Ok(None) => HandleResult::NotHandled,
            Err(err) => {
                tracing::warn!(hook, %err, "core handler failed");
                HandleResult::NotHandled
            }
        }
    }

    /// Run a named command.
    pub fn handle_key_command(&self, command: &str, state: &EditorState) -> HandleResult {
        match self.dispatch("handle_key_command", state, |ext| {
            ext.handle_key_command(command, state)
        }) {
            HandleResult::NotHandled => Self::core(
                "handle_key_command",
                commands::handle_key_command(state, command),
            ),
            claimed => claimed,
        }
    }

    /// Handle the return key (core: split the block).
    pub fn handle_return(&self, event: &KeyEvent, state: &EditorState) -> HandleResult {
        match self.dispatch("handle_return", state, |ext| ext.handle_return(event, state)) {
            HandleResult::NotHandled => {
                Self::core("handle_return", commands::split_block(state).map(Some))
            }
            claimed => claimed,
        }
    }

    /// Handle typed characters (core: insert with the current inline style).
    pub fn handle_before_input(&self, chars: &str, state: &EditorState) -> HandleResult {
        match self.dispatch("handle_before_input", state, |ext| {
            ext.handle_before_input(chars, state)
        }) {
            HandleResult::NotHandled if !chars.is_empty() => Self::core(
                "handle_before_input",
                commands::insert_characters(state, chars).map(Some),
            ),
            other => other,
        }
    }

    /// Handle pasted text (core: insert, one block per line).
    pub fn handle_pasted_text(
        &self,
        text: &str,
        html: Option<&str>,
        state: &EditorState,
    ) -> HandleResult {
        match self.dispatch("handle_pasted_text", state, |ext| {
            ext.handle_pasted_text(text, html, state)
        }) {
            HandleResult::NotHandled if !text.is_empty() => Self::core(
                "handle_pasted_text",
                commands::paste_text(state, text).map(Some),
            ),
            other => other,
        }
    }

    /// Handle pasted files. The core does not handle files.
    pub fn handle_pasted_files(&self, files: &[FileBlob], state: &EditorState) -> HandleResult {
        self.dispatch("handle_pasted_files", state, |ext| {
            ext.handle_pasted_files(files, state)
        })
    }

    /// Handle files dropped at `selection`. The core does not handle files.
    pub fn handle_dropped_files(
        &self,
        selection: &SelectionState,
        files: &[FileBlob],
        state: &EditorState,
    ) -> HandleResult {
        self.dispatch("handle_dropped_files", state, |ext| {
            ext.handle_dropped_files(selection, files, state)
        })
    }

    /// Handle a non-file drop. The core does not handle drops.
    pub fn handle_drop(
        &self,
        selection: &SelectionState,
        data: &DataTransfer,
        source: DragSource,
        state: &EditorState,
    ) -> HandleResult {
        self.dispatch("handle_drop", state, |ext| {
            ext.handle_drop(selection, data, source, state)
        })
    }

    /// Fold `state` through every extension's post-change transform.
    pub fn on_change(&self, state: EditorState) -> EditorState {
        let mut current = state;
        for extension in &self.extensions {
            let name = extension.name();
            let Some(next) = guarded(name, "on_change", || extension.on_change(current.clone()))
            else {
                continue;
            };
            match next.validate() {
                Ok(()) => current = next,
                Err(err) => {
                    tracing::error!(extension = name, %err, "on_change returned an invalid state; skipped");
                }
            }
        }
        current
    }

    /// Build the render snapshot of `state`.
    pub fn render(&self, state: &EditorState) -> DocumentSnapshot {
        let document = state.document();
        let ctx = RenderContext::new(document, self);
        let blocks = document
            .blocks()
            .iter()
            .map(|block| {
                let config = self.render_config(block.block_type());
                let decorations = self.decorator.decorate(block, document);
                let spans = build_spans(block, &decorations, |styles| {
                    self.custom_style(styles, block)
                });
                tracing::trace!(
                    block = %block.key(),
                    spans = spans.len(),
                    decorations = decorations.len(),
                    "block rendered"
                );
                BlockSnapshot {
                    key: block.key().clone(),
                    block_type: block.block_type().clone(),
                    depth: block.depth(),
                    element: config.element,
                    wrapper: config.wrapper,
                    class_name: self.block_style(block),
                    renderer: self.block_renderer(block, &ctx),
                    spans,
                }
            })
            .collect();
        DocumentSnapshot {
            blocks,
            selection: state.selection().clone(),
            version: state.version(),
        }
    }
}
