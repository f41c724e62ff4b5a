#![warn(missing_docs)]
//! Richtext Core - Headless Rich-Text Editor Kernel
//!
//! # Overview
//!
//! `richtext-core` is a headless rich-text editor kernel. It owns the document model, selection,
//! immutable versioned editor state with undo/redo, and a plugin composition engine. It does
//! not draw anything: the upper layer renders the [`DocumentSnapshot`] and feeds input events
//! back into an [`Editor`].
//!
//! # Core Features
//!
//! - **Immutable Documents**: block sequence + entity registry, structurally shared through `Arc`
//! - **Versioned State**: every transition yields a new [`EditorState`]; bounded undo/redo
//! - **Plugin Composition**: ordered [`Extension`]s merged by a [`Pipeline`] with fault isolation
//! - **Decorators**: render-time annotations with a deterministic overlap policy
//! - **Async File Insertion**: pasted/dropped files applied in order against the latest state
//! - **Portable Raw Format**: camelCase JSON compatible with common block-editor storage
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Editor Session (dispatch, commit, notify)  │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Pipeline (extensions, decorators, render)  │  ← Composition
//! ├─────────────────────────────────────────────┤
//! │  Commands (key bindings, styles, deletion)  │  ← Default Behaviour
//! ├─────────────────────────────────────────────┤
//! │  EditorState + History                      │  ← Versioned State
//! ├─────────────────────────────────────────────┤
//! │  Document + Modifier + Selection            │  ← Content Model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use richtext_core::{Editor, EditorConfig, KeyEvent, Pipeline, BOLD};
//!
//! let mut editor = Editor::new(Pipeline::default(), EditorConfig::default());
//!
//! // Pending bold style, then type.
//! editor.handle_key(&KeyEvent::new("b").with_ctrl());
//! editor.insert_text("Hello");
//!
//! let snapshot = editor.render();
//! let span = &snapshot.blocks[0].spans[0];
//! assert_eq!(span.text, "Hello");
//! assert!(span.styles.contains(BOLD));
//! assert_eq!(span.style.get("fontWeight").map(|v| v.as_str()), Some("bold"));
//! ```
//!
//! # Module Description
//!
//! - [`document`] - blocks, entities and the document container
//! - [`modifier`] - pure document transforms
//! - [`selection`] - anchor/focus selections
//! - [`style`] - inline style tags and style families
//! - [`state`] / [`history`] - immutable editor state and undo/redo
//! - [`commands`] - built-in key bindings and editing commands
//! - [`plugin`] / [`pipeline`] - extension contract and composition engine
//! - [`decorations`] / [`snapshot`] - decorators and render data
//! - [`editor`] - the editor session and asynchronous file insertion
//! - [`raw`] / [`persistence`] - raw JSON format and storage port
//! - [`config`] - editor configuration

pub mod commands;
pub mod config;
pub mod decorations;
pub mod document;
pub mod editor;
pub mod history;
pub mod modifier;
pub mod persistence;
pub mod pipeline;
pub mod plugin;
pub mod raw;
pub mod selection;
pub mod snapshot;
pub mod state;
pub mod style;

pub use commands::KeyEvent;
pub use config::EditorConfig;
pub use decorations::{CompositeDecorator, DecoratedRange, Decorator, DecoratorStrategy};
pub use document::{
    Block, BlockData, BlockKey, BlockType, CharacterMetadata, Document, DocumentError, Entity,
    EntityData, EntityKey, EntityMap, Mutability,
};
pub use editor::{
    DispatchOutcome, Editor, EditorHandle, FileReadError, FileReader, StateChange,
    StateChangeCallback, StateChangeType,
};
pub use history::History;
pub use modifier::ENTITY_PLACEHOLDER;
pub use persistence::{DocumentStore, KeyValueStore, MemoryStore, StoragePersistence};
pub use pipeline::Pipeline;
pub use plugin::{DataTransfer, DeferredEdit, DragSource, Extension, FileBlob, HandleResult};
pub use raw::{RawBlock, RawDocument, RawEntity, RawEntityRange, RawEntityRef, RawError, RawStyleRange};
pub use selection::{SelectionPoint, SelectionRange, SelectionState};
pub use snapshot::{
    BlockRenderConfig, BlockRenderMap, BlockRenderer, BlockSnapshot, DocumentSnapshot,
    RenderContext, SpanSnapshot, WrapperConfig, default_render_map,
};
pub use state::{ChangeType, EditorState};
pub use style::{
    BOLD, CODE, ITALIC, STRIKETHROUGH, StyleFamily, StyleProps, StyleSet, UNDERLINE,
    default_style_props,
};
