//! Inline images.
//!
//! # Overview
//!
//! An inline image is a single placeholder character carrying an immutable `INLINE_IMAGE`
//! entity whose data holds the image source. Images enter the document in three ways:
//!
//! ```text
//! insert_image(state, data)         ──► placeholder + entity at the selection
//! paste / drop of image files       ──► Deferred edit: read ─► data URI ─► insert, per file
//! internal drag (see [`drag`])      ──► handle_drop ─► move_entity to the drop point
//! ```
//!
//! Files whose MIME type is not an accepted image type are left to the other handlers.

pub mod drag;

pub use drag::{DragError, DragPhase, ImageDrag};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use richtext_core::{
    ChangeType, DataTransfer, Decorator, DeferredEdit, DocumentError, DragSource, EditorState,
    Entity, EntityData, EntityKey, Extension, FileBlob, HandleResult, SelectionState,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smol_str::SmolStr;
use std::cell::Cell;

/// Entity type of inline images.
pub const INLINE_IMAGE: &str = "INLINE_IMAGE";

/// Component name of the image decorator.
pub const INLINE_IMAGE_COMPONENT: &str = "inline-image";

/// MIME types accepted from pasted or dropped files.
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/bmp"];

/// Entity payload of an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Image source (URL or data URI).
    pub src: String,
}

impl ImageData {
    /// Image data for `src`.
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    /// Image data holding `bytes` as a base64 data URI.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self::new(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    /// The entity data map.
    pub fn to_entity_data(&self) -> EntityData {
        let mut data = EntityData::new();
        data.insert("src".to_owned(), Value::from(self.src.as_str()));
        data
    }

    /// Read image data back from an entity; `None` for other entity types.
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        if entity.entity_type() != INLINE_IMAGE {
            return None;
        }
        let src = entity.data().get("src")?.as_str()?;
        Some(Self::new(src))
    }
}

/// Whether `file` is an image type the editor accepts.
pub fn is_accepted_image(file: &FileBlob) -> bool {
    ACCEPTED_IMAGE_TYPES
        .iter()
        .any(|accepted| file.mime_type.eq_ignore_ascii_case(accepted))
}

/// Insert an image at the selection, replacing any selected text.
pub fn insert_image(state: &EditorState, data: &ImageData) -> Result<EditorState, DocumentError> {
    insert_image_at(state, state.selection(), data)
}

fn insert_image_at(
    state: &EditorState,
    selection: &SelectionState,
    data: &ImageData,
) -> Result<EditorState, DocumentError> {
    let (document, key, cursor) =
        state
            .document()
            .insert_entity(selection, INLINE_IMAGE, data.to_entity_data())?;
    tracing::debug!(entity = %key, "inline image inserted");
    Ok(state.push(document, cursor, ChangeType::ApplyEntity))
}

/// Image data of `entity`, if it is an inline image of the current document.
pub fn image_at(state: &EditorState, entity: &EntityKey) -> Option<ImageData> {
    state
        .document()
        .entity(entity)
        .and_then(|entity| ImageData::from_entity(entity))
}

/// Move the image `entity`, found inside `origin`, to the start of `target` as one undoable
/// change.
pub fn move_image(
    state: &EditorState,
    entity: &EntityKey,
    origin: &SelectionState,
    target: &SelectionState,
) -> Result<EditorState, DocumentError> {
    let (document, cursor) = state.document().move_entity(origin, target, entity)?;
    Ok(state.push(document, cursor, ChangeType::MoveEntity))
}

/// Deferred insertion of image files.
///
/// The first file lands at the drop target (when it is still valid); every later file follows
/// the cursor left by the previous insertion.
#[derive(Debug)]
pub struct ImageFileInsertion {
    files: Vec<FileBlob>,
    target: Option<SelectionState>,
    applied: Cell<bool>,
}

impl ImageFileInsertion {
    /// Insert `files` at the cursor.
    pub fn at_cursor(files: Vec<FileBlob>) -> Self {
        Self {
            files,
            target: None,
            applied: Cell::new(false),
        }
    }

    /// Insert `files` starting at `target`.
    pub fn at(target: SelectionState, files: Vec<FileBlob>) -> Self {
        Self {
            files,
            target: Some(target),
            applied: Cell::new(false),
        }
    }
}

impl DeferredEdit for ImageFileInsertion {
    fn files(&self) -> &[FileBlob] {
        &self.files
    }

    fn apply(
        &self,
        state: &EditorState,
        file: &FileBlob,
        contents: &[u8],
    ) -> Result<Option<EditorState>, DocumentError> {
        let target = match &self.target {
            Some(target) if !self.applied.get() && state.document().normalize(target).is_ok() => {
                target
            }
            _ => state.selection(),
        };
        let data = ImageData::from_bytes(&file.mime_type, contents);
        let next = insert_image_at(state, target, &data)?;
        self.applied.set(true);
        Ok(Some(next))
    }
}

fn accepted_files(files: &[FileBlob]) -> Vec<FileBlob> {
    files
        .iter()
        .filter(|file| {
            let accepted = is_accepted_image(file);
            if !accepted {
                tracing::warn!(file = %file.name, mime = %file.mime_type, "unsupported file type");
            }
            accepted
        })
        .cloned()
        .collect()
}

/// Image decorator, image file insertion and internal image drops.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineImageExtension;

impl Extension for InlineImageExtension {
    fn name(&self) -> &str {
        "inline-image"
    }

    fn decorators(&self) -> Vec<Decorator> {
        vec![Decorator::for_entity_type(INLINE_IMAGE_COMPONENT, INLINE_IMAGE)]
    }

    fn handle_pasted_files(&self, files: &[FileBlob], _state: &EditorState) -> HandleResult {
        let images = accepted_files(files);
        if images.is_empty() {
            return HandleResult::NotHandled;
        }
        HandleResult::Deferred(Box::new(ImageFileInsertion::at_cursor(images)))
    }

    fn handle_dropped_files(
        &self,
        selection: &SelectionState,
        files: &[FileBlob],
        _state: &EditorState,
    ) -> HandleResult {
        let images = accepted_files(files);
        if images.is_empty() {
            return HandleResult::NotHandled;
        }
        HandleResult::Deferred(Box::new(ImageFileInsertion::at(selection.clone(), images)))
    }

    fn handle_drop(
        &self,
        selection: &SelectionState,
        data: &DataTransfer,
        source: DragSource,
        state: &EditorState,
    ) -> HandleResult {
        if source != DragSource::Internal {
            return HandleResult::NotHandled;
        }
        let Some(entity) = &data.entity else {
            return HandleResult::NotHandled;
        };
        if image_at(state, entity).is_none() {
            return HandleResult::NotHandled;
        }
        let origin = data.origin.as_ref().unwrap_or(state.selection());
        match move_image(state, entity, origin, selection) {
            Ok(next) => HandleResult::Handled(next),
            Err(err) => {
                tracing::warn!(%entity, %err, "image drop rejected");
                HandleResult::NotHandled
            }
        }
    }
}
