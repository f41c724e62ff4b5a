//! Drag relocation of inline images.
//!
//! ```text
//!            begin                release over a valid target
//!   Idle ───────────► Dragging ─────────────────────────────► Dropped
//!    ▲                    │
//!    │      reset         │ release outside the document, or drop rejected
//!    └────────────────────┴─────────────────────────────────► Cancelled
//! ```
//!
//! Only one drag can be active at a time. A drop hands the editor a [`DataTransfer`] carrying
//! the image's entity key and the selection it was taken from; the
//! [`InlineImageExtension`](super::InlineImageExtension) turns it into a single move transform.

use super::image_at;
use richtext_core::{
    DataTransfer, DispatchOutcome, DragSource, Editor, EditorState, EntityKey, SelectionState,
};
use thiserror::Error;

/// Errors of the drag state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DragError {
    /// A drag is already in progress.
    #[error("an image drag is already in progress")]
    AlreadyDragging,

    /// The drag source is not an inline image.
    #[error("entity {0} is not an inline image")]
    NotAnImage(EntityKey),

    /// No drag is in progress.
    #[error("no image drag in progress")]
    NotDragging,
}

/// Phase of an image drag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    /// No drag.
    #[default]
    Idle,
    /// An image is being dragged from `origin`.
    Dragging {
        /// Dragged image.
        entity: EntityKey,
        /// Where the image was when the drag started.
        origin: SelectionState,
    },
    /// The image was released over `target`.
    Dropped {
        /// Dragged image.
        entity: EntityKey,
        /// Drop point.
        target: SelectionState,
    },
    /// The drag ended without moving the image.
    Cancelled {
        /// Dragged image.
        entity: EntityKey,
    },
}

/// Image drag tracker.
#[derive(Debug, Clone, Default)]
pub struct ImageDrag {
    phase: DragPhase,
}

impl ImageDrag {
    /// A tracker in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// Start dragging the image `entity`. Returns the drag payload.
    pub fn begin(&mut self, state: &EditorState, entity: &EntityKey) -> Result<DataTransfer, DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        if image_at(state, entity).is_none() {
            return Err(DragError::NotAnImage(entity.clone()));
        }
        let (key, range) = state
            .document()
            .entity_range(entity)
            .ok_or_else(|| DragError::NotAnImage(entity.clone()))?;
        tracing::debug!(%entity, block = %key, offset = range.start, "image drag started");
        let origin = SelectionState::range(key.clone(), range.start, key, range.end);
        self.phase = DragPhase::Dragging {
            entity: entity.clone(),
            origin: origin.clone(),
        };
        Ok(DataTransfer::entity(entity.clone()).with_origin(origin))
    }

    /// End the drag over `target`. A missing target, or one outside `state`'s document,
    /// cancels the drag.
    pub fn release(
        &mut self,
        state: &EditorState,
        target: Option<SelectionState>,
    ) -> Result<DragPhase, DragError> {
        let DragPhase::Dragging { entity, .. } = &self.phase else {
            return Err(DragError::NotDragging);
        };
        let entity = entity.clone();
        self.phase = match target {
            Some(target) if state.document().normalize(&target).is_ok() => {
                DragPhase::Dropped { entity, target }
            }
            _ => DragPhase::Cancelled { entity },
        };
        Ok(self.phase.clone())
    }

    /// Release over `target` and route the drop through `editor`. The drag ends cancelled,
    /// with the document untouched, when the target is invalid or no handler moves the image.
    pub fn drop_into(
        &mut self,
        editor: &mut Editor,
        target: SelectionState,
    ) -> Result<DispatchOutcome, DragError> {
        let DragPhase::Dragging { origin, .. } = &self.phase else {
            return Err(DragError::NotDragging);
        };
        let origin = origin.clone();
        let DragPhase::Dropped { entity, target } = self.release(editor.state(), Some(target))?
        else {
            return Ok(DispatchOutcome::Ignored);
        };
        let payload = DataTransfer::entity(entity.clone()).with_origin(origin);
        let outcome = editor.handle_drop(&target, &payload, DragSource::Internal);
        if !outcome.is_handled() {
            tracing::debug!(%entity, "image drop rejected; drag cancelled");
            self.phase = DragPhase::Cancelled { entity };
        }
        Ok(outcome)
    }

    /// Return to the idle phase.
    pub fn reset(&mut self) {
        self.phase = DragPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline_image::{ImageData, insert_image};
    use richtext_core::{BlockKey, Document, EditorConfig};

    fn with_image() -> (EditorState, EntityKey) {
        let state =
            EditorState::create_with_document(Document::from_text("ab"), &EditorConfig::default());
        let state = insert_image(&state, &ImageData::new("x.png")).unwrap();
        let entity = state.document().first_block().entity_at(0).cloned().unwrap();
        (state, entity)
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let (state, entity) = with_image();
        let mut drag = ImageDrag::new();
        let payload = drag.begin(&state, &entity).unwrap();
        assert_eq!(payload.entity.as_ref(), Some(&entity));
        assert_eq!(drag.begin(&state, &entity), Err(DragError::AlreadyDragging));
    }

    #[test]
    fn test_release_without_target_cancels() {
        let (state, entity) = with_image();
        let mut drag = ImageDrag::new();
        drag.begin(&state, &entity).unwrap();
        assert_eq!(drag.release(&state, None), Ok(DragPhase::Cancelled { entity }));
        assert_eq!(drag.release(&state, None), Err(DragError::NotDragging));
        drag.reset();
        assert_eq!(drag.phase(), &DragPhase::Idle);
    }

    #[test]
    fn test_release_outside_document_cancels() {
        let (state, entity) = with_image();
        let mut drag = ImageDrag::new();
        drag.begin(&state, &entity).unwrap();
        let outside = SelectionState::collapsed(BlockKey::new("nope"), 0);
        assert_eq!(
            drag.release(&state, Some(outside)),
            Ok(DragPhase::Cancelled { entity })
        );
    }

    #[test]
    fn test_payload_carries_origin() {
        let (state, entity) = with_image();
        let key = state.document().first_block().key().clone();
        let payload = ImageDrag::new().begin(&state, &entity).unwrap();
        assert_eq!(payload.origin, Some(SelectionState::range(key.clone(), 0, key, 1)));
    }

    #[test]
    fn test_begin_rejects_unknown_entity() {
        let (state, _) = with_image();
        let mut drag = ImageDrag::new();
        let missing = EntityKey::new("404");
        assert_eq!(
            drag.begin(&state, &missing),
            Err(DragError::NotAnImage(missing.clone()))
        );
        assert!(!drag.is_dragging());
    }
}
