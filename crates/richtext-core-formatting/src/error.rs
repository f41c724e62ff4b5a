//! Error types for toolbar commands.

use richtext_core::DocumentError;
use thiserror::Error;

/// Errors that can occur when applying a toolbar command.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CommandError {
    /// The underlying document transform failed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Undo was requested with an empty undo stack.
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo was requested with an empty redo stack.
    #[error("nothing to redo")]
    NothingToRedo,
}
