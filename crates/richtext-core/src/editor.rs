//! Editor session: input dispatch, commits and change notifications.
//!
//! # Overview
//!
//! An [`Editor`] owns the composed [`Pipeline`], the current [`EditorState`] and the list of
//! change subscribers. Input entry points route events through the pipeline; a claimed event
//! yields a new state which is committed:
//!
//! 1. the state is passed through every extension's `on_change` transform
//! 2. the session version is bumped
//! 3. every subscriber receives a [`StateChange`] and the new state
//!
//! Read-only and unmounted editors ignore commits.
//!
//! File pastes and drops are asynchronous. [`EditorHandle`] shares the editor
//! (`Rc<RefCell<_>>`, single-threaded) with the futures that read files: each file is read,
//! then applied to the *latest* committed state, one after another.
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{Editor, EditorConfig, KeyEvent, Pipeline};
//!
//! let mut editor = Editor::new(Pipeline::default(), EditorConfig::default());
//! editor.subscribe(|change, _state| {
//!     println!("{:?}: {} -> {}", change.change_type, change.old_version, change.new_version);
//! });
//! editor.insert_text("Hello");
//! editor.handle_key(&KeyEvent::new("z").with_ctrl());
//! assert_eq!(editor.state().document().plain_text(), "");
//! ```

use crate::commands::{CMD_REDO, CMD_UNDO, KeyEvent};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::persistence::DocumentStore;
use crate::pipeline::Pipeline;
use crate::plugin::{DataTransfer, DeferredEdit, DragSource, FileBlob, HandleResult, guarded};
use crate::selection::SelectionState;
use crate::snapshot::DocumentSnapshot;
use crate::state::EditorState;
use smol_str::SmolStr;
use std::cell::{Ref, RefCell, RefMut};
use std::future::Future;
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Kind of a committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// Document content changed.
    DocumentModified,
    /// Only the selection changed.
    SelectionChanged,
    /// Only the pending inline style (or nothing visible) changed.
    InlineStyleChanged,
}

/// Change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Change type.
    pub change_type: StateChangeType,
    /// Session version before the commit.
    pub old_version: u64,
    /// Session version after the commit.
    pub new_version: u64,
}

/// Subscriber callback.
pub type StateChangeCallback = Box<dyn FnMut(&StateChange, &EditorState)>;

/// Result of routing one input event.
pub enum DispatchOutcome {
    /// The event produced a committed state.
    Handled,
    /// An extension claimed the event; the edit completes once its files are read.
    Deferred(Box<dyn DeferredEdit>),
    /// Nothing claimed the event, or the commit was ignored.
    Ignored,
}

impl DispatchOutcome {
    /// Whether the event was committed.
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled)
    }
}

impl std::fmt::Debug for DispatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchOutcome::Handled => f.write_str("Handled"),
            DispatchOutcome::Deferred(edit) => f.debug_tuple("Deferred").field(&edit.files()).finish(),
            DispatchOutcome::Ignored => f.write_str("Ignored"),
        }
    }
}

/// A host file reader failed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FileReadError {
    /// I/O failure.
    #[error("failed to read {name}: {source}")]
    Io {
        /// File name.
        name: SmolStr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The read was aborted by the host.
    #[error("read of {0} was aborted")]
    Aborted(SmolStr),
}

/// Host port reading the contents of pasted/dropped files.
pub trait FileReader {
    /// Read the whole file.
    fn read(&self, file: &FileBlob) -> impl Future<Output = Result<Vec<u8>, FileReadError>>;
}

/// An editor session.
pub struct Editor {
    pipeline: Pipeline,
    state: EditorState,
    config: EditorConfig,
    version: u64,
    mounted: bool,
    callbacks: Vec<StateChangeCallback>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("pipeline", &self.pipeline)
            .field("version", &self.version)
            .field("mounted", &self.mounted)
            .field("read_only", &self.config.read_only)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// An editor over an empty document.
    pub fn new(pipeline: Pipeline, config: EditorConfig) -> Self {
        let state = EditorState::create_empty(&config);
        Self::with_state(pipeline, state, config)
    }

    /// An editor over `document`.
    pub fn with_document(pipeline: Pipeline, document: Document, config: EditorConfig) -> Self {
        let state = EditorState::create_with_document(document, &config);
        Self::with_state(pipeline, state, config)
    }

    /// An editor over the document loaded from `store`.
    pub fn load(pipeline: Pipeline, store: &impl DocumentStore, config: EditorConfig) -> Self {
        Self::with_document(pipeline, store.load(), config)
    }

    /// An editor starting from an existing state.
    pub fn with_state(pipeline: Pipeline, state: EditorState, config: EditorConfig) -> Self {
        Self {
            pipeline,
            state,
            config,
            version: 0,
            mounted: true,
            callbacks: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The composed pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Session configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Session version (bumped by every commit).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the editor is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether commits are ignored.
    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    /// Toggle read-only mode.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
    }

    /// Register a change subscriber.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange, &EditorState) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Stop accepting commits. In-flight file reads are discarded when they complete.
    pub fn unmount(&mut self) {
        self.mounted = false;
        tracing::debug!(version = self.version, "editor unmounted");
    }

    /// Make `state` current. Returns `false` when the commit was ignored.
    pub fn commit(&mut self, state: EditorState) -> bool {
        match self.stage(state) {
            Some(change) => {
                self.notify(&change);
                true
            }
            None => false,
        }
    }

    /// Make `state` current without notifying subscribers.
    fn stage(&mut self, state: EditorState) -> Option<StateChange> {
        if self.config.read_only || !self.mounted {
            tracing::debug!(
                read_only = self.config.read_only,
                mounted = self.mounted,
                "commit ignored"
            );
            return None;
        }
        if let Err(err) = state.validate() {
            tracing::error!(%err, "refusing to commit a state with an invalid selection");
            return None;
        }

        let next = self.pipeline.on_change(state);
        let change_type = if !std::ptr::eq(self.state.document(), next.document())
            && self.state.document() != next.document()
        {
            StateChangeType::DocumentModified
        } else if self.state.selection() != next.selection() {
            StateChangeType::SelectionChanged
        } else {
            StateChangeType::InlineStyleChanged
        };

        let old_version = self.version;
        self.version += 1;
        self.state = next;
        Some(StateChange {
            change_type,
            old_version,
            new_version: self.version,
        })
    }

    fn notify(&mut self, change: &StateChange) {
        for callback in &mut self.callbacks {
            callback(change, &self.state);
        }
    }

    fn settle(&mut self, result: HandleResult) -> DispatchOutcome {
        match result {
            HandleResult::Handled(state) => {
                if self.commit(state) {
                    DispatchOutcome::Handled
                } else {
                    DispatchOutcome::Ignored
                }
            }
            HandleResult::Deferred(edit) => DispatchOutcome::Deferred(edit),
            HandleResult::NotHandled => DispatchOutcome::Ignored,
        }
    }

    /// Route a key event: Enter goes to the return handlers, anything else through the key
    /// bindings to the key command handlers.
    pub fn handle_key(&mut self, event: &KeyEvent) -> DispatchOutcome {
        if event.key == "Enter" {
            return self.handle_return(event);
        }
        match self.pipeline.key_binding(event) {
            Some(command) => self.handle_key_command(&command),
            None => DispatchOutcome::Ignored,
        }
    }

    /// Run a named command.
    pub fn handle_key_command(&mut self, command: &str) -> DispatchOutcome {
        let result = self.pipeline.handle_key_command(command, &self.state);
        self.settle(result)
    }

    /// Handle the return key.
    pub fn handle_return(&mut self, event: &KeyEvent) -> DispatchOutcome {
        let result = self.pipeline.handle_return(event, &self.state);
        self.settle(result)
    }

    /// Handle typed characters.
    pub fn insert_text(&mut self, chars: &str) -> DispatchOutcome {
        let result = self.pipeline.handle_before_input(chars, &self.state);
        self.settle(result)
    }

    /// Handle pasted text.
    pub fn paste_text(&mut self, text: &str, html: Option<&str>) -> DispatchOutcome {
        let result = self.pipeline.handle_pasted_text(text, html, &self.state);
        self.settle(result)
    }

    /// Handle pasted files (see [`EditorHandle::paste_files`] for the asynchronous part).
    pub fn paste_files(&mut self, files: &[FileBlob]) -> DispatchOutcome {
        let result = self.pipeline.handle_pasted_files(files, &self.state);
        self.settle(result)
    }

    /// Handle files dropped at `selection`.
    pub fn drop_files(&mut self, selection: &SelectionState, files: &[FileBlob]) -> DispatchOutcome {
        let result = self
            .pipeline
            .handle_dropped_files(selection, files, &self.state);
        self.settle(result)
    }

    /// Handle a non-file drop at `selection`.
    pub fn handle_drop(
        &mut self,
        selection: &SelectionState,
        data: &DataTransfer,
        source: DragSource,
    ) -> DispatchOutcome {
        let result = self.pipeline.handle_drop(selection, data, source, &self.state);
        self.settle(result)
    }

    /// Move the selection.
    pub fn select(&mut self, selection: SelectionState) -> DispatchOutcome {
        match self.state.accept_selection(selection) {
            Ok(next) => self.settle(HandleResult::Handled(next)),
            Err(err) => {
                tracing::warn!(%err, "selection rejected");
                DispatchOutcome::Ignored
            }
        }
    }

    /// Give the editing surface focus.
    pub fn focus(&mut self) -> DispatchOutcome {
        self.set_focus(true)
    }

    /// Take focus away from the editing surface.
    pub fn blur(&mut self) -> DispatchOutcome {
        self.set_focus(false)
    }

    fn set_focus(&mut self, has_focus: bool) -> DispatchOutcome {
        if self.state.selection().has_focus == has_focus {
            return DispatchOutcome::Ignored;
        }
        let selection = self.state.selection().clone().with_focus(has_focus);
        self.select(selection)
    }

    /// Undo through the key command chain.
    pub fn undo(&mut self) -> DispatchOutcome {
        self.handle_key_command(CMD_UNDO)
    }

    /// Redo through the key command chain.
    pub fn redo(&mut self) -> DispatchOutcome {
        self.handle_key_command(CMD_REDO)
    }

    /// Apply one file of a deferred edit to the current state and commit the result.
    pub fn apply_deferred(&mut self, edit: &dyn DeferredEdit, file: &FileBlob, contents: &[u8]) -> bool {
        match self.stage_deferred(edit, file, contents) {
            Some(change) => {
                self.notify(&change);
                true
            }
            None => false,
        }
    }

    fn stage_deferred(
        &mut self,
        edit: &dyn DeferredEdit,
        file: &FileBlob,
        contents: &[u8],
    ) -> Option<StateChange> {
        let outcome = guarded("deferred-edit", "apply", || edit.apply(&self.state, file, contents));
        match outcome {
            Some(Ok(Some(next))) => self.stage(next),
            Some(Ok(None)) | None => None,
            Some(Err(err)) => {
                tracing::warn!(file = %file.name, %err, "deferred edit failed");
                None
            }
        }
    }

    /// Render snapshot of the current state.
    pub fn render(&self) -> DocumentSnapshot {
        self.pipeline.render(&self.state)
    }
}

/// Shared handle to an [`Editor`] for the asynchronous file paths.
#[derive(Clone)]
pub struct EditorHandle {
    inner: Rc<RefCell<Editor>>,
}

impl EditorHandle {
    /// Share `editor`.
    pub fn new(editor: Editor) -> Self {
        Self {
            inner: Rc::new(RefCell::new(editor)),
        }
    }

    /// Borrow the editor.
    pub fn borrow(&self) -> Ref<'_, Editor> {
        self.inner.borrow()
    }

    /// Borrow the editor mutably.
    pub fn borrow_mut(&self) -> RefMut<'_, Editor> {
        self.inner.borrow_mut()
    }

    /// Paste files. Returns the future completing the edit when an extension deferred it; the
    /// future resolves to the number of files applied.
    pub fn paste_files<R>(
        &self,
        files: Vec<FileBlob>,
        reader: R,
    ) -> Option<impl Future<Output = usize> + use<R>>
    where
        R: FileReader + 'static,
    {
        let outcome = self.inner.borrow_mut().paste_files(&files);
        self.deferred(outcome, reader)
    }

    /// Drop files at `selection`. See [`paste_files`](Self::paste_files).
    pub fn drop_files<R>(
        &self,
        selection: &SelectionState,
        files: Vec<FileBlob>,
        reader: R,
    ) -> Option<impl Future<Output = usize> + use<R>>
    where
        R: FileReader + 'static,
    {
        let outcome = self.inner.borrow_mut().drop_files(selection, &files);
        self.deferred(outcome, reader)
    }

    fn deferred<R>(
        &self,
        outcome: DispatchOutcome,
        reader: R,
    ) -> Option<impl Future<Output = usize> + use<R>>
    where
        R: FileReader + 'static,
    {
        match outcome {
            DispatchOutcome::Deferred(edit) => {
                Some(run_deferred(Rc::downgrade(&self.inner), edit, reader))
            }
            DispatchOutcome::Handled | DispatchOutcome::Ignored => None,
        }
    }
}

/// Read each file, then apply it to the latest state, strictly in order.
async fn run_deferred<R: FileReader>(
    editor: Weak<RefCell<Editor>>,
    edit: Box<dyn DeferredEdit>,
    reader: R,
) -> usize {
    let mut applied = 0;
    for file in edit.files() {
        let contents = match reader.read(file).await {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(file = %file.name, %err, "file read failed; skipping");
                continue;
            }
        };
        let Some(session) = editor.upgrade() else {
            tracing::debug!(file = %file.name, "editor dropped; discarding read");
            return applied;
        };
        // Subscribers run after the borrow ends so they can use their own handle.
        let (change, state, mut callbacks) = {
            let mut current = session.borrow_mut();
            if !current.is_mounted() {
                tracing::debug!(file = %file.name, "editor unmounted; discarding read");
                return applied;
            }
            let Some(change) = current.stage_deferred(edit.as_ref(), file, &contents) else {
                continue;
            };
            (change, current.state.clone(), std::mem::take(&mut current.callbacks))
        };
        applied += 1;
        for callback in &mut callbacks {
            callback(&change, &state);
        }
        let mut current = session.borrow_mut();
        callbacks.append(&mut current.callbacks);
        current.callbacks = callbacks;
    }
    applied
}
