//! Persistence port.
//!
//! The core never persists by itself. An application shell wires a [`DocumentStore`] to
//! [`Editor::subscribe`](crate::Editor::subscribe) so every committed state is saved.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::raw::RawError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A string key-value store (browser local storage, a file, a settings table ...).
pub trait KeyValueStore {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`.
    fn set(&self, key: &str, value: String);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.borrow_mut().insert(key.to_string(), value);
    }
}

/// Loads and saves the document of an editor.
pub trait DocumentStore {
    /// The persisted document, or an empty one when nothing usable is stored.
    fn load(&self) -> Document;
    /// Persist `document`.
    fn save(&self, document: &Document) -> Result<(), RawError>;
}

/// [`DocumentStore`] writing raw JSON under one well-known key.
#[derive(Debug)]
pub struct StoragePersistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> StoragePersistence<S> {
    /// Persist under the configured storage key.
    pub fn new(store: S, config: &EditorConfig) -> Self {
        Self {
            store,
            key: config.storage_key.clone(),
        }
    }

    /// The storage key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> DocumentStore for StoragePersistence<S> {
    fn load(&self) -> Document {
        let Some(json) = self.store.get(&self.key) else {
            tracing::debug!(key = %self.key, "no persisted document; starting empty");
            return Document::new();
        };
        match Document::from_json(&json) {
            Ok(document) => document,
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "persisted document is malformed; starting empty");
                Document::new()
            }
        }
    }

    fn save(&self, document: &Document) -> Result<(), RawError> {
        self.store.set(&self.key, document.to_json()?);
        Ok(())
    }
}
