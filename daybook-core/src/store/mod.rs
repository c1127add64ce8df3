//! Document store abstraction.
//!
//! Every piece of user data lives in JSON-like documents addressed by
//! `/`-separated paths: the user record at `users/{userId}` (which also
//! carries the category array) and one document per event at
//! `users/{userId}/events/{eventId}`.
//!
//! Two implementations ship with the crate: [`MemoryStore`] for tests and
//! throwaway sessions, and [`FsStore`] which keeps one JSON file per document
//! on disk.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::{DaybookError, DaybookResult};

const USERS: &str = "users";
const EVENTS: &str = "events";

/// Buffered snapshots per collection subscription. Snapshots are complete,
/// so a lagging receiver only ever needs the newest one.
const SNAPSHOT_CAPACITY: usize = 16;

/// A path to a document or a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath(String);

impl DocPath {
    /// Build a path from segments. Segments must be non-empty and may not
    /// contain `/` or be `.`/`..`.
    pub fn new<I, T>(segments: I) -> DaybookResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut parts = Vec::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
                return Err(DaybookError::validation(format!(
                    "Invalid path segment '{}'",
                    segment
                )));
            }
            parts.push(segment.to_string());
        }
        if parts.is_empty() {
            return Err(DaybookError::validation("Empty document path"));
        }
        Ok(DocPath(parts.join("/")))
    }

    /// `users/{userId}`
    pub fn user(user_id: &str) -> DaybookResult<Self> {
        Self::new([USERS, user_id])
    }

    /// `users/{userId}/events`
    pub fn events(user_id: &str) -> DaybookResult<Self> {
        Self::new([USERS, user_id, EVENTS])
    }

    /// `users/{userId}/events/{eventId}`
    pub fn event(user_id: &str, event_id: &str) -> DaybookResult<Self> {
        Self::new([USERS, user_id, EVENTS, event_id])
    }

    pub fn child(&self, segment: &str) -> DaybookResult<Self> {
        Self::new(self.segments().chain(std::iter::once(segment)))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// The collection this document belongs to, `None` for top-level paths.
    pub fn parent(&self) -> Option<DocPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| DocPath(parent.to_string()))
    }

    /// Last path segment (the document id).
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// The storage seam every store in this crate talks to.
///
/// Writes replace or merge whole documents; there is no locking, so two
/// sessions doing read-modify-write on the same document race and the last
/// write wins.
pub trait DocumentStore: Send + Sync {
    /// Read a document, `None` when it does not exist.
    fn get_document(
        &self,
        path: &DocPath,
    ) -> impl Future<Output = DaybookResult<Option<Value>>> + Send;

    /// Write a document. With `merge`, top-level fields of `data` are merged
    /// into the existing document instead of replacing it.
    fn set_document(
        &self,
        path: &DocPath,
        data: Value,
        merge: bool,
    ) -> impl Future<Output = DaybookResult<()>> + Send;

    /// Merge `partial` into an existing document. Fails with `NotFound` when
    /// the document does not exist.
    fn update_document(
        &self,
        path: &DocPath,
        partial: Value,
    ) -> impl Future<Output = DaybookResult<()>> + Send;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete_document(&self, path: &DocPath) -> impl Future<Output = DaybookResult<()>> + Send;

    /// All documents directly inside a collection, ordered by id.
    fn list_collection(
        &self,
        path: &DocPath,
    ) -> impl Future<Output = DaybookResult<Vec<Document>>> + Send;

    /// Receive a full snapshot of the collection after every change to it.
    fn subscribe_collection(&self, path: &DocPath) -> broadcast::Receiver<Vec<Document>>;
}

/// Shallow merge of `patch`'s top-level fields into `target`.
/// A non-object on either side replaces `target` entirely.
pub(crate) fn merge_fields(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(existing), Value::Object(fields)) => {
            for (key, value) in fields {
                existing.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Per-collection snapshot channels shared by the store implementations.
#[derive(Default)]
pub(crate) struct Watchers {
    senders: Mutex<HashMap<String, broadcast::Sender<Vec<Document>>>>,
}

impl Watchers {
    pub(crate) fn subscribe(&self, collection: &DocPath) -> broadcast::Receiver<Vec<Document>> {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders
            .entry(collection.as_str().to_string())
            .or_insert_with(|| broadcast::channel(SNAPSHOT_CAPACITY).0)
            .subscribe()
    }

    /// The sender for a document's parent collection, if anyone listens.
    pub(crate) fn sender_for(&self, doc: &DocPath) -> Option<broadcast::Sender<Vec<Document>>> {
        let collection = doc.parent()?;
        let senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        senders
            .get(collection.as_str())
            .filter(|sender| sender.receiver_count() > 0)
            .cloned()
    }
}
