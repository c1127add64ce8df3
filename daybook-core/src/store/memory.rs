//! In-memory document store.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::{DocPath, Document, DocumentStore, Watchers, merge_fields};
use crate::error::{DaybookError, DaybookResult};

/// Documents kept in a sorted map keyed by path. Nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Value>>,
    watchers: Watchers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn docs(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Value>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn collection(&self, path: &DocPath) -> Vec<Document> {
        let prefix = format!("{}/", path);
        self.docs()
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, data)| {
                let id = &key[prefix.len()..];
                (!id.contains('/')).then(|| Document {
                    id: id.to_string(),
                    data: data.clone(),
                })
            })
            .collect()
    }

    fn notify(&self, path: &DocPath) {
        if let (Some(sender), Some(collection)) = (self.watchers.sender_for(path), path.parent()) {
            let _ = sender.send(self.collection(&collection));
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get_document(&self, path: &DocPath) -> DaybookResult<Option<Value>> {
        Ok(self.docs().get(path.as_str()).cloned())
    }

    async fn set_document(&self, path: &DocPath, data: Value, merge: bool) -> DaybookResult<()> {
        debug!(path = %path, merge, "set document");
        {
            let mut docs = self.docs();
            match docs.get_mut(path.as_str()) {
                Some(existing) if merge => merge_fields(existing, data),
                _ => {
                    docs.insert(path.as_str().to_string(), data);
                }
            }
        }
        self.notify(path);
        Ok(())
    }

    async fn update_document(&self, path: &DocPath, partial: Value) -> DaybookResult<()> {
        debug!(path = %path, "update document");
        {
            let mut docs = self.docs();
            let existing = docs
                .get_mut(path.as_str())
                .ok_or_else(|| DaybookError::not_found("Document", path.as_str()))?;
            merge_fields(existing, partial);
        }
        self.notify(path);
        Ok(())
    }

    async fn delete_document(&self, path: &DocPath) -> DaybookResult<()> {
        debug!(path = %path, "delete document");
        let removed = self.docs().remove(path.as_str()).is_some();
        if removed {
            self.notify(path);
        }
        Ok(())
    }

    async fn list_collection(&self, path: &DocPath) -> DaybookResult<Vec<Document>> {
        Ok(self.collection(path))
    }

    fn subscribe_collection(&self, path: &DocPath) -> broadcast::Receiver<Vec<Document>> {
        self.watchers.subscribe(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_and_merge() {
        let store = MemoryStore::new();
        let path = DocPath::user("alice").unwrap();

        store.set_document(&path, json!({"username": "alice"}), false).await.unwrap();
        store.set_document(&path, json!({"flag": true}), true).await.unwrap();

        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc, json!({"username": "alice", "flag": true}));

        store.set_document(&path, json!({"flag": false}), false).await.unwrap();
        let doc = store.get_document(&path).await.unwrap().unwrap();
        assert_eq!(doc, json!({"flag": false}));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let path = DocPath::event("alice", "nope").unwrap();
        let err = store.update_document(&path, json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_collection_skips_nested_documents() {
        let store = MemoryStore::new();
        store
            .set_document(&DocPath::user("alice").unwrap(), json!({}), false)
            .await
            .unwrap();
        store
            .set_document(&DocPath::event("alice", "b").unwrap(), json!({"n": 2}), false)
            .await
            .unwrap();
        store
            .set_document(&DocPath::event("alice", "a").unwrap(), json!({"n": 1}), false)
            .await
            .unwrap();
        store
            .set_document(&DocPath::event("bob", "c").unwrap(), json!({"n": 3}), false)
            .await
            .unwrap();

        let events = store
            .list_collection(&DocPath::events("alice").unwrap())
            .await
            .unwrap();
        let ids: Vec<_> = events.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let users = store.list_collection(&DocPath::new(["users"]).unwrap()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "alice");
    }

    #[tokio::test]
    async fn test_subscribers_receive_full_snapshots() {
        let store = MemoryStore::new();
        let events = DocPath::events("alice").unwrap();
        let mut rx = store.subscribe_collection(&events);

        store
            .set_document(&events.child("one").unwrap(), json!({"n": 1}), false)
            .await
            .unwrap();
        store
            .set_document(&events.child("two").unwrap(), json!({"n": 2}), false)
            .await
            .unwrap();
        store.delete_document(&events.child("one").unwrap()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().len(), 1);
        assert_eq!(rx.recv().await.unwrap().len(), 2);
        let last = rx.recv().await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].id, "two");
    }
}
