//! Document store backed by JSON files on disk.
//!
//! `users/alice` lives at `<root>/users/alice.json` and the events collection
//! `users/alice/events` is the directory `<root>/users/alice/events/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{DocPath, Document, DocumentStore, Watchers, merge_fields};
use crate::error::{DaybookError, DaybookResult};

const EXTENSION: &str = "json";

pub struct FsStore {
    root: PathBuf,
    watchers: Watchers,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore {
            root: root.into(),
            watchers: Watchers::default(),
        }
    }

    fn dir_for(&self, path: &DocPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    fn file_for(&self, path: &DocPath) -> PathBuf {
        let dir = match path.parent() {
            Some(collection) => self.dir_for(&collection),
            None => self.root.clone(),
        };
        dir.join(format!("{}.{}", path.id(), EXTENSION))
    }

    async fn read(&self, path: &DocPath) -> DaybookResult<Option<Value>> {
        let file = self.file_for(path);
        match tokio::fs::read_to_string(&file).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable("read", &file, e)),
        }
    }

    /// Write through a temp file and rename so readers never see a partial
    /// document.
    async fn write(&self, path: &DocPath, data: &Value) -> DaybookResult<()> {
        let file = self.file_for(path);
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| unavailable("create", dir, e))?;
        }

        let temp = file.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| unavailable("write", &temp, e))?;
        tokio::fs::rename(&temp, &file)
            .await
            .map_err(|e| unavailable("rename", &file, e))?;
        Ok(())
    }

    async fn collection(&self, path: &DocPath) -> DaybookResult<Vec<Document>> {
        let dir = self.dir_for(path);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(unavailable("list", &dir, e)),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| unavailable("list", &dir, e))?
        {
            let file = entry.path();
            if file.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            let Some(id) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| unavailable("read", &file, e))?;
            match serde_json::from_str(&content) {
                Ok(data) => docs.push(Document {
                    id: id.to_string(),
                    data,
                }),
                Err(e) => warn!(file = %file.display(), error = %e, "skipping unreadable document"),
            }
        }

        docs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(docs)
    }

    async fn notify(&self, path: &DocPath) {
        let Some(sender) = self.watchers.sender_for(path) else {
            return;
        };
        let Some(collection) = path.parent() else {
            return;
        };
        match self.collection(&collection).await {
            Ok(snapshot) => {
                let _ = sender.send(snapshot);
            }
            Err(e) => warn!(collection = %collection, error = %e, "could not build snapshot"),
        }
    }
}

fn unavailable(action: &str, path: &Path, err: std::io::Error) -> DaybookError {
    DaybookError::RemoteUnavailable(format!("Failed to {} {}: {}", action, path.display(), err))
}

impl DocumentStore for FsStore {
    async fn get_document(&self, path: &DocPath) -> DaybookResult<Option<Value>> {
        self.read(path).await
    }

    async fn set_document(&self, path: &DocPath, data: Value, merge: bool) -> DaybookResult<()> {
        debug!(path = %path, merge, "set document");
        let data = match self.read(path).await? {
            Some(mut existing) if merge => {
                merge_fields(&mut existing, data);
                existing
            }
            _ => data,
        };
        self.write(path, &data).await?;
        self.notify(path).await;
        Ok(())
    }

    async fn update_document(&self, path: &DocPath, partial: Value) -> DaybookResult<()> {
        debug!(path = %path, "update document");
        let mut existing = self
            .read(path)
            .await?
            .ok_or_else(|| DaybookError::not_found("Document", path.as_str()))?;
        merge_fields(&mut existing, partial);
        self.write(path, &existing).await?;
        self.notify(path).await;
        Ok(())
    }

    async fn delete_document(&self, path: &DocPath) -> DaybookResult<()> {
        debug!(path = %path, "delete document");
        let file = self.file_for(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => {
                self.notify(path).await;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable("delete", &file, e)),
        }
    }

    async fn list_collection(&self, path: &DocPath) -> DaybookResult<Vec<Document>> {
        self.collection(path).await
    }

    fn subscribe_collection(&self, path: &DocPath) -> broadcast::Receiver<Vec<Document>> {
        self.watchers.subscribe(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_documents_round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let user = DocPath::user("alice").unwrap();

        store.set_document(&user, json!({"username": "alice"}), false).await.unwrap();
        store.set_document(&user, json!({"holidaysImported": true}), true).await.unwrap();

        assert!(dir.path().join("users/alice.json").exists());
        let doc = store.get_document(&user).await.unwrap().unwrap();
        assert_eq!(doc, json!({"username": "alice", "holidaysImported": true}));
    }

    #[tokio::test]
    async fn test_collection_listing_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let events = DocPath::events("alice").unwrap();

        for id in ["b", "a"] {
            store
                .set_document(&events.child(id).unwrap(), json!({"title": id}), false)
                .await
                .unwrap();
        }
        std::fs::write(dir.path().join("users/alice/events/notes.txt"), "ignored").unwrap();

        let listed = store.list_collection(&events).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        store.delete_document(&events.child("a").unwrap()).await.unwrap();
        store.delete_document(&events.child("a").unwrap()).await.unwrap();
        assert_eq!(store.list_collection(&events).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let listed = store
            .list_collection(&DocPath::events("nobody").unwrap())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_update_requires_existing_document() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        let path = DocPath::event("alice", "x").unwrap();
        let err = store.update_document(&path, json!({"a": 1})).await.unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
    }
}
