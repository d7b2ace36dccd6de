//! Document store boundary.
//!
//! Models the hosted document database the application delegates persistence
//! to: hierarchical collections of JSON documents, single-document writes,
//! an exclusive read-modify-write transaction section, and live collection
//! subscriptions that deliver a full snapshot on attach and after every
//! change.
//!
//! `MemoryStore` is the in-process implementation. There is no ordering
//! guarantee *between* collections: consumers must tolerate transiently
//! inconsistent combinations of snapshots.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;

use crate::metrics::OpTimer;

/// Errors surfaced by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Transaction contention; safe to retry.
    #[error("Transaction conflict: {0}")]
    Conflict(String),

    /// The backend's rule engine rejected the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt document at {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Conflict(_) | StoreError::Unavailable(_) | StoreError::PermissionDenied(_)
        )
    }
}

/// A raw document: its path id plus the JSON body.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// What a live subscription delivers.
///
/// Each `Snapshot` is the full current contents of the watched collection,
/// authoritative as of delivery; consumers must not treat it as a diff.
/// Errors arrive in-band and do not terminate the subscription.
#[derive(Debug, Clone)]
pub enum Event {
    Snapshot(Vec<Document>),
    Error(String),
}

/// A live subscription to one collection.
///
/// Dropping the subscription (or calling [`Subscription::cancel`]) detaches
/// the watcher; the store prunes it on the next delivery.
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<Event>,
}

impl Subscription {
    /// Wait for the next delivery. Returns `None` once cancelled.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Explicitly detach this watcher.
    pub fn cancel(self) {}
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<String, Value>>,
    watchers: HashMap<String, Vec<UnboundedSender<Event>>>,
    /// Single-document watchers, keyed by `{collection}/{id}`.
    doc_watchers: HashMap<String, Vec<UnboundedSender<Event>>>,
}

impl Inner {
    fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of one document: a single entry if it exists, empty otherwise.
    fn doc_snapshot(&self, collection: &str, id: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| {
                vec![Document {
                    id: id.to_string(),
                    data: data.clone(),
                }]
            })
            .unwrap_or_default()
    }

    /// Push the current snapshot of `collection` to its watchers, dropping
    /// any that have gone away.
    fn notify(&mut self, collection: &str) {
        let snapshot = self.snapshot(collection);
        if let Some(senders) = self.watchers.get_mut(collection) {
            senders.retain(|tx| tx.send(Event::Snapshot(snapshot.clone())).is_ok());
            if senders.is_empty() {
                self.watchers.remove(collection);
            }
        }
    }

    /// Push the current state of one document to its watchers.
    fn notify_doc(&mut self, collection: &str, id: &str) {
        let key = format!("{collection}/{id}");
        let snapshot = self.doc_snapshot(collection, id);
        if let Some(senders) = self.doc_watchers.get_mut(&key) {
            senders.retain(|tx| tx.send(Event::Snapshot(snapshot.clone())).is_ok());
            if senders.is_empty() {
                self.doc_watchers.remove(&key);
            }
        }
    }
}

/// Staged view of the store inside a transaction.
///
/// Reads see staged writes; nothing touches the store until the transaction
/// closure returns `Ok`, so an aborted transaction leaves no partial state.
pub struct Tx<'a> {
    inner: &'a Inner,
    staged: Vec<(String, String, Value)>,
}

impl Tx<'_> {
    pub fn get(&self, collection: &str, id: &str) -> Option<Value> {
        if let Some((_, _, value)) = self
            .staged
            .iter()
            .rev()
            .find(|(c, i, _)| c == collection && i == id)
        {
            return Some(value.clone());
        }
        self.inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    pub fn set(&mut self, collection: &str, id: &str, value: Value) {
        self.staged
            .push((collection.to_string(), id.to_string(), value));
    }
}

/// In-process document store with live subscriptions.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a single document.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let timer = OpTimer::new("get");
        let inner = self.inner.read().await;
        let doc = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned();
        timer.record();
        Ok(doc)
    }

    /// Upsert a single document and notify watchers of its collection.
    pub async fn set(&self, collection: &str, id: &str, value: Value) -> Result<(), StoreError> {
        let timer = OpTimer::new("set");
        let mut inner = self.inner.write().await;
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), value);
        inner.notify(collection);
        inner.notify_doc(collection, id);
        timer.record();
        Ok(())
    }

    /// Delete a document. Deleting a missing document is a no-op, matching
    /// the backend's semantics.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let timer = OpTimer::new("delete");
        let mut inner = self.inner.write().await;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        if removed {
            inner.notify(collection);
            inner.notify_doc(collection, id);
        }
        timer.record();
        Ok(())
    }

    /// One-shot read of a full collection.
    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let timer = OpTimer::new("list");
        let inner = self.inner.read().await;
        let docs = inner.snapshot(collection);
        timer.record();
        Ok(docs)
    }

    /// Attach a live watcher to a collection.
    ///
    /// The current snapshot is delivered immediately, then again after every
    /// change to the collection.
    pub async fn subscribe(&self, collection: &str) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let mut inner = self.inner.write().await;
        // Initial attach snapshot; the receiver cannot be gone yet.
        let _ = tx.send(Event::Snapshot(inner.snapshot(collection)));
        inner
            .watchers
            .entry(collection.to_string())
            .or_default()
            .push(tx);
        tracing::debug!(collection, "watcher attached");
        Subscription { rx }
    }

    /// Attach a live watcher to a single document, mirroring the backend's
    /// per-document listeners.
    ///
    /// Snapshots carry at most one entry; a missing or deleted document is
    /// delivered as an empty snapshot. Writes elsewhere in the collection
    /// never reach this watcher.
    pub async fn subscribe_doc(&self, collection: &str, id: &str) -> Subscription {
        let (tx, rx) = unbounded_channel();
        let mut inner = self.inner.write().await;
        let _ = tx.send(Event::Snapshot(inner.doc_snapshot(collection, id)));
        inner
            .doc_watchers
            .entry(format!("{collection}/{id}"))
            .or_default()
            .push(tx);
        tracing::debug!(collection, id, "document watcher attached");
        Subscription { rx }
    }

    /// Deliver an in-band error to the watchers of a collection or document
    /// path without touching any data, the way the backend's rule engine
    /// surfaces a permission rejection. Watchers stay attached.
    pub async fn emit_error(&self, target: &str, message: &str) {
        let mut inner = self.inner.write().await;
        if let Some(senders) = inner.watchers.get_mut(target) {
            senders.retain(|tx| tx.send(Event::Error(message.to_string())).is_ok());
        }
        if let Some(senders) = inner.doc_watchers.get_mut(target) {
            senders.retain(|tx| tx.send(Event::Error(message.to_string())).is_ok());
        }
    }

    /// Run `f` as an all-or-nothing transaction.
    ///
    /// The closure sees a consistent view of the store (including its own
    /// staged writes) and no other writer can interleave. If it returns
    /// `Err`, nothing is applied. Watchers of the written collections are
    /// notified once, after commit.
    pub async fn run_transaction<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Tx<'_>) -> Result<T, StoreError>,
    {
        let timer = OpTimer::new("transaction");
        let mut inner = self.inner.write().await;
        let mut tx = Tx {
            inner: &inner,
            staged: Vec::new(),
        };
        let out = f(&mut tx)?;
        let staged = tx.staged;

        let mut touched: Vec<(String, String)> = Vec::new();
        for (collection, id, value) in staged {
            inner
                .collections
                .entry(collection.clone())
                .or_default()
                .insert(id.clone(), value);
            let pair = (collection, id);
            if !touched.contains(&pair) {
                touched.push(pair);
            }
        }
        let mut notified: Vec<&str> = Vec::new();
        for (collection, id) in &touched {
            if !notified.contains(&collection.as_str()) {
                inner.notify(collection);
                notified.push(collection.as_str());
            }
            inner.notify_doc(collection, id);
        }
        timer.record();
        Ok(out)
    }
}

/// Collection path builders mirroring the storage layout.
pub mod paths {
    /// `users/{uid}` lives in the root `users` collection.
    pub fn users() -> String {
        "users".to_string()
    }

    /// `workspaces/{id}` lives in the root `workspaces` collection.
    pub fn workspaces() -> String {
        "workspaces".to_string()
    }

    pub fn members(workspace_id: &str) -> String {
        format!("workspaces/{workspace_id}/members")
    }

    pub fn invites(workspace_id: &str) -> String {
        format!("workspaces/{workspace_id}/invites")
    }

    pub fn tasks(workspace_id: &str) -> String {
        format!("workspaces/{workspace_id}/tasks")
    }

    pub fn activity(workspace_id: &str) -> String {
        format!("workspaces/{workspace_id}/activity")
    }

    /// Per-normalized-email invite inbox items.
    pub fn inbox(email_lower: &str) -> String {
        format!("inviteInbox/{email_lower}/items")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .set("users", "u1", json!({"uid": "u1"}))
            .await
            .unwrap();
        let doc = store.get("users", "u1").await.unwrap();
        assert_eq!(doc, Some(json!({"uid": "u1"})));
        assert_eq!(store.get("users", "nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let store = MemoryStore::new();
        assert!(store.delete("users", "ghost").await.is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_updates() {
        let store = MemoryStore::new();
        store.set("tasks", "t1", json!({"n": 1})).await.unwrap();

        let mut sub = store.subscribe("tasks").await;
        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => assert_eq!(docs.len(), 1),
            other => panic!("expected snapshot, got {other:?}"),
        }

        store.set("tasks", "t2", json!({"n": 2})).await.unwrap();
        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => assert_eq!(docs.len(), 2),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_doc_subscription_sees_only_its_document() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_doc("workspaces", "w1").await;
        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => assert!(docs.is_empty()),
            other => panic!("expected snapshot, got {other:?}"),
        }

        // A write to a sibling document is invisible; the next delivery is
        // the watched document itself.
        store.set("workspaces", "w2", json!({"name": "Other"})).await.unwrap();
        store.set("workspaces", "w1", json!({"name": "Mine"})).await.unwrap();
        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].id, "w1");
                assert_eq!(docs[0].data["name"], "Mine");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }

        store.delete("workspaces", "w1").await.unwrap();
        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => assert!(docs.is_empty()),
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_doc_subscription_notified_by_transaction() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_doc("workspaces", "w1").await;
        assert!(matches!(sub.next().await.unwrap(), Event::Snapshot(_)));

        store
            .run_transaction(|tx| {
                tx.set("workspaces", "w1", json!({"name": "A"}));
                tx.set("users", "u1", json!({"uid": "u1"}));
                Ok(())
            })
            .await
            .unwrap();

        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].data["name"], "A");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_emit_error_reaches_doc_watchers() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe_doc("workspaces", "w1").await;
        assert!(matches!(sub.next().await.unwrap(), Event::Snapshot(_)));

        store
            .emit_error("workspaces/w1", "Missing or insufficient permissions.")
            .await;
        match sub.next().await.unwrap() {
            Event::Error(msg) => assert!(msg.contains("permissions")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let store = MemoryStore::new();
        let sub = store.subscribe("tasks").await;
        sub.cancel();
        // Writes after cancellation must not error.
        store.set("tasks", "t1", json!({})).await.unwrap();
        store.set("tasks", "t2", json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_emit_error_keeps_subscription_alive() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("inviteInbox/a@b.com/items").await;
        assert!(matches!(sub.next().await.unwrap(), Event::Snapshot(_)));

        store
            .emit_error("inviteInbox/a@b.com/items", "Missing or insufficient permissions.")
            .await;
        match sub.next().await.unwrap() {
            Event::Error(msg) => assert!(msg.contains("permissions")),
            other => panic!("expected error, got {other:?}"),
        }

        // Still attached: a later write is delivered.
        store
            .set("inviteInbox/a@b.com/items", "i1", json!({}))
            .await
            .unwrap();
        assert!(matches!(sub.next().await.unwrap(), Event::Snapshot(_)));
    }

    #[tokio::test]
    async fn test_aborted_transaction_leaves_no_state() {
        let store = MemoryStore::new();
        let result: Result<(), StoreError> = store
            .run_transaction(|tx| {
                tx.set("workspaces", "w1", json!({"name": "X"}));
                Err(StoreError::Conflict("simulated".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.get("workspaces", "w1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_transaction_reads_see_staged_writes() {
        let store = MemoryStore::new();
        store
            .run_transaction(|tx| {
                assert!(tx.get("users", "u1").is_none());
                tx.set("users", "u1", json!({"uid": "u1"}));
                assert!(tx.get("users", "u1").is_some());
                Ok(())
            })
            .await
            .unwrap();
        assert!(store.get("users", "u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_transaction_notifies_watchers_once_committed() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("workspaces").await;
        assert!(matches!(sub.next().await.unwrap(), Event::Snapshot(_)));

        store
            .run_transaction(|tx| {
                tx.set("workspaces", "w1", json!({"name": "A"}));
                tx.set("workspaces", "w1", json!({"name": "B"}));
                Ok(())
            })
            .await
            .unwrap();

        match sub.next().await.unwrap() {
            Event::Snapshot(docs) => {
                assert_eq!(docs.len(), 1);
                assert_eq!(docs[0].data["name"], "B");
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_paths() {
        assert_eq!(paths::members("w1"), "workspaces/w1/members");
        assert_eq!(paths::inbox("a@b.com"), "inviteInbox/a@b.com/items");
    }

    #[test]
    fn test_transient_errors() {
        assert!(StoreError::Conflict("x".into()).is_transient());
        assert!(StoreError::Unavailable("x".into()).is_transient());
        assert!(!StoreError::NotFound("x".into()).is_transient());
    }
}
