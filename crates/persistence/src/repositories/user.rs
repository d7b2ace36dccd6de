//! Repository for `users/{uid}` records.

use chrono::Utc;
use domain::models::{AuthUser, UserRecord};
use uuid::Uuid;

use super::{decode, encode};
use crate::store::{paths, Document, MemoryStore, StoreError, Tx};

/// Repository for user identity records.
#[derive(Clone)]
pub struct UserRepository {
    store: MemoryStore,
}

impl UserRepository {
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    /// Fetch a user record, if one exists.
    pub async fn get(&self, uid: &str) -> Result<Option<UserRecord>, StoreError> {
        let collection = paths::users();
        match self.store.get(&collection, uid).await? {
            Some(data) => {
                let doc = Document {
                    id: uid.to_string(),
                    data,
                };
                decode(&collection, &doc).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Write a user record.
    pub async fn save(&self, record: &UserRecord) -> Result<(), StoreError> {
        let collection = paths::users();
        let path = format!("{collection}/{}", record.uid);
        let value = encode(&path, record)?;
        self.store.set(&collection, &record.uid, value).await
    }

    /// Upsert the record for `user`, refreshing email and `updatedAt` while
    /// preserving any existing workspace link.
    ///
    /// Runs as a transaction: a concurrent writer (say, provisioning in a
    /// second tab) cannot be overwritten from a stale read, so an existing
    /// workspace link always survives the upsert.
    pub async fn ensure_record(&self, user: &AuthUser) -> Result<UserRecord, StoreError> {
        let now = Utc::now();
        let repo = self.clone();
        let tx_user = user.clone();
        self.store
            .run_transaction(move |tx| {
                let user = tx_user;
                let mut record = repo
                    .get_in_tx(tx, &user.uid)?
                    .unwrap_or_else(|| UserRecord::new(&user, now));
                record.email = user.email.clone();
                record.updated_at = now;
                repo.save_in_tx(tx, &record)?;
                Ok(record)
            })
            .await
    }

    /// One-shot read of the user's active workspace link.
    pub async fn workspace_id_for(&self, uid: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self.get(uid).await?.and_then(|r| r.workspace_id))
    }

    /// Link the user to a workspace, transactionally for the same reason as
    /// [`UserRepository::ensure_record`].
    pub async fn link_workspace(
        &self,
        user: &AuthUser,
        workspace_id: Uuid,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let repo = self.clone();
        let tx_user = user.clone();
        self.store
            .run_transaction(move |tx| {
                let user = tx_user;
                let mut record = repo
                    .get_in_tx(tx, &user.uid)?
                    .unwrap_or_else(|| UserRecord::new(&user, now));
                record.email = user.email.clone();
                record.workspace_id = Some(workspace_id);
                record.updated_at = now;
                repo.save_in_tx(tx, &record)
            })
            .await
    }

    /// Transactional read of a user record, seeing staged writes.
    pub fn get_in_tx(&self, tx: &Tx<'_>, uid: &str) -> Result<Option<UserRecord>, StoreError> {
        let collection = paths::users();
        match tx.get(&collection, uid) {
            Some(data) => {
                let doc = Document {
                    id: uid.to_string(),
                    data,
                };
                decode(&collection, &doc).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Transactional write of a user record.
    pub fn save_in_tx(&self, tx: &mut Tx<'_>, record: &UserRecord) -> Result<(), StoreError> {
        let collection = paths::users();
        let path = format!("{collection}/{}", record.uid);
        let value = encode(&path, record)?;
        tx.set(&collection, &record.uid, value);
        Ok(())
    }
}
