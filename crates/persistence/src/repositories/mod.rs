//! Typed repositories over the document store.
//!
//! Raw documents are parsed into domain entities here, at the boundary;
//! nothing downstream handles loosely shaped snapshots.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::{Document, StoreError};

pub mod activity;
pub mod inbox;
pub mod invite;
pub mod member;
pub mod task;
pub mod user;
pub mod workspace;

pub use activity::ActivityRepository;
pub use inbox::InboxRepository;
pub use invite::InviteRepository;
pub use member::MemberRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
pub use workspace::WorkspaceRepository;

/// Parse a raw document body into a typed entity.
pub(crate) fn decode<T: DeserializeOwned>(collection: &str, doc: &Document) -> Result<T, StoreError> {
    serde_json::from_value(doc.data.clone()).map_err(|source| StoreError::Corrupt {
        path: format!("{collection}/{}", doc.id),
        source,
    })
}

/// Serialize an entity into a document body.
pub(crate) fn encode<T: Serialize>(path: &str, entity: &T) -> Result<Value, StoreError> {
    serde_json::to_value(entity).map_err(|source| StoreError::Corrupt {
        path: path.to_string(),
        source,
    })
}

/// A document whose path segment should be a uuid but is not. The document
/// exists, so this is corruption, not absence.
pub(crate) fn bad_doc_id(collection: &str, id: &str) -> StoreError {
    use serde::de::Error;
    StoreError::Corrupt {
        path: format!("{collection}/{id}"),
        source: serde_json::Error::custom("document id is not a valid uuid"),
    }
}
