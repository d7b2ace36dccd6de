//! Realtime sync feeds.
//!
//! Wraps raw store subscriptions into typed feeds delivering parsed
//! snapshots. Errors — from the store's rule engine or from a document
//! that fails to parse — arrive in-band as [`SyncEvent::Error`] and never
//! terminate the feed or its siblings.

use domain::models::{InboxInvite, Member, Task, Workspace};
use persistence::repositories::{InboxRepository, MemberRepository, TaskRepository, WorkspaceRepository};
use persistence::store::{Document, Event, MemoryStore, Subscription};
use shared::validation::normalize_email;
use uuid::Uuid;

/// A delivery on a typed feed.
#[derive(Debug, Clone)]
pub enum SyncEvent<T> {
    /// Full state as of now; never a diff.
    Snapshot(T),
    /// Recoverable; the feed stays attached.
    Error(String),
}

type ParseFn<T> = Box<dyn Fn(&[Document]) -> Result<T, String> + Send>;

/// A live feed of parsed snapshots over one collection.
///
/// Dropping the feed (or calling [`TypedFeed::cancel`]) detaches the
/// underlying watcher.
pub struct TypedFeed<T> {
    sub: Subscription,
    parse: ParseFn<T>,
}

impl<T> TypedFeed<T> {
    fn new(sub: Subscription, parse: ParseFn<T>) -> Self {
        Self { sub, parse }
    }

    /// Wait for the next delivery. Returns `None` once cancelled.
    pub async fn next(&mut self) -> Option<SyncEvent<T>> {
        let event = self.sub.next().await?;
        Some(match event {
            Event::Snapshot(docs) => match (self.parse)(&docs) {
                Ok(parsed) => SyncEvent::Snapshot(parsed),
                Err(message) => SyncEvent::Error(message),
            },
            Event::Error(message) => SyncEvent::Error(message),
        })
    }

    pub fn cancel(self) {}
}

fn parse_doc<T: serde::de::DeserializeOwned>(doc: &Document) -> Result<T, String> {
    serde_json::from_value(doc.data.clone()).map_err(|e| format!("corrupt document {}: {e}", doc.id))
}

/// Inbox items, oldest invite first.
pub(crate) fn inbox_feed(sub: Subscription) -> TypedFeed<Vec<InboxInvite>> {
    TypedFeed::new(
        sub,
        Box::new(|docs| {
            let mut items = docs
                .iter()
                .map(parse_doc::<InboxInvite>)
                .collect::<Result<Vec<_>, _>>()?;
            items.sort_by_key(|i| i.created_at);
            Ok(items)
        }),
    )
}

/// The live feeds for one active workspace.
///
/// Rebuilt whenever the active workspace changes; dropping the feed tears
/// down the workspace-scoped watchers together. The invite inbox is *not*
/// part of this: it is keyed on the user's email and must survive
/// workspace switches.
pub struct WorkspaceFeed {
    /// The workspace document itself.
    pub workspace: TypedFeed<Option<Workspace>>,
    /// Member list, oldest joiner first. The consumer derives their own
    /// role from it.
    pub members: TypedFeed<Vec<Member>>,
}

/// Maintains live subscriptions for the presentation layer.
#[derive(Clone)]
pub struct RealtimeSync {
    workspaces: WorkspaceRepository,
    members: MemberRepository,
    tasks: TaskRepository,
    inbox: InboxRepository,
}

impl RealtimeSync {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            workspaces: WorkspaceRepository::new(store.clone()),
            members: MemberRepository::new(store.clone()),
            tasks: TaskRepository::new(store.clone()),
            inbox: InboxRepository::new(store),
        }
    }

    /// Feeds for `workspace_id`. Call again after switching workspaces.
    pub async fn workspace_feed(&self, workspace_id: Uuid) -> WorkspaceFeed {
        let workspace_sub = self.workspaces.subscribe(workspace_id).await;
        let members_sub = self.members.subscribe(workspace_id).await;

        // Document-scoped watcher: the snapshot is empty or the one doc.
        let workspace = TypedFeed::new(
            workspace_sub,
            Box::new(move |docs| {
                let Some(doc) = docs.first() else {
                    return Ok(None);
                };
                let mut workspace: Workspace = parse_doc(doc)?;
                workspace.id = workspace_id;
                Ok(Some(workspace))
            }),
        );

        let members = TypedFeed::new(
            members_sub,
            Box::new(|docs| {
                let mut members = docs
                    .iter()
                    .map(parse_doc::<Member>)
                    .collect::<Result<Vec<_>, _>>()?;
                members.sort_by_key(|m| m.joined_at);
                Ok(members)
            }),
        );

        WorkspaceFeed { workspace, members }
    }

    /// Active (non-trashed) tasks for a workspace, most recently updated
    /// first.
    pub async fn task_feed(&self, workspace_id: Uuid) -> TypedFeed<Vec<Task>> {
        let sub = self.tasks.subscribe(workspace_id).await;
        TypedFeed::new(
            sub,
            Box::new(|docs| {
                let mut tasks = docs
                    .iter()
                    .map(|doc| {
                        let mut task: Task = parse_doc(doc)?;
                        task.id = doc
                            .id
                            .parse()
                            .map_err(|_| format!("bad task id {}", doc.id))?;
                        Ok(task)
                    })
                    .collect::<Result<Vec<Task>, String>>()?;
                tasks.retain(|t| !t.is_deleted);
                tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                Ok(tasks)
            }),
        )
    }

    /// Invite inbox feed for a (raw) email, independent of any workspace.
    pub async fn inbox_feed(&self, email: &str) -> TypedFeed<Vec<InboxInvite>> {
        inbox_feed(self.inbox.subscribe(&normalize_email(email)).await)
    }
}
