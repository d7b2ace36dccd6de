//! Application services exposed to the presentation layer.

pub mod activity;
pub mod invites;
pub mod provisioner;
pub mod sync;
pub mod tasks;

pub use activity::ActivityLog;
pub use invites::InviteLedger;
pub use provisioner::WorkspaceProvisioner;
pub use sync::{RealtimeSync, SyncEvent, TypedFeed, WorkspaceFeed};
pub use tasks::TaskLedger;
