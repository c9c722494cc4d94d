use std::time::Duration;

use chrono::{DateTime, Utc};

use super::chat::MessageRef;

/// Time source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// A pending one-shot deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDeletion {
    pub id: u64,
    pub target: MessageRef,
    pub due_at: DateTime<Utc>,
}

/// Deferred message deletion keyed by message reference
pub trait DeletionScheduler: Send + Sync {
    /// Delete `target` after `delay`. Failures of the deletion itself are swallowed.
    fn schedule_deletion(&self, target: MessageRef, delay: Duration) -> ScheduledDeletion;

    /// Cancel a pending deletion; false when nothing was pending
    fn cancel(&self, target: MessageRef) -> bool;

    fn pending(&self) -> usize;
}
