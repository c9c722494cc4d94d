//! Tokio-backed deletion scheduler and system clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;

use crate::ports::{ChatTransport, Clock, DeletionScheduler, MessageRef, ScheduledDeletion};

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

type TaskMap = Arc<Mutex<HashMap<MessageRef, (u64, AbortHandle)>>>;

/// Spawns one sleeping task per scheduled deletion. Must be used from
/// inside a tokio runtime.
pub struct TokioDeletionScheduler {
    transport: Arc<dyn ChatTransport>,
    clock: Arc<dyn Clock>,
    tasks: TaskMap,
    next_id: AtomicU64,
}

impl TokioDeletionScheduler {
    pub fn new(transport: Arc<dyn ChatTransport>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            clock,
            tasks: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl DeletionScheduler for TokioDeletionScheduler {
    fn schedule_deletion(&self, target: MessageRef, delay: Duration) -> ScheduledDeletion {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let due_at = self.clock.now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());

        let transport = Arc::clone(&self.transport);
        let tasks = Arc::clone(&self.tasks);

        // held across spawn so the task cannot finish before it is registered
        let mut registry = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut tasks = tasks.lock().unwrap_or_else(PoisonError::into_inner);
                if matches!(tasks.get(&target), Some((current, _)) if *current == id) {
                    tasks.remove(&target);
                }
            }

            if let Err(e) = transport.delete_message(target).await {
                tracing::debug!(
                    "Scheduled deletion of message {} in chat {} failed: {}",
                    target.message_id,
                    target.chat_id,
                    e
                );
            }
        });

        if let Some((_, old)) = registry.insert(target, (id, handle.abort_handle())) {
            old.abort();
        }
        drop(registry);

        ScheduledDeletion { id, target, due_at }
    }

    fn cancel(&self, target: MessageRef) -> bool {
        let removed = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target);
        match removed {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
