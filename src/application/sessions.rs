//! Per-user session registry
//!
//! One [`Session`] per user behind its own async mutex: events from the same
//! user serialize, different users proceed in parallel. Sessions live for the
//! process lifetime only.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::Session;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to the user's session, created idle on first use
    pub async fn lock(&self, user_id: &str) -> OwnedMutexGuard<Session> {
        let cell = {
            let mut sessions = self.sessions.lock().await;
            Arc::clone(
                sessions
                    .entry(user_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(Session::default()))),
            )
        };
        cell.lock_owned().await
    }

    /// Copy of the user's current session
    pub async fn snapshot(&self, user_id: &str) -> Session {
        let cell = self.sessions.lock().await.get(user_id).cloned();
        match cell {
            Some(cell) => cell.lock().await.clone(),
            None => Session::default(),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
