//! Ephemeral Secret Disclosure
//!
//! Messages carrying private keys are sent once and handed to the deletion
//! scheduler. The deletion is unconditional: nothing in the bot cancels it,
//! and a failed delete is only logged.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{
    ChatError, ChatId, ChatTransport, DeletionScheduler, MessageRef, OutboundMessage,
    ScheduledDeletion,
};

/// A disclosed secret and its pending deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureHandle {
    pub message: MessageRef,
    pub deletion: ScheduledDeletion,
}

pub struct SecretDisclosure {
    transport: Arc<dyn ChatTransport>,
    scheduler: Arc<dyn DeletionScheduler>,
    ttl: Duration,
}

impl SecretDisclosure {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        scheduler: Arc<dyn DeletionScheduler>,
        ttl: Duration,
    ) -> Self {
        Self {
            transport,
            scheduler,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Send `message` and schedule its deletion after the TTL
    pub async fn disclose(
        &self,
        chat_id: ChatId,
        message: &OutboundMessage,
    ) -> Result<DisclosureHandle, ChatError> {
        let sent = self.transport.send_message(chat_id, message).await?;
        let deletion = self.scheduler.schedule_deletion(sent, self.ttl);

        tracing::debug!(
            "Disclosed secret in chat {} (message {}), deletion #{} due {}",
            chat_id,
            sent.message_id,
            deletion.id,
            deletion.due_at
        );
        Ok(DisclosureHandle {
            message: sent,
            deletion,
        })
    }

    /// Delete a user-sent message holding key material right away
    pub async fn erase_now(&self, target: MessageRef) {
        if let Err(e) = self.transport.delete_message(target).await {
            tracing::warn!(
                "Could not delete key message {} in chat {}: {}",
                target.message_id,
                target.chat_id,
                e
            );
        }
    }
}
