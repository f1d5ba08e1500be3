// src/services/dispatch_service.rs
use std::sync::Arc;
use tracing;

use crate::models::{
    notification::PushMessage,
    stats::{DispatchOutcome, DispatchResult},
    user::{DeliveryToken, RecipientClass},
};
use crate::services::messaging_service::NotificationService;

/// Sends one message per token, one at a time.
pub struct FanOutDispatcher {
    sender: Arc<dyn NotificationService>,
}

impl FanOutDispatcher {
    pub fn new(sender: Arc<dyn NotificationService>) -> Self {
        Self { sender }
    }

    /// Attempts every token exactly once, in order. A failed send is recorded
    /// and the loop moves on; nothing here returns early.
    pub async fn dispatch_all<'m, F>(&self, tokens: &[DeliveryToken], message_for: F) -> Vec<DispatchResult>
    where
        F: Fn(RecipientClass) -> &'m PushMessage,
    {
        let total = tokens.len();
        let mut results = Vec::with_capacity(total);

        for (index, token) in tokens.iter().enumerate() {
            tracing::debug!(
                "Sending {}/{} to {} {} ({}): {}...",
                index + 1,
                total,
                token.class,
                token.owner_id,
                token.owner_name,
                token.preview()
            );

            let outcome = match self.sender.send_to_device(&token.token, message_for(token.class)).await {
                Ok(message_id) => {
                    tracing::info!("Notification {}/{} delivered, id: {}", index + 1, total, message_id);
                    DispatchOutcome::Delivered { message_id }
                }
                Err(e) => {
                    tracing::error!(
                        "Notification {}/{} to {} {} failed: {} ({})",
                        index + 1,
                        total,
                        token.class,
                        token.owner_id,
                        e.code,
                        e.message
                    );
                    DispatchOutcome::Failed { code: e.code, message: e.message }
                }
            };

            results.push(DispatchResult {
                class: token.class,
                owner_id: token.owner_id.clone(),
                outcome,
            });
        }

        results
    }
}
