//! Outbound notification trait.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivers alert messages to a user-facing channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a message. The body may contain basic HTML markup.
    ///
    /// Returns `Ok(false)` when the channel has no recipient configured and
    /// the message was skipped.
    async fn send(&self, message: &str) -> Result<bool, NotifyError>;

    /// Channel name for logs.
    fn name(&self) -> &str;
}
