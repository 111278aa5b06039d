//! Event ports
//!
//! [`EventPublisher`] is what the use-cases see. Publishing is
//! best-effort: it never fails or blocks the operation that produced
//! the event.

use async_trait::async_trait;

use super::types::UserEvent;
use crate::shared::InfraError;

pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: UserEvent);
}

/// Consumer-side callback. `Ok` acknowledges the message, `Err` rejects it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<(), InfraError>;
}
