//! Outbound seam to the messaging platform.
//!
//! The registry never talks to the platform directly; it hands text
//! payloads to a [`Gateway`] implementation. Delivery failures are the
//! caller's to interpret: primary replies propagate, side notifications
//! are best-effort.

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;

use crate::ids::{ChannelId, UserId};

pub use memory::{MemoryGateway, Outbound};

/// Handle to a delivered direct message, usable for later removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle(pub String);

#[derive(Debug, Clone, thiserror::Error)]
#[error("gateway: {0}")]
pub struct GatewayError(pub String);

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait Gateway: Send + Sync {
    /// Ephemeral reply visible only to the invoking actor.
    async fn reply(&self, actor: UserId, text: &str) -> GatewayResult<()>;

    /// Private message to a user. Returns a handle the caller can use to
    /// remove the message later.
    async fn direct_message(&self, user: UserId, text: &str) -> GatewayResult<MessageHandle>;

    /// Remove a previously delivered private message. Fails when the
    /// message is already gone or the channel is unreachable.
    async fn delete_direct_message(
        &self,
        user: UserId,
        handle: &MessageHandle,
    ) -> GatewayResult<()>;

    /// Post to a community channel.
    async fn announce(&self, channel: ChannelId, text: &str) -> GatewayResult<()>;
}

pub type SharedGateway = Arc<dyn Gateway>;
