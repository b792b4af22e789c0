//! Consent-gated disclosure of one identity card to another user.
//!
//! One instance per outstanding request, held in a TTL-expiring pending
//! table. The target alone resolves it; acceptance delivers a rendered
//! card by private message and arms a one-shot purge that removes the
//! delivered copy after the agreed display window. The purge never
//! retries and tolerates the message already being gone. Pending
//! instances that outlive the prompt window simply vanish; later
//! resolutions fail `Expired` with no notification to either side.

use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RegistryError, RegistryResult};
use crate::gateway::{MessageHandle, SharedGateway};
use crate::ids::UserId;
use crate::records::RecordStore;
use crate::render;

const PENDING_CAPACITY: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisclosureId(Uuid);

impl DisclosureId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DisclosureId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclosureDecision {
    Accept,
    Reject,
}

#[derive(Debug, Clone)]
struct PendingDisclosure {
    requester: UserId,
    target: UserId,
    display_seconds: u64,
}

pub struct DisclosureManager {
    store: Arc<RecordStore>,
    gateway: SharedGateway,
    pending: Cache<DisclosureId, PendingDisclosure>,
}

impl DisclosureManager {
    pub fn new(
        store: Arc<RecordStore>,
        gateway: SharedGateway,
        prompt_timeout_seconds: u64,
    ) -> Self {
        let pending = Cache::builder()
            .max_capacity(PENDING_CAPACITY)
            .time_to_live(Duration::from_secs(prompt_timeout_seconds))
            .build();
        Self {
            store,
            gateway,
            pending,
        }
    }

    /// Open a request from `requester` to see `target`'s identity card for
    /// `display_seconds` once accepted. Confirms to the requester and
    /// delivers the consent prompt to the target.
    pub async fn open(
        &self,
        requester: UserId,
        target: UserId,
        display_seconds: u64,
    ) -> RegistryResult<DisclosureId> {
        if display_seconds == 0 {
            return Err(RegistryError::Validation(
                "display time must be a positive number of seconds".to_string(),
            ));
        }
        if !self.store.identity_exists(target).await {
            return Err(RegistryError::NotFound);
        }

        self.gateway
            .reply(requester, &format!("Request sent to user {target}."))
            .await
            .map_err(|error| {
                RegistryError::Internal(format!("failed to confirm request: {error}"))
            })?;
        self.gateway
            .direct_message(target, &render::disclosure_prompt(requester))
            .await
            .map_err(|error| {
                RegistryError::Internal(format!("failed to deliver consent prompt: {error}"))
            })?;

        let id = DisclosureId::new();
        self.pending.insert(
            id,
            PendingDisclosure {
                requester,
                target,
                display_seconds,
            },
        );
        Ok(id)
    }

    /// Resolve a pending request. Only the target may do this; anyone else
    /// gets `NotAuthorized` and the instance is left untouched. Returns the
    /// ephemeral reply text for the resolving actor.
    pub async fn resolve(
        &self,
        id: DisclosureId,
        actor: UserId,
        decision: DisclosureDecision,
    ) -> RegistryResult<String> {
        let request = self.pending.get(&id).ok_or(RegistryError::Expired)?;
        if actor != request.target {
            return Err(RegistryError::NotAuthorized);
        }

        match decision {
            DisclosureDecision::Reject => {
                self.pending.invalidate(&id);
                if let Err(error) = self
                    .gateway
                    .direct_message(
                        request.requester,
                        &format!("User {} declined to share their identity card.", request.target),
                    )
                    .await
                {
                    tracing::warn!("rejection notice to {} failed: {error}", request.requester);
                }
                Ok("You rejected the request.".to_string())
            }
            DisclosureDecision::Accept => {
                // The record may have been deleted while the prompt sat
                // unanswered; the instance stays pending so the target can
                // still reject explicitly.
                let identity = self.store.get_identity(request.target).await?;
                let delivery = render::disclosure_delivery(request.target, &identity);
                let handle = self
                    .gateway
                    .direct_message(request.requester, &delivery)
                    .await
                    .map_err(|error| {
                        RegistryError::Internal(format!(
                            "failed to deliver identity card: {error}"
                        ))
                    })?;

                self.pending.invalidate(&id);
                schedule_purge(
                    self.gateway.clone(),
                    request.requester,
                    handle,
                    request.display_seconds,
                );
                Ok(
                    "You accepted. The card was delivered and will be removed after the agreed time."
                        .to_string(),
                )
            }
        }
    }
}

/// Arm the one-shot removal of a delivered card. Detached: nothing awaits
/// it, it fires exactly once, and a failed removal (already deleted,
/// channel gone) is dropped silently.
fn schedule_purge(
    gateway: SharedGateway,
    recipient: UserId,
    handle: MessageHandle,
    display_seconds: u64,
) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(display_seconds)).await;
        if let Err(error) = gateway.delete_direct_message(recipient, &handle).await {
            tracing::debug!("disclosure purge skipped: {error}");
        }
    });
}
