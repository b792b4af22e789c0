//! The registry facade.
//!
//! One method per inbound platform command: resolve the actor's
//! capability, drive the record store, hand outbound payloads to the
//! gateway. Returned strings are the ephemeral reply for the invoking
//! actor; side notifications (owner DMs, channel announcements) are
//! best-effort and never fail the primary operation.

use std::path::Path;
use std::sync::Arc;

use crate::access::{has_capability, Actor, Capability};
use crate::config::{load_or_create_config, RegistryConfig};
use crate::disclosure::{DisclosureDecision, DisclosureId, DisclosureManager};
use crate::error::{RegistryError, RegistryResult};
use crate::gateway::SharedGateway;
use crate::ids::UserId;
use crate::records::{Identity, IdentityDraft, IncidentDraft, RecordStore};
use crate::render;
use crate::viewer::{CursorId, FileView, ViewerManager};

pub const REASON_MAX: usize = 200;

pub struct Registry {
    config: RegistryConfig,
    store: Arc<RecordStore>,
    gateway: SharedGateway,
    disclosures: DisclosureManager,
    viewers: ViewerManager,
}

impl Registry {
    /// Load configuration and records from `data_dir` and wire the
    /// registry to the given gateway.
    pub async fn open(data_dir: &Path, gateway: SharedGateway) -> RegistryResult<Self> {
        let config = load_or_create_config(data_dir)?;
        let store = Arc::new(RecordStore::open(data_dir).await?);
        Ok(Self::with_state(config, store, gateway))
    }

    /// Assemble a registry from already-built parts (embedders and tests).
    pub fn with_state(
        config: RegistryConfig,
        store: Arc<RecordStore>,
        gateway: SharedGateway,
    ) -> Self {
        let disclosures = DisclosureManager::new(
            store.clone(),
            gateway.clone(),
            config.disclosure.prompt_timeout_seconds,
        );
        let viewers = ViewerManager::new(config.viewer.idle_timeout_seconds);
        Self {
            config,
            store,
            gateway,
            disclosures,
            viewers,
        }
    }

    pub async fn create_own_identity(
        &self,
        actor: &Actor,
        draft: IdentityDraft,
    ) -> RegistryResult<String> {
        let identity = self.store.create_identity(actor.id, draft).await?;
        self.announce_creation(actor.id, &identity).await;
        Ok("Identity registered.".to_string())
    }

    pub async fn create_identity_for(
        &self,
        actor: &Actor,
        target: UserId,
        draft: IdentityDraft,
    ) -> RegistryResult<String> {
        self.require(actor, Capability::Admin)?;
        let identity = self.store.create_identity(target, draft).await?;
        self.announce_creation(target, &identity).await;
        Ok(format!("Identity registered for user {target}."))
    }

    pub async fn view_own_identity(&self, actor: &Actor) -> RegistryResult<String> {
        let identity = self.store.get_identity(actor.id).await?;
        Ok(render::identity_card(&identity))
    }

    /// The full police file: identity summary plus the incident list,
    /// paged when it does not fit on one screen.
    pub async fn view_police_file(
        &self,
        actor: &Actor,
        target: UserId,
    ) -> RegistryResult<FileView> {
        self.require(actor, Capability::Police)?;
        let identity = self.store.get_identity(target).await?;
        let incidents = self.store.list_incidents(target).await;
        Ok(self.viewers.open(actor.id, target, identity, incidents))
    }

    /// Step an open police-file view one page. Ownership of the cursor is
    /// the only check; capability was established when it was opened.
    pub fn advance_page(
        &self,
        actor: &Actor,
        cursor: CursorId,
        step: i64,
    ) -> RegistryResult<FileView> {
        self.viewers.advance(cursor, actor.id, step)
    }

    pub async fn append_incident_for(
        &self,
        actor: &Actor,
        target: UserId,
        draft: IncidentDraft,
    ) -> RegistryResult<String> {
        self.require(actor, Capability::Police)?;
        let incident = self.store.append_incident(target, draft).await?;
        Ok(format!(
            "Incident #{} recorded for user {target}.",
            incident.sequence_id
        ))
    }

    pub async fn delete_incident_for(
        &self,
        actor: &Actor,
        target: UserId,
        sequence_id: u32,
        reason: &str,
    ) -> RegistryResult<String> {
        self.require(actor, Capability::Admin)?;
        let reason = validate_reason(reason)?;
        self.store.delete_incident(target, sequence_id).await?;
        self.notify_owner(target, render::incident_deleted_notice(sequence_id, &reason))
            .await;
        Ok(format!("Incident #{sequence_id} deleted."))
    }

    pub async fn delete_all_incidents_for(
        &self,
        actor: &Actor,
        target: UserId,
        reason: &str,
    ) -> RegistryResult<String> {
        self.require(actor, Capability::Admin)?;
        let reason = validate_reason(reason)?;
        self.store.delete_all_incidents(target).await?;
        self.notify_owner(target, render::incidents_cleared_notice(&reason))
            .await;
        Ok("All incidents deleted.".to_string())
    }

    pub async fn delete_identity_for(
        &self,
        actor: &Actor,
        target: UserId,
        reason: &str,
    ) -> RegistryResult<String> {
        self.require(actor, Capability::Admin)?;
        let reason = validate_reason(reason)?;
        self.store.delete_identity(target).await?;
        self.notify_owner(target, render::identity_deleted_notice(&reason))
            .await;
        Ok("Identity deleted.".to_string())
    }

    /// Ask `target` for consent to see their identity card for
    /// `display_seconds`. The returned id is what the platform layer wires
    /// the target's accept/reject controls to.
    pub async fn request_disclosure(
        &self,
        actor: &Actor,
        target: UserId,
        display_seconds: u64,
    ) -> RegistryResult<DisclosureId> {
        self.disclosures
            .open(actor.id, target, display_seconds)
            .await
    }

    pub async fn resolve_disclosure(
        &self,
        actor: &Actor,
        id: DisclosureId,
        decision: DisclosureDecision,
    ) -> RegistryResult<String> {
        self.disclosures.resolve(id, actor.id, decision).await
    }

    fn require(&self, actor: &Actor, capability: Capability) -> RegistryResult<()> {
        if has_capability(&self.config, actor, capability) {
            Ok(())
        } else {
            Err(RegistryError::PermissionDenied)
        }
    }

    async fn announce_creation(&self, owner: UserId, identity: &Identity) {
        let text = render::creation_announcement(owner, identity);
        for channel in &self.config.announce_channel_ids {
            if let Err(error) = self.gateway.announce(*channel, &text).await {
                tracing::warn!("announcement to channel {channel} failed: {error}");
            }
        }
    }

    async fn notify_owner(&self, owner: UserId, text: String) {
        if let Err(error) = self.gateway.direct_message(owner, &text).await {
            tracing::warn!("owner notification to {owner} failed: {error}");
        }
    }
}

fn validate_reason(reason: &str) -> RegistryResult<String> {
    let reason = reason.trim().to_string();
    if reason.is_empty() || reason.chars().count() > REASON_MAX {
        return Err(RegistryError::Validation(format!(
            "reason must be 1 to {REASON_MAX} characters"
        )));
    }
    Ok(reason)
}
