//! The durable record store.
//!
//! Owns the in-memory indexes for both record families and their on-disk
//! documents. Every mutating operation holds the store lock for its whole
//! read-validate-write sequence, persists the full image through
//! [`docstore::Document`], and rolls the in-memory state back when the
//! write fails, so readers never observe a half-applied mutation and the
//! national-id uniqueness check races with nothing.

use std::collections::BTreeMap;
use std::path::Path;

use docstore::Document;
use tokio::sync::Mutex;

use crate::error::{RegistryError, RegistryResult};
use crate::ids::UserId;
use crate::records::identity::{Identity, IdentityDraft};
use crate::records::incident::{Incident, IncidentDraft};
use crate::util::time;

pub const IDENTITY_DOC_FILENAME: &str = "dni_data.json";
pub const INCIDENT_DOC_FILENAME: &str = "antecedentes_data.json";

type IdentityMap = BTreeMap<UserId, Identity>;
type IncidentMap = BTreeMap<UserId, Vec<Incident>>;

#[derive(Debug, Default)]
struct StoreState {
    identities: IdentityMap,
    incidents: IncidentMap,
}

pub struct RecordStore {
    state: Mutex<StoreState>,
    identity_doc: Document,
    incident_doc: Document,
}

impl RecordStore {
    /// Open the store in `data_dir`, loading whatever documents exist.
    /// Absent documents read as empty stores.
    pub async fn open(data_dir: &Path) -> RegistryResult<Self> {
        let identity_doc = Document::new(data_dir.join(IDENTITY_DOC_FILENAME));
        let incident_doc = Document::new(data_dir.join(INCIDENT_DOC_FILENAME));
        let identities: IdentityMap = identity_doc.load_or_default().await?;
        let incidents: IncidentMap = incident_doc.load_or_default().await?;
        tracing::info!(
            identities = identities.len(),
            incident_owners = incidents.len(),
            "record store loaded"
        );
        Ok(Self {
            state: Mutex::new(StoreState {
                identities,
                incidents,
            }),
            identity_doc,
            incident_doc,
        })
    }

    /// Validate and persist a new identity. Fails before any mutation on a
    /// malformed field, an existing record for `owner`, or a national id
    /// already claimed by any other record.
    pub async fn create_identity(
        &self,
        owner: UserId,
        draft: IdentityDraft,
    ) -> RegistryResult<Identity> {
        let mut state = self.state.lock().await;
        if state.identities.contains_key(&owner) {
            return Err(RegistryError::DuplicateOwner);
        }
        let identity = draft.validate(time::today())?;
        if state
            .identities
            .values()
            .any(|existing| existing.national_id == identity.national_id)
        {
            return Err(RegistryError::DuplicateNationalId);
        }

        state.identities.insert(owner, identity.clone());
        if let Err(error) = self.identity_doc.save(&state.identities).await {
            state.identities.remove(&owner);
            return Err(error.into());
        }
        Ok(identity)
    }

    pub async fn get_identity(&self, owner: UserId) -> RegistryResult<Identity> {
        let state = self.state.lock().await;
        state
            .identities
            .get(&owner)
            .cloned()
            .ok_or(RegistryError::NotFound)
    }

    pub async fn identity_exists(&self, owner: UserId) -> bool {
        self.state.lock().await.identities.contains_key(&owner)
    }

    /// Remove `owner`'s identity and return it. Notifying the owner is the
    /// caller's concern; the store only guarantees the durable removal.
    pub async fn delete_identity(&self, owner: UserId) -> RegistryResult<Identity> {
        let mut state = self.state.lock().await;
        let removed = state
            .identities
            .remove(&owner)
            .ok_or(RegistryError::NotFound)?;
        if let Err(error) = self.identity_doc.save(&state.identities).await {
            state.identities.insert(owner, removed);
            return Err(error.into());
        }
        Ok(removed)
    }

    /// Append an incident for `owner`, assigning the next sequence id
    /// (1 when the owner has no list yet).
    pub async fn append_incident(
        &self,
        owner: UserId,
        draft: IncidentDraft,
    ) -> RegistryResult<Incident> {
        let draft = draft.validate()?;
        let mut state = self.state.lock().await;
        let list = state.incidents.entry(owner).or_default();
        let incident = Incident {
            sequence_id: list.last().map_or(0, |last| last.sequence_id) + 1,
            kind: draft.kind,
            date: draft.date,
            description: draft.description,
        };
        list.push(incident.clone());

        if let Err(error) = self.incident_doc.save(&state.incidents).await {
            let list = state.incidents.entry(owner).or_default();
            list.pop();
            if list.is_empty() {
                state.incidents.remove(&owner);
            }
            return Err(error.into());
        }
        Ok(incident)
    }

    /// Delete one incident by sequence id and renumber the survivors to
    /// 1..N in their original relative order. An emptied list disappears
    /// from the document entirely.
    pub async fn delete_incident(&self, owner: UserId, sequence_id: u32) -> RegistryResult<()> {
        let mut state = self.state.lock().await;
        let list = state.incidents.get_mut(&owner).ok_or(RegistryError::NotFound)?;
        let previous = list.clone();
        let index = list
            .iter()
            .position(|incident| incident.sequence_id == sequence_id)
            .ok_or(RegistryError::NotFound)?;
        list.remove(index);
        for (offset, incident) in list.iter_mut().enumerate() {
            incident.sequence_id = offset as u32 + 1;
        }
        if list.is_empty() {
            state.incidents.remove(&owner);
        }

        if let Err(error) = self.incident_doc.save(&state.incidents).await {
            state.incidents.insert(owner, previous);
            return Err(error.into());
        }
        Ok(())
    }

    /// Remove `owner`'s entire incident list.
    pub async fn delete_all_incidents(&self, owner: UserId) -> RegistryResult<()> {
        let mut state = self.state.lock().await;
        let removed = state
            .incidents
            .remove(&owner)
            .ok_or(RegistryError::NotFound)?;
        if let Err(error) = self.incident_doc.save(&state.incidents).await {
            state.incidents.insert(owner, removed);
            return Err(error.into());
        }
        Ok(())
    }

    /// The owner's incidents in sequence order; empty when none exist.
    pub async fn list_incidents(&self, owner: UserId) -> Vec<Incident> {
        let state = self.state.lock().await;
        state.incidents.get(&owner).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn identity_draft(national_id: &str) -> IdentityDraft {
        IdentityDraft {
            given_name: "Ana".to_string(),
            surnames: "García".to_string(),
            national_id: national_id.to_string(),
            birth_date: "01/02/1990".to_string(),
            sex: "M".to_string(),
            nationality: "ESP".to_string(),
        }
    }

    fn incident_draft(kind: &str) -> IncidentDraft {
        IncidentDraft {
            kind: kind.to_string(),
            date: "03/04/2025".to_string(),
            description: "observed near the plaza".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");

        let created = store
            .create_identity(UserId(1), identity_draft("123456789Z"))
            .await
            .expect("create");
        let fetched = store.get_identity(UserId(1)).await.expect("get");
        assert_eq!(created, fetched);
        assert_eq!(fetched.national_id, "123456789Z");
    }

    #[tokio::test]
    async fn second_identity_for_same_owner_is_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .create_identity(UserId(1), identity_draft("123456789Z"))
            .await
            .expect("create");

        let result = store
            .create_identity(UserId(1), identity_draft("987654321A"))
            .await;
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateOwner);
    }

    #[tokio::test]
    async fn national_id_is_globally_unique() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .create_identity(UserId(1), identity_draft("123456789Z"))
            .await
            .expect("create");

        let result = store
            .create_identity(UserId(2), identity_draft("123456789Z"))
            .await;
        assert_eq!(result.unwrap_err(), RegistryError::DuplicateNationalId);
    }

    #[tokio::test]
    async fn concurrent_claims_on_one_national_id_yield_one_success() {
        let dir = tempdir().expect("tempdir");
        let store = Arc::new(RecordStore::open(dir.path()).await.expect("open"));

        let mut handles = Vec::new();
        for owner in 1..=4u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_identity(UserId(owner), identity_draft("123456789Z"))
                    .await
            }));
        }
        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("join").is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn records_survive_a_reopen() {
        let dir = tempdir().expect("tempdir");
        {
            let store = RecordStore::open(dir.path()).await.expect("open");
            store
                .create_identity(UserId(1), identity_draft("123456789Z"))
                .await
                .expect("create");
            store
                .append_incident(UserId(1), incident_draft("Robo"))
                .await
                .expect("append");
        }

        let reopened = RecordStore::open(dir.path()).await.expect("reopen");
        assert!(reopened.identity_exists(UserId(1)).await);
        let incidents = reopened.list_incidents(UserId(1)).await;
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].kind, "Robo");
    }

    #[tokio::test]
    async fn incident_sequence_ids_are_dense() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        for kind in ["a", "b", "c"] {
            store
                .append_incident(UserId(1), incident_draft(kind))
                .await
                .expect("append");
        }

        let ids: Vec<u32> = store
            .list_incidents(UserId(1))
            .await
            .iter()
            .map(|incident| incident.sequence_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn deleting_one_incident_renumbers_survivors_in_order() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        for kind in ["a", "b", "c"] {
            store
                .append_incident(UserId(1), incident_draft(kind))
                .await
                .expect("append");
        }

        store
            .delete_incident(UserId(1), 2)
            .await
            .expect("delete");
        let remaining = store.list_incidents(UserId(1)).await;
        let ids: Vec<u32> = remaining.iter().map(|i| i.sequence_id).collect();
        let kinds: Vec<&str> = remaining.iter().map(|i| i.kind.as_str()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(kinds, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn deleting_the_last_incident_removes_the_owner_entry() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .append_incident(UserId(1), incident_draft("a"))
            .await
            .expect("append");
        store
            .append_incident(UserId(1), incident_draft("b"))
            .await
            .expect("append");

        store.delete_incident(UserId(1), 2).await.expect("delete");
        store.delete_incident(UserId(1), 1).await.expect("delete");

        assert!(store.list_incidents(UserId(1)).await.is_empty());
        // The persisted document must not keep a zero-length list around.
        let raw = tokio::fs::read_to_string(dir.path().join(INCIDENT_DOC_FILENAME))
            .await
            .expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert!(value.as_object().expect("object").is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_incident_id_is_not_found() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .append_incident(UserId(1), incident_draft("a"))
            .await
            .expect("append");

        assert_eq!(
            store.delete_incident(UserId(1), 7).await.unwrap_err(),
            RegistryError::NotFound
        );
        assert_eq!(
            store.delete_incident(UserId(9), 1).await.unwrap_err(),
            RegistryError::NotFound
        );
    }

    #[tokio::test]
    async fn delete_all_incidents_clears_the_owner() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .append_incident(UserId(1), incident_draft("a"))
            .await
            .expect("append");

        store.delete_all_incidents(UserId(1)).await.expect("delete");
        assert!(store.list_incidents(UserId(1)).await.is_empty());
        assert_eq!(
            store.delete_all_incidents(UserId(1)).await.unwrap_err(),
            RegistryError::NotFound
        );
    }

    #[tokio::test]
    async fn delete_identity_returns_the_removed_record() {
        let dir = tempdir().expect("tempdir");
        let store = RecordStore::open(dir.path()).await.expect("open");
        store
            .create_identity(UserId(1), identity_draft("123456789Z"))
            .await
            .expect("create");

        let removed = store.delete_identity(UserId(1)).await.expect("delete");
        assert_eq!(removed.national_id, "123456789Z");
        assert_eq!(
            store.get_identity(UserId(1)).await.unwrap_err(),
            RegistryError::NotFound
        );
        assert_eq!(
            store.delete_identity(UserId(1)).await.unwrap_err(),
            RegistryError::NotFound
        );
    }
}
