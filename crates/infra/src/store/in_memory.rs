use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use tutoria_access::{
    AccessRequest, AccessRequestCommand, AccessRequestEvent, RecordDecisions, ResolvedDecision,
    SubmitAccessRequest,
};
use tutoria_auth::{GrantedRoleSet, Role};
use tutoria_core::{AccessRequestId, Aggregate, AggregateRoot, UserId};
use tutoria_events::{Event, EventEnvelope};

use super::{AccessRequestStore, RoleGrantDirectory, StoreError};

type Stream = Vec<EventEnvelope<AccessRequestEvent>>;

#[derive(Debug, Default)]
struct State {
    streams: HashMap<AccessRequestId, Stream>,
    grants: HashMap<UserId, GrantedRoleSet>,
}

/// In-memory, event-sourced access request store and grant directory.
///
/// Each request is an append-only stream of envelopes; reads rehydrate the
/// aggregate from its stream.
#[derive(Debug, Default)]
pub struct InMemoryAccessRequestStore {
    state: RwLock<State>,
}

impl InMemoryAccessRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new self-registration.
    pub fn submit(&self, cmd: SubmitAccessRequest) -> Result<AccessRequest, StoreError> {
        let id = cmd.request_id;
        let mut state = self.write()?;
        if state.streams.contains_key(&id) {
            return Err(StoreError::Rejected(format!("access request {id} already exists")));
        }

        let mut request = AccessRequest::empty(id);
        let events = request
            .handle(&AccessRequestCommand::Submit(cmd))
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        let stream = append(&mut request, Vec::new(), events);
        state.streams.insert(id, stream);

        tracing::debug!(request_id = %id, "access request submitted");
        Ok(request)
    }

    /// Every envelope recorded for `id`, in sequence order.
    pub fn history(&self, id: AccessRequestId) -> Result<Vec<EventEnvelope<AccessRequestEvent>>, StoreError> {
        let state = self.read()?;
        state.streams.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

fn rehydrate(id: AccessRequestId, stream: &[EventEnvelope<AccessRequestEvent>]) -> AccessRequest {
    let mut request = AccessRequest::empty(id);
    for envelope in stream {
        request.apply(envelope.payload());
    }
    request
}

/// Apply `events` to `request` and append them to `stream` with the next
/// sequence numbers.
fn append(request: &mut AccessRequest, mut stream: Stream, events: Vec<AccessRequestEvent>) -> Stream {
    for event in events {
        request.apply(&event);
        tracing::trace!(
            request_id = %request.id(),
            event_type = event.event_type(),
            schema_version = event.version(),
            occurred_at = %event.occurred_at(),
            sequence = request.version(),
            "event appended"
        );
        stream.push(EventEnvelope::wrap(*request.id(), request.version(), event));
    }
    stream
}

#[async_trait]
impl AccessRequestStore for InMemoryAccessRequestStore {
    async fn list_pending(&self) -> Result<Vec<AccessRequest>, StoreError> {
        let state = self.read()?;
        let mut pending: Vec<AccessRequest> = state
            .streams
            .iter()
            .map(|(id, stream)| rehydrate(*id, stream))
            .filter(AccessRequest::is_pending)
            .collect();
        pending.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then_with(|| b.id().cmp(a.id())));
        Ok(pending)
    }

    async fn get(&self, id: AccessRequestId) -> Result<Option<AccessRequest>, StoreError> {
        let state = self.read()?;
        Ok(state.streams.get(&id).map(|stream| rehydrate(id, stream)))
    }

    async fn persist_decisions(
        &self,
        id: AccessRequestId,
        decisions: &[ResolvedDecision],
    ) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        let stream = state.streams.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        let mut request = rehydrate(id, stream);
        if !request.is_pending() {
            return Err(StoreError::AlreadyResolved(id));
        }

        let command = AccessRequestCommand::RecordDecisions(RecordDecisions {
            request_id: id,
            decisions: decisions.to_vec(),
            occurred_at: Utc::now(),
        });
        let events = request
            .handle(&command)
            .map_err(|e| StoreError::Rejected(e.to_string()))?;

        *stream = append(&mut request, std::mem::take(stream), events);

        // Latest decision wins for every role this request covered.
        let grants = state.grants.entry(request.applicant()).or_default();
        for role in request.requested_roles() {
            grants.remove(*role);
        }
        grants.extend(request.granted_roles().iter());
        Ok(())
    }
}

#[async_trait]
impl RoleGrantDirectory for InMemoryAccessRequestStore {
    async fn granted_roles(&self, user: UserId) -> Result<GrantedRoleSet, StoreError> {
        let state = self.read()?;
        Ok(state.grants.get(&user).cloned().unwrap_or_default())
    }

    async fn revoke_role(&self, user: UserId, role: Role) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        Ok(state
            .grants
            .get_mut(&user)
            .is_some_and(|granted| granted.remove(role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registration(roles: Vec<Role>, minutes_ago: i64) -> SubmitAccessRequest {
        SubmitAccessRequest {
            request_id: AccessRequestId::new(),
            applicant: UserId::new(),
            first_name: "Ana Lucía".to_string(),
            last_name: "Flores Gutierrez".to_string(),
            email: "Ana.Flores@Example.edu ".to_string(),
            requested_roles: roles,
            occurred_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn decide(role: Role, approved: bool) -> ResolvedDecision {
        ResolvedDecision { role, approved }
    }

    #[tokio::test]
    async fn pending_is_newest_first() {
        let store = InMemoryAccessRequestStore::new();
        let old = store.submit(registration(vec![Role::Tutor], 60)).unwrap();
        let new = store.submit(registration(vec![Role::Verifier], 5)).unwrap();
        let mid = store.submit(registration(vec![Role::Administrator], 30)).unwrap();

        let ids: Vec<AccessRequestId> = store
            .list_pending()
            .await
            .unwrap()
            .iter()
            .map(|r| *r.id())
            .collect();
        assert_eq!(ids, vec![*new.id(), *mid.id(), *old.id()]);
    }

    #[tokio::test]
    async fn persisting_resolves_and_grants_approved_roles() {
        let store = InMemoryAccessRequestStore::new();
        let request = store
            .submit(registration(vec![Role::Tutor, Role::Verifier], 10))
            .unwrap();
        let id = *request.id();

        store
            .persist_decisions(id, &[decide(Role::Tutor, true), decide(Role::Verifier, false)])
            .await
            .unwrap();

        assert!(store.list_pending().await.unwrap().is_empty());
        let stored = store.get(id).await.unwrap().unwrap();
        assert!(!stored.is_pending());
        assert_eq!(
            store.granted_roles(request.applicant()).await.unwrap(),
            GrantedRoleSet::from([Role::Tutor])
        );

        let history = store.history(id).unwrap();
        let seqs: Vec<u64> = history.iter().map(|e| e.sequence_number()).collect();
        assert_eq!(seqs, vec![1, 2]);
        assert_eq!(history[1].event_type(), "access.request.decisions_recorded");
    }

    #[tokio::test]
    async fn second_persist_is_refused() {
        let store = InMemoryAccessRequestStore::new();
        let id = *store.submit(registration(vec![Role::Tutor], 1)).unwrap().id();
        store.persist_decisions(id, &[decide(Role::Tutor, false)]).await.unwrap();

        let err = store
            .persist_decisions(id, &[decide(Role::Tutor, true)])
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::AlreadyResolved(id));
    }

    #[tokio::test]
    async fn partial_decisions_are_rejected() {
        let store = InMemoryAccessRequestStore::new();
        let id = *store
            .submit(registration(vec![Role::Tutor, Role::Verifier], 1))
            .unwrap()
            .id();

        let err = store
            .persist_decisions(id, &[decide(Role::Tutor, true)])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert!(store.get(id).await.unwrap().unwrap().is_pending());
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let store = InMemoryAccessRequestStore::new();
        let id = AccessRequestId::new();
        assert_eq!(store.get(id).await.unwrap(), None);
        assert_eq!(
            store.persist_decisions(id, &[]).await.unwrap_err(),
            StoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn grants_accumulate_and_can_be_revoked() {
        let store = InMemoryAccessRequestStore::new();
        let first = registration(vec![Role::Tutor], 10);
        let user = first.applicant;
        let a = *store.submit(first).unwrap().id();
        let mut second = registration(vec![Role::Verifier], 5);
        second.applicant = user;
        let b = *store.submit(second).unwrap().id();

        store.persist_decisions(a, &[decide(Role::Tutor, true)]).await.unwrap();
        store.persist_decisions(b, &[decide(Role::Verifier, true)]).await.unwrap();
        assert_eq!(
            store.granted_roles(user).await.unwrap(),
            GrantedRoleSet::from([Role::Tutor, Role::Verifier])
        );

        assert!(store.revoke_role(user, Role::Tutor).await.unwrap());
        assert!(!store.revoke_role(user, Role::Tutor).await.unwrap());
        assert_eq!(
            store.granted_roles(user).await.unwrap(),
            GrantedRoleSet::from([Role::Verifier])
        );
    }

    #[tokio::test]
    async fn later_rejection_withdraws_an_earlier_grant() {
        let store = InMemoryAccessRequestStore::new();
        let first = registration(vec![Role::Tutor, Role::Verifier], 10);
        let user = first.applicant;
        let a = *store.submit(first).unwrap().id();
        let mut second = registration(vec![Role::Tutor], 5);
        second.applicant = user;
        let b = *store.submit(second).unwrap().id();

        store
            .persist_decisions(a, &[decide(Role::Tutor, true), decide(Role::Verifier, true)])
            .await
            .unwrap();
        store.persist_decisions(b, &[decide(Role::Tutor, false)]).await.unwrap();

        // Verifier was not part of the second request and stays granted.
        assert_eq!(
            store.granted_roles(user).await.unwrap(),
            GrantedRoleSet::from([Role::Verifier])
        );
    }

    #[test]
    fn submit_normalizes_email_and_rejects_duplicates() {
        let store = InMemoryAccessRequestStore::new();
        let cmd = registration(vec![Role::Tutor], 0);
        let request = store.submit(cmd.clone()).unwrap();
        assert_eq!(request.email(), "ana.flores@example.edu");

        assert!(matches!(store.submit(cmd), Err(StoreError::Rejected(_))));
    }
}
