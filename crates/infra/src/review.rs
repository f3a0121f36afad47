//! Review pipeline for administrators.
//!
//! ```text
//! open ─▶ decide* ─▶ submit
//!   │                  │
//!   │   1. apply_decisions (pure, completeness gate)
//!   │   2. mark slot in-flight
//!   │   3. persist_decisions (store round trip)
//!   │   4. drop slot on success / keep draft on failure
//!   └── discard
//! ```
//!
//! Drafts live in memory, one slot per `(reviewer, request)`. The slot map is
//! behind a `std::sync::Mutex` that is never held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use tutoria_access::{
    apply_decisions, begin_review, AccessRequest, ApprovalError, ResolvedRequest, ReviewDraft,
};
use tutoria_auth::Role;
use tutoria_core::{AccessRequestId, UserId};

use crate::store::{AccessRequestStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("access request {0} not found")]
    NotFound(AccessRequestId),

    #[error("no review draft is open for access request {0}")]
    NoOpenDraft(AccessRequestId),

    #[error("access request {0} is being submitted")]
    SubmissionInProgress(AccessRequestId),
}

type DraftKey = (UserId, AccessRequestId);

#[derive(Debug)]
struct DraftSlot {
    request: AccessRequest,
    draft: ReviewDraft,
    submitting: bool,
}

pub struct ReviewService<S> {
    store: Arc<S>,
    drafts: Mutex<HashMap<DraftKey, DraftSlot>>,
}

impl<S: AccessRequestStore> ReviewService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            drafts: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Pending requests, newest first.
    pub async fn pending(&self) -> Result<Vec<AccessRequest>, ReviewError> {
        Ok(self.store.list_pending().await?)
    }

    /// Open a draft for `request_id`, or resume the reviewer's existing one.
    pub async fn open(
        &self,
        reviewer: UserId,
        request_id: AccessRequestId,
    ) -> Result<ReviewDraft, ReviewError> {
        let existing = self
            .slots()
            .get(&(reviewer, request_id))
            .map(|slot| slot.draft.clone());
        if let Some(draft) = existing {
            return Ok(draft);
        }

        let request = self
            .store
            .get(request_id)
            .await?
            .ok_or(ReviewError::NotFound(request_id))?;
        if !request.is_pending() {
            return Err(ApprovalError::AlreadyResolved(request_id).into());
        }

        let mut slots = self.slots();
        // A concurrent open for the same key may have won the race.
        let slot = slots.entry((reviewer, request_id)).or_insert_with(|| DraftSlot {
            draft: begin_review(&request),
            request,
            submitting: false,
        });
        Ok(slot.draft.clone())
    }

    pub fn draft(&self, reviewer: UserId, request_id: AccessRequestId) -> Result<ReviewDraft, ReviewError> {
        self.slots()
            .get(&(reviewer, request_id))
            .map(|slot| slot.draft.clone())
            .ok_or(ReviewError::NoOpenDraft(request_id))
    }

    /// Toggle-style approve/reject for one role of an open draft.
    pub fn decide(
        &self,
        reviewer: UserId,
        request_id: AccessRequestId,
        role: Role,
        approved: bool,
    ) -> Result<ReviewDraft, ReviewError> {
        let mut slots = self.slots();
        let slot = editable(&mut slots, reviewer, request_id)?;
        slot.draft = slot.draft.clone().set_role_decision(role, approved)?;
        Ok(slot.draft.clone())
    }

    pub fn discard(&self, reviewer: UserId, request_id: AccessRequestId) -> Result<(), ReviewError> {
        let mut slots = self.slots();
        editable(&mut slots, reviewer, request_id)?;
        slots.remove(&(reviewer, request_id));
        Ok(())
    }

    /// Validate, apply and persist the reviewer's draft.
    ///
    /// On a store failure the draft is kept unchanged and may be resubmitted.
    pub async fn submit(
        &self,
        reviewer: UserId,
        request_id: AccessRequestId,
    ) -> Result<ResolvedRequest, ReviewError> {
        let resolved = {
            let mut slots = self.slots();
            let slot = editable(&mut slots, reviewer, request_id)?;
            let resolved = apply_decisions(&slot.request, &slot.draft)?;
            slot.submitting = true;
            resolved
        };
        let _guard = SubmissionGuard {
            drafts: &self.drafts,
            key: (reviewer, request_id),
        };

        if let Err(err) = self
            .store
            .persist_decisions(request_id, &resolved.decisions)
            .await
        {
            tracing::warn!(
                request_id = %request_id,
                reviewer = %reviewer,
                error = %err,
                retryable = err.is_retryable(),
                "persisting review decisions failed; draft kept"
            );
            return Err(err.into());
        }

        self.slots().retain(|(_, id), _| *id != request_id);

        let granted: Vec<&str> = resolved.granted_roles().iter().map(Role::as_str).collect();
        tracing::info!(
            request_id = %request_id,
            applicant = %resolved.applicant,
            reviewer = %reviewer,
            granted = ?granted,
            "access request resolved"
        );
        Ok(resolved)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<DraftKey, DraftSlot>> {
        lock(&self.drafts)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn editable(
    slots: &mut HashMap<DraftKey, DraftSlot>,
    reviewer: UserId,
    request_id: AccessRequestId,
) -> Result<&mut DraftSlot, ReviewError> {
    let slot = slots
        .get_mut(&(reviewer, request_id))
        .ok_or(ReviewError::NoOpenDraft(request_id))?;
    if slot.submitting {
        return Err(ReviewError::SubmissionInProgress(request_id));
    }
    Ok(slot)
}

/// Clears the in-flight flag when a submission finishes or its future is dropped.
struct SubmissionGuard<'a> {
    drafts: &'a Mutex<HashMap<DraftKey, DraftSlot>>,
    key: DraftKey,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = lock(self.drafts).get_mut(&self.key) {
            slot.submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;

    use tutoria_access::{Decision, ResolvedDecision, SubmitAccessRequest};
    use tutoria_auth::GrantedRoleSet;
    use tutoria_core::AggregateRoot;

    use crate::store::{InMemoryAccessRequestStore, RoleGrantDirectory};

    /// Wraps the in-memory store; can fail or stall `persist_decisions`.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryAccessRequestStore,
        fail: AtomicBool,
        stall: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    #[async_trait]
    impl AccessRequestStore for FlakyStore {
        async fn list_pending(&self) -> Result<Vec<AccessRequest>, StoreError> {
            self.inner.list_pending().await
        }

        async fn get(&self, id: AccessRequestId) -> Result<Option<AccessRequest>, StoreError> {
            self.inner.get(id).await
        }

        async fn persist_decisions(
            &self,
            id: AccessRequestId,
            decisions: &[ResolvedDecision],
        ) -> Result<(), StoreError> {
            if let Some((entered, release)) = &self.stall {
                entered.notify_one();
                release.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            self.inner.persist_decisions(id, decisions).await
        }
    }

    fn registration(roles: Vec<Role>) -> SubmitAccessRequest {
        SubmitAccessRequest {
            request_id: AccessRequestId::new(),
            applicant: UserId::new(),
            first_name: "Carlos Alberto".to_string(),
            last_name: "Huanca Condori".to_string(),
            email: "carlos.huanca@unsaac.edu.pe".to_string(),
            requested_roles: roles,
            occurred_at: Utc::now(),
        }
    }

    fn service_with(store: FlakyStore, roles: Vec<Role>) -> (ReviewService<FlakyStore>, AccessRequest) {
        let request = store.inner.submit(registration(roles)).unwrap();
        (ReviewService::new(Arc::new(store)), request)
    }

    #[tokio::test]
    async fn full_review_resolves_and_grants() {
        let (service, request) = service_with(FlakyStore::default(), vec![Role::Tutor, Role::Verifier]);
        let id = *request.id();
        let admin = UserId::new();

        service.open(admin, id).await.unwrap();
        service.decide(admin, id, Role::Tutor, true).unwrap();

        let err = service.submit(admin, id).await.unwrap_err();
        assert_eq!(
            err,
            ReviewError::Approval(ApprovalError::IncompleteDecision {
                undecided: vec![Role::Verifier]
            })
        );

        service.decide(admin, id, Role::Verifier, false).unwrap();
        let resolved = service.submit(admin, id).await.unwrap();

        assert_eq!(resolved.granted_roles(), GrantedRoleSet::from([Role::Tutor]));
        assert!(service.pending().await.unwrap().is_empty());
        assert_eq!(
            service.store().inner.granted_roles(request.applicant()).await.unwrap(),
            GrantedRoleSet::from([Role::Tutor])
        );
        assert_eq!(service.draft(admin, id), Err(ReviewError::NoOpenDraft(id)));
    }

    #[tokio::test]
    async fn reopening_resumes_the_same_draft() {
        let (service, request) = service_with(FlakyStore::default(), vec![Role::Administrator]);
        let id = *request.id();
        let admin = UserId::new();

        service.open(admin, id).await.unwrap();
        service.decide(admin, id, Role::Administrator, false).unwrap();

        let resumed = service.open(admin, id).await.unwrap();
        assert_eq!(resumed.decision(Role::Administrator), Some(Decision::Rejected));
    }

    #[tokio::test]
    async fn store_failure_keeps_draft_for_retry() {
        let store = FlakyStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let (service, request) = service_with(store, vec![Role::Tutor]);
        let id = *request.id();
        let admin = UserId::new();

        service.open(admin, id).await.unwrap();
        let before = service.decide(admin, id, Role::Tutor, true).unwrap();

        let err = service.submit(admin, id).await.unwrap_err();
        assert!(matches!(err, ReviewError::Store(StoreError::Unavailable(_))));
        assert_eq!(service.draft(admin, id).unwrap(), before);
        assert_eq!(service.pending().await.unwrap().len(), 1);

        service.store().fail.store(false, Ordering::SeqCst);
        service.submit(admin, id).await.unwrap();
        assert!(service.pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn edits_are_refused_while_submitting() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = FlakyStore {
            stall: Some((entered.clone(), release.clone())),
            ..FlakyStore::default()
        };
        let (service, request) = service_with(store, vec![Role::Tutor]);
        let service = Arc::new(service);
        let id = *request.id();
        let admin = UserId::new();

        service.open(admin, id).await.unwrap();
        service.decide(admin, id, Role::Tutor, true).unwrap();

        let submitting = {
            let service = service.clone();
            tokio::spawn(async move { service.submit(admin, id).await })
        };
        entered.notified().await;

        assert_eq!(
            service.decide(admin, id, Role::Tutor, false),
            Err(ReviewError::SubmissionInProgress(id))
        );
        assert_eq!(
            service.submit(admin, id).await,
            Err(ReviewError::SubmissionInProgress(id))
        );
        assert_eq!(service.discard(admin, id), Err(ReviewError::SubmissionInProgress(id)));

        release.notify_one();
        submitting.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn dropped_submission_clears_in_flight_flag() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = FlakyStore {
            stall: Some((entered.clone(), release.clone())),
            ..FlakyStore::default()
        };
        let (service, request) = service_with(store, vec![Role::Verifier]);
        let service = Arc::new(service);
        let id = *request.id();
        let admin = UserId::new();

        service.open(admin, id).await.unwrap();
        service.decide(admin, id, Role::Verifier, true).unwrap();

        let submitting = {
            let service = service.clone();
            tokio::spawn(async move { service.submit(admin, id).await })
        };
        entered.notified().await;
        submitting.abort();
        let _ = submitting.await;

        let draft = service.decide(admin, id, Role::Verifier, true).unwrap();
        assert_eq!(draft.decision(Role::Verifier), Some(Decision::Undecided));
    }

    #[tokio::test]
    async fn resolved_or_unknown_requests_cannot_be_opened() {
        let (service, request) = service_with(FlakyStore::default(), vec![Role::Tutor]);
        let id = *request.id();
        let admin = UserId::new();

        let unknown = AccessRequestId::new();
        assert_eq!(
            service.open(admin, unknown).await.unwrap_err(),
            ReviewError::NotFound(unknown)
        );

        service
            .store()
            .persist_decisions(id, &[ResolvedDecision { role: Role::Tutor, approved: true }])
            .await
            .unwrap();
        assert_eq!(
            service.open(admin, id).await.unwrap_err(),
            ReviewError::Approval(ApprovalError::AlreadyResolved(id))
        );
    }

    #[tokio::test]
    async fn invalid_role_leaves_draft_untouched() {
        let (service, request) = service_with(FlakyStore::default(), vec![Role::Tutor]);
        let id = *request.id();
        let admin = UserId::new();
        let draft = service.open(admin, id).await.unwrap();

        let err = service.decide(admin, id, Role::Administrator, true).unwrap_err();
        assert!(matches!(err, ReviewError::Approval(ApprovalError::InvalidRole { .. })));
        assert_eq!(service.draft(admin, id).unwrap(), draft);
    }

    #[tokio::test]
    async fn drafts_are_per_reviewer() {
        let (service, request) = service_with(FlakyStore::default(), vec![Role::Tutor]);
        let id = *request.id();
        let (alice, bob) = (UserId::new(), UserId::new());

        service.open(alice, id).await.unwrap();
        service.decide(alice, id, Role::Tutor, true).unwrap();

        assert_eq!(service.draft(bob, id), Err(ReviewError::NoOpenDraft(id)));
        let bobs = service.open(bob, id).await.unwrap();
        assert_eq!(bobs.decision(Role::Tutor), Some(Decision::Undecided));

        service.discard(alice, id).unwrap();
        assert_eq!(service.draft(alice, id), Err(ReviewError::NoOpenDraft(id)));
        assert!(service.draft(bob, id).is_ok());
    }
}
