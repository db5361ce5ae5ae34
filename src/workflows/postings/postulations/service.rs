use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{PostulationDetails, PostulationId, PostulationStatus, TutorPostulation};
use super::repository::PostulationRepository;
use crate::workflows::postings::domain::{
    Actor, JobPosting, JobPostingStatus, LifecycleError, PostingId, TutorId,
};
use crate::workflows::postings::lifecycle::Effect;
use crate::workflows::postings::repository::{
    NotificationDispatcher, PostingRepository, RepositoryError,
};

/// Service composing the postulation repository, the posting repository
/// (for publication and ownership checks), and the notification dispatcher.
pub struct PostulationService<S, R, N> {
    postulations: Arc<S>,
    postings: Arc<R>,
    notifier: Arc<N>,
}

static POSTULATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_postulation_id() -> PostulationId {
    let id = POSTULATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PostulationId(format!("postul-{id:06}"))
}

impl<S, R, N> PostulationService<S, R, N>
where
    S: PostulationRepository + 'static,
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(postulations: Arc<S>, postings: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            postulations,
            postings,
            notifier,
        }
    }

    /// Apply to a published posting as the acting tutor.
    ///
    /// Fails with `DuplicateApplication` while a pending or accepted
    /// postulation exists for the pair; a tutor may re-apply after a
    /// withdrawal or rejection.
    pub fn create(
        &self,
        posting_id: &PostingId,
        tutor_id: TutorId,
        details: PostulationDetails,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<TutorPostulation, PostulationServiceError> {
        if !actor.is_tutor(&tutor_id) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "apply on behalf of this tutor",
            }
            .into());
        }

        let posting = self
            .postings
            .fetch(posting_id)?
            .ok_or(RepositoryError::NotFound)?;
        if posting.status != JobPostingStatus::Published {
            return Err(LifecycleError::PostingNotPublished.into());
        }

        if self
            .postulations
            .active_for(&tutor_id, posting_id)?
            .is_some()
        {
            return Err(LifecycleError::DuplicateApplication.into());
        }

        let postulation = TutorPostulation {
            id: next_postulation_id(),
            posting_id: posting_id.clone(),
            tutor_id,
            status: PostulationStatus::Pending,
            details,
            postulated_at: now,
            responded_at: None,
            response_notes: None,
        };

        let stored = self.postulations.insert(postulation)?;
        Ok(stored)
    }

    /// Accept a pending postulation. Other pending postulations for the same
    /// posting stay pending; each is resolved on its own.
    pub fn accept(
        &self,
        id: &PostulationId,
        response_notes: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<TutorPostulation, PostulationServiceError> {
        self.respond(id, |postulation, posting| {
            postulation.accept(posting, response_notes, actor, now)
        })
    }

    pub fn reject(
        &self,
        id: &PostulationId,
        response_notes: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<TutorPostulation, PostulationServiceError> {
        self.respond(id, |postulation, posting| {
            postulation.reject(posting, response_notes, actor, now)
        })
    }

    pub fn withdraw(
        &self,
        id: &PostulationId,
        actor: &Actor,
    ) -> Result<TutorPostulation, PostulationServiceError> {
        self.respond(id, |postulation, _posting| postulation.withdraw(actor))
    }

    pub fn get(&self, id: &PostulationId) -> Result<TutorPostulation, PostulationServiceError> {
        let postulation = self
            .postulations
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(postulation)
    }

    pub fn list_for_posting(
        &self,
        posting_id: &PostingId,
    ) -> Result<Vec<TutorPostulation>, PostulationServiceError> {
        let posting = self.postings.fetch(posting_id)?;
        if posting.is_none() {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(self.postulations.for_posting(posting_id)?)
    }

    fn respond<F>(
        &self,
        id: &PostulationId,
        apply: F,
    ) -> Result<TutorPostulation, PostulationServiceError>
    where
        F: FnOnce(&mut TutorPostulation, &JobPosting) -> Result<Vec<Effect>, LifecycleError>,
    {
        let mut postulation = self
            .postulations
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        let posting = self
            .postings
            .fetch(&postulation.posting_id)?
            .ok_or(RepositoryError::NotFound)?;

        let effects = apply(&mut postulation, &posting)?;
        self.postulations.update(postulation.clone())?;
        self.run_effects(&postulation, effects);

        Ok(postulation)
    }

    fn run_effects(&self, postulation: &TutorPostulation, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => {
                    if let Err(err) = self.notifier.dispatch(notification) {
                        tracing::warn!(
                            postulation_id = %postulation.id.0,
                            error = %err,
                            "notification dispatch failed"
                        );
                    }
                }
            }
        }
    }
}

/// Error raised by the postulation service.
#[derive(Debug, thiserror::Error)]
pub enum PostulationServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
