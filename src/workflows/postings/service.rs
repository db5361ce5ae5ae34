use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use super::domain::{
    Actor, ClassSchedule, InstitutionId, JobPosting, JobPostingStatus, LifecycleError, PostingId,
    StudentRecord, TutorId,
};
use super::lifecycle::Effect;
use super::repository::{NotificationDispatcher, PostingRepository, RepositoryError};
use crate::scheduling::{self, SchedulingError};

/// Inbound payload for a new draft posting. The class location drives zone
/// resolution; an explicit timezone wins over the lookup table.
#[derive(Debug, Clone)]
pub struct NewPosting {
    pub institution_id: InstitutionId,
    pub subject: String,
    pub country: String,
    pub state: Option<String>,
    pub timezone: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub students: Vec<StudentRecord>,
}

/// Service composing the posting repository, the notification dispatcher,
/// and the transition rules.
pub struct JobPostingService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    default_timezone: Option<String>,
}

static POSTING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_posting_id() -> PostingId {
    let id = POSTING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PostingId(format!("post-{id:06}"))
}

impl<R, N> JobPostingService<R, N>
where
    R: PostingRepository + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, default_timezone: Option<String>) -> Self {
        Self {
            repository,
            notifier,
            default_timezone,
        }
    }

    /// Create a draft posting for the owning institution.
    ///
    /// The zone is resolved from the class location when the caller did not
    /// pick one: single-zone locations auto-assign, multi-zone locations
    /// require an explicit choice, unknown locations fall back to the
    /// configured default.
    pub fn create_draft(
        &self,
        new_posting: NewPosting,
        actor: &Actor,
    ) -> Result<JobPosting, PostingServiceError> {
        if !(actor.is_admin() || actor.owns(&new_posting.institution_id)) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "create a posting for this institution",
            }
            .into());
        }

        let timezone = self.resolve_timezone(&new_posting)?;

        let posting = JobPosting {
            id: next_posting_id(),
            institution_id: new_posting.institution_id,
            subject: new_posting.subject,
            schedule: ClassSchedule {
                date: new_posting.date,
                start_time: new_posting.start_time,
                duration_minutes: new_posting.duration_minutes,
                timezone,
            },
            status: JobPostingStatus::Draft,
            assigned_tutor: None,
            students: new_posting.students,
        };

        let stored = self.repository.insert(posting)?;
        Ok(stored)
    }

    fn resolve_timezone(
        &self,
        new_posting: &NewPosting,
    ) -> Result<Option<String>, PostingServiceError> {
        if let Some(zone_id) = &new_posting.timezone {
            if scheduling::zone(zone_id).is_none() {
                return Err(SchedulingError::UnknownZone {
                    id: zone_id.clone(),
                }
                .into());
            }
            return Ok(Some(zone_id.clone()));
        }

        match scheduling::timezones_for(&new_posting.country, new_posting.state.as_deref()) {
            Some([only]) => Ok(Some(only.id.to_string())),
            Some(_) => Err(PostingServiceError::AmbiguousTimezone {
                country: new_posting.country.clone(),
                state: new_posting.state.clone(),
            }),
            None => match &self.default_timezone {
                Some(fallback) => Ok(Some(fallback.clone())),
                None => Ok(None),
            },
        }
    }

    pub fn publish(
        &self,
        id: &PostingId,
        actor: &Actor,
    ) -> Result<JobPosting, PostingServiceError> {
        self.transition(id, |posting| posting.publish(actor))
    }

    pub fn assign_tutor(
        &self,
        id: &PostingId,
        tutor_id: TutorId,
        actor: &Actor,
    ) -> Result<JobPosting, PostingServiceError> {
        self.transition(id, |posting| posting.assign_tutor(tutor_id, actor))
    }

    pub fn complete(
        &self,
        id: &PostingId,
        actor: &Actor,
    ) -> Result<JobPosting, PostingServiceError> {
        self.transition(id, |posting| posting.complete(actor))
    }

    pub fn cancel(&self, id: &PostingId, actor: &Actor) -> Result<JobPosting, PostingServiceError> {
        self.transition(id, |posting| posting.cancel(actor))
    }

    pub fn hide(&self, id: &PostingId, actor: &Actor) -> Result<JobPosting, PostingServiceError> {
        self.transition(id, |posting| posting.hide(actor))
    }

    pub fn get(&self, id: &PostingId) -> Result<JobPosting, PostingServiceError> {
        let posting = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(posting)
    }

    pub fn published(&self, limit: usize) -> Result<Vec<JobPosting>, PostingServiceError> {
        Ok(self.repository.published(limit)?)
    }

    /// Fetch, run the transition, persist, then hand effects to the
    /// dispatcher. Validation failures leave the stored posting untouched;
    /// dispatch failures are logged and swallowed.
    fn transition<F>(&self, id: &PostingId, apply: F) -> Result<JobPosting, PostingServiceError>
    where
        F: FnOnce(&mut JobPosting) -> Result<Vec<Effect>, LifecycleError>,
    {
        let mut posting = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let effects = apply(&mut posting)?;
        self.repository.update(posting.clone())?;
        self.run_effects(&posting, effects);

        Ok(posting)
    }

    pub(crate) fn run_effects(&self, posting: &JobPosting, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => {
                    if let Err(err) = self.notifier.dispatch(notification) {
                        tracing::warn!(
                            posting_id = %posting.id.0,
                            error = %err,
                            "notification dispatch failed"
                        );
                    }
                }
            }
        }
    }
}

/// Error raised by the posting service.
#[derive(Debug, thiserror::Error)]
pub enum PostingServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
    #[error("location {country}/{state:?} spans multiple timezones, pick one explicitly")]
    AmbiguousTimezone {
        country: String,
        state: Option<String>,
    },
}
