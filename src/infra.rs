use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::workflows::postings::postulations::{
    PostulationId, PostulationRepository, TutorPostulation,
};
use crate::workflows::postings::{
    EmailNotification, JobPosting, JobPostingStatus, NotificationDispatcher, NotificationError,
    PostingId, PostingRepository, RepositoryError, TutorId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPostingRepository {
    records: Arc<Mutex<HashMap<PostingId, JobPosting>>>,
}

impl PostingRepository for InMemoryPostingRepository {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        let mut guard = self.records.lock().expect("posting mutex poisoned");
        if guard.contains_key(&posting.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(posting.id.clone(), posting.clone());
        Ok(posting)
    }

    fn update(&self, posting: JobPosting) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("posting mutex poisoned");
        if guard.contains_key(&posting.id) {
            guard.insert(posting.id.clone(), posting);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError> {
        let guard = self.records.lock().expect("posting mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn published(&self, limit: usize) -> Result<Vec<JobPosting>, RepositoryError> {
        let guard = self.records.lock().expect("posting mutex poisoned");
        let mut postings: Vec<JobPosting> = guard
            .values()
            .filter(|posting| posting.status == JobPostingStatus::Published)
            .cloned()
            .collect();
        postings.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        postings.truncate(limit);
        Ok(postings)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPostulationRepository {
    records: Arc<Mutex<HashMap<PostulationId, TutorPostulation>>>,
}

impl PostulationRepository for InMemoryPostulationRepository {
    fn insert(&self, postulation: TutorPostulation) -> Result<TutorPostulation, RepositoryError> {
        let mut guard = self.records.lock().expect("postulation mutex poisoned");
        if guard.contains_key(&postulation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(postulation.id.clone(), postulation.clone());
        Ok(postulation)
    }

    fn update(&self, postulation: TutorPostulation) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("postulation mutex poisoned");
        if guard.contains_key(&postulation.id) {
            guard.insert(postulation.id.clone(), postulation);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &PostulationId) -> Result<Option<TutorPostulation>, RepositoryError> {
        let guard = self.records.lock().expect("postulation mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn active_for(
        &self,
        tutor_id: &TutorId,
        posting_id: &PostingId,
    ) -> Result<Option<TutorPostulation>, RepositoryError> {
        let guard = self.records.lock().expect("postulation mutex poisoned");
        Ok(guard
            .values()
            .find(|postulation| {
                postulation.tutor_id == *tutor_id
                    && postulation.posting_id == *posting_id
                    && postulation.status.is_active()
            })
            .cloned())
    }

    fn for_posting(
        &self,
        posting_id: &PostingId,
    ) -> Result<Vec<TutorPostulation>, RepositoryError> {
        let guard = self.records.lock().expect("postulation mutex poisoned");
        let mut postulations: Vec<TutorPostulation> = guard
            .values()
            .filter(|postulation| postulation.posting_id == *posting_id)
            .cloned()
            .collect();
        postulations.sort_by(|a, b| a.postulated_at.cmp(&b.postulated_at));
        Ok(postulations)
    }
}

/// Dispatcher that records the handoff in the logs; the real mail adapter
/// plugs in behind the same trait.
#[derive(Default, Clone)]
pub(crate) struct LoggingNotificationDispatcher;

impl NotificationDispatcher for LoggingNotificationDispatcher {
    fn dispatch(&self, notification: EmailNotification) -> Result<(), NotificationError> {
        tracing::info!(
            template = %notification.template,
            posting_id = %notification.posting_id.0,
            "notification handed off"
        );
        Ok(())
    }
}
