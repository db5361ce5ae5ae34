use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::workflows::postings::domain::{
    Actor, ClassSchedule, InstitutionId, JobPosting, JobPostingStatus, PostingId, TutorId,
};
use crate::workflows::postings::postulations::domain::{
    PostulationDetails, PostulationId, TutorPostulation,
};
use crate::workflows::postings::postulations::repository::PostulationRepository;
use crate::workflows::postings::postulations::service::PostulationService;
use crate::workflows::postings::repository::{
    EmailNotification, NotificationDispatcher, NotificationError, PostingRepository,
    RepositoryError,
};

pub(super) fn institution() -> InstitutionId {
    InstitutionId("inst-andes".to_string())
}

pub(super) fn owner() -> Actor {
    Actor::Institution { id: institution() }
}

pub(super) fn tutor(id: &str) -> Actor {
    Actor::Tutor {
        id: TutorId(id.to_string()),
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap()
}

pub(super) fn published_posting(suffix: &str) -> JobPosting {
    JobPosting {
        id: PostingId(format!("post-{suffix}")),
        institution_id: institution(),
        subject: "Spanish tutoring".to_string(),
        schedule: ClassSchedule {
            date: NaiveDate::from_ymd_opt(2026, 5, 12).expect("valid date"),
            start_time: NaiveTime::from_hms_opt(16, 0, 0).expect("valid time"),
            duration_minutes: 90,
            timezone: Some("America/La_Paz".to_string()),
        },
        status: JobPostingStatus::Published,
        assigned_tutor: None,
        students: Vec::new(),
    }
}

pub(super) fn details() -> PostulationDetails {
    PostulationDetails {
        cover_letter: "Five years teaching conversational Spanish.".to_string(),
        teaching_approach: Some("Immersion with weekly written feedback.".to_string()),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPostings {
    records: Arc<Mutex<HashMap<PostingId, JobPosting>>>,
}

impl PostingRepository for MemoryPostings {
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
        guard.insert(posting.id.clone(), posting);
        Ok(())
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
        postings.truncate(limit);
        Ok(postings)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPostulations {
    records: Arc<Mutex<HashMap<PostulationId, TutorPostulation>>>,
}

impl PostulationRepository for MemoryPostulations {
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
        guard.insert(postulation.id.clone(), postulation);
        Ok(())
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
        postulations.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(postulations)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<EmailNotification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<EmailNotification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationDispatcher for MemoryNotifier {
    fn dispatch(&self, notification: EmailNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) type Service = PostulationService<MemoryPostulations, MemoryPostings, MemoryNotifier>;

pub(super) fn build_service(
    posting: JobPosting,
) -> (Service, Arc<MemoryPostings>, Arc<MemoryNotifier>) {
    let postings = Arc::new(MemoryPostings::default());
    let postulations = Arc::new(MemoryPostulations::default());
    let notifier = Arc::new(MemoryNotifier::default());
    postings.insert(posting).expect("seed posting");
    let service = PostulationService::new(postulations, postings.clone(), notifier.clone());
    (service, postings, notifier)
}
