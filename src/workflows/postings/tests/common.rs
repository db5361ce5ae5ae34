use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

use crate::workflows::postings::domain::{
    Actor, ClassSchedule, InstitutionId, JobPosting, JobPostingStatus, PostingId, StudentRecord,
    TutorId,
};
use crate::workflows::postings::repository::{
    EmailNotification, NotificationDispatcher, NotificationError, PostingRepository,
    RepositoryError,
};
use crate::workflows::postings::service::{JobPostingService, NewPosting};

pub(super) fn institution() -> InstitutionId {
    InstitutionId("inst-andes".to_string())
}

pub(super) fn owner() -> Actor {
    Actor::Institution { id: institution() }
}

pub(super) fn admin() -> Actor {
    Actor::Admin {
        id: "admin-root".to_string(),
    }
}

pub(super) fn tutor(id: &str) -> Actor {
    Actor::Tutor {
        id: TutorId(id.to_string()),
    }
}

pub(super) fn schedule() -> ClassSchedule {
    ClassSchedule {
        date: NaiveDate::from_ymd_opt(2026, 5, 12).expect("valid date"),
        start_time: NaiveTime::from_hms_opt(16, 0, 0).expect("valid time"),
        duration_minutes: 90,
        timezone: Some("America/La_Paz".to_string()),
    }
}

pub(super) fn draft_posting(suffix: &str) -> JobPosting {
    JobPosting {
        id: PostingId(format!("post-{suffix}")),
        institution_id: institution(),
        subject: "Spanish tutoring".to_string(),
        schedule: schedule(),
        status: JobPostingStatus::Draft,
        assigned_tutor: None,
        students: vec![StudentRecord {
            full_name: "Valeria Quispe".to_string(),
            grade_level: Some("secondary".to_string()),
        }],
    }
}

pub(super) fn new_posting() -> NewPosting {
    NewPosting {
        institution_id: institution(),
        subject: "Spanish tutoring".to_string(),
        country: "BO".to_string(),
        state: None,
        timezone: None,
        date: NaiveDate::from_ymd_opt(2026, 5, 12).expect("valid date"),
        start_time: NaiveTime::from_hms_opt(16, 0, 0).expect("valid time"),
        duration_minutes: 90,
        students: Vec::new(),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<PostingId, JobPosting>>>,
}

impl PostingRepository for MemoryRepository {
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

pub(super) struct FailingNotifier;

impl NotificationDispatcher for FailingNotifier {
    fn dispatch(&self, _notification: EmailNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl PostingRepository for UnavailableRepository {
    fn insert(&self, _posting: JobPosting) -> Result<JobPosting, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _posting: JobPosting) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &PostingId) -> Result<Option<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn published(&self, _limit: usize) -> Result<Vec<JobPosting>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    JobPostingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = JobPostingService::new(repository.clone(), notifier.clone(), None);
    (service, repository, notifier)
}

pub(super) fn seeded_service(
    posting: JobPosting,
) -> (
    JobPostingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let (service, repository, notifier) = build_service();
    repository.insert(posting).expect("seed posting");
    (service, repository, notifier)
}
