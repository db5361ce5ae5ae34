use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{InstitutionId, JobPosting, PostingId, TutorId};

/// Storage abstraction over the posting collection so services can be
/// exercised in isolation.
pub trait PostingRepository: Send + Sync {
    fn insert(&self, posting: JobPosting) -> Result<JobPosting, RepositoryError>;
    fn update(&self, posting: JobPosting) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PostingId) -> Result<Option<JobPosting>, RepositoryError>;
    fn published(&self, limit: usize) -> Result<Vec<JobPosting>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Who a lifecycle notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    Tutor { id: TutorId },
    Institution { id: InstitutionId },
}

/// Notification payload handed to the outbound mail adapter. Template
/// rendering and delivery happen downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailNotification {
    pub template: String,
    pub recipient: Recipient,
    pub posting_id: PostingId,
    pub details: BTreeMap<String, String>,
}

/// Trait describing the outbound notification hook. Dispatch failures never
/// roll back the transition that requested them.
pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(&self, notification: EmailNotification) -> Result<(), NotificationError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of a posting's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct PostingStatusView {
    pub posting_id: PostingId,
    pub status: &'static str,
    pub subject: String,
    pub institution_id: InstitutionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_tutor: Option<TutorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at_utc: Option<DateTime<Utc>>,
    pub student_count: usize,
}

impl JobPosting {
    pub fn status_view(&self) -> PostingStatusView {
        PostingStatusView {
            posting_id: self.id.clone(),
            status: self.status.label(),
            subject: self.subject.clone(),
            institution_id: self.institution_id.clone(),
            assigned_tutor: self.assigned_tutor.clone(),
            timezone: self.schedule.timezone.clone(),
            starts_at_utc: self.schedule.starts_at_utc(),
            student_count: self.students.len(),
        }
    }
}
