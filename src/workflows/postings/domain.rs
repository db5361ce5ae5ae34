use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduling;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostingId(pub String);

/// Identifier wrapper for tutor accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TutorId(pub String);

/// Identifier wrapper for institution accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub String);

/// The authenticated identity performing an operation.
///
/// Passed explicitly into every lifecycle operation so authorization is a
/// pure function of (actor, entity, requested transition) with no ambient
/// session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    Student { id: String },
    Tutor { id: TutorId },
    Institution { id: InstitutionId },
    Admin { id: String },
}

impl Actor {
    pub const fn role_label(&self) -> &'static str {
        match self {
            Actor::Student { .. } => "student",
            Actor::Tutor { .. } => "tutor",
            Actor::Institution { .. } => "institution",
            Actor::Admin { .. } => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Admin { .. })
    }

    pub fn owns(&self, institution_id: &InstitutionId) -> bool {
        matches!(self, Actor::Institution { id } if id == institution_id)
    }

    pub fn is_tutor(&self, tutor_id: &TutorId) -> bool {
        matches!(self, Actor::Tutor { id } if id == tutor_id)
    }
}

/// Lifecycle states of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPostingStatus {
    Draft,
    Published,
    Assigned,
    Completed,
    Cancelled,
}

impl JobPostingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobPostingStatus::Draft => "draft",
            JobPostingStatus::Published => "published",
            JobPostingStatus::Assigned => "assigned",
            JobPostingStatus::Completed => "completed",
            JobPostingStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            JobPostingStatus::Completed | JobPostingStatus::Cancelled
        )
    }
}

/// When and for how long the class meets, as wall-clock time in the
/// posting's zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchedule {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub timezone: Option<String>,
}

impl ClassSchedule {
    /// The class start as a UTC instant, when a zone is recorded.
    pub fn starts_at_utc(&self) -> Option<DateTime<Utc>> {
        let zone = self.timezone.as_deref()?;
        scheduling::convert_to_utc(self.date.and_time(self.start_time), zone).ok()
    }
}

/// Student embedded in a posting. Owned by the posting, no independent
/// lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub full_name: String,
    pub grade_level: Option<String>,
}

/// An institution's request for a tutor to teach a scheduled class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: PostingId,
    pub institution_id: InstitutionId,
    pub subject: String,
    pub schedule: ClassSchedule,
    pub status: JobPostingStatus,
    pub assigned_tutor: Option<TutorId>,
    pub students: Vec<StudentRecord>,
}

impl JobPosting {
    /// `assigned_tutor` is `Some` exactly when status is assigned or
    /// completed.
    pub fn tutor_assignment_consistent(&self) -> bool {
        let requires_tutor = matches!(
            self.status,
            JobPostingStatus::Assigned | JobPostingStatus::Completed
        );
        requires_tutor == self.assigned_tutor.is_some()
    }
}

/// Errors raised by posting and postulation transitions.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {action} a posting in status '{from}'")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    #[error("{role} is not allowed to {action}")]
    Unauthorized {
        role: &'static str,
        action: &'static str,
    },
    #[error("tutor already has an active postulation for this posting")]
    DuplicateApplication,
    #[error("postulations are only accepted against published postings")]
    PostingNotPublished,
}
