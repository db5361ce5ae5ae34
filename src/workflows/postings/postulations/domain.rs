use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::postings::domain::{Actor, JobPosting, LifecycleError, PostingId, TutorId};
use crate::workflows::postings::lifecycle::Effect;
use crate::workflows::postings::repository::{EmailNotification, Recipient};

/// Identifier wrapper for postulations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostulationId(pub String);

/// Lifecycle states of a postulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostulationStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl PostulationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PostulationStatus::Pending => "pending",
            PostulationStatus::Accepted => "accepted",
            PostulationStatus::Rejected => "rejected",
            PostulationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Active postulations block the tutor from re-applying to the same
    /// posting.
    pub const fn is_active(self) -> bool {
        matches!(self, PostulationStatus::Pending | PostulationStatus::Accepted)
    }
}

/// Free-text fields the tutor submits with an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostulationDetails {
    pub cover_letter: String,
    #[serde(default)]
    pub teaching_approach: Option<String>,
}

/// A tutor's application to a specific job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorPostulation {
    pub id: PostulationId,
    pub posting_id: PostingId,
    pub tutor_id: TutorId,
    pub status: PostulationStatus,
    pub details: PostulationDetails,
    pub postulated_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub response_notes: Option<String>,
}

fn decision_notification(
    template: &str,
    postulation: &TutorPostulation,
    posting: &JobPosting,
) -> Effect {
    let mut details = BTreeMap::new();
    details.insert("subject".to_string(), posting.subject.clone());
    details.insert("date".to_string(), posting.schedule.date.to_string());
    details.insert(
        "postulation_id".to_string(),
        postulation.id.0.clone(),
    );
    if let Some(notes) = &postulation.response_notes {
        details.insert("response_notes".to_string(), notes.clone());
    }

    Effect::Notify(EmailNotification {
        template: template.to_string(),
        recipient: Recipient::Tutor {
            id: postulation.tutor_id.clone(),
        },
        posting_id: posting.id.clone(),
        details,
    })
}

impl TutorPostulation {
    fn ensure_resolvable(
        &self,
        posting: &JobPosting,
        actor: &Actor,
        action: &'static str,
    ) -> Result<(), LifecycleError> {
        if !(actor.is_admin() || actor.owns(&posting.institution_id)) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action,
            });
        }
        if self.status != PostulationStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action,
            });
        }
        Ok(())
    }

    /// Pending -> accepted, by the owning institution or admin. The tutor is
    /// notified; any derived class-instance record is created downstream.
    pub fn accept(
        &mut self,
        posting: &JobPosting,
        response_notes: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, LifecycleError> {
        self.ensure_resolvable(posting, actor, "accept this postulation")?;

        self.status = PostulationStatus::Accepted;
        self.responded_at = Some(now);
        self.response_notes = response_notes;

        Ok(vec![decision_notification(
            "postulation_accepted",
            self,
            posting,
        )])
    }

    /// Pending -> rejected, by the owning institution or admin.
    pub fn reject(
        &mut self,
        posting: &JobPosting,
        response_notes: Option<String>,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, LifecycleError> {
        self.ensure_resolvable(posting, actor, "reject this postulation")?;

        self.status = PostulationStatus::Rejected;
        self.responded_at = Some(now);
        self.response_notes = response_notes;

        Ok(vec![decision_notification(
            "postulation_rejected",
            self,
            posting,
        )])
    }

    /// Pending -> withdrawn, by the applicant tutor. Terminal.
    pub fn withdraw(&mut self, actor: &Actor) -> Result<Vec<Effect>, LifecycleError> {
        if !actor.is_tutor(&self.tutor_id) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "withdraw this postulation",
            });
        }
        if self.status != PostulationStatus::Pending {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "withdraw",
            });
        }

        self.status = PostulationStatus::Withdrawn;
        Ok(Vec::new())
    }
}
