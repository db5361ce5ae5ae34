use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{PostulationId, TutorPostulation};
use crate::workflows::postings::domain::{PostingId, TutorId};
use crate::workflows::postings::repository::RepositoryError;

/// Storage abstraction over the postulation collection.
pub trait PostulationRepository: Send + Sync {
    fn insert(&self, postulation: TutorPostulation) -> Result<TutorPostulation, RepositoryError>;
    fn update(&self, postulation: TutorPostulation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PostulationId) -> Result<Option<TutorPostulation>, RepositoryError>;
    /// The active (pending or accepted) postulation for a (tutor, posting)
    /// pair, if one exists. The duplicate-application invariant keeps this
    /// to at most one.
    fn active_for(
        &self,
        tutor_id: &TutorId,
        posting_id: &PostingId,
    ) -> Result<Option<TutorPostulation>, RepositoryError>;
    fn for_posting(&self, posting_id: &PostingId) -> Result<Vec<TutorPostulation>, RepositoryError>;
}

/// Sanitized representation of a postulation's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct PostulationView {
    pub postulation_id: PostulationId,
    pub posting_id: PostingId,
    pub tutor_id: TutorId,
    pub status: &'static str,
    pub postulated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_notes: Option<String>,
}

impl TutorPostulation {
    pub fn view(&self) -> PostulationView {
        PostulationView {
            postulation_id: self.id.clone(),
            posting_id: self.posting_id.clone(),
            tutor_id: self.tutor_id.clone(),
            status: self.status.label(),
            postulated_at: self.postulated_at,
            responded_at: self.responded_at,
            response_notes: self.response_notes.clone(),
        }
    }
}
