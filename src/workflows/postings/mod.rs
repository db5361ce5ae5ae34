//! Job posting lifecycle: institutions draft and publish class postings,
//! tutors are assigned, postings complete or get cancelled. Postulations
//! (tutor applications against published postings) live one level down.

pub mod domain;
pub mod lifecycle;
pub mod postulations;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Actor, ClassSchedule, InstitutionId, JobPosting, JobPostingStatus, LifecycleError, PostingId,
    StudentRecord, TutorId,
};
pub use lifecycle::Effect;
pub use repository::{
    EmailNotification, NotificationDispatcher, NotificationError, PostingRepository,
    PostingStatusView, Recipient, RepositoryError,
};
pub use router::posting_router;
pub use service::{JobPostingService, NewPosting, PostingServiceError};
