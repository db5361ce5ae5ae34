//! Tutor postulations: applications against published postings, resolved by
//! the owning institution (accept/reject) or withdrawn by the tutor.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{PostulationDetails, PostulationId, PostulationStatus, TutorPostulation};
pub use repository::{PostulationRepository, PostulationView};
pub use router::postulation_router;
pub use service::{PostulationService, PostulationServiceError};
