use std::collections::BTreeMap;

use super::domain::{Actor, JobPosting, JobPostingStatus, LifecycleError, TutorId};
use super::repository::{EmailNotification, Recipient};

/// Side effect requested by a transition, executed by the service layer
/// after the state mutation is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Notify(EmailNotification),
}

fn notification(
    template: &str,
    recipient: Recipient,
    posting: &JobPosting,
) -> Effect {
    let mut details = BTreeMap::new();
    details.insert("subject".to_string(), posting.subject.clone());
    details.insert("date".to_string(), posting.schedule.date.to_string());
    details.insert(
        "start_time".to_string(),
        posting.schedule.start_time.to_string(),
    );
    if let Some(zone) = &posting.schedule.timezone {
        details.insert("timezone".to_string(), zone.clone());
    }

    Effect::Notify(EmailNotification {
        template: template.to_string(),
        recipient,
        posting_id: posting.id.clone(),
        details,
    })
}

impl JobPosting {
    /// Draft -> published. Owning institution or admin.
    pub fn publish(&mut self, actor: &Actor) -> Result<Vec<Effect>, LifecycleError> {
        if !(actor.is_admin() || actor.owns(&self.institution_id)) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "publish this posting",
            });
        }
        if self.status != JobPostingStatus::Draft {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "publish",
            });
        }

        self.status = JobPostingStatus::Published;
        Ok(Vec::new())
    }

    /// Published -> assigned. Owning institution or admin picks the tutor;
    /// both parties are notified.
    pub fn assign_tutor(
        &mut self,
        tutor_id: TutorId,
        actor: &Actor,
    ) -> Result<Vec<Effect>, LifecycleError> {
        if !(actor.is_admin() || actor.owns(&self.institution_id)) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "assign a tutor",
            });
        }
        if self.status != JobPostingStatus::Published {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "assign a tutor to",
            });
        }

        self.status = JobPostingStatus::Assigned;
        self.assigned_tutor = Some(tutor_id.clone());

        Ok(vec![
            notification("tutor_assigned", Recipient::Tutor { id: tutor_id }, self),
            notification(
                "posting_assigned",
                Recipient::Institution {
                    id: self.institution_id.clone(),
                },
                self,
            ),
        ])
    }

    /// Assigned -> completed. Owning institution, the assigned tutor, or
    /// admin.
    pub fn complete(&mut self, actor: &Actor) -> Result<Vec<Effect>, LifecycleError> {
        let assigned = self.assigned_tutor.as_ref();
        let allowed = actor.is_admin()
            || actor.owns(&self.institution_id)
            || assigned.is_some_and(|tutor| actor.is_tutor(tutor));
        if !allowed {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "complete this posting",
            });
        }
        if self.status != JobPostingStatus::Assigned {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "complete",
            });
        }

        self.status = JobPostingStatus::Completed;
        Ok(Vec::new())
    }

    /// Any non-terminal state -> cancelled. Admin and the owning institution
    /// may cancel at any pre-terminal point; the assigned tutor only once
    /// assigned. The assigned tutor, if any, is notified and unset so the
    /// assignment invariant holds in the terminal state.
    pub fn cancel(&mut self, actor: &Actor) -> Result<Vec<Effect>, LifecycleError> {
        let allowed = actor.is_admin()
            || actor.owns(&self.institution_id)
            || (self.status == JobPostingStatus::Assigned
                && self
                    .assigned_tutor
                    .as_ref()
                    .is_some_and(|tutor| actor.is_tutor(tutor)));
        if !allowed {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "cancel this posting",
            });
        }
        if self.status.is_terminal() {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "cancel",
            });
        }

        let effects = match self.assigned_tutor.take() {
            Some(tutor) => vec![notification(
                "posting_cancelled",
                Recipient::Tutor { id: tutor },
                self,
            )],
            None => Vec::new(),
        };

        self.status = JobPostingStatus::Cancelled;
        Ok(effects)
    }

    /// Published -> draft, taking the posting off the marketplace. Owning
    /// institution or admin.
    pub fn hide(&mut self, actor: &Actor) -> Result<Vec<Effect>, LifecycleError> {
        if !(actor.is_admin() || actor.owns(&self.institution_id)) {
            return Err(LifecycleError::Unauthorized {
                role: actor.role_label(),
                action: "hide this posting",
            });
        }
        if self.status != JobPostingStatus::Published {
            return Err(LifecycleError::InvalidTransition {
                from: self.status.label(),
                action: "hide",
            });
        }

        self.status = JobPostingStatus::Draft;
        Ok(Vec::new())
    }
}
