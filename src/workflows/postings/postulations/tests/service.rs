use super::common::*;
use crate::workflows::postings::domain::{JobPostingStatus, LifecycleError, PostingId, TutorId};
use crate::workflows::postings::postulations::domain::{PostulationId, PostulationStatus};
use crate::workflows::postings::postulations::service::PostulationServiceError;
use crate::workflows::postings::repository::{Recipient, RepositoryError};

#[test]
fn create_starts_pending_with_timestamp() {
    let (service, _, _) = build_service(published_posting("apply"));

    let postulation = service
        .create(
            &PostingId("post-apply".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("tutor applies to a published posting");

    assert_eq!(postulation.status, PostulationStatus::Pending);
    assert_eq!(postulation.postulated_at, now());
    assert!(postulation.responded_at.is_none());
}

#[test]
fn create_rejects_unpublished_postings() {
    let mut draft = published_posting("draft");
    draft.status = JobPostingStatus::Draft;
    let (service, _, _) = build_service(draft);

    match service.create(
        &PostingId("post-draft".to_string()),
        TutorId("tutor-ana".to_string()),
        details(),
        &tutor("tutor-ana"),
        now(),
    ) {
        Err(PostulationServiceError::Lifecycle(LifecycleError::PostingNotPublished)) => {}
        other => panic!("expected posting-not-published, got {other:?}"),
    }
}

#[test]
fn create_rejects_missing_postings() {
    let (service, _, _) = build_service(published_posting("exists"));

    match service.create(
        &PostingId("post-ghost".to_string()),
        TutorId("tutor-ana".to_string()),
        details(),
        &tutor("tutor-ana"),
        now(),
    ) {
        Err(PostulationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn create_rejects_impersonation() {
    let (service, _, _) = build_service(published_posting("imp"));

    match service.create(
        &PostingId("post-imp".to_string()),
        TutorId("tutor-ana".to_string()),
        details(),
        &tutor("tutor-luis"),
        now(),
    ) {
        Err(PostulationServiceError::Lifecycle(LifecycleError::Unauthorized { role, .. })) => {
            assert_eq!(role, "tutor");
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test]
fn duplicate_active_application_is_rejected() {
    let (service, _, _) = build_service(published_posting("dup"));
    let posting_id = PostingId("post-dup".to_string());

    service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("first application");

    match service.create(
        &posting_id,
        TutorId("tutor-ana".to_string()),
        details(),
        &tutor("tutor-ana"),
        now(),
    ) {
        Err(PostulationServiceError::Lifecycle(LifecycleError::DuplicateApplication)) => {}
        other => panic!("expected duplicate application, got {other:?}"),
    }
}

#[test]
fn reapplication_is_allowed_after_withdrawal() {
    let (service, _, _) = build_service(published_posting("rewith"));
    let posting_id = PostingId("post-rewith".to_string());

    let first = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("first application");
    service
        .withdraw(&first.id, &tutor("tutor-ana"))
        .expect("withdraw");

    let second = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("re-application after withdrawal");
    assert_eq!(second.status, PostulationStatus::Pending);
    assert_ne!(second.id, first.id);
}

#[test]
fn reapplication_is_allowed_after_rejection() {
    let (service, _, _) = build_service(published_posting("rerej"));
    let posting_id = PostingId("post-rerej".to_string());

    let first = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("first application");
    service
        .reject(&first.id, None, &owner(), now())
        .expect("reject");

    service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("re-application after rejection");
}

#[test]
fn duplicate_check_blocks_while_accepted() {
    let (service, _, _) = build_service(published_posting("acc-dup"));
    let posting_id = PostingId("post-acc-dup".to_string());

    let first = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("first application");
    service
        .accept(&first.id, None, &owner(), now())
        .expect("accept");

    assert!(matches!(
        service.create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        ),
        Err(PostulationServiceError::Lifecycle(
            LifecycleError::DuplicateApplication
        ))
    ));
}

#[test]
fn accept_marks_responded_and_notifies_the_tutor() {
    let (service, _, notifier) = build_service(published_posting("accept"));
    let posting_id = PostingId("post-accept".to_string());

    let postulation = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");

    let accepted = service
        .accept(
            &postulation.id,
            Some("Welcome aboard".to_string()),
            &owner(),
            now(),
        )
        .expect("owner accepts");

    assert_eq!(accepted.status, PostulationStatus::Accepted);
    assert_eq!(accepted.responded_at, Some(now()));
    assert_eq!(accepted.response_notes.as_deref(), Some("Welcome aboard"));

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "postulation_accepted");
    assert_eq!(
        events[0].recipient,
        Recipient::Tutor {
            id: TutorId("tutor-ana".to_string())
        }
    );
}

#[test]
fn accept_requires_institution_or_admin() {
    let (service, _, _) = build_service(published_posting("acc-auth"));
    let postulation = service
        .create(
            &PostingId("post-acc-auth".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");

    assert!(matches!(
        service.accept(&postulation.id, None, &tutor("tutor-ana"), now()),
        Err(PostulationServiceError::Lifecycle(
            LifecycleError::Unauthorized { .. }
        ))
    ));
}

#[test]
fn accept_is_single_shot() {
    let (service, _, _) = build_service(published_posting("acc-twice"));
    let postulation = service
        .create(
            &PostingId("post-acc-twice".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");

    service
        .accept(&postulation.id, None, &owner(), now())
        .expect("first accept");

    match service.accept(&postulation.id, None, &owner(), now()) {
        Err(PostulationServiceError::Lifecycle(LifecycleError::InvalidTransition {
            from, ..
        })) => assert_eq!(from, "accepted"),
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn reject_marks_responded_and_notifies_the_tutor() {
    let (service, _, notifier) = build_service(published_posting("reject"));
    let postulation = service
        .create(
            &PostingId("post-reject".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");

    let rejected = service
        .reject(&postulation.id, None, &owner(), now())
        .expect("owner rejects");

    assert_eq!(rejected.status, PostulationStatus::Rejected);
    assert_eq!(rejected.responded_at, Some(now()));

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "postulation_rejected");
}

#[test]
fn withdraw_is_tutor_only_and_terminal() {
    let (service, _, notifier) = build_service(published_posting("withdraw"));
    let postulation = service
        .create(
            &PostingId("post-withdraw".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");

    assert!(matches!(
        service.withdraw(&postulation.id, &tutor("tutor-luis")),
        Err(PostulationServiceError::Lifecycle(
            LifecycleError::Unauthorized { .. }
        ))
    ));
    assert!(matches!(
        service.withdraw(&postulation.id, &owner()),
        Err(PostulationServiceError::Lifecycle(
            LifecycleError::Unauthorized { .. }
        ))
    ));

    let withdrawn = service
        .withdraw(&postulation.id, &tutor("tutor-ana"))
        .expect("tutor withdraws");
    assert_eq!(withdrawn.status, PostulationStatus::Withdrawn);
    assert!(notifier.events().is_empty());

    assert!(matches!(
        service.withdraw(&postulation.id, &tutor("tutor-ana")),
        Err(PostulationServiceError::Lifecycle(
            LifecycleError::InvalidTransition { .. }
        ))
    ));
}

#[test]
fn withdraw_after_acceptance_is_rejected() {
    let (service, _, _) = build_service(published_posting("wd-acc"));
    let postulation = service
        .create(
            &PostingId("post-wd-acc".to_string()),
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("application");
    service
        .accept(&postulation.id, None, &owner(), now())
        .expect("accept");

    match service.withdraw(&postulation.id, &tutor("tutor-ana")) {
        Err(PostulationServiceError::Lifecycle(LifecycleError::InvalidTransition {
            from, ..
        })) => assert_eq!(from, "accepted"),
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn accepting_one_postulation_leaves_the_rest_pending() {
    let (service, _, _) = build_service(published_posting("fanout"));
    let posting_id = PostingId("post-fanout".to_string());

    let ana = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("ana applies");
    let luis = service
        .create(
            &posting_id,
            TutorId("tutor-luis".to_string()),
            details(),
            &tutor("tutor-luis"),
            now(),
        )
        .expect("luis applies");

    service.accept(&ana.id, None, &owner(), now()).expect("accept ana");

    let remaining = service
        .get(&luis.id)
        .expect("luis's postulation still there");
    assert_eq!(remaining.status, PostulationStatus::Pending);

    let all = service
        .list_for_posting(&posting_id)
        .expect("listing");
    let active: Vec<_> = all
        .iter()
        .filter(|postulation| postulation.status.is_active())
        .collect();
    assert_eq!(active.len(), 2, "acceptance does not cascade-reject");
}

#[test]
fn at_most_one_active_postulation_per_pair() {
    let (service, _, _) = build_service(published_posting("invariant"));
    let posting_id = PostingId("post-invariant".to_string());

    let first = service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("first");
    service
        .withdraw(&first.id, &tutor("tutor-ana"))
        .expect("withdraw");
    service
        .create(
            &posting_id,
            TutorId("tutor-ana".to_string()),
            details(),
            &tutor("tutor-ana"),
            now(),
        )
        .expect("second");

    let all = service.list_for_posting(&posting_id).expect("listing");
    let active_for_ana = all
        .iter()
        .filter(|postulation| {
            postulation.tutor_id == TutorId("tutor-ana".to_string())
                && postulation.status.is_active()
        })
        .count();
    assert_eq!(active_for_ana, 1);
}

#[test]
fn get_reports_missing_postulations() {
    let (service, _, _) = build_service(published_posting("miss"));

    match service.get(&PostulationId("postul-ghost".to_string())) {
        Err(PostulationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
