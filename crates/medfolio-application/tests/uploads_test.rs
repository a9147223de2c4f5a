mod support;

use std::sync::Arc;

use medfolio_application::views::{RowAction, UploadsList, ViewOutcome};
use medfolio_application::{AppRouter, NotificationLevel};
use medfolio_core::api::ApiError;
use medfolio_core::file::{Extraction, FileStatus, MedicationDetail};
use medfolio_core::profile::ProfileField;
use medfolio_core::{MedfolioError, View};
use support::{MemoryStateRepository, MockBackend};

const TOKEN: &str = "tok";

fn backend() -> Arc<MockBackend> {
    MockBackend::with_user("asha@example.com", "s3cret", TOKEN)
}

async fn loaded(backend: &MockBackend) -> UploadsList {
    let list = UploadsList::new();
    list.refresh(backend, TOKEN).await.unwrap();
    list
}

async fn wait_until_busy(list: &UploadsList, ids: &[&str]) {
    for _ in 0..100 {
        let mut all = true;
        for id in ids {
            all &= list.row(id).await.and_then(|row| row.busy).is_some();
        }
        if all {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("rows never became busy");
}

#[tokio::test]
async fn test_accepted_row_offers_no_review_or_retry() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Accepted);
    backend.add_file("f2", "labs.png", FileStatus::AwaitingReview);
    let list = loaded(&backend).await;

    let accepted = list.row("f1").await.unwrap();
    assert!(!accepted.can_review());
    assert!(!accepted.can_accept());
    assert!(!accepted.can_retry());
    assert!(accepted.can_delete());

    let pending = list.row("f2").await.unwrap();
    assert!(pending.can_review());
    assert!(pending.can_retry());

    backend.clear_calls();
    assert!(matches!(
        list.retry(backend.as_ref(), TOKEN, "f1").await,
        Err(MedfolioError::InvalidInput(_))
    ));
    assert!(list.review(backend.as_ref(), TOKEN, "f1").await.is_err());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_review_then_accept_sends_edited_payload() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::AwaitingReview);
    let mut extraction = Extraction {
        medicines: vec!["Metformin".into()],
        ..Extraction::default()
    };
    extraction.profile.set(ProfileField::MedicationsCurrent, "Metformin 500 mg");
    backend.set_extraction("f1", extraction.clone());
    let list = loaded(&backend).await;

    let loaded_review = list.review(backend.as_ref(), TOKEN, "f1").await.unwrap();
    assert_eq!(loaded_review, extraction);
    assert!(list.row("f1").await.unwrap().is_reviewing());

    let mut edited = extraction.clone();
    edited.medications_details.push(MedicationDetail {
        name: "Metformin".into(),
        dose: Some("500 mg".into()),
        frequency: Some("twice daily".into()),
    });
    list.edit_review("f1", edited.clone()).await.unwrap();

    let outcome = list.accept(backend.as_ref(), TOKEN, "f1").await.unwrap();
    assert_eq!(outcome, ViewOutcome::FilesChanged);
    assert_eq!(
        backend.accepted_payloads(),
        vec![("f1".to_string(), Some(edited))]
    );

    let row = list.row("f1").await.unwrap();
    assert_eq!(row.file.status, FileStatus::Accepted);
    assert!(!row.is_reviewing());
    assert!(!row.can_review());
}

#[tokio::test]
async fn test_closing_review_returns_row_to_pending() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::AwaitingReview);
    backend.set_extraction("f1", Extraction::default());
    let list = loaded(&backend).await;

    list.review(backend.as_ref(), TOKEN, "f1").await.unwrap();
    list.close_review("f1").await;
    let row = list.row("f1").await.unwrap();
    assert!(!row.is_reviewing());
    assert_eq!(row.file.status, FileStatus::AwaitingReview);
}

#[tokio::test]
async fn test_delete_needs_confirmation() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Uploaded);
    let list = loaded(&backend).await;
    backend.clear_calls();

    let declined = list.delete(backend.as_ref(), TOKEN, "f1", false).await;
    assert!(matches!(declined, Err(MedfolioError::Cancelled)));
    assert!(backend.calls().is_empty());
    assert_eq!(list.len().await, 1);
}

#[tokio::test]
async fn test_deleted_row_stays_gone_after_refresh() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Uploaded);
    backend.add_file("f2", "labs.png", FileStatus::Uploaded);
    let list = loaded(&backend).await;

    let outcome = list.delete(backend.as_ref(), TOKEN, "f1", true).await.unwrap();
    assert_eq!(outcome, ViewOutcome::FilesChanged);
    assert!(list.row("f1").await.is_none());

    list.refresh(backend.as_ref(), TOKEN).await.unwrap();
    let ids: Vec<String> = list.rows().await.into_iter().map(|row| row.file.id).collect();
    assert_eq!(ids, vec!["f2".to_string()]);
}

#[tokio::test]
async fn test_lagging_listing_does_not_resurrect_deleted_row() {
    let backend = backend();
    backend.set_ghost_deletes(true);
    backend.add_file("f1", "rx.pdf", FileStatus::Uploaded);
    let list = loaded(&backend).await;

    list.delete(backend.as_ref(), TOKEN, "f1", true).await.unwrap();
    list.refresh(backend.as_ref(), TOKEN).await.unwrap();
    assert!(list.is_empty().await);
}

#[tokio::test]
async fn test_retry_cooldown_message_is_verbatim() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Failed);
    backend.fail_retry(
        ApiError::status(429, "Retry available in 45 seconds").with_cooldown(Some(45)),
    );
    let list = loaded(&backend).await;

    let err = list.retry(backend.as_ref(), TOKEN, "f1").await.unwrap_err();
    assert_eq!(err.user_message(), "Retry available in 45 seconds");
    assert_eq!(err.cooldown_seconds(), Some(45));

    let row = list.row("f1").await.unwrap();
    assert_eq!(row.busy, None);
    assert_eq!(row.file.status, FileStatus::Failed);
}

#[tokio::test]
async fn test_busy_row_rejects_second_action_without_request() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Failed);
    backend.add_file("f2", "labs.png", FileStatus::Failed);
    let list = loaded(&backend).await;
    let gate = backend.gate_retry();
    backend.clear_calls();

    let first = list.retry(backend.as_ref(), TOKEN, "f1");
    let other = list.retry(backend.as_ref(), TOKEN, "f2");
    let probe = async {
        wait_until_busy(&list, &["f1", "f2"]).await;
        assert_eq!(list.row("f1").await.unwrap().busy, Some(RowAction::Retrying));

        let again = list.retry(backend.as_ref(), TOKEN, "f1").await;
        assert!(matches!(again, Err(MedfolioError::Busy(_))));
        let delete = list.delete(backend.as_ref(), TOKEN, "f1", true).await;
        assert!(matches!(delete, Err(MedfolioError::Busy(_))));
        assert_eq!(backend.count("retry_extraction"), 2);
        assert_eq!(backend.count("delete_file"), 0);

        gate.add_permits(2);
    };

    let (first, other, ()) = tokio::join!(first, other, probe);
    assert_eq!(first.unwrap().status, FileStatus::Processing);
    assert_eq!(other.unwrap().status, FileStatus::Processing);
    assert!(list.row("f1").await.unwrap().busy.is_none());
    assert!(list.row("f2").await.unwrap().busy.is_none());
}

#[tokio::test]
async fn test_refresh_after_leaving_view_is_discarded() {
    let backend = backend();
    let list = loaded(&backend).await;
    backend.add_file("f1", "rx.pdf", FileStatus::Uploaded);
    let gate = backend.gate_files();

    let refresh = list.refresh(backend.as_ref(), TOKEN);
    let leave = async {
        tokio::task::yield_now().await;
        list.unmount();
        gate.add_permits(1);
    };
    let (result, ()) = tokio::join!(refresh, leave);

    result.unwrap();
    assert!(list.is_empty().await);
}

#[tokio::test]
async fn test_router_refreshes_files_after_accept() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::AwaitingReview);
    let mut router = AppRouter::new(backend.clone(), MemoryStateRepository::new());
    router.login("asha@example.com", "s3cret").await.unwrap();
    router.navigate(View::Uploads).await;
    router.drain_notifications();
    backend.clear_calls();

    router.accept("f1").await.unwrap();
    assert_eq!(
        backend.ops(),
        vec!["accept_extraction", "get_files", "get_schedule"]
    );
    let notes = router.drain_notifications();
    assert_eq!(notes[0].level, NotificationLevel::Success);
}

#[tokio::test]
async fn test_router_notifies_row_errors() {
    let backend = backend();
    backend.add_file("f1", "rx.pdf", FileStatus::Accepted);
    let mut router = AppRouter::new(backend.clone(), MemoryStateRepository::new());
    router.login("asha@example.com", "s3cret").await.unwrap();
    router.drain_notifications();

    assert!(router.retry("f1").await.is_err());
    let notes = router.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(router.current_view(), View::Home);

    assert!(router.delete("f1", false).await.is_err());
    assert!(router.drain_notifications().is_empty());
}
