use std::sync::Arc;
use std::time::Duration;

use attsweep_client::mock::{attachment, comment, MockClient};
use attsweep_core::{SelectionEntry, SelectionKey};
use attsweep_engine::{
    build_catalog, delete_selected, CancelToken, EngineConfig, EngineError, Session,
};

fn test_config() -> EngineConfig {
    EngineConfig {
        retry_delay: Duration::from_millis(1),
        ..EngineConfig::default()
    }
}

/// Two issues with attachments, one without. DEMO-1 carries a direct
/// file and a comment file, DEMO-2 a single file of unknown size.
fn demo_tracker() -> MockClient {
    MockClient::new()
        .with_project(100, "DEMO", "Demo project")
        .with_issue(1, "DEMO-1", "First issue")
        .with_issue(2, "DEMO-2", "Second issue")
        .with_issue(3, "DEMO-3", "Bare issue")
        .with_attachment(1, attachment(10, "screenshot.png", Some(1024)))
        .with_comment(
            1,
            comment(
                50,
                "Attaching the log file for reference, it is quite long indeed",
                vec![attachment(11, "server.log", Some(2_097_152))],
            ),
        )
        .with_comment(2, comment(60, "", vec![attachment(20, "mystery.bin", None)]))
}

#[tokio::test]
async fn catalog_merges_direct_and_comment_attachments() {
    let client = Arc::new(demo_tracker());
    let cancel = CancelToken::new();
    let catalog = build_catalog(client, 100, None, &test_config(), &cancel)
        .await
        .unwrap();

    let keys: Vec<&str> = catalog.iter().map(|i| i.issue_key.as_str()).collect();
    assert_eq!(keys, vec!["DEMO-1", "DEMO-2"]);

    let first = &catalog[0];
    assert_eq!(first.attachments.len(), 2);
    assert_eq!(first.attachments[0].name, "screenshot.png");
    assert!(!first.attachments[0].is_comment_attachment);
    assert_eq!(first.attachments[1].name, "server.log");
    assert!(first.attachments[1].is_comment_attachment);
    assert_eq!(first.attachments[1].comment_id, Some(50));

    // First 50 chars of the comment body, then the ellipsis marker.
    let excerpt = first.attachments[1].comment_excerpt.as_deref().unwrap();
    assert_eq!(
        excerpt,
        "Attaching the log file for reference, it is quite ..."
    );
}

#[tokio::test]
async fn comment_attachments_follow_comment_chronology() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "ordering")
            .with_comment(1, comment(9, "later", vec![attachment(31, "b.txt", Some(1))]))
            .with_comment(1, comment(2, "earlier", vec![attachment(30, "a.txt", Some(1))])),
    );
    let cancel = CancelToken::new();
    let catalog = build_catalog(client, 100, None, &test_config(), &cancel)
        .await
        .unwrap();

    let names: Vec<&str> = catalog[0]
        .attachments
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn key_range_filter_is_inclusive() {
    let client = Arc::new(demo_tracker());
    let cancel = CancelToken::new();
    let catalog = build_catalog(
        client,
        100,
        Some(("DEMO-2", "DEMO-3")),
        &test_config(),
        &cancel,
    )
    .await
    .unwrap();

    let keys: Vec<&str> = catalog.iter().map(|i| i.issue_key.as_str()).collect();
    assert_eq!(keys, vec!["DEMO-2"]);
}

#[tokio::test]
async fn one_sided_range_scans_the_whole_project() {
    let client = Arc::new(demo_tracker());
    let cancel = CancelToken::new();
    let catalog = build_catalog(
        client,
        100,
        Some(("DEMO-2", "")),
        &test_config(),
        &cancel,
    )
    .await
    .unwrap();

    assert_eq!(catalog.len(), 2);
}

#[tokio::test]
async fn single_fetch_failure_aborts_the_build() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "ok")
            .with_issue(2, "DEMO-2", "broken")
            .with_attachment(1, attachment(10, "a.png", Some(1)))
            .with_fail_attachments(2),
    );
    let cancel = CancelToken::new();
    let err = build_catalog(client, 100, None, &test_config(), &cancel)
        .await
        .unwrap_err();

    match err {
        EngineError::Remote { issue_key, .. } => assert_eq!(issue_key, "DEMO-2"),
        other => panic!("expected remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_build_makes_no_network_calls() {
    let client = Arc::new(demo_tracker());
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = build_catalog(client.clone(), 100, None, &test_config(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Cancelled));
    assert_eq!(client.list_issue_calls(), 0);
}

#[tokio::test]
async fn session_search_computes_stats() {
    let client = Arc::new(demo_tracker());
    let mut session = Session::new(client, test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();

    let stats = session.stats();
    assert_eq!(stats.total_issues, 2);
    assert_eq!(stats.total_attachments, 3);
    assert_eq!(stats.total_size, 1024 + 2_097_152);
    assert_eq!(stats.selected_count, 0);
}

#[tokio::test]
async fn toggling_unknown_attachment_is_rejected() {
    let client = Arc::new(demo_tracker());
    let mut session = Session::new(client, test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();

    let err = session.toggle(SelectionKey::new(1, 999)).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn sweep_isolates_failures_and_refreshes_once() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "first")
            .with_issue(2, "DEMO-2", "second")
            .with_attachment(1, attachment(10, "keep-failing.png", Some(10)))
            .with_attachment(1, attachment(11, "ok-one.png", Some(20)))
            .with_attachment(2, attachment(20, "ok-two.png", Some(30)))
            .with_fail_delete(10),
    );
    let mut session = Session::new(client.clone(), test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();
    session.toggle_all();
    assert_eq!(session.stats().selected_count, 3);

    let outcome = session.sweep(&CancelToken::new()).await.unwrap();

    let successes: Vec<bool> = outcome.report.results.iter().map(|r| r.success).collect();
    assert_eq!(successes, vec![false, true, true]);
    assert_eq!(outcome.report.success_count(), 2);
    assert_eq!(outcome.report.failure_count(), 1);
    assert!(outcome.refresh_error.is_none());

    // Selection is cleared even though one delete failed.
    assert!(session.selection().is_empty());
    assert_eq!(session.stats().selected_count, 0);

    // One refresh after the batch: initial search plus exactly one more
    // issue listing.
    assert_eq!(client.list_issue_calls(), 2);

    // The survivor is the attachment whose delete failed.
    assert_eq!(session.catalog().len(), 1);
    assert_eq!(session.catalog()[0].attachments.len(), 1);
    assert_eq!(session.catalog()[0].attachments[0].name, "keep-failing.png");
}

#[tokio::test]
async fn comment_attachment_delete_routes_through_comment() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "first")
            .with_comment(
                1,
                comment(50, "see attached", vec![attachment(11, "note.txt", Some(5))]),
            ),
    );
    let mut session = Session::new(client.clone(), test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();
    session.toggle(SelectionKey::new(1, 11)).unwrap();

    let outcome = session.sweep(&CancelToken::new()).await.unwrap();
    assert!(outcome.report.all_succeeded());

    // Fixture mutated through the comment route: refresh finds nothing.
    assert!(session.catalog().is_empty());
}

#[tokio::test]
async fn rate_limited_delete_is_retried() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "first")
            .with_attachment(1, attachment(10, "slow.png", Some(10)))
            .with_rate_limited_delete(10, 1),
    );
    let mut session = Session::new(client.clone(), test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();
    session.toggle(SelectionKey::new(1, 10)).unwrap();

    let outcome = session.sweep(&CancelToken::new()).await.unwrap();
    assert!(outcome.report.all_succeeded());
    assert_eq!(client.delete_calls(), 2);
}

#[tokio::test]
async fn exhausted_retries_fail_the_entry() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "first")
            .with_attachment(1, attachment(10, "stuck.png", Some(10)))
            .with_rate_limited_delete(10, 5),
    );
    let mut session = Session::new(client.clone(), test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();
    session.toggle(SelectionKey::new(1, 10)).unwrap();

    let outcome = session.sweep(&CancelToken::new()).await.unwrap();
    assert_eq!(outcome.report.failure_count(), 1);
    // Initial attempt plus the configured single retry.
    assert_eq!(client.delete_calls(), 2);
}

#[tokio::test]
async fn cancelled_batch_still_yields_one_result_per_entry() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "first")
            .with_attachment(1, attachment(10, "a.png", Some(1)))
            .with_attachment(1, attachment(11, "b.png", Some(1))),
    );
    let entries: Vec<SelectionEntry> = [10, 11]
        .iter()
        .map(|&id| SelectionEntry {
            key: SelectionKey::new(1, id),
            issue_key: "DEMO-1".into(),
            file_name: format!("{id}.png"),
            is_comment_attachment: false,
            comment_id: None,
        })
        .collect();
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = delete_selected(client.clone(), entries, &test_config(), &cancel)
        .await
        .unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.failure_count(), 2);
    for result in &report.results {
        assert_eq!(result.error.as_deref(), Some("cancelled before dispatch"));
    }
    assert_eq!(client.delete_calls(), 0);
}

#[tokio::test]
async fn sweeping_an_empty_selection_is_rejected() {
    let client = Arc::new(demo_tracker());
    let mut session = Session::new(client, test_config());
    session.search(100, None, &CancelToken::new()).await.unwrap();

    let err = session.sweep(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn failed_search_leaves_the_session_empty() {
    let client = Arc::new(
        MockClient::new()
            .with_issue(1, "DEMO-1", "ok")
            .with_issue(2, "DEMO-2", "broken")
            .with_attachment(1, attachment(10, "a.png", Some(1)))
            .with_fail_attachments(2),
    );
    let mut session = Session::new(client, test_config());

    // A narrow search avoids the broken issue.
    session
        .search(100, Some(("DEMO-1", "DEMO-1")), &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(session.catalog().len(), 1);

    // Widening the search hits the broken issue and fails; the stale
    // catalog must not survive.
    let err = session.search(100, None, &CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, EngineError::Remote { .. }));
    assert!(session.catalog().is_empty());
    assert_eq!(session.stats().total_attachments, 0);
}
