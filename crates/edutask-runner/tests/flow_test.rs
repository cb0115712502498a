/*
[INPUT]:  Mock compute service driving submit + poll flows
[OUTPUT]: Verified consumer view transitions
[POS]:    Integration tests - TaskFlow lifecycle
[UPDATE]: When flow lifecycle or view transitions change
*/

mod common;

use common::{
    EchoTask, TEST_INTERVAL, client_for, fast_policy, mount_ack, mount_always_pending, mount_result,
};
use edutask_adapter::{CancellationToken, QuizRequest};
use edutask_runner::{TaskFlow, TaskView, ViewPhase};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_for_phase(flow: &TaskFlow<EchoTask>, phase: ViewPhase) {
    let mut updates = flow.subscribe();
    timeout(WAIT, updates.wait_for(|view| view.phase() == phase))
        .await
        .expect("phase reached in time")
        .expect("flow alive");
}

#[tokio::test]
async fn test_immediate_result_completes() {
    let server = MockServer::start().await;
    mount_ack(&server, "now", "t-1").await;
    mount_result(&server, "t-1", json!({ "result": "R" })).await;

    let flow = TaskFlow::new(client_for(&server), fast_policy());
    let view = flow.run(&EchoTask::new("now")).await;

    assert_eq!(view, TaskView::Completed(json!({ "result": "R" })));
    assert_eq!(flow.view(), view);
}

#[tokio::test]
async fn test_processing_then_completed_after_one_interval() {
    let server = MockServer::start().await;
    mount_ack(&server, "later", "t-2").await;
    Mock::given(method("GET"))
        .and(path("/echo-result/t-2"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_result(&server, "t-2", json!({ "result": "R2" })).await;

    let flow = Arc::new(TaskFlow::new(client_for(&server), fast_policy()));
    let started = Instant::now();
    let runner = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.run(&EchoTask::new("later")).await })
    };

    wait_for_phase(&flow, ViewPhase::Processing).await;
    assert_eq!(
        flow.view(),
        TaskView::Processing {
            task_id: "t-2".to_string()
        }
    );

    let view = runner.await.expect("flow task");
    assert!(started.elapsed() >= TEST_INTERVAL);
    assert_eq!(view, TaskView::Completed(json!({ "result": "R2" })));
}

#[tokio::test]
async fn test_task_failure_surfaces_detail_verbatim() {
    let server = MockServer::start().await;
    mount_ack(&server, "broken", "t-3").await;
    Mock::given(method("GET"))
        .and(path("/echo-result/t-3"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "bad input" })))
        .mount(&server)
        .await;

    let flow = TaskFlow::new(client_for(&server), fast_policy());
    let view = flow.run(&EchoTask::new("broken")).await;

    assert_eq!(view, TaskView::Error("bad input".to_string()));
}

#[tokio::test]
async fn test_submission_failure_skips_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "detail": "overloaded" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/echo-result/.*$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let flow = TaskFlow::new(client_for(&server), fast_policy());
    let view = flow.run(&EchoTask::new("anything")).await;

    match view {
        TaskView::Error(message) => assert!(message.contains("overloaded"), "{message}"),
        other => panic!("expected error view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_subject_fails_without_submitting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-quiz"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let flow: TaskFlow<QuizRequest> = TaskFlow::new(client_for(&server), fast_policy());
    let view = flow.run(&QuizRequest::new(" ", None)).await;

    assert_eq!(view, TaskView::Error("Please select a subject".to_string()));
}

#[tokio::test]
async fn test_newer_submission_wins() {
    let server = MockServer::start().await;
    mount_ack(&server, "first", "old").await;
    mount_ack(&server, "second", "new").await;
    mount_always_pending(&server, "old").await;
    mount_result(&server, "new", json!({ "result": "fresh" })).await;

    let flow = Arc::new(TaskFlow::new(client_for(&server), fast_policy()));
    let first = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.run(&EchoTask::new("first")).await })
    };
    wait_for_phase(&flow, ViewPhase::Processing).await;

    let second = flow.run(&EchoTask::new("second")).await;
    assert_eq!(second, TaskView::Completed(json!({ "result": "fresh" })));

    let first = timeout(WAIT, first)
        .await
        .expect("superseded flow stops")
        .expect("flow task");
    assert_eq!(first.phase(), ViewPhase::Error);

    // Give the superseded loop time to misbehave if it were going to
    tokio::time::sleep(TEST_INTERVAL * 2).await;
    assert_eq!(flow.view(), second);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_leave_newest_flow_in_charge() {
    const RUNS: usize = 8;

    let server = MockServer::start().await;
    mount_ack(&server, "race", "t-race").await;
    mount_always_pending(&server, "t-race").await;

    let flow = Arc::new(TaskFlow::new(client_for(&server), fast_policy()));
    let barrier = Arc::new(tokio::sync::Barrier::new(RUNS));
    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel();
    for _ in 0..RUNS {
        let flow = flow.clone();
        let barrier = barrier.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            let view = flow.run(&EchoTask::new("race")).await;
            let _ = done_tx.send(view);
        });
    }
    drop(done_tx);

    // Every superseded flow stops; only the newest keeps polling
    for _ in 0..RUNS - 1 {
        let view = timeout(WAIT, done_rx.recv())
            .await
            .expect("superseded flow stops")
            .expect("flow task");
        assert_eq!(view.phase(), ViewPhase::Error);
    }
    wait_for_phase(&flow, ViewPhase::Processing).await;
    tokio::time::sleep(TEST_INTERVAL * 2).await;
    assert!(done_rx.try_recv().is_err());
    assert_eq!(
        flow.view(),
        TaskView::Processing {
            task_id: "t-race".to_string()
        }
    );

    flow.cancel().await;
    let last = timeout(WAIT, done_rx.recv())
        .await
        .expect("newest flow cancelled")
        .expect("flow task");
    assert_eq!(last.phase(), ViewPhase::Error);
    assert_eq!(flow.view(), last);
}

#[tokio::test]
async fn test_cancel_ends_in_error_without_more_queries() {
    let server = MockServer::start().await;
    mount_ack(&server, "slow", "t-5").await;
    mount_always_pending(&server, "t-5").await;

    let flow = Arc::new(TaskFlow::new(
        client_for(&server),
        edutask_adapter::PollPolicy::fixed(Duration::from_secs(30)),
    ));
    let runner = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.run(&EchoTask::new("slow")).await })
    };
    wait_for_phase(&flow, ViewPhase::Processing).await;

    flow.cancel().await;
    let view = timeout(WAIT, runner).await.expect("cancelled in time").expect("flow task");

    match &view {
        TaskView::Error(message) => assert!(message.contains("cancelled"), "{message}"),
        other => panic!("expected error view, got {other:?}"),
    }
    assert_eq!(flow.view(), view);

    let queries = server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|r| r.method.as_str() == "GET")
        .count();
    assert_eq!(queries, 1);
}

#[tokio::test]
async fn test_parent_shutdown_stops_flow() {
    let server = MockServer::start().await;
    mount_ack(&server, "slow", "t-6").await;
    mount_always_pending(&server, "t-6").await;

    let parent = CancellationToken::new();
    let flow = Arc::new(TaskFlow::with_shutdown(
        client_for(&server),
        fast_policy(),
        parent.clone(),
    ));
    let runner = {
        let flow = flow.clone();
        tokio::spawn(async move { flow.run(&EchoTask::new("slow")).await })
    };
    wait_for_phase(&flow, ViewPhase::Processing).await;

    parent.cancel();
    let view = timeout(WAIT, runner).await.expect("stopped in time").expect("flow task");
    assert_eq!(view.phase(), ViewPhase::Error);
}

#[tokio::test]
async fn test_attempt_budget_ends_in_error() {
    let server = MockServer::start().await;
    mount_ack(&server, "stuck", "t-7").await;
    mount_always_pending(&server, "t-7").await;

    let flow = TaskFlow::new(client_for(&server), fast_policy().with_max_attempts(2));
    let view = flow.run(&EchoTask::new("stuck")).await;

    match view {
        TaskView::Error(message) => assert!(message.contains("2 attempts"), "{message}"),
        other => panic!("expected error view, got {other:?}"),
    }
}
