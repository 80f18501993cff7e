//! End-to-end mission scenarios against a scripted transport

use std::time::Duration;

use mystool::mission::actions::POST_NOT_FOUND;
use mystool::testing::{
    fixtures, test_account, test_config, test_engine, test_engine_with, MockTransport,
};
use mystool::{cancel_pair, ActionOutcome, CancelSignal, Game, MissionError, MissionKey};

#[tokio::test]
async fn test_sign_returns_points_with_single_request() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::sign_points(100));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(runner.sign(Game::Ys).await, Ok(100));
    assert_eq!(transport.request_count(), 1);

    let request = &transport.requests()[0];
    assert!(request.url.ends_with("/apihub/app/api/signIn"));
    assert!(request.header("DS").is_some());
}

#[tokio::test]
async fn test_like_exhausts_after_two_candidates() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("11", 0), ("12", 0), ("13", 1)]));
    transport.push_ok(fixtures::message("OK"));
    transport.push_ok(fixtures::message("OK"));
    transport.push_ok(fixtures::post_list(&[("11", 1), ("12", 1), ("13", 1)]));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(
        runner.like(Game::Ys, 3).await,
        Err(MissionError::Exhausted {
            completed: 2,
            target: 3
        })
    );
    assert_eq!(transport.count_path("upvotePost"), 2);
    assert_eq!(transport.count_path("getForumPostList"), 2);
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn test_status_fails_when_state_fetch_keeps_failing() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::missions(&[(MissionKey::SIGN, 1)]));
    for _ in 0..3 {
        transport.push_transport_error("operation timed out");
    }
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    match runner.get_missions_with_progress().await {
        Err(MissionError::RetriesExhausted {
            attempts,
            last_error,
            ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("timed out"));
        }
        other => panic!("unexpected result: {other:?}"),
    }

    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls.len(), 4);
    assert!(urls[0].contains("getMissions?"));
    assert!(urls[1..].iter().all(|url| url.contains("getUserMissionsState")));
}

#[tokio::test]
async fn test_transport_failure_is_retried_with_fresh_signature() {
    let transport = MockTransport::new();
    transport.push_transport_error("connection reset");
    transport.push_ok(fixtures::sign_points(7));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(runner.sign(Game::Bh3).await, Ok(7));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_ne!(requests[0].header("DS"), requests[1].header("DS"));
}

#[tokio::test]
async fn test_read_completes_across_refetch() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("1", 0), ("2", 0)]));
    transport.push_ok(fixtures::post_full(true));
    transport.push_ok(fixtures::message(POST_NOT_FOUND));
    transport.push_ok(fixtures::post_list(&[("3", 0)]));
    transport.push_ok(fixtures::post_full(true));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(runner.read(Game::Wd, 2).await, Ok(2));
    assert_eq!(transport.count_path("getPostFull"), 3);
    assert!(transport.requests()[0].url.contains("forum_id=37"));
}

#[tokio::test]
async fn test_malformed_read_is_not_retried() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("1", 0)]));
    transport.push_ok(fixtures::post_full(false));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    match runner.read(Game::Ys, 1).await {
        Err(MissionError::MalformedResponse { context, body, .. }) => {
            assert_eq!(context, "read");
            assert!(body.contains("\"post\""));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_run_pending_runs_unfinished_missions_in_order() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::missions(&[
        (MissionKey::SIGN, 1),
        (MissionKey::LIKE, 2),
        ("daily_lottery", 1),
        (MissionKey::SHARE, 1),
    ]));
    transport.push_ok(fixtures::mission_states(
        120,
        &[(MissionKey::SIGN, 1), (MissionKey::LIKE, 1)],
    ));
    // like: one remaining
    transport.push_ok(fixtures::post_list(&[("5", 0)]));
    transport.push_ok(fixtures::message("OK"));
    // share
    transport.push_ok(fixtures::post_list(&[("6", 0)]));
    transport.push_ok(fixtures::message("OK"));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    let runs = runner.run_pending(Game::Ys).await.unwrap();
    let keys: Vec<&MissionKey> = runs.iter().map(|run| &run.key).collect();
    assert_eq!(keys, vec![&MissionKey::Like, &MissionKey::Share]);
    assert_eq!(
        runs[0].result,
        Ok(ActionOutcome::Completed { interactions: 1 })
    );
    assert_eq!(
        runs[1].result,
        Ok(ActionOutcome::Completed { interactions: 1 })
    );
    assert_eq!(transport.remaining(), 0);
}

#[tokio::test]
async fn test_run_pending_stops_on_expired_session() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::missions(&[
        (MissionKey::SIGN, 1),
        (MissionKey::READ, 3),
    ]));
    transport.push_ok(fixtures::mission_states(0, &[]));
    transport.push_ok(fixtures::auth_expired());
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    let runs = runner.run_pending(Game::Ys).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].key, MissionKey::Sign);
    assert_eq!(runs[0].result, Err(MissionError::AuthExpired));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_cancellation_stops_between_posts() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("1", 0), ("2", 0), ("3", 0)]));
    transport.push_ok(fixtures::message("OK"));
    transport.push_ok(fixtures::message("OK"));
    let mut config = test_config();
    config.pacing_delay = Duration::from_secs(30);
    let engine = test_engine_with(transport.clone(), config);
    let account = test_account();

    let (handle, signal) = cancel_pair();
    let runner = engine.runner(&account, signal);
    let like = runner.like(Game::Ys, 3);
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    };
    let (result, _) = tokio::join!(like, cancel);

    assert_eq!(result, Err(MissionError::Cancelled));
    assert_eq!(transport.count_path("upvotePost"), 1);
}

#[tokio::test]
async fn test_accounts_run_concurrently_on_shared_engine() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::sign_points(1));
    transport.push_ok(fixtures::sign_points(1));
    let engine = test_engine(transport.clone());

    let first = test_account();
    let mut second = test_account();
    second.device_id = "second-device".to_string();

    let runner_a = engine.runner(&first, CancelSignal::never());
    let runner_b = engine.runner(&second, CancelSignal::never());
    let (a, b) = tokio::join!(runner_a.sign(Game::Ys), runner_b.sign(Game::Ys));

    assert_eq!(a, Ok(1));
    assert_eq!(b, Ok(1));
    let devices: Vec<String> = transport
        .requests()
        .iter()
        .filter_map(|r| r.header("x-rpc-device_id").map(str::to_string))
        .collect();
    assert!(devices.contains(&"test-device".to_string()));
    assert!(devices.contains(&"second-device".to_string()));
}

#[tokio::test]
async fn test_like_with_retries_disabled_makes_single_attempt() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("1", 0)]));
    transport.push_transport_error("connection reset");
    transport.push_ok(fixtures::message("OK"));
    let mut config = test_config();
    config.retry.enabled = false;
    let engine = test_engine_with(transport.clone(), config);
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    match runner.like(Game::Ys, 1).await {
        Err(MissionError::RetriesExhausted {
            context, attempts, ..
        }) => {
            assert_eq!(context, "like");
            assert_eq!(attempts, 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(transport.count_path("upvotePost"), 1);
    assert_eq!(transport.remaining(), 1);
}

#[tokio::test]
async fn test_like_retries_upvote_with_fresh_signature() {
    let transport = MockTransport::new();
    transport.push_ok(fixtures::post_list(&[("1", 0)]));
    transport.push_transport_error("connection reset");
    transport.push_ok(fixtures::message("OK"));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(runner.like(Game::Ys, 1).await, Ok(1));

    let upvotes: Vec<_> = transport
        .requests()
        .into_iter()
        .filter(|r| r.url.contains("upvotePost"))
        .collect();
    assert_eq!(upvotes.len(), 2);
    assert!(upvotes[0].header("DS").is_some());
    assert_ne!(upvotes[0].header("DS"), upvotes[1].header("DS"));
}

#[tokio::test]
async fn test_read_retries_post_list_and_post_fetch() {
    let transport = MockTransport::new();
    transport.push_transport_error("operation timed out");
    transport.push_ok(fixtures::post_list(&[("1", 0)]));
    transport.push_transport_error("connection reset");
    transport.push_ok(fixtures::post_full(true));
    let engine = test_engine(transport.clone());
    let account = test_account();
    let runner = engine.runner(&account, CancelSignal::never());

    assert_eq!(runner.read(Game::Ys, 1).await, Ok(1));
    assert_eq!(transport.count_path("getForumPostList"), 2);
    assert_eq!(transport.count_path("getPostFull"), 2);
    assert_eq!(transport.remaining(), 0);

    let requests = transport.requests();
    assert_ne!(requests[0].header("DS"), requests[1].header("DS"));
    assert_ne!(requests[2].header("DS"), requests[3].header("DS"));
}
