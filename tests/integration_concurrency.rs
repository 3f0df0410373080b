#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    missing_debug_implementations,
    clippy::clone_on_ref_ptr,
    clippy::items_after_statements,
    unreachable_pub,
    clippy::print_stdout,
    clippy::similar_names
)]
mod common;

use common::TestApp;
use reqwest::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn test_concurrent_reciprocal_likes_create_one_match() {
    let app = Arc::new(TestApp::spawn().await);

    for _ in 0..10 {
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;

        let (a, b) = tokio::join!(app.swipe(&alice, &bob, "like"), app.swipe(&bob, &alice, "like"));
        assert!(a.0 == StatusCode::OK || a.0 == StatusCode::CREATED);
        assert!(b.0 == StatusCode::OK || b.0 == StatusCode::CREATED);

        // At least one side observes the match, and only one side created it.
        let matched = [&a.1, &b.1].iter().filter(|body| body["data"]["matched"] == true).count();
        assert!(matched >= 1, "neither swipe reported a match: {a:?} {b:?}");
        let created = [a.0, b.0].iter().filter(|s| **s == StatusCode::CREATED).count();
        assert_eq!(created, 1);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM matches WHERE is_active AND LEAST(user_a, user_b) = LEAST($1::uuid, $2::uuid) \
             AND GREATEST(user_a, user_b) = GREATEST($1::uuid, $2::uuid)",
        )
        .bind(alice.id)
        .bind(bob.id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}

#[tokio::test]
async fn test_concurrent_sends_keep_last_message_consistent() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let match_id = app.create_match(&alice, &bob).await;

    let sends = (0..10).map(|i| {
        let sender = if i % 2 == 0 { &alice } else { &bob };
        let app = &app;
        async move {
            let content = format!("msg {i}");
            app.send_message_raw(match_id, sender, &content).await
        }
    });
    for (status, _) in futures::future::join_all(sends).await {
        assert_eq!(status, StatusCode::CREATED);
    }

    let (last_id, newest_id): (Option<uuid::Uuid>, uuid::Uuid) = sqlx::query_as(
        "SELECT m.last_message_id, \
         (SELECT id FROM messages WHERE match_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1) \
         FROM matches m WHERE m.id = $1",
    )
    .bind(match_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(last_id, Some(newest_id));
}
