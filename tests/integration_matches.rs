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
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_list_and_get_match() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let match_id = app.create_match(&alice, &bob).await;

    let (status, body) = app.get("/matches", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Matches fetched");
    assert_eq!(body["data"]["count"], 1);
    let overview = &body["data"]["matches"][0];
    assert_eq!(overview["matchId"], match_id.to_string());
    assert_eq!(overview["user"]["id"], bob.id.to_string());
    assert!(overview["lastMessage"].is_null());

    let (status, body) = app.get(&format!("/matches/{match_id}"), &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], alice.id.to_string());
}

#[tokio::test]
async fn test_get_match_access_rules() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let eve = app.create_user("eve").await;
    let match_id = app.create_match(&alice, &bob).await;

    let (status, body) = app.get(&format!("/matches/{match_id}"), &eve).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, body) = app.get(&format!("/matches/{}", Uuid::new_v4()), &alice).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Match not found");

    let (status, _) = app.get("/matches/not-a-uuid", &alice).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unmatch_hides_match_and_closes_chat() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let match_id = app.create_match(&alice, &bob).await;
    app.send_message(match_id, &alice, "hello").await;

    let (status, body) = app.delete(&format!("/matches/{match_id}"), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Unmatched successfully");
    assert_eq!(body["data"], json!({}));

    let (_, body) = app.get("/matches", &bob).await;
    assert_eq!(body["data"]["count"], 0);

    let (_, body) = app.get(&format!("/matches/check/{}", bob.id), &alice).await;
    assert_eq!(body["data"]["isMatched"], false);
    assert!(body["data"]["matchId"].is_null());

    let (status, body) = app.get(&format!("/chat/{match_id}/messages"), &bob).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "This match is no longer active");

    // Messages survive deactivation.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE match_id = $1")
        .bind(match_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // Unmatching twice is harmless.
    let (status, _) = app.delete(&format!("/matches/{match_id}"), &bob).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_check_match() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let carol = app.create_user("carol").await;
    let match_id = app.create_match(&alice, &bob).await;

    let (status, body) = app.get(&format!("/matches/check/{}", bob.id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isMatched"], true);
    assert_eq!(body["data"]["matchId"], match_id.to_string());

    let (_, body) = app.get(&format!("/matches/check/{}", carol.id), &alice).await;
    assert_eq!(body["data"]["isMatched"], false);
}

#[tokio::test]
async fn test_block_deactivates_match() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let match_id = app.create_match(&alice, &bob).await;

    let (status, body) = app.post(&format!("/blocks/{}", bob.id), &alice, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User blocked");

    let (_, body) = app.get(&format!("/matches/check/{}", alice.id), &bob).await;
    assert_eq!(body["data"]["isMatched"], false);

    let (status, body) = app.send_message_raw(match_id, &bob, "still there?").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "This match is no longer active");

    let (status, body) = app.send_message_raw(match_id, &alice, "one last thing").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "This match is no longer active");

    let (_, body) = app.get("/blocks", &alice).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["blockedUsers"][0]["id"], bob.id.to_string());

    // Unblocking does not bring the match back.
    let (status, _) = app.delete(&format!("/blocks/{}", bob.id), &alice).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get(&format!("/matches/check/{}", bob.id), &alice).await;
    assert_eq!(body["data"]["isMatched"], false);
    let (_, body) = app.get("/blocks", &alice).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_block_validation() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let (status, body) = app.post(&format!("/blocks/{}", alice.id), &alice, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot block yourself");

    let (status, _) = app.post(&format!("/blocks/{}", Uuid::new_v4()), &alice, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rematch_after_unmatch_creates_new_match() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let first = app.create_match(&alice, &bob).await;

    app.delete(&format!("/matches/{first}"), &alice).await;

    // Swipes are permanent, so a fresh pair of likes is simulated at the store level.
    sqlx::query("DELETE FROM swipes WHERE swiper_id = ANY($1)")
        .bind(vec![alice.id, bob.id])
        .execute(&app.pool)
        .await
        .unwrap();

    let second = app.create_match(&alice, &bob).await;
    assert_ne!(first, second);

    let (_, body) = app.get(&format!("/matches/check/{}", bob.id), &alice).await;
    assert_eq!(body["data"]["matchId"], second.to_string());
}
