//! End-to-end API tests: auth, auction CRUD, manual and voice bidding.

mod app;

use app::TestApp;
use axum_test::TestServer;
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;
use vbid_axum::{config::AxumConfig, router};
use vbid_sqlite::{Db, config::SqliteConfig, types::DateTime};

async fn spawn_server() -> (TestServer, TempDir) {
    let dir = tempfile::tempdir().expect("create tempdir");
    let config = SqliteConfig {
        database_path: Some(dir.path().join("api.db")),
        create_if_missing: true,
    };
    let db = Db::open(&config).await.expect("open database");
    let (router, _) = router(TestApp::new(db), AxumConfig::default());
    (TestServer::new(router).expect("start test server"), dir)
}

fn bearer() -> String {
    Uuid::new_v4().to_string()
}

fn deadline_in_minutes(minutes: i64) -> Value {
    let deadline: DateTime =
        (time::OffsetDateTime::now_utc() + time::Duration::minutes(minutes)).into();
    serde_json::to_value(deadline).expect("serialize deadline")
}

async fn create_auction(server: &TestServer, token: &str, base_price: f64) -> String {
    let response = server
        .post("/auction")
        .authorization_bearer(token)
        .json(&json!({
            "title": "Vintage Leather Watch",
            "description": "Hand-wound, original strap",
            "base_price": base_price,
            "deadline": deadline_in_minutes(60),
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .expect("auction id")
        .to_owned()
}

#[tokio::test]
async fn health_is_open() {
    let (server, _dir) = spawn_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() {
    let (server, _dir) = spawn_server().await;

    for path in ["/auction", "/profile"] {
        let response = server.get(path).authorization_bearer("not-a-bidder").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    // well-formed bodies, bad identity
    let response = server
        .post("/auction")
        .authorization_bearer("not-a-bidder")
        .json(&json!({
            "title": "nope",
            "base_price": 1.0,
            "deadline": deadline_in_minutes(10),
        }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

    let response = server
        .post("/profile")
        .authorization_bearer("not-a-bidder")
        .json(&json!({ "username": "nope" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auction_crud_round_trips() {
    let (server, _dir) = spawn_server().await;
    let token = bearer();

    let auction_id = create_auction(&server, &token, 100.0).await;

    let fetched = server
        .get(&format!("/auction/{auction_id}"))
        .authorization_bearer(&token)
        .await;
    fetched.assert_status_ok();
    let fetched: Value = fetched.json();
    assert_eq!(fetched["title"], "Vintage Leather Watch");
    assert_eq!(fetched["status"], "active");
    assert_eq!(fetched["bid_count"], 0);
    assert!(fetched.get("current_bid").is_none());

    let listed = server.get("/auction").authorization_bearer(&token).await;
    listed.assert_status_ok();
    let listed: Value = listed.json();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let missing = server
        .get(&format!("/auction/{}", Uuid::new_v4()))
        .authorization_bearer(&token)
        .await;
    missing.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_bids_enforce_the_baseline() {
    let (server, _dir) = spawn_server().await;
    let seller = bearer();
    let bidder = bearer();
    let auction_id = create_auction(&server, &seller, 100.0).await;

    let response = server
        .post(&format!("/auction/{auction_id}/bids"))
        .authorization_bearer(&bidder)
        .json(&json!({ "amount": 100.0 }))
        .await;
    response.assert_status_ok();
    let refused: Value = response.json();
    assert_eq!(refused["outcome"], "too_low");
    assert_eq!(refused["baseline"], 100.0);

    let response = server
        .post(&format!("/auction/{auction_id}/bids"))
        .authorization_bearer(&bidder)
        .json(&json!({ "amount": 120.0 }))
        .await;
    response.assert_status_ok();
    let placed: Value = response.json();
    assert_eq!(placed["outcome"], "placed");
    assert_eq!(placed["bid"]["amount"], 120.0);
    assert_eq!(placed["bid"]["bidder_name"], "Anonymous");

    let auction = server
        .get(&format!("/auction/{auction_id}"))
        .authorization_bearer(&bidder)
        .await
        .json::<Value>();
    assert_eq!(auction["current_bid"], 120.0);
    assert_eq!(auction["bid_count"], 1);
}

#[tokio::test]
async fn voice_flow_recognize_confirm_place() {
    let (server, _dir) = spawn_server().await;
    let seller = bearer();
    let bidder = bearer();
    let auction_id = create_auction(&server, &seller, 100.0).await;

    // profile first, so the bid carries a display name
    server
        .post("/profile")
        .authorization_bearer(&bidder)
        .json(&json!({ "username": "ada" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .json(&json!({ "transcript": "My bid is 150 dollars" }))
        .await;
    response.assert_status_ok();
    let recognized: Value = response.json();
    assert_eq!(recognized["outcome"], "recognized");
    assert_eq!(recognized["amount"], 150.0);
    assert_eq!(recognized["baseline"], 100.0);

    // the session survives between requests
    let session = server
        .get(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .await
        .json::<Value>();
    assert_eq!(session["state"], "recognized");
    assert_eq!(session["amount"], 150.0);

    let response = server
        .post(&format!("/auction/{auction_id}/voice/confirm"))
        .authorization_bearer(&bidder)
        .await;
    response.assert_status_ok();
    let confirmed: Value = response.json();
    assert_eq!(confirmed["outcome"], "placed");
    assert_eq!(confirmed["bid"]["amount"], 150.0);
    assert_eq!(confirmed["bid"]["bidder_name"], "ada");

    // placing the bid cleared the session
    let session = server
        .get(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .await
        .json::<Value>();
    assert_eq!(session["state"], "idle");

    // and the history shows the bid, newest first
    let history = server
        .get(&format!("/auction/{auction_id}/bids"))
        .authorization_bearer(&bidder)
        .await
        .json::<Value>();
    let results = history["results"].as_array().expect("history page");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["amount"], 150.0);
}

#[tokio::test]
async fn voice_confirm_refuses_a_low_bid_without_submitting() {
    let (server, _dir) = spawn_server().await;
    let bidder = bearer();
    let auction_id = create_auction(&server, &bidder, 100.0).await;

    let response = server
        .post(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .json(&json!({ "transcript": "I bid $100" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["outcome"], "recognized");

    let response = server
        .post(&format!("/auction/{auction_id}/voice/confirm"))
        .authorization_bearer(&bidder)
        .await;
    response.assert_status_ok();
    let refused: Value = response.json();
    assert_eq!(refused["outcome"], "too_low");
    assert_eq!(refused["amount"], 100.0);
    assert_eq!(refused["baseline"], 100.0);

    // nothing landed
    let history = server
        .get(&format!("/auction/{auction_id}/bids"))
        .authorization_bearer(&bidder)
        .await
        .json::<Value>();
    assert_eq!(history["results"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unrecognizable_speech_resets_the_session() {
    let (server, _dir) = spawn_server().await;
    let bidder = bearer();
    let auction_id = create_auction(&server, &bidder, 10.0).await;

    let response = server
        .post(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .json(&json!({ "transcript": "hello there" }))
        .await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["outcome"], "not_recognized");
    assert_eq!(outcome["transcript"], "hello there");

    let confirm = server
        .post(&format!("/auction/{auction_id}/voice/confirm"))
        .authorization_bearer(&bidder)
        .await;
    confirm.assert_status_ok();
    assert_eq!(confirm.json::<Value>()["outcome"], "nothing_recognized");
}

#[tokio::test]
async fn audio_is_unsupported_without_an_stt_backend() {
    let (server, _dir) = spawn_server().await;
    let bidder = bearer();
    let auction_id = create_auction(&server, &bidder, 10.0).await;

    let response = server
        .post(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .json(&json!({ "audio": "UklGRg==" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["outcome"], "unsupported");
}

#[tokio::test]
async fn cancel_is_idempotent() {
    let (server, _dir) = spawn_server().await;
    let bidder = bearer();
    let auction_id = create_auction(&server, &bidder, 10.0).await;

    // cancel with no session at all
    let response = server
        .delete(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["state"], "idle");

    // recognize, then cancel twice
    server
        .post(&format!("/auction/{auction_id}/voice"))
        .authorization_bearer(&bidder)
        .json(&json!({ "transcript": "bid 50" }))
        .await
        .assert_status_ok();

    for _ in 0..2 {
        let response = server
            .delete(&format!("/auction/{auction_id}/voice"))
            .authorization_bearer(&bidder)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["state"], "idle");
    }
}

#[tokio::test]
async fn profile_conflicts_are_reported() {
    let (server, _dir) = spawn_server().await;
    let first = bearer();
    let second = bearer();

    server
        .post("/profile")
        .authorization_bearer(&first)
        .json(&json!({ "username": "grace" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/profile")
        .authorization_bearer(&second)
        .json(&json!({ "username": "grace" }))
        .await;
    response.assert_status(axum::http::StatusCode::CONFLICT);

    let profile = server
        .get("/profile")
        .authorization_bearer(&first)
        .await
        .json::<Value>();
    assert_eq!(profile["username"], "grace");
}
