//! End-to-end application tests
//!
//! Runs the full `App` against a `wiremock` backend with a
//! `ManualScheduler`, so timers fire only when a test says so.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pokegpt::chat::{HISTORY_NOT_FOUND_MESSAGE, SESSION_EXPIRED_MESSAGE};
use pokegpt::scheduler::Timer;
use pokegpt::session::SessionPhase;
use pokegpt::{App, Location, ManualScheduler, Role, Tab};

mod common;

fn app_for(server: &MockServer, link: &str) -> (App, ManualScheduler) {
    let config = common::config_for(&server.uri());
    let backend = Arc::new(common::backend_for(&server.uri()));
    let scheduler = ManualScheduler::new();
    let app = App::new(
        config,
        backend,
        Box::new(scheduler.clone()),
        Location::parse(link).expect("valid link"),
    );
    (app, scheduler)
}

async fn mount_empty_favorites(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "favorites": [] })))
        .mount(server)
        .await;
}

async fn mount_empty_history(server: &MockServer, chat_id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/chat_history/{}", chat_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "history": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_session_created_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create_chat"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/create_chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chat_id": "c-42" })))
        .mount(&server)
        .await;
    mount_empty_history(&server, "c-42").await;
    mount_empty_favorites(&server).await;

    let (mut app, scheduler) = app_for(&server, "http://localhost:5173/");
    app.start().await;

    assert_eq!(app.session().phase(), SessionPhase::Failed);
    let retry = scheduler
        .find(|t| matches!(t, Timer::SessionRetry { attempt: 1 }))
        .expect("retry scheduled");
    assert_eq!(retry.delay, Duration::from_millis(2000));

    app.on_timer(retry.id, retry.timer).await;

    assert_eq!(app.session().phase(), SessionPhase::Ready);
    assert_eq!(app.session().chat_id(), Some("c-42"));
    assert_eq!(
        app.location().to_string(),
        "http://localhost:5173/?chatId=c-42"
    );
}

#[tokio::test]
async fn test_exchange_with_favorite_tool_call_refreshes_once() {
    let server = MockServer::start().await;
    mount_empty_history(&server, "c-1").await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({ "query": "Add Pikachu to my favorites", "chat_id": "c-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Successfully added **Pikachu** to your favorites!",
            "tool_calls": [{
                "tool_name": "add_to_favorites",
                "parameters": { "pokemon_name": "pikachu" },
                "output": "ok"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "favorites": [ { "id": 25, "name": "pikachu" } ],
            "user_id": "u-1"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let (mut app, _scheduler) = app_for(&server, "http://localhost:5173/?chatId=c-1");
    app.start().await;
    app.send("Add Pikachu to my favorites").await;

    let messages = app.conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[1].tool_calls.len(), 1);
    assert_eq!(app.favorites().count(), 1);
}

#[tokio::test]
async fn test_unknown_session_in_link_is_dropped_and_reloaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat_history/stale"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/create_chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chat_id": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_history(&server, "fresh").await;
    mount_empty_favorites(&server).await;

    let (mut app, scheduler) = app_for(&server, "http://localhost:5173/?chatId=stale");
    app.start().await;

    assert!(app.conversation().invalid_chat_id());
    assert_eq!(app.conversation().error(), Some(HISTORY_NOT_FOUND_MESSAGE));
    assert_eq!(app.location().chat_id(), None);

    let reload = scheduler
        .find(|t| matches!(t, Timer::InvalidSessionReload))
        .expect("reload scheduled");
    assert_eq!(reload.delay, Duration::from_millis(3000));
    app.on_timer(reload.id, reload.timer).await;

    assert_eq!(app.session().chat_id(), Some("fresh"));
    assert_eq!(app.location().chat_id().as_deref(), Some("fresh"));
    assert!(app.conversation().accepts_input());
}

#[tokio::test]
async fn test_session_expiring_mid_conversation_blocks_input() {
    let server = MockServer::start().await;
    mount_empty_history(&server, "c-1").await;
    mount_empty_favorites(&server).await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (mut app, _scheduler) = app_for(&server, "http://localhost:5173/?chatId=c-1");
    app.start().await;
    app.send("hello").await;

    assert_eq!(app.conversation().error(), Some(SESSION_EXPIRED_MESSAGE));
    assert!(app.send("anyone there?").await.is_none());
}

#[tokio::test]
async fn test_remove_from_favorites_tab() {
    let server = MockServer::start().await;
    mount_empty_history(&server, "c-1").await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "favorites": [ { "id": 25, "name": "pikachu" }, { "id": 6, "name": "charizard" } ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/favorites/remove"))
        .and(body_json(json!({ "pokemon_id": 25 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "favorites_count": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let (mut app, _scheduler) = app_for(&server, "http://localhost:5173/?chatId=c-1");
    app.start().await;
    app.switch_tab(Tab::Favorites).await;
    assert_eq!(app.favorites().count(), 2);

    assert!(app.remove_favorite("25").await);
    assert_eq!(app.favorites().count(), 1);
    assert_eq!(app.favorites().entries()[0].name, "charizard");
}
