//! Command-line integration tests
//!
//! Runs the `pokegpt` binary with `assert_cmd`. Commands that talk to the
//! backend point `--api-url` at a `wiremock` server.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn pokegpt() -> Command {
    let mut cmd = Command::cargo_bin("pokegpt").unwrap();
    cmd.env_remove("POKEGPT_API_URL")
        .env_remove("POKEGPT_APP_URL")
        .env_remove("POKEGPT_TIMEOUT_SECONDS")
        .env_remove("POKEGPT_FAVORITES_POLL_SECONDS")
        .env_remove("RUST_LOG")
        .args(["--config", "does-not-exist/config.yaml"]);
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("pokegpt")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("favorites"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_history_requires_chat_id() {
    pokegpt().arg("history").assert().failure();
}

#[test]
fn test_malformed_config_file_fails() {
    let (_dir, config_path) = common::temp_config_file("backend: [unclosed");
    Command::cargo_bin("pokegpt")
        .unwrap()
        .arg("--config")
        .arg(config_path)
        .args(["favorites", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_invalid_api_url_fails_validation() {
    pokegpt()
        .args(["--api-url", "not a url", "new"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend.base_url"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_prints_shareable_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create_chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "chat_id": "cli-1" })))
        .expect(1)
        .mount(&server)
        .await;

    pokegpt()
        .env("POKEGPT_APP_URL", "https://pokegpt.example/")
        .args(["--api-url", &server.uri(), "new"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://pokegpt.example/?chatId=cli-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "favorites": [ { "id": 25, "name": "pikachu" } ],
            "user_id": "u-1"
        })))
        .mount(&server)
        .await;

    pokegpt()
        .args(["--api-url", &server.uri(), "favorites", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pikachu\""))
        .stdout(predicate::str::contains("\"25\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_of_unknown_session_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chat_history/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    pokegpt()
        .args(["--api-url", &server.uri(), "history", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chat session not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_add_succeeds_when_list_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/favorites/add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Added pikachu" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/favorites"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    pokegpt()
        .args(["--api-url", &server.uri(), "favorites", "add", "pikachu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added pikachu to your favorites"))
        .stdout(predicate::str::contains("total").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_remove_without_reported_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/favorites/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Removed" })))
        .expect(1)
        .mount(&server)
        .await;

    pokegpt()
        .args(["--api-url", &server.uri(), "favorites", "remove", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 25 from your favorites"))
        .stdout(predicate::str::contains("left").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_favorites_remove_reports_backend_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/favorites/remove"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "favorites_count": 2 })))
        .mount(&server)
        .await;

    pokegpt()
        .args(["--api-url", &server.uri(), "favorites", "remove", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 25 from your favorites (2 left)"));
}
