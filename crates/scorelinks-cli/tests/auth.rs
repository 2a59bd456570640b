//! Login, logout and whoami against a mock server.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use support::{can_bind_localhost, read_session, seed_session, user_json};
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_persists_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Login successful",
            "data": {"token": "tok-123", "user": user_json()}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["login", "--email", "ada@example.com", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Ada Lovelace"));

    let session = read_session(home.path());
    assert_eq!(session["authToken"], "tok-123");
    let user: serde_json::Value =
        serde_json::from_str(session["authUser"].as_str().unwrap()).unwrap();
    assert_eq!(user["email"], "ada@example.com");
}

#[tokio::test]
async fn test_login_rejected_leaves_no_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"success": false, "message": "Invalid credentials"})),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["login", "--email", "ada@example.com", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));

    assert!(!home.path().join("session.json").exists());
}

#[test]
fn test_login_with_blank_email_makes_no_request() {
    let home = tempdir().unwrap();

    // Port 9 (discard) is never contacted: validation fails first.
    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", "http://127.0.0.1:9")
        .args(["login", "--email", "  ", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please fill in all fields"));
}

#[test]
fn test_logout_clears_session() {
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    let session = read_session(home.path());
    assert!(session.get("authToken").is_none());
    assert!(session.get("authUser").is_none());

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn test_whoami_prints_stored_user() {
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("ada@example.com"))
        .stdout(predicate::str::contains("u-1"));
}

#[test]
fn test_whoami_requires_login() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[tokio::test]
async fn test_whoami_refresh_sends_bearer_token_and_updates_user() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    let mut renamed = user_json();
    renamed["firstName"] = json!("Augusta");

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": renamed})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["whoami", "--refresh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Augusta Lovelace"));

    let session = read_session(home.path());
    assert!(session["authUser"].as_str().unwrap().contains("Augusta"));
}

#[tokio::test]
async fn test_whoami_refresh_unauthorized_ends_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "expired");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["whoami", "--refresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    let session = read_session(home.path());
    assert!(session.get("authToken").is_none());
}
