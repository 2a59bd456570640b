//! API-link commands against a mock server.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use support::{can_bind_localhost, link_json, list_body, read_session, seed_session};
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_links_list_requires_login() {
    let home = tempdir().unwrap();

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", "http://127.0.0.1:9")
        .args(["links", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[tokio::test]
async fn test_links_list_prints_table_and_count() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
            link_json("abc123", "m-1", "full", true),
            link_json("def456", "m-2", "alive_status", false),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abc123"))
        .stdout(predicate::str::contains("Alive Status"))
        .stdout(predicate::str::contains("Inactive"))
        .stdout(predicate::str::contains("2 API link(s) found"));
}

#[tokio::test]
async fn test_links_list_json_outputs_records() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[link_json("abc123", "m-1", "points_table", true)])),
        )
        .mount(&mock_server)
        .await;

    let output = cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "list", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["linkId"], "abc123");
    assert_eq!(parsed[0]["type"], "points_table");
}

#[tokio::test]
async fn test_links_create_posts_draft_then_lists() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/apilinks"))
        .and(body_json(json!({"matchId": "m-9", "type": "points_table"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": link_json("new999", "m-9", "points_table", true)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[link_json("new999", "m-9", "points_table", true)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "create", "--match-id", " m-9 ", "--type", "points_table"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new999"))
        .stdout(predicate::str::contains("1 API link(s) found"));
}

#[tokio::test]
async fn test_links_toggle_patches_without_body() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/apilinks/abc123/toggle"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": link_json("abc123", "m-1", "full", false)
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[link_json("abc123", "m-1", "full", false)])),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "toggle", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inactive"));
}

#[tokio::test]
async fn test_links_update_failure_skips_refetch() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/apilinks/abc123/update"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"success": false, "message": "API link not found"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "update", "abc123", "--match-id", "m-2", "--type", "full"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API link not found"));
}

#[tokio::test]
async fn test_links_unauthorized_ends_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "expired");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"));

    let session = read_session(home.path());
    assert!(session.get("authToken").is_none());
}

#[tokio::test]
async fn test_links_unauthorized_keeps_session_when_disabled() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    std::fs::write(
        home.path().join("config.toml"),
        "[api]\nlogout_on_unauthorized = false\n",
    )
    .unwrap();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unauthorized"));

    let session = read_session(home.path());
    assert_eq!(session["authToken"], "tok-123");
}

#[tokio::test]
async fn test_links_copy_unknown_id_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[link_json("abc123", "m-1", "full", true)])),
        )
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "copy", "zzz999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API link with id 'zzz999'"));
}

#[tokio::test]
async fn test_links_copy_to_pipe_writes_no_escape_sequence() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&[link_json("abc123", "m-1", "full", true)])),
        )
        .mount(&mock_server)
        .await;

    let output = cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .args(["links", "copy", "abc123"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("\x1b]52;"), "escape sequence leaked: {stdout:?}");

    // Without a terminal or a display server there is nowhere to copy to.
    #[cfg(target_os = "linux")]
    {
        assert!(!output.status.success());
        assert!(!stdout.contains("Copied!"));
        assert!(String::from_utf8_lossy(&output.stderr).contains("copy public URL"));
    }
}

#[tokio::test]
async fn test_links_update_prints_refreshed_table() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = tempdir().unwrap();
    seed_session(home.path(), "tok-123");
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/apilinks/abc123/update"))
        .and(body_json(json!({"matchId": "m-7", "type": "alive_status"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apilinks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
            link_json("abc123", "m-7", "alive_status", true),
            link_json("def456", "m-2", "full", true),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("scorelinks")
        .env("SCORELINKS_HOME", home.path())
        .env("SCORELINKS_API_URL", mock_server.uri())
        .args(["links", "update", "abc123", "--match-id", "m-7", "--type", "alive_status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("m-7"))
        .stdout(predicate::str::contains("Alive Status"))
        .stdout(predicate::str::contains("2 API link(s) found"));
}
