//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{Value, json};

pub fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn user_json() -> Value {
    json!({
        "_id": "u-1",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "createdAt": "2024-03-01T10:00:00.000Z",
        "updatedAt": "2024-03-02T11:30:00.000Z",
        "__v": 0
    })
}

pub fn link_json(link_id: &str, match_id: &str, link_type: &str, active: bool) -> Value {
    json!({
        "_id": format!("obj-{link_id}"),
        "userId": "u-1",
        "linkId": link_id,
        "matchId": match_id,
        "type": link_type,
        "isActive": active,
        "lastAccessed": null,
        "accessCount": 3,
        "createdAt": "2024-05-01T09:00:00.000Z",
        "updatedAt": "2024-05-02T09:00:00.000Z",
        "publicUrl": format!("https://16score-vmix-server.vercel.app/api/{link_id}")
    })
}

pub fn list_body(links: &[Value]) -> Value {
    json!({"success": true, "count": links.len(), "data": links})
}

/// Writes a logged-in session into `home`, the way a prior login would.
pub fn seed_session(home: &Path, token: &str) {
    let session = json!({
        "authToken": token,
        "authUser": user_json().to_string(),
    });
    fs::write(home.join("session.json"), session.to_string()).unwrap();
}

pub fn read_session(home: &Path) -> Value {
    let raw = fs::read_to_string(home.join("session.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}
