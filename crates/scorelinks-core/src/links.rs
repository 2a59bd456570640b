//! API-link directory: list, create, update, and toggle link records.
//!
//! Mutations return no payload. Callers that need fresh data re-fetch the
//! whole list, either through [`LinkDirectory::apply`] or by pairing
//! [`LinkDirectory::mutate`] with [`LinkDirectory::list_tagged`].
//! Tagged fetches carry a [`FetchTag`] so a consumer can keep only the
//! newest snapshot with a [`SnapshotGate`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::MISSING_FIELDS_MESSAGE;
use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Full,
    AliveStatus,
    PointsTable,
}

impl LinkType {
    pub fn all() -> &'static [LinkType] {
        &[LinkType::Full, LinkType::AliveStatus, LinkType::PointsTable]
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            LinkType::Full => "full",
            LinkType::AliveStatus => "alive_status",
            LinkType::PointsTable => "points_table",
        }
    }

    /// Human label.
    pub fn label(self) -> &'static str {
        match self {
            LinkType::Full => "Full",
            LinkType::AliveStatus => "Alive Status",
            LinkType::PointsTable => "Points Table",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        LinkType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                ApiError::validation(format!(
                    "Unknown link type '{s}' (expected full, alive_status or points_table)"
                ))
            })
    }
}

/// Server-side API-link record. Local copies are snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLink {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub link_id: String,
    pub match_id: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub is_active: bool,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub public_url: String,
}

/// Body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    pub match_id: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl LinkDraft {
    pub fn new(match_id: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            match_id: match_id.into().trim().to_string(),
            link_type,
        }
    }

    /// # Errors
    /// Returns a `Validation` error when the match id is blank.
    pub fn validate(&self) -> ApiResult<()> {
        if self.match_id.trim().is_empty() {
            return Err(ApiError::validation(MISSING_FIELDS_MESSAGE));
        }
        Ok(())
    }

    fn to_body(&self) -> ApiResult<Value> {
        serde_json::to_value(self)
            .map_err(|e| ApiError::validation(format!("Failed to encode link: {e}")))
    }
}

/// Ensures a link id can be placed in a URL path segment.
///
/// # Errors
/// Returns a `Validation` error for blank ids or ids containing `/`.
pub fn validate_link_id(link_id: &str) -> ApiResult<&str> {
    let trimmed = link_id.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Link id is required"));
    }
    if trimmed.contains('/') {
        return Err(ApiError::validation(format!(
            "Invalid link id '{trimmed}'"
        )));
    }
    Ok(trimmed)
}

/// One change to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkMutation {
    Create(LinkDraft),
    Update { link_id: String, draft: LinkDraft },
    Toggle { link_id: String },
}

impl LinkMutation {
    pub fn describe(&self) -> String {
        match self {
            LinkMutation::Create(draft) => {
                format!("create {} link for match {}", draft.link_type, draft.match_id)
            }
            LinkMutation::Update { link_id, .. } => format!("update link {link_id}"),
            LinkMutation::Toggle { link_id } => format!("toggle link {link_id}"),
        }
    }
}

/// Monotonic tag assigned when a list fetch is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTag(pub u64);

/// A list result and the tag of the fetch that produced it.
#[derive(Debug, Clone)]
pub struct ListSnapshot {
    pub tag: FetchTag,
    pub links: Vec<ApiLink>,
}

/// Accepts only snapshots newer than the last one accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotGate {
    applied: Option<FetchTag>,
}

impl SnapshotGate {
    pub fn accept(&mut self, tag: FetchTag) -> bool {
        if self.applied.is_some_and(|applied| tag <= applied) {
            return false;
        }
        self.applied = Some(tag);
        true
    }

    pub fn reset(&mut self) {
        self.applied = None;
    }
}

#[derive(Debug, Clone)]
pub struct LinkDirectory {
    client: ApiClient,
    fetch_seq: Arc<AtomicU64>,
}

impl LinkDirectory {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            fetch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fetches every link the caller owns. A missing `data` is an empty list.
    ///
    /// Records that do not decode (e.g. a link type this client does not
    /// know) are logged and skipped.
    ///
    /// # Errors
    /// Returns request errors unchanged.
    pub async fn list(&self) -> ApiResult<Vec<ApiLink>> {
        let response = self.client.get::<Vec<Value>>("/apilinks").await?;
        let links: Vec<ApiLink> = response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| {
                let link_id = record
                    .get("linkId")
                    .and_then(Value::as_str)
                    .unwrap_or("?")
                    .to_string();
                serde_json::from_value(record)
                    .inspect_err(|e| tracing::warn!(link_id, "skipping unreadable api link: {e}"))
                    .ok()
            })
            .collect();
        tracing::debug!(count = links.len(), "fetched api links");
        Ok(links)
    }

    /// Like [`LinkDirectory::list`], tagged with the moment it was issued.
    ///
    /// # Errors
    /// Returns request errors unchanged.
    pub async fn list_tagged(&self) -> ApiResult<ListSnapshot> {
        let tag = FetchTag(self.fetch_seq.fetch_add(1, Ordering::SeqCst));
        let links = self.list().await?;
        Ok(ListSnapshot { tag, links })
    }

    /// # Errors
    /// Returns `Validation` for a blank match id, otherwise request errors.
    pub async fn create(&self, draft: &LinkDraft) -> ApiResult<()> {
        draft.validate()?;
        self.client
            .post::<Value>("/apilinks", Some(draft.to_body()?))
            .await?;
        tracing::info!(match_id = %draft.match_id, link_type = %draft.link_type, "created api link");
        Ok(())
    }

    /// # Errors
    /// Returns `Validation` for bad input, otherwise request errors.
    pub async fn update(&self, link_id: &str, draft: &LinkDraft) -> ApiResult<()> {
        let link_id = validate_link_id(link_id)?;
        draft.validate()?;
        self.client
            .patch::<Value>(&format!("/apilinks/{link_id}/update"), Some(draft.to_body()?))
            .await?;
        tracing::info!(link_id, "updated api link");
        Ok(())
    }

    /// Flips `isActive` server-side; no new value is sent.
    ///
    /// # Errors
    /// Returns `Validation` for a bad id, otherwise request errors.
    pub async fn toggle_active(&self, link_id: &str) -> ApiResult<()> {
        let link_id = validate_link_id(link_id)?;
        self.client
            .patch::<Value>(&format!("/apilinks/{link_id}/toggle"), None)
            .await?;
        tracing::info!(link_id, "toggled api link");
        Ok(())
    }

    /// Runs one mutation and waits for its response.
    ///
    /// # Errors
    /// Returns the mutation's error.
    pub async fn mutate(&self, mutation: &LinkMutation) -> ApiResult<()> {
        match mutation {
            LinkMutation::Create(draft) => self.create(draft).await,
            LinkMutation::Update { link_id, draft } => self.update(link_id, draft).await,
            LinkMutation::Toggle { link_id } => self.toggle_active(link_id).await,
        }
    }

    /// Runs one mutation, then re-fetches the whole list.
    ///
    /// # Errors
    /// Returns the first error; the list is not fetched if the mutation fails.
    pub async fn apply(&self, mutation: &LinkMutation) -> ApiResult<Vec<ApiLink>> {
        self.mutate(mutation).await?;
        self.list().await
    }

    /// Copies the link's public URL.
    ///
    /// # Errors
    /// Returns the clipboard failure; it does not affect later calls.
    pub fn copy_public_url(link: &ApiLink, sink: &dyn ClipboardSink) -> Result<(), ClipboardError> {
        sink.copy(&link.public_url).inspect_err(|err| {
            tracing::warn!(link_id = %link.link_id, "copy failed: {err}");
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

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
            "__v": 0,
            "publicUrl": format!("https://16score-vmix-server.vercel.app/api/{link_id}")
        })
    }

    pub fn list_body(links: &[Value]) -> Value {
        json!({"success": true, "count": links.len(), "data": links})
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::fixtures::{link_json, list_body};
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::session::SessionStore;
    use crate::user::fixtures::user;

    fn directory(server: &MockServer) -> LinkDirectory {
        let session = SessionStore::in_memory();
        session.set_session("tok", &user()).unwrap();
        LinkDirectory::new(ApiClient::new(server.uri(), session))
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::System("no display".to_string()));
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_link_type_parsing_and_labels() {
        assert_eq!("alive_status".parse::<LinkType>().unwrap(), LinkType::AliveStatus);
        assert_eq!("Points-Table".parse::<LinkType>().unwrap(), LinkType::PointsTable);
        assert!("scoreboard".parse::<LinkType>().is_err());
        assert_eq!(LinkType::AliveStatus.label(), "Alive Status");
        assert_eq!(LinkType::PointsTable.to_string(), "points_table");
    }

    #[test]
    fn test_api_link_ignores_version_field() {
        let link: ApiLink = serde_json::from_value(link_json("abc", "m-1", "full", true)).unwrap();
        assert_eq!(link.link_id, "abc");
        assert_eq!(link.link_type, LinkType::Full);
        assert_eq!(link.last_accessed, None);
        assert_eq!(link.access_count, 3);
    }

    #[test]
    fn test_draft_serializes_wire_names() {
        let draft = LinkDraft::new(" m-9 ", LinkType::AliveStatus);
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"matchId": "m-9", "type": "alive_status"})
        );
    }

    #[test]
    fn test_validate_link_id() {
        assert_eq!(validate_link_id(" abc ").unwrap(), "abc");
        assert!(validate_link_id("").is_err());
        assert!(validate_link_id("a/b").is_err());
    }

    #[test]
    fn test_snapshot_gate_drops_stale() {
        let mut gate = SnapshotGate::default();
        assert!(gate.accept(FetchTag(2)));
        assert!(!gate.accept(FetchTag(1)));
        assert!(!gate.accept(FetchTag(2)));
        assert!(gate.accept(FetchTag(3)));

        gate.reset();
        assert!(gate.accept(FetchTag(0)));
    }

    #[tokio::test]
    async fn test_list_empty_account() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[])))
            .mount(&server)
            .await;

        assert!(directory(&server).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_without_data_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        assert!(directory(&server).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_skips_record_with_unknown_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
                link_json("a", "m-1", "full", true),
                link_json("b", "m-2", "scoreboard", true),
                link_json("c", "m-3", "alive_status", false),
            ])))
            .mount(&server)
            .await;

        let links = directory(&server).list().await.unwrap();

        let ids: Vec<_> = links.iter().map(|l| l.link_id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[tokio::test]
    async fn test_create_then_list_includes_new_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/apilinks"))
            .and(body_json(json!({"matchId": "m-2", "type": "points_table"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
                link_json("a", "m-1", "full", true),
                link_json("b", "m-2", "points_table", true),
            ])))
            .mount(&server)
            .await;

        let links = directory(&server)
            .apply(&LinkMutation::Create(LinkDraft::new("m-2", LinkType::PointsTable)))
            .await
            .unwrap();

        assert_eq!(links.len(), 2);
        assert!(links
            .iter()
            .any(|l| l.match_id == "m-2" && l.link_type == LinkType::PointsTable));
    }

    #[tokio::test]
    async fn test_toggle_hits_toggle_endpoint_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/apilinks/b/toggle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
                link_json("a", "m-1", "full", true),
                link_json("b", "m-2", "full", false),
            ])))
            .mount(&server)
            .await;

        let links = directory(&server)
            .apply(&LinkMutation::Toggle {
                link_id: "b".to_string(),
            })
            .await
            .unwrap();

        let toggled: Vec<_> = links.iter().filter(|l| !l.is_active).collect();
        assert_eq!(toggled.len(), 1);
        assert_eq!(toggled[0].link_id, "b");
    }

    #[tokio::test]
    async fn test_update_sends_draft() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/apilinks/a/update"))
            .and(body_json(json!({"matchId": "m-7", "type": "alive_status"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        directory(&server)
            .update("a", &LinkDraft::new("m-7", LinkType::AliveStatus))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_then_list_changes_only_target_fields() {
        let target_before: ApiLink =
            serde_json::from_value(link_json("a", "m-1", "full", true)).unwrap();
        let other_before: ApiLink =
            serde_json::from_value(link_json("b", "m-2", "points_table", false)).unwrap();

        let mut target_after_json = link_json("a", "m-1", "full", true);
        target_after_json["matchId"] = json!("m-7");
        target_after_json["type"] = json!("alive_status");

        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/apilinks/a/update"))
            .and(body_json(json!({"matchId": "m-7", "type": "alive_status"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[
                target_after_json,
                link_json("b", "m-2", "points_table", false),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let links = directory(&server)
            .apply(&LinkMutation::Update {
                link_id: "a".to_string(),
                draft: LinkDraft::new("m-7", LinkType::AliveStatus),
            })
            .await
            .unwrap();

        assert_eq!(links.len(), 2);
        let target = links.iter().find(|l| l.link_id == "a").unwrap();
        assert_eq!(target.match_id, "m-7");
        assert_eq!(target.link_type, LinkType::AliveStatus);
        let expected = ApiLink {
            match_id: "m-7".to_string(),
            link_type: LinkType::AliveStatus,
            ..target_before
        };
        assert_eq!(target, &expected);

        let other = links.iter().find(|l| l.link_id == "b").unwrap();
        assert_eq!(other, &other_before);
    }

    #[tokio::test]
    async fn test_failed_mutation_skips_refetch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/apilinks/zzz/toggle"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "API link not found"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[])))
            .expect(0)
            .mount(&server)
            .await;

        let err = directory(&server)
            .apply(&LinkMutation::Toggle {
                link_id: "zzz".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "API link not found");
    }

    #[tokio::test]
    async fn test_blank_draft_is_rejected_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let err = directory(&server)
            .create(&LinkDraft::new("   ", LinkType::Full))
            .await
            .unwrap_err();
        assert_eq!(err.message, MISSING_FIELDS_MESSAGE);
    }

    #[tokio::test]
    async fn test_list_tagged_tags_increase() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apilinks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body(&[])))
            .mount(&server)
            .await;
        let directory = directory(&server);
        let shared = directory.clone();

        let first = directory.list_tagged().await.unwrap();
        let second = shared.list_tagged().await.unwrap();

        assert!(second.tag > first.tag);
    }

    #[test]
    fn test_copy_public_url() {
        let link: ApiLink = serde_json::from_value(link_json("abc", "m-1", "full", true)).unwrap();
        let clipboard = RecordingClipboard::default();

        LinkDirectory::copy_public_url(&link, &clipboard).unwrap();
        assert_eq!(
            clipboard.copied.lock().unwrap().as_slice(),
            ["https://16score-vmix-server.vercel.app/api/abc"]
        );

        let failing = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(LinkDirectory::copy_public_url(&link, &failing).is_err());
        LinkDirectory::copy_public_url(&link, &clipboard).unwrap();
        assert_eq!(clipboard.copied.lock().unwrap().len(), 2);
    }
}
