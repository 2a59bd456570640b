//! Durable session persistence (token + user).
//!
//! The session lives in a key/value [`SessionStorage`] under two keys,
//! [`TOKEN_KEY`] and [`USER_KEY`]. Reads always go to storage; nothing is
//! cached in memory, so a second process logging out is observed on the next
//! read. Concurrent writers are last-write-wins.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};

use crate::config::paths;
use crate::user::User;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the JSON-serialized [`User`].
pub const USER_KEY: &str = "authUser";

/// String key/value storage that survives restarts.
///
/// Batch operations must apply all entries in a single write.
pub trait SessionStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Sets every entry in one write.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn set_entries(&self, entries: &[(&str, String)]) -> Result<()>;

    /// Removes every key in one write. Missing keys are ignored.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn remove_entries(&self, keys: &[&str]) -> Result<()>;
}

/// JSON-object file storage, written atomically with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at `$SCORELINKS_HOME/session.json`.
    pub fn default_location() -> Self {
        Self::new(paths::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", self.path.display()))
    }

    /// Current entries for a write; an unreadable file is replaced.
    fn read_map_for_write(&self) -> BTreeMap<String, String> {
        self.read_map().unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), "discarding unreadable session file: {err:#}");
            BTreeMap::new()
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(map).context("Failed to serialize session")?;
        let tmp_path = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_entries(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.read_map_for_write();
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        self.write_map(&map)
    }

    fn remove_entries(&self, keys: &[&str]) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = self.read_map_for_write();
        for key in keys {
            map.remove(*key);
        }
        self.write_map(&map)
    }
}

/// In-memory storage for tests and ephemeral runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_entries(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in entries {
            map.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_entries(&self, keys: &[&str]) -> Result<()> {
        let mut map = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// Snapshot of the persisted session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthState")
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}

/// Read-through handle to the persisted session.
///
/// Cheap to clone; all clones share the same storage.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// Store backed by `$SCORELINKS_HOME/session.json`.
    pub fn file() -> Self {
        Self::new(FileStorage::default_location())
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Reads the session. Never fails: storage or decoding problems degrade
    /// to missing values and are logged.
    pub fn auth_state(&self) -> AuthState {
        let token = self.token();
        let user = self.current_user();
        AuthState {
            is_authenticated: token.is_some(),
            user,
            token,
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!("session token unavailable: {err:#}");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Returns the stored user; a malformed record reads as `None`.
    pub fn current_user(&self) -> Option<User> {
        let raw = match self.storage.get(USER_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!("stored user unavailable: {err:#}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!("ignoring malformed stored user: {err}");
                None
            }
        }
    }

    /// Persists token and user together.
    ///
    /// # Errors
    /// Returns an error if the storage write fails.
    pub fn set_session(&self, token: &str, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.storage
            .set_entries(&[(TOKEN_KEY, token.to_string()), (USER_KEY, user_json)])
    }

    /// Replaces only the stored user.
    ///
    /// # Errors
    /// Returns an error if the storage write fails.
    pub fn set_user(&self, user: &User) -> Result<()> {
        let user_json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.storage.set_entries(&[(USER_KEY, user_json)])
    }

    /// Removes token and user together.
    ///
    /// # Errors
    /// Returns an error if the storage write fails.
    pub fn clear_session(&self) -> Result<()> {
        self.storage.remove_entries(&[TOKEN_KEY, USER_KEY])
    }
}
