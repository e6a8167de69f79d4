//! Persistent storage for the session token pair.
//!
//! The pair lives in one JSON file under the user's config directory and
//! every consumer goes through [`TokenStore`]; nothing else touches the
//! file. The in-memory copy and the file are updated under the same lock,
//! so concurrent async callers always observe a consistent pair.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::ApiError;

/// The token pair for the current session. Either token may be absent;
/// a missing refresh token means the session cannot be silently renewed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl Session {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }

    pub fn can_renew(&self) -> bool {
        self.refresh.is_some()
    }
}

/// File-backed holder for the session token pair.
pub struct TokenStore {
    path: PathBuf,
    session: Mutex<Session>,
}

impl TokenStore {
    /// Open the store at `path`, loading any previously persisted session.
    /// A missing file starts an empty session; an unreadable one is
    /// treated as empty rather than locking the user out of `login`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => session,
                Err(err) => {
                    warn!(path = %path.display(), %err, "session file corrupt, starting empty");
                    Session::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Session::default(),
            Err(err) => {
                warn!(path = %path.display(), %err, "session file unreadable, starting empty");
                Session::default()
            }
        };
        Self {
            path,
            session: Mutex::new(session),
        }
    }

    /// Current token pair.
    pub fn get(&self) -> Session {
        self.session.lock().expect("token store lock poisoned").clone()
    }

    /// Current access token, if any.
    pub fn access(&self) -> Option<String> {
        self.session
            .lock()
            .expect("token store lock poisoned")
            .access
            .clone()
    }

    /// Current refresh token, if any.
    pub fn refresh_token(&self) -> Option<String> {
        self.session
            .lock()
            .expect("token store lock poisoned")
            .refresh
            .clone()
    }

    /// Replace both tokens (login).
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), ApiError> {
        self.update(|session| {
            session.access = Some(access.to_string());
            session.refresh = Some(refresh.to_string());
        })
    }

    /// Rotate the access token only (refresh).
    pub fn set_access(&self, access: &str) -> Result<(), ApiError> {
        self.update(|session| session.access = Some(access.to_string()))
    }

    /// Drop both tokens (logout or terminal refresh failure). Idempotent.
    pub fn clear(&self) -> Result<(), ApiError> {
        self.update(|session| *session = Session::default())
    }

    fn update(&self, mutate: impl FnOnce(&mut Session)) -> Result<(), ApiError> {
        let mut session = self.session.lock().expect("token store lock poisoned");
        mutate(&mut session);
        persist(&self.path, &session).map_err(ApiError::Session)
    }
}

fn persist(path: &Path, session: &Session) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(session).map_err(io::Error::other)?;
    std::fs::write(path, body)?;
    restrict_permissions(path)?;
    debug!(path = %path.display(), "session persisted");
    Ok(())
}

/// Token files hold live credentials; keep them owner-readable only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::open(dir.path().join("session.json"))
    }

    #[test]
    fn set_tokens_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set_tokens("acc-1", "ref-1").unwrap();
        assert_eq!(
            store.get(),
            Session {
                access: Some("acc-1".into()),
                refresh: Some("ref-1".into()),
            }
        );
    }

    #[test]
    fn clear_empties_both_tokens() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set_tokens("acc", "ref").unwrap();
        store.clear().unwrap();
        assert!(store.get().is_empty());
        // idempotent
        store.clear().unwrap();
        assert!(store.get().is_empty());
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        TokenStore::open(&path).set_tokens("acc", "ref").unwrap();

        let reopened = TokenStore::open(&path);
        assert_eq!(reopened.access().as_deref(), Some("acc"));
        assert_eq!(reopened.refresh_token().as_deref(), Some("ref"));
    }

    #[test]
    fn set_access_keeps_the_refresh_token() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.set_tokens("old-access", "ref").unwrap();
        store.set_access("new-access").unwrap();
        let session = store.get();
        assert_eq!(session.access.as_deref(), Some("new-access"));
        assert_eq!(session.refresh.as_deref(), Some("ref"));
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let store = TokenStore::open(dir.path().join("nope.json"));
        assert!(store.get().is_empty());
        assert!(!store.get().can_renew());
    }

    #[test]
    fn corrupt_file_starts_empty_instead_of_failing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = TokenStore::open(&path);
        assert!(store.get().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        TokenStore::open(&path).set_tokens("a", "r").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
