//! Session state shared between the hosting application and the clients it builds.

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use tokio::sync::RwLock;

/// Well-known storage key the bearer token is persisted under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    authenticated: bool,
}

impl Session {
    pub fn authenticated(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            authenticated: true,
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|_| self.authenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn end(&mut self) {
        self.token = None;
        self.authenticated = false;
    }
}

pub type SessionHandle = Arc<RwLock<Session>>;

pub fn session_handle(session: Session) -> SessionHandle {
    Arc::new(RwLock::new(session))
}

/// Durable storage for the bearer token.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Token persisted as `token = "..."` in a small TOML file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read '{}'", self.path.display()))
            }
        };
        let entries: HashMap<String, String> = toml::from_str(&raw)
            .with_context(|| format!("malformed token file '{}'", self.path.display()))?;
        Ok(entries
            .get(TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .cloned())
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory '{}'", parent.display())
            })?;
        }
        let entries = HashMap::from([(TOKEN_KEY.to_string(), token.to_string())]);
        let raw = toml::to_string(&entries).context("failed to encode token file")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write '{}'", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove '{}'", self.path.display()))
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("token store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("token store lock poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("token store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Restores the session from durable storage; a missing token yields a signed-out session.
pub fn restore_session(store: &dyn TokenStore) -> Result<Session> {
    Ok(match store.load()? {
        Some(token) => Session::authenticated(token),
        None => Session::signed_out(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileTokenStore::new(dir.path().join("nested").join("session.toml"));

        assert_eq!(store.load().expect("load"), None);
        store.save("abc123").expect("save");
        assert_eq!(store.load().expect("load"), Some("abc123".to_string()));

        store.clear().expect("clear");
        store.clear().expect("clearing twice is fine");
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn signed_out_session_exposes_no_token() {
        let mut session = Session::authenticated("t");
        assert_eq!(session.token(), Some("t"));
        session.end();
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn restore_uses_stored_token() {
        let store = MemoryTokenStore::with_token("stored");
        let session = restore_session(&store).expect("restore");
        assert_eq!(session.token(), Some("stored"));
    }
}
