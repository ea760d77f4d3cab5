//! File-backed session persistence.
//!
//! The console's analog of the browser tab's session storage: the token
//! and user from a successful sign-in are written to a single JSON file
//! and restored on the next start. There is no token refresh and no
//! client-side expiry check; the session lives until explicit logout or
//! until the file is removed externally.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use triage_types::Session;

/// Errors from writing or clearing the session file.
///
/// Note that *reading* never errors: a missing or corrupt file is simply
/// "no session".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("failed to write session file: {0}")]
    Write(std::io::Error),
    #[error("failed to remove session file: {0}")]
    Remove(std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Stores the active session at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured location: `TRIAGE_SESSION_FILE` when set,
    /// otherwise `~/.triage-console/session.json` (falling back to the
    /// working directory when no home directory exists).
    pub fn from_env() -> Self {
        let path = std::env::var_os("TRIAGE_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        Self::new(path)
    }

    fn default_path() -> PathBuf {
        match dirs::home_dir() {
            Some(home) => home.join(".triage-console").join("session.json"),
            None => PathBuf::from(".triage-session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists a session and marks it active.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the parent directory cannot be created
    /// or the file cannot be written.
    pub fn login(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(SessionError::Write)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json).map_err(SessionError::Write)?;
        debug!("saved session for {} to {}", session.user.hospital_id, self.path.display());
        Ok(())
    }

    /// Restores a previously stored session.
    ///
    /// A missing file yields `None`. A file that cannot be parsed is
    /// treated as "no session": the corrupt entry is deleted and `None`
    /// returned.
    pub fn load(&self) -> Option<Session> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return None,
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                debug!("restored session for {}", session.user.hospital_id);
                Some(session)
            }
            Err(e) => {
                warn!("discarding corrupt session file: {e}");
                let _ = std::fs::remove_file(&self.path);
                None
            }
        }
    }

    /// Clears the stored session. A missing file is not an error.
    pub fn logout(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Remove(e)),
        }
    }
}
