//! Login session context and its persistence.
//!
//! A [`Session`] carries everything identity-related the storefront needs:
//! the bearer token, the username and the wallet balance. It is loaded once
//! at start, saved at login and after every checkout, and cleared at logout.
//! Nothing reads this state from ambient globals; it is passed explicitly.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use qkart_core::Money;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or saving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("Session file error: {0}")]
    Io(#[from] io::Error),

    /// The session file is not valid JSON.
    #[error("Session file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// An authenticated user's session.
#[derive(Clone)]
pub struct Session {
    username: String,
    token: SecretString,
    balance: Money,
}

impl Session {
    /// Create a session from login details.
    #[must_use]
    pub fn new(username: String, token: SecretString, balance: Money) -> Self {
        Self {
            username,
            token,
            balance,
        }
    }

    /// The logged-in username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Bearer token for authenticated requests.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Wallet balance as last known to the client.
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Deduct a completed order from the wallet balance.
    ///
    /// The balance never goes below zero.
    pub fn debit(&mut self, amount: Money) {
        self.balance = self.balance.checked_debit(amount).unwrap_or(Money::ZERO);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("balance", &self.balance)
            .finish()
    }
}

/// On-disk representation of a session.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    username: String,
    token: String,
    balance: Money,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            username: session.username.clone(),
            token: session.token.expose_secret().to_owned(),
            balance: session.balance,
        }
    }
}

impl From<StoredSession> for Session {
    fn from(stored: StoredSession) -> Self {
        Self::new(stored.username, SecretString::from(stored.token), stored.balance)
    }
}

/// Persistent key-value home for the session.
pub trait SessionStore: Send + Sync {
    /// Load the saved session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Save the session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Forget the saved session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared.
    fn clear(&self) -> Result<(), SessionError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

// =============================================================================
// FileSessionStore
// =============================================================================

/// Session store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at `path`. The file is only created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSession = serde_json::from_str(&contents)?;
        Ok(Some(stored.into()))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&StoredSession::from(session))?;
        let mut file = open_private(&self.path)?;
        // A file left over from an older run keeps its mode on open
        restrict_permissions(&self.path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Open the session file for writing, creating it owner-only.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}

/// The session file holds a bearer token; keep it owner-only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

// =============================================================================
// MemorySessionStore
// =============================================================================

/// Session store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.as_ref().map(|stored| {
            Session::new(
                stored.username.clone(),
                SecretString::from(stored.token.clone()),
                stored.balance,
            )
        }))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(StoredSession::from(session));
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        Ok(())
    }
}
