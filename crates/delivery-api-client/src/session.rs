//! Signed-in credentials.
//!
//! A `Session` is handed to the `ApiClient` at construction and shared by
//! clones of it. `CredentialStore` keeps the credentials on disk between runs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use delivery_core::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// `Basic base64(email:password)`
    pub fn basic_authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.email, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Credentials shared between an `ApiClient` and its clones.
#[derive(Clone, Debug, Default)]
pub struct Session {
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl Session {
    /// Session with nobody signed in; requests go out unauthenticated.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Arc::new(RwLock::new(Some(credentials))),
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }

    pub fn sign_in(&self, credentials: Credentials) {
        *self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(credentials);
    }

    pub fn sign_out(&self) {
        *self
            .credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Value for the `Authorization` header, if anyone is signed in.
    pub fn authorization_header(&self) -> Option<String> {
        self.credentials().map(|c| c.basic_authorization())
    }
}

/// JSON file holding the signed-in credentials.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored credentials, or `None` when nobody has logged in.
    pub fn load(&self) -> ClientResult<Option<Credentials>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file: {}", self.path.display()))
            .map_err(|source| session_error("Could not read stored session", source))?;
        let credentials = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse session file: {}", self.path.display()))
            .map_err(|source| session_error("Stored session is corrupt", source))?;
        Ok(Some(credentials))
    }

    pub fn save(&self, credentials: &Credentials) -> ClientResult<()> {
        let raw = serde_json::to_string_pretty(credentials)
            .context("Failed to serialize credentials")
            .map_err(|source| session_error("Could not store session", source))?;
        write_private(&self.path, raw.as_bytes())
            .map_err(|source| session_error("Could not store session", source))?;
        tracing::debug!(path = %self.path.display(), "stored session credentials");
        Ok(())
    }

    /// Forget the stored credentials. Returns whether a file was removed.
    pub fn clear(&self) -> ClientResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove session file: {}", self.path.display()))
            .map_err(|source| session_error("Could not remove stored session", source))?;
        Ok(true)
    }

    /// Session seeded from whatever is stored.
    pub fn session(&self) -> ClientResult<Session> {
        Ok(match self.load()? {
            Some(credentials) => Session::with_credentials(credentials),
            None => Session::anonymous(),
        })
    }
}

fn session_error(message: &str, source: anyhow::Error) -> ClientError {
    ClientError::Session {
        message: message.to_string(),
        source,
    }
}

/// Write `contents` to a file only the owner can read.
///
/// New files are created as 0600; an existing file is tightened before it is
/// truncated and rewritten.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    if path.exists() {
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
    }
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    file.write_all(contents)
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write session file: {}", path.display()))
}
