//! Session establishment.
//!
//! A [`Session`] is the set of cookies the remote service hands out on
//! login.  [`SessionStore`] persists it as a small JSON file so later runs
//! can skip the credential round-trip, and [`Authenticator`] decides which
//! path to take.  Authentication failures are fatal: they are logged here
//! and returned as [`AuthError`] for the caller to abort on.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::AuthError;

/// Account credentials, read from the `[x]` section of the config file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authenticated session: cookie name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    cookies: BTreeMap<String, String>,
}

impl Session {
    pub fn from_cookies<I, K, V>(cookies: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            cookies: cookies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Overlay `other` on top of this session; newer values win.
    pub fn merge(&mut self, other: Session) {
        self.cookies.extend(other.cookies);
    }

    /// Value for an HTTP `Cookie` header, e.g. `a=1; b=2`.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Whether a saved session token exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Absent,
    Saved,
}

/// Session token file at a fixed path.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SessionState {
        if self.path.exists() {
            SessionState::Saved
        } else {
            SessionState::Absent
        }
    }

    pub fn load(&self) -> Result<Session, AuthError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| AuthError::TokenRead {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| AuthError::TokenParse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        let write_err = |source| AuthError::TokenWrite {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(session).map_err(|err| write_err(err.into()))?;
        fs::write(&self.path, json).map_err(write_err)
    }
}

/// Anything that can exchange credentials for a session.
pub trait Login {
    fn login(&self, credentials: &Credentials) -> Result<Session>;
}

/// Produces the session the page fetcher reads from.
pub struct Authenticator<'a, L: Login> {
    client: &'a L,
    store: SessionStore,
}

impl<'a, L: Login> Authenticator<'a, L> {
    pub fn new(client: &'a L, store: SessionStore) -> Self {
        Self { client, store }
    }

    /// Load the saved session, or log in fresh and save it, then log in once
    /// more regardless of which branch ran.
    ///
    /// The trailing login is always performed and its cookies are merged
    /// over the loaded ones.  It is the only credential round-trip when a
    /// token file already exists.
    pub fn ensure_authenticated(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.establish(credentials).inspect_err(|err| {
            error!(error = %err, "Authentication failed");
        })
    }

    fn establish(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let mut session = match self.store.state() {
            SessionState::Saved => {
                let session = self.store.load()?;
                info!(path = %self.store.path().display(), "Loaded cookies successfully");
                session
            }
            SessionState::Absent => {
                info!("No existing cookies found, performing fresh login...");
                let session = self.client.login(credentials).map_err(AuthError::login)?;
                self.store.save(&session)?;
                info!(path = %self.store.path().display(), "Login successful and cookies saved");
                session
            }
        };

        let refreshed = self.client.login(credentials).map_err(AuthError::login)?;
        session.merge(refreshed);
        Ok(session)
    }
}
