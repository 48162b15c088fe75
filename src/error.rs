//! Failures that end a run before any fetching starts.
//!
//! Fetch-level problems are ordinary [`anyhow::Error`]s handled inside the
//! collection loop; only authentication is fatal, so only it gets a type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read session token {}: {source}", path.display())]
    TokenRead { path: PathBuf, source: io::Error },

    #[error("session token {} is malformed: {source}", path.display())]
    TokenParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write session token {}: {source}", path.display())]
    TokenWrite { path: PathBuf, source: io::Error },

    #[error("login failed: {0}")]
    Login(String),
}

impl AuthError {
    pub(crate) fn login(err: anyhow::Error) -> Self {
        AuthError::Login(format!("{err:#}"))
    }
}
