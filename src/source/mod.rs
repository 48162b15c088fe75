//! Remote search service abstraction.
//!
//! This module defines the [`SearchSource`] trait, the wire-neutral
//! [`RemotePost`] and [`Page`] types it returns, and the normalised
//! [`PostRecord`] the rest of the program works with.  The concrete HTTP
//! client lives in [`x`].
//!
//! ## For contributors: pointing at a different service
//!
//! 1. Create a new file in this directory.
//! 2. Implement [`SearchSource`] (and [`crate::session::Login`] if the
//!    service needs credentials) for your client struct.
//! 3. Construct it in `main.rs` instead of [`XClient`].
//!
//! The fetcher, collection loop and report never look past these traits.

mod post;
mod x;

pub use post::PostRecord;
pub use x::XClient;

use anyhow::Result;

use crate::session::Session;

/// Opaque continuation token handed back with each [`Page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What to search for.  Fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Raw query string, operators included.
    pub text: String,
    /// Result ordering, e.g. `Latest`.
    pub product: String,
    /// Posts requested per page.
    pub count: u32,
}

/// A post as the remote service described it, before normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemotePost {
    /// Creation time as sent by the service, unparsed.
    pub created_at: Option<String>,
    pub text: String,
    pub screen_name: String,
    pub retweet_count: u64,
    pub favorite_count: u64,
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Posts in the order the service returned them.
    pub posts: Vec<RemotePost>,
    /// `None` once the result set is exhausted.
    pub next_cursor: Option<Cursor>,
}

/// Trait that every search backend must implement.
///
/// Both calls only read the session; establishing and refreshing it is the
/// job of [`crate::session::Authenticator`].
pub trait SearchSource {
    /// Fetch the first page of results for `query`.
    fn search(&self, session: &Session, query: &SearchQuery) -> Result<Page>;

    /// Fetch the page that follows `cursor`.
    fn next_page(&self, session: &Session, query: &SearchQuery, cursor: &Cursor) -> Result<Page>;
}
