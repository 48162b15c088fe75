//! HTTP client for the X search service.
//!
//! Implements both [`Login`] and [`SearchSource`] over blocking
//! [`reqwest`].  Response parsing is split into pure functions
//! ([`XClient::parse_page`], [`XClient::parse_login`]) so tests can exercise
//! it without a network.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde::{Deserialize, Serialize};

use super::{Cursor, Page, RemotePost, SearchQuery, SearchSource};
use crate::session::{Credentials, Login, Session};

/// Blocking client for the X login and search endpoints.
pub struct XClient {
    base_url: String,
    language: String,
    http: Client,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    cookies: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct ApiPage {
    #[serde(default)]
    tweets: Vec<ApiTweet>,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct ApiTweet {
    created_at: Option<String>,
    #[serde(alias = "full_text")]
    text: String,
    user: ApiUser,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    favorite_count: u64,
}

#[derive(Deserialize)]
struct ApiUser {
    screen_name: String,
}

impl XClient {
    /// Create a client for the service at `base_url`.
    ///
    /// Requests carry no timeout; an unresponsive service blocks the run.
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
            http,
        })
    }

    /// Parse a search response body into a [`Page`].
    ///
    /// An empty or missing `next_cursor` marks the last page.
    pub fn parse_page(body: &str) -> Result<Page> {
        let api: ApiPage = serde_json::from_str(body).context("malformed search response")?;

        let posts = api
            .tweets
            .into_iter()
            .map(|t| RemotePost {
                created_at: t.created_at,
                text: t.text,
                screen_name: t.user.screen_name,
                retweet_count: t.retweet_count,
                favorite_count: t.favorite_count,
            })
            .collect();

        Ok(Page {
            posts,
            next_cursor: api.next_cursor.filter(|c| !c.is_empty()).map(Cursor::new),
        })
    }

    /// Parse a login response body into a [`Session`].
    pub fn parse_login(body: &str) -> Result<Session> {
        let api: LoginResponse = serde_json::from_str(body).context("malformed login response")?;
        if api.cookies.is_empty() {
            bail!("login response carried no session cookies");
        }
        Ok(Session::from_cookies(api.cookies))
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header(ACCEPT_LANGUAGE, &self.language)
            .header(COOKIE, session.cookie_header())
    }

    fn get_page(&self, session: &Session, params: &[(&str, &str)]) -> Result<Page> {
        let url = format!("{}/search", self.base_url);
        let response = self
            .authorized(self.http.get(&url), session)
            .query(params)
            .send()
            .context("search request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("search API error: {status}");
        }
        let body = response.text().context("failed to read search response")?;
        Self::parse_page(&body)
    }
}

impl Login for XClient {
    fn login(&self, credentials: &Credentials) -> Result<Session> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(ACCEPT_LANGUAGE, &self.language)
            .json(&LoginRequest {
                username: &credentials.username,
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .context("login request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("login rejected: {status}");
        }
        let body = response.text().context("failed to read login response")?;
        Self::parse_login(&body)
    }
}

impl SearchSource for XClient {
    fn search(&self, session: &Session, query: &SearchQuery) -> Result<Page> {
        let count = query.count.to_string();
        self.get_page(
            session,
            &[
                ("q", query.text.as_str()),
                ("product", query.product.as_str()),
                ("count", count.as_str()),
            ],
        )
    }

    fn next_page(&self, session: &Session, query: &SearchQuery, cursor: &Cursor) -> Result<Page> {
        let count = query.count.to_string();
        self.get_page(
            session,
            &[
                ("q", query.text.as_str()),
                ("product", query.product.as_str()),
                ("count", count.as_str()),
                ("cursor", cursor.as_str()),
            ],
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
