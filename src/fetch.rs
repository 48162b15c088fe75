//! Page fetching.
//!
//! [`PageFetcher`] turns "give me the next page" into a call on the
//! [`SearchSource`]: a fresh search when there is no handle yet, a paced
//! continuation otherwise.  Every returned post is normalised into a
//! [`PostRecord`] here; labelling happens later in the collection loop.

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::pacing::{PageDelay, Sleeper};
use crate::session::Session;
use crate::source::{Cursor, PostRecord, SearchQuery, SearchSource};

/// Where the next fetch should continue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageHandle {
    /// More results are available behind this cursor.
    Continue(Cursor),
    /// The service reported no further pages.
    Exhausted,
}

/// One page of normalised posts plus the handle for the page after it.
#[derive(Debug, Clone)]
pub struct Batch {
    pub records: Vec<PostRecord>,
    pub next: PageHandle,
}

impl Batch {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            next: PageHandle::Exhausted,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Fetches successive pages for one fixed query.
///
/// Holds the session by shared reference: it never refreshes or mutates it.
pub struct PageFetcher<'a, S: SearchSource> {
    source: &'a S,
    session: &'a Session,
    query: SearchQuery,
    delay: PageDelay,
    rng: StdRng,
}

impl<'a, S: SearchSource> PageFetcher<'a, S> {
    pub fn new(source: &'a S, session: &'a Session, query: SearchQuery, delay: PageDelay) -> Self {
        Self {
            source,
            session,
            query,
            delay,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a deterministic RNG for the inter-page delay.
    #[cfg(test)]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Fetch the page after `handle`, or the first page when it is `None`.
    ///
    /// Continuations sleep for a random [`PageDelay`] first.  A
    /// [`PageHandle::Exhausted`] handle yields an empty batch without
    /// touching the network.
    pub fn fetch(&mut self, handle: Option<&PageHandle>, sleeper: &mut dyn Sleeper) -> Result<Batch> {
        let page = match handle {
            None => self.source.search(self.session, &self.query)?,
            Some(PageHandle::Exhausted) => return Ok(Batch::empty()),
            Some(PageHandle::Continue(cursor)) => {
                let wait = self.delay.sample(&mut self.rng);
                info!("Getting next tweets after {} seconds...", wait.as_secs());
                sleeper.sleep(wait);
                self.source.next_page(self.session, &self.query, cursor)?
            }
        };

        let fetched_at = Utc::now();
        let records = page
            .posts
            .into_iter()
            .map(|post| PostRecord::from_remote(post, fetched_at))
            .collect();

        Ok(Batch {
            records,
            next: page
                .next_cursor
                .map_or(PageHandle::Exhausted, PageHandle::Continue),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::{Page, RemotePost};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// Records every requested pause instead of blocking.
    #[derive(Default)]
    pub(crate) struct RecordingSleeper(pub(crate) Vec<Duration>);

    impl Sleeper for RecordingSleeper {
        fn sleep(&mut self, duration: Duration) {
            self.0.push(duration);
        }
    }

    /// What the scripted source saw, in call order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Search,
        Next(String),
    }

    /// Replays a fixed list of responses, one per call.
    pub(crate) struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Page>>>,
        pub(crate) calls: RefCell<Vec<Call>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(responses: Vec<Result<Page>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }

        /// Pages of the given sizes, chained by cursors, then an empty page.
        pub(crate) fn with_batch_sizes(sizes: &[usize]) -> Self {
            let mut responses: Vec<Result<Page>> = sizes
                .iter()
                .enumerate()
                .map(|(i, &n)| Ok(page(n, Some(&format!("c{}", i + 1)))))
                .collect();
            responses.push(Ok(page(0, None)));
            Self::new(responses)
        }

        fn next_response(&self) -> Result<Page> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(Page::default()))
        }
    }

    impl SearchSource for ScriptedSource {
        fn search(&self, _session: &Session, _query: &SearchQuery) -> Result<Page> {
            self.calls.borrow_mut().push(Call::Search);
            self.next_response()
        }

        fn next_page(&self, _session: &Session, _query: &SearchQuery, cursor: &Cursor) -> Result<Page> {
            self.calls.borrow_mut().push(Call::Next(cursor.as_str().to_string()));
            self.next_response()
        }
    }

    pub(crate) fn page(n: usize, cursor: Option<&str>) -> Page {
        let texts = ["great ride today", "awful traffic again", "parked at the shop"];
        Page {
            posts: (0..n)
                .map(|i| RemotePost {
                    created_at: Some("Wed Dec 04 10:00:00 +0000 2024".to_string()),
                    text: format!("{} @user{i} https://t.co/{i}", texts[i % texts.len()]),
                    screen_name: format!("user{i}"),
                    retweet_count: i as u64,
                    favorite_count: 2 * i as u64,
                })
                .collect(),
            next_cursor: cursor.map(Cursor::new),
        }
    }

    pub(crate) fn query() -> SearchQuery {
        SearchQuery {
            text: "\"scram440\"".to_string(),
            product: "Latest".to_string(),
            count: 100,
        }
    }

    #[test]
    fn first_fetch_searches_without_sleeping() {
        let source = ScriptedSource::new(vec![Ok(page(2, Some("c1")))]);
        let session = Session::default();
        let mut sleeper = RecordingSleeper::default();
        let mut fetcher = PageFetcher::new(&source, &session, query(), PageDelay::default());

        let batch = fetcher.fetch(None, &mut sleeper).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.next, PageHandle::Continue(Cursor::new("c1")));
        assert_eq!(batch.records[0].clean_text, "great ride today");
        assert!(batch.records.iter().all(|r| r.sentiment.is_none()));
        assert!(sleeper.0.is_empty());
        assert_eq!(*source.calls.borrow(), [Call::Search]);
    }

    #[test]
    fn continuation_sleeps_within_bounds_then_follows_cursor() {
        let source = ScriptedSource::new(vec![Ok(page(1, None))]);
        let session = Session::default();
        let mut sleeper = RecordingSleeper::default();
        let mut fetcher = PageFetcher::new(&source, &session, query(), PageDelay::default())
            .with_rng(StdRng::seed_from_u64(42));

        let handle = PageHandle::Continue(Cursor::new("c7"));
        let batch = fetcher.fetch(Some(&handle), &mut sleeper).unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.next, PageHandle::Exhausted);
        assert_eq!(sleeper.0.len(), 1);
        assert!((5..=10).contains(&sleeper.0[0].as_secs()));
        assert_eq!(*source.calls.borrow(), [Call::Next("c7".to_string())]);
    }

    #[test]
    fn exhausted_handle_short_circuits() {
        let source = ScriptedSource::new(vec![]);
        let session = Session::default();
        let mut sleeper = RecordingSleeper::default();
        let mut fetcher = PageFetcher::new(&source, &session, query(), PageDelay::default());

        let batch = fetcher.fetch(Some(&PageHandle::Exhausted), &mut sleeper).unwrap();

        assert!(batch.is_empty());
        assert!(source.calls.borrow().is_empty());
        assert!(sleeper.0.is_empty());
    }

    #[test]
    fn source_errors_propagate() {
        let source = ScriptedSource::new(vec![Err(anyhow::anyhow!("503 Service Unavailable"))]);
        let session = Session::default();
        let mut sleeper = RecordingSleeper::default();
        let mut fetcher = PageFetcher::new(&source, &session, query(), PageDelay::default());

        let err = fetcher.fetch(None, &mut sleeper).unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
