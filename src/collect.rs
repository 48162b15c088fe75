//! The collection loop.
//!
//! Repeatedly asks the [`PageFetcher`] for the next page, labels every post,
//! and writes each batch to its own file.  The loop stops when the target
//! count is reached, when the service runs out of results, or when fetches
//! keep failing past the [`RetryPolicy`] budget.
//!
//! ## For contributors
//!
//! The loop is strictly sequential: one fetch, one label pass, one file,
//! in that order, on the calling thread.  Batches land on disk in fetch
//! order and rows keep the order the service returned them in.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::fetch::{PageFetcher, PageHandle};
use crate::pacing::{RetryPolicy, Sleeper};
use crate::sentiment::{Classifier, PolarityModel};
use crate::source::SearchSource;
use crate::store::BatchStore;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `collected_total` reached the configured minimum.
    TargetReached,
    /// The service returned an empty page.
    Exhausted,
    /// Consecutive fetch failures exceeded the retry budget.
    RetriesExhausted,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct CollectSummary {
    pub collected_total: u64,
    /// Batch files in the order they were written.
    pub files: Vec<PathBuf>,
    pub stop_reason: StopReason,
}

/// Drives fetch, label and persist until a stop condition is met.
pub struct Collector<'a, S: SearchSource, M: PolarityModel> {
    fetcher: PageFetcher<'a, S>,
    classifier: &'a Classifier<M>,
    store: &'a BatchStore,
    sleeper: &'a mut dyn Sleeper,
    retry: RetryPolicy,
    minimum_posts: u64,
}

impl<'a, S: SearchSource, M: PolarityModel> Collector<'a, S, M> {
    pub fn new(
        fetcher: PageFetcher<'a, S>,
        classifier: &'a Classifier<M>,
        store: &'a BatchStore,
        sleeper: &'a mut dyn Sleeper,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            store,
            sleeper,
            retry: RetryPolicy::default(),
            minimum_posts: u64::MAX,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_minimum(mut self, minimum_posts: u64) -> Self {
        self.minimum_posts = minimum_posts;
        self
    }

    /// Run until a stop condition is met.
    ///
    /// Fetch errors are logged and retried with backoff from the same
    /// handle; they never fail the run.  Failing to write a batch file does.
    pub fn run(mut self) -> Result<CollectSummary> {
        info!("Start fetching tweets");

        let mut collected_total: u64 = 0;
        let mut handle: Option<PageHandle> = None;
        let mut failures: u32 = 0;
        let mut files = Vec::new();

        let stop_reason = loop {
            if collected_total >= self.minimum_posts {
                break StopReason::TargetReached;
            }

            let mut batch = match self.fetcher.fetch(handle.as_ref(), &mut *self.sleeper) {
                Ok(batch) => {
                    failures = 0;
                    batch
                }
                Err(err) => {
                    failures += 1;
                    warn!(attempt = failures, "Fetch failed: {err:#}");
                    match self.retry.backoff(failures) {
                        Some(delay) => {
                            info!("Retrying in {} ms", delay.as_millis());
                            self.sleeper.sleep(delay);
                            continue;
                        }
                        None => {
                            error!(failures, "Giving up after repeated fetch failures");
                            break StopReason::RetriesExhausted;
                        }
                    }
                }
            };

            if batch.is_empty() {
                info!("No tweets fetched");
                break StopReason::Exhausted;
            }

            for record in &mut batch.records {
                collected_total += 1;
                debug!(author = %record.author_handle, text = %record.clean_text, "post");
                record.sentiment = Some(self.classifier.classify(&record.raw_text));
            }
            info!("Got {collected_total} tweets");

            let path = self.store.write_batch(&batch.records)?;
            info!(path = %path.display(), "{} tweets saved", batch.len());
            files.push(path);
            handle = Some(batch.next);
        };

        info!(?stop_reason, "Total {collected_total} tweets fetched");
        Ok(CollectSummary {
            collected_total,
            files,
            stop_reason,
        })
    }
}
