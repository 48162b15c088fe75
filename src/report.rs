//! Sentiment distribution over every collected batch.

use std::fmt::Write as _;

use anyhow::Result;
use tracing::info;

use crate::sentiment::Sentiment;
use crate::source::PostRecord;
use crate::store::BatchStore;

/// Share of one label among the labelled rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: Sentiment,
    pub count: usize,
    /// Percentage of labelled rows, rounded to one decimal.
    pub percent: f64,
}

/// Label shares, most frequent first.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub total: usize,
    pub shares: Vec<Share>,
}

impl Distribution {
    /// Tally the labels of `records`.  Unlabelled rows are ignored; returns
    /// `None` when nothing is labelled.
    ///
    /// Ties keep the order in which labels were first seen.
    pub fn from_records(records: &[PostRecord]) -> Option<Self> {
        let mut counts: Vec<(Sentiment, usize)> = Vec::new();
        for label in records.iter().filter_map(|r| r.sentiment) {
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }

        let total: usize = counts.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return None;
        }

        // Stable sort, so equal counts stay in encounter order.
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let shares = counts
            .into_iter()
            .map(|(label, count)| Share {
                label,
                count,
                percent: round1(count as f64 * 100.0 / total as f64),
            })
            .collect();

        Some(Self { total, shares })
    }

    /// Plain-text report printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = String::from("\nSentiment Distribution :\n");
        out.push_str(&"=".repeat(25));
        out.push('\n');
        for share in &self.shares {
            let _ = writeln!(out, "{:<10}{:>7.1}", share.label.as_str(), share.percent);
        }
        out
    }
}

/// Halves round to even, so 6.25 becomes 6.2.
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Read every batch in `store` and compute the distribution.
///
/// An empty store is not an error: it is logged and yields `None`.
pub fn aggregate(store: &BatchStore) -> Result<Option<Distribution>> {
    let records = store.read_all()?;
    let distribution = Distribution::from_records(&records);
    if distribution.is_none() {
        info!("No tweets fetched");
    }
    Ok(distribution)
}
