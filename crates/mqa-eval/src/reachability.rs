//! Concurrent URL reachability probing.
//!
//! Each distinct URL is probed once by a bounded pool of concurrent
//! requests. A URL is reachable when it answers with a status in
//! `[200, 400)`; timeouts and transport errors make it unreachable and are
//! never raised. Reachable URLs contribute their full occurrence count.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use mqa_core::ValueCount;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Checks whether a single URL answers.
#[async_trait]
pub trait UrlProbe: Send + Sync {
    async fn is_reachable(&self, url: &str) -> bool;
}

/// Probes URLs with an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn is_reachable(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let reachable = (200..400).contains(&status);
                if !reachable {
                    debug!(url, status, "url answered with error status");
                }
                reachable
            }
            Err(err) => {
                debug!(url, error = %err, "url probe failed");
                false
            }
        }
    }
}

/// A URL that did not answer, with the number of resources citing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableUrl {
    pub url: String,
    pub occurrences: u64,
}

/// Aggregated probe results for one property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachabilityOutcome {
    /// Sum of occurrence counts of reachable URLs.
    pub reachable_occurrences: u64,
    pub distinct_urls: usize,
    /// Sorted by URL.
    pub unreachable: Vec<UnreachableUrl>,
}

/// Bounded-concurrency prober over grouped URL values.
pub struct ReachabilityProber<'a> {
    probe: &'a dyn UrlProbe,
    pool_size: usize,
}

impl<'a> ReachabilityProber<'a> {
    pub fn new(probe: &'a dyn UrlProbe, pool_size: usize) -> Self {
        Self {
            probe,
            pool_size: pool_size.max(1),
        }
    }

    /// Probe every distinct URL and wait for all of them.
    pub async fn probe_all(&self, values: Vec<ValueCount>) -> ReachabilityOutcome {
        let distinct_urls = values.len();
        let probe = self.probe;
        let results: Vec<(ValueCount, bool)> = stream::iter(values)
            .map(|value| async move {
                let reachable = probe.is_reachable(&value.value).await;
                (value, reachable)
            })
            .buffer_unordered(self.pool_size)
            .collect()
            .await;

        let mut outcome = ReachabilityOutcome {
            distinct_urls,
            ..ReachabilityOutcome::default()
        };
        for (value, reachable) in results {
            if reachable {
                outcome.reachable_occurrences += value.occurrences;
            } else {
                debug!(event = "url_unreachable", url = %value.value, occurrences = value.occurrences);
                outcome.unreachable.push(UnreachableUrl {
                    url: value.value,
                    occurrences: value.occurrences,
                });
            }
        }
        outcome.unreachable.sort_by(|a, b| a.url.cmp(&b.url));
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeProbe {
        reachable: HashSet<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn new(reachable: &[&str]) -> Self {
            Self {
                reachable: reachable.iter().map(|url| url.to_string()).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl UrlProbe for FakeProbe {
        async fn is_reachable(&self, url: &str) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(url.to_string());
            self.reachable.contains(url)
        }
    }

    fn value(url: &str, occurrences: u64) -> ValueCount {
        ValueCount {
            value: url.to_string(),
            occurrences,
        }
    }

    #[tokio::test]
    async fn sums_occurrences_of_reachable_urls() {
        let probe = FakeProbe::new(&["http://example.org/shared"]);
        let prober = ReachabilityProber::new(&probe, 10);
        let outcome = prober
            .probe_all(vec![
                value("http://example.org/shared", 2),
                value("http://example.org/broken", 1),
            ])
            .await;

        assert_eq!(outcome.reachable_occurrences, 2);
        assert_eq!(outcome.distinct_urls, 2);
        assert_eq!(
            outcome.unreachable,
            vec![UnreachableUrl {
                url: "http://example.org/broken".to_string(),
                occurrences: 1,
            }]
        );
    }

    #[tokio::test]
    async fn concurrency_stays_within_pool() {
        let probe = FakeProbe::new(&[]);
        let prober = ReachabilityProber::new(&probe, 3);
        let values = (0..12)
            .map(|index| value(&format!("http://example.org/{index}"), 1))
            .collect();
        let outcome = prober.probe_all(values).await;

        assert_eq!(outcome.unreachable.len(), 12);
        assert!(probe.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(probe.seen.lock().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn zero_pool_size_still_probes() {
        let probe = FakeProbe::new(&["http://example.org/a"]);
        let prober = ReachabilityProber::new(&probe, 0);
        let outcome = prober.probe_all(vec![value("http://example.org/a", 4)]).await;
        assert_eq!(outcome.reachable_occurrences, 4);
    }
}
