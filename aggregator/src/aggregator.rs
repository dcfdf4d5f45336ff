//! Concurrent resolution of many tags into one sorted post list.

use crate::cache::PostCache;
use crate::errors::FetchError;
use crate::fetcher::Fetcher;
use crate::metrics_defs::{AGGREGATE_POSTS, FETCH_FAILURE};
use crate::sorter::sort_posts;
use crate::source::PostSource;
use crate::types::{AggregationRequest, AggregationResult, Post, TagFailure};
use shared::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DEADLINE_SECS: u64 = 30;

/// Time limits applied while resolving tags.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeouts {
    /// Upper bound for a single tag's fetch.
    pub fetch: Duration,
    /// Upper bound for the whole aggregation. Tags still running when it
    /// expires are reported as timed out.
    pub deadline: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            fetch: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

/// Outcome of a single tag, owned by the task that produced it.
struct TagOutcome {
    tag: String,
    result: Result<Arc<[Post]>, FetchError>,
}

/// Resolves every requested tag in parallel, serving fresh cache entries
/// directly and fetching the rest.
///
/// A failed tag never fails the aggregation, it is reported alongside the
/// posts of the tags that succeeded.
pub struct Aggregator {
    cache: Arc<PostCache>,
    fetcher: Arc<Fetcher>,
    timeouts: Timeouts,
}

impl Aggregator {
    pub fn new(cache: Arc<PostCache>, source: Arc<dyn PostSource>, timeouts: Timeouts) -> Self {
        let fetcher = Arc::new(Fetcher::new(source, cache.clone()));
        Aggregator {
            cache,
            fetcher,
            timeouts,
        }
    }

    pub fn cache(&self) -> &Arc<PostCache> {
        &self.cache
    }

    pub async fn aggregate(&self, request: &AggregationRequest) -> AggregationResult {
        let outcomes = self.resolve_all(&request.tags).await;

        // Single reconciliation point, every outcome is owned by this call
        let mut result = AggregationResult::default();
        for outcome in outcomes {
            match outcome.result {
                Ok(posts) => result.posts.extend(posts.iter().cloned()),
                Err(error) => {
                    tracing::warn!(tag = %outcome.tag, kind = error.kind(), "failed to resolve tag: {error}");
                    counter!(FETCH_FAILURE).increment(1);
                    result.failures.push(TagFailure {
                        tag: outcome.tag,
                        error,
                    });
                }
            }
        }

        sort_posts(&mut result.posts, request.sort_by, request.direction);
        histogram!(AGGREGATE_POSTS).record(result.posts.len() as f64);

        result
    }

    /// Spawns one task per tag and waits for all of them, up to the deadline.
    /// Returns exactly one outcome per requested tag.
    async fn resolve_all(&self, tags: &[String]) -> Vec<TagOutcome> {
        let mut join_set = JoinSet::new();
        // Tracks running tasks so that panicked or unfinished ones can still
        // be attributed to their tag.
        let mut pending: HashMap<tokio::task::Id, String> = HashMap::new();

        for tag in tags {
            let cache = self.cache.clone();
            let fetcher = self.fetcher.clone();
            let fetch_timeout = self.timeouts.fetch;
            let task_tag = tag.clone();

            let abort_handle = join_set.spawn(async move {
                let result = resolve_tag(&cache, &fetcher, &task_tag, fetch_timeout).await;
                TagOutcome {
                    tag: task_tag,
                    result,
                }
            });

            pending.insert(abort_handle.id(), tag.clone());
        }

        let mut outcomes = Vec::with_capacity(tags.len());

        let deadline = sleep(self.timeouts.deadline);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                join_result = join_set.join_next_with_id() => {
                    match join_result {
                        Some(Ok((id, outcome))) => {
                            pending.remove(&id);
                            outcomes.push(outcome);
                        }
                        Some(Err(e)) => {
                            let tag = pending.remove(&e.id()).unwrap_or_default();
                            tracing::error!(tag = %tag, "Task panicked: {}", e);
                            outcomes.push(TagOutcome {
                                tag,
                                result: Err(FetchError::Internal(e.to_string())),
                            });
                        }
                        // No more tasks
                        None => break,
                    }
                }
            }
        }

        // Whatever is left missed the deadline
        join_set.abort_all();
        for (_, tag) in pending.drain() {
            outcomes.push(TagOutcome {
                result: Err(FetchError::Timeout(tag.clone())),
                tag,
            });
        }

        outcomes
    }
}

async fn resolve_tag(
    cache: &PostCache,
    fetcher: &Fetcher,
    tag: &str,
    fetch_timeout: Duration,
) -> Result<Arc<[Post]>, FetchError> {
    match cache.get(tag) {
        Some(cached) if cached.fresh => {
            tracing::debug!(tag, "cache hit");
            return Ok(cached.posts);
        }
        Some(_) => tracing::debug!(tag, "cache entry expired, refetching"),
        None => tracing::debug!(tag, "cache miss"),
    }

    timeout(fetch_timeout, fetcher.fetch(tag))
        .await
        .map_err(|_| FetchError::Timeout(tag.to_string()))?
}
