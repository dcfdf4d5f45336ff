use crate::cache::PostCache;
use crate::errors::FetchError;
use crate::metrics_defs::FETCH_DURATION;
use crate::source::PostSource;
use crate::types::Post;
use serde_json::Value;
use shared::histogram;
use std::sync::Arc;
use tokio::time::Instant;

/// Key under which the provider nests the post list.
pub const POSTS_KEY: &str = "posts";

/// Performs one remote lookup per call and refreshes the cache on success.
///
/// The fetcher never reads the cache, deciding whether a fetch is needed is
/// up to the caller.
pub struct Fetcher {
    source: Arc<dyn PostSource>,
    cache: Arc<PostCache>,
}

impl Fetcher {
    pub fn new(source: Arc<dyn PostSource>, cache: Arc<PostCache>) -> Self {
        Fetcher { source, cache }
    }

    pub async fn fetch(&self, tag: &str) -> Result<Arc<[Post]>, FetchError> {
        let start = Instant::now();

        let body = self.source.fetch_raw(tag).await?;
        let posts: Arc<[Post]> = decode_posts(strip_envelope(&body)?)?.into();

        // Only a fully decoded payload reaches the cache
        self.cache.put(tag, posts.clone());

        histogram!(FETCH_DURATION).record(start.elapsed().as_secs_f64());
        tracing::debug!(tag, count = posts.len(), "fetched posts from provider");

        Ok(posts)
    }
}

/// Extracts the post array from the provider's response envelope.
pub fn strip_envelope(body: &[u8]) -> Result<Vec<Value>, FetchError> {
    let mut envelope: serde_json::Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    match envelope.remove(POSTS_KEY) {
        Some(Value::Array(posts)) => Ok(posts),
        Some(_) => Err(FetchError::MalformedResponse(format!(
            "`{POSTS_KEY}` is not an array"
        ))),
        None => Err(FetchError::MalformedResponse(format!(
            "missing `{POSTS_KEY}` key"
        ))),
    }
}

/// Decodes every element of a stripped envelope, failing on the first bad one.
pub fn decode_posts(values: Vec<Value>) -> Result<Vec<Post>, FetchError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value(value).map_err(|e| FetchError::DecodeError {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}
