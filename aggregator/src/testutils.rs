use crate::errors::FetchError;
use crate::source::PostSource;
use crate::types::Post;
use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use bytes::Bytes;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use tokio::net::TcpListener;

/// Builds one post per id, all carrying `tag`.
pub fn make_posts(tag: &str, ids: impl IntoIterator<Item = i64>) -> Vec<Post> {
    ids.into_iter()
        .map(|id| Post {
            author: format!("author{}", id.rem_euclid(5)),
            author_id: id.rem_euclid(5),
            id,
            likes: (id.unsigned_abs() * 37) % 101,
            popularity: (id.unsigned_abs() * 13 % 100) as f64 / 100.0,
            reads: (id.unsigned_abs() * 7919) % 10007,
            tags: vec![tag.to_string()],
        })
        .collect()
}

enum Scripted {
    Body(Bytes),
    Failure(FetchError),
    Panic,
}

/// In-memory provider with scripted responses per tag.
///
/// Tags without a script answer with an empty post list, like the real provider.
#[derive(Default)]
pub struct StaticSource {
    responses: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(self, tag: &str, posts: Vec<Post>) -> Self {
        let body = serde_json::json!({ "posts": posts }).to_string();
        self.with_body(tag, &body)
    }

    pub fn with_body(mut self, tag: &str, body: &str) -> Self {
        self.responses
            .insert(tag.to_string(), Scripted::Body(Bytes::from(body.to_string())));
        self
    }

    pub fn with_failure(mut self, tag: &str, error: FetchError) -> Self {
        self.responses
            .insert(tag.to_string(), Scripted::Failure(error));
        self
    }

    /// Makes the transport panic for `tag`, as a buggy client would.
    pub fn with_panic(mut self, tag: &str) -> Self {
        self.responses.insert(tag.to_string(), Scripted::Panic);
        self
    }

    pub fn with_delay(mut self, tag: &str, delay: Duration) -> Self {
        self.delays.insert(tag.to_string(), delay);
        self
    }

    /// Tags requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSource for StaticSource {
    async fn fetch_raw(&self, tag: &str) -> Result<Bytes, FetchError> {
        self.calls.lock().unwrap().push(tag.to_string());

        if let Some(delay) = self.delays.get(tag) {
            tokio::time::sleep(*delay).await;
        }

        match self.responses.get(tag) {
            Some(Scripted::Body(body)) => Ok(body.clone()),
            Some(Scripted::Failure(error)) => Err(error.clone()),
            Some(Scripted::Panic) => panic!("source panicked for tag {tag}"),
            None => Ok(Bytes::from_static(br#"{"posts":[]}"#)),
        }
    }
}

async fn provider_handler(Query(params): Query<HashMap<String, String>>) -> Response {
    let tag = params.get("tag").cloned().unwrap_or_default();

    match tag.as_str() {
        "broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(serde_json::json!({ "posts": make_posts(&tag, [1]) })).into_response()
        }
        _ => Json(serde_json::json!({ "posts": make_posts(&tag, [1, 2]) })).into_response(),
    }
}

/// Starts a mock provider on an ephemeral port and returns its address.
pub async fn spawn_provider() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().unwrap();

    let app = Router::new().route("/assessment/blog/posts", get(provider_handler));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}
