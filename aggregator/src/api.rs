use crate::aggregator::Aggregator;
use crate::types::{AggregationRequest, SortDirection, SortField};
use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use http::{HeaderName, HeaderValue, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lists the tags that could not be resolved, comma separated.
pub const FAILED_TAGS_HEADER: HeaderName = HeaderName::from_static("x-failed-tags");

#[derive(Serialize)]
struct PingResponse {
    success: bool,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ApiError {
    #[error("Tags parameter is required")]
    MissingTags,
    #[error("sortBy parameter is invalid")]
    InvalidSortBy,
    #[error("direction parameter is invalid")]
    InvalidDirection,
}

#[derive(Serialize)]
struct ApiErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse {
            error: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostsParams {
    pub tags: Option<String>,
    pub sort_by: Option<String>,
    pub direction: Option<String>,
}

impl PostsParams {
    /// Turns raw query parameters into an aggregation request.
    ///
    /// Missing or empty `sortBy` and `direction` fall back to `id` and `asc`.
    pub fn validate(&self) -> Result<AggregationRequest, ApiError> {
        let tags = match self.tags.as_deref() {
            Some(tags) if !tags.is_empty() => tags.split(',').map(str::to_string).collect(),
            _ => return Err(ApiError::MissingTags),
        };

        let sort_by = match non_empty(&self.sort_by) {
            Some(s) => s.parse::<SortField>().map_err(|_| ApiError::InvalidSortBy)?,
            None => SortField::default(),
        };

        let direction = match non_empty(&self.direction) {
            Some(s) => s
                .parse::<SortDirection>()
                .map_err(|_| ApiError::InvalidDirection)?,
            None => SortDirection::default(),
        };

        Ok(AggregationRequest::new(tags).sorted_by(sort_by, direction))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/api/ping", get(ping))
        .route("/api/posts", get(posts))
        .with_state(aggregator)
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { success: true })
}

async fn posts(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<PostsParams>,
) -> Result<Response, ApiError> {
    let request = params.validate()?;
    let result = aggregator.aggregate(&request).await;

    tracing::info!(
        tags = request.tags.len(),
        posts = result.posts.len(),
        failed = result.failures.len(),
        "blog posts retrieved"
    );

    let failed_tags = result.failed_tags().collect::<Vec<_>>().join(",");
    let mut response = Json(result.posts).into_response();

    if !failed_tags.is_empty() {
        // Tags that cannot be represented in a header are still in the log
        if let Ok(value) = HeaderValue::from_str(&failed_tags) {
            response.headers_mut().insert(FAILED_TAGS_HEADER, value);
        }
    }

    Ok(response)
}
