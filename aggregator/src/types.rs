use crate::errors::FetchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single blog post as returned by the provider.
///
/// Field order matches the provider's wire order so that a decoded post
/// serializes back to the same object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub author: String,
    pub author_id: i64,
    pub id: i64,
    pub likes: u64,
    pub popularity: f64,
    pub reads: u64,
    pub tags: Vec<String>,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),
    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),
}

/// Field a result set can be ordered by.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Id,
    Reads,
    Likes,
    Popularity,
}

impl SortField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Reads => "reads",
            SortField::Likes => "likes",
            SortField::Popularity => "popularity",
        }
    }
}

impl FromStr for SortField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "reads" => Ok(SortField::Reads),
            "likes" => Ok(SortField::Likes),
            "popularity" => Ok(SortField::Popularity),
            other => Err(ParseError::InvalidSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ParseError::InvalidSortDirection(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregation call. Tags are processed independently, duplicates included.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregationRequest {
    pub tags: Vec<String>,
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl AggregationRequest {
    pub fn new(tags: Vec<String>) -> Self {
        AggregationRequest {
            tags,
            sort_by: SortField::default(),
            direction: SortDirection::default(),
        }
    }

    pub fn sorted_by(mut self, sort_by: SortField, direction: SortDirection) -> Self {
        self.sort_by = sort_by;
        self.direction = direction;
        self
    }
}

/// A tag whose posts could not be retrieved.
#[derive(Clone, Debug, PartialEq)]
pub struct TagFailure {
    pub tag: String,
    pub error: FetchError,
}

/// Merged and sorted posts of every tag that succeeded, plus the tags that did not.
#[derive(Debug, Default)]
pub struct AggregationResult {
    pub posts: Vec<Post>,
    pub failures: Vec<TagFailure>,
}

impl AggregationResult {
    pub fn failed_tags(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.tag.as_str())
    }
}
