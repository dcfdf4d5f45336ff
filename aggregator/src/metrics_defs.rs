//! Metrics definitions for the aggregator.

use shared::metrics_defs::{MetricDef, MetricType};

pub const CACHE_HIT: MetricDef = MetricDef {
    name: "cache.hit",
    metric_type: MetricType::Counter,
    description: "Number of tag lookups served from a fresh cache entry",
};

pub const CACHE_STALE: MetricDef = MetricDef {
    name: "cache.stale",
    metric_type: MetricType::Counter,
    description: "Number of tag lookups that found an expired cache entry",
};

pub const CACHE_MISS: MetricDef = MetricDef {
    name: "cache.miss",
    metric_type: MetricType::Counter,
    description: "Number of tag lookups with no cache entry",
};

pub const FETCH_DURATION: MetricDef = MetricDef {
    name: "fetch.duration",
    metric_type: MetricType::Histogram,
    description: "Time to fetch and decode the posts of one tag in seconds",
};

pub const FETCH_FAILURE: MetricDef = MetricDef {
    name: "fetch.failure",
    metric_type: MetricType::Counter,
    description: "Number of tags that could not be resolved during an aggregation",
};

pub const AGGREGATE_POSTS: MetricDef = MetricDef {
    name: "aggregate.posts",
    metric_type: MetricType::Histogram,
    description: "Number of posts returned by a single aggregation",
};

pub const ALL_METRICS: &[MetricDef] = &[
    CACHE_HIT,
    CACHE_STALE,
    CACHE_MISS,
    FETCH_DURATION,
    FETCH_FAILURE,
    AGGREGATE_POSTS,
];
