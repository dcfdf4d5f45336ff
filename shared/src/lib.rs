pub mod metrics_defs;

// Re-exported so the metric macros resolve from any crate depending on `shared`.
pub use metrics;
