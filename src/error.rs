// src/error.rs

/// Failures that abort a whole aggregation cycle. Anything below this level
/// (a dead source, an unparseable date) is recovered where it happens.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no feed sources configured")]
    NoSources,
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
    #[error("aggregation aborted: {0}")]
    Aborted(String),
}
