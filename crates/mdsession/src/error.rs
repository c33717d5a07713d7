use thiserror::Error;

/// A search pattern that does not compile as a regular expression.
#[derive(Debug, Error)]
#[error("invalid search pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}
