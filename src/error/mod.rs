mod oauth;
mod upstream;

pub use oauth::OauthError;
pub(crate) use oauth::truncate_body;
pub(crate) use upstream::classify_upstream_error;
pub use upstream::UPSTREAM_BODY_PREVIEW_CHARS;

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error as ThisError;
use vertexbatch_schema::GoogleErrorObject;

#[derive(Debug, ThisError)]
pub enum BatchError {
    /// Required settings are missing or empty; raised before any side effect.
    #[error("missing required configuration: {}", .missing.join(", "))]
    MissingConfig { missing: Vec<&'static str> },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Oauth(#[from] OauthError),

    /// Upstream returned a standard Google error envelope.
    #[error("upstream error: status={status} {}: {}", .body.status, .body.message)]
    UpstreamMapped {
        status: StatusCode,
        body: GoogleErrorObject,
    },

    /// Upstream returned an error without a parseable envelope.
    #[error("upstream fallback error: status={status}, body={body:.200}")]
    UpstreamFallback { status: StatusCode, body: String },

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid gs:// uri: {0}")]
    InvalidGcsUri(String),

    /// A prediction row did not have the expected shape.
    #[error("malformed prediction row at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("batch job {name} did not finish within {waited:?}")]
    PollTimeout { name: String, waited: Duration },

    #[error("interrupted by signal")]
    Interrupted,
}

impl BatchError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        BatchError::MalformedRow {
            line,
            message: message.into(),
        }
    }
}
