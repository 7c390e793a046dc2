use reqwest::StatusCode;
use thiserror::Error;

/// Why a single service call failed. Every variant is terminal for its pipeline.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be built or dispatched.
    #[error("failed to create request: {0}")]
    Request(String),

    /// The request was sent but the connection failed or timed out.
    #[error("request failed in flight: {0}")]
    Transport(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not the JSON shape we expected.
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("no coordinates found for city '{city}'")]
    NotFound { city: String },

    #[error("deadline exceeded or run cancelled")]
    Cancelled,

    /// The pipeline task panicked or was aborted.
    #[error("pipeline task aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Stable class name of the error.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request(_) => "RequestError",
            FetchError::Transport(_) => "TransportError",
            FetchError::Status { .. } => "StatusError",
            FetchError::Decode { .. } => "DecodeError",
            FetchError::NotFound { .. } => "NotFoundError",
            FetchError::Cancelled => "CancelledError",
            FetchError::Aborted(_) => "AbortedError",
        }
    }

    pub(crate) fn decode(what: &'static str, err: impl std::fmt::Display) -> Self {
        FetchError::Decode {
            what,
            reason: err.to_string(),
        }
    }

    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        FetchError::Status {
            status,
            body: truncate_body(body),
        }
    }
}

/// Classify errors raised by `send()` or while reading the body.
impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::Request(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
