use serde::{Deserialize, Serialize};

/// The body of a successful `POST /api/query` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryResponse {
    /// The answer, written in the lightweight markup dialect.
    pub response: String,
}

impl QueryResponse {
    /// Creates a new response.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// The optional body of a failed `POST /api/query` response.
///
/// The backend reuses the `response` field for its human-readable error.  Anything that is not a
/// non-empty string is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// The human-readable failure, if the backend sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Parses an error body, returning `None` when it is not JSON.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Returns the human-readable message, if present and non-empty.
    pub fn message(&self) -> Option<&str> {
        self.response
            .as_ref()
            .and_then(|value| value.as_str())
            .filter(|message| !message.is_empty())
    }
}
