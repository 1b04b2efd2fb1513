use serde::{Deserialize, Serialize};

/// The body of a `POST /api/query` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryRequest {
    /// The user's question, already trimmed.
    pub text: String,
}

impl QueryRequest {
    /// Creates a new request for the given question.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
