//! HTTP message types for the answer service. Client ↔ server JSON.

use serde::{Deserialize, Serialize};

/// Client → server: body of `POST /query`.
///
/// `session_id` is always serialized; a conversation without a session sends `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub session_id: Option<&'a str>,
}

impl<'a> QueryRequest<'a> {
    pub fn new(query: &'a str, session_id: Option<&'a str>) -> Self {
        Self { query, session_id }
    }
}

/// Server → client: successful answer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl QueryResponse {
    /// Session token carried by this response, if it carries a usable one.
    pub fn session_token(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Server → client: body of a non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse an error body leniently. Anything unreadable yields no message.
    pub fn message_from_slice(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
    }
}

/// Server → client: successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}
