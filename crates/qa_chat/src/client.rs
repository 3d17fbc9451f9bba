//! HTTP client for the answer service: `POST /query` and `POST /upload`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::messages::{ErrorBody, QueryRequest, QueryResponse, UploadResponse};

/// Why an exchange with the answer service did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Non-2xx status. `message` is the body's `error` field when present.
    #[error("service returned status {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

impl ServiceError {
    /// Error text supplied by the service, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ServiceError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's text, else `fallback`.
    pub fn display_text<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Malformed(e.to_string())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

/// The remote service that turns a query into an answer.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn query(&self, request: QueryRequest<'_>) -> Result<QueryResponse, ServiceError>;
}

/// reqwest-backed answer service client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Build a client for `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Upload one file as multipart field `file`.
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse, ServiceError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ServiceError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".into());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        debug!(path = %path.display(), "uploading file");
        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl AnswerService for HttpClient {
    async fn query(&self, request: QueryRequest<'_>) -> Result<QueryResponse, ServiceError> {
        debug!(session_id = ?request.session_id, "sending query");
        let response = self
            .http
            .post(self.endpoint("query"))
            .json(&request)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let message = ErrorBody::message_from_slice(&body);
        warn!(status = status.as_u16(), error = ?message, "service rejected request");
        return Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_slice(&body).map_err(|e| ServiceError::Malformed(e.to_string()))
}
