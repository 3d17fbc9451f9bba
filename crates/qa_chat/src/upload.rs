//! File upload flow: select a file, post it, show the service's reply.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::client::HttpClient;

pub const NO_FILE_TEXT: &str = "Please select a file";
pub const UPLOAD_FAILED_TEXT: &str = "Upload failed";

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    file: Option<PathBuf>,
    status: String,
    uploaded: bool,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the file to upload. Clears the previous status.
    pub fn select(&mut self, path: impl Into<PathBuf>) {
        self.file = Some(path.into());
        self.status.clear();
        self.uploaded = false;
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Last status text; empty before the first attempt.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether the last attempt succeeded.
    pub fn uploaded(&self) -> bool {
        self.uploaded
    }

    /// Post the selected file and return the resulting status text.
    pub async fn submit(&mut self, client: &HttpClient) -> &str {
        self.uploaded = false;
        let Some(path) = self.file.as_deref() else {
            self.status = NO_FILE_TEXT.to_string();
            return &self.status;
        };
        self.status = match client.upload(path).await {
            Ok(reply) => {
                self.uploaded = true;
                reply.message
            }
            Err(error) => {
                warn!(%error, "upload failed");
                error.display_text(UPLOAD_FAILED_TEXT).to_string()
            }
        };
        &self.status
    }
}
