//! Conversation client for a remote question-answering service (config, HTTP
//! exchange, session state, transcript view). Used by the `qa-chat` CLI.

pub mod client;
pub mod config;
pub mod messages;
pub mod scroll;
pub mod session;
pub mod upload;
pub mod view;

pub use client::{AnswerService, HttpClient, ServiceError};
pub use config::{default_config_path, ChatSection, Config, ConfigError, ServiceSection};
pub use scroll::{ScrollFollow, Viewport};
pub use session::{
    Message, Rejection, Sender, SessionController, SessionOptions, SessionStatus, Submission,
    FALLBACK_ERROR_TEXT,
};
pub use upload::UploadForm;
pub use view::TranscriptView;
