//! Conversation session: transcript, session token, and the single in-flight request gate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::{AnswerService, ServiceError};
use crate::messages::{QueryRequest, QueryResponse};

/// Shown when a failed exchange carries no text from the service.
pub const FALLBACK_ERROR_TEXT: &str = "Query failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Human,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Human,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// Why a submission was dropped without touching the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Text was empty after trimming.
    Empty,
    /// Another submission is still awaiting its response.
    Busy,
}

/// Outcome of [`SessionController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Rejected(Rejection),
    Answered(Message),
    /// The exchange failed; `reply` is the message appended in place of an answer.
    Failed { error: ServiceError, reply: Message },
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Submission::Rejected(_))
    }

    /// Assistant message appended for this submission, if it was accepted.
    pub fn reply(&self) -> Option<&Message> {
        match self {
            Submission::Rejected(_) => None,
            Submission::Answered(reply) | Submission::Failed { reply, .. } => Some(reply),
        }
    }
}

/// Published to subscribers whenever the transcript grows or `pending` flips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub messages: usize,
    pub pending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Initial assistant message.
    pub greeting: Option<String>,
    /// `None` waits for the service indefinitely.
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Vec<Message>,
    session_id: Option<String>,
    pending: bool,
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        SessionStatus {
            messages: self.transcript.len(),
            pending: self.pending,
        }
    }

    fn adopt_session(&mut self, response: &QueryResponse) {
        let Some(token) = response.session_token() else {
            return;
        };
        match &self.session_id {
            None => {
                info!(session_id = token, "adopted session");
                self.session_id = Some(token.to_string());
            }
            Some(current) if current != token => {
                warn!(
                    current = current.as_str(),
                    received = token,
                    "ignoring session id from service; session already established"
                );
            }
            Some(_) => {}
        }
    }
}

/// Owns one conversation with the answer service.
///
/// `submit` takes `&self`; share the controller by reference or `Arc` with
/// whatever renders it. At most one request is in flight; submissions made
/// meanwhile are rejected, not queued.
pub struct SessionController {
    service: Arc<dyn AnswerService>,
    state: Mutex<SessionState>,
    request_timeout: Option<Duration>,
    status: watch::Sender<SessionStatus>,
}

impl SessionController {
    pub fn new(service: Arc<dyn AnswerService>, options: SessionOptions) -> Self {
        let mut state = SessionState::default();
        if let Some(greeting) = options.greeting {
            state.transcript.push(Message::assistant(greeting));
        }
        let (status, _) = watch::channel(state.status());
        Self {
            service,
            state: Mutex::new(state),
            request_timeout: options.request_timeout,
            status,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &SessionState) {
        self.status.send_replace(state.status());
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Send `text` to the answer service and fold the outcome into the transcript.
    ///
    /// Appends the human message before the request goes out and exactly one
    /// assistant message once it settles. Empty text, or text submitted while
    /// another request is pending, is rejected with the session untouched.
    pub async fn submit(&self, text: &str) -> Submission {
        if text.trim().is_empty() {
            return Submission::Rejected(Rejection::Empty);
        }

        let session_id = {
            let mut state = self.lock();
            if state.pending {
                debug!("submission rejected: request already in flight");
                return Submission::Rejected(Rejection::Busy);
            }
            state.transcript.push(Message::human(text));
            state.pending = true;
            self.publish(&state);
            state.session_id.clone()
        };

        let in_flight = InFlight { controller: self, settled: false };
        let request = QueryRequest::new(text, session_id.as_deref());
        let outcome = match self.request_timeout {
            Some(limit) => tokio::time::timeout(limit, self.service.query(request))
                .await
                .unwrap_or(Err(ServiceError::Timeout(limit))),
            None => self.service.query(request).await,
        };

        match outcome {
            Ok(response) => {
                let reply = Message::assistant(response.response.as_str());
                in_flight.settle(Some(&response), reply.clone());
                Submission::Answered(reply)
            }
            Err(error) => {
                warn!(%error, "query failed");
                let reply = Message::assistant(error.display_text(FALLBACK_ERROR_TEXT));
                in_flight.settle(None, reply.clone());
                Submission::Failed { error, reply }
            }
        }
    }
}

/// Clears `pending` when a submission settles, or when its future is dropped
/// first, in which case the fallback reply is appended.
struct InFlight<'a> {
    controller: &'a SessionController,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, response: Option<&QueryResponse>, reply: Message) {
        self.settled = true;
        let mut state = self.controller.lock();
        if let Some(response) = response {
            state.adopt_session(response);
        }
        state.transcript.push(reply);
        state.pending = false;
        self.controller.publish(&state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("submission dropped before the service replied");
        let mut state = self.controller.lock();
        state.transcript.push(Message::assistant(FALLBACK_ERROR_TEXT));
        state.pending = false;
        self.controller.publish(&state);
    }
}
