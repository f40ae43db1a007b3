//! Interactive chat loop.
//!
//! The loop alternates between waiting for operator input and waiting for the
//! invoker. Each completed exchange appends exactly one user message followed
//! by exactly one assistant message; a failed invoke appends nothing.

mod input;

pub use input::{LineInput, StdinInput};

use crate::error::{ErrorCode, OperationError, ProviderError};
use crate::provider::Invoker;
use crate::render::RenderSink;
use crate::session::{Session, SessionStore};
use crate::tui::settings;
use crate::types::{ChatParams, OperationRequest, OperationResult};
use serde_json::json;

/// Literal (case-insensitive) that ends the loop.
pub const EXIT_COMMAND: &str = "exit";

/// Session loop states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Processing(String),
    Terminated,
}

/// How one line of operator input is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Exit,
    Empty,
    Message(String),
}

/// Classify a raw input line.
pub fn classify_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        InputAction::Empty
    } else if trimmed.eq_ignore_ascii_case(EXIT_COMMAND) {
        InputAction::Exit
    } else {
        InputAction::Message(trimmed.to_string())
    }
}

/// Counters reported when the loop terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatSummary {
    pub exchanges: usize,
    pub failures: usize,
}

/// Drives one session through the chat state machine.
pub struct ChatLoop<'a> {
    invoker: &'a dyn Invoker,
    renderer: &'a dyn RenderSink,
    store: Option<&'a SessionStore>,
}

impl<'a> ChatLoop<'a> {
    pub fn new(invoker: &'a dyn Invoker, renderer: &'a dyn RenderSink) -> Self {
        Self {
            invoker,
            renderer,
            store: None,
        }
    }

    /// Save the session to `store` after every completed exchange.
    pub fn with_store(mut self, store: &'a SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Run until the operator types `exit` or input ends.
    ///
    /// Invoker failures are reported and the loop keeps going; only an input
    /// failure aborts it.
    pub async fn run(
        &self,
        session: &mut Session,
        input: &mut dyn LineInput,
    ) -> Result<ChatSummary, OperationError> {
        let mut summary = ChatSummary::default();
        let mut state = LoopState::AwaitingInput;
        loop {
            state = match state {
                LoopState::AwaitingInput => self.await_input(session, input)?,
                LoopState::Processing(message) => {
                    match self.process(session, &message).await {
                        Ok(()) => summary.exchanges += 1,
                        Err(err) => {
                            summary.failures += 1;
                            tracing::warn!(code = %err.code, "chat exchange failed");
                            self.renderer.error(&err.to_string());
                        }
                    }
                    LoopState::AwaitingInput
                }
                LoopState::Terminated => break,
            };
        }
        tracing::debug!(
            session = session.id(),
            exchanges = summary.exchanges,
            failures = summary.failures,
            "chat loop terminated"
        );
        Ok(summary)
    }

    fn await_input(
        &self,
        session: &Session,
        input: &mut dyn LineInput,
    ) -> Result<LoopState, OperationError> {
        let line = input.read_line(settings::PROMPT_CHAT).map_err(|e| {
            OperationError::wrap(
                ErrorCode::ChatFailed,
                json!({ "session": session.id() }),
                e,
            )
        })?;
        let Some(line) = line else {
            return Ok(LoopState::Terminated);
        };
        Ok(match classify_input(&line) {
            InputAction::Exit => LoopState::Terminated,
            InputAction::Empty => {
                self.renderer.warn("message cannot be empty");
                LoopState::AwaitingInput
            }
            InputAction::Message(message) => LoopState::Processing(message),
        })
    }

    async fn process(&self, session: &mut Session, message: &str) -> Result<(), OperationError> {
        let request = OperationRequest::Chat(ChatParams {
            model: session.model().to_string(),
            context: session.context().map(str::to_string),
            history: session.history(),
            message: message.to_string(),
        });
        let wrap = |e: ProviderError| {
            OperationError::wrap(ErrorCode::ChatFailed, request.params_json(), e)
        };

        let result = {
            let _progress = self.renderer.progress("Thinking...");
            self.invoker.invoke(&request).await
        };
        let reply = match result.map_err(wrap)? {
            OperationResult::Chat(reply) => reply,
            other => {
                return Err(wrap(ProviderError::Failed(format!(
                    "expected a chat result, got `{}`",
                    other.kind()
                ))))
            }
        };

        session.record_exchange(message, reply.as_str());
        self.renderer.assistant_message(&reply);

        if let Some(store) = self.store {
            if let Err(e) = store.save(session) {
                self.renderer
                    .warn(&format!("failed to save session {}: {e}", session.id()));
            }
        }
        Ok(())
    }
}
