//! Shared test fixtures for config, session, chat loop and dispatcher tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ProviderError;
use crate::provider::{Invoker, MockInvoker};
use crate::render::{ProgressHandle, RenderSink};
use crate::repl::LineInput;
use crate::types::{OperationRequest, OperationResult};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!(
            "aide-{prefix}-{}-{millis}-{suffix}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Write UTF-8 text to a child path, creating parent directories as needed.
    pub fn write_text(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.child(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent directories for fixture");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Input that replays a fixed list of lines, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// How many times a prompt was shown.
    pub fn prompts_shown(&self) -> usize {
        self.prompts.len()
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

/// One captured render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Header(String),
    Output(String),
    Assistant(String),
    Progress(String),
    Section(String),
    Field(String, String),
    Detail(String),
    Activity(String),
    Success(String),
    Warn(String),
    Error(String),
}

/// Render sink that records every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Rendered>>,
}

impl RecordingSink {
    fn push(&self, event: Rendered) {
        self.events.lock().expect("sink lock").push(event);
    }

    pub fn events(&self) -> Vec<Rendered> {
        self.events.lock().expect("sink lock").clone()
    }

    pub fn outputs(&self) -> Vec<String> {
        self.collect(|e| match e {
            Rendered::Output(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn assistant_messages(&self) -> Vec<String> {
        self.collect(|e| match e {
            Rendered::Assistant(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn warnings(&self) -> Vec<String> {
        self.collect(|e| match e {
            Rendered::Warn(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|e| match e {
            Rendered::Error(text) => Some(text.clone()),
            _ => None,
        })
    }

    fn collect(&self, pick: impl Fn(&Rendered) -> Option<String>) -> Vec<String> {
        self.events
            .lock()
            .expect("sink lock")
            .iter()
            .filter_map(pick)
            .collect()
    }
}

impl RenderSink for RecordingSink {
    fn header(&self, model: &str, session_id: &str) {
        self.push(Rendered::Header(format!("{model} {session_id}")));
    }

    fn output(&self, text: &str) {
        self.push(Rendered::Output(text.to_string()));
    }

    fn assistant_message(&self, content: &str) {
        self.push(Rendered::Assistant(content.to_string()));
    }

    fn progress(&self, label: &str) -> ProgressHandle {
        self.push(Rendered::Progress(label.to_string()));
        ProgressHandle::disabled()
    }

    fn section(&self, title: &str) {
        self.push(Rendered::Section(title.to_string()));
    }

    fn field(&self, key: &str, value: &str) {
        self.push(Rendered::Field(key.to_string(), value.to_string()));
    }

    fn detail(&self, text: &str) {
        self.push(Rendered::Detail(text.to_string()));
    }

    fn activity(&self, text: &str) {
        self.push(Rendered::Activity(text.to_string()));
    }

    fn success(&self, text: &str) {
        self.push(Rendered::Success(text.to_string()));
    }

    fn warn(&self, msg: &str) {
        self.push(Rendered::Warn(msg.to_string()));
    }

    fn error(&self, msg: &str) {
        self.push(Rendered::Error(msg.to_string()));
    }
}

/// Mock invoker that also records every request it receives.
#[derive(Debug, Default)]
pub struct CountingInvoker {
    inner: MockInvoker,
    requests: Mutex<Vec<OperationRequest>>,
}

impl CountingInvoker {
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("invoker lock").len()
    }

    pub fn requests(&self) -> Vec<OperationRequest> {
        self.requests.lock().expect("invoker lock").clone()
    }
}

#[async_trait]
impl Invoker for CountingInvoker {
    async fn invoke(&self, request: &OperationRequest) -> Result<OperationResult, ProviderError> {
        self.requests
            .lock()
            .expect("invoker lock")
            .push(request.clone());
        self.inner.invoke(request).await
    }
}

/// Invoker that fails every call with a fixed message.
#[derive(Debug)]
pub struct FailingInvoker {
    message: String,
}

impl FailingInvoker {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Invoker for FailingInvoker {
    async fn invoke(&self, _request: &OperationRequest) -> Result<OperationResult, ProviderError> {
        Err(ProviderError::Failed(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_fixture_writes_and_resolves_paths() {
        let fixture = TestTempDir::new("fixture");
        let file = fixture.write_text("nested/file.txt", "hello");
        assert_eq!(fs::read_to_string(file).unwrap(), "hello");
    }

    #[test]
    fn scripted_input_replays_then_ends() {
        let mut input = ScriptedInput::new(["a"]);
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("a"));
        assert_eq!(input.read_line("> ").unwrap(), None);
        assert_eq!(input.prompts(), ["> ", "> "]);
    }
}
